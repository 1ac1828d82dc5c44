/// Directory inside a bundle (and inside the baseline archive) holding all resources.
pub const RESOURCE_ROOT: &str = "META-INF";

/// Directory under the repository root holding downloaded baselines.
pub const CACHE_DIR: &str = "cache";

/// Categories materialized from file-entry lists, in launch order.
pub const CATEGORIES: [&str; 2] = ["versions", "libraries"];

pub const PATCHES_LIST: &str = "patches.list";
pub const DOWNLOAD_CONTEXT: &str = "download-context";
pub const MAIN_CLASS: &str = "main-class";

/// Characters that cannot appear in the working directory path.
pub const FORBIDDEN_PATH_CHARS: &[char] = &['!'];

/// Name of the thread running the launched application.
pub const LAUNCH_THREAD_NAME: &str = "app-main";
