//! Resolved artifact locations.
//!
//! The registry maps a category and a relative path to the local file that
//! provides it. The extractor and the patch applier write it, the launcher
//! reads it. Only verified files are ever inserted.

use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::consts::CATEGORIES;

/// Locations of one category, in insertion order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CategoryLocations {
  pub name: String,
  pub entries: Vec<(String, PathBuf)>,
}

impl CategoryLocations {
  fn new(name: &str) -> Self {
    Self {
      name: name.to_string(),
      entries: Vec::new(),
    }
  }

  pub fn get(&self, path: &str) -> Option<&Path> {
    self
      .entries
      .iter()
      .find(|(p, _)| p == path)
      .map(|(_, location)| location.as_path())
  }

  pub fn len(&self) -> usize {
    self.entries.len()
  }

  pub fn is_empty(&self) -> bool {
    self.entries.is_empty()
  }
}

/// Mapping `category -> relative path -> location`.
///
/// The default categories always exist, in launch order. Re-inserting a key
/// replaces its location but keeps its position.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LocationRegistry {
  categories: Vec<CategoryLocations>,
}

impl Default for LocationRegistry {
  fn default() -> Self {
    Self::new()
  }
}

impl LocationRegistry {
  pub fn new() -> Self {
    Self {
      categories: CATEGORIES.iter().map(|c| CategoryLocations::new(c)).collect(),
    }
  }

  /// Record `location` for `path` in `category`, returning the location it replaced.
  pub fn insert(&mut self, category: &str, path: &str, location: PathBuf) -> Option<PathBuf> {
    let category = category.trim_end_matches('/');
    let index = match self.categories.iter().position(|c| c.name == category) {
      Some(index) => index,
      None => {
        self.categories.push(CategoryLocations::new(category));
        self.categories.len() - 1
      }
    };

    let entries = &mut self.categories[index].entries;
    match entries.iter_mut().find(|(p, _)| p == path) {
      Some((_, existing)) => Some(std::mem::replace(existing, location)),
      None => {
        entries.push((path.to_string(), location));
        None
      }
    }
  }

  pub fn get(&self, category: &str, path: &str) -> Option<&Path> {
    self.category(category).and_then(|c| c.get(path))
  }

  pub fn category(&self, name: &str) -> Option<&CategoryLocations> {
    self.categories.iter().find(|c| c.name == name)
  }

  pub fn categories(&self) -> impl Iterator<Item = &CategoryLocations> {
    self.categories.iter()
  }

  /// Every location, category by category.
  pub fn artifacts(&self) -> Vec<PathBuf> {
    self
      .categories
      .iter()
      .flat_map(|c| c.entries.iter().map(|(_, location)| location.clone()))
      .collect()
  }

  pub fn len(&self) -> usize {
    self.categories.iter().map(CategoryLocations::len).sum()
  }

  pub fn is_empty(&self) -> bool {
    self.len() == 0
  }
}
