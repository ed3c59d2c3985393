//! # Image Cache
//!
//! Full-resolution images fetched through the proxy, keyed by item id.
//! Catalog entries are never mutated with fetched data; rendering asks the
//! cache which image to show.

use std::collections::{HashMap, HashSet};

use super::item::EquippableItem;

/// What to render for an item.
#[derive(Debug, PartialEq, Eq)]
pub enum ImageSource<'a> {
    /// Full image fetched through the proxy.
    Full(&'a [u8]),
    /// Embedded low-resolution image from the catalog entry (base64).
    Embedded(&'a str),
    Missing,
}

#[derive(Debug, Default)]
pub struct ImageCache {
    full: HashMap<String, Vec<u8>>,
    failed: HashSet<String>,
    requested: HashSet<String>,
}

impl ImageCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// True when the item has an image path that hasn't been requested yet.
    /// Marks it requested, so each item is fetched at most once.
    pub fn claim_fetch(&mut self, item: &EquippableItem) -> bool {
        if item.image_path.is_none() {
            return false;
        }
        self.requested.insert(item.id.clone())
    }

    /// Records the result of a fetch. `None` means the proxy had nothing.
    pub fn store(&mut self, item_id: &str, bytes: Option<Vec<u8>>) {
        match bytes {
            Some(bytes) => {
                self.failed.remove(item_id);
                self.full.insert(item_id.to_string(), bytes);
            }
            None => {
                self.failed.insert(item_id.to_string());
            }
        }
    }

    pub fn resolve<'a>(&'a self, item: &'a EquippableItem) -> ImageSource<'a> {
        if let Some(bytes) = self.full.get(&item.id) {
            return ImageSource::Full(bytes);
        }
        match item.image.as_deref() {
            Some(embedded) if !embedded.is_empty() => ImageSource::Embedded(embedded),
            _ => ImageSource::Missing,
        }
    }

    pub fn has_failed(&self, item_id: &str) -> bool {
        self.failed.contains(item_id)
    }

    /// Drops everything; used when the inventory is reloaded.
    pub fn clear(&mut self) {
        self.full.clear();
        self.failed.clear();
        self.requested.clear();
    }
}
