//! In-memory catalogs handed to the nutrition core
//!
//! The store loads these once per request; the core only reads them.

use std::collections::HashMap;

use super::{FoodItem, Recipe};

/// A record addressable by its string id
pub trait Keyed {
    fn key(&self) -> &str;
}

impl Keyed for FoodItem {
    fn key(&self) -> &str {
        &self.id
    }
}

impl Keyed for Recipe {
    fn key(&self) -> &str {
        &self.id
    }
}

/// Id-indexed lookup table. Inserting an existing id replaces the record.
#[derive(Debug, Clone)]
pub struct Catalog<T> {
    items: HashMap<String, T>,
}

pub type FoodCatalog = Catalog<FoodItem>;
pub type RecipeCatalog = Catalog<Recipe>;

impl<T: Keyed> Catalog<T> {
    pub fn new() -> Self {
        Self {
            items: HashMap::new(),
        }
    }

    pub fn insert(&mut self, item: T) -> Option<T> {
        self.items.insert(item.key().to_string(), item)
    }

    pub fn get(&self, id: &str) -> Option<&T> {
        self.items.get(id)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl<T: Keyed> Default for Catalog<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Keyed> FromIterator<T> for Catalog<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut catalog = Self::new();
        for item in iter {
            catalog.insert(item);
        }
        catalog
    }
}
