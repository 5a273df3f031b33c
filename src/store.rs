//! Keyed entity tables
//!
//! Each resource family lives in a [`Table`]: entities indexed by surrogate id,
//! a natural-key index (image reference, volume/network/container name), and
//! insertion order for listing.

use crate::ids::ResourceId;
use std::collections::HashMap;

/// An entity stored in a [`Table`]
pub trait Entity {
    /// Surrogate id
    fn id(&self) -> &ResourceId;

    /// Natural key; unique within a table
    fn key(&self) -> String;
}

/// Entities indexed by id and by natural key
#[derive(Debug, Clone)]
pub struct Table<T> {
    /// Entities indexed by ID
    entries: HashMap<ResourceId, T>,
    /// Natural key to ID mapping
    keys: HashMap<String, ResourceId>,
    /// Insertion order
    order: Vec<ResourceId>,
}

impl<T> Default for Table<T> {
    fn default() -> Self {
        Self {
            entries: HashMap::new(),
            keys: HashMap::new(),
            order: Vec::new(),
        }
    }
}

impl<T: Entity> Table<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert an entity. An entity already holding the same id or key is
    /// replaced; callers validate uniqueness beforehand.
    pub fn insert(&mut self, entity: T) -> &T {
        let id = entity.id().clone();
        let key = entity.key();

        if let Some(previous) = self.keys.get(&key).cloned() {
            if previous != id {
                self.remove(&previous);
            }
        }
        if let Some(existing) = self.entries.get(&id) {
            self.keys.remove(&existing.key());
        }
        self.keys.insert(key, id.clone());

        if self.entries.insert(id.clone(), entity).is_none() {
            self.order.push(id.clone());
        }

        &self.entries[&id]
    }

    /// Get an entity by id
    pub fn get(&self, id: &ResourceId) -> Option<&T> {
        self.entries.get(id)
    }

    /// Get a mutable entity by id. The natural key must not be changed.
    pub fn get_mut(&mut self, id: &ResourceId) -> Option<&mut T> {
        self.entries.get_mut(id)
    }

    /// Find an entity by natural key
    pub fn find(&self, key: &str) -> Option<&T> {
        self.keys.get(key).and_then(|id| self.entries.get(id))
    }

    /// Find a mutable entity by natural key
    pub fn find_mut(&mut self, key: &str) -> Option<&mut T> {
        let id = self.keys.get(key)?;
        self.entries.get_mut(id)
    }

    /// Check whether an entity with the given natural key exists
    pub fn contains_key(&self, key: &str) -> bool {
        self.keys.contains_key(key)
    }

    /// Remove an entity by id
    pub fn remove(&mut self, id: &ResourceId) -> Option<T> {
        let entity = self.entries.remove(id)?;
        self.keys.remove(&entity.key());
        self.order.retain(|existing| existing != id);
        Some(entity)
    }

    /// Iterate in insertion order
    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.order.iter().filter_map(|id| self.entries.get(id))
    }

    /// Iterate mutably; order is unspecified
    pub fn values_mut(&mut self) -> impl Iterator<Item = &mut T> {
        self.entries.values_mut()
    }

    /// Cloned entities in insertion order
    pub fn to_vec(&self) -> Vec<T>
    where
        T: Clone,
    {
        self.iter().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.keys.clear();
        self.order.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone)]
    struct Item {
        id: ResourceId,
        name: String,
    }

    impl Entity for Item {
        fn id(&self) -> &ResourceId {
            &self.id
        }

        fn key(&self) -> String {
            self.name.clone()
        }
    }

    fn item(id: &str, name: &str) -> Item {
        Item {
            id: ResourceId::from(id),
            name: name.to_string(),
        }
    }

    #[test]
    fn test_insert_and_lookup() {
        let mut table = Table::new();
        table.insert(item("a1", "alpha"));
        table.insert(item("b2", "beta"));

        assert_eq!(table.len(), 2);
        assert_eq!(table.get(&ResourceId::from("b2")).unwrap().name, "beta");
        assert_eq!(table.find("alpha").unwrap().id.as_str(), "a1");
        assert!(table.contains_key("beta"));
        assert!(table.find("gamma").is_none());
    }

    #[test]
    fn test_iteration_keeps_insertion_order() {
        let mut table = Table::new();
        for (id, name) in [("3", "c"), ("1", "a"), ("2", "b")] {
            table.insert(item(id, name));
        }
        let names: Vec<_> = table.iter().map(|i| i.name.as_str()).collect();
        assert_eq!(names, vec!["c", "a", "b"]);

        table.remove(&ResourceId::from("1"));
        let names: Vec<_> = table.iter().map(|i| i.name.as_str()).collect();
        assert_eq!(names, vec!["c", "b"]);
        assert!(!table.contains_key("a"));
    }

    #[test]
    fn test_insert_same_key_replaces() {
        let mut table = Table::new();
        table.insert(item("1", "a"));
        table.insert(item("2", "a"));

        assert_eq!(table.len(), 1);
        assert_eq!(table.find("a").unwrap().id.as_str(), "2");
    }
}
