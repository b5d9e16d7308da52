//! Message definitions
//!
//! An ordered key → value dictionary. Keys iterate in lexicographic
//! byte order, which is also the encode order, so encoding is
//! deterministic regardless of insertion order.

use std::collections::btree_map::{self, BTreeMap};

use super::Value;

/// A dictionary of named, typed values
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Message {
    entries: BTreeMap<String, Value>,
}

impl Message {
    /// Create an empty message
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a value, returning the one it replaced (keys are unique)
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.entries.insert(key.into(), value.into())
    }

    /// Builder-style insert
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(key, value);
        self
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.entries.get(key)
    }

    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.entries.remove(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate entries in canonical (encode) order
    pub fn iter(&self) -> btree_map::Iter<'_, String, Value> {
        self.entries.iter()
    }

    pub fn keys(&self) -> btree_map::Keys<'_, String, Value> {
        self.entries.keys()
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for Message {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut message = Message::new();
        message.extend(iter);
        message
    }
}

impl<K: Into<String>, V: Into<Value>> Extend<(K, V)> for Message {
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        for (key, value) in iter {
            self.insert(key, value);
        }
    }
}

impl IntoIterator for Message {
    type Item = (String, Value);
    type IntoIter = btree_map::IntoIter<String, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

impl<'a> IntoIterator for &'a Message {
    type Item = (&'a String, &'a Value);
    type IntoIter = btree_map::Iter<'a, String, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}
