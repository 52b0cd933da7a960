//! Package extras
//!
//! CKAN transmits a package's extras as a list of `{"key", "value"}` objects.
//! Internally they are an insertion-ordered map with upsert semantics; the
//! list form only appears when the payload is serialized.

use serde::ser::{Serialize, Serializer};

/// Insertion-ordered key/value map with unique keys
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Extras {
    entries: Vec<(String, String)>,
}

#[derive(serde::Serialize)]
struct ExtraEntry<'a> {
    key: &'a str,
    value: &'a str,
}

impl Extras {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the value for `key`
    ///
    /// An existing entry keeps its position and gets the new value; an
    /// unknown key is appended.
    pub fn upsert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((key, value)),
        }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }
}

impl Serialize for Extras {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(
            self.entries
                .iter()
                .map(|(key, value)| ExtraEntry { key, value }),
        )
    }
}
