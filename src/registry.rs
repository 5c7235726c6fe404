//! Node name <-> dense id mapping, and seed resolution.

use std::collections::HashMap;

use crate::{Error, Result};

/// Bidirectional map between external node names and ids `0..len()`.
///
/// Ids are handed out in first-seen order and never reused.
#[derive(Debug, Clone, Default)]
pub struct NodeRegistry {
    name_to_id: HashMap<String, usize>,
    names: Vec<String>,
}

impl NodeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the id for `name`, assigning the next free id if it is new.
    pub fn get_or_insert(&mut self, name: &str) -> usize {
        if let Some(&id) = self.name_to_id.get(name) {
            return id;
        }
        let id = self.names.len();
        self.name_to_id.insert(name.to_string(), id);
        self.names.push(name.to_string());
        id
    }

    pub fn id(&self, name: &str) -> Option<usize> {
        self.name_to_id.get(name).copied()
    }

    pub fn name(&self, id: usize) -> Option<&str> {
        self.names.get(id).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Names indexed by id.
    pub fn names(&self) -> &[String] {
        &self.names
    }
}

/// Map seed names to ids, keeping order and duplicates.
pub fn resolve_seeds<S: AsRef<str>>(registry: &NodeRegistry, names: &[S]) -> Result<Vec<usize>> {
    names
        .iter()
        .map(|n| {
            let n = n.as_ref();
            registry.id(n).ok_or_else(|| Error::UnknownNode(n.to_string()))
        })
        .collect()
}

/// Split a free-form line of seed names on commas and whitespace.
pub fn parse_seed_list(text: &str) -> Vec<String> {
    text.split(|c: char| c == ',' || c.is_whitespace())
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}
