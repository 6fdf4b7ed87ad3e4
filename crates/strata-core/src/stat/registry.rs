//! Registry of stat adapters.
//!
//! Runtime lookup by id or family. The registry itself starts empty; the
//! `strata-stats` crate registers the built-in adapters.

use std::collections::HashMap;

use super::{StatFamily, StatMetadata, StatTransform};

/// Registry of available stat adapters.
#[derive(Default)]
pub struct StatRegistry {
    stats: Vec<Box<dyn StatTransform>>,
    by_id: HashMap<String, usize>,
    by_family: HashMap<StatFamily, Vec<usize>>,
}

impl StatRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self {
            stats: Vec::new(),
            by_id: HashMap::new(),
            by_family: HashMap::new(),
        }
    }

    /// Register an adapter.
    pub fn register(&mut self, stat: Box<dyn StatTransform>) {
        let index = self.stats.len();
        let metadata = stat.metadata();

        self.by_id.insert(metadata.id.clone(), index);
        self.by_family
            .entry(metadata.family)
            .or_default()
            .push(index);

        self.stats.push(stat);
    }

    /// Get an adapter by its id.
    pub fn get(&self, id: &str) -> Option<&dyn StatTransform> {
        self.by_id.get(id).map(|&index| self.stats[index].as_ref())
    }

    /// List all registered adapters.
    pub fn list_all(&self) -> Vec<&StatMetadata> {
        self.stats.iter().map(|s| s.metadata()).collect()
    }

    /// List adapters in a family.
    pub fn list_by_family(&self, family: StatFamily) -> Vec<&StatMetadata> {
        self.by_family
            .get(&family)
            .map(|indices| indices.iter().map(|&i| self.stats[i].metadata()).collect())
            .unwrap_or_default()
    }

    /// Total number of registered adapters.
    pub fn len(&self) -> usize {
        self.stats.len()
    }

    /// Check if the registry is empty.
    pub fn is_empty(&self) -> bool {
        self.stats.is_empty()
    }

    /// Search adapters by id, name, or description (case-insensitive).
    pub fn search(&self, query: &str) -> Vec<&StatMetadata> {
        let query_lower = query.to_lowercase();
        self.stats
            .iter()
            .map(|s| s.metadata())
            .filter(|m| {
                m.id.to_lowercase().contains(&query_lower)
                    || m.name.to_lowercase().contains(&query_lower)
                    || m.description.to_lowercase().contains(&query_lower)
            })
            .collect()
    }
}
