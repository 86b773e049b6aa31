//! Schema registry keyed by `$id`.
//!
//! Decoding registers every schema object that declares a non-empty `$id`;
//! reference resolution reads from a snapshot. Clones share the same
//! underlying map, so one registry can serve a whole conversion session, and
//! the lock keeps concurrent decodes from corrupting each other's entries.

use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

use tracing::debug;

use crate::schema::Schema;

/// Point-in-time copy of the registry contents.
pub type RegistrySnapshot = HashMap<String, Schema>;

#[derive(Debug, Clone, Default)]
pub struct Registry {
    entries: Arc<RwLock<HashMap<String, Schema>>>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert `schema` under `id`, replacing any earlier entry.
    ///
    /// Empty identifiers are ignored.
    pub fn register(&self, id: &str, schema: Schema) {
        if id.is_empty() {
            return;
        }
        debug!(id, "registering schema");
        self.entries
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(id.to_string(), schema);
    }

    /// Clone of the schema registered under exactly `id`.
    pub fn get(&self, id: &str) -> Option<Schema> {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(id)
            .cloned()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Registered identifiers, sorted.
    pub fn ids(&self) -> Vec<String> {
        let mut ids: Vec<String> = self
            .entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .keys()
            .cloned()
            .collect();
        ids.sort();
        ids
    }

    /// Copy of every entry, detached from later writes.
    pub fn snapshot(&self) -> RegistrySnapshot {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn register_and_get_exact_id() {
        let registry = Registry::new();
        registry.register("urn:x#", Schema::Bool(true));

        assert_eq!(registry.get("urn:x#"), Some(Schema::Bool(true)));
        assert!(registry.get("urn:x").is_none());
        assert!(registry.contains("urn:x#"));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn empty_id_is_ignored() {
        let registry = Registry::new();
        registry.register("", Schema::Bool(true));
        assert!(registry.is_empty());
    }

    #[test]
    fn clones_share_entries() {
        let registry = Registry::new();
        let shared = registry.clone();
        shared.register("urn:a#", Schema::empty());
        assert!(registry.contains("urn:a#"));
    }

    #[test]
    fn snapshot_is_detached() {
        let registry = Registry::new();
        registry.register("urn:a#", Schema::Bool(false));
        let snapshot = registry.snapshot();
        registry.register("urn:b#", Schema::Bool(true));

        assert_eq!(snapshot.len(), 1);
        assert_eq!(registry.ids(), vec!["urn:a#".to_string(), "urn:b#".to_string()]);
    }

    #[test]
    fn concurrent_registration() {
        let registry = Registry::new();
        let handles: Vec<_> = (0..8)
            .map(|i| {
                let registry = registry.clone();
                thread::spawn(move || registry.register(&format!("urn:{i}#"), Schema::empty()))
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }
        assert_eq!(registry.len(), 8);
    }
}
