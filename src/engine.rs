use crate::collection::{Collection, CollectionRules};
use crate::errors::DbError;
use crate::types::CollectionName;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;

/// The in-memory document engine: a registry of named collections.
#[derive(Default)]
pub struct Engine {
    collections: RwLock<HashMap<CollectionName, Arc<Collection>>>,
}

impl std::fmt::Debug for Engine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Engine").field("collections", &self.list_collection_names()).finish()
    }
}

impl Engine {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a collection, or returns the existing one with that name.
    pub fn create_collection(&self, name: &str) -> Arc<Collection> {
        self.create_collection_with_rules(name, CollectionRules::default())
    }

    /// Like `create_collection`; rules only apply when the collection is new.
    pub fn create_collection_with_rules(
        &self,
        name: &str,
        rules: CollectionRules,
    ) -> Arc<Collection> {
        let mut cols = self.collections.write();
        Arc::clone(cols.entry(name.to_string()).or_insert_with(|| {
            log::info!("created collection {name}");
            Arc::new(Collection::with_rules(name.to_string(), rules))
        }))
    }

    pub fn get_collection(&self, name: &str) -> Option<Arc<Collection>> {
        self.collections.read().get(name).cloned()
    }

    /// # Errors
    /// Returns `DbError::NoSuchCollection` when the collection does not exist.
    pub fn collection(&self, name: &str) -> Result<Arc<Collection>, DbError> {
        self.get_collection(name).ok_or_else(|| DbError::NoSuchCollection(name.to_string()))
    }

    pub fn delete_collection(&self, name: &str) -> bool {
        self.collections.write().remove(name).is_some()
    }

    pub fn list_collection_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.collections.read().keys().cloned().collect();
        names.sort();
        names
    }
}
