//! In-memory content store, used by dry runs and tests

use crate::storage::traits::{ContentStore, StoreError, StoreResult, StoredObject};
use async_trait::async_trait;
use std::collections::{BTreeMap, HashMap};
use std::sync::{Mutex, MutexGuard};

#[derive(Debug, Default)]
struct Namespace {
    owner: String,
    objects: BTreeMap<String, StoredObject>,
}

/// Content store kept entirely in memory
#[derive(Debug)]
pub struct MemoryContentStore {
    principal: String,
    namespaces: Mutex<HashMap<String, Namespace>>,
}

impl MemoryContentStore {
    pub fn new(principal: &str) -> Self {
        Self {
            principal: principal.to_string(),
            namespaces: Mutex::new(HashMap::new()),
        }
    }

    /// Registers a namespace owned by another principal
    pub fn with_foreign_namespace(self, name: &str, owner: &str) -> Self {
        if let Ok(mut namespaces) = self.namespaces.lock() {
            namespaces.insert(
                name.to_string(),
                Namespace {
                    owner: owner.to_string(),
                    objects: BTreeMap::new(),
                },
            );
        }
        self
    }

    fn lock(&self) -> StoreResult<MutexGuard<'_, HashMap<String, Namespace>>> {
        self.namespaces
            .lock()
            .map_err(|_| StoreError::Unavailable("store lock poisoned".to_string()))
    }
}

#[async_trait]
impl ContentStore for MemoryContentStore {
    async fn ensure_namespace(&self, name: &str) -> StoreResult<()> {
        let mut namespaces = self.lock()?;
        let entry = namespaces
            .entry(name.to_string())
            .or_insert_with(|| Namespace {
                owner: self.principal.clone(),
                objects: BTreeMap::new(),
            });

        if entry.owner != self.principal {
            return Err(StoreError::NamespaceConflict {
                namespace: name.to_string(),
                owner: entry.owner.clone(),
            });
        }
        Ok(())
    }

    async fn put(
        &self,
        namespace: &str,
        key: &str,
        body: &[u8],
        content_type: &str,
    ) -> StoreResult<()> {
        let mut namespaces = self.lock()?;
        let ns = namespaces.get_mut(namespace).ok_or_else(|| {
            StoreError::Unavailable(format!("namespace '{}' does not exist", namespace))
        })?;

        ns.objects.insert(
            key.to_string(),
            StoredObject {
                key: key.to_string(),
                content_type: content_type.to_string(),
                body: body.to_vec(),
            },
        );
        Ok(())
    }

    async fn get(&self, namespace: &str, key: &str) -> StoreResult<Option<StoredObject>> {
        let namespaces = self.lock()?;
        Ok(namespaces
            .get(namespace)
            .and_then(|ns| ns.objects.get(key))
            .cloned())
    }

    async fn list_keys(&self, namespace: &str) -> StoreResult<Vec<String>> {
        let namespaces = self.lock()?;
        Ok(namespaces
            .get(namespace)
            .map(|ns| ns.objects.keys().cloned().collect())
            .unwrap_or_default())
    }
}
