//! In-memory backend for tests and local runs

use std::collections::{BTreeMap, HashMap};

use async_trait::async_trait;
use parking_lot::RwLock;

use super::{Backend, BackendError};

/// Namespaced map guarded by a single lock
#[derive(Debug, Default)]
pub struct MemoryBackend {
    namespaces: RwLock<HashMap<String, BTreeMap<String, String>>>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }
}

#[cfg(test)]
impl MemoryBackend {
    /// Unconditional write, used to seed keys owned by other writers
    pub fn insert(&self, namespace: &str, key: impl Into<String>, value: impl Into<String>) {
        self.namespaces
            .write()
            .entry(namespace.to_string())
            .or_default()
            .insert(key.into(), value.into());
    }
}

#[async_trait]
impl Backend for MemoryBackend {
    async fn list_keys(&self, namespace: &str) -> Result<Vec<String>, BackendError> {
        let namespaces = self.namespaces.read();
        Ok(namespaces
            .get(namespace)
            .map(|ns| ns.keys().cloned().collect())
            .unwrap_or_default())
    }

    async fn get_by_keys(
        &self,
        namespace: &str,
        keys: &[String],
    ) -> Result<HashMap<String, Option<String>>, BackendError> {
        let namespaces = self.namespaces.read();
        let ns = namespaces.get(namespace);
        Ok(keys
            .iter()
            .map(|k| (k.clone(), ns.and_then(|ns| ns.get(k).cloned())))
            .collect())
    }

    async fn set_if_absent(
        &self,
        namespace: &str,
        key: &str,
        value: &str,
    ) -> Result<bool, BackendError> {
        // Check and insert under one write guard
        let mut namespaces = self.namespaces.write();
        let ns = namespaces.entry(namespace.to_string()).or_default();
        if ns.contains_key(key) {
            return Ok(false);
        }
        ns.insert(key.to_string(), value.to_string());
        Ok(true)
    }

    async fn healthcheck(&self) -> Result<(), BackendError> {
        Ok(())
    }
}
