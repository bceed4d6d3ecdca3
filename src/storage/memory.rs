//! In-memory key-value store
//!
//! Provides the `KvStore` contract over a `tokio::sync::RwLock` guarded map
//! of owner → (id → value). Contents are lost when the process exits.

use super::backend::KvStore;
use crate::error::Result;
use async_trait::async_trait;
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use tokio::sync::RwLock;

/// In-memory store for a single namespace
pub struct MemoryStore<V> {
    entries: Arc<RwLock<HashMap<String, BTreeMap<String, V>>>>,
}

impl<V> MemoryStore<V> {
    /// Create a new empty store
    pub fn new() -> Self {
        Self {
            entries: Arc::new(RwLock::new(HashMap::new())),
        }
    }
}

impl<V> Default for MemoryStore<V> {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl<V> KvStore<V> for MemoryStore<V>
where
    V: Clone + Send + Sync + 'static,
{
    async fn put(&self, owner_id: &str, id: &str, value: V) -> Result<()> {
        self.entries
            .write()
            .await
            .entry(owner_id.to_string())
            .or_default()
            .insert(id.to_string(), value);
        Ok(())
    }

    async fn get(&self, owner_id: &str, id: &str) -> Result<Option<V>> {
        Ok(self
            .entries
            .read()
            .await
            .get(owner_id)
            .and_then(|owned| owned.get(id))
            .cloned())
    }

    async fn delete(&self, owner_id: &str, id: &str) -> Result<()> {
        let mut map = self.entries.write().await;
        if let Some(owned) = map.get_mut(owner_id) {
            owned.remove(id);
            if owned.is_empty() {
                map.remove(owner_id);
            }
        }
        Ok(())
    }

    async fn query(&self, owner_id: &str) -> Result<Vec<V>> {
        Ok(self
            .entries
            .read()
            .await
            .get(owner_id)
            .map(|owned| owned.values().cloned().collect())
            .unwrap_or_default())
    }

    fn name(&self) -> &str {
        "memory"
    }
}
