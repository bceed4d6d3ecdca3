//! Pluggable key-value backend contract
//!
//! Every namespace (fragment metadata, fragment data) is a `KvStore` keyed by
//! the `(owner_id, id)` pair. Lookups are always scoped to a single owner.

use crate::error::{Error, Result};
use async_trait::async_trait;
use bytes::Bytes;

/// Owner-scoped key-value store.
///
/// Implementations must treat a missing key as a normal outcome: `get`
/// returns `Ok(None)` and `delete` returns `Ok(())`.
#[async_trait]
pub trait KvStore<V>: Send + Sync {
    /// Insert or fully replace the value at `(owner_id, id)`.
    async fn put(&self, owner_id: &str, id: &str, value: V) -> Result<()>;

    /// Read the value at `(owner_id, id)`.
    async fn get(&self, owner_id: &str, id: &str) -> Result<Option<V>>;

    /// Remove the value at `(owner_id, id)`. Idempotent.
    async fn delete(&self, owner_id: &str, id: &str) -> Result<()>;

    /// All values belonging to `owner_id`. Empty when the owner has none.
    async fn query(&self, owner_id: &str) -> Result<Vec<V>>;

    /// Human-readable backend name (used in logs).
    fn name(&self) -> &str;
}

/// Byte encoding for values held by a durable backend.
pub trait StoredValue: Sized + Send + Sync + 'static {
    /// Encode the value for storage
    fn encode(&self) -> Result<Vec<u8>>;

    /// Decode a stored value
    fn decode(raw: Vec<u8>) -> Result<Self>;
}

impl StoredValue for Bytes {
    fn encode(&self) -> Result<Vec<u8>> {
        Ok(self.to_vec())
    }

    fn decode(raw: Vec<u8>) -> Result<Self> {
        Ok(Bytes::from(raw))
    }
}

impl StoredValue for crate::fragment::Fragment {
    fn encode(&self) -> Result<Vec<u8>> {
        serde_json::to_vec(self).map_err(|e| Error::Storage(format!("encode metadata: {}", e)))
    }

    fn decode(raw: Vec<u8>) -> Result<Self> {
        serde_json::from_slice(&raw).map_err(|e| Error::Storage(format!("decode metadata: {}", e)))
    }
}
