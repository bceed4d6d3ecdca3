//! Fragment metadata + data namespace pair
//!
//! A fragment lives in two independently addressable namespaces that share
//! the `(owner_id, id)` key: JSON metadata records and raw byte blobs. This
//! type is the only place that touches both, so reads, writes and deletes
//! stay paired.

use super::backend::KvStore;
use super::fs::FsStore;
use super::memory::MemoryStore;
use crate::config::{StorageBackendKind, StorageConfig};
use crate::error::{Error, Result};
use crate::fragment::{Fragment, FragmentList};
use bytes::Bytes;
use std::path::Path;
use std::sync::Arc;

/// Metadata and data namespaces for all fragments
#[derive(Clone)]
pub struct FragmentStore {
    metadata: Arc<dyn KvStore<Fragment>>,
    data: Arc<dyn KvStore<Bytes>>,
}

impl FragmentStore {
    /// Build from explicit namespace implementations
    pub fn new(metadata: Arc<dyn KvStore<Fragment>>, data: Arc<dyn KvStore<Bytes>>) -> Self {
        Self { metadata, data }
    }

    /// Both namespaces held in process memory
    pub fn in_memory() -> Self {
        Self::new(
            Arc::new(MemoryStore::<Fragment>::new()),
            Arc::new(MemoryStore::<Bytes>::new()),
        )
    }

    /// Both namespaces persisted under `base_dir` (`metadata/` and `data/`)
    pub async fn on_disk(base_dir: &Path) -> Result<Self> {
        let metadata: FsStore<Fragment> = FsStore::open(base_dir.join("metadata")).await?;
        let data: FsStore<Bytes> = FsStore::open(base_dir.join("data")).await?;
        Ok(Self::new(Arc::new(metadata), Arc::new(data)))
    }

    /// Build the backend selected by configuration
    pub async fn from_config(config: &StorageConfig) -> Result<Self> {
        let store = match config.backend {
            StorageBackendKind::Memory => Self::in_memory(),
            StorageBackendKind::Fs => Self::on_disk(&config.base_dir).await?,
        };
        tracing::info!(
            metadata = store.metadata.name(),
            data = store.data.name(),
            "Fragment storage ready"
        );
        Ok(store)
    }

    /// Write a fragment's metadata record (full overwrite)
    pub async fn write_fragment(&self, fragment: &Fragment) -> Result<()> {
        require_key(&fragment.owner_id, &fragment.id)?;
        self.metadata
            .put(&fragment.owner_id, &fragment.id, fragment.clone())
            .await
    }

    /// Read a fragment's metadata record
    pub async fn read_fragment(&self, owner_id: &str, id: &str) -> Result<Option<Fragment>> {
        require_key(owner_id, id)?;
        self.metadata.get(owner_id, id).await
    }

    /// Write a fragment's data blob (full overwrite)
    pub async fn write_fragment_data(&self, owner_id: &str, id: &str, data: Bytes) -> Result<()> {
        require_key(owner_id, id)?;
        self.data.put(owner_id, id, data).await
    }

    /// Read a fragment's data blob
    pub async fn read_fragment_data(&self, owner_id: &str, id: &str) -> Result<Option<Bytes>> {
        require_key(owner_id, id)?;
        self.data.get(owner_id, id).await
    }

    /// List an owner's fragments, as full records when `expand` is set
    pub async fn list_fragments(&self, owner_id: &str, expand: bool) -> Result<FragmentList> {
        if owner_id.is_empty() {
            return Err(Error::Validation("ownerId must be provided".to_string()));
        }
        let fragments = self.metadata.query(owner_id).await?;
        Ok(if expand {
            FragmentList::Expanded(fragments)
        } else {
            FragmentList::Ids(fragments.into_iter().map(|f| f.id).collect())
        })
    }

    /// Delete a fragment's metadata and data.
    ///
    /// Both deletes are issued and awaited; if either fails the deletion is
    /// reported as a storage error.
    pub async fn delete_fragment(&self, owner_id: &str, id: &str) -> Result<()> {
        require_key(owner_id, id)?;
        let (metadata, data) = futures::join!(
            self.metadata.delete(owner_id, id),
            self.data.delete(owner_id, id)
        );

        match (metadata, data) {
            (Ok(()), Ok(())) => Ok(()),
            (metadata, data) => {
                let failures: Vec<String> = [("metadata", metadata), ("data", data)]
                    .into_iter()
                    .filter_map(|(ns, r)| r.err().map(|e| format!("{}: {}", ns, e)))
                    .collect();
                tracing::warn!(owner_id, id, ?failures, "Incomplete fragment deletion");
                Err(Error::Storage(format!(
                    "incomplete deletion of fragment {}: {}",
                    id,
                    failures.join("; ")
                )))
            }
        }
    }
}

fn require_key(owner_id: &str, id: &str) -> Result<()> {
    if owner_id.is_empty() || id.is_empty() {
        return Err(Error::Validation(format!(
            "ownerId and id must be provided, got ownerId={:?}, id={:?}",
            owner_id, id
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fragment::FragmentBuilder;
    use async_trait::async_trait;
    use tempfile::TempDir;

    fn fragment(owner_id: &str) -> Fragment {
        FragmentBuilder::new()
            .owner_id(owner_id)
            .content_type("text/plain")
            .build()
            .unwrap()
    }

    #[tokio::test]
    async fn test_write_and_read_fragment() {
        let store = FragmentStore::in_memory();
        let f = fragment("user1");
        store.write_fragment(&f).await.unwrap();

        let read = store.read_fragment("user1", &f.id).await.unwrap();
        assert_eq!(read, Some(f));
    }

    #[tokio::test]
    async fn test_write_and_read_data() {
        let store = FragmentStore::in_memory();
        store
            .write_fragment_data("user1", "fragment1", Bytes::from_static(b"Hello Buffer!"))
            .await
            .unwrap();

        let data = store.read_fragment_data("user1", "fragment1").await.unwrap();
        assert_eq!(data, Some(Bytes::from_static(b"Hello Buffer!")));
    }

    #[tokio::test]
    async fn test_list_ids_and_expanded() {
        let store = FragmentStore::in_memory();
        let f = fragment("user1");
        store.write_fragment(&f).await.unwrap();

        match store.list_fragments("user1", false).await.unwrap() {
            FragmentList::Ids(ids) => assert_eq!(ids, vec![f.id.clone()]),
            other => panic!("expected ids, got {:?}", other),
        }
        match store.list_fragments("user1", true).await.unwrap() {
            FragmentList::Expanded(records) => assert_eq!(records, vec![f]),
            other => panic!("expected records, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_list_unknown_owner_is_empty() {
        let store = FragmentStore::in_memory();
        let list = store.list_fragments("nobody", false).await.unwrap();
        assert!(list.is_empty());
    }

    #[tokio::test]
    async fn test_missing_keys_are_rejected() {
        let store = FragmentStore::in_memory();
        assert!(matches!(
            store.read_fragment("", "id").await,
            Err(Error::Validation(_))
        ));
        assert!(matches!(
            store.read_fragment_data("owner", "").await,
            Err(Error::Validation(_))
        ));
        assert!(matches!(
            store.write_fragment_data("", "", Bytes::new()).await,
            Err(Error::Validation(_))
        ));
        assert!(matches!(
            store.list_fragments("", true).await,
            Err(Error::Validation(_))
        ));
        assert!(matches!(
            store.delete_fragment("owner", "").await,
            Err(Error::Validation(_))
        ));
    }

    #[tokio::test]
    async fn test_delete_removes_both_namespaces() {
        let store = FragmentStore::in_memory();
        let f = fragment("user1");
        store.write_fragment(&f).await.unwrap();
        store
            .write_fragment_data("user1", &f.id, Bytes::from_static(b"x"))
            .await
            .unwrap();

        store.delete_fragment("user1", &f.id).await.unwrap();
        assert!(store.read_fragment("user1", &f.id).await.unwrap().is_none());
        assert!(store.read_fragment_data("user1", &f.id).await.unwrap().is_none());

        store.delete_fragment("user1", &f.id).await.unwrap();
    }

    struct FailingDeletes;

    #[async_trait]
    impl KvStore<Bytes> for FailingDeletes {
        async fn put(&self, _: &str, _: &str, _: Bytes) -> Result<()> {
            Ok(())
        }
        async fn get(&self, _: &str, _: &str) -> Result<Option<Bytes>> {
            Ok(None)
        }
        async fn delete(&self, _: &str, _: &str) -> Result<()> {
            Err(Error::Storage("disk on fire".to_string()))
        }
        async fn query(&self, _: &str) -> Result<Vec<Bytes>> {
            Ok(Vec::new())
        }
        fn name(&self) -> &str {
            "failing"
        }
    }

    #[tokio::test]
    async fn test_partial_delete_failure_is_reported() {
        let store = FragmentStore::new(
            Arc::new(MemoryStore::<Fragment>::new()),
            Arc::new(FailingDeletes),
        );
        let f = fragment("user1");
        store.write_fragment(&f).await.unwrap();

        let result = store.delete_fragment("user1", &f.id).await;
        match result {
            Err(Error::Storage(msg)) => assert!(msg.contains("disk on fire")),
            other => panic!("expected storage error, got {:?}", other),
        }
        // The metadata delete was still issued
        assert!(store.read_fragment("user1", &f.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_on_disk_round_trip() {
        let dir = TempDir::new().unwrap();
        let f = fragment("user1");
        {
            let store = FragmentStore::on_disk(dir.path()).await.unwrap();
            store.write_fragment(&f).await.unwrap();
            store
                .write_fragment_data("user1", &f.id, Bytes::from_static(b"persisted"))
                .await
                .unwrap();
        }

        let store = FragmentStore::on_disk(dir.path()).await.unwrap();
        assert_eq!(store.read_fragment("user1", &f.id).await.unwrap(), Some(f.clone()));
        assert_eq!(
            store.read_fragment_data("user1", &f.id).await.unwrap(),
            Some(Bytes::from_static(b"persisted"))
        );
    }

    #[tokio::test]
    async fn test_from_config_memory() {
        let config = StorageConfig {
            backend: StorageBackendKind::Memory,
            ..StorageConfig::default()
        };
        let store = FragmentStore::from_config(&config).await.unwrap();
        assert!(store.list_fragments("user1", false).await.unwrap().is_empty());
    }
}
