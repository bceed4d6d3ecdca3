//! File-backed key-value store
//!
//! Directory layout:
//! ```text
//! <base_dir>/<namespace>/
//! ├── <b64(owner_id)>/
//! │   ├── <b64(id)>
//! │   └── ...
//! └── ...
//! ```
//!
//! Owner and id components are URL-safe base64 so that arbitrary strings
//! map to a single path segment. A value is written to a uniquely named
//! temporary sibling and renamed into place, so a reader sees either the old
//! or the new value and concurrent writers to one key never share a file.

use super::backend::{KvStore, StoredValue};
use crate::error::{Error, Result};
use async_trait::async_trait;
use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use std::io::ErrorKind;
use std::marker::PhantomData;
use std::path::{Path, PathBuf};

const TMP_SUFFIX: &str = ".tmp";

/// Durable store for a single namespace
pub struct FsStore<V> {
    root: PathBuf,
    _value: PhantomData<fn() -> V>,
}

impl<V> FsStore<V> {
    /// Open (creating if needed) the namespace directory at `root`
    pub async fn open(root: PathBuf) -> Result<Self> {
        tokio::fs::create_dir_all(&root)
            .await
            .map_err(|e| storage_err("create namespace", &root, e))?;
        Ok(Self {
            root,
            _value: PhantomData,
        })
    }

    fn owner_dir(&self, owner_id: &str) -> PathBuf {
        self.root.join(URL_SAFE_NO_PAD.encode(owner_id))
    }

    fn entry_path(&self, owner_id: &str, id: &str) -> PathBuf {
        self.owner_dir(owner_id).join(URL_SAFE_NO_PAD.encode(id))
    }
}

fn storage_err(action: &str, path: &Path, err: std::io::Error) -> Error {
    Error::Storage(format!("{} {}: {}", action, path.display(), err))
}

#[async_trait]
impl<V: StoredValue> KvStore<V> for FsStore<V> {
    async fn put(&self, owner_id: &str, id: &str, value: V) -> Result<()> {
        let dir = self.owner_dir(owner_id);
        tokio::fs::create_dir_all(&dir)
            .await
            .map_err(|e| storage_err("create owner dir", &dir, e))?;

        let path = self.entry_path(owner_id, id);
        let tmp = dir.join(format!(
            "{}.{}{}",
            URL_SAFE_NO_PAD.encode(id),
            uuid::Uuid::new_v4().simple(),
            TMP_SUFFIX
        ));
        let raw = value.encode()?;

        tokio::fs::write(&tmp, raw)
            .await
            .map_err(|e| storage_err("write", &tmp, e))?;
        tokio::fs::rename(&tmp, &path)
            .await
            .map_err(|e| storage_err("rename", &path, e))?;
        Ok(())
    }

    async fn get(&self, owner_id: &str, id: &str) -> Result<Option<V>> {
        let path = self.entry_path(owner_id, id);
        match tokio::fs::read(&path).await {
            Ok(raw) => V::decode(raw).map(Some),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(storage_err("read", &path, e)),
        }
    }

    async fn delete(&self, owner_id: &str, id: &str) -> Result<()> {
        let path = self.entry_path(owner_id, id);
        match tokio::fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(storage_err("delete", &path, e)),
        }
    }

    async fn query(&self, owner_id: &str) -> Result<Vec<V>> {
        let dir = self.owner_dir(owner_id);
        let mut entries = match tokio::fs::read_dir(&dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(storage_err("list", &dir, e)),
        };

        let mut paths = Vec::new();
        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| storage_err("list", &dir, e))?
        {
            let path = entry.path();
            let is_tmp = path
                .file_name()
                .and_then(|n| n.to_str())
                .map(|n| n.ends_with(TMP_SUFFIX))
                .unwrap_or(true);
            if !is_tmp {
                paths.push(path);
            }
        }
        paths.sort();

        let mut values = Vec::with_capacity(paths.len());
        for path in paths {
            match tokio::fs::read(&path).await {
                Ok(raw) => values.push(V::decode(raw)?),
                // Deleted between listing and reading
                Err(e) if e.kind() == ErrorKind::NotFound => continue,
                Err(e) => return Err(storage_err("read", &path, e)),
            }
        }
        Ok(values)
    }

    fn name(&self) -> &str {
        "fs"
    }
}
