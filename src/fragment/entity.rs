//! Fragment entity
//!
//! A fragment is an owned, typed unit of content: a metadata record plus a
//! byte payload stored under the same `(owner_id, id)` key. `size` always
//! mirrors the byte length of the stored payload because it is recomputed on
//! every data write.

use super::media::{base_media_type, MediaType};
use crate::convert;
use crate::error::{Error, Result};
use crate::storage::FragmentStore;
use bytes::Bytes;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Fragment metadata record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Fragment {
    /// Unique fragment identifier
    pub id: String,
    /// Owner the fragment belongs to
    pub owner_id: String,
    /// Creation timestamp
    pub created: DateTime<Utc>,
    /// Last metadata or data write
    pub updated: DateTime<Utc>,
    /// Full Content-Type, parameters included
    #[serde(rename = "type")]
    pub content_type: String,
    /// Byte length of the stored payload
    pub size: u64,
}

/// Boundary input for creating a fragment
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewFragment {
    pub owner_id: Option<String>,
    #[serde(rename = "type")]
    pub content_type: Option<String>,
    /// Raw JSON value; anything but an integer is rejected on build
    pub size: Option<serde_json::Value>,
}

impl NewFragment {
    /// Decode a JSON boundary input; malformed input is a validation error
    pub fn from_json(raw: &[u8]) -> Result<Self> {
        serde_json::from_slice(raw)
            .map_err(|e| Error::Validation(format!("invalid fragment input: {}", e)))
    }

    /// Validate and build a fragment candidate
    pub fn into_fragment(self) -> Result<Fragment> {
        let mut builder = FragmentBuilder::new();
        if let Some(owner_id) = self.owner_id {
            builder = builder.owner_id(owner_id);
        }
        if let Some(content_type) = self.content_type {
            builder = builder.content_type(content_type);
        }
        match self.size {
            None | Some(serde_json::Value::Null) => {}
            Some(value) => {
                let size = value.as_i64().ok_or_else(|| {
                    Error::Validation(format!("size must be a number, got size={}", value))
                })?;
                builder = builder.size(size);
            }
        }
        builder.build()
    }
}

/// Fragment listing, either bare ids or full records
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum FragmentList {
    Ids(Vec<String>),
    Expanded(Vec<Fragment>),
}

impl FragmentList {
    pub fn len(&self) -> usize {
        match self {
            FragmentList::Ids(ids) => ids.len(),
            FragmentList::Expanded(records) => records.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Fragment {
    /// Load a fragment's metadata
    pub async fn by_id(store: &FragmentStore, owner_id: &str, id: &str) -> Result<Fragment> {
        store.read_fragment(owner_id, id).await?.ok_or_else(|| {
            Error::NotFound(format!(
                "Could not find any fragment for {} and {}",
                owner_id, id
            ))
        })
    }

    /// List an owner's fragments
    pub async fn by_owner(
        store: &FragmentStore,
        owner_id: &str,
        expand: bool,
    ) -> Result<FragmentList> {
        store.list_fragments(owner_id, expand).await
    }

    /// Delete a fragment's metadata and data
    pub async fn delete(store: &FragmentStore, owner_id: &str, id: &str) -> Result<()> {
        store.delete_fragment(owner_id, id).await?;
        tracing::debug!(owner_id, id, "Deleted fragment");
        Ok(())
    }

    /// Refresh `updated` and persist the metadata record
    pub async fn save(&mut self, store: &FragmentStore) -> Result<()> {
        self.updated = Utc::now();
        store.write_fragment(self).await
    }

    /// Replace the fragment's payload and persist the new size
    pub async fn set_data(&mut self, store: &FragmentStore, data: Bytes) -> Result<()> {
        if data.is_empty() {
            return Err(Error::Validation(
                "Cannot set empty data for fragment".to_string(),
            ));
        }
        let size = data.len() as u64;
        store
            .write_fragment_data(&self.owner_id, &self.id, data)
            .await?;
        self.size = size;
        tracing::debug!(owner_id = %self.owner_id, id = %self.id, size, "Stored fragment data");
        self.save(store).await
    }

    /// Replace the payload of an existing fragment.
    ///
    /// The base type of `content_type` must match the fragment's own; a
    /// fragment never changes type after creation.
    pub async fn replace_data(
        &mut self,
        store: &FragmentStore,
        content_type: &str,
        data: Bytes,
    ) -> Result<()> {
        if base_media_type(content_type) != self.mime_type() {
            return Err(Error::Validation(
                "cannot change the type of a fragment".to_string(),
            ));
        }
        self.set_data(store, data).await
    }

    /// Read the fragment's payload
    pub async fn get_data(&self, store: &FragmentStore) -> Result<Bytes> {
        store
            .read_fragment_data(&self.owner_id, &self.id)
            .await?
            .ok_or_else(|| {
                Error::NotFound(format!(
                    "No data found for {} and {}",
                    self.owner_id, self.id
                ))
            })
    }

    /// Content type without parameters: `"text/html; charset=utf-8"` → `"text/html"`
    pub fn mime_type(&self) -> String {
        base_media_type(&self.content_type)
    }

    /// Parsed base media type
    pub fn media_type(&self) -> Result<MediaType> {
        MediaType::parse(&self.content_type)
    }

    /// True if the fragment is a `text/*` type
    pub fn is_text(&self) -> bool {
        self.mime_type().starts_with("text/")
    }

    /// Mime types this fragment can be retrieved as
    pub fn formats(&self) -> Vec<&'static str> {
        self.media_type().map(|t| t.formats()).unwrap_or_default()
    }

    /// Whether `ext` names a legal representation of this fragment
    pub fn supports_extension(&self, ext: &str) -> bool {
        self.media_type()
            .map(|t| convert::find_rule(t, ext).is_some())
            .unwrap_or(false)
    }
}

/// Builder for constructing validated `Fragment` instances
#[derive(Debug, Default)]
pub struct FragmentBuilder {
    id: Option<String>,
    owner_id: Option<String>,
    content_type: Option<String>,
    size: Option<i64>,
    created: Option<DateTime<Utc>>,
    updated: Option<DateTime<Utc>>,
}

impl FragmentBuilder {
    /// Create an empty builder
    pub fn new() -> Self {
        Self::default()
    }

    /// Use an existing id instead of generating one
    pub fn id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    /// Set the owner (required)
    pub fn owner_id(mut self, owner_id: impl Into<String>) -> Self {
        self.owner_id = Some(owner_id.into());
        self
    }

    /// Set the Content-Type (required)
    pub fn content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = Some(content_type.into());
        self
    }

    /// Set the initial size (must be non-negative)
    pub fn size(mut self, size: i64) -> Self {
        self.size = Some(size);
        self
    }

    /// Set the creation timestamp
    pub fn created(mut self, created: DateTime<Utc>) -> Self {
        self.created = Some(created);
        self
    }

    /// Set the last-updated timestamp
    pub fn updated(mut self, updated: DateTime<Utc>) -> Self {
        self.updated = Some(updated);
        self
    }

    /// Validate and build the fragment
    pub fn build(self) -> Result<Fragment> {
        let owner_id = self.owner_id.filter(|o| !o.is_empty());
        let content_type = self.content_type.filter(|t| !t.trim().is_empty());
        let (owner_id, content_type) = match (owner_id, content_type) {
            (Some(owner_id), Some(content_type)) => (owner_id, content_type),
            (owner_id, content_type) => {
                return Err(Error::Validation(format!(
                    "ownerId and type required, got ownerId={:?}, type={:?}",
                    owner_id, content_type
                )))
            }
        };

        let size = self.size.unwrap_or(0);
        if size < 0 {
            return Err(Error::Validation(format!(
                "size cannot be negative, got size={}",
                size
            )));
        }

        MediaType::parse(&content_type)?;

        let now = Utc::now();
        Ok(Fragment {
            id: self
                .id
                .filter(|id| !id.is_empty())
                .unwrap_or_else(|| Uuid::new_v4().to_string()),
            owner_id,
            created: self.created.unwrap_or(now),
            updated: self.updated.unwrap_or(now),
            content_type,
            size: size as u64,
        })
    }
}
