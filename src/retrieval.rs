//! Retrieval of fragment content in a requested representation
//!
//! A requested identifier is `<id>` or `<id>.<ext>`. Without an extension
//! the stored bytes are returned with the fragment's own Content-Type;
//! with one, the conversion engine decides legality and produces the bytes.

use crate::convert;
use crate::error::{Error, Result};
use crate::fragment::Fragment;
use crate::storage::FragmentStore;
use bytes::Bytes;

/// Bytes and Content-Type ready to hand to a client
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Retrieved {
    pub bytes: Bytes,
    pub content_type: String,
}

/// Split `"<id>.<ext>"` into its base id and extension.
///
/// Only the first `.`-delimited suffix counts as the extension, and an
/// empty suffix means no extension: `"abc.md.html"` → `("abc", Some("md"))`,
/// `"abc."` → `("abc", None)`.
pub fn split_identifier(requested: &str) -> (&str, Option<&str>) {
    let mut parts = requested.split('.');
    let id = parts.next().unwrap_or_default();
    let ext = parts.next().filter(|ext| !ext.is_empty());
    (id, ext)
}

/// Resolves requested identifiers to content
#[derive(Clone)]
pub struct Retriever {
    store: FragmentStore,
}

impl Retriever {
    pub fn new(store: FragmentStore) -> Self {
        Self { store }
    }

    /// Load `(owner_id, requested)` and convert it if an extension was given
    pub async fn fetch(&self, owner_id: &str, requested: &str) -> Result<Retrieved> {
        let (id, ext) = split_identifier(requested);
        let fragment = Fragment::by_id(&self.store, owner_id, id).await?;
        if let Some(ext) = ext {
            if !fragment.supports_extension(ext) {
                return Err(Error::UnsupportedConversion(format!(
                    "{} fragments cannot be retrieved as .{} (supported: {})",
                    fragment.mime_type(),
                    ext,
                    fragment.media_type()?.extensions().join(", ")
                )));
            }
        }
        let data = fragment.get_data(&self.store).await?;

        let Some(ext) = ext else {
            return Ok(Retrieved {
                bytes: data,
                content_type: fragment.content_type,
            });
        };

        let converted = convert::convert(&data, fragment.media_type()?, ext)?;
        Ok(Retrieved {
            bytes: converted.bytes,
            content_type: converted.mime_type.to_string(),
        })
    }
}
