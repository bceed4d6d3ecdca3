//! Fragment data model
//!
//! Fragments are typed byte payloads owned by a single user. Metadata and
//! data live in separate storage namespaces and are always handled together.

pub mod entity;
pub mod media;

pub use entity::{Fragment, FragmentBuilder, FragmentList, NewFragment};
pub use media::{base_media_type, MediaType};
