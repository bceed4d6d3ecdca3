//! Storage backends for fragment metadata and data
//!
//! Two namespaces (metadata records and raw bytes) share one owner-scoped
//! `KvStore` contract with an in-memory and a file-backed implementation.

pub mod backend;
pub mod fragment_store;
pub mod fs;
pub mod memory;

pub use backend::{KvStore, StoredValue};
pub use fragment_store::FragmentStore;
pub use fs::FsStore;
pub use memory::MemoryStore;
