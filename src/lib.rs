//! Fragments - typed content storage with on-demand format conversion
//!
//! Fragments stores small pieces of content (text, structured data, images)
//! per owner, and hands them back either as stored or converted to another
//! representation chosen by a file extension on the identifier.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                    HTTP API (/v1/fragments)                  │
//! │        Basic auth → owner id, JSON envelopes, status map     │
//! └──────────────┬───────────────────────────────┬──────────────┘
//!                │                               │
//! ┌──────────────▼──────────────┐  ┌─────────────▼──────────────┐
//! │      Fragment entity        │  │   Retrieval orchestrator   │
//! │  - validated construction   │  │  - split `<id>.<ext>`      │
//! │  - data / metadata writes   │  │  - native or converted     │
//! └──────────────┬──────────────┘  └─────────────┬──────────────┘
//!                │                               │
//! ┌──────────────▼──────────────┐  ┌─────────────▼──────────────┐
//! │        Fragment store       │  │     Conversion engine      │
//! │  metadata + data namespaces │  │  (type, ext) → transformer │
//! │  memory or filesystem       │  │  text, json/yaml, images   │
//! └─────────────────────────────┘  └────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`api`]: axum router, authentication and response envelopes
//! - [`fragment`]: media types and the fragment entity
//! - [`storage`]: key-value backends and the two-namespace fragment store
//! - [`convert`]: conversion table and transformers
//! - [`retrieval`]: identifier resolution and conversion dispatch
//! - [`config`]: configuration management

pub mod api;
pub mod config;
pub mod convert;
pub mod error;
pub mod fragment;
pub mod retrieval;
pub mod storage;

pub use config::FragmentsConfig;
pub use error::{Error, Result};
pub use fragment::{Fragment, FragmentBuilder, MediaType};
pub use retrieval::{Retrieved, Retriever};
pub use storage::FragmentStore;
