//! `blobcache` — an embedded, persistent key/value cache for blobs.
//!
//! A [`cache::Cache`] durably maps keys to values on top of a chosen storage
//! [`backend`] (SQLite-style relational file, or a memory-mapped transactional
//! engine). Values pass through a [`codecs`] transformer stack (bytes <->
//! user type) and an optional [`compressors`] layer with a mutable shared
//! dictionary.

#![warn(
    clippy::all,
    clippy::style,
)]

pub mod progress;
pub use crate::progress::ProgressReporter;

pub mod codecs;
pub use crate::codecs::Codec;
pub use crate::codecs::TransformerStack;

pub mod compressors;
pub use crate::compressors::Compressor;

pub mod backend;
pub use crate::backend::StorageBackend;

pub mod cache;
pub use crate::cache::Cache;
pub use crate::cache::Error;
pub use crate::cache::KeyType;
