//! Object-storage abstraction for ingested documents.
//!
//! This crate provides the Storage trait and implementations for S3 and the
//! local filesystem.
//!
//! # Storage key format
//!
//! All ingested documents live under the fixed `notes/` namespace prefix:
//! `notes/{uuidv7}{ext}`. Keys must not contain `..` or a leading `/`. Key
//! allocation is centralized in the `keys` module so all backends stay
//! consistent.

pub mod factory;
pub mod keys;
pub mod local;
pub mod s3;
pub mod traits;

// Re-export commonly used types
pub use factory::create_storage;
pub use inkwell_core::StorageBackend;
pub use keys::allocate_note_key;
pub use local::LocalStorage;
pub use s3::S3Storage;
pub use traits::{Storage, StorageError, StorageResult};
