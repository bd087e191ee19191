//! Storage abstraction trait
//!
//! This module defines the Storage trait that all storage backends must
//! implement. Documents in this system are small enough that whole-file
//! buffering is acceptable, so the surface is byte-oriented rather than
//! streaming.

use async_trait::async_trait;
use bytes::Bytes;
use inkwell_core::StorageBackend;
use thiserror::Error;

/// Storage operation errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Upload failed: {0}")]
    UploadFailed(String),

    #[error("Copy failed: {0}")]
    CopyFailed(String),

    #[error("Delete failed: {0}")]
    DeleteFailed(String),

    #[error("Object not found: {0}")]
    NotFound(String),

    #[error("Invalid storage key: {0}")]
    InvalidKey(String),

    #[error("Storage backend error: {0}")]
    BackendError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Storage abstraction trait
///
/// All storage backends (S3, local filesystem) implement this trait, so the
/// ingestion pipeline and lifecycle manager never couple to a backend.
///
/// Writes are atomic per object: a failed `put` must never leave a partial
/// object readable under its key.
#[async_trait]
pub trait Storage: Send + Sync {
    /// Write an object under `key` and return its long-lived public URL.
    async fn put(&self, key: &str, data: Bytes) -> StorageResult<String>;

    /// Copy an existing object to a new key, returning the new key's URL.
    /// The source object is left in place.
    async fn copy(&self, from_key: &str, to_key: &str) -> StorageResult<String>;

    /// Delete the object under `key`. Deleting a missing object is a no-op.
    async fn delete(&self, key: &str) -> StorageResult<()>;

    /// Whether an object exists under `key`.
    async fn exists(&self, key: &str) -> StorageResult<bool>;

    /// The public URL an object under `key` is (or would be) served from.
    fn url_for(&self, key: &str) -> String;

    /// Get the storage backend type
    fn backend_type(&self) -> StorageBackend;
}
