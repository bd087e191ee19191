use crate::traits::{Storage, StorageError, StorageResult};
use async_trait::async_trait;
use bytes::Bytes;
use inkwell_core::StorageBackend;
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::io::AsyncWriteExt;
use uuid::Uuid;

/// Local filesystem storage implementation
///
/// Objects are written to a temporary sibling file and renamed into place, so
/// a crash mid-write never leaves a partial object readable under its key.
#[derive(Clone)]
pub struct LocalStorage {
    base_path: PathBuf,
    base_url: String,
}

impl LocalStorage {
    /// Create a new LocalStorage instance
    ///
    /// # Arguments
    /// * `base_path` - Root directory for object storage (e.g., "/var/lib/inkwell/notes")
    /// * `base_url` - Base URL the objects are served from (e.g., "http://localhost:8080/files")
    pub async fn new(base_path: impl Into<PathBuf>, base_url: String) -> StorageResult<Self> {
        let base_path = base_path.into();

        fs::create_dir_all(&base_path).await.map_err(|e| {
            StorageError::ConfigError(format!(
                "Failed to create storage directory {}: {}",
                base_path.display(),
                e
            ))
        })?;

        Ok(LocalStorage {
            base_path,
            base_url,
        })
    }

    /// Convert storage key to filesystem path with traversal validation.
    fn key_to_path(&self, key: &str) -> StorageResult<PathBuf> {
        if key.contains("..") || key.starts_with('/') || key.is_empty() {
            return Err(StorageError::InvalidKey(
                "Storage key contains invalid characters".to_string(),
            ));
        }
        Ok(self.base_path.join(key))
    }

    fn generate_url(&self, key: &str) -> String {
        format!("{}/{}", self.base_url.trim_end_matches('/'), key)
    }

    async fn ensure_parent_dir(&self, path: &Path) -> StorageResult<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await?;
        }
        Ok(())
    }
}

#[async_trait]
impl Storage for LocalStorage {
    async fn put(&self, key: &str, data: Bytes) -> StorageResult<String> {
        let path = self.key_to_path(key)?;
        let size = data.len();

        self.ensure_parent_dir(&path).await?;

        let start = std::time::Instant::now();

        // Write to a temp sibling, fsync, then rename into place.
        let tmp_path = path.with_extension(format!("tmp-{}", Uuid::new_v4()));
        let mut file = fs::File::create(&tmp_path).await.map_err(|e| {
            StorageError::UploadFailed(format!(
                "Failed to create file {}: {}",
                tmp_path.display(),
                e
            ))
        })?;

        if let Err(e) = file.write_all(&data).await {
            let _ = fs::remove_file(&tmp_path).await;
            return Err(StorageError::UploadFailed(format!(
                "Failed to write file {}: {}",
                tmp_path.display(),
                e
            )));
        }

        if let Err(e) = file.sync_all().await {
            let _ = fs::remove_file(&tmp_path).await;
            return Err(StorageError::UploadFailed(format!(
                "Failed to sync file {}: {}",
                tmp_path.display(),
                e
            )));
        }
        drop(file);

        if let Err(e) = fs::rename(&tmp_path, &path).await {
            let _ = fs::remove_file(&tmp_path).await;
            return Err(StorageError::UploadFailed(format!(
                "Failed to finalize file {}: {}",
                path.display(),
                e
            )));
        }

        let url = self.generate_url(key);

        tracing::info!(
            path = %path.display(),
            key = %key,
            size_bytes = size,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Local storage upload successful"
        );

        Ok(url)
    }

    async fn copy(&self, from_key: &str, to_key: &str) -> StorageResult<String> {
        let from = self.key_to_path(from_key)?;
        let to = self.key_to_path(to_key)?;
        let start = std::time::Instant::now();

        if !fs::try_exists(&from).await.unwrap_or(false) {
            return Err(StorageError::NotFound(from_key.to_string()));
        }

        self.ensure_parent_dir(&to).await?;

        fs::copy(&from, &to)
            .await
            .map_err(|e| StorageError::CopyFailed(format!("{} -> {}: {}", from_key, to_key, e)))?;

        tracing::info!(
            from_key = %from_key,
            to_key = %to_key,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Local storage copy successful"
        );

        Ok(self.generate_url(to_key))
    }

    async fn delete(&self, key: &str) -> StorageResult<()> {
        let path = self.key_to_path(key)?;
        let start = std::time::Instant::now();

        if !fs::try_exists(&path).await.unwrap_or(false) {
            return Ok(());
        }

        fs::remove_file(&path).await.map_err(|e| {
            StorageError::DeleteFailed(format!("Failed to delete file {}: {}", path.display(), e))
        })?;

        tracing::info!(
            path = %path.display(),
            key = %key,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Local storage delete successful"
        );

        Ok(())
    }

    async fn exists(&self, key: &str) -> StorageResult<bool> {
        let path = self.key_to_path(key)?;
        Ok(fs::try_exists(&path).await.unwrap_or(false))
    }

    fn url_for(&self, key: &str) -> String {
        self.generate_url(key)
    }

    fn backend_type(&self) -> StorageBackend {
        StorageBackend::Local
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    async fn test_storage() -> (LocalStorage, TempDir) {
        let dir = TempDir::new().unwrap();
        let storage = LocalStorage::new(dir.path(), "http://localhost:8080/files".to_string())
            .await
            .unwrap();
        (storage, dir)
    }

    #[tokio::test]
    async fn test_put_then_exists_and_url() {
        let (storage, _dir) = test_storage().await;
        let url = storage
            .put("notes/abc.html", Bytes::from_static(b"<html></html>"))
            .await
            .unwrap();
        assert_eq!(url, "http://localhost:8080/files/notes/abc.html");
        assert!(storage.exists("notes/abc.html").await.unwrap());
        assert_eq!(storage.url_for("notes/abc.html"), url);
    }

    #[tokio::test]
    async fn test_copy_leaves_source_in_place() {
        let (storage, _dir) = test_storage().await;
        storage
            .put("notes/a.html", Bytes::from_static(b"x"))
            .await
            .unwrap();
        let url = storage.copy("notes/a.html", "notes/b.html").await.unwrap();
        assert!(url.ends_with("notes/b.html"));
        assert!(storage.exists("notes/a.html").await.unwrap());
        assert!(storage.exists("notes/b.html").await.unwrap());
    }

    #[tokio::test]
    async fn test_copy_missing_source_is_not_found() {
        let (storage, _dir) = test_storage().await;
        assert!(matches!(
            storage.copy("notes/missing.html", "notes/b.html").await,
            Err(StorageError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_delete_is_idempotent() {
        let (storage, _dir) = test_storage().await;
        storage
            .put("notes/gone.html", Bytes::from_static(b"x"))
            .await
            .unwrap();
        storage.delete("notes/gone.html").await.unwrap();
        // Second delete of a missing object is a no-op.
        storage.delete("notes/gone.html").await.unwrap();
        assert!(!storage.exists("notes/gone.html").await.unwrap());
    }

    #[tokio::test]
    async fn test_traversal_keys_are_rejected() {
        let (storage, _dir) = test_storage().await;
        assert!(matches!(
            storage.put("../escape.html", Bytes::from_static(b"x")).await,
            Err(StorageError::InvalidKey(_))
        ));
        assert!(matches!(
            storage.exists("/etc/passwd").await,
            Err(StorageError::InvalidKey(_))
        ));
    }

    #[tokio::test]
    async fn test_no_partial_object_after_put() {
        let (storage, dir) = test_storage().await;
        storage
            .put("notes/full.html", Bytes::from_static(b"payload"))
            .await
            .unwrap();
        // Only the finalized object remains; no temp files linger.
        let mut entries = tokio::fs::read_dir(dir.path().join("notes")).await.unwrap();
        let mut names = Vec::new();
        while let Some(entry) = entries.next_entry().await.unwrap() {
            names.push(entry.file_name().to_string_lossy().into_owned());
        }
        assert_eq!(names, vec!["full.html".to_string()]);
    }
}
