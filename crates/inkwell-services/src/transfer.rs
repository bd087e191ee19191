//! Content transfer: attachment bytes from the chat platform into durable
//! object storage.
//!
//! The two external boundaries fail independently and are reported as
//! distinct variants so callers can phrase the failure precisely. Documents
//! in this system are small; the whole file is buffered, no streaming.

use std::sync::Arc;

use inkwell_chat::{ChatApi, ChatError, DocumentAttachment};
use inkwell_core::AppError;
use inkwell_storage::{allocate_note_key, Storage, StorageError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum TransferError {
    #[error("attachment fetch failed: {0}")]
    Fetch(#[source] ChatError),

    #[error("object write failed: {0}")]
    Store(#[source] StorageError),
}

impl From<TransferError> for AppError {
    fn from(err: TransferError) -> Self {
        AppError::Transfer(err.to_string())
    }
}

/// Location of a successfully ingested document.
#[derive(Debug, Clone)]
pub struct StoredContent {
    pub key: String,
    pub url: String,
}

#[derive(Clone)]
pub struct ContentTransfer {
    chat: Arc<dyn ChatApi>,
    storage: Arc<dyn Storage>,
}

impl ContentTransfer {
    pub fn new(chat: Arc<dyn ChatApi>, storage: Arc<dyn Storage>) -> Self {
        Self { chat, storage }
    }

    /// Fetch the attachment in full and write it under a freshly allocated
    /// key. The storage backends guarantee no partially written object is
    /// ever readable, so a `Store` failure leaves nothing behind.
    pub async fn transfer(
        &self,
        attachment: &DocumentAttachment,
    ) -> Result<StoredContent, TransferError> {
        let bytes = self
            .chat
            .fetch_attachment(&attachment.file_id)
            .await
            .map_err(TransferError::Fetch)?;

        let size = bytes.len();
        let filename = attachment.file_name.as_deref().unwrap_or("note.html");
        let key = allocate_note_key(filename);

        let url = self
            .storage
            .put(&key, bytes)
            .await
            .map_err(TransferError::Store)?;

        tracing::info!(
            file_id = %attachment.file_id,
            key = %key,
            size_bytes = size,
            "Attachment ingested into object storage"
        );

        Ok(StoredContent { key, url })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use bytes::Bytes;
    use inkwell_chat::{ChatResult, InlineKeyboard};
    use inkwell_storage::LocalStorage;
    use tempfile::TempDir;

    struct StubChat {
        payload: Option<Bytes>,
    }

    #[async_trait]
    impl ChatApi for StubChat {
        async fn send_message(&self, _chat_id: i64, _text: &str) -> ChatResult<()> {
            Ok(())
        }

        async fn send_message_with_keyboard(
            &self,
            _chat_id: i64,
            _text: &str,
            _keyboard: &InlineKeyboard,
        ) -> ChatResult<()> {
            Ok(())
        }

        async fn answer_callback(&self, _callback_id: &str) -> ChatResult<()> {
            Ok(())
        }

        async fn fetch_attachment(&self, _file_id: &str) -> ChatResult<Bytes> {
            self.payload
                .clone()
                .ok_or_else(|| ChatError::Api("file is unavailable".to_string()))
        }
    }

    fn attachment() -> DocumentAttachment {
        DocumentAttachment {
            file_id: "file-1".to_string(),
            file_name: Some("notes.html".to_string()),
            file_size: Some(200),
            mime_type: Some("text/html".to_string()),
        }
    }

    async fn local_storage() -> (Arc<dyn Storage>, TempDir) {
        let dir = TempDir::new().unwrap();
        let storage = LocalStorage::new(dir.path(), "http://localhost:8080/files".to_string())
            .await
            .unwrap();
        (Arc::new(storage), dir)
    }

    #[tokio::test]
    async fn test_transfer_writes_under_notes_prefix() {
        let (storage, _dir) = local_storage().await;
        let chat = Arc::new(StubChat {
            payload: Some(Bytes::from_static(b"<html>cells</html>")),
        });
        let transfer = ContentTransfer::new(chat, storage.clone());

        let stored = transfer.transfer(&attachment()).await.unwrap();
        assert!(stored.key.starts_with("notes/"));
        assert!(stored.key.ends_with(".html"));
        assert!(stored.url.ends_with(&stored.key));
        assert!(storage.exists(&stored.key).await.unwrap());
    }

    #[tokio::test]
    async fn test_fetch_failure_is_distinct() {
        let (storage, _dir) = local_storage().await;
        let chat = Arc::new(StubChat { payload: None });
        let transfer = ContentTransfer::new(chat, storage);

        let err = transfer.transfer(&attachment()).await.unwrap_err();
        assert!(matches!(err, TransferError::Fetch(_)));
        assert!(err.to_string().contains("attachment fetch failed"));
    }
}
