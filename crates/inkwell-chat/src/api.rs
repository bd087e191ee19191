//! Outbound chat-platform contract.

use async_trait::async_trait;
use bytes::Bytes;
use thiserror::Error;

use crate::keyboard::InlineKeyboard;

/// Chat-platform operation errors. Network transport failures and
/// platform-reported failures are distinct so callers can phrase reports
/// accurately.
#[derive(Debug, Error)]
pub enum ChatError {
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Chat platform rejected the call: {0}")]
    Api(String),

    #[error("Malformed chat platform response: {0}")]
    Decode(String),

    #[error("Attachment has no retrievable file path")]
    MissingFilePath,
}

pub type ChatResult<T> = Result<T, ChatError>;

/// Everything the service needs from the chat platform.
///
/// Implemented by the HTTP client against the real platform and by scripted
/// doubles in tests.
#[async_trait]
pub trait ChatApi: Send + Sync {
    /// Send a plain text message to a chat.
    async fn send_message(&self, chat_id: i64, text: &str) -> ChatResult<()>;

    /// Send a text message with an inline keyboard attached.
    async fn send_message_with_keyboard(
        &self,
        chat_id: i64,
        text: &str,
        keyboard: &InlineKeyboard,
    ) -> ChatResult<()>;

    /// Acknowledge an interactive-control activation so the client stops
    /// showing its progress indicator.
    async fn answer_callback(&self, callback_id: &str) -> ChatResult<()>;

    /// Resolve an attachment reference and fetch its bytes in full.
    async fn fetch_attachment(&self, file_id: &str) -> ChatResult<Bytes>;
}
