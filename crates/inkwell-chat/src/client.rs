//! Bot-API-shaped HTTP client.
//!
//! Method calls go to `{base}/bot{token}/{method}` as JSON; attachment bytes
//! are fetched in two steps (resolve the temporary file path, then download
//! from `{base}/file/bot{token}/{path}`). The base URL is configurable so
//! tests can point the client at a local stub server.

use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::json;

use crate::api::{ChatApi, ChatError, ChatResult};
use crate::keyboard::InlineKeyboard;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Platform response envelope: `ok` plus either a result or a description.
#[derive(Debug, Deserialize)]
struct ApiResponse<T> {
    ok: bool,
    result: Option<T>,
    description: Option<String>,
}

#[derive(Debug, Deserialize)]
struct FileInfo {
    file_path: Option<String>,
}

/// Empty acknowledgement payload (sendMessage returns the sent message; we
/// only care that the call succeeded).
#[derive(Debug, Deserialize)]
struct Ignored {}

#[derive(Clone)]
pub struct BotClient {
    http: reqwest::Client,
    api_base: String,
    token: String,
}

impl BotClient {
    pub fn new(api_base: impl Into<String>, token: impl Into<String>) -> ChatResult<Self> {
        let http = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(ChatError::Network)?;
        Ok(BotClient {
            http,
            api_base: api_base.into().trim_end_matches('/').to_string(),
            token: token.into(),
        })
    }

    fn method_url(&self, method: &str) -> String {
        format!("{}/bot{}/{}", self.api_base, self.token, method)
    }

    fn file_url(&self, file_path: &str) -> String {
        format!("{}/file/bot{}/{}", self.api_base, self.token, file_path)
    }

    async fn call<T: DeserializeOwned>(
        &self,
        method: &str,
        payload: serde_json::Value,
    ) -> ChatResult<T> {
        let response = self
            .http
            .post(self.method_url(method))
            .json(&payload)
            .send()
            .await?;

        let status = response.status();
        let body: ApiResponse<T> = response
            .json()
            .await
            .map_err(|e| ChatError::Decode(format!("{} ({})", e, status)))?;

        if !body.ok {
            let description = body
                .description
                .unwrap_or_else(|| format!("status {}", status));
            tracing::warn!(method = %method, error = %description, "Chat API call failed");
            return Err(ChatError::Api(description));
        }

        body.result
            .ok_or_else(|| ChatError::Decode(format!("{}: ok response without result", method)))
    }
}

#[async_trait]
impl ChatApi for BotClient {
    async fn send_message(&self, chat_id: i64, text: &str) -> ChatResult<()> {
        self.call::<Ignored>("sendMessage", json!({ "chat_id": chat_id, "text": text }))
            .await?;
        Ok(())
    }

    async fn send_message_with_keyboard(
        &self,
        chat_id: i64,
        text: &str,
        keyboard: &InlineKeyboard,
    ) -> ChatResult<()> {
        self.call::<Ignored>(
            "sendMessage",
            json!({ "chat_id": chat_id, "text": text, "reply_markup": keyboard }),
        )
        .await?;
        Ok(())
    }

    async fn answer_callback(&self, callback_id: &str) -> ChatResult<()> {
        // answerCallbackQuery returns a bare boolean result.
        let _: bool = self
            .call(
                "answerCallbackQuery",
                json!({ "callback_query_id": callback_id }),
            )
            .await?;
        Ok(())
    }

    async fn fetch_attachment(&self, file_id: &str) -> ChatResult<Bytes> {
        let info: FileInfo = self
            .call("getFile", json!({ "file_id": file_id }))
            .await?;
        let file_path = info.file_path.ok_or(ChatError::MissingFilePath)?;

        let response = self.http.get(self.file_url(&file_path)).send().await?;
        if !response.status().is_success() {
            return Err(ChatError::Api(format!(
                "attachment download returned status {}",
                response.status()
            )));
        }

        let bytes = response.bytes().await?;
        tracing::debug!(
            file_id = %file_id,
            size_bytes = bytes.len(),
            "Attachment fetched"
        );
        Ok(bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_urls_are_shaped_like_the_platform() {
        let client = BotClient::new("https://api.example.org/", "123:abc").unwrap();
        assert_eq!(
            client.method_url("sendMessage"),
            "https://api.example.org/bot123:abc/sendMessage"
        );
        assert_eq!(
            client.file_url("documents/file_7.html"),
            "https://api.example.org/file/bot123:abc/documents/file_7.html"
        );
    }

    #[test]
    fn test_api_response_decoding() {
        let ok: ApiResponse<FileInfo> =
            serde_json::from_str(r#"{"ok":true,"result":{"file_path":"documents/f.html"}}"#)
                .unwrap();
        assert!(ok.ok);
        assert_eq!(
            ok.result.unwrap().file_path.as_deref(),
            Some("documents/f.html")
        );

        let err: ApiResponse<FileInfo> =
            serde_json::from_str(r#"{"ok":false,"description":"file is too big"}"#).unwrap();
        assert!(!err.ok);
        assert_eq!(err.description.as_deref(), Some("file is too big"));
    }
}
