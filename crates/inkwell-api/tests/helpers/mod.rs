//! Shared fixtures for webhook integration tests: an app wired to in-memory
//! stores, tempdir-backed local object storage, and a recording chat double.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum_test::TestServer;
use bytes::Bytes;
use inkwell_api::state::AppState;
use inkwell_api::setup::routes::build_router;
use inkwell_chat::{ChatApi, ChatError, ChatResult, InlineKeyboard};
use inkwell_core::{Config, StorageBackend, StoreBackend};
use inkwell_db::{MemoryRecordStore, MemorySessionStore, MemoryUserStore};
use inkwell_services::{ContentTransfer, RecordLifecycle, UploadFlow};
use inkwell_storage::{LocalStorage, Storage};
use serde_json::{json, Value};
use tempfile::TempDir;

pub const SECRET: &str = "test-secret";
pub const ADMIN_ID: i64 = 1;
pub const READER_ID: i64 = 2;

#[derive(Debug, Clone)]
pub struct SentMessage {
    pub chat_id: i64,
    pub text: String,
    pub keyboard: Option<InlineKeyboard>,
}

/// Chat double: records outbound messages, serves a configurable attachment.
pub struct RecordingChat {
    pub sent: Mutex<Vec<SentMessage>>,
    pub attachment: Mutex<Option<Bytes>>,
}

impl RecordingChat {
    pub fn new() -> Self {
        RecordingChat {
            sent: Mutex::new(Vec::new()),
            attachment: Mutex::new(Some(Bytes::from_static(b"<html>chapter one</html>"))),
        }
    }

    pub fn fail_attachments(&self) {
        *self.attachment.lock().unwrap() = None;
    }

    pub fn texts(&self) -> Vec<String> {
        self.sent.lock().unwrap().iter().map(|m| m.text.clone()).collect()
    }

    pub fn last_text(&self) -> String {
        self.texts().last().cloned().unwrap_or_default()
    }

    pub fn last_message(&self) -> SentMessage {
        self.sent.lock().unwrap().last().cloned().expect("no messages sent")
    }
}

#[async_trait]
impl ChatApi for RecordingChat {
    async fn send_message(&self, chat_id: i64, text: &str) -> ChatResult<()> {
        self.sent.lock().unwrap().push(SentMessage {
            chat_id,
            text: text.to_string(),
            keyboard: None,
        });
        Ok(())
    }

    async fn send_message_with_keyboard(
        &self,
        chat_id: i64,
        text: &str,
        keyboard: &InlineKeyboard,
    ) -> ChatResult<()> {
        self.sent.lock().unwrap().push(SentMessage {
            chat_id,
            text: text.to_string(),
            keyboard: Some(keyboard.clone()),
        });
        Ok(())
    }

    async fn answer_callback(&self, _callback_id: &str) -> ChatResult<()> {
        Ok(())
    }

    async fn fetch_attachment(&self, _file_id: &str) -> ChatResult<Bytes> {
        self.attachment
            .lock()
            .unwrap()
            .clone()
            .ok_or_else(|| ChatError::Api("file is unavailable".to_string()))
    }
}

pub struct TestApp {
    pub server: TestServer,
    pub chat: Arc<RecordingChat>,
    pub users: Arc<MemoryUserStore>,
    pub sessions: Arc<MemorySessionStore>,
    pub records: Arc<MemoryRecordStore>,
    pub storage: Arc<dyn Storage>,
    pub _temp_dir: TempDir,
}

fn test_config() -> Config {
    Config {
        environment: "test".to_string(),
        server_port: 0,
        store_backend: StoreBackend::Memory,
        database_url: None,
        db_max_connections: 5,
        db_timeout_seconds: 5,
        storage_backend: StorageBackend::Local,
        s3_bucket: None,
        s3_region: None,
        s3_endpoint: None,
        local_storage_path: None,
        local_storage_base_url: None,
        bot_token: "123:test".to_string(),
        bot_username: "inkwell_bot".to_string(),
        chat_api_base: "http://localhost:0".to_string(),
        webhook_secret: SECRET.to_string(),
        admin_chat_ids: vec![ADMIN_ID],
        session_ttl_minutes: 30,
    }
}

/// Assemble the app against in-memory stores and a recording chat double.
pub async fn setup_test_app() -> TestApp {
    let config = test_config();

    let temp_dir = TempDir::new().expect("temp dir");
    let storage: Arc<dyn Storage> = Arc::new(
        LocalStorage::new(temp_dir.path(), "http://localhost:8080/files".to_string())
            .await
            .expect("local storage"),
    );

    let users = Arc::new(MemoryUserStore::new());
    let sessions = Arc::new(MemorySessionStore::new());
    let records = Arc::new(MemoryRecordStore::with_user_counter(users.user_counter()));
    let chat = Arc::new(RecordingChat::new());

    let transfer = ContentTransfer::new(chat.clone(), storage.clone());
    let flow = UploadFlow::new(
        sessions.clone(),
        records.clone(),
        transfer,
        config.session_ttl(),
    );
    let lifecycle = RecordLifecycle::new(
        records.clone(),
        users.clone(),
        storage.clone(),
        config.bot_username.clone(),
    );

    let state = Arc::new(AppState {
        config,
        users: users.clone(),
        chat: chat.clone(),
        flow,
        lifecycle,
    });

    let server = TestServer::new(build_router(state)).expect("test server");

    TestApp {
        server,
        chat,
        users,
        sessions,
        records,
        storage,
        _temp_dir: temp_dir,
    }
}

static UPDATE_SEQ: Mutex<i64> = Mutex::new(0);

fn next_update_id() -> i64 {
    let mut seq = UPDATE_SEQ.lock().unwrap();
    *seq += 1;
    *seq
}

pub fn text_update(user_id: i64, text: &str) -> Value {
    json!({
        "update_id": next_update_id(),
        "message": {
            "message_id": next_update_id(),
            "from": {"id": user_id, "first_name": "Ada"},
            "chat": {"id": user_id},
            "text": text
        }
    })
}

pub fn document_update(user_id: i64, file_name: &str) -> Value {
    json!({
        "update_id": next_update_id(),
        "message": {
            "message_id": next_update_id(),
            "from": {"id": user_id, "first_name": "Ada"},
            "chat": {"id": user_id},
            "document": {
                "file_id": format!("file-{}", next_update_id()),
                "file_name": file_name,
                "file_size": 200,
                "mime_type": "text/html"
            }
        }
    })
}

pub fn callback_update(user_id: i64, data: &str) -> Value {
    json!({
        "update_id": next_update_id(),
        "callback_query": {
            "id": format!("cb-{}", next_update_id()),
            "from": {"id": user_id, "first_name": "Ada"},
            "message": {
                "message_id": next_update_id(),
                "chat": {"id": user_id}
            },
            "data": data
        }
    })
}

impl TestApp {
    /// POST an update to the webhook with the right secret; asserts 200.
    pub async fn deliver(&self, update: Value) {
        let response = self
            .server
            .post(&format!("/webhook/{}", SECRET))
            .json(&update)
            .await;
        response.assert_status_ok();
    }

    /// Walk an admin through the dialogue up to `awaiting_file`.
    pub async fn walk_to_awaiting_file(&self) {
        self.deliver(text_update(ADMIN_ID, "/start")).await;
        self.deliver(text_update(ADMIN_ID, "/upload")).await;
        self.deliver(callback_update(ADMIN_ID, "folder_natural")).await;
        self.deliver(callback_update(ADMIN_ID, "category_medical")).await;
        self.deliver(text_update(ADMIN_ID, "Cell Biology")).await;
        self.deliver(text_update(ADMIN_ID, "Chapter 1")).await;
    }
}
