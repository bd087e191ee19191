//! In-memory store implementations.
//!
//! Selectable with `STORE_BACKEND=memory` for local development, and the test
//! double for every state-machine and handler test. State lives in
//! `RwLock`-guarded maps inside the store instance, never in the caller.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use inkwell_core::models::{Draft, Record, ServiceStats, SessionPatch, UploadSession, User};
use inkwell_core::AppError;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::traits::{RecordStore, SessionStore, UserStore};

#[derive(Clone, Default)]
pub struct MemorySessionStore {
    sessions: Arc<RwLock<HashMap<i64, UploadSession>>>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SessionStore for MemorySessionStore {
    async fn save(&self, user_id: i64, patch: SessionPatch) -> Result<(), AppError> {
        let mut sessions = self.sessions.write().await;
        let now = Utc::now();
        match sessions.get_mut(&user_id) {
            Some(session) => {
                session.state = patch.state;
                let draft = &mut session.draft;
                if patch.folder_id.is_some() {
                    draft.folder_id = patch.folder_id;
                }
                if patch.category_id.is_some() {
                    draft.category_id = patch.category_id;
                }
                if patch.title.is_some() {
                    draft.title = patch.title;
                }
                if patch.description.is_some() {
                    draft.description = patch.description;
                }
                session.updated_at = now;
            }
            None => {
                sessions.insert(
                    user_id,
                    UploadSession {
                        user_id,
                        state: patch.state,
                        draft: Draft {
                            folder_id: patch.folder_id,
                            category_id: patch.category_id,
                            title: patch.title,
                            description: patch.description,
                        },
                        created_at: now,
                        updated_at: now,
                    },
                );
            }
        }
        Ok(())
    }

    async fn load(&self, user_id: i64) -> Result<Option<UploadSession>, AppError> {
        Ok(self.sessions.read().await.get(&user_id).cloned())
    }

    async fn delete(&self, user_id: i64) -> Result<(), AppError> {
        self.sessions.write().await.remove(&user_id);
        Ok(())
    }
}

#[derive(Clone, Default)]
pub struct MemoryRecordStore {
    records: Arc<RwLock<HashMap<Uuid, Record>>>,
    user_count: Arc<RwLock<i64>>,
}

impl MemoryRecordStore {
    pub fn new() -> Self {
        Self::default()
    }
}

/// The stats query needs a user count; the memory backend wires the user
/// store's count in through this handle at setup time.
impl MemoryRecordStore {
    pub fn with_user_counter(user_count: Arc<RwLock<i64>>) -> Self {
        Self {
            records: Arc::default(),
            user_count,
        }
    }
}

#[async_trait]
impl RecordStore for MemoryRecordStore {
    async fn create(&self, record: &Record) -> Result<(), AppError> {
        self.records
            .write()
            .await
            .insert(record.id, record.clone());
        Ok(())
    }

    async fn get(&self, id: Uuid) -> Result<Option<Record>, AppError> {
        Ok(self.records.read().await.get(&id).cloned())
    }

    async fn list_by_owner(&self, owner_id: i64) -> Result<Vec<Record>, AppError> {
        let records = self.records.read().await;
        let mut owned: Vec<Record> = records
            .values()
            .filter(|r| r.owner_id == owner_id)
            .cloned()
            .collect();
        owned.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        Ok(owned)
    }

    async fn set_active(&self, id: Uuid, active: bool) -> Result<bool, AppError> {
        let mut records = self.records.write().await;
        match records.get_mut(&id) {
            Some(record) => {
                record.active = active;
                record.updated_at = Utc::now();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn update_content(
        &self,
        id: Uuid,
        storage_key: &str,
        content_url: &str,
    ) -> Result<bool, AppError> {
        let mut records = self.records.write().await;
        match records.get_mut(&id) {
            Some(record) => {
                record.storage_key = storage_key.to_string();
                record.content_url = content_url.to_string();
                record.updated_at = Utc::now();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn delete(&self, id: Uuid) -> Result<Option<Record>, AppError> {
        Ok(self.records.write().await.remove(&id))
    }

    async fn increment_views(&self, id: Uuid) -> Result<(), AppError> {
        if let Some(record) = self.records.write().await.get_mut(&id) {
            record.views += 1;
            record.updated_at = Utc::now();
        }
        Ok(())
    }

    async fn stats(&self) -> Result<ServiceStats, AppError> {
        let records = self.records.read().await;
        Ok(ServiceStats {
            records: records.len() as i64,
            active_records: records.values().filter(|r| r.active).count() as i64,
            users: *self.user_count.read().await,
            total_views: records.values().map(|r| r.views).sum(),
        })
    }
}

#[derive(Clone, Default)]
pub struct MemoryUserStore {
    users: Arc<RwLock<HashMap<i64, User>>>,
    count: Arc<RwLock<i64>>,
}

impl MemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Shared counter for `MemoryRecordStore::with_user_counter`.
    pub fn user_counter(&self) -> Arc<RwLock<i64>> {
        self.count.clone()
    }
}

#[async_trait]
impl UserStore for MemoryUserStore {
    async fn ensure(
        &self,
        id: i64,
        display_name: &str,
        is_admin: bool,
    ) -> Result<User, AppError> {
        let mut users = self.users.write().await;
        let user = match users.get_mut(&id) {
            Some(user) => {
                user.display_name = display_name.to_string();
                user.is_admin = is_admin;
                user.updated_at = Utc::now();
                user.clone()
            }
            None => {
                let user = User::new(id, display_name, is_admin);
                users.insert(id, user.clone());
                *self.count.write().await = users.len() as i64;
                user
            }
        };
        Ok(user)
    }

    async fn mark_started(&self, id: i64) -> Result<(), AppError> {
        if let Some(user) = self.users.write().await.get_mut(&id) {
            user.started = true;
            user.updated_at = Utc::now();
        }
        Ok(())
    }

    async fn get(&self, id: i64) -> Result<Option<User>, AppError> {
        Ok(self.users.read().await.get(&id).cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use inkwell_core::models::SessionState;

    #[tokio::test]
    async fn test_session_merge_write_keeps_earlier_fields() {
        let store = MemorySessionStore::new();
        let mut patch = SessionPatch::state(SessionState::AwaitingCategory);
        patch.folder_id = Some("natural".to_string());
        store.save(1, patch).await.unwrap();

        // Later step patches only state + title; the folder must survive.
        let mut patch = SessionPatch::state(SessionState::AwaitingDescription);
        patch.title = Some("Cell Biology".to_string());
        store.save(1, patch).await.unwrap();

        let session = store.load(1).await.unwrap().unwrap();
        assert_eq!(session.state, SessionState::AwaitingDescription);
        assert_eq!(session.draft.folder_id.as_deref(), Some("natural"));
        assert_eq!(session.draft.title.as_deref(), Some("Cell Biology"));
    }

    #[tokio::test]
    async fn test_session_delete_is_a_noop_when_absent() {
        let store = MemorySessionStore::new();
        store.delete(999).await.unwrap();
        assert!(store.load(999).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_record_views_increment_and_stats() {
        let users = MemoryUserStore::new();
        let store = MemoryRecordStore::with_user_counter(users.user_counter());
        users.ensure(7, "Ada", true).await.unwrap();

        let record = Record::new(7, "t", "d", "natural", "medical", "notes/k.html", "http://u");
        store.create(&record).await.unwrap();
        store.increment_views(record.id).await.unwrap();
        store.increment_views(record.id).await.unwrap();
        store.set_active(record.id, false).await.unwrap();

        let stats = store.stats().await.unwrap();
        assert_eq!(stats.records, 1);
        assert_eq!(stats.active_records, 0);
        assert_eq!(stats.users, 1);
        assert_eq!(stats.total_views, 2);
    }

    #[tokio::test]
    async fn test_list_by_owner_is_newest_first_and_isolated() {
        let store = MemoryRecordStore::new();
        let first = Record::new(7, "a", "d", "natural", "medical", "k1", "u1");
        std::thread::sleep(std::time::Duration::from_millis(2));
        let second = Record::new(7, "b", "d", "natural", "medical", "k2", "u2");
        let foreign = Record::new(8, "x", "d", "natural", "medical", "k3", "u3");
        store.create(&first).await.unwrap();
        store.create(&second).await.unwrap();
        store.create(&foreign).await.unwrap();

        let owned = store.list_by_owner(7).await.unwrap();
        assert_eq!(owned.len(), 2);
        assert_eq!(owned[0].id, second.id);
        assert_eq!(owned[1].id, first.id);
    }

    #[tokio::test]
    async fn test_ensure_refreshes_but_never_clears_started() {
        let users = MemoryUserStore::new();
        users.ensure(42, "Ada", false).await.unwrap();
        users.mark_started(42).await.unwrap();
        let user = users.ensure(42, "Ada L.", true).await.unwrap();
        assert_eq!(user.display_name, "Ada L.");
        assert!(user.is_admin);
        assert!(user.started);
    }
}
