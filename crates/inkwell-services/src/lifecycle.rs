//! Record lifecycle manager: visibility, access links, deletion, views.
//!
//! Every operation re-validates its target before acting, because buttons can
//! be pressed long after the underlying record is gone. Management operations
//! (revoke/restore/regenerate/delete) require the actor to be the record's
//! owner or an administrator.

use std::sync::Arc;

use inkwell_core::models::{Record, ServiceStats, User};
use inkwell_core::{Action, AppError};
use inkwell_db::{RecordStore, UserStore};
use inkwell_storage::{allocate_note_key, Storage};
use uuid::Uuid;

/// What a lifecycle operation produced; the webhook layer renders these.
#[derive(Debug)]
pub enum LifecycleOutcome {
    Revoked,
    Restored,
    Regenerated { url: String },
    Deleted,
    /// Access granted: the view was counted and the URL may be disclosed.
    Opened { title: String, url: String },
    Shared { title: String, link: String },
    /// The record exists but access is denied (revoked record, or a
    /// requester who never made first contact). No URL is disclosed.
    Unavailable,
    NotFound,
    NotOwner,
}

#[derive(Clone)]
pub struct RecordLifecycle {
    records: Arc<dyn RecordStore>,
    users: Arc<dyn UserStore>,
    storage: Arc<dyn Storage>,
    bot_username: String,
}

impl RecordLifecycle {
    pub fn new(
        records: Arc<dyn RecordStore>,
        users: Arc<dyn UserStore>,
        storage: Arc<dyn Storage>,
        bot_username: impl Into<String>,
    ) -> Self {
        Self {
            records,
            users,
            storage,
            bot_username: bot_username.into(),
        }
    }

    fn may_manage(actor: &User, record: &Record) -> bool {
        actor.id == record.owner_id || actor.is_admin
    }

    /// Load the record and check management rights; `Ok(Err(outcome))` short-
    /// circuits with NotFound/NotOwner.
    async fn managed_record(
        &self,
        actor: &User,
        id: Uuid,
    ) -> Result<Result<Record, LifecycleOutcome>, AppError> {
        match self.records.get(id).await? {
            None => Ok(Err(LifecycleOutcome::NotFound)),
            Some(record) if !Self::may_manage(actor, &record) => {
                tracing::warn!(
                    actor_id = actor.id,
                    record_id = %id,
                    "Management attempt by non-owner"
                );
                Ok(Err(LifecycleOutcome::NotOwner))
            }
            Some(record) => Ok(Ok(record)),
        }
    }

    /// Hide the record from consumers. Repeating on an already-revoked
    /// record is a harmless no-op.
    pub async fn revoke(&self, actor: &User, id: Uuid) -> Result<LifecycleOutcome, AppError> {
        if let Err(outcome) = self.managed_record(actor, id).await? {
            return Ok(outcome);
        }
        self.records.set_active(id, false).await?;
        tracing::info!(record_id = %id, actor_id = actor.id, "Record revoked");
        Ok(LifecycleOutcome::Revoked)
    }

    /// Make a revoked record visible again.
    pub async fn restore(&self, actor: &User, id: Uuid) -> Result<LifecycleOutcome, AppError> {
        if let Err(outcome) = self.managed_record(actor, id).await? {
            return Ok(outcome);
        }
        self.records.set_active(id, true).await?;
        tracing::info!(record_id = %id, actor_id = actor.id, "Record restored");
        Ok(LifecycleOutcome::Restored)
    }

    /// Allocate a fresh object key, copy (not move) the backing object, and
    /// point the record at it.
    ///
    /// Best-effort control, not a security boundary: the old object and its
    /// URL stay fetchable. Only `revoke` affects visibility.
    pub async fn regenerate_link(
        &self,
        actor: &User,
        id: Uuid,
    ) -> Result<LifecycleOutcome, AppError> {
        let record = match self.managed_record(actor, id).await? {
            Ok(record) => record,
            Err(outcome) => return Ok(outcome),
        };

        let new_key = allocate_note_key(&record.storage_key);
        let new_url = self
            .storage
            .copy(&record.storage_key, &new_key)
            .await
            .map_err(|e| AppError::Transfer(format!("object copy failed: {}", e)))?;

        if !self.records.update_content(id, &new_key, &new_url).await? {
            // Deleted between the read and the write; nothing to update.
            return Ok(LifecycleOutcome::NotFound);
        }

        tracing::info!(record_id = %id, new_key = %new_key, "Access link regenerated");
        Ok(LifecycleOutcome::Regenerated { url: new_url })
    }

    /// Remove the record. Metadata is authoritative: the row is deleted
    /// first, and a failed object delete is logged, not surfaced.
    pub async fn delete(&self, actor: &User, id: Uuid) -> Result<LifecycleOutcome, AppError> {
        if let Err(outcome) = self.managed_record(actor, id).await? {
            return Ok(outcome);
        }

        let Some(record) = self.records.delete(id).await? else {
            return Ok(LifecycleOutcome::NotFound);
        };

        if let Err(err) = self.storage.delete(&record.storage_key).await {
            tracing::warn!(
                record_id = %id,
                key = %record.storage_key,
                error = %err,
                "Backing object delete failed; metadata already removed"
            );
        }

        tracing::info!(record_id = %id, actor_id = actor.id, "Record deleted");
        Ok(LifecycleOutcome::Deleted)
    }

    /// Grant access to a record's content: requires the record to be active
    /// AND the requesting user to have made first contact. Only when both
    /// hold is the view counted and the URL disclosed.
    pub async fn open(&self, user_id: i64, id: Uuid) -> Result<LifecycleOutcome, AppError> {
        let started = self
            .users
            .get(user_id)
            .await?
            .map(|u| u.started)
            .unwrap_or(false);

        let Some(record) = self.records.get(id).await? else {
            return Ok(LifecycleOutcome::NotFound);
        };

        if !record.active || !started {
            tracing::debug!(
                record_id = %id,
                user_id,
                active = record.active,
                started,
                "Access denied"
            );
            return Ok(LifecycleOutcome::Unavailable);
        }

        self.records.increment_views(id).await?;
        Ok(LifecycleOutcome::Opened {
            title: record.title,
            url: record.content_url,
        })
    }

    /// Produce the shareable deep link for a record. Existence is
    /// re-validated; visibility is enforced later, at `open`.
    pub async fn share_link(&self, id: Uuid) -> Result<LifecycleOutcome, AppError> {
        let Some(record) = self.records.get(id).await? else {
            return Ok(LifecycleOutcome::NotFound);
        };

        let link = format!(
            "https://t.me/{}?start={}",
            self.bot_username,
            Action::Open(record.id)
        );
        Ok(LifecycleOutcome::Shared {
            title: record.title,
            link,
        })
    }

    /// All records for an owner, newest first.
    pub async fn records_for_owner(&self, owner_id: i64) -> Result<Vec<Record>, AppError> {
        self.records.list_by_owner(owner_id).await
    }

    /// Aggregate service counts for the status endpoint.
    pub async fn stats(&self) -> Result<ServiceStats, AppError> {
        self.records.stats().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use inkwell_db::{MemoryRecordStore, MemoryUserStore};
    use inkwell_storage::LocalStorage;
    use tempfile::TempDir;

    struct Fixture {
        lifecycle: RecordLifecycle,
        records: Arc<MemoryRecordStore>,
        users: Arc<MemoryUserStore>,
        storage: Arc<dyn Storage>,
        _dir: TempDir,
    }

    async fn fixture() -> Fixture {
        let users = Arc::new(MemoryUserStore::new());
        let records = Arc::new(MemoryRecordStore::with_user_counter(users.user_counter()));
        let dir = TempDir::new().unwrap();
        let storage: Arc<dyn Storage> = Arc::new(
            LocalStorage::new(dir.path(), "http://localhost:8080/files".to_string())
                .await
                .unwrap(),
        );
        let lifecycle = RecordLifecycle::new(
            records.clone(),
            users.clone(),
            storage.clone(),
            "inkwell_bot",
        );
        Fixture {
            lifecycle,
            records,
            users,
            storage,
            _dir: dir,
        }
    }

    async fn seed_record(fx: &Fixture, owner_id: i64) -> Record {
        let key = "notes/seeded.html";
        let url = fx
            .storage
            .put(key, bytes::Bytes::from_static(b"<html></html>"))
            .await
            .unwrap();
        let record = Record::new(owner_id, "Cell Biology", "Chapter 1", "natural", "medical", key, url);
        fx.records.create(&record).await.unwrap();
        record
    }

    async fn started_user(fx: &Fixture, id: i64, is_admin: bool) -> User {
        let user = fx.users.ensure(id, "Ada", is_admin).await.unwrap();
        fx.users.mark_started(id).await.unwrap();
        User {
            started: true,
            ..user
        }
    }

    #[tokio::test]
    async fn test_revoke_is_idempotent() {
        let fx = fixture().await;
        let owner = started_user(&fx, 7, false).await;
        let record = seed_record(&fx, 7).await;

        assert!(matches!(
            fx.lifecycle.revoke(&owner, record.id).await.unwrap(),
            LifecycleOutcome::Revoked
        ));
        // Second press of the same button: no error surfaced.
        assert!(matches!(
            fx.lifecycle.revoke(&owner, record.id).await.unwrap(),
            LifecycleOutcome::Revoked
        ));
        assert!(!fx.records.get(record.id).await.unwrap().unwrap().active);
    }

    #[tokio::test]
    async fn test_restore_reverses_revoke() {
        let fx = fixture().await;
        let owner = started_user(&fx, 7, false).await;
        let record = seed_record(&fx, 7).await;

        fx.lifecycle.revoke(&owner, record.id).await.unwrap();
        fx.lifecycle.restore(&owner, record.id).await.unwrap();
        assert!(fx.records.get(record.id).await.unwrap().unwrap().active);
    }

    #[tokio::test]
    async fn test_non_owner_cannot_manage() {
        let fx = fixture().await;
        let _owner = started_user(&fx, 7, false).await;
        let stranger = started_user(&fx, 8, false).await;
        let record = seed_record(&fx, 7).await;

        assert!(matches!(
            fx.lifecycle.revoke(&stranger, record.id).await.unwrap(),
            LifecycleOutcome::NotOwner
        ));
        assert!(fx.records.get(record.id).await.unwrap().unwrap().active);
    }

    #[tokio::test]
    async fn test_admin_may_manage_others_records() {
        let fx = fixture().await;
        let _owner = started_user(&fx, 7, false).await;
        let admin = started_user(&fx, 99, true).await;
        let record = seed_record(&fx, 7).await;

        assert!(matches!(
            fx.lifecycle.delete(&admin, record.id).await.unwrap(),
            LifecycleOutcome::Deleted
        ));
    }

    #[tokio::test]
    async fn test_regenerate_leaves_old_object_in_place() {
        let fx = fixture().await;
        let owner = started_user(&fx, 7, false).await;
        let record = seed_record(&fx, 7).await;
        let old_key = record.storage_key.clone();
        let old_url = record.content_url.clone();

        let outcome = fx.lifecycle.regenerate_link(&owner, record.id).await.unwrap();
        let LifecycleOutcome::Regenerated { url } = outcome else {
            panic!("expected regeneration, got {:?}", outcome);
        };
        assert_ne!(url, old_url);

        let updated = fx.records.get(record.id).await.unwrap().unwrap();
        assert_ne!(updated.storage_key, old_key);
        assert_eq!(updated.content_url, url);

        // Copy, not move: both objects exist, the old URL stays fetchable.
        assert!(fx.storage.exists(&old_key).await.unwrap());
        assert!(fx.storage.exists(&updated.storage_key).await.unwrap());
    }

    #[tokio::test]
    async fn test_delete_tolerates_missing_object() {
        let fx = fixture().await;
        let owner = started_user(&fx, 7, false).await;
        let record = seed_record(&fx, 7).await;
        fx.storage.delete(&record.storage_key).await.unwrap();

        // Object already gone: metadata delete still succeeds.
        assert!(matches!(
            fx.lifecycle.delete(&owner, record.id).await.unwrap(),
            LifecycleOutcome::Deleted
        ));
        assert!(fx.records.get(record.id).await.unwrap().is_none());

        // And deleting the already-deleted record reports NotFound, not an error.
        assert!(matches!(
            fx.lifecycle.delete(&owner, record.id).await.unwrap(),
            LifecycleOutcome::NotFound
        ));
    }

    #[tokio::test]
    async fn test_open_counts_views_and_discloses_url() {
        let fx = fixture().await;
        let _viewer = started_user(&fx, 8, false).await;
        let record = seed_record(&fx, 7).await;

        let outcome = fx.lifecycle.open(8, record.id).await.unwrap();
        let LifecycleOutcome::Opened { url, .. } = outcome else {
            panic!("expected access, got {:?}", outcome);
        };
        assert_eq!(url, record.content_url);
        assert_eq!(fx.records.get(record.id).await.unwrap().unwrap().views, 1);
    }

    #[tokio::test]
    async fn test_open_revoked_record_neither_counts_nor_discloses() {
        let fx = fixture().await;
        let owner = started_user(&fx, 7, false).await;
        let _viewer = started_user(&fx, 8, false).await;
        let record = seed_record(&fx, 7).await;
        fx.lifecycle.revoke(&owner, record.id).await.unwrap();

        assert!(matches!(
            fx.lifecycle.open(8, record.id).await.unwrap(),
            LifecycleOutcome::Unavailable
        ));
        assert_eq!(fx.records.get(record.id).await.unwrap().unwrap().views, 0);
    }

    #[tokio::test]
    async fn test_open_requires_first_contact() {
        let fx = fixture().await;
        let record = seed_record(&fx, 7).await;

        // User 8 exists but never sent /start.
        fx.users.ensure(8, "Eve", false).await.unwrap();
        assert!(matches!(
            fx.lifecycle.open(8, record.id).await.unwrap(),
            LifecycleOutcome::Unavailable
        ));

        // A completely unknown user is denied too.
        assert!(matches!(
            fx.lifecycle.open(9000, record.id).await.unwrap(),
            LifecycleOutcome::Unavailable
        ));
        assert_eq!(fx.records.get(record.id).await.unwrap().unwrap().views, 0);
    }

    #[tokio::test]
    async fn test_share_link_is_a_deep_link() {
        let fx = fixture().await;
        let record = seed_record(&fx, 7).await;

        let outcome = fx.lifecycle.share_link(record.id).await.unwrap();
        let LifecycleOutcome::Shared { link, .. } = outcome else {
            panic!("expected share link, got {:?}", outcome);
        };
        assert_eq!(
            link,
            format!("https://t.me/inkwell_bot?start=open_{}", record.id)
        );
    }

    #[tokio::test]
    async fn test_lifecycle_on_missing_record_reports_not_found() {
        let fx = fixture().await;
        let actor = started_user(&fx, 7, false).await;
        let ghost = Uuid::now_v7();

        assert!(matches!(
            fx.lifecycle.revoke(&actor, ghost).await.unwrap(),
            LifecycleOutcome::NotFound
        ));
        assert!(matches!(
            fx.lifecycle.open(7, ghost).await.unwrap(),
            LifecycleOutcome::NotFound
        ));
        assert!(matches!(
            fx.lifecycle.share_link(ghost).await.unwrap(),
            LifecycleOutcome::NotFound
        ));
    }

    #[tokio::test]
    async fn test_stats_aggregate() {
        let fx = fixture().await;
        let owner = started_user(&fx, 7, false).await;
        let first = seed_record(&fx, 7).await;
        std::thread::sleep(std::time::Duration::from_millis(2));
        let second = Record::new(7, "b", "d", "natural", "biology", "notes/b.html", "http://u/b");
        fx.records.create(&second).await.unwrap();

        fx.lifecycle.open(7, first.id).await.unwrap();
        fx.lifecycle.revoke(&owner, second.id).await.unwrap();

        let stats = fx.lifecycle.stats().await.unwrap();
        assert_eq!(stats.records, 2);
        assert_eq!(stats.active_records, 1);
        assert_eq!(stats.total_views, 1);
        assert_eq!(stats.users, 1);
    }
}
