//! Store contracts.
//!
//! All cross-event state goes through these traits so the same state-machine
//! logic runs against a durable store or an in-memory double. Backend
//! unavailability is reported to the caller as an `AppError`, never thrown
//! past it.

use async_trait::async_trait;
use inkwell_core::models::{Record, ServiceStats, SessionPatch, UploadSession, User};
use inkwell_core::AppError;
use uuid::Uuid;

/// Persistence of in-progress upload sessions, keyed by user identity.
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Merge-write upsert: `None` patch fields never clobber stored values.
    /// Repeating the same save is safe.
    async fn save(&self, user_id: i64, patch: SessionPatch) -> Result<(), AppError>;

    /// The user's current session, or `None`.
    async fn load(&self, user_id: i64) -> Result<Option<UploadSession>, AppError>;

    /// Remove any session for the user; a no-op when none exists.
    async fn delete(&self, user_id: i64) -> Result<(), AppError>;
}

/// Persistence of finalized records.
#[async_trait]
pub trait RecordStore: Send + Sync {
    async fn create(&self, record: &Record) -> Result<(), AppError>;

    async fn get(&self, id: Uuid) -> Result<Option<Record>, AppError>;

    /// All records for an owner, newest first.
    async fn list_by_owner(&self, owner_id: i64) -> Result<Vec<Record>, AppError>;

    /// Toggle visibility. Returns false when the record does not exist.
    async fn set_active(&self, id: Uuid, active: bool) -> Result<bool, AppError>;

    /// Point the record at a new backing object. Returns false when the
    /// record does not exist.
    async fn update_content(
        &self,
        id: Uuid,
        storage_key: &str,
        content_url: &str,
    ) -> Result<bool, AppError>;

    /// Remove the record, returning it so the caller can clean up the
    /// backing object. `None` when it was already gone.
    async fn delete(&self, id: Uuid) -> Result<Option<Record>, AppError>;

    /// Atomic view-count increment; a no-op when the record is gone.
    async fn increment_views(&self, id: Uuid) -> Result<(), AppError>;

    async fn stats(&self) -> Result<ServiceStats, AppError>;
}

/// Persistence of chat-platform users.
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Insert-or-refresh on contact: display name and admin flag follow the
    /// latest contact, `started` is left as it was.
    async fn ensure(&self, id: i64, display_name: &str, is_admin: bool)
        -> Result<User, AppError>;

    /// Mark explicit first contact. Never cleared.
    async fn mark_started(&self, id: i64) -> Result<(), AppError>;

    async fn get(&self, id: i64) -> Result<Option<User>, AppError>;
}
