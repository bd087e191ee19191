use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A finalized, persisted unit of content.
///
/// Ids are UUIDv7: time-ordered and practically globally unique without a
/// coordination step, so newest-first listings can sort by id or timestamp
/// interchangeably. `storage_key` is the backing object's location inside the
/// object store; `content_url` is the long-lived retrieval URL handed to
/// consumers.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Record {
    pub id: Uuid,
    pub owner_id: i64,
    pub title: String,
    pub description: String,
    pub folder_id: String,
    pub category_id: String,
    pub storage_key: String,
    pub content_url: String,
    pub active: bool,
    pub views: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Record {
    /// Construct a fresh record: active, zero views, time-ordered id.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        owner_id: i64,
        title: impl Into<String>,
        description: impl Into<String>,
        folder_id: impl Into<String>,
        category_id: impl Into<String>,
        storage_key: impl Into<String>,
        content_url: impl Into<String>,
    ) -> Self {
        let now = Utc::now();
        Record {
            id: Uuid::now_v7(),
            owner_id,
            title: title.into(),
            description: description.into(),
            folder_id: folder_id.into(),
            category_id: category_id.into(),
            storage_key: storage_key.into(),
            content_url: content_url.into(),
            active: true,
            views: 0,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Consumer-facing projection of a record.
#[derive(Debug, Serialize, Deserialize)]
pub struct RecordResponse {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub folder_id: String,
    pub category_id: String,
    pub active: bool,
    pub views: i64,
    pub created_at: DateTime<Utc>,
}

impl From<Record> for RecordResponse {
    fn from(record: Record) -> Self {
        RecordResponse {
            id: record.id,
            title: record.title,
            description: record.description,
            folder_id: record.folder_id,
            category_id: record.category_id,
            active: record.active,
            views: record.views,
            created_at: record.created_at,
        }
    }
}

/// Aggregate counts served by the status endpoint.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, sqlx::FromRow)]
pub struct ServiceStats {
    pub records: i64,
    pub active_records: i64,
    pub users: i64,
    pub total_views: i64,
}
