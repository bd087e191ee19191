use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A chat-platform user known to the service.
///
/// `id` is the platform-assigned chat id. `started` records whether the user
/// has ever made explicit first contact (`/start`); record access is gated on
/// it. A user row is ensured on every inbound contact, but `started` is only
/// ever set, never cleared.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct User {
    pub id: i64,
    pub display_name: String,
    pub is_admin: bool,
    pub started: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    pub fn new(id: i64, display_name: impl Into<String>, is_admin: bool) -> Self {
        let now = Utc::now();
        User {
            id,
            display_name: display_name.into(),
            is_admin,
            started: false,
            created_at: now,
            updated_at: now,
        }
    }
}
