use std::str::FromStr;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use inkwell_core::models::{Draft, SessionPatch, SessionState, UploadSession};
use inkwell_core::AppError;
use sqlx::PgPool;

use crate::traits::SessionStore;

/// Flat row shape for `upload_sessions`; the state column is a string.
#[derive(Debug, sqlx::FromRow)]
struct SessionRow {
    user_id: i64,
    state: String,
    folder_id: Option<String>,
    category_id: Option<String>,
    title: Option<String>,
    description: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl SessionRow {
    fn into_session(self) -> Result<UploadSession, AppError> {
        let state = SessionState::from_str(&self.state)
            .map_err(|e| AppError::SessionStore(format!("corrupt session row: {}", e)))?;
        Ok(UploadSession {
            user_id: self.user_id,
            state,
            draft: Draft {
                folder_id: self.folder_id,
                category_id: self.category_id,
                title: self.title,
                description: self.description,
            },
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

#[derive(Clone)]
pub struct PgSessionStore {
    pool: PgPool,
}

impl PgSessionStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SessionStore for PgSessionStore {
    async fn save(&self, user_id: i64, patch: SessionPatch) -> Result<(), AppError> {
        // COALESCE keeps stored draft fields when the patch carries None, so
        // repeated or concurrent step writes never erase earlier answers.
        sqlx::query(
            r#"
            INSERT INTO upload_sessions
                (user_id, state, folder_id, category_id, title, description, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, now(), now())
            ON CONFLICT (user_id) DO UPDATE SET
                state = EXCLUDED.state,
                folder_id = COALESCE(EXCLUDED.folder_id, upload_sessions.folder_id),
                category_id = COALESCE(EXCLUDED.category_id, upload_sessions.category_id),
                title = COALESCE(EXCLUDED.title, upload_sessions.title),
                description = COALESCE(EXCLUDED.description, upload_sessions.description),
                updated_at = now()
            "#,
        )
        .bind(user_id)
        .bind(patch.state.as_str())
        .bind(&patch.folder_id)
        .bind(&patch.category_id)
        .bind(&patch.title)
        .bind(&patch.description)
        .execute(&self.pool)
        .await
        .map_err(AppError::session_store)?;

        Ok(())
    }

    async fn load(&self, user_id: i64) -> Result<Option<UploadSession>, AppError> {
        let row = sqlx::query_as::<_, SessionRow>(
            "SELECT user_id, state, folder_id, category_id, title, description, created_at, updated_at
             FROM upload_sessions WHERE user_id = $1",
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(AppError::session_store)?;

        row.map(SessionRow::into_session).transpose()
    }

    async fn delete(&self, user_id: i64) -> Result<(), AppError> {
        sqlx::query("DELETE FROM upload_sessions WHERE user_id = $1")
            .bind(user_id)
            .execute(&self.pool)
            .await
            .map_err(AppError::session_store)?;
        Ok(())
    }
}
