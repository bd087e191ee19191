use async_trait::async_trait;
use inkwell_core::models::User;
use inkwell_core::AppError;
use sqlx::PgPool;

use crate::traits::UserStore;

#[derive(Clone)]
pub struct PgUserStore {
    pool: PgPool,
}

impl PgUserStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserStore for PgUserStore {
    async fn ensure(
        &self,
        id: i64,
        display_name: &str,
        is_admin: bool,
    ) -> Result<User, AppError> {
        sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (id, display_name, is_admin, started, created_at, updated_at)
            VALUES ($1, $2, $3, false, now(), now())
            ON CONFLICT (id) DO UPDATE SET
                display_name = EXCLUDED.display_name,
                is_admin = EXCLUDED.is_admin,
                updated_at = now()
            RETURNING id, display_name, is_admin, started, created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(display_name)
        .bind(is_admin)
        .fetch_one(&self.pool)
        .await
        .map_err(AppError::record_store)
    }

    async fn mark_started(&self, id: i64) -> Result<(), AppError> {
        sqlx::query("UPDATE users SET started = true, updated_at = now() WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(AppError::record_store)?;
        Ok(())
    }

    async fn get(&self, id: i64) -> Result<Option<User>, AppError> {
        sqlx::query_as::<_, User>(
            "SELECT id, display_name, is_admin, started, created_at, updated_at
             FROM users WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(AppError::record_store)
    }
}
