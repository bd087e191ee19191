use async_trait::async_trait;
use inkwell_core::models::{Record, ServiceStats};
use inkwell_core::AppError;
use sqlx::PgPool;
use uuid::Uuid;

use crate::traits::RecordStore;

const RECORD_COLUMNS: &str = "id, owner_id, title, description, folder_id, category_id, \
     storage_key, content_url, active, views, created_at, updated_at";

#[derive(Clone)]
pub struct PgRecordStore {
    pool: PgPool,
}

impl PgRecordStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl RecordStore for PgRecordStore {
    async fn create(&self, record: &Record) -> Result<(), AppError> {
        sqlx::query(
            r#"
            INSERT INTO records
                (id, owner_id, title, description, folder_id, category_id,
                 storage_key, content_url, active, views, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
            "#,
        )
        .bind(record.id)
        .bind(record.owner_id)
        .bind(&record.title)
        .bind(&record.description)
        .bind(&record.folder_id)
        .bind(&record.category_id)
        .bind(&record.storage_key)
        .bind(&record.content_url)
        .bind(record.active)
        .bind(record.views)
        .bind(record.created_at)
        .bind(record.updated_at)
        .execute(&self.pool)
        .await
        .map_err(AppError::record_store)?;

        Ok(())
    }

    async fn get(&self, id: Uuid) -> Result<Option<Record>, AppError> {
        sqlx::query_as::<_, Record>(&format!(
            "SELECT {} FROM records WHERE id = $1",
            RECORD_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(AppError::record_store)
    }

    async fn list_by_owner(&self, owner_id: i64) -> Result<Vec<Record>, AppError> {
        sqlx::query_as::<_, Record>(&format!(
            "SELECT {} FROM records WHERE owner_id = $1 ORDER BY created_at DESC, id DESC",
            RECORD_COLUMNS
        ))
        .bind(owner_id)
        .fetch_all(&self.pool)
        .await
        .map_err(AppError::record_store)
    }

    async fn set_active(&self, id: Uuid, active: bool) -> Result<bool, AppError> {
        let result = sqlx::query(
            "UPDATE records SET active = $2, updated_at = now() WHERE id = $1",
        )
        .bind(id)
        .bind(active)
        .execute(&self.pool)
        .await
        .map_err(AppError::record_store)?;

        Ok(result.rows_affected() > 0)
    }

    async fn update_content(
        &self,
        id: Uuid,
        storage_key: &str,
        content_url: &str,
    ) -> Result<bool, AppError> {
        let result = sqlx::query(
            "UPDATE records SET storage_key = $2, content_url = $3, updated_at = now() WHERE id = $1",
        )
        .bind(id)
        .bind(storage_key)
        .bind(content_url)
        .execute(&self.pool)
        .await
        .map_err(AppError::record_store)?;

        Ok(result.rows_affected() > 0)
    }

    async fn delete(&self, id: Uuid) -> Result<Option<Record>, AppError> {
        sqlx::query_as::<_, Record>(&format!(
            "DELETE FROM records WHERE id = $1 RETURNING {}",
            RECORD_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(AppError::record_store)
    }

    async fn increment_views(&self, id: Uuid) -> Result<(), AppError> {
        // Atomic in the database; no read-modify-write cycle to race.
        sqlx::query("UPDATE records SET views = views + 1, updated_at = now() WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(AppError::record_store)?;
        Ok(())
    }

    async fn stats(&self) -> Result<ServiceStats, AppError> {
        sqlx::query_as::<_, ServiceStats>(
            r#"
            SELECT
                (SELECT COUNT(*) FROM records) AS records,
                (SELECT COUNT(*) FROM records WHERE active) AS active_records,
                (SELECT COUNT(*) FROM users) AS users,
                (SELECT COALESCE(SUM(views), 0)::BIGINT FROM records) AS total_views
            "#,
        )
        .fetch_one(&self.pool)
        .await
        .map_err(AppError::record_store)
    }
}
