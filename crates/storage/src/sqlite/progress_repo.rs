use chrono::Utc;
use lms_core::model::CourseId;
use sqlx::Row;

use super::SqliteRepository;
use crate::repository::{ProgressRepository, StorageError, progress_key};

#[async_trait::async_trait]
impl ProgressRepository for SqliteRepository {
    async fn load_progress(&self, course_id: &CourseId) -> Result<Option<String>, StorageError> {
        let row = sqlx::query("SELECT value FROM progress_entries WHERE key = ?1")
            .bind(progress_key(course_id))
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| StorageError::Connection(e.to_string()))?;

        row.map(|r| {
            r.try_get::<String, _>("value")
                .map_err(|e| StorageError::Serialization(e.to_string()))
        })
        .transpose()
    }

    async fn save_progress(&self, course_id: &CourseId, blob: &str) -> Result<(), StorageError> {
        sqlx::query(
            r"
            INSERT INTO progress_entries (key, value, updated_at)
            VALUES (?1, ?2, ?3)
            ON CONFLICT(key) DO UPDATE SET
                value = excluded.value,
                updated_at = excluded.updated_at
            ",
        )
        .bind(progress_key(course_id))
        .bind(blob)
        .bind(Utc::now())
        .execute(&self.pool)
        .await
        .map_err(|e| StorageError::Connection(e.to_string()))?;

        Ok(())
    }
}
