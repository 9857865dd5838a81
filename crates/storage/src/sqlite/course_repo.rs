use chrono::Utc;
use lms_core::model::{Course, CourseDraft, CourseId};
use sqlx::Row;
use sqlx::sqlite::SqliteRow;

use super::SqliteRepository;
use crate::repository::{CourseRepository, StorageError};

fn ser<E: core::fmt::Display>(e: E) -> StorageError {
    StorageError::Serialization(e.to_string())
}

fn map_course_row(row: &SqliteRow) -> Result<Course, StorageError> {
    let body: String = row.try_get("body").map_err(ser)?;
    let draft: CourseDraft = serde_json::from_str(&body).map_err(ser)?;
    draft.validate().map_err(ser)
}

#[async_trait::async_trait]
impl CourseRepository for SqliteRepository {
    async fn get_course(&self, id: &CourseId) -> Result<Course, StorageError> {
        let row = sqlx::query("SELECT body FROM courses WHERE id = ?1")
            .bind(id.as_str())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| StorageError::Connection(e.to_string()))?;

        let Some(row) = row else {
            return Err(StorageError::NotFound);
        };
        map_course_row(&row)
    }

    async fn list_courses(&self) -> Result<Vec<Course>, StorageError> {
        let rows = sqlx::query("SELECT body FROM courses ORDER BY id ASC")
            .fetch_all(&self.pool)
            .await
            .map_err(|e| StorageError::Connection(e.to_string()))?;

        rows.iter().map(map_course_row).collect()
    }

    async fn upsert_course(&self, course: &Course) -> Result<(), StorageError> {
        let body = serde_json::to_string(&course.to_draft()).map_err(ser)?;

        sqlx::query(
            r"
            INSERT INTO courses (id, title, body, updated_at)
            VALUES (?1, ?2, ?3, ?4)
            ON CONFLICT(id) DO UPDATE SET
                title = excluded.title,
                body = excluded.body,
                updated_at = excluded.updated_at
            ",
        )
        .bind(course.id().as_str())
        .bind(course.title())
        .bind(body)
        .bind(Utc::now())
        .execute(&self.pool)
        .await
        .map_err(|e| StorageError::Connection(e.to_string()))?;

        Ok(())
    }
}
