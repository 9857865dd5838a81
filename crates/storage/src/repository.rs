use async_trait::async_trait;
use lms_core::model::{Course, CourseId};
use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex};
use thiserror::Error;

/// Errors surfaced by storage adapters.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StorageError {
    #[error("not found")]
    NotFound,

    #[error("store is read-only")]
    ReadOnly,

    #[error("connection error: {0}")]
    Connection(String),

    #[error("io error: {0}")]
    Io(String),

    #[error("serialization error: {0}")]
    Serialization(String),
}

/// Storage key for a course's progress blob.
#[must_use]
pub fn progress_key(course_id: &CourseId) -> String {
    format!("aarong-lms:progress:{course_id}")
}

/// Key-value persistence for per-course progress blobs.
///
/// The value is opaque to storage: whatever JSON text the caller hands over
/// is returned verbatim.
#[async_trait]
pub trait ProgressRepository: Send + Sync {
    /// Fetch the stored blob for a course.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the backend cannot be read.
    async fn load_progress(&self, course_id: &CourseId) -> Result<Option<String>, StorageError>;

    /// Overwrite the stored blob for a course.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the backend cannot be written.
    async fn save_progress(&self, course_id: &CourseId, blob: &str) -> Result<(), StorageError>;
}

/// Read access to the static course catalogue.
#[async_trait]
pub trait CourseRepository: Send + Sync {
    /// Fetch a course by id.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::NotFound` if missing, or other storage errors.
    async fn get_course(&self, id: &CourseId) -> Result<Course, StorageError>;

    /// All courses, ordered by id.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the backend cannot be read.
    async fn list_courses(&self) -> Result<Vec<Course>, StorageError>;

    /// Persist or replace a course.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::ReadOnly` for file-backed catalogues, or other
    /// storage errors.
    async fn upsert_course(&self, course: &Course) -> Result<(), StorageError>;
}

/// Simple in-memory repository implementation for testing and prototyping.
#[derive(Clone, Default)]
pub struct InMemoryRepository {
    progress: Arc<Mutex<HashMap<String, String>>>,
    courses: Arc<Mutex<BTreeMap<CourseId, Course>>>,
}

impl InMemoryRepository {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_courses(courses: impl IntoIterator<Item = Course>) -> Self {
        let repo = Self::new();
        if let Ok(mut guard) = repo.courses.lock() {
            guard.extend(courses.into_iter().map(|c| (c.id().clone(), c)));
        }
        repo
    }
}

#[async_trait]
impl ProgressRepository for InMemoryRepository {
    async fn load_progress(&self, course_id: &CourseId) -> Result<Option<String>, StorageError> {
        let guard = self
            .progress
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        Ok(guard.get(&progress_key(course_id)).cloned())
    }

    async fn save_progress(&self, course_id: &CourseId, blob: &str) -> Result<(), StorageError> {
        let mut guard = self
            .progress
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        guard.insert(progress_key(course_id), blob.to_owned());
        Ok(())
    }
}

#[async_trait]
impl CourseRepository for InMemoryRepository {
    async fn get_course(&self, id: &CourseId) -> Result<Course, StorageError> {
        let guard = self
            .courses
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        guard.get(id).cloned().ok_or(StorageError::NotFound)
    }

    async fn list_courses(&self) -> Result<Vec<Course>, StorageError> {
        let guard = self
            .courses
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        Ok(guard.values().cloned().collect())
    }

    async fn upsert_course(&self, course: &Course) -> Result<(), StorageError> {
        let mut guard = self
            .courses
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        guard.insert(course.id().clone(), course.clone());
        Ok(())
    }
}

/// Aggregates progress and course repositories behind trait objects for easy
/// backend swapping.
#[derive(Clone)]
pub struct Storage {
    pub progress: Arc<dyn ProgressRepository>,
    pub courses: Arc<dyn CourseRepository>,
}

impl Storage {
    #[must_use]
    pub fn in_memory() -> Self {
        let repo = InMemoryRepository::new();
        Self {
            progress: Arc::new(repo.clone()),
            courses: Arc::new(repo),
        }
    }

    /// Replace the course catalogue, keeping the progress backend.
    #[must_use]
    pub fn with_courses(mut self, courses: Arc<dyn CourseRepository>) -> Self {
        self.courses = courses;
        self
    }
}
