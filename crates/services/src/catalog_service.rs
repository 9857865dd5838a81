use std::sync::Arc;

use lms_core::model::{Course, CourseId};
use storage::repository::{CourseRepository, StorageError};
use tracing::info;

use crate::error::CatalogServiceError;

/// One row of the course listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CourseSummary {
    pub id: CourseId,
    pub title: String,
    pub module_count: usize,
    pub lesson_count: usize,
}

impl CourseSummary {
    #[must_use]
    pub fn from_course(course: &Course) -> Self {
        Self {
            id: course.id().clone(),
            title: course.title().to_owned(),
            module_count: course.modules().len(),
            lesson_count: course.lesson_count(),
        }
    }
}

/// Read access to the course catalogue.
#[derive(Clone)]
pub struct CourseCatalogService {
    courses: Arc<dyn CourseRepository>,
}

impl CourseCatalogService {
    #[must_use]
    pub fn new(courses: Arc<dyn CourseRepository>) -> Self {
        Self { courses }
    }

    /// List every course, ordered by id.
    ///
    /// # Errors
    ///
    /// Returns `CatalogServiceError::Storage` if repository access fails.
    pub async fn list(&self) -> Result<Vec<CourseSummary>, CatalogServiceError> {
        let courses = self.courses.list_courses().await?;
        Ok(courses.iter().map(CourseSummary::from_course).collect())
    }

    /// Fetch a course by id.
    ///
    /// # Errors
    ///
    /// Returns `CatalogServiceError::UnknownCourse` if no such course exists.
    /// Returns `CatalogServiceError::Storage` if repository access fails.
    pub async fn get(&self, id: &CourseId) -> Result<Course, CatalogServiceError> {
        match self.courses.get_course(id).await {
            Ok(course) => Ok(course),
            Err(StorageError::NotFound) => Err(CatalogServiceError::UnknownCourse(id.clone())),
            Err(err) => Err(err.into()),
        }
    }

    /// Write `courses` into the catalogue, replacing same-id entries.
    ///
    /// # Errors
    ///
    /// Returns `CatalogServiceError::Storage` if the catalogue is read-only or
    /// a write fails.
    pub async fn seed(
        &self,
        courses: impl IntoIterator<Item = Course>,
    ) -> Result<usize, CatalogServiceError> {
        let mut written = 0;
        for course in courses {
            self.courses.upsert_course(&course).await?;
            written += 1;
        }
        info!(count = written, "course catalogue seeded");
        Ok(written)
    }

    /// Seed `courses` only when the catalogue is currently empty.
    ///
    /// # Errors
    ///
    /// Same as [`CourseCatalogService::seed`].
    pub async fn seed_if_empty(
        &self,
        courses: impl IntoIterator<Item = Course>,
    ) -> Result<usize, CatalogServiceError> {
        if self.courses.list_courses().await?.is_empty() {
            self.seed(courses).await
        } else {
            Ok(0)
        }
    }
}
