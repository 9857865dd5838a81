//! Shared error types for the services crate.

use thiserror::Error;

use lms_core::model::CourseId;
use storage::repository::StorageError;
use storage::sqlite::SqliteInitError;

/// Errors emitted by `CourseCatalogService`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum CatalogServiceError {
    #[error("course {0} not found")]
    UnknownCourse(CourseId),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Errors emitted while opening a course player.
///
/// Once a player is open, progress storage failures are logged and swallowed
/// rather than returned.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum PlayerServiceError {
    #[error(transparent)]
    Catalog(#[from] CatalogServiceError),
}

/// Errors emitted while bootstrapping app services.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum AppServicesError {
    #[error(transparent)]
    Sqlite(#[from] SqliteInitError),
    #[error(transparent)]
    Storage(#[from] StorageError),
    #[error(transparent)]
    Catalog(#[from] CatalogServiceError),
}

/// A `--store` value that names no known backend.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("unknown store {0:?}; expected memory, dir:<path> or sqlite:<url>")]
pub struct ParseStoreTargetError(pub String);
