use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::Arc;

use lms_core::model::{CourseId, PlayerSettings};
use storage::demo::demo_courses;
use storage::file::{JsonCourseFile, JsonDirRepository};
use storage::repository::{InMemoryRepository, Storage};
use tracing::debug;

use crate::catalog_service::CourseCatalogService;
use crate::error::{
    AppServicesError, CatalogServiceError, ParseStoreTargetError, PlayerServiceError,
};
use crate::player_service::CoursePlayerService;
use crate::progress_store::ProgressStore;
use crate::Clock;

/// Where progress (and, for `SQLite`, the course catalogue) lives.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum StoreTarget {
    /// Process-local; nothing survives exit.
    #[default]
    Memory,
    /// One JSON file per course under the directory.
    Dir(PathBuf),
    /// `SQLite` database URL, e.g. `sqlite:lms.db?mode=rwc`.
    Sqlite(String),
}

impl FromStr for StoreTarget {
    type Err = ParseStoreTargetError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.eq_ignore_ascii_case("memory") {
            return Ok(Self::Memory);
        }
        if let Some(dir) = s.strip_prefix("dir:").filter(|d| !d.is_empty()) {
            return Ok(Self::Dir(PathBuf::from(dir)));
        }
        if s.starts_with("sqlite:") && s.len() > "sqlite:".len() {
            return Ok(Self::Sqlite(s.to_owned()));
        }
        Err(ParseStoreTargetError(s.to_owned()))
    }
}

impl fmt::Display for StoreTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Memory => f.write_str("memory"),
            Self::Dir(dir) => write!(f, "dir:{}", dir.display()),
            Self::Sqlite(url) => f.write_str(url),
        }
    }
}

/// Assembles app-facing services over the chosen storage backend.
#[derive(Clone)]
pub struct AppServices {
    storage: Storage,
    settings: PlayerSettings,
    clock: Clock,
    catalog: Arc<CourseCatalogService>,
}

impl AppServices {
    /// Build services for `target`.
    ///
    /// Courses come from `courses_file` when given. Otherwise the demo
    /// catalogue is used; a `SQLite` store is seeded with it on first use.
    ///
    /// # Errors
    ///
    /// Returns `AppServicesError` if the store cannot be opened or the course
    /// file cannot be loaded.
    pub async fn new(
        target: &StoreTarget,
        courses_file: Option<&Path>,
        settings: PlayerSettings,
        clock: Clock,
    ) -> Result<Self, AppServicesError> {
        let mut storage = match target {
            StoreTarget::Memory => {
                let repo = InMemoryRepository::with_courses(demo_courses()?);
                Storage {
                    progress: Arc::new(repo.clone()),
                    courses: Arc::new(repo),
                }
            }
            StoreTarget::Dir(dir) => Storage {
                progress: Arc::new(JsonDirRepository::open(dir.clone()).await?),
                courses: Arc::new(InMemoryRepository::with_courses(demo_courses()?)),
            },
            StoreTarget::Sqlite(url) => Storage::sqlite(url).await?,
        };

        if let Some(path) = courses_file {
            storage = storage.with_courses(Arc::new(JsonCourseFile::load(path).await?));
        } else if matches!(target, StoreTarget::Sqlite(_)) {
            let seeded = CourseCatalogService::new(Arc::clone(&storage.courses))
                .seed_if_empty(demo_courses()?)
                .await?;
            if seeded > 0 {
                debug!(count = seeded, "seeded empty course table with demo courses");
            }
        }

        let catalog = Arc::new(CourseCatalogService::new(Arc::clone(&storage.courses)));
        debug!(store = %target, "app services ready");

        Ok(Self {
            storage,
            settings,
            clock,
            catalog,
        })
    }

    /// In-memory services over the demo catalogue.
    ///
    /// # Errors
    ///
    /// Returns `AppServicesError::Storage` if the bundled demo data is invalid.
    pub async fn in_memory(
        settings: PlayerSettings,
        clock: Clock,
    ) -> Result<Self, AppServicesError> {
        Self::new(&StoreTarget::Memory, None, settings, clock).await
    }

    #[must_use]
    pub fn catalog(&self) -> Arc<CourseCatalogService> {
        Arc::clone(&self.catalog)
    }

    #[must_use]
    pub fn settings(&self) -> &PlayerSettings {
        &self.settings
    }

    #[must_use]
    pub fn progress_store(&self) -> ProgressStore {
        ProgressStore::new(Arc::clone(&self.storage.progress))
            .with_completed(self.settings.persist_completed())
    }

    /// Open a player for `course_id`, restoring saved progress.
    ///
    /// # Errors
    ///
    /// Returns `PlayerServiceError::Catalog` if the course is unknown or the
    /// catalogue cannot be read.
    pub async fn open_player(
        &self,
        course_id: &CourseId,
    ) -> Result<CoursePlayerService, PlayerServiceError> {
        let course = self.catalog.get(course_id).await?;
        Ok(CoursePlayerService::open(
            course,
            self.settings.clone(),
            self.progress_store(),
            self.clock,
        )
        .await)
    }

    /// Overwrite saved progress for `course_id` with defaults.
    ///
    /// # Errors
    ///
    /// Returns `PlayerServiceError::Catalog` if the course is unknown.
    pub async fn reset_progress(&self, course_id: &CourseId) -> Result<(), PlayerServiceError> {
        let mut player = self.open_player(course_id).await?;
        player.reset().await;
        Ok(())
    }

    /// Write the demo catalogue into the course store.
    ///
    /// # Errors
    ///
    /// Returns `CatalogServiceError::Storage` if the course store is read-only
    /// or a write fails.
    pub async fn seed_demo(&self) -> Result<usize, CatalogServiceError> {
        self.catalog.seed(demo_courses()?).await
    }
}
