//! File-backed adapters: a directory of progress blobs and a read-only JSON
//! course catalogue.

use std::collections::BTreeMap;
use std::fmt::Write as _;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use lms_core::model::{Course, CourseDraft, CourseId};
use serde::Deserialize;
use tracing::debug;

use crate::repository::{CourseRepository, ProgressRepository, StorageError, progress_key};

fn io<E: core::fmt::Display>(e: E) -> StorageError {
    StorageError::Io(e.to_string())
}

fn ser<E: core::fmt::Display>(e: E) -> StorageError {
    StorageError::Serialization(e.to_string())
}

#[derive(Deserialize)]
#[serde(untagged)]
enum CourseFile {
    Many(Vec<CourseDraft>),
    One(CourseDraft),
}

/// Parse course JSON: either a single course object or an array of them.
///
/// # Errors
///
/// Returns `StorageError::Serialization` for malformed JSON or a course that
/// fails validation.
pub fn parse_courses(text: &str) -> Result<Vec<Course>, StorageError> {
    let drafts = match serde_json::from_str::<CourseFile>(text).map_err(ser)? {
        CourseFile::Many(drafts) => drafts,
        CourseFile::One(draft) => vec![draft],
    };
    drafts
        .into_iter()
        .map(|d| d.validate().map_err(ser))
        .collect()
}

//
// ─── PROGRESS DIRECTORY ────────────────────────────────────────────────────────
//

/// Stores each course's progress blob as `<dir>/<key>.json`.
#[derive(Debug, Clone)]
pub struct JsonDirRepository {
    dir: PathBuf,
}

impl JsonDirRepository {
    /// Use `dir` for progress files, creating it if needed.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Io` if the directory cannot be created.
    pub async fn open(dir: impl Into<PathBuf>) -> Result<Self, StorageError> {
        let dir = dir.into();
        tokio::fs::create_dir_all(&dir).await.map_err(io)?;
        Ok(Self { dir })
    }

    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, course_id: &CourseId) -> PathBuf {
        self.dir
            .join(format!("{}.json", file_stem(&progress_key(course_id))))
    }
}

/// Escape a storage key into a file stem. Bytes outside `[A-Za-z0-9-]`,
/// including `_` itself, become `_XX` hex, so distinct keys never share a
/// file.
fn file_stem(key: &str) -> String {
    let mut stem = String::with_capacity(key.len());
    for byte in key.bytes() {
        if byte.is_ascii_alphanumeric() || byte == b'-' {
            stem.push(char::from(byte));
        } else {
            let _ = write!(stem, "_{byte:02X}");
        }
    }
    stem
}

#[async_trait]
impl ProgressRepository for JsonDirRepository {
    async fn load_progress(&self, course_id: &CourseId) -> Result<Option<String>, StorageError> {
        match tokio::fs::read_to_string(self.path_for(course_id)).await {
            Ok(text) => Ok(Some(text)),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(err) => Err(io(err)),
        }
    }

    async fn save_progress(&self, course_id: &CourseId, blob: &str) -> Result<(), StorageError> {
        let path = self.path_for(course_id);
        let tmp = path.with_extension("json.tmp");
        tokio::fs::write(&tmp, blob).await.map_err(io)?;
        tokio::fs::rename(&tmp, &path).await.map_err(io)?;
        Ok(())
    }
}

//
// ─── COURSE FILE ───────────────────────────────────────────────────────────────
//

/// Read-only catalogue loaded once from a JSON course file.
#[derive(Debug, Clone)]
pub struct JsonCourseFile {
    courses: BTreeMap<CourseId, Course>,
}

impl JsonCourseFile {
    /// Read and validate every course in `path`.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Io` if the file cannot be read, or
    /// `StorageError::Serialization` if its contents are invalid.
    pub async fn load(path: impl AsRef<Path>) -> Result<Self, StorageError> {
        let path = path.as_ref();
        let text = tokio::fs::read_to_string(path).await.map_err(io)?;
        let courses = parse_courses(&text)?;
        debug!(path = %path.display(), count = courses.len(), "loaded course file");
        Ok(Self::from_courses(courses))
    }

    #[must_use]
    pub fn from_courses(courses: impl IntoIterator<Item = Course>) -> Self {
        Self {
            courses: courses.into_iter().map(|c| (c.id().clone(), c)).collect(),
        }
    }
}

#[async_trait]
impl CourseRepository for JsonCourseFile {
    async fn get_course(&self, id: &CourseId) -> Result<Course, StorageError> {
        self.courses.get(id).cloned().ok_or(StorageError::NotFound)
    }

    async fn list_courses(&self) -> Result<Vec<Course>, StorageError> {
        Ok(self.courses.values().cloned().collect())
    }

    async fn upsert_course(&self, _course: &Course) -> Result<(), StorageError> {
        Err(StorageError::ReadOnly)
    }
}
