use std::sync::Arc;

use lms_core::model::CourseId;
use lms_core::{PartialProgress, ProgressRecord};
use storage::repository::ProgressRepository;
use tracing::{debug, warn};

/// Best-effort persistence for player progress.
///
/// Progress loss never interrupts learning: unreadable, corrupt or unwritable
/// storage is logged at `warn` and otherwise treated as "nothing saved" /
/// "save skipped".
#[derive(Clone)]
pub struct ProgressStore {
    repo: Arc<dyn ProgressRepository>,
    include_completed: bool,
}

impl ProgressStore {
    #[must_use]
    pub fn new(repo: Arc<dyn ProgressRepository>) -> Self {
        Self {
            repo,
            include_completed: true,
        }
    }

    /// Whether the completed set is written along with the other fields.
    #[must_use]
    pub fn with_completed(mut self, include_completed: bool) -> Self {
        self.include_completed = include_completed;
        self
    }

    /// Previously saved progress for `course_id`, if any can be read.
    pub async fn load(&self, course_id: &CourseId) -> Option<PartialProgress> {
        let raw = match self.repo.load_progress(course_id).await {
            Ok(Some(raw)) => raw,
            Ok(None) => {
                debug!(course = %course_id, "no saved progress");
                return None;
            }
            Err(err) => {
                warn!(course = %course_id, error = %err, "progress load failed; starting fresh");
                return None;
            }
        };

        let decoded = PartialProgress::decode(&raw);
        if decoded.is_none() {
            warn!(course = %course_id, "saved progress is not a JSON object; ignoring it");
        }
        decoded
    }

    /// Overwrite the saved progress for `course_id`. Failures are swallowed.
    pub async fn save(&self, course_id: &CourseId, record: &ProgressRecord) {
        let blob = match record.to_json(self.include_completed) {
            Ok(blob) => blob,
            Err(err) => {
                warn!(course = %course_id, error = %err, "progress encode failed; save skipped");
                return;
            }
        };
        match self.repo.save_progress(course_id, &blob).await {
            Ok(()) => debug!(course = %course_id, bytes = blob.len(), "progress saved"),
            Err(err) => warn!(course = %course_id, error = %err, "progress save failed; skipped"),
        }
    }
}
