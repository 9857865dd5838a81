use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::model::ids::LessonId;

/// Watch percentage a video lesson requires when it does not set its own.
pub const DEFAULT_MIN_WATCH_PERCENT: u8 = 80;

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum LessonError {
    #[error("lesson id cannot be empty")]
    EmptyId,

    #[error("lesson {id} has an empty title")]
    EmptyTitle { id: LessonId },

    #[error("lesson {id} requires {percent}% watched, which is above 100")]
    InvalidMinWatchPercent { id: LessonId, percent: u8 },

    #[error("step-by-step lesson {id} has no steps")]
    NoSteps { id: LessonId },

    #[error("lesson {id} is missing its {field}")]
    MissingContent { id: LessonId, field: &'static str },
}

//
// ─── LESSON KINDS ──────────────────────────────────────────────────────────────
//

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoLesson {
    pub asset: String,
    #[serde(default)]
    pub key_points: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_watch_percent: Option<u8>,
}

/// One image-and-caption step of a standard operating procedure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SopStep {
    pub title: String,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub caption: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SopLesson {
    pub steps: Vec<SopStep>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextLesson {
    pub body: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PdfLesson {
    pub file: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pages: Option<u32>,
}

/// Type-specific lesson content, tagged by `type` in course files.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum LessonKind {
    Video(VideoLesson),
    Sop(SopLesson),
    Text(TextLesson),
    Pdf(PdfLesson),
}

impl LessonKind {
    #[must_use]
    pub fn label(&self) -> &'static str {
        match self {
            LessonKind::Video(_) => "video",
            LessonKind::Sop(_) => "sop",
            LessonKind::Text(_) => "text",
            LessonKind::Pdf(_) => "pdf",
        }
    }
}

//
// ─── DRAFT ─────────────────────────────────────────────────────────────────────
//

/// Unvalidated lesson as it appears in a course file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LessonDraft {
    pub id: LessonId,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<String>,
    #[serde(default)]
    pub completed: bool,
    #[serde(flatten)]
    pub kind: LessonKind,
}

impl LessonDraft {
    /// Validate the draft into a `Lesson`.
    ///
    /// # Errors
    ///
    /// Returns `LessonError` for a blank id or title, a minimum watch percent
    /// above 100, a step-by-step lesson without steps, or a missing asset/file.
    pub fn validate(self) -> Result<Lesson, LessonError> {
        if self.id.as_str().trim().is_empty() {
            return Err(LessonError::EmptyId);
        }
        let title = self.title.trim().to_owned();
        if title.is_empty() {
            return Err(LessonError::EmptyTitle { id: self.id });
        }

        match &self.kind {
            LessonKind::Video(video) => {
                if video.asset.trim().is_empty() {
                    return Err(LessonError::MissingContent {
                        id: self.id,
                        field: "video asset",
                    });
                }
                if let Some(percent) = video.min_watch_percent {
                    if percent > 100 {
                        return Err(LessonError::InvalidMinWatchPercent {
                            id: self.id,
                            percent,
                        });
                    }
                }
            }
            LessonKind::Sop(sop) => {
                if sop.steps.is_empty() {
                    return Err(LessonError::NoSteps { id: self.id });
                }
            }
            LessonKind::Pdf(pdf) => {
                if pdf.file.trim().is_empty() {
                    return Err(LessonError::MissingContent {
                        id: self.id,
                        field: "pdf file",
                    });
                }
            }
            LessonKind::Text(_) => {}
        }

        Ok(Lesson {
            id: self.id,
            title,
            duration: self
                .duration
                .map(|d| d.trim().to_owned())
                .filter(|d| !d.is_empty()),
            completed: self.completed,
            kind: self.kind,
        })
    }
}

//
// ─── LESSON ────────────────────────────────────────────────────────────────────
//

/// A validated lesson. Immutable once part of a course.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Lesson {
    id: LessonId,
    title: String,
    duration: Option<String>,
    completed: bool,
    kind: LessonKind,
}

impl Lesson {
    #[must_use]
    pub fn id(&self) -> &LessonId {
        &self.id
    }

    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    #[must_use]
    pub fn duration(&self) -> Option<&str> {
        self.duration.as_deref()
    }

    /// Completion flag shipped with the static course data.
    #[must_use]
    pub fn completed_by_default(&self) -> bool {
        self.completed
    }

    #[must_use]
    pub fn kind(&self) -> &LessonKind {
        &self.kind
    }

    #[must_use]
    pub fn is_video(&self) -> bool {
        matches!(self.kind, LessonKind::Video(_))
    }

    /// Number of SOP steps, or `None` for other lesson kinds.
    #[must_use]
    pub fn step_count(&self) -> Option<usize> {
        match &self.kind {
            LessonKind::Sop(sop) => Some(sop.steps.len()),
            _ => None,
        }
    }

    /// Minimum watch percentage for video lessons, with `fallback` applied
    /// when the lesson leaves it unset.
    #[must_use]
    pub fn min_watch_percent(&self, fallback: u8) -> Option<u8> {
        match &self.kind {
            LessonKind::Video(video) => Some(video.min_watch_percent.unwrap_or(fallback)),
            _ => None,
        }
    }

    #[must_use]
    pub fn to_draft(&self) -> LessonDraft {
        LessonDraft {
            id: self.id.clone(),
            title: self.title.clone(),
            duration: self.duration.clone(),
            completed: self.completed,
            kind: self.kind.clone(),
        }
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
