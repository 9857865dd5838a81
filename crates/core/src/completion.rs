//! Completion gating and badge milestones.

use std::fmt;

use crate::model::{Lesson, LessonKind, PlayerSettings};
use crate::progress::ProgressRecord;

/// Whether a lesson may be marked complete right now.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompletionGate {
    Open,
    /// Video lesson not watched far enough yet.
    Locked { watched: u8, required: u8 },
}

impl CompletionGate {
    #[must_use]
    pub fn is_open(self) -> bool {
        matches!(self, CompletionGate::Open)
    }
}

/// Evaluate the completion rule for `lesson`.
///
/// Video lessons need their watch percentage to reach the lesson's minimum
/// (or the settings fallback). Every other kind is completable once viewed.
#[must_use]
pub fn completion_gate(
    lesson: &Lesson,
    progress: &ProgressRecord,
    settings: &PlayerSettings,
) -> CompletionGate {
    match lesson.kind() {
        LessonKind::Video(video) => {
            let required = video
                .min_watch_percent
                .unwrap_or(settings.default_min_watch_percent());
            let watched = progress.watch_percent(lesson.id());
            if watched >= required {
                CompletionGate::Open
            } else {
                CompletionGate::Locked { watched, required }
            }
        }
        LessonKind::Sop(_) | LessonKind::Text(_) | LessonKind::Pdf(_) => CompletionGate::Open,
    }
}

#[must_use]
pub fn can_complete(lesson: &Lesson, progress: &ProgressRecord, settings: &PlayerSettings) -> bool {
    completion_gate(lesson, progress, settings).is_open()
}

/// "N more lessons to get the badge", shown when the learner is close.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MilestoneTeaser {
    remaining: u32,
    interval: u32,
}

impl MilestoneTeaser {
    #[must_use]
    pub fn remaining(&self) -> u32 {
        self.remaining
    }

    #[must_use]
    pub fn interval(&self) -> u32 {
        self.interval
    }
}

impl fmt::Display for MilestoneTeaser {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let noun = if self.remaining == 1 { "lesson" } else { "lessons" };
        write!(f, "{} more {noun} to get the badge", self.remaining)
    }
}

/// Teaser for a learner who has just reached `completed` lessons.
///
/// Returns `None` when a badge was just earned (the count is a multiple of
/// `interval`) or when the next badge is more than two lessons away.
#[must_use]
pub fn milestone_teaser(completed: usize, interval: u32) -> Option<MilestoneTeaser> {
    if interval == 0 {
        return None;
    }
    let into_cycle = u32::try_from(completed % interval as usize).ok()?;
    if into_cycle == 0 {
        return None;
    }
    let remaining = interval - into_cycle;
    (remaining <= 2).then_some(MilestoneTeaser {
        remaining,
        interval,
    })
}

/// Share of lessons completed, rounded down, in percent.
#[must_use]
pub fn completion_percent(completed: usize, total: usize) -> u8 {
    if total == 0 {
        return 0;
    }
    let pct = completed.min(total) * 100 / total;
    u8::try_from(pct).unwrap_or(100)
}
