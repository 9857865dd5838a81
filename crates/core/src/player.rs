//! In-memory course player: a cursor over the lesson catalogue plus
//! per-lesson sub-cursors for step-by-step lessons.
//!
//! Every mutating call reports whether it changed anything, so callers can
//! persist only on change. Moves past either end, re-completing a lesson and
//! stepping past the last step are no-ops, never errors.

use crate::catalogue::{LessonCatalogue, LessonRef};
use crate::completion::{
    CompletionGate, MilestoneTeaser, completion_gate, completion_percent, milestone_teaser,
};
use crate::model::{LessonId, PlayerSettings};
use crate::progress::{PartialProgress, ProgressRecord};

/// Result of asking to complete the current lesson.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CompletionOutcome {
    Completed {
        lesson_id: LessonId,
        teaser: Option<MilestoneTeaser>,
        /// New current index when the player moved on to the next lesson.
        advanced_to: Option<usize>,
    },
    AlreadyComplete,
    Locked {
        watched: u8,
        required: u8,
    },
}

/// One row of the lesson drawer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LessonListItem {
    pub index: usize,
    pub module_title: String,
    pub title: String,
    pub kind: &'static str,
    pub completed: bool,
    pub is_current: bool,
}

#[derive(Debug, Clone)]
pub struct PlayerState {
    catalogue: LessonCatalogue,
    progress: ProgressRecord,
    settings: PlayerSettings,
}

impl PlayerState {
    /// Fresh progress. Lessons flagged complete in the course data start in
    /// the completed set.
    #[must_use]
    pub fn new(catalogue: LessonCatalogue, settings: PlayerSettings) -> Self {
        Self::restore(catalogue, settings, None)
    }

    /// Rebuild from a stored blob, defaulting anything missing.
    #[must_use]
    pub fn restore(
        catalogue: LessonCatalogue,
        settings: PlayerSettings,
        saved: Option<PartialProgress>,
    ) -> Self {
        let saved = saved.unwrap_or_default();
        let seed_defaults = saved.completed.is_none();
        let mut progress = saved.into_record(&catalogue);
        if seed_defaults {
            progress.completed = catalogue
                .iter()
                .filter(|r| r.lesson.completed_by_default())
                .map(|r| r.lesson.id().clone())
                .collect();
        }
        Self {
            catalogue,
            progress,
            settings,
        }
    }

    #[must_use]
    pub fn catalogue(&self) -> &LessonCatalogue {
        &self.catalogue
    }

    #[must_use]
    pub fn progress(&self) -> &ProgressRecord {
        &self.progress
    }

    #[must_use]
    pub fn settings(&self) -> &PlayerSettings {
        &self.settings
    }

    #[must_use]
    pub fn current_index(&self) -> usize {
        self.progress.current_index
    }

    #[must_use]
    pub fn current(&self) -> LessonRef<'_> {
        self.catalogue.at(self.progress.current_index)
    }

    #[must_use]
    pub fn total_lessons(&self) -> usize {
        self.catalogue.len()
    }

    #[must_use]
    pub fn has_next(&self) -> bool {
        self.progress.current_index < self.catalogue.last_index()
    }

    #[must_use]
    pub fn has_previous(&self) -> bool {
        self.progress.current_index > 0
    }

    // ─── Navigation ────────────────────────────────────────────────────────

    pub fn go_next(&mut self) -> bool {
        self.jump_to(self.progress.current_index.saturating_add(1))
    }

    pub fn go_previous(&mut self) -> bool {
        self.jump_to(self.progress.current_index.saturating_sub(1))
    }

    /// Move to `index`, clamped to the catalogue.
    pub fn jump_to(&mut self, index: usize) -> bool {
        let target = self.catalogue.clamp(index);
        if target == self.progress.current_index {
            return false;
        }
        self.progress.current_index = target;
        true
    }

    pub fn toggle_low_bandwidth(&mut self) -> bool {
        self.progress.low_bandwidth = !self.progress.low_bandwidth;
        true
    }

    // ─── Per-lesson cursors ────────────────────────────────────────────────

    /// Advance the step cursor of a step-by-step lesson, stopping at the last
    /// step.
    pub fn next_step(&mut self, lesson_id: &LessonId) -> bool {
        let Some(steps) = self.catalogue.lesson(lesson_id).and_then(|l| l.step_count()) else {
            return false;
        };
        let current = self.progress.step_index(lesson_id);
        let next = (current + 1).min(steps.saturating_sub(1));
        if next == current {
            return false;
        }
        self.progress.sop_step_index.insert(lesson_id.clone(), next);
        true
    }

    pub fn previous_step(&mut self, lesson_id: &LessonId) -> bool {
        if self
            .catalogue
            .lesson(lesson_id)
            .and_then(|l| l.step_count())
            .is_none()
        {
            return false;
        }
        let current = self.progress.step_index(lesson_id);
        if current == 0 {
            return false;
        }
        self.progress
            .sop_step_index
            .insert(lesson_id.clone(), current - 1);
        true
    }

    /// Record how much of a video lesson has been watched, capped at 100.
    pub fn set_watch_percent(&mut self, lesson_id: &LessonId, percent: u8) -> bool {
        if !self
            .catalogue
            .lesson(lesson_id)
            .is_some_and(|l| l.is_video())
        {
            return false;
        }
        let percent = percent.min(100);
        if self.progress.video_watch_percent.get(lesson_id) == Some(&percent) {
            return false;
        }
        self.progress
            .video_watch_percent
            .insert(lesson_id.clone(), percent);
        true
    }

    /// Replace the learner's note for a lesson. A blank note clears it.
    pub fn set_note(&mut self, lesson_id: &LessonId, note: impl Into<String>) -> bool {
        if self.catalogue.position_of(lesson_id).is_none() {
            return false;
        }
        let note = note.into();
        if note.trim().is_empty() {
            return self.progress.notes_per_lesson.remove(lesson_id).is_some();
        }
        if self.progress.note(lesson_id) == Some(note.as_str()) {
            return false;
        }
        self.progress
            .notes_per_lesson
            .insert(lesson_id.clone(), note);
        true
    }

    // ─── Completion ────────────────────────────────────────────────────────

    #[must_use]
    pub fn current_gate(&self) -> CompletionGate {
        completion_gate(self.current().lesson, &self.progress, &self.settings)
    }

    #[must_use]
    pub fn can_complete_current(&self) -> bool {
        self.current_gate().is_open()
    }

    /// Mark the current lesson complete and move on to the next one.
    pub fn complete_current(&mut self) -> CompletionOutcome {
        let lesson_id = self.current().lesson.id().clone();
        if self.progress.is_completed(&lesson_id) {
            return CompletionOutcome::AlreadyComplete;
        }
        if let CompletionGate::Locked { watched, required } = self.current_gate() {
            return CompletionOutcome::Locked { watched, required };
        }

        self.progress.completed.insert(lesson_id.clone());
        let teaser = milestone_teaser(self.progress.completed.len(), self.settings.badge_interval());
        let advanced_to = self.go_next().then_some(self.progress.current_index);

        CompletionOutcome::Completed {
            lesson_id,
            teaser,
            advanced_to,
        }
    }

    #[must_use]
    pub fn completed_count(&self) -> usize {
        self.progress.completed.len()
    }

    #[must_use]
    pub fn completion_percent(&self) -> u8 {
        completion_percent(self.completed_count(), self.total_lessons())
    }

    #[must_use]
    pub fn lesson_list(&self) -> Vec<LessonListItem> {
        self.catalogue
            .iter()
            .map(|r| LessonListItem {
                index: r.index,
                module_title: r.module.title().to_owned(),
                title: r.lesson.title().to_owned(),
                kind: r.lesson.kind().label(),
                completed: self.progress.is_completed(r.lesson.id()),
                is_current: r.index == self.progress.current_index,
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalogue::tests::course_with_modules;
    use crate::model::{
        CourseDraft, CourseId, LessonDraft, LessonKind, ModuleDraft, ModuleId, SopLesson, SopStep,
        TextLesson, VideoLesson,
    };

    fn text_player(sizes: &[usize]) -> PlayerState {
        PlayerState::new(
            LessonCatalogue::new(course_with_modules(sizes)),
            PlayerSettings::default(),
        )
    }

    fn mixed_player() -> PlayerState {
        let step = |t: &str| SopStep {
            title: t.into(),
            image: Some(format!("img/{t}.jpg")),
            caption: String::new(),
        };
        let course = CourseDraft {
            id: CourseId::new("c-mixed"),
            title: "Mixed".into(),
            description: None,
            modules: vec![ModuleDraft {
                id: ModuleId::new("m1"),
                title: "Only".into(),
                lessons: vec![
                    LessonDraft {
                        id: LessonId::new("video"),
                        title: "Watch".into(),
                        duration: None,
                        completed: false,
                        kind: LessonKind::Video(VideoLesson {
                            asset: "v.mp4".into(),
                            key_points: Vec::new(),
                            min_watch_percent: Some(80),
                        }),
                    },
                    LessonDraft {
                        id: LessonId::new("sop"),
                        title: "Steps".into(),
                        duration: None,
                        completed: false,
                        kind: LessonKind::Sop(SopLesson {
                            steps: vec![step("a"), step("b"), step("c")],
                        }),
                    },
                    LessonDraft {
                        id: LessonId::new("text"),
                        title: "Read".into(),
                        duration: None,
                        completed: true,
                        kind: LessonKind::Text(TextLesson { body: "b".into() }),
                    },
                ],
            }],
            resources: Vec::new(),
        }
        .validate()
        .unwrap();
        PlayerState::new(LessonCatalogue::new(course), PlayerSettings::default())
    }

    #[test]
    fn jump_to_last_then_next_stays_put() {
        let mut player = text_player(&[2, 3]);
        assert_eq!(player.total_lessons(), 5);
        assert!(player.jump_to(4));
        assert!(!player.go_next());
        assert_eq!(player.current_index(), 4);
    }

    #[test]
    fn previous_at_start_is_noop() {
        let mut player = text_player(&[2]);
        assert!(!player.go_previous());
        assert_eq!(player.current_index(), 0);
        assert!(!player.has_previous());
        assert!(player.has_next());
    }

    #[test]
    fn jump_clamps_out_of_range() {
        let mut player = text_player(&[2, 3]);
        assert!(player.jump_to(100));
        assert_eq!(player.current_index(), 4);
        assert_eq!(player.current().lesson.id().as_str(), "m1-l2");
    }

    #[test]
    fn video_completion_follows_watch_percent() {
        let mut player = mixed_player();
        let video = LessonId::new("video");

        player.set_watch_percent(&video, 79);
        assert!(!player.can_complete_current());
        assert_eq!(
            player.complete_current(),
            CompletionOutcome::Locked {
                watched: 79,
                required: 80
            }
        );
        assert_eq!(player.current_index(), 0);

        player.set_watch_percent(&video, 80);
        assert!(player.can_complete_current());
    }

    #[test]
    fn completion_is_idempotent() {
        let mut player = text_player(&[3]);
        let first = player.complete_current();
        assert!(matches!(
            first,
            CompletionOutcome::Completed {
                advanced_to: Some(1),
                ..
            }
        ));

        player.go_previous();
        assert_eq!(player.complete_current(), CompletionOutcome::AlreadyComplete);
        assert_eq!(player.current_index(), 0);
        assert_eq!(player.completed_count(), 1);
    }

    #[test]
    fn teasers_follow_badge_interval() {
        let mut player = text_player(&[3]);
        let teaser = |o: CompletionOutcome| match o {
            CompletionOutcome::Completed { teaser, .. } => teaser.map(|t| t.to_string()),
            other => panic!("unexpected outcome {other:?}"),
        };

        assert_eq!(
            teaser(player.complete_current()).as_deref(),
            Some("2 more lessons to get the badge")
        );
        assert_eq!(
            teaser(player.complete_current()).as_deref(),
            Some("1 more lesson to get the badge")
        );
        assert_eq!(teaser(player.complete_current()), None);
        assert_eq!(player.completion_percent(), 100);
    }

    #[test]
    fn completing_last_lesson_does_not_advance() {
        let mut player = text_player(&[2]);
        player.jump_to(1);
        match player.complete_current() {
            CompletionOutcome::Completed { advanced_to, .. } => assert_eq!(advanced_to, None),
            other => panic!("unexpected outcome {other:?}"),
        }
        assert_eq!(player.current_index(), 1);
    }

    #[test]
    fn step_cursor_stops_at_last_step() {
        let mut player = mixed_player();
        let sop = LessonId::new("sop");
        assert!(player.next_step(&sop));
        assert!(player.next_step(&sop));
        for _ in 0..10 {
            assert!(!player.next_step(&sop));
        }
        assert_eq!(player.progress().step_index(&sop), 2);

        assert!(player.previous_step(&sop));
        assert_eq!(player.progress().step_index(&sop), 1);
    }

    #[test]
    fn step_on_non_sop_lesson_is_ignored() {
        let mut player = mixed_player();
        assert!(!player.next_step(&LessonId::new("video")));
        assert!(!player.previous_step(&LessonId::new("text")));
        assert!(!player.next_step(&LessonId::new("ghost")));
    }

    #[test]
    fn watch_percent_only_applies_to_video() {
        let mut player = mixed_player();
        assert!(!player.set_watch_percent(&LessonId::new("text"), 50));
        assert!(player.set_watch_percent(&LessonId::new("video"), 200));
        assert_eq!(player.progress().watch_percent(&LessonId::new("video")), 100);
        assert!(!player.set_watch_percent(&LessonId::new("video"), 100));
    }

    #[test]
    fn notes_set_and_clear() {
        let mut player = mixed_player();
        let text = LessonId::new("text");
        assert!(player.set_note(&text, "buy more thread"));
        assert!(!player.set_note(&text, "buy more thread"));
        assert_eq!(player.progress().note(&text), Some("buy more thread"));
        assert!(player.set_note(&text, "  "));
        assert_eq!(player.progress().note(&text), None);
        assert!(!player.set_note(&LessonId::new("ghost"), "x"));
    }

    #[test]
    fn default_completed_flags_seed_fresh_progress() {
        let player = mixed_player();
        assert!(player.progress().is_completed(&LessonId::new("text")));
        let list = player.lesson_list();
        assert_eq!(list.len(), 3);
        assert!(list[0].is_current);
        assert_eq!(list[1].kind, "sop");
        assert!(list[2].completed);
    }

    #[test]
    fn toggle_low_bandwidth_flips() {
        let mut player = mixed_player();
        assert!(player.toggle_low_bandwidth());
        assert!(player.progress().low_bandwidth);
        player.toggle_low_bandwidth();
        assert!(!player.progress().low_bandwidth);
    }
}
