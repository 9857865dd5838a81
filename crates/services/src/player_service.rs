//! Async wrapper around `PlayerState` that persists every observed change
//! and keeps the transient completion notice.

use chrono::{DateTime, Utc};
use tracing::{debug, info};

use lms_core::model::{Course, CourseId, LessonId, PlayerSettings};
use lms_core::{
    Clock, CompletionOutcome, LessonCatalogue, LessonRef, MilestoneTeaser, PlayerState,
};

use crate::progress_store::ProgressStore;

//
// ─── COMPLETION NOTICE ─────────────────────────────────────────────────────────
//

/// Toast shown after a lesson is marked complete.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletionNotice {
    pub lesson_id: LessonId,
    pub lesson_title: String,
    pub teaser: Option<MilestoneTeaser>,
    pub shown_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl CompletionNotice {
    #[must_use]
    pub fn is_active_at(&self, now: DateTime<Utc>) -> bool {
        now < self.expires_at
    }

    #[must_use]
    pub fn message(&self) -> String {
        match &self.teaser {
            Some(teaser) => format!("Completed \"{}\". {teaser}!", self.lesson_title),
            None => format!("Completed \"{}\".", self.lesson_title),
        }
    }
}

//
// ─── SERVICE ───────────────────────────────────────────────────────────────────
//

/// One learner's player for one course.
pub struct CoursePlayerService {
    course_id: CourseId,
    state: PlayerState,
    store: ProgressStore,
    clock: Clock,
    notice: Option<CompletionNotice>,
}

impl CoursePlayerService {
    /// Build a player for `course`, restoring whatever progress `store` holds.
    pub async fn open(
        course: Course,
        settings: PlayerSettings,
        store: ProgressStore,
        clock: Clock,
    ) -> Self {
        let course_id = course.id().clone();
        let saved = store.load(&course_id).await;
        let restored = saved.is_some();
        let state = PlayerState::restore(LessonCatalogue::new(course), settings, saved);
        debug!(
            course = %course_id,
            restored,
            index = state.current_index(),
            "player opened"
        );
        Self {
            course_id,
            state,
            store,
            clock,
            notice: None,
        }
    }

    #[must_use]
    pub fn course_id(&self) -> &CourseId {
        &self.course_id
    }

    #[must_use]
    pub fn state(&self) -> &PlayerState {
        &self.state
    }

    #[must_use]
    pub fn current(&self) -> LessonRef<'_> {
        self.state.current()
    }

    #[must_use]
    pub fn clock(&self) -> Clock {
        self.clock
    }

    /// Override the clock (usually for deterministic testing).
    pub fn set_clock(&mut self, clock: Clock) {
        self.clock = clock;
    }

    // ─── Navigation ────────────────────────────────────────────────────────

    pub async fn go_next(&mut self) -> bool {
        let changed = self.state.go_next();
        self.persist_if(changed).await
    }

    pub async fn go_previous(&mut self) -> bool {
        let changed = self.state.go_previous();
        self.persist_if(changed).await
    }

    pub async fn jump_to(&mut self, index: usize) -> bool {
        let changed = self.state.jump_to(index);
        self.persist_if(changed).await
    }

    pub async fn toggle_low_bandwidth(&mut self) -> bool {
        let changed = self.state.toggle_low_bandwidth();
        self.persist_if(changed).await
    }

    pub async fn next_step(&mut self, lesson_id: &LessonId) -> bool {
        let changed = self.state.next_step(lesson_id);
        self.persist_if(changed).await
    }

    pub async fn previous_step(&mut self, lesson_id: &LessonId) -> bool {
        let changed = self.state.previous_step(lesson_id);
        self.persist_if(changed).await
    }

    pub async fn set_watch_percent(&mut self, lesson_id: &LessonId, percent: u8) -> bool {
        let changed = self.state.set_watch_percent(lesson_id, percent);
        self.persist_if(changed).await
    }

    pub async fn set_note(&mut self, lesson_id: &LessonId, note: impl Into<String>) -> bool {
        let changed = self.state.set_note(lesson_id, note);
        self.persist_if(changed).await
    }

    // ─── Completion ────────────────────────────────────────────────────────

    /// Mark the current lesson complete, persist, and raise a notice.
    pub async fn complete_current(&mut self) -> CompletionOutcome {
        let lesson_title = self.state.current().lesson.title().to_owned();
        let outcome = self.state.complete_current();

        if let CompletionOutcome::Completed {
            lesson_id, teaser, ..
        } = &outcome
        {
            info!(
                course = %self.course_id,
                lesson = %lesson_id,
                completed = self.state.completed_count(),
                total = self.state.total_lessons(),
                "lesson completed"
            );
            let (shown_at, expires_at) =
                self.clock.deadline(self.state.settings().notice_duration());
            self.notice = Some(CompletionNotice {
                lesson_id: lesson_id.clone(),
                lesson_title,
                teaser: *teaser,
                shown_at,
                expires_at,
            });
            self.persist().await;
        }
        outcome
    }

    /// The completion notice, unless it has expired or was dismissed.
    #[must_use]
    pub fn active_notice(&self) -> Option<&CompletionNotice> {
        self.notice
            .as_ref()
            .filter(|n| !self.clock.has_passed(n.expires_at))
    }

    pub fn dismiss_notice(&mut self) {
        self.notice = None;
    }

    /// Throw away all progress for this course and save the defaults.
    pub async fn reset(&mut self) {
        self.state = PlayerState::new(
            self.state.catalogue().clone(),
            self.state.settings().clone(),
        );
        self.notice = None;
        info!(course = %self.course_id, "progress reset");
        self.persist().await;
    }

    async fn persist_if(&self, changed: bool) -> bool {
        if changed {
            self.persist().await;
        }
        changed
    }

    async fn persist(&self) {
        self.store.save(&self.course_id, self.state.progress()).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use chrono::Duration;
    use lms_core::time::fixed_clock;
    use storage::demo::demo_courses;
    use storage::repository::{InMemoryRepository, ProgressRepository};

    fn kantha() -> Course {
        demo_courses()
            .unwrap()
            .into_iter()
            .find(|c| c.id().as_str() == "nakshi-kantha-basics")
            .unwrap()
    }

    async fn open_player(repo: &InMemoryRepository) -> CoursePlayerService {
        CoursePlayerService::open(
            kantha(),
            PlayerSettings::default(),
            ProgressStore::new(Arc::new(repo.clone())),
            fixed_clock(),
        )
        .await
    }

    #[tokio::test]
    async fn no_op_moves_do_not_write() {
        let repo = InMemoryRepository::new();
        let mut player = open_player(&repo).await;

        assert!(!player.go_previous().await);
        assert_eq!(repo.load_progress(player.course_id()).await.unwrap(), None);

        assert!(player.go_next().await);
        let raw = repo.load_progress(player.course_id()).await.unwrap().unwrap();
        assert!(raw.contains(r#""currentIndex":1"#));
    }

    #[tokio::test]
    async fn notice_expires_with_the_clock() {
        let repo = InMemoryRepository::new();
        let mut player = open_player(&repo).await;
        let video = player.current().lesson.id().clone();
        player.set_watch_percent(&video, 100).await;

        let outcome = player.complete_current().await;
        assert!(matches!(outcome, CompletionOutcome::Completed { .. }));
        let notice = player.active_notice().unwrap();
        assert_eq!(notice.lesson_id, video);
        assert_eq!(
            notice.message(),
            "Completed \"Tools and Materials\". 2 more lessons to get the badge!"
        );

        let mut clock = player.clock();
        clock.advance(Duration::seconds(3));
        player.set_clock(clock);
        assert!(player.active_notice().is_some());

        clock.advance(Duration::seconds(1));
        player.set_clock(clock);
        assert!(player.active_notice().is_none());
    }

    #[tokio::test]
    async fn locked_completion_raises_no_notice() {
        let repo = InMemoryRepository::new();
        let mut player = open_player(&repo).await;
        let outcome = player.complete_current().await;
        assert_eq!(
            outcome,
            CompletionOutcome::Locked {
                watched: 0,
                required: 80
            }
        );
        assert!(player.active_notice().is_none());
        assert_eq!(repo.load_progress(player.course_id()).await.unwrap(), None);
    }

    #[tokio::test]
    async fn reset_saves_defaults() {
        let repo = InMemoryRepository::new();
        let mut player = open_player(&repo).await;
        player.jump_to(3).await;
        player.reset().await;

        assert_eq!(player.state().current_index(), 0);
        let raw = repo.load_progress(player.course_id()).await.unwrap().unwrap();
        assert!(raw.contains(r#""currentIndex":0"#));
    }
}
