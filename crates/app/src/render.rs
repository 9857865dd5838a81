//! Plain-text rendering for the terminal player.

use std::fmt::Write as _;

use lms_core::model::{Course, LessonKind};
use lms_core::{CompletionGate, CompletionOutcome, LessonListItem, PlayerState};
use services::CourseSummary;

#[must_use]
pub fn course_list(courses: &[CourseSummary]) -> String {
    if courses.is_empty() {
        return "No courses available.\n".to_owned();
    }
    let mut out = String::new();
    for c in courses {
        let _ = writeln!(
            out,
            "{:<24} {} ({} modules, {} lessons)",
            c.id.as_str(),
            c.title,
            c.module_count,
            c.lesson_count
        );
    }
    out
}

#[must_use]
pub fn status(state: &PlayerState) -> String {
    let current = state.current();
    format!(
        "{title}\n  {done}/{total} lessons complete ({pct}%)\n  current: {pos}. {lesson}\n  low bandwidth: {bw}\n",
        title = state.catalogue().course().title(),
        done = state.completed_count(),
        total = state.total_lessons(),
        pct = state.completion_percent(),
        pos = current.index + 1,
        lesson = current.lesson.title(),
        bw = if state.progress().low_bandwidth { "on" } else { "off" },
    )
}

/// The current lesson as the player would show it.
#[must_use]
pub fn lesson_view(state: &PlayerState) -> String {
    let current = state.current();
    let lesson = current.lesson;
    let progress = state.progress();
    let low_bandwidth = progress.low_bandwidth;
    let mut out = String::new();

    let _ = write!(
        out,
        "[{}/{}] {} > {}",
        current.index + 1,
        state.total_lessons(),
        current.module.title(),
        lesson.title()
    );
    if let Some(duration) = lesson.duration() {
        let _ = write!(out, " ({duration})");
    }
    if progress.is_completed(lesson.id()) {
        out.push_str(" [done]");
    }
    out.push('\n');

    match lesson.kind() {
        LessonKind::Video(video) => {
            if low_bandwidth {
                out.push_str("  Video hidden in low-bandwidth mode.\n");
            } else {
                let _ = writeln!(out, "  Video: {}", video.asset);
            }
            let _ = writeln!(out, "  Watched: {}%", progress.watch_percent(lesson.id()));
            if !video.key_points.is_empty() {
                out.push_str("  Key points:\n");
                for point in &video.key_points {
                    let _ = writeln!(out, "    - {point}");
                }
            }
        }
        LessonKind::Sop(sop) => {
            let index = progress.step_index(lesson.id());
            if let Some(step) = sop.steps.get(index) {
                let _ = writeln!(out, "  Step {} of {}: {}", index + 1, sop.steps.len(), step.title);
                if let (false, Some(image)) = (low_bandwidth, &step.image) {
                    let _ = writeln!(out, "  Image: {image}");
                }
                if !step.caption.is_empty() {
                    let _ = writeln!(out, "  {}", step.caption);
                }
            }
        }
        LessonKind::Text(text) => {
            for line in text.body.lines() {
                let _ = writeln!(out, "  {line}");
            }
        }
        LessonKind::Pdf(pdf) => {
            let _ = write!(out, "  Document: {}", pdf.file);
            if let Some(pages) = pdf.pages {
                let _ = write!(out, " ({pages} pages)");
            }
            out.push('\n');
        }
    }

    if let Some(note) = progress.note(lesson.id()) {
        let _ = writeln!(out, "  Note: {note}");
    }
    if !progress.is_completed(lesson.id()) {
        if let CompletionGate::Locked { watched, required } = state.current_gate() {
            let _ = writeln!(
                out,
                "  Watch at least {required}% to complete (currently {watched}%)."
            );
        }
    }
    out
}

#[must_use]
pub fn lesson_list(items: &[LessonListItem]) -> String {
    let mut out = String::new();
    let mut module: Option<&str> = None;
    for item in items {
        if module != Some(item.module_title.as_str()) {
            let _ = writeln!(out, "{}", item.module_title);
            module = Some(item.module_title.as_str());
        }
        let _ = writeln!(
            out,
            "{} {:>2}. {} ({}){}",
            if item.is_current { '>' } else { ' ' },
            item.index + 1,
            item.title,
            item.kind,
            if item.completed { " [done]" } else { "" }
        );
    }
    out
}

#[must_use]
pub fn resources(course: &Course) -> String {
    if course.resources().is_empty() {
        return "No downloadable resources.\n".to_owned();
    }
    let mut out = String::new();
    for r in course.resources() {
        let _ = write!(out, "  {} - {}", r.title, r.file);
        if let Some(size) = &r.size_label {
            let _ = write!(out, " ({size})");
        }
        out.push('\n');
    }
    out
}

#[must_use]
pub fn outcome(outcome: &CompletionOutcome) -> String {
    match outcome {
        CompletionOutcome::Completed { advanced_to, .. } => match advanced_to {
            Some(index) => format!("Moving on to lesson {}.\n", index + 1),
            None => "That was the last lesson.\n".to_owned(),
        },
        CompletionOutcome::AlreadyComplete => "Already completed.\n".to_owned(),
        CompletionOutcome::Locked { watched, required } => {
            format!("Locked: watched {watched}%, need {required}%.\n")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lms_core::model::{LessonId, PlayerSettings};
    use lms_core::LessonCatalogue;
    use storage::demo::demo_courses;

    fn kantha_state() -> PlayerState {
        let course = demo_courses().unwrap().remove(0);
        PlayerState::new(LessonCatalogue::new(course), PlayerSettings::default())
    }

    #[test]
    fn video_view_shows_watch_gate() {
        let mut state = kantha_state();
        state.set_watch_percent(&LessonId::new("nk-l1"), 40);
        let view = lesson_view(&state);
        assert!(view.starts_with("[1/5] Getting Started > Tools and Materials"));
        assert!(view.contains("Watched: 40%"));
        assert!(view.contains("Watch at least 80% to complete (currently 40%)."));
    }

    #[test]
    fn low_bandwidth_hides_media() {
        let mut state = kantha_state();
        state.toggle_low_bandwidth();
        assert!(lesson_view(&state).contains("Video hidden"));

        state.go_next();
        let view = lesson_view(&state);
        assert!(view.contains("Step 1 of 3: Lay out the base layer"));
        assert!(!view.contains("Image:"));
    }

    #[test]
    fn list_marks_current_and_done() {
        let mut state = kantha_state();
        state.go_next();
        state.complete_current();
        let listing = lesson_list(&state.lesson_list());
        assert!(listing.contains("   2. Layering the Fabric (sop) [done]"));
        assert!(listing.contains(">  3. The Running Stitch (video)"));
        assert!(listing.starts_with("Getting Started\n"));
    }

    #[test]
    fn resources_include_size_labels() {
        let state = kantha_state();
        let text = resources(state.catalogue().course());
        assert!(text.contains("Motif Reference Sheet - docs/nk/motifs.pdf (2.4 MB)"));
    }
}
