//! Built-in sample catalogue, used when no course file is configured.

use lms_core::model::Course;

use crate::file::parse_courses;
use crate::repository::StorageError;

const DEMO_COURSES: &str = include_str!("../data/demo_courses.json");

/// Parse and validate the bundled demo courses.
///
/// # Errors
///
/// Returns `StorageError::Serialization` if the bundled data is invalid.
pub fn demo_courses() -> Result<Vec<Course>, StorageError> {
    parse_courses(DEMO_COURSES)
}

#[cfg(test)]
mod tests {
    use super::*;
    use lms_core::model::LessonKind;

    #[test]
    fn demo_data_is_valid() {
        let courses = demo_courses().unwrap();
        assert_eq!(courses.len(), 2);
        let kantha = &courses[0];
        assert_eq!(kantha.lesson_count(), 5);
        assert_eq!(kantha.resources().len(), 2);

        let kinds: Vec<_> = kantha
            .modules()
            .iter()
            .flat_map(|m| m.lessons())
            .map(|l| l.kind().label())
            .collect();
        assert_eq!(kinds, ["video", "sop", "video", "pdf", "text"]);

        let stitch = &kantha.modules()[1].lessons()[0];
        match stitch.kind() {
            LessonKind::Video(v) => assert_eq!(v.min_watch_percent, Some(90)),
            other => panic!("expected video, got {other:?}"),
        }
    }
}
