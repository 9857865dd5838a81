use thiserror::Error;

use crate::model::{CourseError, LessonError, SettingsError};

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    #[error(transparent)]
    Course(#[from] CourseError),
    #[error(transparent)]
    Lesson(#[from] LessonError),
    #[error(transparent)]
    Settings(#[from] SettingsError),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{CourseId, PlayerSettingsDraft};

    #[test]
    fn domain_errors_convert() {
        let err: Error = PlayerSettingsDraft {
            badge_interval: Some(0),
            ..PlayerSettingsDraft::new()
        }
        .validate()
        .unwrap_err()
        .into();
        assert!(matches!(err, Error::Settings(SettingsError::InvalidBadgeInterval)));

        let err: Error = CourseError::NoLessons {
            id: CourseId::new("empty"),
        }
        .into();
        assert_eq!(err.to_string(), "course empty has no lessons");
    }
}
