mod course;
mod ids;
mod lesson;
mod settings;

pub use ids::{CourseId, LessonId, ModuleId, ParseIdError};

pub use course::{Course, CourseDraft, CourseError, Module, ModuleDraft, Resource};
pub use lesson::{
    DEFAULT_MIN_WATCH_PERCENT, Lesson, LessonDraft, LessonError, LessonKind, PdfLesson, SopLesson,
    SopStep, TextLesson, VideoLesson,
};
pub use settings::{
    DEFAULT_BADGE_INTERVAL, DEFAULT_NOTICE_SECS, PlayerSettings, PlayerSettingsDraft,
    SettingsError,
};
