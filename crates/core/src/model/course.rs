use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::model::ids::{CourseId, LessonId, ModuleId};
use crate::model::lesson::{Lesson, LessonDraft, LessonError};

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum CourseError {
    #[error("course id cannot be empty")]
    EmptyId,

    #[error("course {id} has an empty title")]
    EmptyTitle { id: CourseId },

    #[error("module {id} has an empty title")]
    EmptyModuleTitle { id: ModuleId },

    #[error("course {id} has no lessons")]
    NoLessons { id: CourseId },

    #[error("lesson id {id} appears more than once")]
    DuplicateLesson { id: LessonId },

    #[error(transparent)]
    Lesson(#[from] LessonError),
}

//
// ─── RESOURCES ─────────────────────────────────────────────────────────────────
//

/// Downloadable material shown next to the player.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Resource {
    pub title: String,
    pub file: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size_label: Option<String>,
}

//
// ─── DRAFTS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModuleDraft {
    pub id: ModuleId,
    pub title: String,
    pub lessons: Vec<LessonDraft>,
}

/// Unvalidated course as read from a course file or the course table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CourseDraft {
    pub id: CourseId,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub modules: Vec<ModuleDraft>,
    #[serde(default)]
    pub resources: Vec<Resource>,
}

impl CourseDraft {
    /// Validate every module and lesson and build an immutable `Course`.
    ///
    /// # Errors
    ///
    /// Returns `CourseError` for blank ids/titles, a course without lessons,
    /// duplicate lesson ids, or any lesson validation failure.
    pub fn validate(self) -> Result<Course, CourseError> {
        if self.id.as_str().trim().is_empty() {
            return Err(CourseError::EmptyId);
        }
        let title = self.title.trim().to_owned();
        if title.is_empty() {
            return Err(CourseError::EmptyTitle { id: self.id });
        }

        let mut seen = HashSet::new();
        let mut modules = Vec::with_capacity(self.modules.len());
        for module in self.modules {
            let module_title = module.title.trim().to_owned();
            if module_title.is_empty() {
                return Err(CourseError::EmptyModuleTitle { id: module.id });
            }
            let mut lessons = Vec::with_capacity(module.lessons.len());
            for draft in module.lessons {
                let lesson = draft.validate()?;
                if !seen.insert(lesson.id().clone()) {
                    return Err(CourseError::DuplicateLesson {
                        id: lesson.id().clone(),
                    });
                }
                lessons.push(lesson);
            }
            modules.push(Module {
                id: module.id,
                title: module_title,
                lessons,
            });
        }

        if seen.is_empty() {
            return Err(CourseError::NoLessons { id: self.id });
        }

        Ok(Course {
            id: self.id,
            title,
            description: self
                .description
                .map(|d| d.trim().to_owned())
                .filter(|d| !d.is_empty()),
            modules,
            resources: self.resources,
        })
    }
}

//
// ─── MODULE / COURSE ───────────────────────────────────────────────────────────
//

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Module {
    id: ModuleId,
    title: String,
    lessons: Vec<Lesson>,
}

impl Module {
    #[must_use]
    pub fn id(&self) -> &ModuleId {
        &self.id
    }

    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    #[must_use]
    pub fn lessons(&self) -> &[Lesson] {
        &self.lessons
    }
}

/// Static, read-only course structure. Always holds at least one lesson.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Course {
    id: CourseId,
    title: String,
    description: Option<String>,
    modules: Vec<Module>,
    resources: Vec<Resource>,
}

impl Course {
    #[must_use]
    pub fn id(&self) -> &CourseId {
        &self.id
    }

    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    #[must_use]
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    #[must_use]
    pub fn modules(&self) -> &[Module] {
        &self.modules
    }

    #[must_use]
    pub fn resources(&self) -> &[Resource] {
        &self.resources
    }

    #[must_use]
    pub fn lesson_count(&self) -> usize {
        self.modules.iter().map(|m| m.lessons.len()).sum()
    }

    #[must_use]
    pub fn to_draft(&self) -> CourseDraft {
        CourseDraft {
            id: self.id.clone(),
            title: self.title.clone(),
            description: self.description.clone(),
            modules: self
                .modules
                .iter()
                .map(|m| ModuleDraft {
                    id: m.id.clone(),
                    title: m.title.clone(),
                    lessons: m.lessons.iter().map(Lesson::to_draft).collect(),
                })
                .collect(),
            resources: self.resources.clone(),
        }
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::lesson::{LessonKind, TextLesson};

    fn text(id: &str) -> LessonDraft {
        LessonDraft {
            id: LessonId::new(id),
            title: format!("Lesson {id}"),
            duration: None,
            completed: false,
            kind: LessonKind::Text(TextLesson {
                body: "body".into(),
            }),
        }
    }

    fn draft(modules: Vec<ModuleDraft>) -> CourseDraft {
        CourseDraft {
            id: CourseId::new("c1"),
            title: "  Block Printing  ".into(),
            description: Some("   ".into()),
            modules,
            resources: Vec::new(),
        }
    }

    #[test]
    fn validate_trims_and_counts() {
        let course = draft(vec![
            ModuleDraft {
                id: ModuleId::new("m1"),
                title: "Basics".into(),
                lessons: vec![text("a"), text("b")],
            },
            ModuleDraft {
                id: ModuleId::new("m2"),
                title: "Practice".into(),
                lessons: vec![text("c")],
            },
        ])
        .validate()
        .unwrap();

        assert_eq!(course.title(), "Block Printing");
        assert_eq!(course.description(), None);
        assert_eq!(course.lesson_count(), 3);
        assert_eq!(course.modules()[1].lessons()[0].id().as_str(), "c");
    }

    #[test]
    fn course_without_lessons_is_rejected() {
        let err = draft(vec![ModuleDraft {
            id: ModuleId::new("m1"),
            title: "Empty".into(),
            lessons: Vec::new(),
        }])
        .validate()
        .unwrap_err();
        assert_eq!(
            err,
            CourseError::NoLessons {
                id: CourseId::new("c1")
            }
        );
    }

    #[test]
    fn duplicate_lesson_ids_across_modules_are_rejected() {
        let err = draft(vec![
            ModuleDraft {
                id: ModuleId::new("m1"),
                title: "One".into(),
                lessons: vec![text("a")],
            },
            ModuleDraft {
                id: ModuleId::new("m2"),
                title: "Two".into(),
                lessons: vec![text("a")],
            },
        ])
        .validate()
        .unwrap_err();
        assert_eq!(
            err,
            CourseError::DuplicateLesson {
                id: LessonId::new("a")
            }
        );
    }

    #[test]
    fn to_draft_round_trips() {
        let course = draft(vec![ModuleDraft {
            id: ModuleId::new("m1"),
            title: "One".into(),
            lessons: vec![text("a")],
        }])
        .validate()
        .unwrap();
        let again = course.to_draft().validate().unwrap();
        assert_eq!(course, again);
    }
}
