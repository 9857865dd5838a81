//! Flat, order-preserving view over a course's nested modules and lessons.

use std::collections::HashMap;

use crate::model::{Course, Lesson, LessonId, Module};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Slot {
    module: usize,
    lesson: usize,
}

/// A lesson at a global position, together with its parent module.
#[derive(Debug, Clone, Copy)]
pub struct LessonRef<'a> {
    pub index: usize,
    pub module_index: usize,
    pub module: &'a Module,
    pub lesson: &'a Lesson,
}

/// Lesson catalogue for one course.
///
/// Global indices follow module order, then lesson order inside each module.
/// Lookups by index never fail: out-of-range positions clamp to the last
/// lesson.
#[derive(Debug, Clone)]
pub struct LessonCatalogue {
    course: Course,
    slots: Vec<Slot>,
    positions: HashMap<LessonId, usize>,
}

impl LessonCatalogue {
    #[must_use]
    pub fn new(course: Course) -> Self {
        let mut slots = Vec::with_capacity(course.lesson_count());
        let mut positions = HashMap::with_capacity(course.lesson_count());
        for (module_idx, module) in course.modules().iter().enumerate() {
            for (lesson_idx, lesson) in module.lessons().iter().enumerate() {
                positions.insert(lesson.id().clone(), slots.len());
                slots.push(Slot {
                    module: module_idx,
                    lesson: lesson_idx,
                });
            }
        }
        Self {
            course,
            slots,
            positions,
        }
    }

    #[must_use]
    pub fn course(&self) -> &Course {
        &self.course
    }

    /// Total number of lessons across all modules.
    #[must_use]
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    #[must_use]
    pub fn last_index(&self) -> usize {
        self.slots.len().saturating_sub(1)
    }

    /// Clamp `index` into `[0, len - 1]`.
    #[must_use]
    pub fn clamp(&self, index: usize) -> usize {
        index.min(self.last_index())
    }

    /// Lesson at `index`, clamped to the valid range.
    #[must_use]
    pub fn at(&self, index: usize) -> LessonRef<'_> {
        let index = self.clamp(index);
        self.resolve(index, self.slots[index])
    }

    /// Lesson at `index`, or `None` when out of range.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<LessonRef<'_>> {
        self.slots
            .get(index)
            .map(|slot| self.resolve(index, *slot))
    }

    #[must_use]
    pub fn position_of(&self, id: &LessonId) -> Option<usize> {
        self.positions.get(id).copied()
    }

    #[must_use]
    pub fn lesson(&self, id: &LessonId) -> Option<&Lesson> {
        self.position_of(id)
            .and_then(|idx| self.get(idx))
            .map(|r| r.lesson)
    }

    /// `(module title, lesson count)` in module order.
    #[must_use]
    pub fn module_lesson_counts(&self) -> Vec<(&str, usize)> {
        self.course
            .modules()
            .iter()
            .map(|m| (m.title(), m.lessons().len()))
            .collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = LessonRef<'_>> + '_ {
        self.slots
            .iter()
            .enumerate()
            .map(|(idx, slot)| self.resolve(idx, *slot))
    }

    fn resolve(&self, index: usize, slot: Slot) -> LessonRef<'_> {
        let module = &self.course.modules()[slot.module];
        LessonRef {
            index,
            module_index: slot.module,
            module,
            lesson: &module.lessons()[slot.lesson],
        }
    }
}
