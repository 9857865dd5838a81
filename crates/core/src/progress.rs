//! Per-learner progress through one course, and its persisted JSON shape.

use std::collections::{BTreeMap, BTreeSet};

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{Map, Value};

use crate::catalogue::LessonCatalogue;
use crate::model::LessonId;

const FIELD_CURRENT_INDEX: &str = "currentIndex";
const FIELD_WATCH_PERCENT: &str = "videoWatchPercent";
const FIELD_STEP_INDEX: &str = "sopStepIndex";
const FIELD_NOTES: &str = "notesPerLesson";
const FIELD_COMPLETED: &str = "completedLessons";
const FIELD_LOW_BANDWIDTH: &str = "lowBandwidth";

/// Everything the player remembers about a learner's pass through a course.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProgressRecord {
    pub current_index: usize,
    pub video_watch_percent: BTreeMap<LessonId, u8>,
    pub sop_step_index: BTreeMap<LessonId, usize>,
    pub notes_per_lesson: BTreeMap<LessonId, String>,
    pub completed: BTreeSet<LessonId>,
    pub low_bandwidth: bool,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct PersistedProgress<'a> {
    current_index: usize,
    video_watch_percent: &'a BTreeMap<LessonId, u8>,
    sop_step_index: &'a BTreeMap<LessonId, usize>,
    notes_per_lesson: &'a BTreeMap<LessonId, String>,
    low_bandwidth: bool,
    #[serde(rename = "completedLessons", skip_serializing_if = "Option::is_none")]
    completed: Option<&'a BTreeSet<LessonId>>,
}

impl ProgressRecord {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn watch_percent(&self, id: &LessonId) -> u8 {
        self.video_watch_percent.get(id).copied().unwrap_or(0)
    }

    #[must_use]
    pub fn step_index(&self, id: &LessonId) -> usize {
        self.sop_step_index.get(id).copied().unwrap_or(0)
    }

    #[must_use]
    pub fn note(&self, id: &LessonId) -> Option<&str> {
        self.notes_per_lesson.get(id).map(String::as_str)
    }

    #[must_use]
    pub fn is_completed(&self, id: &LessonId) -> bool {
        self.completed.contains(id)
    }

    /// Serialize to the stored JSON object. The completed set is written only
    /// when `include_completed` is set.
    ///
    /// # Errors
    ///
    /// Returns the underlying `serde_json` error if serialization fails.
    pub fn to_json(&self, include_completed: bool) -> Result<String, serde_json::Error> {
        serde_json::to_string(&PersistedProgress {
            current_index: self.current_index,
            video_watch_percent: &self.video_watch_percent,
            sop_step_index: &self.sop_step_index,
            notes_per_lesson: &self.notes_per_lesson,
            low_bandwidth: self.low_bandwidth,
            completed: include_completed.then_some(&self.completed),
        })
    }
}

/// A stored progress blob after lenient decoding.
///
/// Each field decodes on its own; a field that is absent or has the wrong
/// shape is `None` and does not affect the others.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PartialProgress {
    pub current_index: Option<usize>,
    pub video_watch_percent: Option<BTreeMap<LessonId, u8>>,
    pub sop_step_index: Option<BTreeMap<LessonId, usize>>,
    pub notes_per_lesson: Option<BTreeMap<LessonId, String>>,
    pub completed: Option<BTreeSet<LessonId>>,
    pub low_bandwidth: Option<bool>,
}

fn field<T: DeserializeOwned>(obj: &Map<String, Value>, key: &str) -> Option<T> {
    obj.get(key)
        .and_then(|v| serde_json::from_value(v.clone()).ok())
}

/// Decode a lesson-keyed object entry by entry. Entries whose value has the
/// wrong shape are skipped; the rest survive.
fn entries<T: DeserializeOwned>(
    obj: &Map<String, Value>,
    key: &str,
) -> Option<BTreeMap<LessonId, T>> {
    let map = obj.get(key)?.as_object()?;
    Some(
        map.iter()
            .filter_map(|(id, v)| {
                let value = serde_json::from_value(v.clone()).ok()?;
                Some((LessonId::new(id.as_str()), value))
            })
            .collect(),
    )
}

fn watch_entries(obj: &Map<String, Value>) -> Option<BTreeMap<LessonId, u8>> {
    let raw: BTreeMap<LessonId, u64> = entries(obj, FIELD_WATCH_PERCENT)?;
    Some(
        raw.into_iter()
            .map(|(id, pct)| (id, u8::try_from(pct.min(100)).unwrap_or(100)))
            .collect(),
    )
}

impl PartialProgress {
    /// Decode a stored blob. Returns `None` when the text is not a JSON object.
    #[must_use]
    pub fn decode(raw: &str) -> Option<Self> {
        let value: Value = serde_json::from_str(raw).ok()?;
        let obj = value.as_object()?;
        Some(Self {
            current_index: field(obj, FIELD_CURRENT_INDEX),
            video_watch_percent: watch_entries(obj),
            sop_step_index: entries(obj, FIELD_STEP_INDEX),
            notes_per_lesson: entries(obj, FIELD_NOTES),
            completed: field(obj, FIELD_COMPLETED),
            low_bandwidth: field(obj, FIELD_LOW_BANDWIDTH),
        })
    }

    /// Fill missing fields with defaults and reconcile with the course:
    /// the index is clamped, step cursors are clamped to each lesson's last
    /// step, watch percentages are capped at 100, and entries for lessons the
    /// course does not contain (or of the wrong kind) are dropped.
    #[must_use]
    pub fn into_record(self, catalogue: &LessonCatalogue) -> ProgressRecord {
        let video_watch_percent = self
            .video_watch_percent
            .unwrap_or_default()
            .into_iter()
            .filter(|(id, _)| catalogue.lesson(id).is_some_and(|l| l.is_video()))
            .map(|(id, pct)| (id, pct.min(100)))
            .collect();

        let sop_step_index = self
            .sop_step_index
            .unwrap_or_default()
            .into_iter()
            .filter_map(|(id, step)| {
                let steps = catalogue.lesson(&id)?.step_count()?;
                Some((id, step.min(steps.saturating_sub(1))))
            })
            .collect();

        let notes_per_lesson = self
            .notes_per_lesson
            .unwrap_or_default()
            .into_iter()
            .filter(|(id, _)| catalogue.position_of(id).is_some())
            .collect();

        let completed = self
            .completed
            .unwrap_or_default()
            .into_iter()
            .filter(|id| catalogue.position_of(id).is_some())
            .collect();

        ProgressRecord {
            current_index: catalogue.clamp(self.current_index.unwrap_or(0)),
            video_watch_percent,
            sop_step_index,
            notes_per_lesson,
            completed,
            low_bandwidth: self.low_bandwidth.unwrap_or(false),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{
        CourseDraft, CourseId, LessonDraft, LessonKind, ModuleDraft, ModuleId, SopLesson, SopStep,
        TextLesson, VideoLesson,
    };

    fn catalogue() -> LessonCatalogue {
        let step = |t: &str| SopStep {
            title: t.into(),
            image: None,
            caption: String::new(),
        };
        let course = CourseDraft {
            id: CourseId::new("c1"),
            title: "Embroidery".into(),
            description: None,
            modules: vec![ModuleDraft {
                id: ModuleId::new("m1"),
                title: "Intro".into(),
                lessons: vec![
                    LessonDraft {
                        id: LessonId::new("video"),
                        title: "Watch".into(),
                        duration: None,
                        completed: false,
                        kind: LessonKind::Video(VideoLesson {
                            asset: "v.mp4".into(),
                            key_points: Vec::new(),
                            min_watch_percent: None,
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
                        completed: false,
                        kind: LessonKind::Text(TextLesson { body: "b".into() }),
                    },
                ],
            }],
            resources: Vec::new(),
        }
        .validate()
        .unwrap();
        LessonCatalogue::new(course)
    }

    #[test]
    fn decode_rejects_non_objects() {
        assert_eq!(PartialProgress::decode("not json"), None);
        assert_eq!(PartialProgress::decode("[1,2]"), None);
        assert_eq!(PartialProgress::decode("null"), None);
    }

    #[test]
    fn decode_defaults_each_field_independently() {
        let raw = r#"{"currentIndex":"two","videoWatchPercent":{"video":55},"lowBandwidth":true}"#;
        let partial = PartialProgress::decode(raw).unwrap();
        assert_eq!(partial.current_index, None);
        assert_eq!(partial.low_bandwidth, Some(true));
        assert_eq!(partial.sop_step_index, None);

        let record = partial.into_record(&catalogue());
        assert_eq!(record.current_index, 0);
        assert_eq!(record.watch_percent(&LessonId::new("video")), 55);
        assert!(record.low_bandwidth);
    }

    #[test]
    fn reconcile_clamps_and_drops_unknown_entries() {
        let raw = r#"{
            "currentIndex": 42,
            "videoWatchPercent": {"video": 300, "sop": 10, "ghost": 90},
            "sopStepIndex": {"sop": 17, "text": 2},
            "notesPerLesson": {"text": "remember", "ghost": "stale"},
            "completedLessons": ["text", "ghost"]
        }"#;
        let record = PartialProgress::decode(raw)
            .unwrap()
            .into_record(&catalogue());
        assert_eq!(record.current_index, 2);
        assert_eq!(record.watch_percent(&LessonId::new("video")), 100);
        assert_eq!(record.video_watch_percent.len(), 1);
        assert_eq!(record.step_index(&LessonId::new("sop")), 2);
        assert!(!record.sop_step_index.contains_key(&LessonId::new("text")));
        assert_eq!(record.note(&LessonId::new("text")), Some("remember"));
        assert_eq!(record.notes_per_lesson.len(), 1);
        assert_eq!(record.completed.len(), 1);
    }

    #[test]
    fn watch_percent_above_100_is_capped() {
        let raw = r#"{"videoWatchPercent": {"video": 180}}"#;
        let record = PartialProgress::decode(raw)
            .unwrap()
            .into_record(&catalogue());
        assert_eq!(record.watch_percent(&LessonId::new("video")), 100);
    }

    #[test]
    fn malformed_watch_entry_keeps_its_neighbours() {
        let raw = r#"{
            "videoWatchPercent": {"video": 300, "sop": "half", "text": -4},
            "sopStepIndex": {"sop": 1, "text": "two"},
            "notesPerLesson": {"text": "keep", "sop": 7}
        }"#;
        let partial = PartialProgress::decode(raw).unwrap();
        assert_eq!(
            partial.video_watch_percent,
            Some(BTreeMap::from([(LessonId::new("video"), 100)]))
        );
        assert_eq!(
            partial.sop_step_index,
            Some(BTreeMap::from([(LessonId::new("sop"), 1)]))
        );

        let record = partial.into_record(&catalogue());
        assert_eq!(record.watch_percent(&LessonId::new("video")), 100);
        assert_eq!(record.step_index(&LessonId::new("sop")), 1);
        assert_eq!(record.note(&LessonId::new("text")), Some("keep"));
        assert_eq!(record.notes_per_lesson.len(), 1);
    }

    #[test]
    fn json_uses_stored_field_names() {
        let mut record = ProgressRecord::new();
        record.current_index = 1;
        record.completed.insert(LessonId::new("text"));
        let json = record.to_json(true).unwrap();
        for key in [
            "currentIndex",
            "videoWatchPercent",
            "sopStepIndex",
            "notesPerLesson",
            "lowBandwidth",
            "completedLessons",
        ] {
            assert!(json.contains(key), "missing {key} in {json}");
        }

        let without = record.to_json(false).unwrap();
        assert!(!without.contains("completedLessons"));
    }

    #[test]
    fn round_trip_preserves_fields() {
        let mut record = ProgressRecord::new();
        record.current_index = 1;
        record
            .video_watch_percent
            .insert(LessonId::new("video"), 80);
        record.sop_step_index.insert(LessonId::new("sop"), 1);
        record
            .notes_per_lesson
            .insert(LessonId::new("text"), "use silk thread".into());
        record.completed.insert(LessonId::new("video"));
        record.low_bandwidth = true;

        let json = record.to_json(true).unwrap();
        let restored = PartialProgress::decode(&json)
            .unwrap()
            .into_record(&catalogue());
        assert_eq!(restored, record);
    }
}
