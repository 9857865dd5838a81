#![forbid(unsafe_code)]

pub mod catalogue;
pub mod completion;
pub mod error;
pub mod model;
pub mod player;
pub mod progress;
pub mod time;

pub use catalogue::{LessonCatalogue, LessonRef};
pub use completion::{CompletionGate, MilestoneTeaser, can_complete, milestone_teaser};
pub use error::Error;
pub use player::{CompletionOutcome, LessonListItem, PlayerState};
pub use progress::{PartialProgress, ProgressRecord};
pub use time::Clock;
