#![forbid(unsafe_code)]

pub mod app_services;
pub mod catalog_service;
pub mod error;
pub mod player_service;
pub mod progress_store;

pub use lms_core::Clock;

pub use app_services::{AppServices, StoreTarget};
pub use catalog_service::{CourseCatalogService, CourseSummary};
pub use error::{AppServicesError, CatalogServiceError, ParseStoreTargetError, PlayerServiceError};
pub use player_service::{CompletionNotice, CoursePlayerService};
pub use progress_store::ProgressStore;
