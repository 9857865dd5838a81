#![forbid(unsafe_code)]

pub mod demo;
pub mod file;
pub mod repository;
pub mod sqlite;

pub use repository::{
    CourseRepository, InMemoryRepository, ProgressRepository, Storage, StorageError, progress_key,
};
