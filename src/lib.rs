//! LifeNotes Reporting Server Library
//!
//! This library exposes the internal modules for testing and potential reuse.

pub mod config;
pub mod lesson_store;
pub mod moderation;
pub mod reporting;
pub mod server;
pub mod sqlite_persistence;

// Re-export commonly used types for convenience
pub use lesson_store::{LessonStore, SqliteLessonStore};
pub use reporting::{ReportError, ReportingEngine};
pub use server::{run_server, RequestsLoggingLevel};
