//! Shared Module
//!
//! Types and parsing shared by the backend and by any client of the HTTP
//! API. Nothing in here touches the store: it turns untyped request data into
//! typed values and defines the records the API returns.

/// Course hierarchy records
pub mod course;

/// Content block types and normalization
pub mod block;

/// Identifier and field parsing
pub mod ids;

/// Shared error types
pub mod error;

/// Application configuration
pub mod config;

/// Re-export commonly used types for convenience
pub use block::{parse_blocks, BlockContent, BlockDraft, BlockType, ListStyle};
pub use config::{AppConfig, AppConfigBuilder, ConfigError};
pub use course::{Block, Course, CourseSummary, Lesson, Module};
pub use error::SharedError;
