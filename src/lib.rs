//! Syllabus - Course Outline Store
//!
//! Syllabus stores courses as a strictly ordered hierarchy
//! (course → module → lesson → content block) on top of a transactional
//! SQLite store, and serves it over an Axum HTTP API.
//!
//! # Overview
//!
//! Two engines carry the weight:
//!
//! - **Ordered collections** ([`backend::ordering`]) keep sibling positions
//!   dense and zero-based across append, delete and full reorder.
//! - **Block reconciliation** ([`backend::blocks`]) replaces a lesson's blocks
//!   from a complete submitted list, diffing it against the stored rows and
//!   bumping a block's version only when its normalized content changed.
//!
//! Both run every mutation inside one database transaction
//! ([`backend::db::Database::mutate`]).
//!
//! # Module Structure
//!
//! - **`shared`** - Wire records, block normalization, id parsing, config
//! - **`backend`** - Store, engines, HTTP handlers (only with `ssr`)
//!
//! # Feature Flags
//!
//! - **`ssr`** (default) - Server code: axum, sqlx store, tracing subscriber
//!
//! # Usage
//!
//! ```rust,no_run
//! use syllabus::backend::db::Database;
//! use syllabus::backend::server::{create_app, AppState};
//!
//! # async fn example() -> Result<(), syllabus::backend::BackendError> {
//! let db = Database::connect("sqlite://syllabus.db", 5).await?;
//! let app = create_app(AppState::new(Some(db)), &Default::default());
//! # Ok(())
//! # }
//! ```

/// Shared types and data structures
pub mod shared;

/// Backend server-side code
#[cfg(feature = "ssr")]
pub mod backend;
