//! Backend Module
//!
//! This module contains all server-side code: the transactional course
//! store, the two engines that keep it consistent, and the Axum HTTP
//! surface in front of them.
//!
//! This module is only compiled when the `ssr` feature is enabled.
//!
//! # Architecture
//!
//! - **`db`** - SQLite pool, schema, `Database::mutate` transaction protocol
//! - **`ordering`** - Dense sibling positions: append, reorder, delete
//! - **`courses`** - Course, module and lesson operations and handlers
//! - **`blocks`** - Block reconciliation and handlers
//! - **`server`** - Application state, store loading, app creation, health
//! - **`routes`** - Route configuration and router assembly
//! - **`extract`** - Lenient JSON body extractor
//! - **`error`** - Backend error type and its HTTP mapping
//!
//! # Module Structure
//!
//! ```text
//! backend/
//! ├── mod.rs          - Module exports and documentation
//! ├── main.rs         - syllabus-server binary
//! ├── db/             - Store and transactions
//! ├── ordering/       - Ordered collection engine
//! ├── courses/        - Courses, modules, lessons
//! ├── blocks/         - Content blocks
//! ├── server/         - Server initialization and state
//! ├── routes/         - Route configuration
//! ├── extract.rs      - Request body extraction
//! └── error/          - Error types
//! ```
//!
//! # Request Flow
//!
//! A handler checks that a store is configured, parses path ids and the
//! body, then calls one `db` function. Every write goes through
//! [`db::Database::mutate`], so a failed check anywhere rolls back the
//! whole operation.

pub mod blocks;
pub mod courses;
pub mod db;
pub mod error;
pub mod extract;
pub mod ordering;
pub mod routes;
pub mod server;

pub use error::{BackendError, BackendResult};
