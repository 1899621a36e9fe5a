/**
 * Application State Management
 *
 * This module defines the application state structure and implements
 * the `FromRef` traits for Axum state extraction.
 *
 * # Architecture
 *
 * The store handle is the only state the server shares between requests.
 * It is optional: without `DATABASE_URL` the server still runs, and every
 * store-backed handler answers 503.
 *
 * # State Extraction
 *
 * Handlers extract `State<Option<Database>>` rather than the whole
 * `AppState`.
 *
 * ```rust
 * use syllabus::backend::db::Database;
 * use axum::extract::State;
 *
 * async fn handler(State(db): State<Option<Database>>) {
 *     if let Some(db) = db {
 *         // ...
 *     }
 * }
 * ```
 */

use axum::extract::FromRef;

use crate::backend::db::Database;

/// Application state shared by all handlers
#[derive(Debug, Clone, Default)]
pub struct AppState {
    /// Course store, `None` when no database is configured
    pub db: Option<Database>,
}

impl AppState {
    pub fn new(db: Option<Database>) -> Self {
        Self { db }
    }

    /// Close the store, if any. Called once the server has stopped.
    pub async fn shutdown(&self) {
        if let Some(db) = &self.db {
            db.close().await;
        }
    }
}

impl FromRef<AppState> for Option<Database> {
    fn from_ref(state: &AppState) -> Self {
        state.db.clone()
    }
}
