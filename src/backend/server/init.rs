/**
 * Server Initialization
 *
 * This module assembles the Axum application from an already-built
 * [`AppState`] and the validated [`AppConfig`].
 *
 * # Initialization Process
 *
 * 1. Load the course store (see [`super::config::load_database`])
 * 2. Wrap it in `AppState`
 * 3. Create the router with CORS and request tracing
 *
 * Step 1 happens in the binary so tests can inject an in-memory store.
 */

use axum::Router;

use crate::backend::routes::create_router;
use crate::backend::server::state::AppState;
use crate::shared::AppConfig;

/// Create and configure the Axum application
///
/// # Returns
///
/// Configured Axum Router ready to serve requests
pub fn create_app(state: AppState, config: &AppConfig) -> Router<()> {
    tracing::info!(
        database = state.db.is_some(),
        cors_origins = ?config.cors_origins,
        "Initializing course outline server"
    );

    create_router(state, &config.cors_origins)
}
