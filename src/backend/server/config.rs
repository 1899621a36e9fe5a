/**
 * Server Configuration
 *
 * This module turns an [`AppConfig`] into the services the server runs
 * with, focusing on the optional course store.
 *
 * # Error Handling
 *
 * Store errors are logged but do not prevent server startup. A store that
 * fails to open is treated like one that is not configured.
 */

use crate::backend::db::Database;
use crate::shared::AppConfig;

/// Open the course store named by `config`
///
/// # Returns
///
/// - `Some(Database)` if the store opened and its schema is in place
/// - `None` if `DATABASE_URL` is not set or opening fails
pub async fn load_database(config: &AppConfig) -> Option<Database> {
    let Some(url) = config.database_url.as_deref() else {
        tracing::warn!("DATABASE_URL is not set. Database-dependent routes will be disabled.");
        return None;
    };

    tracing::info!("Connecting to database...");

    match Database::connect(url, config.max_connections).await {
        Ok(db) => Some(db),
        Err(e) => {
            tracing::error!(error = %e, "Failed to open database");
            tracing::warn!("Database-dependent routes will be disabled.");
            None
        }
    }
}
