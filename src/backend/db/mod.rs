//! # Database Module
//!
//! The transactional store behind every course operation: a sqlx SQLite
//! pool, the schema, and the mutation protocol in [`transaction`].
//!
//! ## Lifecycle
//!
//! The handle is created once at startup and passed to whoever needs it;
//! there is no global pool. [`Database::close`] drains it on shutdown.
//!
//! ```rust,no_run
//! use syllabus::backend::db::Database;
//!
//! # async fn example() -> Result<(), syllabus::backend::BackendError> {
//! let db = Database::connect("sqlite://syllabus.db", 5).await?;
//! let now = db.ping().await?;
//! db.close().await;
//! # Ok(())
//! # }
//! ```

pub mod transaction;

use std::str::FromStr;
use std::time::Duration;

use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};
use sqlx::SqlitePool;

use crate::backend::error::BackendResult;

/// Current database schema version
pub const SCHEMA_VERSION: i64 = 1;

const SCHEMA: &str = include_str!("schema.sql");

/// How long a connection waits on a locked database before failing
const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// Database connection manager
///
/// Cheap to clone; clones share one pool.
#[derive(Debug, Clone)]
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    /// Open (creating if missing) the database at `url` and apply the schema.
    ///
    /// Foreign keys are enforced so child rows cascade with their parent.
    /// File databases run in WAL mode.
    pub async fn connect(url: &str, max_connections: u32) -> BackendResult<Self> {
        let options = SqliteConnectOptions::from_str(url)?
            .create_if_missing(true)
            .foreign_keys(true)
            .journal_mode(SqliteJournalMode::Wal)
            .busy_timeout(BUSY_TIMEOUT);

        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections)
            .connect_with(options)
            .await?;

        tracing::info!(max_connections, "Database connection pool created");

        let db = Self { pool };
        db.init_schema().await?;
        Ok(db)
    }

    /// Private in-memory database on a single pinned connection.
    ///
    /// The connection is never recycled, since dropping it would drop the
    /// data with it.
    pub async fn connect_in_memory() -> BackendResult<Self> {
        let options = SqliteConnectOptions::from_str("sqlite::memory:")?.foreign_keys(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .min_connections(1)
            .idle_timeout(None::<Duration>)
            .max_lifetime(None::<Duration>)
            .connect_with(options)
            .await?;

        let db = Self { pool };
        db.init_schema().await?;
        Ok(db)
    }

    /// Create tables and indexes, then record the schema version.
    async fn init_schema(&self) -> BackendResult<()> {
        sqlx::raw_sql(SCHEMA).execute(&self.pool).await?;

        let (current,): (i64,) =
            sqlx::query_as("SELECT COALESCE(MAX(version), 0) FROM schema_migrations")
                .fetch_one(&self.pool)
                .await?;

        if current < SCHEMA_VERSION {
            sqlx::query("INSERT INTO schema_migrations (version, applied_at) VALUES (?, ?)")
                .bind(SCHEMA_VERSION)
                .bind(chrono::Utc::now())
                .execute(&self.pool)
                .await?;
            tracing::info!(version = SCHEMA_VERSION, "Database schema initialized");
        }

        Ok(())
    }

    /// Get connection pool reference
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Round-trip to the store, returning its current UTC time
    pub async fn ping(&self) -> BackendResult<String> {
        let (now,): (String,) = sqlx::query_as("SELECT strftime('%Y-%m-%dT%H:%M:%fZ', 'now')")
            .fetch_one(&self.pool)
            .await?;
        Ok(now)
    }

    /// Close every pooled connection. Further calls fail with a store error.
    pub async fn close(&self) {
        self.pool.close().await;
        tracing::info!("Database connection pool closed");
    }

    pub fn is_closed(&self) -> bool {
        self.pool.is_closed()
    }
}
