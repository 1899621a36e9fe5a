//! Transactional mutation protocol
//!
//! Every invariant-preserving write (append, reorder, delete, block
//! replacement) runs through [`Database::mutate`]:
//!
//! 1. begin an immediate (write-locked) transaction on a pooled connection
//! 2. run the operation, which checks its preconditions inline
//! 3. commit on `Ok`, roll back on any `Err`
//!
//! Writers queue on the store's busy timeout instead of failing when another
//! mutation holds the lock. The connection goes back to the pool on every
//! path. A dropped transaction (panic, cancelled request) is rolled back by
//! sqlx.

use chrono::{DateTime, Utc};
use futures_util::future::BoxFuture;
use sqlx::SqliteConnection;

use crate::backend::db::Database;
use crate::backend::error::BackendResult;

impl Database {
    /// Run `op` inside one transaction.
    ///
    /// `op` receives the transaction's connection and the timestamp to stamp
    /// on every row it touches, so one mutation never spreads over several
    /// instants. `label` names the operation in logs.
    ///
    /// ```rust,no_run
    /// # use syllabus::backend::db::Database;
    /// # async fn example(db: &Database) -> syllabus::backend::BackendResult<()> {
    /// let count: i64 = db
    ///     .mutate("count courses", |conn, _now| {
    ///         Box::pin(async move {
    ///             let (n,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM courses")
    ///                 .fetch_one(&mut *conn)
    ///                 .await?;
    ///             Ok(n)
    ///         })
    ///     })
    ///     .await?;
    /// # Ok(())
    /// # }
    /// ```
    pub async fn mutate<T, F>(&self, label: &'static str, op: F) -> BackendResult<T>
    where
        T: Send,
        F: for<'c> FnOnce(&'c mut SqliteConnection, DateTime<Utc>) -> BoxFuture<'c, BackendResult<T>>,
    {
        // write lock up front: concurrent writers wait on the busy timeout
        let mut tx = self.pool().begin_with("BEGIN IMMEDIATE").await.inspect_err(|e| {
            tracing::error!(operation = label, error = %e, "Failed to begin transaction");
        })?;

        let now = Utc::now();
        match op(&mut *tx, now).await {
            Ok(value) => {
                tx.commit().await.inspect_err(|e| {
                    tracing::error!(operation = label, error = %e, "Failed to commit transaction");
                })?;
                tracing::debug!(operation = label, "Transaction committed");
                Ok(value)
            }
            Err(err) => {
                if let Err(rollback_err) = tx.rollback().await {
                    tracing::error!(
                        operation = label,
                        error = %rollback_err,
                        "Failed to rollback transaction"
                    );
                }

                if err.status_code().is_server_error() {
                    tracing::error!(operation = label, error = %err, "Transaction rolled back");
                } else {
                    tracing::warn!(operation = label, error = %err, "Transaction rolled back");
                }
                Err(err)
            }
        }
    }
}
