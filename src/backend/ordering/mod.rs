//! Ordered collection engine
//!
//! For every parent, children hold positions `0..n-1` with no gaps and no
//! duplicates. This module owns the three mutations that can break that
//! (append, full reorder, delete) and the helpers the block reconciler
//! reuses. All functions take the connection of an open transaction; the
//! caller commits.
//!
//! The store has a unique index on `(parent, position)`, so rewrites go in
//! two passes: rows are parked at distinct negative positions first, then
//! given their final index.
//!
//! Positions read back from the store go through [`read_position`], which
//! turns malformed values into 0. Writes never produce them.

mod validate;

pub use validate::{is_dense, validate_membership};

use chrono::{DateTime, Utc};
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqliteConnection};
use uuid::Uuid;

use crate::backend::error::{BackendError, BackendResult};

/// A parent → children relation whose children carry a `position`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OrderedCollection {
    /// modules of a course
    CourseModules,
    /// lessons of a module
    ModuleLessons,
    /// blocks of a lesson
    LessonBlocks,
}

impl OrderedCollection {
    pub fn child_table(self) -> &'static str {
        match self {
            Self::CourseModules => "modules",
            Self::ModuleLessons => "lessons",
            Self::LessonBlocks => "blocks",
        }
    }

    pub fn child_key(self) -> &'static str {
        match self {
            Self::CourseModules => "module_id",
            Self::ModuleLessons => "lesson_id",
            Self::LessonBlocks => "block_id",
        }
    }

    pub fn parent_table(self) -> &'static str {
        match self {
            Self::CourseModules => "courses",
            Self::ModuleLessons => "modules",
            Self::LessonBlocks => "lessons",
        }
    }

    /// Key column of the parent table, also the foreign key in the child table
    pub fn parent_key(self) -> &'static str {
        match self {
            Self::CourseModules => "course_id",
            Self::ModuleLessons => "module_id",
            Self::LessonBlocks => "lesson_id",
        }
    }

    pub fn parent_entity(self) -> &'static str {
        match self {
            Self::CourseModules => "Course",
            Self::ModuleLessons => "Module",
            Self::LessonBlocks => "Lesson",
        }
    }

    pub fn child_entity(self) -> &'static str {
        match self {
            Self::CourseModules => "Module",
            Self::ModuleLessons => "Lesson",
            Self::LessonBlocks => "Block",
        }
    }

    /// Request field carrying a full ordering of this collection
    pub fn ids_field(self) -> &'static str {
        match self {
            Self::CourseModules => "moduleIds",
            Self::ModuleLessons => "lessonIds",
            Self::LessonBlocks => "blockIds",
        }
    }

    /// The collection the parent itself is a child of
    pub fn parent_collection(self) -> Option<OrderedCollection> {
        match self {
            Self::CourseModules => None,
            Self::ModuleLessons => Some(Self::CourseModules),
            Self::LessonBlocks => Some(Self::ModuleLessons),
        }
    }
}

/// Read a stored position, treating malformed values as 0.
///
/// Integers pass through, numeric text is parsed, reals are truncated;
/// anything else (including NULL) reads as 0.
pub fn read_position(row: &SqliteRow, column: &str) -> i64 {
    if let Ok(Some(position)) = row.try_get::<Option<i64>, _>(column) {
        return position;
    }
    if let Ok(Some(text)) = row.try_get::<Option<String>, _>(column) {
        return text.trim().parse::<i64>().unwrap_or(0);
    }
    if let Ok(Some(real)) = row.try_get::<Option<f64>, _>(column) {
        if real.is_finite() {
            return real.trunc() as i64;
        }
    }
    0
}

/// Fail with `NotFound` unless the parent row exists
pub async fn ensure_parent(
    conn: &mut SqliteConnection,
    collection: OrderedCollection,
    parent_id: Uuid,
) -> BackendResult<()> {
    let sql = format!(
        "SELECT 1 FROM {} WHERE {} = ?",
        collection.parent_table(),
        collection.parent_key()
    );
    sqlx::query(&sql)
        .bind(parent_id)
        .fetch_optional(&mut *conn)
        .await?
        .map(|_| ())
        .ok_or_else(|| BackendError::not_found(collection.parent_entity()))
}

/// Parent of a child row, if the child exists
pub async fn parent_of(
    conn: &mut SqliteConnection,
    collection: OrderedCollection,
    child_id: Uuid,
) -> BackendResult<Option<Uuid>> {
    let sql = format!(
        "SELECT {parent} FROM {table} WHERE {child} = ?",
        parent = collection.parent_key(),
        table = collection.child_table(),
        child = collection.child_key(),
    );
    let row = sqlx::query(&sql)
        .bind(child_id)
        .fetch_optional(&mut *conn)
        .await?;

    Ok(match row {
        Some(row) => Some(row.try_get::<Uuid, _>(0)?),
        None => None,
    })
}

/// Position the next appended child gets: current maximum + 1, or 0
pub async fn next_position(
    conn: &mut SqliteConnection,
    collection: OrderedCollection,
    parent_id: Uuid,
) -> BackendResult<i64> {
    let sql = format!(
        "SELECT COALESCE(MAX(position), -1) + 1 AS position FROM {} WHERE {} = ?",
        collection.child_table(),
        collection.parent_key()
    );
    let row = sqlx::query(&sql)
        .bind(parent_id)
        .fetch_one(&mut *conn)
        .await?;
    Ok(read_position(&row, "position").max(0))
}

/// Check the parent and reserve the append position in one step
pub async fn append_slot(
    conn: &mut SqliteConnection,
    collection: OrderedCollection,
    parent_id: Uuid,
) -> BackendResult<i64> {
    ensure_parent(conn, collection, parent_id).await?;
    next_position(conn, collection, parent_id).await
}

/// Child ids in display order
pub async fn child_ids(
    conn: &mut SqliteConnection,
    collection: OrderedCollection,
    parent_id: Uuid,
) -> BackendResult<Vec<Uuid>> {
    let sql = format!(
        "SELECT {child} AS id, position FROM {table} WHERE {parent} = ? \
         ORDER BY position ASC, created_at ASC, rowid ASC",
        child = collection.child_key(),
        table = collection.child_table(),
        parent = collection.parent_key(),
    );
    let rows = sqlx::query(&sql)
        .bind(parent_id)
        .fetch_all(&mut *conn)
        .await?;

    let mut children = rows
        .iter()
        .map(|row| Ok((row.try_get::<Uuid, _>("id")?, read_position(row, "position"))))
        .collect::<Result<Vec<_>, sqlx::Error>>()?;
    // stable: rows the store already ordered keep that order on ties
    children.sort_by_key(|(_, position)| *position);

    Ok(children.into_iter().map(|(id, _)| id).collect())
}

/// Move rows to distinct negative positions so later writes of final
/// positions cannot collide with a not-yet-moved sibling.
pub async fn park_positions(
    conn: &mut SqliteConnection,
    collection: OrderedCollection,
    ids: &[Uuid],
) -> BackendResult<()> {
    let sql = format!(
        "UPDATE {} SET position = ? WHERE {} = ?",
        collection.child_table(),
        collection.child_key()
    );
    for (index, id) in ids.iter().enumerate() {
        let parked = -(index as i64) - 1;
        let result = sqlx::query(&sql)
            .bind(parked)
            .bind(*id)
            .execute(&mut *conn)
            .await?;
        if result.rows_affected() != 1 {
            return Err(BackendError::not_found(collection.child_entity()));
        }
    }
    Ok(())
}

/// Give each id its index as position, refreshing its `updated_at`
pub async fn assign_positions(
    conn: &mut SqliteConnection,
    collection: OrderedCollection,
    ordered_ids: &[Uuid],
    now: DateTime<Utc>,
) -> BackendResult<()> {
    park_positions(conn, collection, ordered_ids).await?;

    let sql = format!(
        "UPDATE {} SET position = ?, updated_at = ? WHERE {} = ?",
        collection.child_table(),
        collection.child_key()
    );
    for (index, id) in ordered_ids.iter().enumerate() {
        sqlx::query(&sql)
            .bind(index as i64)
            .bind(now)
            .bind(*id)
            .execute(&mut *conn)
            .await?;
    }
    Ok(())
}

/// Refresh `updated_at` on the parent and on every ancestor above it
pub async fn touch_ancestors(
    conn: &mut SqliteConnection,
    collection: OrderedCollection,
    parent_id: Uuid,
    now: DateTime<Utc>,
) -> BackendResult<()> {
    let mut current = Some((collection, parent_id));

    while let Some((level, id)) = current {
        let sql = format!(
            "UPDATE {} SET updated_at = ? WHERE {} = ?",
            level.parent_table(),
            level.parent_key()
        );
        sqlx::query(&sql).bind(now).bind(id).execute(&mut *conn).await?;

        current = match level.parent_collection() {
            Some(up) => parent_of(conn, up, id).await?.map(|grandparent| (up, grandparent)),
            None => None,
        };
    }
    Ok(())
}

/// Re-read the parent's positions and fail unless they are `0..n-1`.
///
/// Unlike every other read in this module, no coercion applies here.
pub async fn verify_dense(
    conn: &mut SqliteConnection,
    collection: OrderedCollection,
    parent_id: Uuid,
) -> BackendResult<()> {
    let sql = format!(
        "SELECT position FROM {} WHERE {} = ? AND typeof(position) = 'integer' ORDER BY position",
        collection.child_table(),
        collection.parent_key()
    );
    let count_sql = format!(
        "SELECT COUNT(*) FROM {} WHERE {} = ?",
        collection.child_table(),
        collection.parent_key()
    );

    let positions: Vec<i64> = sqlx::query_scalar(&sql)
        .bind(parent_id)
        .fetch_all(&mut *conn)
        .await?;
    let total: i64 = sqlx::query_scalar(&count_sql)
        .bind(parent_id)
        .fetch_one(&mut *conn)
        .await?;

    if positions.len() as i64 != total || !is_dense(&positions) {
        return Err(BackendError::InvariantViolation {
            message: format!(
                "{} positions under {} {} are not dense",
                collection.child_entity(),
                collection.parent_entity().to_lowercase(),
                parent_id
            ),
        });
    }
    Ok(())
}

/// Reorder: replace the parent's ordering with `requested`.
///
/// `requested` must be exactly the current children, each once.
pub async fn reorder(
    conn: &mut SqliteConnection,
    collection: OrderedCollection,
    parent_id: Uuid,
    requested: &[Uuid],
    now: DateTime<Utc>,
) -> BackendResult<()> {
    ensure_parent(conn, collection, parent_id).await?;

    let existing = child_ids(conn, collection, parent_id).await?;
    validate_membership(collection, &existing, requested)?;

    assign_positions(conn, collection, requested, now).await?;
    touch_ancestors(conn, collection, parent_id, now).await?;
    verify_dense(conn, collection, parent_id).await?;

    tracing::debug!(
        parent = %parent_id,
        children = requested.len(),
        "Reordered {}",
        collection.child_table()
    );
    Ok(())
}

/// Delete: remove one child (cascading to its descendants), then close the
/// gap among its siblings. Returns the parent id.
pub async fn remove(
    conn: &mut SqliteConnection,
    collection: OrderedCollection,
    child_id: Uuid,
    now: DateTime<Utc>,
) -> BackendResult<Uuid> {
    let parent_id = parent_of(conn, collection, child_id)
        .await?
        .ok_or_else(|| BackendError::not_found(collection.child_entity()))?;

    let sql = format!(
        "DELETE FROM {} WHERE {} = ?",
        collection.child_table(),
        collection.child_key()
    );
    sqlx::query(&sql).bind(child_id).execute(&mut *conn).await?;

    let survivors = child_ids(conn, collection, parent_id).await?;
    assign_positions(conn, collection, &survivors, now).await?;
    touch_ancestors(conn, collection, parent_id, now).await?;
    verify_dense(conn, collection, parent_id).await?;

    tracing::debug!(
        child = %child_id,
        parent = %parent_id,
        survivors = survivors.len(),
        "Deleted from {}",
        collection.child_table()
    );
    Ok(parent_id)
}
