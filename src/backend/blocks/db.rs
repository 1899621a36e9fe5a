//! Database operations for content blocks

use std::collections::HashMap;

use serde_json::Value;
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqliteConnection};
use uuid::Uuid;

use super::reconcile::{plan_reconciliation, ReconcilePlan, StoredBlock};
use crate::backend::db::Database;
use crate::backend::error::{BackendError, BackendResult};
use crate::backend::ordering::{self, read_position, OrderedCollection};
use crate::shared::{Block, BlockContent, BlockDraft, BlockType, SharedError};

const COLLECTION: OrderedCollection = OrderedCollection::LessonBlocks;

/// Decode a `blocks` row. Stored content is re-normalized on the way out.
pub(crate) fn block_from_row(row: &SqliteRow) -> BackendResult<Block> {
    let type_name: String = row.try_get("type")?;
    let block_type = type_name
        .parse::<BlockType>()
        .map_err(|_| SharedError::serialization(format!("Unknown stored block type: {type_name}")))?;

    let raw: String = row.try_get("content")?;
    let content: Value = serde_json::from_str(&raw)?;

    Ok(Block {
        block_id: row.try_get("block_id")?,
        block_type,
        content: BlockContent::normalize(block_type, &content),
        version: row.try_get("version")?,
        position: read_position(row, "position"),
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

async fn fetch_blocks(conn: &mut SqliteConnection, lesson_id: Uuid) -> BackendResult<Vec<Block>> {
    let rows = sqlx::query(
        r#"
        SELECT block_id, type, content, version, position, created_at, updated_at
        FROM blocks
        WHERE lesson_id = ?
        ORDER BY position ASC, created_at ASC
        "#,
    )
    .bind(lesson_id)
    .fetch_all(&mut *conn)
    .await?;

    let mut blocks = rows.iter().map(block_from_row).collect::<BackendResult<Vec<_>>>()?;
    blocks.sort_by_key(|block| block.position);
    Ok(blocks)
}

async fn fetch_stored(
    conn: &mut SqliteConnection,
    lesson_id: Uuid,
) -> BackendResult<HashMap<Uuid, StoredBlock>> {
    let rows = sqlx::query("SELECT block_id, type, content FROM blocks WHERE lesson_id = ?")
        .bind(lesson_id)
        .fetch_all(&mut *conn)
        .await?;

    rows.iter()
        .map(|row| -> BackendResult<(Uuid, StoredBlock)> {
            let block_id: Uuid = row.try_get("block_id")?;
            let stored = StoredBlock {
                block_type: row.try_get("type")?,
                content: row.try_get("content")?,
            };
            Ok((block_id, stored))
        })
        .collect()
}

/// Fail when a block about to be inserted already lives under another lesson
async fn reject_foreign_ids(
    conn: &mut SqliteConnection,
    lesson_id: Uuid,
    plan: &ReconcilePlan,
) -> BackendResult<()> {
    for insert in &plan.inserts {
        let owner: Option<Uuid> = sqlx::query_scalar("SELECT lesson_id FROM blocks WHERE block_id = ?")
            .bind(insert.block_id)
            .fetch_optional(&mut *conn)
            .await?;

        if let Some(owner) = owner {
            tracing::warn!(
                block = %insert.block_id,
                lesson = %lesson_id,
                owner = %owner,
                "Block id submitted for a lesson it does not belong to"
            );
            return Err(BackendError::invalid_input(
                "blockId must not reference a block of another lesson",
            ));
        }
    }
    Ok(())
}

/// List a lesson's blocks in position order
pub async fn list_blocks(db: &Database, lesson_id: Uuid) -> BackendResult<Vec<Block>> {
    let mut tx = db.pool().begin().await?;
    ordering::ensure_parent(&mut tx, COLLECTION, lesson_id).await?;
    let blocks = fetch_blocks(&mut tx, lesson_id).await?;
    tx.commit().await?;
    Ok(blocks)
}

/// Replace a lesson's blocks with `drafts`, in one transaction.
///
/// Stored blocks missing from `drafts` are deleted, matching ones are
/// rewritten at their new index (version bumped only on a content or type
/// change), and the rest are inserted at version 1. Returns the lesson's
/// blocks as stored after the write.
pub async fn replace_blocks(
    db: &Database,
    lesson_id: Uuid,
    drafts: Vec<BlockDraft>,
) -> BackendResult<Vec<Block>> {
    db.mutate("replace blocks", move |conn, now| {
        Box::pin(async move {
            ordering::ensure_parent(conn, COLLECTION, lesson_id).await?;

            let stored = fetch_stored(conn, lesson_id).await?;
            let plan = plan_reconciliation(&stored, &drafts);
            reject_foreign_ids(conn, lesson_id, &plan).await?;

            for block_id in &plan.deletes {
                sqlx::query("DELETE FROM blocks WHERE block_id = ?")
                    .bind(*block_id)
                    .execute(&mut *conn)
                    .await?;
            }

            // survivors may swap places, so free their positions first
            let moving: Vec<Uuid> = plan.updates.iter().map(|update| update.block_id).collect();
            ordering::park_positions(conn, COLLECTION, &moving).await?;

            for update in &plan.updates {
                sqlx::query(
                    r#"
                    UPDATE blocks
                    SET type = ?, content = ?, position = ?, version = version + ?, updated_at = ?
                    WHERE block_id = ?
                    "#,
                )
                .bind(update.content.block_type().as_str())
                .bind(update.content.to_json_string()?)
                .bind(update.position)
                .bind(update.version_bump)
                .bind(now)
                .bind(update.block_id)
                .execute(&mut *conn)
                .await?;
            }

            for insert in &plan.inserts {
                sqlx::query(
                    r#"
                    INSERT INTO blocks (block_id, lesson_id, type, content, position, version, created_at, updated_at)
                    VALUES (?, ?, ?, ?, ?, 1, ?, ?)
                    "#,
                )
                .bind(insert.block_id)
                .bind(lesson_id)
                .bind(insert.content.block_type().as_str())
                .bind(insert.content.to_json_string()?)
                .bind(insert.position)
                .bind(now)
                .bind(now)
                .execute(&mut *conn)
                .await?;
            }

            ordering::touch_ancestors(conn, COLLECTION, lesson_id, now).await?;
            ordering::verify_dense(conn, COLLECTION, lesson_id).await?;

            let bumped = plan.updates.iter().filter(|u| u.version_bump > 0).count();
            tracing::debug!(
                lesson = %lesson_id,
                deleted = plan.deletes.len(),
                updated = plan.updates.len(),
                bumped,
                inserted = plan.inserts.len(),
                "Blocks reconciled"
            );

            fetch_blocks(conn, lesson_id).await
        })
    })
    .await
}
