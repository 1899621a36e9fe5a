//! Lesson block HTTP handlers

use axum::{
    extract::{Path, State},
    Json,
};

use super::db;
use crate::backend::courses::handlers::require_db;
use crate::backend::db::Database;
use crate::backend::error::BackendResult;
use crate::backend::extract::LenientJson;
use crate::shared::course::BlockList;
use crate::shared::ids::parse_entity_id;
use crate::shared::parse_blocks;

/// GET /api/lessons/{lessonId}/blocks
pub async fn list_blocks(
    State(db): State<Option<Database>>,
    Path(lesson_id): Path<String>,
) -> BackendResult<Json<BlockList>> {
    let db = require_db(&db)?;
    let lesson_id = parse_entity_id("lessonId", &lesson_id)?;

    let blocks = db::list_blocks(db, lesson_id).await?;
    Ok(Json(BlockList { blocks }))
}

/// PATCH /api/lessons/{lessonId}/blocks
///
/// The body is the complete block list; see [`db::replace_blocks`].
pub async fn replace_blocks(
    State(db): State<Option<Database>>,
    Path(lesson_id): Path<String>,
    LenientJson(body): LenientJson,
) -> BackendResult<Json<BlockList>> {
    let db = require_db(&db)?;
    let lesson_id = parse_entity_id("lessonId", &lesson_id)?;
    let drafts = parse_blocks(&body)?;

    let blocks = db::replace_blocks(db, lesson_id, drafts).await?;
    Ok(Json(BlockList { blocks }))
}
