//! Course, module and lesson HTTP handlers
//!
//! Each handler checks, in order: a store is configured (503), path ids are
//! UUIDs (400), the body has the right shape (400). Only then does it touch
//! the store.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};

use super::db;
use crate::backend::db::Database;
use crate::backend::error::{BackendError, BackendResult};
use crate::backend::extract::LenientJson;
use crate::shared::course::{LessonOrder, ModuleOrder};
use crate::shared::ids::{parse_entity_id, parse_id_list, required_text};
use crate::shared::{Course, CourseSummary, Lesson, Module};

pub(crate) fn require_db(db: &Option<Database>) -> BackendResult<&Database> {
    db.as_ref().ok_or_else(BackendError::database_not_configured)
}

/// POST /api/courses
pub async fn create_course(
    State(db): State<Option<Database>>,
    LenientJson(body): LenientJson,
) -> BackendResult<(StatusCode, Json<CourseSummary>)> {
    let db = require_db(&db)?;
    let title = required_text("title", &body)?;
    let language = required_text("language", &body)?;

    let course = db::create_course(db, title, language).await?;
    Ok((StatusCode::CREATED, Json(course)))
}

/// GET /api/courses/{courseId}
pub async fn get_course(
    State(db): State<Option<Database>>,
    Path(course_id): Path<String>,
) -> BackendResult<Json<Course>> {
    let db = require_db(&db)?;
    let course_id = parse_entity_id("courseId", &course_id)?;

    Ok(Json(db::get_course(db, course_id).await?))
}

/// POST /api/courses/{courseId}/modules
pub async fn create_module(
    State(db): State<Option<Database>>,
    Path(course_id): Path<String>,
    LenientJson(body): LenientJson,
) -> BackendResult<(StatusCode, Json<Module>)> {
    let db = require_db(&db)?;
    let course_id = parse_entity_id("courseId", &course_id)?;
    let title = required_text("title", &body)?;

    let module = db::create_module(db, course_id, title).await?;
    Ok((StatusCode::CREATED, Json(module)))
}

/// PATCH /api/courses/{courseId}/modules/order
pub async fn reorder_modules(
    State(db): State<Option<Database>>,
    Path(course_id): Path<String>,
    LenientJson(body): LenientJson,
) -> BackendResult<Json<ModuleOrder>> {
    let db = require_db(&db)?;
    let course_id = parse_entity_id("courseId", &course_id)?;
    let module_ids = parse_id_list("moduleIds", body.get("moduleIds"))?;

    Ok(Json(db::reorder_modules(db, course_id, module_ids).await?))
}

/// DELETE /api/modules/{moduleId}
pub async fn delete_module(
    State(db): State<Option<Database>>,
    Path(module_id): Path<String>,
) -> BackendResult<StatusCode> {
    let db = require_db(&db)?;
    let module_id = parse_entity_id("moduleId", &module_id)?;

    db::delete_module(db, module_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/modules/{moduleId}/lessons
pub async fn create_lesson(
    State(db): State<Option<Database>>,
    Path(module_id): Path<String>,
    LenientJson(body): LenientJson,
) -> BackendResult<(StatusCode, Json<Lesson>)> {
    let db = require_db(&db)?;
    let module_id = parse_entity_id("moduleId", &module_id)?;
    let title = required_text("title", &body)?;

    let lesson = db::create_lesson(db, module_id, title).await?;
    Ok((StatusCode::CREATED, Json(lesson)))
}

/// PATCH /api/modules/{moduleId}/lessons/order
pub async fn reorder_lessons(
    State(db): State<Option<Database>>,
    Path(module_id): Path<String>,
    LenientJson(body): LenientJson,
) -> BackendResult<Json<LessonOrder>> {
    let db = require_db(&db)?;
    let module_id = parse_entity_id("moduleId", &module_id)?;
    let lesson_ids = parse_id_list("lessonIds", body.get("lessonIds"))?;

    Ok(Json(db::reorder_lessons(db, module_id, lesson_ids).await?))
}

/// DELETE /api/lessons/{lessonId}
pub async fn delete_lesson(
    State(db): State<Option<Database>>,
    Path(lesson_id): Path<String>,
) -> BackendResult<StatusCode> {
    let db = require_db(&db)?;
    let lesson_id = parse_entity_id("lessonId", &lesson_id)?;

    db::delete_lesson(db, lesson_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
