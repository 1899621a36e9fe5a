/**
 * API Route Configuration
 *
 * # Routes
 *
 * ## Courses
 * - `POST /api/courses` - Create a course
 * - `GET /api/courses/{courseId}` - Full course tree
 *
 * ## Modules
 * - `POST /api/courses/{courseId}/modules` - Append a module
 * - `PATCH /api/courses/{courseId}/modules/order` - Reorder all modules
 * - `DELETE /api/modules/{moduleId}` - Delete a module
 *
 * ## Lessons
 * - `POST /api/modules/{moduleId}/lessons` - Append a lesson
 * - `PATCH /api/modules/{moduleId}/lessons/order` - Reorder all lessons
 * - `DELETE /api/lessons/{lessonId}` - Delete a lesson
 *
 * ## Blocks
 * - `GET /api/lessons/{lessonId}/blocks` - List blocks
 * - `PATCH /api/lessons/{lessonId}/blocks` - Replace all blocks
 */

use axum::routing::{delete, get, patch, post};
use axum::Router;

use crate::backend::blocks::{list_blocks, replace_blocks};
use crate::backend::courses::{
    create_course, create_lesson, create_module, delete_lesson, delete_module, get_course,
    reorder_lessons, reorder_modules,
};
use crate::backend::server::state::AppState;

/// Configure API routes
///
/// # Arguments
///
/// * `router` - The router to add routes to
///
/// # Returns
///
/// Router with API routes configured
pub fn configure_api_routes(router: Router<AppState>) -> Router<AppState> {
    router
        // Courses
        .route("/api/courses", post(create_course))
        .route("/api/courses/{course_id}", get(get_course))
        // Modules
        .route("/api/courses/{course_id}/modules", post(create_module))
        .route("/api/courses/{course_id}/modules/order", patch(reorder_modules))
        .route("/api/modules/{module_id}", delete(delete_module))
        // Lessons
        .route("/api/modules/{module_id}/lessons", post(create_lesson))
        .route("/api/modules/{module_id}/lessons/order", patch(reorder_lessons))
        .route("/api/lessons/{lesson_id}", delete(delete_lesson))
        // Blocks
        .route(
            "/api/lessons/{lesson_id}/blocks",
            get(list_blocks).patch(replace_blocks),
        )
}
