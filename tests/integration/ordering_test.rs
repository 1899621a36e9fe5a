//! Ordered collection integration tests
//!
//! Append, reorder and delete of modules and lessons against a real store.

use pretty_assertions::assert_eq;
use uuid::Uuid;

use syllabus::backend::courses::db as courses_db;
use syllabus::backend::BackendError;

use crate::common::{refreshed, TestDatabase};
use crate::{assert_err, assert_invalid_input, assert_ok};

fn ids_of(modules: &[syllabus::shared::Module]) -> Vec<Uuid> {
    modules.iter().map(|m| m.module_id).collect()
}

#[tokio::test]
async fn test_append_assigns_dense_positions_in_insertion_order() {
    let fixture = TestDatabase::new().await;
    let course = fixture.course().await;

    let modules = fixture.modules(course.course_id, 4).await;
    let positions: Vec<i64> = modules.iter().map(|m| m.position).collect();
    assert_eq!(positions, vec![0, 1, 2, 3]);
    assert!(modules.iter().all(|m| m.lessons.is_empty()));

    let stored = fixture.module_positions(course.course_id).await;
    assert_eq!(stored, ids_of(&modules).into_iter().zip(0..).collect::<Vec<_>>());
}

#[tokio::test]
async fn test_append_to_missing_parent_is_not_found() {
    let fixture = TestDatabase::new().await;

    assert_err!(
        courses_db::create_module(fixture.db(), Uuid::new_v4(), "M".to_string()).await,
        BackendError::NotFound { entity: "Course" }
    );
    assert_err!(
        courses_db::create_lesson(fixture.db(), Uuid::new_v4(), "L".to_string()).await,
        BackendError::NotFound { entity: "Module" }
    );
    assert_eq!(fixture.count("modules").await, 0);
}

#[tokio::test]
async fn test_append_refreshes_ancestors() {
    let fixture = TestDatabase::new().await;
    let course = fixture.course().await;
    let module = fixture.modules(course.course_id, 1).await.remove(0);

    fixture.make_stale("courses", "course_id", course.course_id).await;
    fixture.make_stale("modules", "module_id", module.module_id).await;

    fixture.lessons(module.module_id, 1).await;

    assert!(refreshed(fixture.updated_at("modules", "module_id", module.module_id).await));
    assert!(refreshed(fixture.updated_at("courses", "course_id", course.course_id).await));
}

#[tokio::test]
async fn test_reorder_two_modules() {
    let fixture = TestDatabase::new().await;
    let course = fixture.course().await;
    let modules = fixture.modules(course.course_id, 2).await;
    let (m1, m2) = (modules[0].module_id, modules[1].module_id);

    let order = assert_ok!(courses_db::reorder_modules(fixture.db(), course.course_id, vec![m2, m1]).await);

    assert_eq!(order.course_id, course.course_id);
    let result: Vec<(Uuid, &str, i64)> = order
        .modules
        .iter()
        .map(|m| (m.module_id, m.title.as_str(), m.position))
        .collect();
    assert_eq!(result, vec![(m2, "M1", 0), (m1, "M0", 1)]);
    assert_eq!(fixture.module_positions(course.course_id).await, vec![(m2, 0), (m1, 1)]);
}

#[tokio::test]
async fn test_reorder_with_current_order_is_idempotent() {
    let fixture = TestDatabase::new().await;
    let course = fixture.course().await;
    let modules = fixture.modules(course.course_id, 3).await;
    let before = fixture.module_positions(course.course_id).await;

    fixture.make_stale("courses", "course_id", course.course_id).await;
    assert_ok!(courses_db::reorder_modules(fixture.db(), course.course_id, ids_of(&modules)).await);

    assert_eq!(fixture.module_positions(course.course_id).await, before);
    assert!(refreshed(fixture.updated_at("courses", "course_id", course.course_id).await));
}

#[tokio::test]
async fn test_invalid_reorder_leaves_positions_untouched() {
    let fixture = TestDatabase::new().await;
    let course = fixture.course().await;
    let modules = fixture.modules(course.course_id, 3).await;
    let ids = ids_of(&modules);
    let before = fixture.module_positions(course.course_id).await;

    // missing one child
    assert_invalid_input!(
        courses_db::reorder_modules(fixture.db(), course.course_id, vec![ids[2], ids[0]]).await,
        "moduleIds does not match modules for the course"
    );

    // same size, one foreign id
    let other_course = fixture.course().await;
    let foreign = fixture.modules(other_course.course_id, 1).await[0].module_id;
    assert_invalid_input!(
        courses_db::reorder_modules(fixture.db(), course.course_id, vec![ids[2], ids[0], foreign]).await,
        "moduleIds must reference modules belonging to the course"
    );

    // duplicate
    assert_invalid_input!(
        courses_db::reorder_modules(fixture.db(), course.course_id, vec![ids[2], ids[2], ids[0]]).await,
        "moduleIds must be unique"
    );

    // empty
    assert_invalid_input!(
        courses_db::reorder_modules(fixture.db(), course.course_id, vec![]).await,
        "moduleIds must be a non-empty array"
    );

    assert_eq!(fixture.module_positions(course.course_id).await, before);
}

#[tokio::test]
async fn test_reorder_missing_parent_is_not_found() {
    let fixture = TestDatabase::new().await;

    assert_err!(
        courses_db::reorder_lessons(fixture.db(), Uuid::new_v4(), vec![Uuid::new_v4()]).await,
        BackendError::NotFound { entity: "Module" }
    );
}

#[tokio::test]
async fn test_reorder_lessons_only_within_their_module() {
    let fixture = TestDatabase::new().await;
    let course = fixture.course().await;
    let modules = fixture.modules(course.course_id, 2).await;
    let here = fixture.lessons(modules[0].module_id, 3).await;
    let there = fixture.lessons(modules[1].module_id, 1).await;
    let (a, b, c) = (here[0].lesson_id, here[1].lesson_id, here[2].lesson_id);

    let order = assert_ok!(courses_db::reorder_lessons(fixture.db(), modules[0].module_id, vec![c, a, b]).await);
    let result: Vec<(Uuid, i64)> = order.lessons.iter().map(|l| (l.lesson_id, l.position)).collect();
    assert_eq!(result, vec![(c, 0), (a, 1), (b, 2)]);

    assert_invalid_input!(
        courses_db::reorder_lessons(fixture.db(), modules[0].module_id, vec![c, a, there[0].lesson_id]).await,
        "lessonIds must reference lessons belonging to the module"
    );
    assert_eq!(
        fixture.lesson_positions(modules[1].module_id).await,
        vec![(there[0].lesson_id, 0)]
    );
}

#[tokio::test]
async fn test_delete_middle_sibling_closes_the_gap() {
    let fixture = TestDatabase::new().await;
    let course = fixture.course().await;
    let ids = ids_of(&fixture.modules(course.course_id, 5).await);

    assert_ok!(courses_db::delete_module(fixture.db(), ids[2]).await);

    assert_eq!(
        fixture.module_positions(course.course_id).await,
        vec![(ids[0], 0), (ids[1], 1), (ids[3], 2), (ids[4], 3)]
    );

    // appends continue from the closed range
    let next = fixture.modules(course.course_id, 1).await.remove(0);
    assert_eq!(next.position, 4);
}

#[tokio::test]
async fn test_delete_after_reorder_preserves_relative_order() {
    let fixture = TestDatabase::new().await;
    let module = {
        let course = fixture.course().await;
        fixture.modules(course.course_id, 1).await.remove(0)
    };
    let lessons = fixture.lessons(module.module_id, 3).await;
    let (a, b, c) = (lessons[0].lesson_id, lessons[1].lesson_id, lessons[2].lesson_id);

    assert_ok!(courses_db::reorder_lessons(fixture.db(), module.module_id, vec![c, b, a]).await);
    assert_ok!(courses_db::delete_lesson(fixture.db(), b).await);

    assert_eq!(fixture.lesson_positions(module.module_id).await, vec![(c, 0), (a, 1)]);
}

#[tokio::test]
async fn test_delete_missing_child_is_not_found() {
    let fixture = TestDatabase::new().await;

    assert_err!(
        courses_db::delete_module(fixture.db(), Uuid::new_v4()).await,
        BackendError::NotFound { entity: "Module" }
    );
    assert_err!(
        courses_db::delete_lesson(fixture.db(), Uuid::new_v4()).await,
        BackendError::NotFound { entity: "Lesson" }
    );
}

#[tokio::test]
async fn test_delete_module_cascades_to_lessons_and_blocks() {
    let fixture = TestDatabase::new().await;
    let (course_id, module_id, lesson_id) = fixture.lesson_path().await;
    fixture
        .save_blocks(
            lesson_id,
            serde_json::json!({ "blocks": [{ "type": "text", "content": { "text": "hi" } }] }),
        )
        .await;
    fixture.make_stale("courses", "course_id", course_id).await;

    assert_ok!(courses_db::delete_module(fixture.db(), module_id).await);

    assert_eq!(fixture.count("modules").await, 0);
    assert_eq!(fixture.count("lessons").await, 0);
    assert_eq!(fixture.count("blocks").await, 0);
    assert!(refreshed(fixture.updated_at("courses", "course_id", course_id).await));
}

#[tokio::test]
async fn test_get_course_returns_ordered_tree() {
    let fixture = TestDatabase::new().await;
    let course = fixture.course().await;
    let modules = fixture.modules(course.course_id, 2).await;
    let lessons = fixture.lessons(modules[1].module_id, 2).await;
    assert_ok!(
        courses_db::reorder_modules(fixture.db(), course.course_id, vec![modules[1].module_id, modules[0].module_id])
            .await
    );

    let tree = assert_ok!(courses_db::get_course(fixture.db(), course.course_id).await);

    assert_eq!(tree.summary.title, "Rust");
    assert_eq!(tree.summary.language, "en");
    let titles: Vec<&str> = tree.modules.iter().map(|m| m.title.as_str()).collect();
    assert_eq!(titles, vec!["M1", "M0"]);
    let lesson_ids: Vec<Uuid> = tree.modules[0].lessons.iter().map(|l| l.lesson_id).collect();
    assert_eq!(lesson_ids, vec![lessons[0].lesson_id, lessons[1].lesson_id]);
    assert!(tree.modules[1].lessons.is_empty());

    assert_err!(
        courses_db::get_course(fixture.db(), Uuid::new_v4()).await,
        BackendError::NotFound { entity: "Course" }
    );
}

#[tokio::test]
async fn test_malformed_stored_position_reads_as_zero_and_reorder_repairs_it() {
    let fixture = TestDatabase::new().await;
    let course = fixture.course().await;
    let module = fixture.modules(course.course_id, 1).await.remove(0);

    sqlx::query("UPDATE modules SET position = 'first' WHERE module_id = ?")
        .bind(module.module_id)
        .execute(fixture.db().pool())
        .await
        .unwrap();

    let tree = assert_ok!(courses_db::get_course(fixture.db(), course.course_id).await);
    assert_eq!(tree.modules[0].position, 0);

    assert_ok!(courses_db::reorder_modules(fixture.db(), course.course_id, vec![module.module_id]).await);

    let kind: String = sqlx::query_scalar("SELECT typeof(position) FROM modules WHERE module_id = ?")
        .bind(module.module_id)
        .fetch_one(fixture.db().pool())
        .await
        .unwrap();
    assert_eq!(kind, "integer");
    assert_eq!(fixture.module_positions(course.course_id).await, vec![(module.module_id, 0)]);
}
