//! Database operations for courses, modules and lessons
//!
//! Creates go through the ordering engine's append slot; reorder and delete
//! are thin wrappers over [`ordering::reorder`] and [`ordering::remove`].

use std::collections::HashMap;

use sqlx::{Row, SqliteConnection};
use uuid::Uuid;

use crate::backend::blocks::db::block_from_row;
use crate::backend::db::Database;
use crate::backend::error::{BackendError, BackendResult};
use crate::backend::ordering::{self, read_position, OrderedCollection};
use crate::shared::course::{LessonOrder, ModuleOrder, OrderedChild};
use crate::shared::{Block, Course, CourseSummary, Lesson, Module};

/// Create a new course
pub async fn create_course(
    db: &Database,
    title: String,
    language: String,
) -> BackendResult<CourseSummary> {
    db.mutate("create course", move |conn, now| {
        Box::pin(async move {
            let course_id = Uuid::new_v4();

            sqlx::query(
                r#"
                INSERT INTO courses (course_id, title, language, created_at, updated_at)
                VALUES (?, ?, ?, ?, ?)
                "#,
            )
            .bind(course_id)
            .bind(&title)
            .bind(&language)
            .bind(now)
            .bind(now)
            .execute(&mut *conn)
            .await?;

            tracing::debug!(course = %course_id, "Course created");

            Ok(CourseSummary {
                course_id,
                title,
                language,
                created_at: now,
                updated_at: now,
            })
        })
    })
    .await
}

/// Load a course with its modules, lessons and blocks, each level by position.
///
/// All four reads share one read transaction, so the tree is a single
/// snapshot even while other requests reorder or delete.
pub async fn get_course(db: &Database, course_id: Uuid) -> BackendResult<Course> {
    let mut tx = db.pool().begin().await?;

    let row = sqlx::query(
        r#"
        SELECT course_id, title, language, created_at, updated_at
        FROM courses
        WHERE course_id = ?
        "#,
    )
    .bind(course_id)
    .fetch_optional(&mut *tx)
    .await?
    .ok_or_else(|| BackendError::not_found("Course"))?;

    let summary = CourseSummary {
        course_id: row.try_get("course_id")?,
        title: row.try_get("title")?,
        language: row.try_get("language")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    };

    let module_rows = sqlx::query(
        r#"
        SELECT module_id, title, position
        FROM modules
        WHERE course_id = ?
        ORDER BY position ASC, created_at ASC
        "#,
    )
    .bind(course_id)
    .fetch_all(&mut *tx)
    .await?;

    let lesson_rows = sqlx::query(
        r#"
        SELECT l.lesson_id, l.module_id, l.title, l.position
        FROM lessons l
        JOIN modules m ON m.module_id = l.module_id
        WHERE m.course_id = ?
        ORDER BY l.position ASC, l.created_at ASC
        "#,
    )
    .bind(course_id)
    .fetch_all(&mut *tx)
    .await?;

    let block_rows = sqlx::query(
        r#"
        SELECT b.block_id, b.lesson_id, b.type, b.content, b.version, b.position,
               b.created_at, b.updated_at
        FROM blocks b
        JOIN lessons l ON l.lesson_id = b.lesson_id
        JOIN modules m ON m.module_id = l.module_id
        WHERE m.course_id = ?
        ORDER BY b.position ASC, b.created_at ASC
        "#,
    )
    .bind(course_id)
    .fetch_all(&mut *tx)
    .await?;

    let mut blocks_by_lesson: HashMap<Uuid, Vec<Block>> = HashMap::new();
    for row in &block_rows {
        let lesson_id: Uuid = row.try_get("lesson_id")?;
        blocks_by_lesson
            .entry(lesson_id)
            .or_default()
            .push(block_from_row(row)?);
    }

    let mut lessons_by_module: HashMap<Uuid, Vec<Lesson>> = HashMap::new();
    for row in &lesson_rows {
        let lesson_id: Uuid = row.try_get("lesson_id")?;
        let module_id: Uuid = row.try_get("module_id")?;
        let mut blocks = blocks_by_lesson.remove(&lesson_id).unwrap_or_default();
        blocks.sort_by_key(|block| block.position);

        lessons_by_module.entry(module_id).or_default().push(Lesson {
            lesson_id,
            title: row.try_get("title")?,
            position: read_position(row, "position"),
            blocks,
        });
    }

    let mut modules = module_rows
        .iter()
        .map(|row| {
            let module_id: Uuid = row.try_get("module_id")?;
            let mut lessons = lessons_by_module.remove(&module_id).unwrap_or_default();
            lessons.sort_by_key(|lesson| lesson.position);

            Ok(Module {
                module_id,
                title: row.try_get("title")?,
                position: read_position(row, "position"),
                lessons,
            })
        })
        .collect::<Result<Vec<_>, sqlx::Error>>()?;
    modules.sort_by_key(|module| module.position);
    tx.commit().await?;

    Ok(Course { summary, modules })
}

/// Append a module to the end of a course
pub async fn create_module(db: &Database, course_id: Uuid, title: String) -> BackendResult<Module> {
    db.mutate("create module", move |conn, now| {
        Box::pin(async move {
            let collection = OrderedCollection::CourseModules;
            let position = ordering::append_slot(conn, collection, course_id).await?;
            let module_id = Uuid::new_v4();

            sqlx::query(
                r#"
                INSERT INTO modules (module_id, course_id, title, position, created_at, updated_at)
                VALUES (?, ?, ?, ?, ?, ?)
                "#,
            )
            .bind(module_id)
            .bind(course_id)
            .bind(&title)
            .bind(position)
            .bind(now)
            .bind(now)
            .execute(&mut *conn)
            .await?;

            ordering::touch_ancestors(conn, collection, course_id, now).await?;

            tracing::debug!(course = %course_id, module = %module_id, position, "Module created");

            Ok(Module {
                module_id,
                title,
                position,
                lessons: Vec::new(),
            })
        })
    })
    .await
}

/// Append a lesson to the end of a module
pub async fn create_lesson(db: &Database, module_id: Uuid, title: String) -> BackendResult<Lesson> {
    db.mutate("create lesson", move |conn, now| {
        Box::pin(async move {
            let collection = OrderedCollection::ModuleLessons;
            let position = ordering::append_slot(conn, collection, module_id).await?;
            let lesson_id = Uuid::new_v4();

            sqlx::query(
                r#"
                INSERT INTO lessons (lesson_id, module_id, title, position, created_at, updated_at)
                VALUES (?, ?, ?, ?, ?, ?)
                "#,
            )
            .bind(lesson_id)
            .bind(module_id)
            .bind(&title)
            .bind(position)
            .bind(now)
            .bind(now)
            .execute(&mut *conn)
            .await?;

            ordering::touch_ancestors(conn, collection, module_id, now).await?;

            tracing::debug!(module = %module_id, lesson = %lesson_id, position, "Lesson created");

            Ok(Lesson {
                lesson_id,
                title,
                position,
                blocks: Vec::new(),
            })
        })
    })
    .await
}

/// Replace the module order of a course
pub async fn reorder_modules(
    db: &Database,
    course_id: Uuid,
    module_ids: Vec<Uuid>,
) -> BackendResult<ModuleOrder> {
    let modules = db
        .mutate("reorder modules", move |conn, now| {
            Box::pin(async move {
                let collection = OrderedCollection::CourseModules;
                ordering::reorder(conn, collection, course_id, &module_ids, now).await?;
                titled_children(conn, collection, course_id).await
            })
        })
        .await?;

    Ok(ModuleOrder {
        course_id,
        modules: modules.into_iter().map(Into::into).collect(),
    })
}

/// Replace the lesson order of a module
pub async fn reorder_lessons(
    db: &Database,
    module_id: Uuid,
    lesson_ids: Vec<Uuid>,
) -> BackendResult<LessonOrder> {
    let lessons = db
        .mutate("reorder lessons", move |conn, now| {
            Box::pin(async move {
                let collection = OrderedCollection::ModuleLessons;
                ordering::reorder(conn, collection, module_id, &lesson_ids, now).await?;
                titled_children(conn, collection, module_id).await
            })
        })
        .await?;

    Ok(LessonOrder {
        module_id,
        lessons: lessons.into_iter().map(Into::into).collect(),
    })
}

/// Delete a module with its lessons and blocks, closing the gap it leaves
pub async fn delete_module(db: &Database, module_id: Uuid) -> BackendResult<()> {
    db.mutate("delete module", move |conn, now| {
        Box::pin(async move {
            ordering::remove(conn, OrderedCollection::CourseModules, module_id, now).await?;
            Ok(())
        })
    })
    .await
}

/// Delete a lesson with its blocks, closing the gap it leaves
pub async fn delete_lesson(db: &Database, lesson_id: Uuid) -> BackendResult<()> {
    db.mutate("delete lesson", move |conn, now| {
        Box::pin(async move {
            ordering::remove(conn, OrderedCollection::ModuleLessons, lesson_id, now).await?;
            Ok(())
        })
    })
    .await
}

/// Children of a titled collection (modules or lessons) in position order
async fn titled_children(
    conn: &mut SqliteConnection,
    collection: OrderedCollection,
    parent_id: Uuid,
) -> BackendResult<Vec<OrderedChild>> {
    let sql = format!(
        "SELECT {child} AS id, title, position FROM {table} WHERE {parent} = ? ORDER BY position ASC",
        child = collection.child_key(),
        table = collection.child_table(),
        parent = collection.parent_key(),
    );
    let rows = sqlx::query(&sql)
        .bind(parent_id)
        .fetch_all(&mut *conn)
        .await?;

    let children = rows
        .iter()
        .map(|row| {
            Ok(OrderedChild {
                id: row.try_get("id")?,
                title: row.try_get("title")?,
                position: read_position(row, "position"),
            })
        })
        .collect::<Result<Vec<_>, sqlx::Error>>()?;
    Ok(children)
}
