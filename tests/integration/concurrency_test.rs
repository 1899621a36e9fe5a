//! Concurrent mutation tests
//!
//! Independent tasks share one file-backed pool and race at the transaction
//! level. Every mutation must commit, and the last one to commit wins.

use pretty_assertions::assert_eq;
use serde_json::json;
use uuid::Uuid;

use syllabus::backend::blocks::db as blocks_db;
use syllabus::backend::courses::db as courses_db;
use syllabus::shared::{parse_blocks, Block};

use crate::common::TestDatabase;

const TASKS: usize = 16;

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_appends_all_commit_with_dense_positions() {
    let fixture = TestDatabase::on_disk(8).await;
    let course = fixture.course().await;

    let handles: Vec<_> = (0..TASKS)
        .map(|i| {
            let db = fixture.db().clone();
            let course_id = course.course_id;
            tokio::spawn(async move { courses_db::create_module(&db, course_id, format!("M{i}")).await })
        })
        .collect();

    let mut assigned = Vec::with_capacity(TASKS);
    for handle in handles {
        let module = handle.await.unwrap().expect("append should wait for the write lock");
        assigned.push(module.position);
    }
    assigned.sort_unstable();
    assert_eq!(assigned, (0..TASKS as i64).collect::<Vec<_>>());

    let stored: Vec<i64> = fixture
        .module_positions(course.course_id)
        .await
        .into_iter()
        .map(|(_, position)| position)
        .collect();
    assert_eq!(stored, (0..TASKS as i64).collect::<Vec<_>>());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_block_replacements_last_commit_wins() {
    let fixture = TestDatabase::on_disk(8).await;
    let (_, _, lesson_id) = fixture.lesson_path().await;

    let handles: Vec<_> = (0..TASKS)
        .map(|i| {
            let db = fixture.db().clone();
            let body = json!({
                "blocks": (0..=i % 4)
                    .map(|n| json!({ "type": "text", "content": { "text": format!("task {i} block {n}") } }))
                    .collect::<Vec<_>>()
            });
            let drafts = parse_blocks(&body).unwrap();
            tokio::spawn(async move { blocks_db::replace_blocks(&db, lesson_id, drafts).await })
        })
        .collect();

    let mut results: Vec<Vec<Block>> = Vec::with_capacity(TASKS);
    for handle in handles {
        results.push(handle.await.unwrap().expect("replace should wait for the write lock"));
    }

    let current = blocks_db::list_blocks(fixture.db(), lesson_id).await.unwrap();
    let positions: Vec<i64> = current.iter().map(|b| b.position).collect();
    assert_eq!(positions, (0..current.len() as i64).collect::<Vec<_>>());
    assert!(
        results.contains(&current),
        "stored blocks should match what one of the replacements returned"
    );
    assert_eq!(fixture.count("blocks").await, current.len() as i64);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_reorders_leave_one_requested_order() {
    let fixture = TestDatabase::on_disk(8).await;
    let course = fixture.course().await;
    let ids: Vec<Uuid> = fixture
        .modules(course.course_id, 4)
        .await
        .into_iter()
        .map(|m| m.module_id)
        .collect();

    let requested: Vec<Vec<Uuid>> = (0..TASKS)
        .map(|i| {
            let mut order = ids.clone();
            order.rotate_left(i % ids.len());
            order
        })
        .collect();

    let handles: Vec<_> = requested
        .iter()
        .cloned()
        .map(|order| {
            let db = fixture.db().clone();
            let course_id = course.course_id;
            tokio::spawn(async move { courses_db::reorder_modules(&db, course_id, order).await })
        })
        .collect();

    for handle in handles {
        handle.await.unwrap().expect("reorder should wait for the write lock");
    }

    let stored = fixture.module_positions(course.course_id).await;
    let order: Vec<Uuid> = stored.iter().map(|(id, _)| *id).collect();
    let positions: Vec<i64> = stored.iter().map(|(_, position)| *position).collect();
    assert_eq!(positions, vec![0, 1, 2, 3]);
    assert!(requested.contains(&order));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_course_reads_see_one_snapshot_during_writes() {
    let fixture = TestDatabase::on_disk(8).await;
    let course = fixture.course().await;
    let modules = fixture.modules(course.course_id, 6).await;
    for module in &modules {
        fixture.lessons(module.module_id, 2).await;
    }

    let mut writers = Vec::new();
    for (i, module) in modules.iter().enumerate() {
        let db = fixture.db().clone();
        let module_id = module.module_id;
        writers.push(tokio::spawn(async move {
            if i % 2 == 0 {
                courses_db::delete_module(&db, module_id).await
            } else {
                courses_db::create_lesson(&db, module_id, format!("extra {i}")).await.map(|_| ())
            }
        }));
    }

    let readers: Vec<_> = (0..TASKS)
        .map(|_| {
            let db = fixture.db().clone();
            let course_id = course.course_id;
            tokio::spawn(async move { courses_db::get_course(&db, course_id).await })
        })
        .collect();

    for reader in readers {
        let tree = reader.await.unwrap().expect("reads should not fail during writes");
        let module_positions: Vec<i64> = tree.modules.iter().map(|m| m.position).collect();
        assert_eq!(module_positions, (0..tree.modules.len() as i64).collect::<Vec<_>>());
        for module in &tree.modules {
            let lesson_positions: Vec<i64> = module.lessons.iter().map(|l| l.position).collect();
            assert_eq!(lesson_positions, (0..module.lessons.len() as i64).collect::<Vec<_>>());
        }
    }
    for writer in writers {
        writer.await.unwrap().expect("write should wait for the lock");
    }

    let tree = courses_db::get_course(fixture.db(), course.course_id).await.unwrap();
    assert_eq!(tree.modules.len(), 3);
    assert!(tree.modules.iter().all(|m| m.lessons.len() == 3));
}
