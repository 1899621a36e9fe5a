//! Property-based tests for dense sibling positions
//!
//! Each case runs against its own in-memory store on a fresh runtime, and
//! compares the stored order with a plain `Vec` model.

use proptest::prelude::*;
use uuid::Uuid;

use syllabus::backend::courses::db as courses_db;

use crate::common::TestDatabase;

#[derive(Debug, Clone)]
enum Op {
    Append,
    /// Delete the child at this index, modulo the current count
    Delete(usize),
}

fn op() -> impl Strategy<Value = Op> {
    prop_oneof![
        3 => Just(Op::Append),
        1 => any::<usize>().prop_map(Op::Delete),
    ]
}

fn block_on<F: std::future::Future>(future: F) -> F::Output {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .unwrap()
        .block_on(future)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn test_append_and_delete_keep_positions_dense(ops in prop::collection::vec(op(), 1..24)) {
        let (stored, model) = block_on(async {
            let fixture = TestDatabase::new().await;
            let course = fixture.course().await;
            let mut model: Vec<Uuid> = Vec::new();

            for op in &ops {
                match op {
                    Op::Append => {
                        let module = fixture.modules(course.course_id, 1).await.remove(0);
                        assert_eq!(module.position as usize, model.len());
                        model.push(module.module_id);
                    }
                    Op::Delete(_) if model.is_empty() => {}
                    Op::Delete(index) => {
                        let victim = model.remove(index % model.len());
                        courses_db::delete_module(fixture.db(), victim).await.unwrap();
                    }
                }
            }

            (fixture.module_positions(course.course_id).await, model)
        });

        let expected: Vec<(Uuid, i64)> = model.into_iter().zip(0..).collect();
        prop_assert_eq!(stored, expected);
    }

    #[test]
    fn test_reorder_assigns_index_positions(
        order in (1usize..8).prop_flat_map(|n| Just((0..n).collect::<Vec<_>>()).prop_shuffle())
    ) {
        let (stored, requested) = block_on(async {
            let fixture = TestDatabase::new().await;
            let course = fixture.course().await;
            let modules = fixture.modules(course.course_id, order.len()).await;

            let requested: Vec<Uuid> = order.iter().map(|&i| modules[i].module_id).collect();
            let result = courses_db::reorder_modules(fixture.db(), course.course_id, requested.clone())
                .await
                .unwrap();

            let returned: Vec<Uuid> = result.modules.iter().map(|m| m.module_id).collect();
            assert_eq!(returned, requested);

            (fixture.module_positions(course.course_id).await, requested)
        });

        let expected: Vec<(Uuid, i64)> = requested.into_iter().zip(0..).collect();
        prop_assert_eq!(stored, expected);
    }
}
