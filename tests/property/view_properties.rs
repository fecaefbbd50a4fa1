//! Property-based tests for the derived views and the mirror.
//!
//! Uses proptest to verify:
//! 1. `bucket_by_status` partitions any board exhaustively and disjointly.
//! 2. `nearest_urgent_deadline` returns a minimal date and the first of equals.
//! 3. Toggling an assignee twice restores the list.
//! 4. Applying a sequence of changes never breaks the snapshot index.

#![allow(clippy::unwrap_used)]

use std::collections::HashSet;

use chrono::NaiveDate;
use proptest::prelude::*;

use taskboard::assignees::toggled;
use taskboard::mirror::Snapshot;
use taskboard::views::{bucket_by_status, bucket_by_urgent_priority, nearest_urgent_deadline};
use taskboard_proto::{Change, ContactId, Priority, Task, TaskFields, TaskId, TaskStatus};

// --- Strategies ---

fn arb_status() -> impl Strategy<Value = TaskStatus> {
    prop::sample::select(TaskStatus::ALL.to_vec())
}

fn arb_priority() -> impl Strategy<Value = Priority> {
    prop_oneof![
        Just(Priority::Low),
        Just(Priority::Medium),
        Just(Priority::Urgent),
    ]
}

/// Dates from a narrow range so that ties are common.
fn arb_date() -> impl Strategy<Value = Option<NaiveDate>> {
    prop::option::of((1_u32..=5).prop_map(|day| NaiveDate::from_ymd_opt(2025, 3, day).unwrap()))
}

fn arb_fields() -> impl Strategy<Value = TaskFields> {
    (arb_status(), arb_priority(), arb_date()).prop_map(|(status, priority, date)| TaskFields {
        title: "Task".to_string(),
        description: String::new(),
        date,
        priority,
        status,
        category: "User Story".to_string(),
        assigned_to_user_id: vec![],
        subtasks: vec![],
    })
}

/// A board of tasks with unique ids `t0`, `t1`, ... in snapshot order.
fn arb_board() -> impl Strategy<Value = Vec<Task>> {
    prop::collection::vec(arb_fields(), 0..40).prop_map(|fields| {
        fields
            .into_iter()
            .enumerate()
            .map(|(i, f)| Task::new(TaskId::new(format!("t{i}")), f))
            .collect()
    })
}

fn arb_assignees() -> impl Strategy<Value = Vec<ContactId>> {
    prop::collection::hash_set(0_u8..20, 0..8).prop_map(|ids| {
        ids.into_iter()
            .map(|n| ContactId::new(format!("c{n}")))
            .collect()
    })
}

fn arb_change() -> impl Strategy<Value = Change<Task>> {
    prop_oneof![
        (0_u8..10, arb_fields())
            .prop_map(|(n, f)| Change::Upsert(Task::new(TaskId::new(format!("t{n}")), f))),
        (0_u8..10).prop_map(|n| Change::Delete(TaskId::new(format!("t{n}")))),
        prop::collection::vec((0_u8..10, arb_fields()), 0..5).prop_map(|tasks| {
            Change::Replace(
                tasks
                    .into_iter()
                    .map(|(n, f)| Task::new(TaskId::new(format!("t{n}")), f))
                    .collect(),
            )
        }),
    ]
}

proptest! {
    #[test]
    fn status_buckets_partition_the_board(board in arb_board()) {
        let buckets = bucket_by_status(&board);
        prop_assert_eq!(buckets.total(), board.len());

        let mut seen = HashSet::new();
        for (status, tasks) in buckets.iter() {
            let mut last_pos = None;
            for task in tasks {
                prop_assert_eq!(task.fields.status, status);
                prop_assert!(seen.insert(task.id.clone()), "task in two buckets");
                // Snapshot order is kept inside a bucket.
                let pos = board.iter().position(|t| t.id == task.id).unwrap();
                prop_assert!(last_pos.is_none_or(|p| p < pos));
                last_pos = Some(pos);
            }
        }
        prop_assert_eq!(seen.len(), board.len());
    }

    #[test]
    fn nearest_urgent_is_minimal_and_first(board in arb_board()) {
        let urgent = bucket_by_urgent_priority(&board);
        let nearest = nearest_urgent_deadline(&board);

        match urgent.iter().filter_map(|t| t.fields.date).min() {
            Some(min) => {
                let expected = urgent.iter().find(|t| t.fields.date == Some(min)).unwrap();
                prop_assert_eq!(&nearest.unwrap().id, &expected.id);
            }
            None => {
                prop_assert_eq!(nearest.map(|t| &t.id), urgent.first().map(|t| &t.id));
            }
        }
        // Repeated calls agree.
        prop_assert_eq!(
            nearest.map(|t| &t.id),
            nearest_urgent_deadline(&board).map(|t| &t.id)
        );
    }

    #[test]
    fn toggle_twice_restores_absent_contact(ids in arb_assignees(), n in 20_u8..30) {
        let contact = ContactId::new(format!("c{n}"));
        let once = toggled(&ids, &contact);
        prop_assert_eq!(once.last(), Some(&contact));
        prop_assert_eq!(toggled(&once, &contact), ids);
    }

    #[test]
    fn toggle_twice_restores_last_contact(ids in arb_assignees()) {
        if let Some(last) = ids.last() {
            let once = toggled(&ids, last);
            prop_assert!(!once.contains(last));
            prop_assert_eq!(toggled(&once, last), ids.clone());
        }
    }

    #[test]
    fn applied_changes_keep_index_consistent(changes in prop::collection::vec(arb_change(), 0..30)) {
        let mut snapshot = Snapshot::<Task>::empty();
        for change in changes {
            let before = snapshot.version();
            if let Some(next) = snapshot.applied(change) {
                prop_assert_eq!(next.version(), before + 1);
                snapshot = next;
            }
            let mut unique = HashSet::new();
            for (pos, task) in snapshot.iter().enumerate() {
                prop_assert!(unique.insert(task.id.clone()));
                prop_assert_eq!(snapshot.position(&task.id), Some(pos));
            }
        }
    }
}
