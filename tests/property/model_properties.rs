//! Property-based tests for the task and contact model.
//!
//! Uses proptest to verify:
//! 1. A narrow status patch never touches fields it does not carry.
//! 2. Applying a patch twice is the same as applying it once.
//! 3. Title validation agrees with the configured character limit.
//! 4. Any change notification survives the frame codec, and random bytes
//!    never panic the decoder.

#![allow(clippy::unwrap_used)]

use proptest::prelude::*;

use taskboard_proto::codec;
use taskboard_proto::{
    Change, ContactId, Priority, Subtask, Task, TaskDraft, TaskFields, TaskId, TaskPatch,
    TaskRules, TaskStatus, TaskStatusPatch, ValidationError,
};

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

fn arb_subtasks() -> impl Strategy<Value = Vec<Subtask>> {
    prop::collection::vec(
        ("[a-z]{1,12}", any::<bool>()).prop_map(|(label, is_completed)| Subtask {
            label,
            is_completed,
        }),
        0..6,
    )
}

fn arb_fields() -> impl Strategy<Value = TaskFields> {
    (
        "[A-Za-z ]{1,40}",
        ".{0,80}",
        prop::option::of((2020_i32..2030, 1_u32..=12, 1_u32..=28)),
        arb_priority(),
        arb_status(),
        arb_subtasks(),
    )
        .prop_map(|(title, description, date, priority, status, subtasks)| TaskFields {
            title,
            description,
            date: date.and_then(|(y, m, d)| chrono::NaiveDate::from_ymd_opt(y, m, d)),
            priority,
            status,
            category: "Technical Task".to_string(),
            assigned_to_user_id: vec![ContactId::new("c1")],
            subtasks,
        })
}

fn arb_status_patch() -> impl Strategy<Value = TaskStatusPatch> {
    (prop::option::of(arb_subtasks()), prop::option::of(arb_status()))
        .prop_map(|(subtasks, status)| TaskStatusPatch { subtasks, status })
}

proptest! {
    #[test]
    fn status_patch_leaves_other_fields(fields in arb_fields(), patch in arb_status_patch()) {
        let mut patched = fields.clone();
        TaskPatch::from(patch.clone()).apply_to(&mut patched);

        prop_assert_eq!(&patched.title, &fields.title);
        prop_assert_eq!(&patched.description, &fields.description);
        prop_assert_eq!(patched.date, fields.date);
        prop_assert_eq!(patched.priority, fields.priority);
        prop_assert_eq!(&patched.category, &fields.category);
        prop_assert_eq!(&patched.assigned_to_user_id, &fields.assigned_to_user_id);
        prop_assert_eq!(patched.status, patch.status.unwrap_or(fields.status));
        prop_assert_eq!(&patched.subtasks, patch.subtasks.as_ref().unwrap_or(&fields.subtasks));
    }

    #[test]
    fn patch_apply_is_idempotent(fields in arb_fields(), patch in arb_status_patch()) {
        let patch = TaskPatch::from(patch);
        let mut once = fields.clone();
        patch.apply_to(&mut once);
        let mut twice = once.clone();
        patch.apply_to(&mut twice);
        prop_assert_eq!(once, twice);
    }

    #[test]
    fn title_limit_counts_characters(title in "[a-zé]{1,20}", max in 1_usize..20) {
        let rules = TaskRules { max_title_len: max, categories: vec![] };
        let result = TaskDraft::new(title.clone())
            .with_category("User Story")
            .with_priority(Priority::Low)
            .validate(&rules);
        let len = title.chars().count();
        if len > max {
            prop_assert_eq!(result, Err(ValidationError::TitleTooLong { len, max }));
        } else {
            prop_assert!(result.is_ok());
        }
    }

    #[test]
    fn change_frames_round_trip(fields in prop::collection::vec(arb_fields(), 0..5)) {
        let tasks: Vec<Task> = fields
            .into_iter()
            .enumerate()
            .map(|(i, f)| Task::new(TaskId::new(format!("t{i}")), f))
            .collect();
        let change = Change::Replace(tasks);
        let bytes = codec::encode_change(&change).unwrap();
        prop_assert_eq!(codec::decode_change::<Task>(&bytes).unwrap(), change);
    }

    #[test]
    fn random_bytes_decode_no_panic(bytes in prop::collection::vec(any::<u8>(), 0..256)) {
        let _ = codec::decode_change::<Task>(&bytes);
    }
}
