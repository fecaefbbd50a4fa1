//! Assignment resolver: task assignee ids to live contact records.
//!
//! Contacts can be deleted independently of the tasks that reference them,
//! so a task may carry ids that no longer resolve. Those are skipped, not
//! reported as errors.

use taskboard_proto::{Contact, ContactId, Task};

use crate::mirror::Snapshot;

/// Maps each assignee id of `task`, in order, to its contact.
///
/// Ids with no matching contact are skipped.
#[must_use]
pub fn resolve_assignees<'a>(task: &Task, contacts: &'a Snapshot<Contact>) -> Vec<&'a Contact> {
    task.fields
        .assigned_to_user_id
        .iter()
        .filter_map(|id| contacts.get(id))
        .collect()
}

/// Returns `true` if `contact` is in the task's assignee list.
#[must_use]
pub fn is_assigned(task: &Task, contact: &ContactId) -> bool {
    task.fields.assigned_to_user_id.contains(contact)
}

/// Assignee ids of `task` that do not resolve in `contacts`.
#[must_use]
pub fn dangling_assignees<'a>(task: &'a Task, contacts: &Snapshot<Contact>) -> Vec<&'a ContactId> {
    task.fields
        .assigned_to_user_id
        .iter()
        .filter(|id| !contacts.contains(id))
        .collect()
}

/// The assignee list with `contact` removed if present, appended otherwise.
#[must_use]
pub fn toggled(ids: &[ContactId], contact: &ContactId) -> Vec<ContactId> {
    if ids.contains(contact) {
        ids.iter().filter(|id| *id != contact).cloned().collect()
    } else {
        let mut next = ids.to_vec();
        next.push(contact.clone());
        next
    }
}
