//! Helpers for rendering task cards and searching the board.

use taskboard_proto::Task;

/// Due date as shown on a card (`dd/mm/yyyy`), empty when unset.
#[must_use]
pub fn format_card_date(task: &Task) -> String {
    task.fields
        .date
        .map(|date| date.format("%d/%m/%Y").to_string())
        .unwrap_or_default()
}

/// `(completed, total)` subtask counts for the card's progress bar.
#[must_use]
pub fn subtask_progress(task: &Task) -> (usize, usize) {
    let subtasks = &task.fields.subtasks;
    let done = subtasks.iter().filter(|s| s.is_completed).count();
    (done, subtasks.len())
}

/// Tasks whose title or description contains `query`, ignoring case.
///
/// A blank query matches every task. Snapshot order is kept.
#[must_use]
pub fn filter_tasks<'a>(tasks: &'a [Task], query: &str) -> Vec<&'a Task> {
    let needle = query.trim().to_lowercase();
    tasks
        .iter()
        .filter(|t| {
            needle.is_empty()
                || t.fields.title.to_lowercase().contains(&needle)
                || t.fields.description.to_lowercase().contains(&needle)
        })
        .collect()
}
