//! Derived views over a task snapshot.
//!
//! Everything here is a pure function of its input. Views are recomputed
//! from the current snapshot whenever they are needed and never cached.

pub mod cards;
pub mod contacts;

use serde::Serialize;

use taskboard_proto::{Priority, Task, TaskStatus};

pub use cards::{filter_tasks, format_card_date, subtask_progress};
pub use contacts::{ContactGroup, group_contacts_by_initial};

/// Placeholder for an urgent task without a due date.
pub const NO_DATE_PLACEHOLDER: &str = "No date found";

/// Placeholder for a board without urgent tasks.
pub const NO_URGENT_PLACEHOLDER: &str = "No urgent Tasks";

/// Tasks partitioned by column, each bucket in snapshot order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StatusBuckets<'a> {
    buckets: [Vec<&'a Task>; 4],
}

impl<'a> StatusBuckets<'a> {
    /// Tasks in the given column.
    #[must_use]
    pub fn get(&self, status: TaskStatus) -> &[&'a Task] {
        &self.buckets[status.index()]
    }

    /// Number of tasks in the given column.
    #[must_use]
    pub fn count(&self, status: TaskStatus) -> usize {
        self.buckets[status.index()].len()
    }

    /// Columns in board order with their tasks.
    pub fn iter(&self) -> impl Iterator<Item = (TaskStatus, &[&'a Task])> {
        TaskStatus::ALL
            .into_iter()
            .map(|status| (status, self.get(status)))
    }

    /// Number of tasks across all columns.
    #[must_use]
    pub fn total(&self) -> usize {
        self.buckets.iter().map(Vec::len).sum()
    }
}

/// Partitions tasks by status, keeping snapshot order inside each bucket.
///
/// Takes any sequence of borrowed tasks, so a filtered list buckets without
/// cloning.
#[must_use]
pub fn bucket_by_status<'a>(tasks: impl IntoIterator<Item = &'a Task>) -> StatusBuckets<'a> {
    let mut buckets = StatusBuckets::default();
    for task in tasks {
        buckets.buckets[task.fields.status.index()].push(task);
    }
    buckets
}

/// Urgent tasks in snapshot order.
#[must_use]
pub fn bucket_by_urgent_priority(tasks: &[Task]) -> Vec<&Task> {
    tasks
        .iter()
        .filter(|t| t.fields.priority == Priority::Urgent)
        .collect()
}

/// The urgent task with the earliest due date.
///
/// Among urgent tasks with the same date the one earliest in snapshot order
/// wins. If no urgent task has a date, the first urgent task is returned.
#[must_use]
pub fn nearest_urgent_deadline(tasks: &[Task]) -> Option<&Task> {
    let mut urgent = tasks
        .iter()
        .filter(|t| t.fields.priority == Priority::Urgent)
        .peekable();
    let first = *urgent.peek()?;

    let mut nearest: Option<&Task> = None;
    for task in urgent {
        let Some(date) = task.fields.date else {
            continue;
        };
        if nearest
            .and_then(|n| n.fields.date)
            .is_none_or(|best| date < best)
        {
            nearest = Some(task);
        }
    }
    Some(nearest.unwrap_or(first))
}

/// Due date as `"March 5, 2025"`, or [`NO_DATE_PLACEHOLDER`].
#[must_use]
pub fn format_urgent_deadline(task: &Task) -> String {
    task.fields.date.map_or_else(
        || NO_DATE_PLACEHOLDER.to_string(),
        |date| date.format("%B %-d, %Y").to_string(),
    )
}

/// Figures shown on the summary page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BoardSummary {
    /// Tasks in "To do".
    pub todo: usize,
    /// Tasks in "In progress".
    pub in_progress: usize,
    /// Tasks in "Await feedback".
    pub await_feedback: usize,
    /// Tasks in "Done".
    pub done: usize,
    /// All tasks on the board.
    pub total: usize,
    /// Tasks with urgent priority.
    pub urgent: usize,
    /// Formatted date of the nearest urgent deadline.
    pub upcoming_deadline: String,
}

/// Computes the summary figures for a task snapshot.
#[must_use]
pub fn summarize(tasks: &[Task]) -> BoardSummary {
    let buckets = bucket_by_status(tasks);
    BoardSummary {
        todo: buckets.count(TaskStatus::Todo),
        in_progress: buckets.count(TaskStatus::InProgress),
        await_feedback: buckets.count(TaskStatus::AwaitFeedback),
        done: buckets.count(TaskStatus::Done),
        total: buckets.total(),
        urgent: bucket_by_urgent_priority(tasks).len(),
        upcoming_deadline: nearest_urgent_deadline(tasks)
            .map_or_else(|| NO_URGENT_PLACEHOLDER.to_string(), format_urgent_deadline),
    }
}
