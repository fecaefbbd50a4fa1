//! Validation errors for drafts and patches.
//!
//! Every check runs locally, before anything is sent to the remote store.

use thiserror::Error;

/// A caller-supplied draft or patch violates an entity invariant.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ValidationError {
    /// Task title is empty or whitespace only.
    #[error("task title cannot be empty")]
    EmptyTitle,
    /// Task title exceeds the configured maximum length.
    #[error("task title too long ({len} characters, max {max})")]
    TitleTooLong {
        /// Length of the rejected title in characters.
        len: usize,
        /// Configured maximum.
        max: usize,
    },
    /// Task category is empty.
    #[error("task category cannot be empty")]
    EmptyCategory,
    /// Task category is not one of the configured categories.
    #[error("unknown task category: {0}")]
    UnknownCategory(String),
    /// Task has no priority.
    #[error("task priority is required")]
    MissingPriority,
    /// The same contact appears twice in the assignee list.
    #[error("contact {0} is assigned more than once")]
    DuplicateAssignee(String),
    /// A subtask label is empty.
    #[error("subtask {index} has an empty label")]
    EmptySubtaskLabel {
        /// Position of the offending subtask.
        index: usize,
    },
    /// A subtask index does not exist on the task.
    #[error("subtask index {index} out of range (task has {len} subtasks)")]
    SubtaskOutOfRange {
        /// Requested index.
        index: usize,
        /// Number of subtasks on the task.
        len: usize,
    },
    /// Contact first name is empty.
    #[error("contact first name cannot be empty")]
    EmptyFirstname,
    /// Contact last name is empty.
    #[error("contact last name cannot be empty")]
    EmptyLastname,
    /// A patch carries no fields.
    #[error("update carries no fields")]
    EmptyPatch,
}
