//! Task model for the board.
//!
//! A [`Task`] is a store-assigned [`TaskId`] plus its [`TaskFields`]. New
//! tasks start life as a [`TaskDraft`], which is validated into fields
//! before it is ever sent to the store. Later writes are expressed as a
//! [`TaskPatch`] (any subset of fields) or the narrower [`TaskStatusPatch`]
//! used by column moves and subtask toggles.

use std::collections::HashSet;
use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::contact::ContactId;
use crate::entity::{Collection, Entity};
use crate::validation::ValidationError;

/// Default maximum task title length in characters.
pub const MAX_TASK_TITLE_LENGTH: usize = 256;

/// Opaque task identifier assigned by the remote store.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TaskId(String);

impl TaskId {
    /// Wraps a store-assigned identifier.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the identifier as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<String> for TaskId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl From<&str> for TaskId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Task priority.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    /// Can wait.
    Low,
    /// The default when a task is created from the board.
    Medium,
    /// Shown on the summary's urgent counter and deadline.
    Urgent,
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Low => write!(f, "low"),
            Self::Medium => write!(f, "medium"),
            Self::Urgent => write!(f, "urgent"),
        }
    }
}

/// Board column a task sits in.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TaskStatus {
    /// Not started.
    #[default]
    Todo,
    /// Being worked on.
    InProgress,
    /// Waiting for someone else's input.
    AwaitFeedback,
    /// Finished.
    Done,
}

impl TaskStatus {
    /// All statuses in board column order.
    pub const ALL: [Self; 4] = [Self::Todo, Self::InProgress, Self::AwaitFeedback, Self::Done];

    /// Position of this status in [`TaskStatus::ALL`].
    #[must_use]
    pub const fn index(self) -> usize {
        match self {
            Self::Todo => 0,
            Self::InProgress => 1,
            Self::AwaitFeedback => 2,
            Self::Done => 3,
        }
    }

    /// Column heading shown on the board.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Todo => "To do",
            Self::InProgress => "In progress",
            Self::AwaitFeedback => "Await feedback",
            Self::Done => "Done",
        }
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Todo => write!(f, "todo"),
            Self::InProgress => write!(f, "inProgress"),
            Self::AwaitFeedback => write!(f, "awaitFeedback"),
            Self::Done => write!(f, "done"),
        }
    }
}

/// A checklist entry nested inside a task.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Subtask {
    /// Text shown next to the checkbox.
    pub label: String,
    /// Whether the entry is ticked.
    pub is_completed: bool,
}

impl Subtask {
    /// Creates an open subtask.
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            is_completed: false,
        }
    }
}

/// Every field of a persisted task except its id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskFields {
    /// Short title, never empty.
    pub title: String,
    /// Free text, may be empty.
    pub description: String,
    /// Due date.
    pub date: Option<NaiveDate>,
    /// Priority, always set on a persisted task.
    pub priority: Priority,
    /// Board column.
    pub status: TaskStatus,
    /// Category, never empty on a persisted task.
    pub category: String,
    /// Assigned contacts in assignment order, no duplicates.
    pub assigned_to_user_id: Vec<ContactId>,
    /// Checklist in display order.
    pub subtasks: Vec<Subtask>,
}

/// A persisted task.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    /// Store-assigned identifier.
    pub id: TaskId,
    /// Current field values.
    pub fields: TaskFields,
}

impl Task {
    /// Creates a task from an id and its fields.
    #[must_use]
    pub const fn new(id: TaskId, fields: TaskFields) -> Self {
        Self { id, fields }
    }
}

impl Entity for Task {
    type Id = TaskId;
    type Fields = TaskFields;
    type Patch = TaskPatch;

    const COLLECTION: Collection = Collection::Tasks;

    fn id(&self) -> &TaskId {
        &self.id
    }

    fn from_parts(id: TaskId, fields: TaskFields) -> Self {
        Self { id, fields }
    }

    fn apply_patch(&mut self, patch: &TaskPatch) {
        patch.apply_to(&mut self.fields);
    }
}

/// Limits applied when validating task drafts and patches.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskRules {
    /// Maximum title length in characters.
    pub max_title_len: usize,
    /// Allowed categories. Empty means any non-empty category.
    pub categories: Vec<String>,
}

impl Default for TaskRules {
    fn default() -> Self {
        Self {
            max_title_len: MAX_TASK_TITLE_LENGTH,
            categories: Vec::new(),
        }
    }
}

impl TaskRules {
    fn check_title(&self, title: &str) -> Result<(), ValidationError> {
        if title.trim().is_empty() {
            return Err(ValidationError::EmptyTitle);
        }
        let len = title.chars().count();
        if len > self.max_title_len {
            return Err(ValidationError::TitleTooLong {
                len,
                max: self.max_title_len,
            });
        }
        Ok(())
    }

    fn check_category(&self, category: &str) -> Result<(), ValidationError> {
        if category.trim().is_empty() {
            return Err(ValidationError::EmptyCategory);
        }
        if !self.categories.is_empty() && !self.categories.iter().any(|c| c == category) {
            return Err(ValidationError::UnknownCategory(category.to_string()));
        }
        Ok(())
    }
}

fn check_assignees(ids: &[ContactId]) -> Result<(), ValidationError> {
    let mut seen = HashSet::with_capacity(ids.len());
    for id in ids {
        if !seen.insert(id) {
            return Err(ValidationError::DuplicateAssignee(id.to_string()));
        }
    }
    Ok(())
}

fn check_subtasks(subtasks: &[Subtask]) -> Result<(), ValidationError> {
    match subtasks.iter().position(|s| s.label.trim().is_empty()) {
        Some(index) => Err(ValidationError::EmptySubtaskLabel { index }),
        None => Ok(()),
    }
}

/// User input for a new task, not yet validated.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskDraft {
    /// Title as typed.
    pub title: String,
    /// Description as typed.
    pub description: String,
    /// Optional due date.
    pub date: Option<NaiveDate>,
    /// Chosen priority, required.
    pub priority: Option<Priority>,
    /// Initial column.
    pub status: TaskStatus,
    /// Chosen category, required.
    pub category: String,
    /// Selected contacts.
    pub assigned_to_user_id: Vec<ContactId>,
    /// Checklist entries.
    pub subtasks: Vec<Subtask>,
}

impl TaskDraft {
    /// Starts a draft with the given title and everything else empty.
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Self::default()
        }
    }

    /// Sets the description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Sets the due date.
    #[must_use]
    pub fn with_date(mut self, date: NaiveDate) -> Self {
        self.date = Some(date);
        self
    }

    /// Sets the priority.
    #[must_use]
    pub fn with_priority(mut self, priority: Priority) -> Self {
        self.priority = Some(priority);
        self
    }

    /// Sets the initial column.
    #[must_use]
    pub fn with_status(mut self, status: TaskStatus) -> Self {
        self.status = status;
        self
    }

    /// Sets the category.
    #[must_use]
    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = category.into();
        self
    }

    /// Sets the assignee list.
    #[must_use]
    pub fn with_assignees(mut self, ids: Vec<ContactId>) -> Self {
        self.assigned_to_user_id = ids;
        self
    }

    /// Sets the checklist.
    #[must_use]
    pub fn with_subtasks(mut self, subtasks: Vec<Subtask>) -> Self {
        self.subtasks = subtasks;
        self
    }

    /// Checks every task invariant and returns the fields to persist.
    ///
    /// Assignees and subtasks are carried over verbatim; empty lists are
    /// allowed.
    ///
    /// # Errors
    ///
    /// Returns the first [`ValidationError`] found: title, category,
    /// priority, assignees, then subtasks.
    pub fn validate(self, rules: &TaskRules) -> Result<TaskFields, ValidationError> {
        rules.check_title(&self.title)?;
        rules.check_category(&self.category)?;
        let priority = self.priority.ok_or(ValidationError::MissingPriority)?;
        check_assignees(&self.assigned_to_user_id)?;
        check_subtasks(&self.subtasks)?;

        Ok(TaskFields {
            title: self.title,
            description: self.description,
            date: self.date,
            priority,
            status: self.status,
            category: self.category,
            assigned_to_user_id: self.assigned_to_user_id,
            subtasks: self.subtasks,
        })
    }
}

/// Partial task update. `None` means "leave this field alone".
///
/// `date` is doubly optional: `Some(None)` clears the due date.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskPatch {
    /// New title.
    pub title: Option<String>,
    /// New description.
    pub description: Option<String>,
    /// New due date, or `Some(None)` to clear it.
    pub date: Option<Option<NaiveDate>>,
    /// New priority.
    pub priority: Option<Priority>,
    /// New column.
    pub status: Option<TaskStatus>,
    /// New category.
    pub category: Option<String>,
    /// Full replacement assignee list.
    pub assigned_to_user_id: Option<Vec<ContactId>>,
    /// Full replacement checklist.
    pub subtasks: Option<Vec<Subtask>>,
}

impl TaskPatch {
    /// Returns `true` if the patch carries no fields.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.description.is_none()
            && self.date.is_none()
            && self.priority.is_none()
            && self.status.is_none()
            && self.category.is_none()
            && self.assigned_to_user_id.is_none()
            && self.subtasks.is_none()
    }

    /// Patch that only replaces the assignee list.
    #[must_use]
    pub fn assignees(ids: Vec<ContactId>) -> Self {
        Self {
            assigned_to_user_id: Some(ids),
            ..Self::default()
        }
    }

    /// Checks the invariants of every field the patch carries.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::EmptyPatch`] for a patch with no fields,
    /// otherwise the first invariant violated by a carried field.
    pub fn validate(&self, rules: &TaskRules) -> Result<(), ValidationError> {
        if self.is_empty() {
            return Err(ValidationError::EmptyPatch);
        }
        if let Some(title) = &self.title {
            rules.check_title(title)?;
        }
        if let Some(category) = &self.category {
            rules.check_category(category)?;
        }
        if let Some(ids) = &self.assigned_to_user_id {
            check_assignees(ids)?;
        }
        if let Some(subtasks) = &self.subtasks {
            check_subtasks(subtasks)?;
        }
        Ok(())
    }

    /// Writes the carried fields into `fields`.
    pub fn apply_to(&self, fields: &mut TaskFields) {
        if let Some(title) = &self.title {
            fields.title.clone_from(title);
        }
        if let Some(description) = &self.description {
            fields.description.clone_from(description);
        }
        if let Some(date) = self.date {
            fields.date = date;
        }
        if let Some(priority) = self.priority {
            fields.priority = priority;
        }
        if let Some(status) = self.status {
            fields.status = status;
        }
        if let Some(category) = &self.category {
            fields.category.clone_from(category);
        }
        if let Some(ids) = &self.assigned_to_user_id {
            fields.assigned_to_user_id.clone_from(ids);
        }
        if let Some(subtasks) = &self.subtasks {
            fields.subtasks.clone_from(subtasks);
        }
    }
}

/// The narrow update used by column moves and subtask toggles.
///
/// Only the checklist and the column can be carried, so a caller cannot
/// accidentally overwrite the title or any other field.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskStatusPatch {
    /// Full checklist with the caller's change applied.
    pub subtasks: Option<Vec<Subtask>>,
    /// New column.
    pub status: Option<TaskStatus>,
}

impl TaskStatusPatch {
    /// Moves the task to another column.
    #[must_use]
    pub const fn status(status: TaskStatus) -> Self {
        Self {
            subtasks: None,
            status: Some(status),
        }
    }

    /// Replaces the checklist.
    #[must_use]
    pub const fn subtasks(subtasks: Vec<Subtask>) -> Self {
        Self {
            subtasks: Some(subtasks),
            status: None,
        }
    }
}

impl From<TaskStatusPatch> for TaskPatch {
    fn from(patch: TaskStatusPatch) -> Self {
        Self {
            subtasks: patch.subtasks,
            status: patch.status,
            ..Self::default()
        }
    }
}
