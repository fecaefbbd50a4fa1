//! Data model and change notification codec shared by Taskboard crates.

pub mod change;
pub mod codec;
pub mod contact;
pub mod entity;
pub mod task;
pub mod validation;

pub use change::Change;
pub use contact::{Contact, ContactDraft, ContactFields, ContactId, ContactPatch};
pub use entity::{Collection, Entity};
pub use task::{
    Priority, Subtask, Task, TaskDraft, TaskFields, TaskId, TaskPatch, TaskRules, TaskStatus,
    TaskStatusPatch,
};
pub use validation::ValidationError;
