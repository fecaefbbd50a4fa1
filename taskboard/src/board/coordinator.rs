//! Mutation coordinator.
//!
//! Turns caller intents into gateway writes. Input is validated and target
//! ids are checked against the mirrors before anything is sent, so those
//! errors come back without touching the network. The coordinator never
//! writes a mirror: a successful write shows up locally only when the
//! store's change notification has been applied by the sync pump.
//! Nothing is retried.

use std::sync::Arc;

use rand::Rng;

use taskboard_proto::{
    Contact, ContactDraft, ContactId, ContactPatch, Entity, Subtask, Task, TaskDraft, TaskId,
    TaskPatch, TaskRules, TaskStatusPatch, ValidationError,
};

use super::BoardError;
use crate::assignees;
use crate::gateway::{Gateway, GatewayError, Upsert};
use crate::mirror::Mirror;

/// Badge color used when no palette is configured.
pub const DEFAULT_CONTACT_COLOR: &str = "#2a3647";

/// Validation rules and contact colors used by the coordinator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoardSettings {
    /// Task validation rules.
    pub rules: TaskRules,
    /// Colors new contacts are assigned from, at random.
    pub palette: Vec<String>,
}

impl Default for BoardSettings {
    fn default() -> Self {
        Self {
            rules: TaskRules::default(),
            palette: vec![
                "#ff7a00".to_string(),
                "#9327ff".to_string(),
                "#6e52ff".to_string(),
                "#fc71ff".to_string(),
                "#ffbb2b".to_string(),
                "#1fd7c1".to_string(),
                "#462f8a".to_string(),
                "#ff4646".to_string(),
            ],
        }
    }
}

/// Issues task and contact writes to the gateway.
pub struct Coordinator<G: Gateway> {
    gateway: Arc<G>,
    tasks: Mirror<Task>,
    contacts: Mirror<Contact>,
    settings: BoardSettings,
}

impl<G: Gateway> Coordinator<G> {
    /// Creates a coordinator that checks ids against the given mirrors.
    #[must_use]
    pub const fn new(
        gateway: Arc<G>,
        tasks: Mirror<Task>,
        contacts: Mirror<Contact>,
        settings: BoardSettings,
    ) -> Self {
        Self {
            gateway,
            tasks,
            contacts,
            settings,
        }
    }

    /// Active settings.
    #[must_use]
    pub const fn settings(&self) -> &BoardSettings {
        &self.settings
    }

    /// Validates `draft` and creates the task, returning its store id.
    ///
    /// # Errors
    ///
    /// [`BoardError::Validation`] if the draft breaks a task invariant,
    /// [`BoardError::Remote`] if the write fails.
    pub async fn create_task(&self, draft: TaskDraft) -> Result<TaskId, BoardError> {
        let fields = draft.validate(&self.settings.rules)?;
        let id = self
            .gateway
            .upsert::<Task>(Upsert::Insert(fields))
            .await
            .inspect_err(|e| tracing::warn!(error = %e, "create task rejected"))?;
        tracing::debug!(task = %id, "task created");
        Ok(id)
    }

    /// Writes the fields carried by `patch` and leaves the rest untouched.
    ///
    /// # Errors
    ///
    /// [`BoardError::Validation`] for an empty or invalid patch,
    /// [`BoardError::NotFound`] if `id` is not in the task mirror,
    /// [`BoardError::Remote`] if the write fails.
    pub async fn update_task(&self, id: &TaskId, patch: TaskPatch) -> Result<(), BoardError> {
        patch.validate(&self.settings.rules)?;
        require_known(&self.tasks, id)?;
        self.gateway
            .upsert::<Task>(Upsert::Merge(id.clone(), patch))
            .await
            .inspect_err(|e| tracing::warn!(task = %id, error = %e, "task update rejected"))?;
        tracing::debug!(task = %id, "task updated");
        Ok(())
    }

    /// Narrow update of the checklist and/or the column.
    ///
    /// # Errors
    ///
    /// Same as [`Coordinator::update_task`].
    pub async fn update_task_status(
        &self,
        id: &TaskId,
        patch: TaskStatusPatch,
    ) -> Result<(), BoardError> {
        self.update_task(id, patch.into()).await
    }

    /// Flips the completion flag of one subtask.
    ///
    /// The full checklist is rebuilt from the mirror's copy of the task with
    /// only entry `index` changed, then sent as a narrow update.
    ///
    /// # Errors
    ///
    /// [`BoardError::NotFound`] for an unknown task,
    /// [`BoardError::Validation`] for an index past the end of the checklist,
    /// [`BoardError::Remote`] if the write fails.
    pub async fn toggle_subtask(&self, id: &TaskId, index: usize) -> Result<(), BoardError> {
        let subtasks = {
            let snapshot = self.tasks.current_snapshot();
            let task = snapshot.get(id).ok_or_else(|| not_found::<Task>(id))?;
            toggled_subtasks(&task.fields.subtasks, index)?
        };
        self.update_task_status(id, TaskStatusPatch::subtasks(subtasks))
            .await
    }

    /// Adds `contact` to the task's assignees, or removes it if present.
    ///
    /// # Errors
    ///
    /// Same as [`Coordinator::update_task`].
    pub async fn toggle_assignment(
        &self,
        task: &Task,
        contact: &ContactId,
    ) -> Result<(), BoardError> {
        let ids = assignees::toggled(&task.fields.assigned_to_user_id, contact);
        self.update_task(&task.id, TaskPatch::assignees(ids)).await
    }

    /// Deletes a task. Deleting an absent task succeeds.
    ///
    /// # Errors
    ///
    /// [`BoardError::Remote`] if the store rejects the delete.
    pub async fn delete_task(&self, id: &TaskId) -> Result<(), BoardError> {
        self.delete::<Task>(id).await
    }

    /// Validates `draft`, picks a badge color and creates the contact.
    ///
    /// # Errors
    ///
    /// [`BoardError::Validation`] for blank names,
    /// [`BoardError::Remote`] if the write fails.
    pub async fn create_contact(&self, draft: ContactDraft) -> Result<ContactId, BoardError> {
        let fields = draft.validate(self.pick_color())?;
        let id = self
            .gateway
            .upsert::<Contact>(Upsert::Insert(fields))
            .await
            .inspect_err(|e| tracing::warn!(error = %e, "create contact rejected"))?;
        tracing::debug!(contact = %id, "contact created");
        Ok(id)
    }

    /// Writes the fields carried by `patch`. The color never changes.
    ///
    /// # Errors
    ///
    /// [`BoardError::Validation`] for an empty or invalid patch,
    /// [`BoardError::NotFound`] if `id` is not in the contact mirror,
    /// [`BoardError::Remote`] if the write fails.
    pub async fn update_contact(
        &self,
        id: &ContactId,
        patch: ContactPatch,
    ) -> Result<(), BoardError> {
        patch.validate()?;
        require_known(&self.contacts, id)?;
        self.gateway
            .upsert::<Contact>(Upsert::Merge(id.clone(), patch))
            .await
            .inspect_err(|e| tracing::warn!(contact = %id, error = %e, "contact update rejected"))?;
        tracing::debug!(contact = %id, "contact updated");
        Ok(())
    }

    /// Deletes a contact. Tasks still assigned to it keep the id.
    ///
    /// # Errors
    ///
    /// [`BoardError::Remote`] if the store rejects the delete.
    pub async fn delete_contact(&self, id: &ContactId) -> Result<(), BoardError> {
        self.delete::<Contact>(id).await
    }

    async fn delete<E: Entity>(&self, id: &E::Id) -> Result<(), BoardError> {
        match self.gateway.delete::<E>(id).await {
            Ok(()) | Err(GatewayError::NotFound { .. }) => {
                tracing::debug!(collection = %E::COLLECTION, id = %id, "deleted");
                Ok(())
            }
            Err(e) => {
                tracing::warn!(collection = %E::COLLECTION, id = %id, error = %e, "delete rejected");
                Err(BoardError::Remote(e))
            }
        }
    }

    fn pick_color(&self) -> String {
        let palette = &self.settings.palette;
        if palette.is_empty() {
            return DEFAULT_CONTACT_COLOR.to_string();
        }
        palette[rand::rng().random_range(0..palette.len())].clone()
    }
}

impl<G: Gateway> std::fmt::Debug for Coordinator<G> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Coordinator")
            .field("settings", &self.settings)
            .finish_non_exhaustive()
    }
}

/// The checklist with entry `index` flipped and every other entry as is.
///
/// # Errors
///
/// [`ValidationError::SubtaskOutOfRange`] if `index` is past the end.
pub fn toggled_subtasks(subtasks: &[Subtask], index: usize) -> Result<Vec<Subtask>, ValidationError> {
    if index >= subtasks.len() {
        return Err(ValidationError::SubtaskOutOfRange {
            index,
            len: subtasks.len(),
        });
    }
    let mut next = subtasks.to_vec();
    next[index].is_completed = !next[index].is_completed;
    Ok(next)
}

fn not_found<E: Entity>(id: &E::Id) -> BoardError {
    BoardError::NotFound {
        collection: E::COLLECTION,
        id: id.to_string(),
    }
}

fn require_known<E: Entity>(mirror: &Mirror<E>, id: &E::Id) -> Result<(), BoardError> {
    if mirror.current_snapshot().contains(id) {
        Ok(())
    } else {
        Err(not_found::<E>(id))
    }
}
