//! Board seed files.
//!
//! A seed file is the JSON export of a board: every task and contact with
//! its store id. The demo binary loads one into a [`MemoryGateway`] before
//! connecting.
//!
//! ```json
//! {
//!   "contacts": [{ "id": "c1", "firstname": "Anja", "lastname": "Schulz",
//!                  "color": "#ff7a00", "email": "anja@example.com" }],
//!   "tasks": [{ "id": "t1", "title": "Kickoff", "description": "",
//!               "date": "2025-03-05", "priority": "urgent", "status": "todo",
//!               "category": "User Story", "assignedToUserId": ["c1"],
//!               "subtasks": [] }]
//! }
//! ```

use std::path::{Path, PathBuf};

use serde::Deserialize;

use taskboard_proto::{Contact, ContactFields, ContactId, Task, TaskFields, TaskId};

use crate::gateway::GatewayError;
use crate::gateway::memory::MemoryGateway;

/// Errors loading or installing a seed file.
#[derive(Debug, thiserror::Error)]
pub enum SeedError {
    /// The file could not be read.
    #[error("failed to read seed file {path}: {source}")]
    Read {
        /// Path that was attempted.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// The file is not a valid board export.
    #[error("failed to parse seed file: {0}")]
    Parse(#[from] serde_json::Error),

    /// The store refused the seed data.
    #[error("failed to seed store: {0}")]
    Store(#[from] GatewayError),
}

#[derive(Debug, Deserialize)]
struct SeedTask {
    id: TaskId,
    #[serde(flatten)]
    fields: TaskFields,
}

#[derive(Debug, Deserialize)]
struct SeedContact {
    id: ContactId,
    #[serde(flatten)]
    fields: ContactFields,
}

/// Parsed contents of a seed file.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct SeedFile {
    tasks: Vec<SeedTask>,
    contacts: Vec<SeedContact>,
}

impl SeedFile {
    /// Reads and parses a seed file.
    ///
    /// # Errors
    ///
    /// [`SeedError::Read`] if the file cannot be read,
    /// [`SeedError::Parse`] if it is not valid.
    pub fn load(path: &Path) -> Result<Self, SeedError> {
        let contents = std::fs::read_to_string(path).map_err(|e| SeedError::Read {
            path: path.to_path_buf(),
            source: e,
        })?;
        Self::from_json(&contents)
    }

    /// Parses seed data from a JSON string.
    ///
    /// # Errors
    ///
    /// [`SeedError::Parse`] if the JSON is not a valid board export.
    pub fn from_json(json: &str) -> Result<Self, SeedError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Number of tasks in the file.
    #[must_use]
    pub fn task_count(&self) -> usize {
        self.tasks.len()
    }

    /// Number of contacts in the file.
    #[must_use]
    pub fn contact_count(&self) -> usize {
        self.contacts.len()
    }

    /// Writes every entity into `gateway`, keeping file order and ids.
    ///
    /// # Errors
    ///
    /// [`SeedError::Store`] if the store rejects a document.
    pub fn install(self, gateway: &MemoryGateway) -> Result<(), SeedError> {
        let (tasks, contacts) = (self.tasks.len(), self.contacts.len());
        gateway.seed(
            self.contacts
                .into_iter()
                .map(|c| Contact::new(c.id, c.fields)),
        )?;
        gateway.seed(self.tasks.into_iter().map(|t| Task::new(t.id, t.fields)))?;
        tracing::info!(tasks, contacts, "seeded store");
        Ok(())
    }
}
