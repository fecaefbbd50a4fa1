//! Board session: mirrors, sync pumps and the mutation coordinator.
//!
//! A [`Board`] is built explicitly from a [`Gateway`] handle. It opens one
//! change feed per collection and spawns a pump task that applies each
//! notification to the matching [`Mirror`], in delivery order. The pumps
//! are the only writers of the mirrors and are aborted when the board is
//! dropped.

pub mod coordinator;

use std::sync::Arc;

use tokio::task::JoinHandle;

use taskboard_proto::{Collection, Contact, Entity, Task, ValidationError};

use crate::gateway::{ChangeFeed, Gateway, GatewayError};
use crate::mirror::Mirror;

pub use coordinator::{BoardSettings, Coordinator, DEFAULT_CONTACT_COLOR};

/// Errors returned by board operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BoardError {
    /// Caller input violates an entity invariant. Nothing was sent.
    #[error("invalid input: {0}")]
    Validation(#[from] ValidationError),

    /// The targeted entity is not known.
    #[error("{collection} entry {id} not found")]
    NotFound {
        /// Collection that was searched.
        collection: Collection,
        /// Id that was not found.
        id: String,
    },

    /// The gateway call failed. The mirror is unchanged.
    #[error("remote store error: {0}")]
    Remote(GatewayError),
}

impl From<GatewayError> for BoardError {
    fn from(err: GatewayError) -> Self {
        match err {
            GatewayError::NotFound { collection, id } => Self::NotFound { collection, id },
            other => Self::Remote(other),
        }
    }
}

/// Spawns the task that drains `feed` into `mirror`.
///
/// Changes are applied one at a time in the order the feed yields them.
/// A frame that fails to decode is logged and skipped. The task ends when
/// the feed closes.
pub fn spawn_pump<E: Entity>(mut feed: ChangeFeed<E>, mirror: Mirror<E>) -> JoinHandle<()> {
    tokio::spawn(async move {
        while let Some(next) = feed.next().await {
            match next {
                Ok(change) => {
                    mirror.apply(change);
                }
                Err(e) => {
                    tracing::warn!(collection = %E::COLLECTION, error = %e, "dropping undecodable change");
                }
            }
        }
        tracing::info!(collection = %E::COLLECTION, "change feed closed");
    })
}

/// A connected board: task and contact mirrors kept in sync with the store.
pub struct Board<G: Gateway> {
    tasks: Mirror<Task>,
    contacts: Mirror<Contact>,
    coordinator: Coordinator<G>,
    pumps: Vec<JoinHandle<()>>,
}

impl<G: Gateway> Board<G> {
    /// Subscribes to both collections and starts syncing.
    ///
    /// Returns as soon as the feeds are open. The mirrors stay empty until
    /// the first notification of each collection is applied; use
    /// [`Board::ready`] to wait for that.
    ///
    /// # Errors
    ///
    /// Returns [`BoardError::Remote`] if a feed cannot be opened.
    pub async fn connect(gateway: Arc<G>, settings: BoardSettings) -> Result<Self, BoardError> {
        let task_feed = gateway.subscribe::<Task>().await?;
        let contact_feed = gateway.subscribe::<Contact>().await?;

        let tasks = Mirror::new();
        let contacts = Mirror::new();
        let pumps = vec![
            spawn_pump(task_feed, tasks.clone()),
            spawn_pump(contact_feed, contacts.clone()),
        ];
        tracing::info!("board connected");

        Ok(Self {
            coordinator: Coordinator::new(gateway, tasks.clone(), contacts.clone(), settings),
            tasks,
            contacts,
            pumps,
        })
    }

    /// Waits until both mirrors have applied their initial state.
    pub async fn ready(&self) {
        self.tasks.wait_for_version(1).await;
        self.contacts.wait_for_version(1).await;
    }

    /// The task mirror.
    #[must_use]
    pub const fn tasks(&self) -> &Mirror<Task> {
        &self.tasks
    }

    /// The contact mirror.
    #[must_use]
    pub const fn contacts(&self) -> &Mirror<Contact> {
        &self.contacts
    }

    /// Mutation entry points.
    #[must_use]
    pub const fn coordinator(&self) -> &Coordinator<G> {
        &self.coordinator
    }
}

impl<G: Gateway> Drop for Board<G> {
    fn drop(&mut self) {
        for pump in &self.pumps {
            pump.abort();
        }
    }
}

impl<G: Gateway> std::fmt::Debug for Board<G> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Board")
            .field("tasks", &self.tasks)
            .field("contacts", &self.contacts)
            .finish_non_exhaustive()
    }
}
