//! Remote collection gateway.
//!
//! Defines the [`Gateway`] trait the board talks to. The gateway is the
//! only component that knows about the hosted store; everything above it
//! sees typed entities, typed writes and a feed of [`Change`]s.
//!
//! Implementations:
//! - [`memory::MemoryGateway`]: in-process store used by tests and the demo binary

pub mod memory;

use std::future::Future;
use std::marker::PhantomData;

use tokio::sync::mpsc;

use taskboard_proto::codec::{self, CodecError};
use taskboard_proto::{Change, Collection, Entity};

/// Errors reported by a gateway call.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GatewayError {
    /// The targeted document does not exist in the store.
    #[error("document {id} not found in {collection}")]
    NotFound {
        /// Collection that was searched.
        collection: Collection,
        /// Id that was not found.
        id: String,
    },

    /// The store refused the operation.
    #[error("permission denied on {0}")]
    PermissionDenied(Collection),

    /// The store could not be reached or failed internally.
    #[error("store unavailable: {0}")]
    Unavailable(String),

    /// A document or notification frame could not be encoded or decoded.
    #[error("codec error: {0}")]
    Codec(#[from] CodecError),
}

/// A write to a single document.
#[derive(Debug, Clone)]
pub enum Upsert<E: Entity> {
    /// Create a new document; the store assigns the id.
    Insert(E::Fields),
    /// Write the carried fields of an existing document.
    Merge(E::Id, E::Patch),
}

/// Stream of change notifications for one collection.
///
/// The first item is always a [`Change::Replace`] with the collection's
/// state at subscription time. Items arrive in the order the store
/// committed them. The feed ends when the store drops the subscription.
pub struct ChangeFeed<E> {
    frames: mpsc::UnboundedReceiver<Vec<u8>>,
    _entity: PhantomData<fn() -> E>,
}

impl<E: Entity> ChangeFeed<E> {
    /// Wraps a receiver of encoded notification frames.
    #[must_use]
    pub const fn new(frames: mpsc::UnboundedReceiver<Vec<u8>>) -> Self {
        Self {
            frames,
            _entity: PhantomData,
        }
    }

    /// Waits for the next change.
    ///
    /// Returns `None` once the feed is closed. A frame that fails to decode
    /// yields `Some(Err(_))`; the feed stays usable afterwards.
    pub async fn next(&mut self) -> Option<Result<Change<E>, GatewayError>> {
        let frame = self.frames.recv().await?;
        Some(codec::decode_change(&frame).map_err(GatewayError::from))
    }
}

impl<E> std::fmt::Debug for ChangeFeed<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChangeFeed").finish_non_exhaustive()
    }
}

/// Async adapter over a hosted document store.
///
/// The board makes no assumption about transport, auth or storage format
/// beyond this: every committed write is eventually delivered, in commit
/// order, to every open [`ChangeFeed`] of its collection.
///
/// # Invariant
///
/// A successful write is acknowledged before (or independently of) its
/// notification. Callers must not assume the notification has been
/// delivered when the write future resolves.
pub trait Gateway: Send + Sync {
    /// Opens a change feed on the entity's collection.
    fn subscribe<E: Entity>(
        &self,
    ) -> impl Future<Output = Result<ChangeFeed<E>, GatewayError>> + Send;

    /// Creates or updates a document, returning its id.
    fn upsert<E: Entity>(
        &self,
        write: Upsert<E>,
    ) -> impl Future<Output = Result<E::Id, GatewayError>> + Send;

    /// Removes a document. Removing a missing document succeeds.
    fn delete<E: Entity>(
        &self,
        id: &E::Id,
    ) -> impl Future<Output = Result<(), GatewayError>> + Send;
}
