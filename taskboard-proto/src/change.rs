//! Change notifications delivered by the remote store.

use serde::{Deserialize, Serialize};

use crate::entity::Entity;

/// One committed change to a remote collection.
///
/// The store delivers these in commit order; receivers apply them in
/// exactly that order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(bound(serialize = "", deserialize = ""))]
pub enum Change<E: Entity> {
    /// The whole collection, in store order. Sent when a subscription opens.
    Replace(Vec<E>),
    /// A document was created or its fields changed.
    Upsert(E),
    /// A document was removed.
    Delete(E::Id),
}

impl<E: Entity> Change<E> {
    /// Short name of the change kind, for logging.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Replace(_) => "replace",
            Self::Upsert(_) => "upsert",
            Self::Delete(_) => "delete",
        }
    }
}
