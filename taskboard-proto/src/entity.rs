//! The [`Entity`] trait shared by every mirrored collection.
//!
//! An entity ties a Rust type to the remote collection it lives in, the
//! opaque id the store assigns, the field body sent on creation, and the
//! partial-update type accepted for later writes.

use std::fmt;
use std::hash::Hash;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

/// Name of a remote collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Collection {
    /// Board tasks.
    Tasks,
    /// Contacts that tasks can be assigned to.
    Contacts,
}

impl Collection {
    /// Returns the collection name as used by the remote store.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Tasks => "tasks",
            Self::Contacts => "contacts",
        }
    }
}

impl fmt::Display for Collection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A document type stored in a remote collection and mirrored locally.
pub trait Entity:
    Clone + fmt::Debug + PartialEq + Serialize + DeserializeOwned + Send + Sync + 'static
{
    /// Opaque identifier assigned by the remote store.
    type Id: Clone
        + fmt::Debug
        + fmt::Display
        + Eq
        + Hash
        + From<String>
        + Serialize
        + DeserializeOwned
        + Send
        + Sync
        + 'static;

    /// Field body of a document, everything except the id.
    type Fields: Clone + fmt::Debug + Serialize + DeserializeOwned + Send + Sync + 'static;

    /// Partial update: only the fields it carries are written.
    type Patch: Clone + fmt::Debug + Serialize + DeserializeOwned + Send + Sync + 'static;

    /// The collection this entity lives in.
    const COLLECTION: Collection;

    /// Returns the entity's id.
    fn id(&self) -> &Self::Id;

    /// Assembles an entity from a store-assigned id and its fields.
    fn from_parts(id: Self::Id, fields: Self::Fields) -> Self;

    /// Overwrites the fields carried by `patch`, leaving the rest untouched.
    fn apply_patch(&mut self, patch: &Self::Patch);
}
