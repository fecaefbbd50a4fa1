//! Immutable, versioned collection snapshots.

use std::collections::HashMap;

use taskboard_proto::{Change, Entity};

/// A point-in-time copy of one collection.
///
/// Entities are kept in store order and indexed by id. A snapshot is
/// never modified after it is built: applying a change produces a new
/// snapshot with the next version.
#[derive(Debug, Clone)]
pub struct Snapshot<E: Entity> {
    version: u64,
    entities: Vec<E>,
    index: HashMap<E::Id, usize>,
}

impl<E: Entity> Default for Snapshot<E> {
    fn default() -> Self {
        Self::empty()
    }
}

impl<E: Entity> Snapshot<E> {
    /// The state before any notification has arrived: version 0, no entities.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            version: 0,
            entities: Vec::new(),
            index: HashMap::new(),
        }
    }

    /// Builds a snapshot from entities in store order.
    ///
    /// Ids must be unique; if one repeats, the first occurrence is kept.
    #[must_use]
    pub fn from_entities(version: u64, entities: Vec<E>) -> Self {
        let mut index = HashMap::with_capacity(entities.len());
        let mut unique = Vec::with_capacity(entities.len());
        for entity in entities {
            if index.contains_key(entity.id()) {
                tracing::warn!(
                    collection = %E::COLLECTION,
                    id = %entity.id(),
                    "duplicate id in snapshot, keeping first"
                );
                continue;
            }
            index.insert(entity.id().clone(), unique.len());
            unique.push(entity);
        }
        Self {
            version,
            entities: unique,
            index,
        }
    }

    /// Monotonic version, bumped once per applied change.
    #[must_use]
    pub const fn version(&self) -> u64 {
        self.version
    }

    /// Entities in store order.
    #[must_use]
    pub fn entities(&self) -> &[E] {
        &self.entities
    }

    /// Iterates over entities in store order.
    pub fn iter(&self) -> std::slice::Iter<'_, E> {
        self.entities.iter()
    }

    /// Number of entities.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entities.len()
    }

    /// Returns `true` if the collection is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    /// Looks an entity up by id.
    #[must_use]
    pub fn get(&self, id: &E::Id) -> Option<&E> {
        self.index.get(id).map(|&pos| &self.entities[pos])
    }

    /// Returns `true` if an entity with this id is present.
    #[must_use]
    pub fn contains(&self, id: &E::Id) -> bool {
        self.index.contains_key(id)
    }

    /// Store-order position of an entity.
    #[must_use]
    pub fn position(&self, id: &E::Id) -> Option<usize> {
        self.index.get(id).copied()
    }

    /// Returns the snapshot that results from applying `change`, or `None`
    /// if the change has no effect (a delete of an unknown id).
    ///
    /// An upsert of a known id replaces the entity at its current position;
    /// an unknown id is appended. A delete keeps the relative order of the
    /// remaining entities.
    #[must_use]
    pub fn applied(&self, change: Change<E>) -> Option<Self> {
        let version = self.version + 1;
        match change {
            Change::Replace(entities) => Some(Self::from_entities(version, entities)),
            Change::Upsert(entity) => {
                let mut entities = self.entities.clone();
                match self.position(entity.id()) {
                    Some(pos) => entities[pos] = entity,
                    None => entities.push(entity),
                }
                Some(Self::from_entities(version, entities))
            }
            Change::Delete(id) => {
                let pos = self.position(&id)?;
                let mut entities = self.entities.clone();
                entities.remove(pos);
                Some(Self::from_entities(version, entities))
            }
        }
    }
}

impl<'a, E: Entity> IntoIterator for &'a Snapshot<E> {
    type Item = &'a E;
    type IntoIter = std::slice::Iter<'a, E>;

    fn into_iter(self) -> Self::IntoIter {
        self.entities.iter()
    }
}
