//! In-process document store.
//!
//! [`MemoryGateway`] keeps each collection as an insertion-ordered list of
//! postcard-encoded documents and fans every committed write out to its
//! open change feeds as encoded frames, exactly like a remote store would.
//! Tests use its fault and hold switches to exercise failed writes and
//! delayed notifications.

use std::collections::{HashMap, VecDeque};

use parking_lot::Mutex;
use tokio::sync::mpsc;
use uuid::Uuid;

use taskboard_proto::codec::{decode_document, encode_change, encode_document};
use taskboard_proto::{Change, Collection, Entity};

use super::{ChangeFeed, Gateway, GatewayError, Upsert};

/// An open change feed. Frames committed while notifications are held wait
/// in `held` so that only feeds open at commit time ever receive them.
struct Feed {
    tx: mpsc::UnboundedSender<Vec<u8>>,
    held: VecDeque<Vec<u8>>,
}

impl Feed {
    /// Sends every held frame in commit order. Returns `false` once the
    /// receiver is gone.
    fn flush(&mut self) -> bool {
        while let Some(frame) = self.held.pop_front() {
            if self.tx.send(frame).is_err() {
                return false;
            }
        }
        true
    }
}

/// One collection: documents in store order plus its open feeds.
#[derive(Default)]
struct CollectionState {
    /// `(id, encoded document)` in insertion order.
    documents: Vec<(String, Vec<u8>)>,
    /// Every open feed. Closed feeds are pruned on publish and release.
    feeds: Vec<Feed>,
}

impl CollectionState {
    fn position(&self, id: &str) -> Option<usize> {
        self.documents.iter().position(|(doc_id, _)| doc_id == id)
    }

    fn publish(&mut self, frame: &[u8], hold: bool) {
        if hold {
            for feed in &mut self.feeds {
                feed.held.push_back(frame.to_vec());
            }
            return;
        }
        self.feeds.retain(|feed| feed.tx.send(frame.to_vec()).is_ok());
    }

    fn release(&mut self) {
        self.feeds.retain_mut(Feed::flush);
    }
}

#[derive(Default)]
struct StoreState {
    collections: HashMap<Collection, CollectionState>,
    /// Errors returned by the next writes, oldest first.
    failures: VecDeque<GatewayError>,
    hold: bool,
}

impl StoreState {
    fn collection(&mut self, collection: Collection) -> &mut CollectionState {
        self.collections.entry(collection).or_default()
    }

    fn take_failure(&mut self) -> Result<(), GatewayError> {
        self.failures.pop_front().map_or(Ok(()), Err)
    }
}

/// In-memory [`Gateway`] backed by a mutex-guarded map of collections.
///
/// Ids are minted as UUID v7 strings. Writes commit and publish under one
/// lock, so every feed sees changes in commit order.
#[derive(Default)]
pub struct MemoryGateway {
    state: Mutex<StoreState>,
}

impl MemoryGateway {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Writes entities with their existing ids, as if another client had
    /// created them. Known ids are overwritten in place.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::Codec`] if an entity cannot be encoded.
    pub fn seed<E: Entity>(&self, entities: impl IntoIterator<Item = E>) -> Result<(), GatewayError> {
        let mut state = self.state.lock();
        let hold = state.hold;
        let collection = state.collection(E::COLLECTION);
        for entity in entities {
            let id = entity.id().to_string();
            let document = encode_document(&entity)?;
            match collection.position(&id) {
                Some(pos) => collection.documents[pos].1 = document,
                None => collection.documents.push((id, document)),
            }
            collection.publish(&encode_change(&Change::Upsert(entity))?, hold);
        }
        Ok(())
    }

    /// Reads a document straight from the store, bypassing any mirror.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::Codec`] if the stored bytes do not decode.
    pub fn get<E: Entity>(&self, id: &E::Id) -> Result<Option<E>, GatewayError> {
        let mut state = self.state.lock();
        let collection = state.collection(E::COLLECTION);
        let Some(pos) = collection.position(&id.to_string()) else {
            return Ok(None);
        };
        Ok(Some(decode_document(&collection.documents[pos].1)?))
    }

    /// Number of documents stored in a collection.
    #[must_use]
    pub fn document_count(&self, collection: Collection) -> usize {
        self.state
            .lock()
            .collections
            .get(&collection)
            .map_or(0, |c| c.documents.len())
    }

    /// Makes the next write (upsert or delete) fail with `error`.
    ///
    /// Calls queue up: each failure is consumed by exactly one write.
    pub fn fail_next_write(&self, error: GatewayError) {
        self.state.lock().failures.push_back(error);
    }

    /// Stops delivering notifications. Writes still commit; their frames
    /// are queued for the feeds open at commit time until
    /// [`release_notifications`](Self::release_notifications). A feed opened
    /// during the hold starts from its `Replace` and gets none of them.
    pub fn hold_notifications(&self) {
        self.state.lock().hold = true;
    }

    /// Delivers every held frame in commit order and resumes live delivery.
    pub fn release_notifications(&self) {
        let mut state = self.state.lock();
        state.hold = false;
        for collection in state.collections.values_mut() {
            collection.release();
        }
    }

    fn open_feed<E: Entity>(&self) -> Result<ChangeFeed<E>, GatewayError> {
        let mut state = self.state.lock();
        let collection = state.collection(E::COLLECTION);
        let entities = collection
            .documents
            .iter()
            .map(|(_, bytes)| decode_document::<E>(bytes))
            .collect::<Result<Vec<_>, _>>()?;
        let initial = encode_change(&Change::Replace(entities))?;

        let (tx, rx) = mpsc::unbounded_channel();
        // The receiver is still in scope, so this send cannot fail.
        let _ = tx.send(initial);
        collection.feeds.push(Feed {
            tx,
            held: VecDeque::new(),
        });
        tracing::debug!(collection = %E::COLLECTION, feeds = collection.feeds.len(), "feed opened");
        Ok(ChangeFeed::new(rx))
    }

    fn write<E: Entity>(&self, write: Upsert<E>) -> Result<E::Id, GatewayError> {
        let mut state = self.state.lock();
        state.take_failure()?;
        let hold = state.hold;
        let collection = state.collection(E::COLLECTION);

        let entity = match write {
            Upsert::Insert(fields) => {
                let id = Uuid::now_v7().to_string();
                let entity = E::from_parts(E::Id::from(id.clone()), fields);
                collection.documents.push((id, encode_document(&entity)?));
                entity
            }
            Upsert::Merge(id, patch) => {
                let key = id.to_string();
                let pos = collection
                    .position(&key)
                    .ok_or_else(|| GatewayError::NotFound {
                        collection: E::COLLECTION,
                        id: key,
                    })?;
                let mut entity: E = decode_document(&collection.documents[pos].1)?;
                entity.apply_patch(&patch);
                collection.documents[pos].1 = encode_document(&entity)?;
                entity
            }
        };

        let id = entity.id().clone();
        collection.publish(&encode_change(&Change::Upsert(entity))?, hold);
        Ok(id)
    }

    fn remove<E: Entity>(&self, id: &E::Id) -> Result<(), GatewayError> {
        let mut state = self.state.lock();
        state.take_failure()?;
        let hold = state.hold;
        let collection = state.collection(E::COLLECTION);

        let Some(pos) = collection.position(&id.to_string()) else {
            return Ok(());
        };
        collection.documents.remove(pos);
        collection.publish(&encode_change::<E>(&Change::Delete(id.clone()))?, hold);
        Ok(())
    }
}

impl Gateway for MemoryGateway {
    async fn subscribe<E: Entity>(&self) -> Result<ChangeFeed<E>, GatewayError> {
        self.open_feed()
    }

    async fn upsert<E: Entity>(&self, write: Upsert<E>) -> Result<E::Id, GatewayError> {
        self.write(write)
    }

    async fn delete<E: Entity>(&self, id: &E::Id) -> Result<(), GatewayError> {
        self.remove::<E>(id)
    }
}
