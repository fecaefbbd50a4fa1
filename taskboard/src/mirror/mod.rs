//! Entity mirror: a live, ordered, versioned local copy of a remote collection.
//!
//! A [`Mirror`] publishes an `Arc<Snapshot>`. Applying a change builds a
//! new snapshot and swaps the pointer, so a reader holding a snapshot can
//! never observe a change half-applied. After each swap every subscriber
//! is called synchronously with the new snapshot.
//!
//! Conflict policy: last write wins. The mirror takes whatever state the
//! store notifies last; concurrent writes to the same task resolve at the
//! granularity they were issued in (a patch replaces whole fields), and
//! no field-level merge is attempted.
//!
//! Only the sync pump writes to a mirror (see [`crate::board`]); every
//! other component reads.

mod snapshot;

use std::fmt;
use std::pin::Pin;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Weak};
use std::task::{Context, Poll};

use futures_util::Stream;
use parking_lot::{Mutex, RwLock};
use tokio::sync::{mpsc, watch};

use taskboard_proto::{Change, Entity};

pub use snapshot::Snapshot;

type Callback<E> = Box<dyn Fn(&Arc<Snapshot<E>>) + Send + Sync>;

/// A registered callback and its delivery state.
struct Subscriber<E: Entity> {
    id: u64,
    callback: Callback<E>,
    active: AtomicBool,
    /// Version of the last snapshot handed to `callback`.
    delivered: Mutex<Option<u64>>,
}

impl<E: Entity> Subscriber<E> {
    /// Calls the callback unless the subscriber was cancelled or has already
    /// seen this version or a newer one.
    ///
    /// The `delivered` lock serializes deliveries to one subscriber, so
    /// versions reach it strictly increasing. No mirror-wide lock is held.
    fn deliver(&self, snapshot: &Arc<Snapshot<E>>) {
        let mut delivered = self.delivered.lock();
        if !self.active.load(Ordering::Acquire) {
            return;
        }
        if delivered.is_some_and(|seen| seen >= snapshot.version()) {
            return;
        }
        *delivered = Some(snapshot.version());
        (self.callback)(snapshot);
    }
}

struct Shared<E: Entity> {
    current: RwLock<Arc<Snapshot<E>>>,
    subscribers: Mutex<Vec<Arc<Subscriber<E>>>>,
    next_subscriber: AtomicU64,
    version: watch::Sender<u64>,
}

/// Handle to a mirrored collection. Cloning shares the same mirror.
pub struct Mirror<E: Entity> {
    shared: Arc<Shared<E>>,
}

impl<E: Entity> Clone for Mirror<E> {
    fn clone(&self) -> Self {
        Self {
            shared: Arc::clone(&self.shared),
        }
    }
}

impl<E: Entity> Default for Mirror<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E: Entity> fmt::Debug for Mirror<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Mirror")
            .field("collection", &E::COLLECTION)
            .field("version", &self.version())
            .finish_non_exhaustive()
    }
}

impl<E: Entity> Mirror<E> {
    /// Creates an empty mirror at version 0.
    #[must_use]
    pub fn new() -> Self {
        let (version, _) = watch::channel(0);
        Self {
            shared: Arc::new(Shared {
                current: RwLock::new(Arc::new(Snapshot::empty())),
                subscribers: Mutex::new(Vec::new()),
                next_subscriber: AtomicU64::new(0),
                version,
            }),
        }
    }

    /// The latest applied snapshot. Empty before the first notification.
    #[must_use]
    pub fn current_snapshot(&self) -> Arc<Snapshot<E>> {
        Arc::clone(&self.shared.current.read())
    }

    /// Version of the latest applied snapshot.
    #[must_use]
    pub fn version(&self) -> u64 {
        self.shared.current.read().version()
    }

    /// Registers `callback` for snapshot delivery.
    ///
    /// The callback is called once right away with the current snapshot and
    /// then after every applied change, in apply order, until the returned
    /// [`Subscription`] is dropped. Versions only ever increase: if a change
    /// lands before the initial call runs, the callback gets the newer
    /// snapshot instead.
    ///
    /// Callbacks run on the applying task without any mirror lock held, so
    /// they may read the mirror, subscribe, or drop subscriptions. Once a
    /// subscription is cancelled no new delivery starts; a call already
    /// running on another thread finishes.
    pub fn subscribe<F>(&self, callback: F) -> Subscription
    where
        F: Fn(&Arc<Snapshot<E>>) + Send + Sync + 'static,
    {
        let subscriber = Arc::new(Subscriber {
            id: self.shared.next_subscriber.fetch_add(1, Ordering::Relaxed),
            callback: Box::new(callback),
            active: AtomicBool::new(true),
            delivered: Mutex::new(None),
        });

        // Lock order matches `apply`: subscriber list, then snapshot. Every
        // apply after this block sees the new subscriber.
        let initial = {
            let mut subscribers = self.shared.subscribers.lock();
            subscribers.push(Arc::clone(&subscriber));
            self.current_snapshot()
        };
        subscriber.deliver(&initial);

        let id = subscriber.id;
        tracing::trace!(collection = %E::COLLECTION, subscriber = id, "subscribed");
        let shared: Weak<Shared<E>> = Arc::downgrade(&self.shared);
        Subscription {
            cancel: Some(Box::new(move || {
                subscriber.active.store(false, Ordering::Release);
                if let Some(shared) = shared.upgrade() {
                    shared.subscribers.lock().retain(|sub| sub.id != id);
                    tracing::trace!(collection = %E::COLLECTION, subscriber = id, "unsubscribed");
                }
            })),
        }
    }

    /// Subscribes and returns the snapshots as a [`Stream`].
    ///
    /// The stream yields the current snapshot first. Dropping it
    /// unsubscribes.
    #[must_use]
    pub fn stream(&self) -> SnapshotStream<E> {
        let (tx, rx) = mpsc::unbounded_channel();
        let subscription = self.subscribe(move |snapshot| {
            let _ = tx.send(Arc::clone(snapshot));
        });
        SnapshotStream {
            snapshots: rx,
            _subscription: subscription,
        }
    }

    /// Waits until the mirror has applied at least `version`, then returns
    /// the current snapshot.
    pub async fn wait_for_version(&self, version: u64) -> Arc<Snapshot<E>> {
        let mut rx = self.shared.version.subscribe();
        // The sender lives in `shared`, which `self` keeps alive.
        let _ = rx.wait_for(|applied| *applied >= version).await;
        self.current_snapshot()
    }

    /// Applies one change notification and notifies subscribers.
    ///
    /// Returns `false` if the change had no effect.
    pub(crate) fn apply(&self, change: Change<E>) -> bool {
        let kind = change.kind();
        // Lock order matches `subscribe`: subscriber list, then snapshot.
        let (next, subscribers) = {
            let subscribers = self.shared.subscribers.lock();
            let mut current = self.shared.current.write();
            let Some(next) = current.applied(change) else {
                tracing::debug!(collection = %E::COLLECTION, kind, "change had no effect");
                return false;
            };
            let next = Arc::new(next);
            *current = Arc::clone(&next);
            (next, subscribers.to_vec())
        };

        tracing::debug!(
            collection = %E::COLLECTION,
            kind,
            version = next.version(),
            len = next.len(),
            "applied change"
        );
        self.shared.version.send_replace(next.version());

        for subscriber in subscribers {
            subscriber.deliver(&next);
        }
        true
    }

    /// Number of registered subscribers.
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.shared.subscribers.lock().len()
    }
}

/// Keeps a mirror callback registered. Dropping it unsubscribes.
#[must_use = "dropping a Subscription unsubscribes immediately"]
pub struct Subscription {
    cancel: Option<Box<dyn FnOnce() + Send + Sync>>,
}

impl Subscription {
    /// Stops delivery. Same as dropping the subscription.
    pub fn unsubscribe(mut self) {
        self.cancel_now();
    }

    fn cancel_now(&mut self) {
        if let Some(cancel) = self.cancel.take() {
            cancel();
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.cancel_now();
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("active", &self.cancel.is_some())
            .finish()
    }
}

/// [`Stream`] of snapshots returned by [`Mirror::stream`].
pub struct SnapshotStream<E: Entity> {
    snapshots: mpsc::UnboundedReceiver<Arc<Snapshot<E>>>,
    _subscription: Subscription,
}

impl<E: Entity> Stream for SnapshotStream<E> {
    type Item = Arc<Snapshot<E>>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.snapshots.poll_recv(cx)
    }
}
