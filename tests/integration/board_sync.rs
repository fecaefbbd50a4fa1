//! Integration tests for board synchronization.
//!
//! Two boards share one in-memory store to stand in for two browser
//! sessions. Tests cover initial sync, mirror ordering, subscriber and
//! stream delivery, and the rule that the mirror only changes when the
//! store's notification arrives.

#![allow(clippy::expect_used, clippy::unwrap_used, clippy::similar_names)]

use std::sync::Arc;
use std::time::Duration;

use futures_util::StreamExt;
use parking_lot::Mutex;

use taskboard::board::{Board, BoardError, BoardSettings};
use taskboard::gateway::GatewayError;
use taskboard::gateway::memory::MemoryGateway;
use taskboard::mirror::{Mirror, Snapshot};
use taskboard_proto::{
    Collection, Contact, ContactDraft, ContactFields, ContactId, Entity, Priority, Task,
    TaskDraft, TaskId, TaskRules, TaskStatus, TaskStatusPatch,
};

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

const WAIT: Duration = Duration::from_secs(2);

async fn connect(gateway: &Arc<MemoryGateway>) -> Board<MemoryGateway> {
    let board = Board::connect(Arc::clone(gateway), BoardSettings::default())
        .await
        .expect("connect");
    tokio::time::timeout(WAIT, board.ready())
        .await
        .expect("initial sync");
    board
}

async fn settle<E: Entity>(mirror: &Mirror<E>, version: u64) -> Arc<Snapshot<E>> {
    tokio::time::timeout(WAIT, mirror.wait_for_version(version))
        .await
        .expect("mirror did not reach version")
}

fn draft(title: &str) -> TaskDraft {
    TaskDraft::new(title)
        .with_category("User Story")
        .with_priority(Priority::Medium)
}

fn contact(id: &str, first: &str, last: &str) -> Contact {
    Contact::new(
        ContactId::new(id),
        ContactFields {
            firstname: first.to_string(),
            lastname: last.to_string(),
            color: "#ff7a00".to_string(),
            email: String::new(),
            phone: None,
        },
    )
}

fn titles(snapshot: &Snapshot<Task>) -> Vec<&str> {
    snapshot.iter().map(|t| t.fields.title.as_str()).collect()
}

// ---------------------------------------------------------------------------
// Initial sync
// ---------------------------------------------------------------------------

#[tokio::test]
async fn initial_sync_preserves_store_order() {
    let gateway = Arc::new(MemoryGateway::new());
    gateway
        .seed([
            contact("c3", "Zoe", "Kraft"),
            contact("c1", "Anja", "Schulz"),
            contact("c2", "Ben", "Weber"),
        ])
        .unwrap();

    let board = connect(&gateway).await;
    let snapshot = board.contacts().current_snapshot();
    let ids: Vec<_> = snapshot.iter().map(|c| c.id.as_str()).collect();
    assert_eq!(ids, vec!["c3", "c1", "c2"]);
    assert_eq!(snapshot.version(), 1);
}

// ---------------------------------------------------------------------------
// Change propagation
// ---------------------------------------------------------------------------

#[tokio::test]
async fn write_from_one_board_reaches_the_other() {
    let gateway = Arc::new(MemoryGateway::new());
    let alice = connect(&gateway).await;
    let bob = connect(&gateway).await;

    let id = alice.coordinator().create_task(draft("Kickoff")).await.unwrap();

    let seen = settle(bob.tasks(), 2).await;
    assert_eq!(seen.get(&id).unwrap().fields.title, "Kickoff");
    let own = settle(alice.tasks(), 2).await;
    assert!(own.contains(&id));
}

#[tokio::test]
async fn upsert_keeps_position_and_new_tasks_append() {
    let gateway = Arc::new(MemoryGateway::new());
    let board = connect(&gateway).await;
    let c = board.coordinator();

    let first = c.create_task(draft("First")).await.unwrap();
    c.create_task(draft("Second")).await.unwrap();
    settle(board.tasks(), 3).await;

    c.update_task_status(&first, TaskStatusPatch::status(TaskStatus::Done))
        .await
        .unwrap();
    c.create_task(draft("Third")).await.unwrap();

    let snapshot = settle(board.tasks(), 5).await;
    assert_eq!(titles(&snapshot), vec!["First", "Second", "Third"]);
    assert_eq!(snapshot.get(&first).unwrap().fields.status, TaskStatus::Done);
}

#[tokio::test]
async fn delete_keeps_relative_order() {
    let gateway = Arc::new(MemoryGateway::new());
    let board = connect(&gateway).await;
    let c = board.coordinator();

    c.create_task(draft("A")).await.unwrap();
    let b = c.create_task(draft("B")).await.unwrap();
    c.create_task(draft("C")).await.unwrap();
    settle(board.tasks(), 4).await;

    c.delete_task(&b).await.unwrap();
    let snapshot = settle(board.tasks(), 5).await;
    assert_eq!(titles(&snapshot), vec!["A", "C"]);
}

#[tokio::test]
async fn no_optimistic_insert_before_notification() {
    let gateway = Arc::new(MemoryGateway::new());
    let board = connect(&gateway).await;

    gateway.hold_notifications();
    let id = board
        .coordinator()
        .create_task(draft("Pending"))
        .await
        .unwrap();

    // The write committed, the notification has not been delivered.
    assert_eq!(gateway.document_count(Collection::Tasks), 1);
    tokio::task::yield_now().await;
    assert!(!board.tasks().current_snapshot().contains(&id));
    assert_eq!(board.tasks().version(), 1);

    gateway.release_notifications();
    let snapshot = settle(board.tasks(), 2).await;
    assert!(snapshot.contains(&id));
}

#[tokio::test]
async fn board_connected_during_hold_starts_from_current_state() {
    let gateway = Arc::new(MemoryGateway::new());
    let writer = connect(&gateway).await;
    let id = TaskId::new("t1");
    let task = |title: &str| {
        Task::new(
            id.clone(),
            draft(title).validate(&TaskRules::default()).unwrap(),
        )
    };

    gateway.hold_notifications();
    gateway.seed([task("v1")]).unwrap();
    gateway.seed([task("v2")]).unwrap();

    let late = connect(&gateway).await;
    assert_eq!(late.tasks().current_snapshot().get(&id).unwrap().fields.title, "v2");
    gateway.release_notifications();

    let marker = writer.coordinator().create_task(draft("marker")).await.unwrap();
    let seen = settle(late.tasks(), 2).await;
    assert_eq!(seen.version(), 2);
    assert!(seen.contains(&marker));
    assert_eq!(seen.get(&id).unwrap().fields.title, "v2");

    // The writer was open at commit time and sees both held changes.
    let own = settle(writer.tasks(), 4).await;
    assert_eq!(titles(&own), vec!["v2", "marker"]);
}

#[tokio::test]
async fn failed_write_leaves_mirror_unchanged() {
    let gateway = Arc::new(MemoryGateway::new());
    let board = connect(&gateway).await;
    let before = board.tasks().current_snapshot();

    gateway.fail_next_write(GatewayError::PermissionDenied(Collection::Tasks));
    let err = board
        .coordinator()
        .create_task(draft("Rejected"))
        .await
        .unwrap_err();

    assert_eq!(
        err,
        BoardError::Remote(GatewayError::PermissionDenied(Collection::Tasks))
    );
    let after = board.tasks().current_snapshot();
    assert_eq!(after.version(), before.version());
    assert!(after.is_empty());
    assert_eq!(gateway.document_count(Collection::Tasks), 0);
}

#[tokio::test]
async fn failed_delete_is_remote_error() {
    let gateway = Arc::new(MemoryGateway::new());
    let board = connect(&gateway).await;
    let id = board.coordinator().create_task(draft("Keep")).await.unwrap();
    settle(board.tasks(), 2).await;

    gateway.fail_next_write(GatewayError::Unavailable("offline".to_string()));
    let err = board.coordinator().delete_task(&id).await.unwrap_err();
    assert!(matches!(err, BoardError::Remote(GatewayError::Unavailable(_))));
    assert!(board.tasks().current_snapshot().contains(&id));
}

// ---------------------------------------------------------------------------
// Subscribers
// ---------------------------------------------------------------------------

#[tokio::test]
async fn subscriber_sees_every_version_in_order() {
    let gateway = Arc::new(MemoryGateway::new());
    let board = connect(&gateway).await;

    let versions = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&versions);
    let _sub = board
        .tasks()
        .subscribe(move |snapshot| sink.lock().push(snapshot.version()));

    for title in ["one", "two", "three"] {
        board.coordinator().create_task(draft(title)).await.unwrap();
    }
    settle(board.tasks(), 4).await;

    assert_eq!(*versions.lock(), vec![1, 2, 3, 4]);
}

#[tokio::test]
async fn stream_delivers_snapshots_from_remote_writes() {
    let gateway = Arc::new(MemoryGateway::new());
    let board = connect(&gateway).await;
    let other = connect(&gateway).await;

    let mut stream = board.contacts().stream();
    let initial = stream.next().await.unwrap();
    assert!(initial.is_empty());

    let id = other
        .coordinator()
        .create_contact(ContactDraft::new("Eva", "Fischer"))
        .await
        .unwrap();

    let next = tokio::time::timeout(WAIT, stream.next())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(next.get(&id).unwrap().full_name(), "Eva Fischer");
}

#[tokio::test]
async fn unsubscribe_does_not_cancel_in_flight_write() {
    let gateway = Arc::new(MemoryGateway::new());
    let board = connect(&gateway).await;

    let calls = Arc::new(Mutex::new(0_usize));
    let counter = Arc::clone(&calls);
    let sub = board.tasks().subscribe(move |_| *counter.lock() += 1);

    gateway.hold_notifications();
    let id = board.coordinator().create_task(draft("Late")).await.unwrap();
    sub.unsubscribe();
    gateway.release_notifications();

    let snapshot = settle(board.tasks(), 2).await;
    assert!(snapshot.contains(&id));
    assert_eq!(*calls.lock(), 1);
}

#[tokio::test]
async fn dropping_board_stops_sync() {
    let gateway = Arc::new(MemoryGateway::new());
    let board = connect(&gateway).await;
    let mirror = board.tasks().clone();
    drop(board);
    tokio::task::yield_now().await;

    let writer = connect(&gateway).await;
    writer.coordinator().create_task(draft("Unseen")).await.unwrap();
    settle(writer.tasks(), 2).await;

    assert_eq!(mirror.version(), 1);
}
