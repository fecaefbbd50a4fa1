//! Taskboard: a live local mirror of a collaborative task board.
//!
//! The crate keeps ordered, versioned copies of the remote task and contact
//! collections ([`mirror`]), turns user intents into remote writes
//! ([`board::Coordinator`]) and computes the board's derived views
//! ([`views`], [`assignees`]) from the current snapshots.

pub mod assignees;
pub mod board;
pub mod config;
pub mod gateway;
pub mod mirror;
pub mod report;
pub mod seed;
pub mod views;

pub use board::{Board, BoardError, BoardSettings, Coordinator};
pub use gateway::{ChangeFeed, Gateway, GatewayError, Upsert};
pub use mirror::{Mirror, Snapshot, SnapshotStream, Subscription};
