//! Binary encoding for stored documents and change notification frames.
//!
//! Both use postcard. Documents are what the in-memory store keeps;
//! frames are what travels on a change feed.

use crate::change::Change;
use crate::entity::Entity;

/// Error type for codec encode/decode operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CodecError {
    /// Serialization or deserialization failed.
    #[error("serialization error: {0}")]
    Serialization(String),
}

/// Encodes a single document.
///
/// # Errors
///
/// Returns `CodecError::Serialization` if the entity cannot be serialized.
pub fn encode_document<E: Entity>(entity: &E) -> Result<Vec<u8>, CodecError> {
    postcard::to_allocvec(entity).map_err(|e| CodecError::Serialization(e.to_string()))
}

/// Decodes a single document.
///
/// # Errors
///
/// Returns `CodecError::Serialization` if the bytes are not a valid `E`.
pub fn decode_document<E: Entity>(bytes: &[u8]) -> Result<E, CodecError> {
    postcard::from_bytes(bytes).map_err(|e| CodecError::Serialization(e.to_string()))
}

/// Encodes a change notification frame.
///
/// # Errors
///
/// Returns `CodecError::Serialization` if the change cannot be serialized.
pub fn encode_change<E: Entity>(change: &Change<E>) -> Result<Vec<u8>, CodecError> {
    postcard::to_allocvec(change).map_err(|e| CodecError::Serialization(e.to_string()))
}

/// Decodes a change notification frame.
///
/// # Errors
///
/// Returns `CodecError::Serialization` if the bytes are not a valid frame.
pub fn decode_change<E: Entity>(bytes: &[u8]) -> Result<Change<E>, CodecError> {
    postcard::from_bytes(bytes).map_err(|e| CodecError::Serialization(e.to_string()))
}
