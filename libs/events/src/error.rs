//! Error types for event validation and dispatch.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Error kind reported when an inbound value fails structural validation.
pub const SCHEMA_MISMATCH_ERROR: &str = "SchemaMismatchError";

/// Message reported alongside [`SCHEMA_MISMATCH_ERROR`].
pub const SCHEMA_MISMATCH_MESSAGE: &str = "Event does not match event schema";

/// The payload handed to an error callback.
///
/// Serializes as `{"error": "<kind>", "message": "<text>"}`. The dispatcher
/// only ever produces [`DispatchError::schema_mismatch`]; handlers may report
/// their own kinds through the same callback.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[error("{error}: {message}")]
pub struct DispatchError {
    /// Error kind, e.g. `SchemaMismatchError`.
    pub error: String,
    /// Human-readable description.
    pub message: String,
}

impl DispatchError {
    pub fn new(error: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            message: message.into(),
        }
    }

    /// The error reported for an event that failed validation.
    pub fn schema_mismatch() -> Self {
        Self::new(SCHEMA_MISMATCH_ERROR, SCHEMA_MISMATCH_MESSAGE)
    }

    /// Returns true if this is a schema mismatch report.
    pub fn is_schema_mismatch(&self) -> bool {
        self.error == SCHEMA_MISMATCH_ERROR
    }
}

/// The first structural rule an inbound value violated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Error)]
pub enum ValidationError {
    /// The value is not a JSON object.
    #[error("event is not an object")]
    NotAnObject,

    /// `id` is missing, not a string, or not a UUIDv4.
    #[error("id must be a UUIDv4 string")]
    InvalidId,

    /// `type` is missing or not a non-empty string.
    #[error("type must be a non-empty string")]
    InvalidType,

    /// `metadata` is missing or not an object.
    #[error("metadata must be an object")]
    InvalidMetadata,

    /// `metadata.cid` is missing or not a UUIDv4.
    #[error("metadata.cid must be a UUIDv4 string")]
    InvalidCorrelationId,

    /// `metadata.pid` is missing or not a UUIDv4.
    #[error("metadata.pid must be a UUIDv4 string")]
    InvalidProducerId,

    /// `metadata.tid` is present but not a UUIDv4.
    #[error("metadata.tid must be a UUIDv4 string when present")]
    InvalidTransactionId,

    /// `metadata.uid` is present but not a UUIDv4.
    #[error("metadata.uid must be a UUIDv4 string when present")]
    InvalidUserId,

    /// `metadata.token` is present but not a string.
    #[error("metadata.token must be a string when present")]
    InvalidToken,

    /// `data` is present but not an object.
    #[error("data must be an object when present")]
    InvalidData,
}

impl ValidationError {
    /// Dotted path of the offending field, or `None` for the top-level value.
    pub fn field(&self) -> Option<&'static str> {
        match self {
            ValidationError::NotAnObject => None,
            ValidationError::InvalidId => Some("id"),
            ValidationError::InvalidType => Some("type"),
            ValidationError::InvalidMetadata => Some("metadata"),
            ValidationError::InvalidCorrelationId => Some("metadata.cid"),
            ValidationError::InvalidProducerId => Some("metadata.pid"),
            ValidationError::InvalidTransactionId => Some("metadata.tid"),
            ValidationError::InvalidUserId => Some("metadata.uid"),
            ValidationError::InvalidToken => Some("metadata.token"),
            ValidationError::InvalidData => Some("data"),
        }
    }
}

/// Errors that can occur when building or converting events.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum EventError {
    /// A required field was not supplied to the builder.
    #[error("missing required field: {0}")]
    MissingField(&'static str),

    /// The event type is empty.
    #[error("event type cannot be empty")]
    EmptyEventType,

    /// The value does not have the envelope shape.
    #[error("invalid event: {0}")]
    InvalidEvent(#[from] ValidationError),

    /// Serialization error.
    #[error("serialization error: {0}")]
    Serialization(String),
}

impl From<serde_json::Error> for EventError {
    fn from(err: serde_json::Error) -> Self {
        EventError::Serialization(err.to_string())
    }
}
