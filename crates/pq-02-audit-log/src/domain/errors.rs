//! Error types for the audit log

use thiserror::Error;

/// Conversion between runtime events and audit entities
#[derive(Debug, Error)]
pub enum ConversionError {
    /// Stored `event_type` is not a known event kind
    #[error("Unknown event type: {0}")]
    UnknownEventType(String),

    /// Stored entity JSON does not match the event type
    #[error("Malformed {event_type} entity: {source}")]
    MalformedEntity {
        event_type: String,
        source: serde_json::Error,
    },

    /// Event entity could not be encoded
    #[error("Failed to encode event {event_id}: {source}")]
    Encode {
        event_id: String,
        source: serde_json::Error,
    },
}

/// Audit store error
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AuditStoreError {
    #[error("Audit store backend failure: {0}")]
    Backend(String),
}

/// All errors that can occur while recording or reading the audit log
#[derive(Debug, Error)]
pub enum AuditError {
    #[error("Conversion error: {0}")]
    Conversion(#[from] ConversionError),

    #[error("Store error: {0}")]
    Store(#[from] AuditStoreError),

    /// Empty event batch
    #[error("Empty event batch")]
    EmptyBatch,

    /// Batch size exceeded limits
    #[error("Batch size exceeded: {size} > {max}")]
    BatchTooLarge { size: usize, max: usize },

    /// Broker message could not be decoded
    #[error("Failed to decode event batch: {0}")]
    Decode(String),
}
