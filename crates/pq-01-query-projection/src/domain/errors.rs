//! Error types for the query projection

use shared_types::EventKind;
use thiserror::Error;

/// All errors that can occur while projecting events
#[derive(Debug, Error)]
pub enum QueryEventError {
    /// An event referenced a read-model entity that does not exist
    #[error("{entity} not found: {id}")]
    EntityNotFound { entity: &'static str, id: String },

    /// The event is not valid for the entity's current state
    #[error("Illegal state: {0}")]
    IllegalState(String),

    /// A handler was given an event kind it does not handle
    #[error("Handler {handler} cannot handle {kind}")]
    UnexpectedPayload {
        handler: &'static str,
        kind: EventKind,
    },

    /// Entity store failure
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    /// A handler failed while applying a batch
    #[error("Handler failed on event {event_id} ({kind}): {source}")]
    HandlerFailed {
        event_id: String,
        kind: EventKind,
        source: Box<QueryEventError>,
    },

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

impl QueryEventError {
    pub(crate) fn not_found(entity: &'static str, id: impl Into<String>) -> Self {
        Self::EntityNotFound {
            entity,
            id: id.into(),
        }
    }

    /// The innermost error, unwrapping `HandlerFailed` annotations.
    #[must_use]
    pub fn root_cause(&self) -> &QueryEventError {
        match self {
            Self::HandlerFailed { source, .. } => source.root_cause(),
            other => other,
        }
    }
}

/// Entity store error
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("No active batch")]
    NoActiveBatch,

    #[error("A batch is already active")]
    BatchAlreadyActive,

    #[error("Store backend failure: {0}")]
    Backend(String),
}

/// Handler registration error
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RegistryError {
    #[error("A handler is already registered for {0}")]
    DuplicateHandler(EventKind),
}
