//! # Event Model Errors

use thiserror::Error;

/// Errors raised while decoding or inspecting runtime events.
#[derive(Debug, Error)]
pub enum EventModelError {
    /// The `eventType` tag does not name a known event kind.
    #[error("Unknown event type: {0}")]
    UnknownEventType(String),

    /// The wire payload could not be decoded.
    #[error("Malformed event payload: {0}")]
    Malformed(#[from] serde_json::Error),
}
