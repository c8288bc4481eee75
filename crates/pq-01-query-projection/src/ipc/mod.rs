//! IPC Module for the query projection
//!
//! ## Boundaries
//!
//! - Accept: `EventBatch` messages from the engine events destination
//! - Reject: undecodable messages and oversized batches before they reach
//!   the service

pub mod handler;
pub mod payloads;

pub use handler::QueryConsumerHandler;
pub use payloads::*;
