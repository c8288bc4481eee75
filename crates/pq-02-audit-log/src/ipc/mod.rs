//! IPC Module for the audit log
//!
//! ## Boundaries
//!
//! - Accept: `EventBatch` messages from the engine events destination
//! - Reject: undecodable messages and oversized batches

pub mod handler;
pub mod payloads;

pub use handler::AuditConsumerHandler;
pub use payloads::*;
