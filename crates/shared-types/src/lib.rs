//! # Shared Types Crate
//!
//! This crate contains the runtime event model emitted by the process engine
//! and the entity snapshots carried inside each event.
//!
//! ## Design Principles
//!
//! - **Single Source of Truth**: every consumer decodes the same `RuntimeEvent`.
//! - **Closed Event Set**: `EventPayload` is a tagged union; `EventKind` mirrors
//!   it one-to-one so kind checks never need the payload.
//! - **Batch Delivery**: the broker delivers `EventBatch` values, never single
//!   events.

pub mod entities;
pub mod errors;
pub mod events;

pub use entities::*;
pub use errors::*;
pub use events::*;
