//! # Adapters Layer (Hexagonal Architecture)
//!
//! Implements outbound port traits.

mod in_memory_store;

pub use in_memory_store::InMemoryAuditEventStore;
