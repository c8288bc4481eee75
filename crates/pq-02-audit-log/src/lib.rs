//! # PQ-02: Audit Log Subsystem
//!
//! Keeps an append-only record of every runtime event the engine emits.
//! Unlike the query projection, events are stored as delivered: no
//! reordering, no entity state, one record per event id.
//!
//! ## Architecture
//!
//! - **Domain**: AuditEventEntity, event converter, errors
//! - **Ports**: Inbound (AuditApi) and Outbound (AuditEventStore)
//! - **Adapters**: In-memory audit store
//! - **Application**: Service orchestration
//! - **IPC**: Consumer handler for broker messages

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ipc;
pub mod ports;

pub use adapters::InMemoryAuditEventStore;
pub use application::AuditService;
pub use config::AuditConfig;
pub use domain::converter::EventToEntityConverter;
pub use domain::entities::*;
pub use domain::errors::{AuditError, AuditStoreError, ConversionError};
pub use ipc::{AuditConsumerHandler, AuditResponse};
pub use ports::inbound::AuditApi;
pub use ports::outbound::AuditEventStore;
