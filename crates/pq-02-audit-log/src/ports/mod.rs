//! Ports module for the audit log
//!
//! Defines inbound (API) and outbound (SPI) port traits.

pub mod inbound;
pub mod outbound;

pub use inbound::AuditApi;
pub use outbound::AuditEventStore;
