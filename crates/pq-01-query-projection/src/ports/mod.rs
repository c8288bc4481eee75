//! Ports module for the query projection
//!
//! Defines inbound (API) and outbound (SPI) port traits.

pub mod inbound;
pub mod outbound;

pub use inbound::QueryEventApi;
pub use outbound::QueryEntityStore;
