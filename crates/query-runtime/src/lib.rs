//! # Query Runtime Library
//!
//! Exposes the runtime's modules for testing. The main entry point is the
//! `main.rs` binary.
//!
//! - `config` - `RuntimeConfig` and its `PQ_*` environment overrides
//! - `consumers` - bus consumers feeding each subsystem
//! - `runtime` - `QueryRuntime` lifecycle (new, start, shutdown)

pub mod config;
pub mod consumers;
pub mod runtime;

pub use config::{ConfigError, RuntimeConfig};
pub use consumers::{AuditConsumer, ProjectionConsumer};
pub use runtime::{QueryRuntime, RuntimeError};
