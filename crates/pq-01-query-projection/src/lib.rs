//! # PQ-01: Query Projection Subsystem
//!
//! Projects batches of process engine runtime events into the query read
//! model. Batches arrive in broker order, which is not causal order: a
//! variable update may be delivered before the task that owns it. Every
//! batch is therefore reordered by a stable precedence sort before it is
//! applied.
//!
//! ## Architecture
//!
//! - **Domain**: Read-model entities, FetchPlan, BatchOutcome, errors
//! - **Algorithms**: Event batch optimizer, fetch plan builder
//! - **Ports**: Inbound (QueryEventApi) and Outbound (QueryEntityStore)
//! - **Adapters**: In-memory entity store
//! - **Application**: Per-family event handlers, dispatch context, service
//! - **IPC**: Consumer handler for broker messages

pub mod adapters;
pub mod algorithms;
pub mod application;
pub mod config;
pub mod domain;
pub mod ipc;
pub mod ports;

pub use adapters::InMemoryQueryStore;
pub use algorithms::{build_fetch_plan, is_mapped, optimize, precedence, EventBatchOptimizer};
pub use application::{
    default_handlers, QueryEventHandler, QueryEventHandlerContext, QueryProjectionService,
};
pub use config::ProjectionConfig;
pub use domain::entities::*;
pub use domain::errors::{QueryEventError, RegistryError, StoreError};
pub use domain::value_objects::*;
pub use ipc::{BatchResponse, QueryConsumerHandler};
pub use ports::inbound::QueryEventApi;
pub use ports::outbound::QueryEntityStore;
