//! # Shared Bus - Runtime Event Delivery
//!
//! Stands in for the message broker between the process engine and the
//! query-side consumers. One published message is one [`EventBatch`].
//!
//! ```text
//! ┌──────────────┐                    ┌──────────────────┐
//! │    Engine    │                    │ Query projection │
//! │              │    publish()       ├──────────────────┤
//! │              │ ──────┐            │    Audit log     │
//! └──────────────┘       │            └──────────────────┘
//!                        ▼                    ↑
//!                  ┌──────────────┐          │
//!                  │  Event Bus   │ ─────────┘
//!                  └──────────────┘  subscribe()
//! ```
//!
//! Every subscriber sees every batch in publish order; filters only decide
//! which of them are handed out.
//!
//! [`EventBatch`]: shared_types::EventBatch

#![allow(clippy::missing_const_for_fn)]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]
#![cfg_attr(test, allow(clippy::panic))]

pub mod events;
pub mod publisher;
pub mod subscriber;

pub use events::EventFilter;
pub use publisher::{EventPublisher, InMemoryEventBus};
pub use subscriber::{EventStream, EventSubscriber, Subscription, SubscriptionError};

/// Maximum batches to buffer per subscriber before the slowest one lags.
pub const DEFAULT_CHANNEL_CAPACITY: usize = 1000;

/// Destination name engine events are published under.
pub const ENGINE_EVENTS_DESTINATION: &str = "engineEvents";
