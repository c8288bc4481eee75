//! # Batch Publisher
//!
//! The engine-facing half of the bus. Each published batch is fanned out to
//! every live subscription.

use crate::events::EventFilter;
use crate::subscriber::{EventStream, EventSubscriber, Subscription};
use crate::{DEFAULT_CHANNEL_CAPACITY, ENGINE_EVENTS_DESTINATION};
use async_trait::async_trait;
use shared_types::EventBatch;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::broadcast;
use tracing::{debug, warn};

/// Trait for publishing event batches to the bus.
#[async_trait]
pub trait EventPublisher: Send + Sync {
    /// Publish a batch to the bus.
    ///
    /// # Returns
    ///
    /// The number of active subscribers that received the batch.
    async fn publish(&self, batch: EventBatch) -> usize;

    /// Get the total number of batches published.
    fn batches_published(&self) -> u64;
}

/// Broadcast-channel bus shared by the engine and all query consumers.
///
/// A subscriber that falls more than `capacity` batches behind loses the
/// oldest ones.
pub struct InMemoryEventBus {
    sender: broadcast::Sender<EventBatch>,
    batches_published: AtomicU64,
    capacity: usize,
}

impl InMemoryEventBus {
    /// Bus buffering [`DEFAULT_CHANNEL_CAPACITY`] batches per subscriber.
    #[must_use]
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CHANNEL_CAPACITY)
    }

    /// Bus buffering `capacity` batches per subscriber (at least one).
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self {
            sender,
            batches_published: AtomicU64::new(0),
            capacity,
        }
    }

    /// Subscribe to batches matching a filter.
    #[must_use]
    pub fn subscribe(&self, filter: EventFilter) -> Subscription {
        debug!(
            apps = ?filter.app_names,
            kinds = ?filter.kinds,
            "New subscription created"
        );
        Subscription::new(self.sender.subscribe(), filter)
    }

    /// Get a stream of batches matching a filter.
    #[must_use]
    pub fn event_stream(&self, filter: EventFilter) -> EventStream {
        EventStream::new(self.sender.subscribe(), filter)
    }

    /// Live subscriptions and streams.
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }

    #[must_use]
    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

impl Default for InMemoryEventBus {
    fn default() -> Self {
        Self::new()
    }
}

impl EventSubscriber for InMemoryEventBus {
    fn subscribe(&self, filter: EventFilter) -> Subscription {
        InMemoryEventBus::subscribe(self, filter)
    }
}

#[async_trait]
impl EventPublisher for InMemoryEventBus {
    async fn publish(&self, batch: EventBatch) -> usize {
        let app_name = batch.app_name.clone();
        let size = batch.len();

        // Counted even when nobody is listening
        self.batches_published.fetch_add(1, Ordering::Relaxed);

        match self.sender.send(batch) {
            Ok(receiver_count) => {
                debug!(
                    destination = ENGINE_EVENTS_DESTINATION,
                    app = %app_name,
                    events = size,
                    receivers = receiver_count,
                    "Batch published"
                );
                receiver_count
            }
            Err(e) => {
                warn!(
                    destination = ENGINE_EVENTS_DESTINATION,
                    app = %app_name,
                    events = size,
                    error = %e,
                    "Batch dropped (no receivers)"
                );
                0
            }
        }
    }

    fn batches_published(&self) -> u64 {
        self.batches_published.load(Ordering::Relaxed)
    }
}
