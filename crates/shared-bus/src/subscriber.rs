//! # Batch Subscriptions
//!
//! Consumer-facing half of the bus: a pull-style [`Subscription`] for
//! consumer loops and an [`EventStream`] for stream combinators.

use crate::events::EventFilter;
use shared_types::EventBatch;
use std::pin::Pin;
use std::task::{Context, Poll};
use thiserror::Error;
use tokio::sync::broadcast;
use tokio_stream::wrappers::errors::BroadcastStreamRecvError;
use tokio_stream::wrappers::BroadcastStream;
use tokio_stream::Stream;
use tracing::{debug, warn};

/// Errors from `try_recv`.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SubscriptionError {
    #[error("Event bus closed")]
    Closed,
}

/// Trait for subscribing to batches from the bus.
pub trait EventSubscriber: Send + Sync {
    fn subscribe(&self, filter: EventFilter) -> Subscription;
}

/// A subscription handle for receiving batches.
pub struct Subscription {
    receiver: broadcast::Receiver<EventBatch>,
    filter: EventFilter,
}

impl Subscription {
    pub(crate) fn new(receiver: broadcast::Receiver<EventBatch>, filter: EventFilter) -> Self {
        Self { receiver, filter }
    }

    /// Receive the next batch that matches the filter.
    ///
    /// # Returns
    ///
    /// - `Some(batch)` - The next matching batch
    /// - `None` - The bus was dropped
    pub async fn recv(&mut self) -> Option<EventBatch> {
        loop {
            let batch = match self.receiver.recv().await {
                Ok(b) => b,
                Err(broadcast::error::RecvError::Closed) => return None,
                Err(broadcast::error::RecvError::Lagged(count)) => {
                    warn!(lagged = count, "Subscriber lagged, batches dropped");
                    continue;
                }
            };

            if self.filter.matches(&batch) {
                return Some(batch);
            }
        }
    }

    /// Try to receive the next batch without blocking.
    ///
    /// # Returns
    ///
    /// - `Ok(Some(batch))` - A batch was available and matched
    /// - `Ok(None)` - No batch available (would block)
    /// - `Err(SubscriptionError::Closed)` - The bus was dropped
    pub fn try_recv(&mut self) -> Result<Option<EventBatch>, SubscriptionError> {
        loop {
            let batch = match self.receiver.try_recv() {
                Ok(b) => b,
                Err(broadcast::error::TryRecvError::Empty) => return Ok(None),
                Err(broadcast::error::TryRecvError::Closed) => {
                    return Err(SubscriptionError::Closed)
                }
                Err(broadcast::error::TryRecvError::Lagged(count)) => {
                    warn!(lagged = count, "Subscriber lagged, batches dropped");
                    continue;
                }
            };

            if self.filter.matches(&batch) {
                return Ok(Some(batch));
            }
        }
    }

    #[must_use]
    pub fn filter(&self) -> &EventFilter {
        &self.filter
    }
}

/// A stream of matching batches.
///
/// Lagged batches are skipped with a `debug` log.
pub struct EventStream {
    inner: BroadcastStream<EventBatch>,
    filter: EventFilter,
}

impl EventStream {
    #[must_use]
    pub fn new(receiver: broadcast::Receiver<EventBatch>, filter: EventFilter) -> Self {
        Self {
            inner: BroadcastStream::new(receiver),
            filter,
        }
    }

    #[must_use]
    pub fn filter(&self) -> &EventFilter {
        &self.filter
    }
}

impl Stream for EventStream {
    type Item = EventBatch;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let this = self.get_mut();
        loop {
            match Pin::new(&mut this.inner).poll_next(cx) {
                Poll::Ready(Some(Ok(batch))) => {
                    if this.filter.matches(&batch) {
                        return Poll::Ready(Some(batch));
                    }
                }
                Poll::Ready(Some(Err(BroadcastStreamRecvError::Lagged(count)))) => {
                    debug!(lagged = count, "Stream lagged, batches dropped");
                }
                Poll::Ready(None) => return Poll::Ready(None),
                Poll::Pending => return Poll::Pending,
            }
        }
    }
}
