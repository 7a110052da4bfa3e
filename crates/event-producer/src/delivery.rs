//! Delivery reports for published messages.

use crate::error::Result;
use crate::transport::{Delivery, DeliveryFuture};
use std::sync::atomic::{AtomicU32, AtomicU64, Ordering};
use std::sync::Arc;

/// Delivery outcome counters for one producer.
#[derive(Debug, Default)]
pub struct DeliveryTracker {
    delivered: AtomicU64,
    failed: AtomicU64,
    consecutive_failures: AtomicU32,
}

impl DeliveryTracker {
    pub fn record_success(&self) {
        self.delivered.fetch_add(1, Ordering::Relaxed);
        self.consecutive_failures.store(0, Ordering::Relaxed);
    }

    pub fn record_failure(&self) {
        self.failed.fetch_add(1, Ordering::Relaxed);
        self.consecutive_failures.fetch_add(1, Ordering::Relaxed);
    }

    pub fn delivered(&self) -> u64 {
        self.delivered.load(Ordering::Relaxed)
    }

    pub fn failed(&self) -> u64 {
        self.failed.load(Ordering::Relaxed)
    }

    pub fn consecutive_failures(&self) -> u32 {
        self.consecutive_failures.load(Ordering::Relaxed)
    }
}

/// Handle to the pending delivery of one published message.
///
/// Either `wait` for the broker's answer or `detach` to have it logged in the
/// background. Both paths update the producer's [`DeliveryTracker`].
#[must_use = "a receipt should be awaited or detached"]
pub struct DeliveryReceipt {
    topic: String,
    future: DeliveryFuture,
    tracker: Arc<DeliveryTracker>,
}

impl DeliveryReceipt {
    pub(crate) fn new(topic: String, future: DeliveryFuture, tracker: Arc<DeliveryTracker>) -> Self {
        Self {
            topic,
            future,
            tracker,
        }
    }

    pub fn topic(&self) -> &str {
        &self.topic
    }

    /// Wait for the broker to acknowledge the message.
    pub async fn wait(self) -> Result<Delivery> {
        match self.future.await {
            Ok(delivery) => {
                self.tracker.record_success();
                Ok(delivery)
            }
            Err(e) => {
                self.tracker.record_failure();
                Err(e)
            }
        }
    }

    /// Observe the delivery on a background task. Must be called inside a tokio runtime.
    pub fn detach(self) {
        tokio::spawn(async move {
            let topic = self.topic.clone();
            match self.wait().await {
                Ok(delivery) => tracing::trace!(
                    topic = %topic,
                    partition = delivery.partition,
                    offset = delivery.offset,
                    "Message delivered"
                ),
                Err(e) => tracing::warn!(topic = %topic, "Message delivery failed: {e}"),
            }
        });
    }
}
