//! In-memory transport for exercising producers without a broker.

use crate::codec;
use crate::error::{ProducerError, Result};
use crate::transport::{
    Delivery, DeliveryFuture, OutgoingRecord, TopicCreation, TopicSpec, Transport,
};
use apache_avro::types::Value;
use apache_avro::Schema;
use async_trait::async_trait;
use futures::FutureExt;
use rdkafka::error::{KafkaError, RDKafkaErrorCode};
use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;

/// Transport that keeps every request in memory.
///
/// Deliveries resolve immediately, successfully unless `fail_deliveries(true)` was set.
/// Flushes are counted even when `fail_flush(true)` makes them fail.
#[derive(Default)]
pub struct MemoryTransport {
    existing: Mutex<HashSet<String>>,
    create_requests: Mutex<Vec<TopicSpec>>,
    records: Mutex<Vec<OutgoingRecord>>,
    fail_topic_creation: AtomicBool,
    fail_deliveries: AtomicBool,
    fail_flush: AtomicBool,
    flushes: AtomicUsize,
}

fn guard<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

impl MemoryTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pretend `topic` was created before this process started.
    pub fn with_existing_topic(self, topic: &str) -> Self {
        guard(&self.existing).insert(topic.to_string());
        self
    }

    pub fn fail_topic_creation(&self, fail: bool) {
        self.fail_topic_creation.store(fail, Ordering::SeqCst);
    }

    pub fn fail_deliveries(&self, fail: bool) {
        self.fail_deliveries.store(fail, Ordering::SeqCst);
    }

    pub fn fail_flush(&self, fail: bool) {
        self.fail_flush.store(fail, Ordering::SeqCst);
    }

    /// Every create-topic request received, in order.
    pub fn create_requests(&self) -> Vec<TopicSpec> {
        guard(&self.create_requests).clone()
    }

    /// Every record enqueued, in order.
    pub fn records(&self) -> Vec<OutgoingRecord> {
        guard(&self.records).clone()
    }

    /// Records enqueued for `topic`, in order.
    pub fn records_for(&self, topic: &str) -> Vec<OutgoingRecord> {
        guard(&self.records)
            .iter()
            .filter(|r| r.topic == topic)
            .cloned()
            .collect()
    }

    pub fn flush_count(&self) -> usize {
        self.flushes.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Transport for MemoryTransport {
    async fn create_topic(&self, topic: &TopicSpec) -> Result<TopicCreation> {
        guard(&self.create_requests).push(topic.clone());

        if self.fail_topic_creation.load(Ordering::SeqCst) {
            return Err(ProducerError::TopicCreation {
                topic: topic.name.clone(),
                reason: "cluster authorization failed".to_string(),
            });
        }

        if guard(&self.existing).insert(topic.name.clone()) {
            Ok(TopicCreation::Created)
        } else {
            Ok(TopicCreation::AlreadyExists)
        }
    }

    fn send(&self, record: OutgoingRecord) -> Result<DeliveryFuture> {
        let topic = record.topic.clone();
        let mut records = guard(&self.records);
        let offset = records.iter().filter(|r| r.topic == topic).count() as i64;
        records.push(record);

        let outcome = if self.fail_deliveries.load(Ordering::SeqCst) {
            Err(ProducerError::Delivery {
                topic,
                reason: "broker unreachable".to_string(),
            })
        } else {
            Ok(Delivery {
                partition: 0,
                offset,
            })
        };
        Ok(futures::future::ready(outcome).boxed())
    }

    async fn flush(&self, _timeout: Duration) -> Result<()> {
        self.flushes.fetch_add(1, Ordering::SeqCst);
        if self.fail_flush.load(Ordering::SeqCst) {
            return Err(ProducerError::Kafka(KafkaError::Flush(
                RDKafkaErrorCode::OperationTimedOut,
            )));
        }
        Ok(())
    }
}

/// Decode a wire-format payload, panicking on malformed input.
pub fn decode_payload(schema: &Schema, data: &[u8]) -> Value {
    match codec::decode(schema, data) {
        Ok((_, value)) => value,
        Err(e) => panic!("failed to decode payload: {e}"),
    }
}
