//! Transport seam between producers and the message broker.

use crate::config::ProducerConfig;
use crate::error::{ProducerError, Result};
use async_trait::async_trait;
use futures::future::BoxFuture;
use futures::FutureExt;
use rdkafka::admin::{AdminClient, AdminOptions, NewTopic, TopicReplication};
use rdkafka::client::DefaultClientContext;
use rdkafka::error::RDKafkaErrorCode;
use rdkafka::producer::{FutureProducer, FutureRecord, Producer as _};
use rdkafka::ClientConfig;
use std::time::Duration;

/// Topic name plus the settings used if it has to be created.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TopicSpec {
    pub name: String,
    pub num_partitions: i32,
    pub num_replicas: i32,
}

impl TopicSpec {
    /// A single-partition, single-replica topic.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            num_partitions: 1,
            num_replicas: 1,
        }
    }

    pub fn with_partitions(mut self, num_partitions: i32) -> Self {
        self.num_partitions = num_partitions;
        self
    }

    pub fn with_replicas(mut self, num_replicas: i32) -> Self {
        self.num_replicas = num_replicas;
        self
    }
}

/// Outcome of an administrative create-topic call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TopicCreation {
    Created,
    AlreadyExists,
}

/// One encoded message ready to hand to the broker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutgoingRecord {
    pub topic: String,
    pub key: Vec<u8>,
    pub payload: Option<Vec<u8>>,
}

/// Broker acknowledgement of a delivered message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Delivery {
    pub partition: i32,
    pub offset: i64,
}

/// Resolves once the broker acknowledges (or rejects) one message.
pub type DeliveryFuture = BoxFuture<'static, Result<Delivery>>;

/// Administrative and data-plane operations a producer needs from the broker.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Create `topic`, reporting whether it already existed.
    async fn create_topic(&self, topic: &TopicSpec) -> Result<TopicCreation>;

    /// Enqueue `record` without waiting for delivery.
    ///
    /// Errors returned here are local (queue full, message too large); broker-side
    /// failures surface through the returned future.
    fn send(&self, record: OutgoingRecord) -> Result<DeliveryFuture>;

    /// Wait for every enqueued message to be delivered or time out.
    async fn flush(&self, timeout: Duration) -> Result<()>;
}

/// Kafka transport backed by librdkafka.
pub struct KafkaTransport {
    producer: FutureProducer,
    brokers: String,
    message_timeout: Duration,
}

impl KafkaTransport {
    pub fn new(config: &ProducerConfig) -> Result<Self> {
        let producer: FutureProducer = ClientConfig::new()
            .set("bootstrap.servers", &config.bootstrap_servers)
            .set("message.timeout.ms", config.message_timeout_ms.to_string())
            .set("queue.buffering.max.messages", "100000")
            .set("linger.ms", "5")
            .create()?;

        Ok(Self {
            producer,
            brokers: config.bootstrap_servers.clone(),
            message_timeout: config.message_timeout(),
        })
    }
}

#[async_trait]
impl Transport for KafkaTransport {
    async fn create_topic(&self, topic: &TopicSpec) -> Result<TopicCreation> {
        let admin_client: AdminClient<DefaultClientContext> = ClientConfig::new()
            .set("bootstrap.servers", &self.brokers)
            .create()?;

        let new_topic = NewTopic::new(
            &topic.name,
            topic.num_partitions,
            TopicReplication::Fixed(topic.num_replicas),
        );
        let opts = AdminOptions::new().operation_timeout(Some(self.message_timeout));

        let results = admin_client
            .create_topics(&[new_topic], &opts)
            .await
            .map_err(|e| ProducerError::TopicCreation {
                topic: topic.name.clone(),
                reason: e.to_string(),
            })?;

        let mut outcome = TopicCreation::Created;
        for result in results {
            match result {
                Ok(name) => {
                    tracing::info!("Topic '{name}' created successfully");
                }
                Err((name, RDKafkaErrorCode::TopicAlreadyExists)) => {
                    tracing::info!("Topic '{name}' already exists");
                    outcome = TopicCreation::AlreadyExists;
                }
                Err((name, code)) => {
                    return Err(ProducerError::TopicCreation {
                        topic: name,
                        reason: code.to_string(),
                    });
                }
            }
        }

        Ok(outcome)
    }

    fn send(&self, record: OutgoingRecord) -> Result<DeliveryFuture> {
        let mut future_record = FutureRecord::to(&record.topic).key(&record.key);
        if let Some(payload) = &record.payload {
            future_record = future_record.payload(payload);
        }

        let delivery = self
            .producer
            .send_result(future_record)
            .map_err(|(err, _)| ProducerError::Kafka(err))?;

        let topic = record.topic.clone();
        Ok(async move {
            match delivery.await {
                Ok(Ok((partition, offset))) => Ok(Delivery { partition, offset }),
                Ok(Err((err, _))) => Err(ProducerError::Delivery {
                    topic,
                    reason: err.to_string(),
                }),
                Err(_) => Err(ProducerError::Delivery {
                    topic,
                    reason: "producer dropped before delivery".to_string(),
                }),
            }
        }
        .boxed())
    }

    async fn flush(&self, timeout: Duration) -> Result<()> {
        let producer = self.producer.clone();
        tokio::task::spawn_blocking(move || producer.flush(timeout))
            .await
            .map_err(|e| ProducerError::Delivery {
                topic: String::new(),
                reason: format!("flush task failed: {e}"),
            })??;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_topic_spec_builders() {
        let spec = TopicSpec::new("belmont")
            .with_partitions(3)
            .with_replicas(2);
        assert_eq!(spec.name, "belmont");
        assert_eq!(spec.num_partitions, 3);
        assert_eq!(spec.num_replicas, 2);
    }

    #[test]
    fn test_topic_spec_defaults() {
        let spec = TopicSpec::new("belmont");
        assert_eq!(spec.num_partitions, 1);
        assert_eq!(spec.num_replicas, 1);
    }
}
