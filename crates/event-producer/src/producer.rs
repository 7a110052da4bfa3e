//! Schema-aware producer bound to a single topic.

use crate::codec;
use crate::config::ProducerConfig;
use crate::delivery::{DeliveryReceipt, DeliveryTracker};
use crate::error::{ProducerError, Result};
use crate::schema::{SchemaId, SchemaPair};
use crate::schema_registry::{key_subject, value_subject, HttpSchemaRegistry, SchemaRegistry};
use crate::topics::TopicRegistry;
use crate::transport::{KafkaTransport, OutgoingRecord, TopicSpec, Transport};
use apache_avro::Schema;
use serde::Serialize;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Resources shared by every producer in a process.
#[derive(Clone)]
pub struct ProducerContext {
    config: Arc<ProducerConfig>,
    transport: Arc<dyn Transport>,
    schema_registry: Arc<dyn SchemaRegistry>,
    topics: Arc<TopicRegistry>,
}

impl ProducerContext {
    pub fn new(
        config: ProducerConfig,
        transport: Arc<dyn Transport>,
        schema_registry: Arc<dyn SchemaRegistry>,
    ) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config: Arc::new(config),
            transport,
            schema_registry,
            topics: Arc::new(TopicRegistry::new()),
        })
    }

    /// Connect to Kafka and the schema registry named in `config`.
    pub fn connect(config: ProducerConfig) -> Result<Self> {
        config.validate()?;
        let transport = Arc::new(KafkaTransport::new(&config)?);
        let schema_registry = Arc::new(HttpSchemaRegistry::new(&config.schema_registry_url)?);
        tracing::info!(
            brokers = %config.bootstrap_servers,
            schema_registry = %config.schema_registry_url,
            "Connected producer context"
        );
        Self::new(config, transport, schema_registry)
    }

    pub fn config(&self) -> &ProducerConfig {
        &self.config
    }

    pub fn topics(&self) -> &TopicRegistry {
        &self.topics
    }

    pub fn transport(&self) -> &Arc<dyn Transport> {
        &self.transport
    }

    /// Topic spec for `name` with the configured partition and replica counts.
    pub fn topic_spec(&self, name: impl Into<String>) -> TopicSpec {
        TopicSpec::new(name)
            .with_partitions(self.config.num_partitions)
            .with_replicas(self.config.num_replicas)
    }
}

struct BoundSchema {
    schema: Schema,
    id: SchemaId,
}

/// Publishes Avro-encoded events to one topic.
///
/// Construction ensures the topic exists and registers the schemas. Publishing never
/// waits for the broker; see [`DeliveryReceipt`].
pub struct Producer {
    topic: String,
    key: BoundSchema,
    value: Option<BoundSchema>,
    transport: Arc<dyn Transport>,
    tracker: Arc<DeliveryTracker>,
    max_consecutive_failures: u32,
    flush_timeout: std::time::Duration,
    closed: AtomicBool,
}

impl Producer {
    pub async fn new(ctx: &ProducerContext, topic: TopicSpec, schemas: &SchemaPair) -> Result<Self> {
        if topic.name.is_empty() {
            return Err(ProducerError::InvalidConfig(
                "topic name must not be empty".to_string(),
            ));
        }
        if topic.num_partitions < 1 || topic.num_replicas < 1 {
            return Err(ProducerError::InvalidConfig(format!(
                "topic '{}' needs at least one partition and one replica",
                topic.name
            )));
        }

        ctx.topics
            .ensure_exists(ctx.transport.as_ref(), &topic)
            .await?;

        let key_id = ctx
            .schema_registry
            .register(&key_subject(&topic.name), schemas.key())
            .await?;
        let key = BoundSchema {
            schema: schemas.key().clone(),
            id: key_id,
        };

        let value = match schemas.value() {
            Some(schema) => {
                let id = ctx
                    .schema_registry
                    .register(&value_subject(&topic.name), schema)
                    .await?;
                Some(BoundSchema {
                    schema: schema.clone(),
                    id,
                })
            }
            None => None,
        };

        tracing::debug!(topic = %topic.name, key_schema_id = %key.id, "Producer ready");

        Ok(Self {
            topic: topic.name,
            key,
            value,
            transport: ctx.transport.clone(),
            tracker: Arc::new(DeliveryTracker::default()),
            max_consecutive_failures: ctx.config.max_consecutive_failures,
            flush_timeout: ctx.config.flush_timeout(),
            closed: AtomicBool::new(false),
        })
    }

    pub fn topic(&self) -> &str {
        &self.topic
    }

    pub fn tracker(&self) -> &DeliveryTracker {
        &self.tracker
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }

    /// Encode `key` and `value` and enqueue them for delivery.
    pub fn publish<K, V>(&self, key: &K, value: &V) -> Result<DeliveryReceipt>
    where
        K: Serialize,
        V: Serialize,
    {
        self.check_open()?;
        let value_schema = self.value.as_ref().ok_or_else(|| ProducerError::Serialization {
            topic: self.topic.clone(),
            reason: "no value schema configured; use publish_key".to_string(),
        })?;

        let key = self.encode(&self.key, key)?;
        let payload = self.encode(value_schema, value)?;
        self.enqueue(key, Some(payload))
    }

    /// Enqueue a key-only message with a null value.
    pub fn publish_key<K: Serialize>(&self, key: &K) -> Result<DeliveryReceipt> {
        self.check_open()?;
        let key = self.encode(&self.key, key)?;
        self.enqueue(key, None)
    }

    /// Stop accepting messages and flush the ones in flight. Later calls are no-ops.
    pub async fn close(&self) -> Result<()> {
        if self.closed.swap(true, Ordering::AcqRel) {
            return Ok(());
        }

        self.transport.flush(self.flush_timeout).await?;
        tracing::info!(
            topic = %self.topic,
            delivered = self.tracker.delivered(),
            failed = self.tracker.failed(),
            "Producer closed"
        );
        Ok(())
    }

    fn check_open(&self) -> Result<()> {
        if self.is_closed() {
            return Err(ProducerError::ClosedAdapter(self.topic.clone()));
        }

        let failures = self.tracker.consecutive_failures();
        if self.max_consecutive_failures > 0 && failures >= self.max_consecutive_failures {
            return Err(ProducerError::DeliveryFailureThreshold {
                topic: self.topic.clone(),
                failures,
            });
        }
        Ok(())
    }

    fn encode<T: Serialize>(&self, bound: &BoundSchema, value: &T) -> Result<Vec<u8>> {
        codec::encode(&bound.schema, bound.id, value).map_err(|reason| {
            ProducerError::Serialization {
                topic: self.topic.clone(),
                reason,
            }
        })
    }

    fn enqueue(&self, key: Vec<u8>, payload: Option<Vec<u8>>) -> Result<DeliveryReceipt> {
        let future = self.transport.send(OutgoingRecord {
            topic: self.topic.clone(),
            key,
            payload,
        })?;
        Ok(DeliveryReceipt::new(
            self.topic.clone(),
            future,
            self.tracker.clone(),
        ))
    }
}
