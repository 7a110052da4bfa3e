//! Producer adapter for publishing Avro-encoded transit events to Kafka.
//!
//! ## Features
//!
//! - **Topic management**: topics are created once per process through a shared
//!   [`TopicRegistry`]
//! - **Schema registry**: key and value schemas are registered under `<topic>-key` /
//!   `<topic>-value` and their ids embedded in each message (Confluent wire format)
//! - **Fire-and-forget publishing**: [`Producer::publish`] returns a [`DeliveryReceipt`]
//!   that can be awaited or detached
//!
//! ## Usage
//!
//! ```rust,no_run
//! use transit_event_producer::{Producer, ProducerConfig, ProducerContext, SchemaPair};
//!
//! #[derive(serde::Serialize)]
//! struct Key {
//!     timestamp: i64,
//! }
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let ctx = ProducerContext::connect(ProducerConfig::default())?;
//!     let schemas = SchemaPair::load("schemas/key.json", None)?;
//!
//!     let producer = Producer::new(&ctx, ctx.topic_spec("arrivals"), &schemas).await?;
//!     producer
//!         .publish_key(&Key { timestamp: transit_event_producer::now_millis() })?
//!         .detach();
//!     producer.close().await?;
//!     Ok(())
//! }
//! ```

pub mod clock;
pub mod codec;
pub mod config;
pub mod delivery;
pub mod error;
pub mod producer;
pub mod schema;
pub mod schema_registry;
pub mod testing;
pub mod topics;
pub mod transport;

pub use clock::now_millis;
pub use config::ProducerConfig;
pub use delivery::{DeliveryReceipt, DeliveryTracker};
pub use error::{ProducerError, Result};
pub use producer::{Producer, ProducerContext};
pub use schema::{SchemaId, SchemaPair};
pub use schema_registry::{HttpSchemaRegistry, MemorySchemaRegistry, SchemaRegistry};
pub use topics::TopicRegistry;
pub use transport::{
    Delivery, DeliveryFuture, KafkaTransport, OutgoingRecord, TopicCreation, TopicSpec, Transport,
};
