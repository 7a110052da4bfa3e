//! Error types for the event producer.

use thiserror::Error;

/// Errors that can occur while creating topics, encoding or publishing events.
#[derive(Error, Debug)]
pub enum ProducerError {
    #[error("Kafka error: {0}")]
    Kafka(#[from] rdkafka::error::KafkaError),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Failed to create topic '{topic}': {reason}")]
    TopicCreation { topic: String, reason: String },

    #[error("Schema error: {0}")]
    Schema(String),

    #[error("Schema registry error: {0}")]
    SchemaRegistry(String),

    #[error("Serialization error for topic '{topic}': {reason}")]
    Serialization { topic: String, reason: String },

    #[error("Delivery to topic '{topic}' failed: {reason}")]
    Delivery { topic: String, reason: String },

    #[error("Producer for topic '{topic}' stopped after {failures} consecutive delivery failures")]
    DeliveryFailureThreshold { topic: String, failures: u32 },

    #[error("Producer for topic '{0}' is closed")]
    ClosedAdapter(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<reqwest::Error> for ProducerError {
    fn from(err: reqwest::Error) -> Self {
        ProducerError::SchemaRegistry(err.to_string())
    }
}

/// Result type alias for producer operations.
pub type Result<T> = std::result::Result<T, ProducerError>;
