//! Connection settings shared by every producer in a process.

use crate::error::{ProducerError, Result};
use clap::Args;
use std::time::Duration;

/// Default broker list used by the local docker-compose stack.
pub const DEFAULT_BOOTSTRAP_SERVERS: &str =
    "PLAINTEXT://kafka0:9092,PLAINTEXT://kafka1:9093,PLAINTEXT://kafka2:9094";

/// Default schema registry endpoint used by the local docker-compose stack.
pub const DEFAULT_SCHEMA_REGISTRY_URL: &str = "http://schema-registry:8081";

/// Kafka and schema registry connection settings.
#[derive(Args, Clone, Debug)]
pub struct ProducerConfig {
    /// Kafka brokers (comma-separated)
    #[arg(
        long,
        env = "KAFKA_BOOTSTRAP_SERVERS",
        default_value = DEFAULT_BOOTSTRAP_SERVERS
    )]
    pub bootstrap_servers: String,

    /// Schema registry base URL
    #[arg(
        long,
        env = "SCHEMA_REGISTRY_URL",
        default_value = DEFAULT_SCHEMA_REGISTRY_URL
    )]
    pub schema_registry_url: String,

    /// Partitions for newly created topics
    #[arg(long, default_value = "1")]
    pub num_partitions: i32,

    /// Replication factor for newly created topics
    #[arg(long, default_value = "1")]
    pub num_replicas: i32,

    /// Local delivery timeout per message
    #[arg(long, default_value = "5000")]
    pub message_timeout_ms: u64,

    /// Maximum time `close` waits for in-flight deliveries
    #[arg(long, default_value = "10000")]
    pub flush_timeout_ms: u64,

    /// Consecutive delivery failures tolerated before publishing stops (0 = unlimited)
    #[arg(long, default_value = "10")]
    pub max_consecutive_failures: u32,
}

impl Default for ProducerConfig {
    fn default() -> Self {
        Self {
            bootstrap_servers: DEFAULT_BOOTSTRAP_SERVERS.to_string(),
            schema_registry_url: DEFAULT_SCHEMA_REGISTRY_URL.to_string(),
            num_partitions: 1,
            num_replicas: 1,
            message_timeout_ms: 5000,
            flush_timeout_ms: 10_000,
            max_consecutive_failures: 10,
        }
    }
}

impl ProducerConfig {
    /// Check the settings before any client is built.
    pub fn validate(&self) -> Result<()> {
        if self.bootstrap_servers.split(',').all(|s| s.trim().is_empty()) {
            return Err(ProducerError::InvalidConfig(
                "bootstrap servers must not be empty".to_string(),
            ));
        }
        if self.schema_registry_url.trim().is_empty() {
            return Err(ProducerError::InvalidConfig(
                "schema registry url must not be empty".to_string(),
            ));
        }
        if self.num_partitions < 1 {
            return Err(ProducerError::InvalidConfig(format!(
                "num_partitions must be >= 1, got {}",
                self.num_partitions
            )));
        }
        if self.num_replicas < 1 {
            return Err(ProducerError::InvalidConfig(format!(
                "num_replicas must be >= 1, got {}",
                self.num_replicas
            )));
        }
        Ok(())
    }

    pub fn message_timeout(&self) -> Duration {
        Duration::from_millis(self.message_timeout_ms)
    }

    pub fn flush_timeout(&self) -> Duration {
        Duration::from_millis(self.flush_timeout_ms)
    }
}
