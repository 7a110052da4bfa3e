//! Process-wide record of topics already known to exist.

use crate::error::Result;
use crate::transport::{TopicCreation, TopicSpec, Transport};
use std::collections::HashSet;
use tokio::sync::Mutex;

/// Set of topic names that have been created (or found to exist) in this process.
///
/// The lock is held across the administrative call, so concurrent producers for the
/// same topic trigger a single creation request. Failed creations are not recorded
/// and will be retried by the next producer for that topic.
#[derive(Default)]
pub struct TopicRegistry {
    known: Mutex<HashSet<String>>,
}

impl TopicRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make sure `topic` exists, creating it through `transport` on first use.
    ///
    /// Returns `true` if this call issued the creation request.
    pub async fn ensure_exists(&self, transport: &dyn Transport, topic: &TopicSpec) -> Result<bool> {
        let mut known = self.known.lock().await;
        if known.contains(&topic.name) {
            tracing::debug!(topic = %topic.name, "Topic already known, skipping creation");
            return Ok(false);
        }

        match transport.create_topic(topic).await? {
            TopicCreation::Created => {
                tracing::info!(
                    topic = %topic.name,
                    partitions = topic.num_partitions,
                    replicas = topic.num_replicas,
                    "Created topic"
                );
            }
            TopicCreation::AlreadyExists => {
                tracing::debug!(topic = %topic.name, "Topic already present on broker");
            }
        }

        known.insert(topic.name.clone());
        Ok(true)
    }

    pub async fn contains(&self, topic: &str) -> bool {
        self.known.lock().await.contains(topic)
    }

    pub async fn len(&self) -> usize {
        self.known.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.known.lock().await.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::MemoryTransport;
    use std::sync::Arc;

    #[tokio::test]
    async fn test_creates_each_topic_once() {
        let registry = TopicRegistry::new();
        let transport = MemoryTransport::new();
        let names = ["clark_and_lake", "belmont", "howard"];

        for _ in 0..5 {
            for name in names {
                registry
                    .ensure_exists(&transport, &TopicSpec::new(name))
                    .await
                    .unwrap();
            }
        }

        assert_eq!(registry.len().await, names.len());
        assert_eq!(transport.create_requests().len(), names.len());
    }

    #[tokio::test]
    async fn test_reports_whether_creation_was_issued() {
        let registry = TopicRegistry::new();
        let transport = MemoryTransport::new();
        let spec = TopicSpec::new("belmont");

        assert!(registry.ensure_exists(&transport, &spec).await.unwrap());
        assert!(!registry.ensure_exists(&transport, &spec).await.unwrap());
    }

    #[tokio::test]
    async fn test_existing_broker_topic_is_recorded() {
        let registry = TopicRegistry::new();
        let transport = MemoryTransport::new().with_existing_topic("belmont");

        assert!(registry
            .ensure_exists(&transport, &TopicSpec::new("belmont"))
            .await
            .unwrap());
        assert!(registry.contains("belmont").await);
    }

    #[tokio::test]
    async fn test_failed_creation_is_retried() {
        let registry = TopicRegistry::new();
        let transport = MemoryTransport::new();
        let spec = TopicSpec::new("belmont");

        transport.fail_topic_creation(true);
        assert!(registry.ensure_exists(&transport, &spec).await.is_err());
        assert!(registry.is_empty().await);

        transport.fail_topic_creation(false);
        assert!(registry.ensure_exists(&transport, &spec).await.unwrap());
        assert_eq!(transport.create_requests().len(), 2);
    }

    #[tokio::test]
    async fn test_concurrent_callers_create_once() {
        let registry = Arc::new(TopicRegistry::new());
        let transport = Arc::new(MemoryTransport::new());

        let mut handles = Vec::new();
        for _ in 0..16 {
            let registry = registry.clone();
            let transport = transport.clone();
            handles.push(tokio::spawn(async move {
                registry
                    .ensure_exists(transport.as_ref(), &TopicSpec::new("grand"))
                    .await
                    .unwrap()
            }));
        }

        let mut issued = 0;
        for handle in handles {
            if handle.await.unwrap() {
                issued += 1;
            }
        }

        assert_eq!(issued, 1);
        assert_eq!(transport.create_requests().len(), 1);
    }
}
