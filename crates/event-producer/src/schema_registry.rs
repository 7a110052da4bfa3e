//! Schema registry clients.
//!
//! Producers register their key and value schemas under the subjects `<topic>-key` and
//! `<topic>-value` and embed the returned ids in every encoded message.

use crate::error::{ProducerError, Result};
use crate::schema::SchemaId;
use apache_avro::Schema;
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::time::Duration;
use tokio::sync::Mutex;

/// Subject for the key schema of `topic`.
pub fn key_subject(topic: &str) -> String {
    format!("{topic}-key")
}

/// Subject for the value schema of `topic`.
pub fn value_subject(topic: &str) -> String {
    format!("{topic}-value")
}

/// Registry that stores schemas by subject and hands out ids.
#[async_trait]
pub trait SchemaRegistry: Send + Sync {
    /// Register `schema` under `subject`, returning its id.
    ///
    /// Registering an identical schema again returns the same id.
    async fn register(&self, subject: &str, schema: &Schema) -> Result<SchemaId>;
}

#[derive(Debug, Serialize)]
struct RegisterSchemaRequest {
    schema: String,
}

#[derive(Debug, Deserialize)]
struct RegisterSchemaResponse {
    id: u32,
}

#[derive(Debug, Deserialize)]
struct ErrorResponse {
    error_code: Option<i64>,
    message: Option<String>,
}

/// Confluent-compatible schema registry client with a local id cache.
pub struct HttpSchemaRegistry {
    client: Client,
    base_url: String,
    /// Cache: (subject, canonical schema) -> id
    cache: Mutex<HashMap<(String, String), SchemaId>>,
}

impl HttpSchemaRegistry {
    pub fn new(url: &str) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .map_err(|e| ProducerError::SchemaRegistry(e.to_string()))?;

        Ok(Self {
            client,
            base_url: url.trim_end_matches('/').to_string(),
            cache: Mutex::new(HashMap::new()),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

#[async_trait]
impl SchemaRegistry for HttpSchemaRegistry {
    async fn register(&self, subject: &str, schema: &Schema) -> Result<SchemaId> {
        let canonical = schema.canonical_form();
        let cache_key = (subject.to_string(), canonical);

        if let Some(id) = self.cache.lock().await.get(&cache_key) {
            return Ok(*id);
        }

        let url = format!("{}/subjects/{}/versions", self.base_url, subject);
        let request = RegisterSchemaRequest {
            schema: cache_key.1.clone(),
        };

        let response = self
            .client
            .post(&url)
            .header("Content-Type", "application/vnd.schemaregistry.v1+json")
            .json(&request)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            let detail = match serde_json::from_str::<ErrorResponse>(&body) {
                Ok(ErrorResponse {
                    error_code: Some(code),
                    message: Some(message),
                }) => format!("{message} (error code {code})"),
                _ => body,
            };
            return Err(ProducerError::SchemaRegistry(format!(
                "registering subject '{subject}' failed with {status}: {detail}"
            )));
        }

        let result: RegisterSchemaResponse = response.json().await?;
        let id = SchemaId(result.id);

        tracing::info!(subject = %subject, schema_id = %id, "Registered schema");

        self.cache.lock().await.insert(cache_key, id);
        Ok(id)
    }
}

#[derive(Default)]
struct MemoryRegistryState {
    ids: HashMap<String, SchemaId>,
    subjects: HashMap<String, Vec<SchemaId>>,
}

/// In-process schema registry.
///
/// Identical schemas share one id across subjects, as in a Confluent registry.
#[derive(Default)]
pub struct MemorySchemaRegistry {
    state: Mutex<MemoryRegistryState>,
}

impl MemorySchemaRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Ids registered under `subject`, oldest first.
    pub async fn versions(&self, subject: &str) -> Vec<SchemaId> {
        self.state
            .lock()
            .await
            .subjects
            .get(subject)
            .cloned()
            .unwrap_or_default()
    }

    pub async fn subjects(&self) -> Vec<String> {
        let mut subjects: Vec<String> = self.state.lock().await.subjects.keys().cloned().collect();
        subjects.sort();
        subjects
    }
}

#[async_trait]
impl SchemaRegistry for MemorySchemaRegistry {
    async fn register(&self, subject: &str, schema: &Schema) -> Result<SchemaId> {
        let mut state = self.state.lock().await;
        let next = SchemaId(state.ids.len() as u32 + 1);
        let id = *state.ids.entry(schema.canonical_form()).or_insert(next);

        let versions = state.subjects.entry(subject.to_string()).or_default();
        if !versions.contains(&id) {
            versions.push(id);
        }
        Ok(id)
    }
}
