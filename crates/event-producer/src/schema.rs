//! Avro key/value schema pairs.

use crate::error::{ProducerError, Result};
use apache_avro::Schema;
use std::fmt;
use std::path::Path;

/// Identifier assigned to a schema by the schema registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SchemaId(pub u32);

impl fmt::Display for SchemaId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Key schema plus optional value schema for one kind of event.
///
/// Loaded once and shared (usually behind an `Arc`) by every producer publishing
/// that kind of event.
#[derive(Debug, Clone)]
pub struct SchemaPair {
    key: Schema,
    value: Option<Schema>,
}

impl SchemaPair {
    pub fn new(key: Schema, value: Option<Schema>) -> Self {
        Self { key, value }
    }

    /// Parse a pair from Avro JSON schema definitions.
    pub fn from_json(key: &str, value: Option<&str>) -> Result<Self> {
        let key = parse_schema(key, "key")?;
        let value = value.map(|v| parse_schema(v, "value")).transpose()?;
        Ok(Self { key, value })
    }

    /// Load a pair from `.json` schema files on disk.
    pub fn load<P: AsRef<Path>>(key_path: P, value_path: Option<P>) -> Result<Self> {
        let key = std::fs::read_to_string(key_path.as_ref())?;
        let value = value_path
            .map(|p| std::fs::read_to_string(p.as_ref()))
            .transpose()?;
        Self::from_json(&key, value.as_deref())
    }

    pub fn key(&self) -> &Schema {
        &self.key
    }

    pub fn value(&self) -> Option<&Schema> {
        self.value.as_ref()
    }
}

fn parse_schema(raw: &str, role: &str) -> Result<Schema> {
    Schema::parse_str(raw)
        .map_err(|e| ProducerError::Schema(format!("invalid {role} schema: {e}")))
}
