//! Turnstile event source.

use crate::error::{Result, TurnstileError};
use crate::hardware::EntrySource;
use crate::station::Station;
use crate::topic::station_topic_name;
use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use std::sync::Arc;
use transit_event_producer::{Producer, ProducerContext, SchemaPair};

const KEY_SCHEMA: &str = include_str!("schemas/turnstile_key.json");
const VALUE_SCHEMA: &str = include_str!("schemas/turnstile_value.json");

/// Parse the key/value schema pair shared by all turnstiles.
pub fn turnstile_schemas() -> Result<Arc<SchemaPair>> {
    Ok(Arc::new(SchemaPair::from_json(
        KEY_SCHEMA,
        Some(VALUE_SCHEMA),
    )?))
}

#[derive(Debug, Serialize)]
struct TurnstileKey {
    timestamp: i64,
}

#[derive(Debug, Serialize)]
struct TurnstileValue<'a> {
    station_id: i64,
    station_name: &'a str,
    line: &'a str,
}

/// Publishes one entry event per simulation step for a single station.
pub struct Turnstile {
    station: Station,
    producer: Producer,
    hardware: Box<dyn EntrySource>,
}

impl Turnstile {
    pub async fn new(
        ctx: &ProducerContext,
        station: Station,
        schemas: &SchemaPair,
        hardware: Box<dyn EntrySource>,
    ) -> Result<Self> {
        let topic = station_topic_name(&station.name);
        let producer = Producer::new(ctx, ctx.topic_spec(topic), schemas).await?;
        Ok(Self {
            station,
            producer,
            hardware,
        })
    }

    pub fn station(&self) -> &Station {
        &self.station
    }

    pub fn topic(&self) -> &str {
        self.producer.topic()
    }

    pub fn producer(&self) -> &Producer {
        &self.producer
    }

    /// Simulate riders entering during `[timestamp, timestamp + interval)` and publish
    /// the step's event.
    ///
    /// The entry count is not part of the event value.
    pub fn step(&mut self, timestamp: DateTime<Utc>, interval: Duration) -> Result<()> {
        let entries = self
            .hardware
            .entries_in_interval(timestamp, interval)
            .map_err(|e| match e {
                TurnstileError::Hardware { .. } => e,
                other => TurnstileError::Hardware {
                    station_id: self.station.station_id,
                    reason: other.to_string(),
                },
            })?;

        tracing::debug!(
            station = %self.station.name,
            topic = %self.producer.topic(),
            entries,
            "Turnstile step"
        );

        let key = TurnstileKey {
            timestamp: timestamp.timestamp_millis(),
        };
        let value = TurnstileValue {
            station_id: self.station.station_id,
            station_name: &self.station.name,
            line: self.station.line.as_str(),
        };

        self.producer.publish(&key, &value)?.detach();
        Ok(())
    }

    pub async fn close(&self) -> Result<()> {
        self.producer.close().await?;
        Ok(())
    }
}
