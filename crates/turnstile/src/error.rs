//! Error types for turnstile event sources.

use thiserror::Error;
use transit_event_producer::ProducerError;

#[derive(Error, Debug)]
pub enum TurnstileError {
    #[error(transparent)]
    Producer(#[from] ProducerError),

    #[error("Failed to read stations: {0}")]
    StationLoad(#[from] csv::Error),

    #[error("Invalid station record: {0}")]
    InvalidStation(String),

    #[error("Turnstile hardware error at station {station_id}: {reason}")]
    Hardware { station_id: i64, reason: String },
}

pub type Result<T> = std::result::Result<T, TurnstileError>;
