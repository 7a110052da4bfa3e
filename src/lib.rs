//! Transit turnstile simulator
//!
//! Simulates rider entries at transit stations and publishes one Avro-encoded event
//! per station and time step to a Kafka topic named after the station.
//!
//! # Crates
//!
//! - `transit_event_producer` - topic creation, schema registration and publishing
//! - `transit_turnstile` - stations, topic naming and the turnstile event source
//!
//! # CLI Usage
//!
//! ```bash
//! # Print the topic each station publishes to
//! transit-sim topics --stations data/stations.csv
//!
//! # Run 12 five-minute steps against the local stack
//! transit-sim simulate --stations data/stations.csv --time-step 5m --steps 12 \
//!   --bootstrap-servers localhost:9092 --schema-registry-url http://localhost:8081
//! ```

pub mod config {
    pub mod duration;
}
pub mod simulation;

pub use simulation::{Simulation, SimulationOptions, SimulationReport};
