//! Turnstile event source for transit stations.
//!
//! Each [`Turnstile`] owns a producer bound to its station's topic and a simulated
//! piece of hardware reporting rider entries. Every call to [`Turnstile::step`]
//! publishes one Avro event keyed by the step's timestamp.

pub mod error;
pub mod hardware;
pub mod station;
pub mod topic;
pub mod turnstile;

pub use error::{Result, TurnstileError};
pub use hardware::{EntrySource, SimulatedTurnstile};
pub use station::{load_stations, read_stations, Line, Station};
pub use topic::station_topic_name;
pub use turnstile::{turnstile_schemas, Turnstile};
