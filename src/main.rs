//! Command-line interface for transit-sim
//!
//! # Usage Examples
//!
//! ```bash
//! # List the topic names derived from a stations file
//! transit-sim topics --stations data/stations.csv
//!
//! # Simulate until Ctrl-C, one 5 minute step per second
//! transit-sim simulate --stations data/stations.csv --time-step 5m --sleep 1s
//!
//! # Simulate a fixed number of steps from a given start time
//! transit-sim simulate --stations data/stations.csv \
//!   --start-time 2024-03-05T06:00:00Z --steps 48 --sleep 0
//! ```

use anyhow::Context;
use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use transit_event_producer::{ProducerConfig, ProducerContext};
use transit_sim::config::duration::{parse_duration, parse_std_duration};
use transit_sim::{Simulation, SimulationOptions};
use transit_turnstile::{load_stations, station_topic_name};

#[derive(Parser)]
#[command(name = "transit-sim")]
#[command(about = "Simulate transit turnstile entries and publish them to Kafka")]
#[command(long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the turnstile simulation and publish events
    Simulate {
        /// Stations CSV file
        #[arg(long, value_name = "PATH")]
        stations: PathBuf,

        /// Simulated time covered by each step (e.g. "5m", "30s", "1h")
        #[arg(long, default_value = "5m")]
        time_step: String,

        /// Real time to wait between steps
        #[arg(long, default_value = "1s")]
        sleep: String,

        /// Number of steps to run (0 = until Ctrl-C)
        #[arg(long, default_value = "0")]
        steps: u64,

        /// Simulated start time (RFC 3339, default: now)
        #[arg(long)]
        start_time: Option<DateTime<Utc>>,

        /// Seed for the simulated turnstile hardware
        #[arg(long, default_value = "42")]
        seed: u64,

        #[command(flatten)]
        producer: ProducerConfig,
    },

    /// Print the topic name used by each station
    Topics {
        /// Stations CSV file
        #[arg(long, value_name = "PATH")]
        stations: PathBuf,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    if let Err(e) = run().await {
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }
    Ok(())
}

async fn run() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Simulate {
            stations,
            time_step,
            sleep,
            steps,
            start_time,
            seed,
            producer,
        } => {
            let options = SimulationOptions {
                start: start_time.unwrap_or_else(Utc::now),
                time_step: parse_duration(&time_step)?,
                steps,
                sleep: parse_std_duration(&sleep)?,
                seed,
            };
            let stations = load_stations(&stations)
                .with_context(|| format!("Failed to load stations from {stations:?}"))?;
            let ctx = ProducerContext::connect(producer)
                .context("Failed to connect to Kafka and the schema registry")?;

            let mut simulation = Simulation::build(&ctx, stations, options).await?;
            let report = simulation
                .run(async {
                    if let Err(e) = tokio::signal::ctrl_c().await {
                        tracing::error!("Failed to listen for Ctrl-C: {e}");
                        std::future::pending::<()>().await;
                    }
                })
                .await?;

            println!(
                "Published {} events over {} steps",
                report.events_published, report.steps_completed
            );
        }
        Commands::Topics { stations } => {
            let stations = load_stations(&stations)
                .with_context(|| format!("Failed to load stations from {stations:?}"))?;
            for station in stations {
                println!(
                    "{}\t{}\t{}",
                    station.station_id,
                    station.name,
                    station_topic_name(&station.name)
                );
            }
        }
    }

    Ok(())
}
