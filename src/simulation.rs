//! Driving loop that advances simulated time across every station's turnstile.

use anyhow::Context;
use chrono::{DateTime, Duration, Utc};
use std::future::Future;
use transit_event_producer::ProducerContext;
use transit_turnstile::{turnstile_schemas, SimulatedTurnstile, Station, Turnstile};

/// Settings for one simulation run.
#[derive(Debug, Clone)]
pub struct SimulationOptions {
    /// Simulated time of the first step.
    pub start: DateTime<Utc>,
    /// Simulated time covered by each step.
    pub time_step: Duration,
    /// Number of steps to run; 0 runs until shutdown.
    pub steps: u64,
    /// Real time to wait between steps.
    pub sleep: std::time::Duration,
    /// Seed for the simulated turnstile hardware.
    pub seed: u64,
}

/// Summary of a finished run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SimulationReport {
    pub steps_completed: u64,
    pub events_published: u64,
}

pub struct Simulation {
    turnstiles: Vec<Turnstile>,
    options: SimulationOptions,
}

impl Simulation {
    /// Build one turnstile per station, creating topics and registering schemas.
    pub async fn build(
        ctx: &ProducerContext,
        stations: Vec<Station>,
        options: SimulationOptions,
    ) -> anyhow::Result<Self> {
        if options.time_step <= Duration::zero() {
            anyhow::bail!("time step must be positive");
        }

        let schemas = turnstile_schemas()?;
        let mut turnstiles = Vec::with_capacity(stations.len());
        for station in stations {
            let hardware = Box::new(SimulatedTurnstile::new(&station, options.seed));
            let name = station.name.clone();
            let turnstile = Turnstile::new(ctx, station, &schemas, hardware)
                .await
                .with_context(|| format!("Failed to set up turnstile for station '{name}'"))?;
            turnstiles.push(turnstile);
        }

        tracing::info!("Built {} turnstiles", turnstiles.len());
        Ok(Self {
            turnstiles,
            options,
        })
    }

    pub fn turnstiles(&self) -> &[Turnstile] {
        &self.turnstiles
    }

    /// Run until the configured number of steps completes or `shutdown` resolves,
    /// then close every turnstile.
    pub async fn run<F>(&mut self, shutdown: F) -> anyhow::Result<SimulationReport>
    where
        F: Future<Output = ()>,
    {
        let outcome = self.run_steps(shutdown).await;
        let closed = self.close().await;

        let report = outcome?;
        closed?;
        tracing::info!(
            steps = report.steps_completed,
            events = report.events_published,
            "Simulation finished"
        );
        Ok(report)
    }

    async fn run_steps<F>(&mut self, shutdown: F) -> anyhow::Result<SimulationReport>
    where
        F: Future<Output = ()>,
    {
        tokio::pin!(shutdown);
        let mut report = SimulationReport::default();

        loop {
            if self.options.steps > 0 && report.steps_completed >= self.options.steps {
                break;
            }

            let offset = i32::try_from(report.steps_completed)
                .context("simulation ran past the supported number of steps")?;
            let timestamp = self
                .options
                .time_step
                .checked_mul(offset)
                .and_then(|elapsed| self.options.start.checked_add_signed(elapsed))
                .with_context(|| {
                    format!(
                        "simulated time overflowed after {} steps",
                        report.steps_completed
                    )
                })?;

            for turnstile in &mut self.turnstiles {
                turnstile
                    .step(timestamp, self.options.time_step)
                    .with_context(|| {
                        format!("Step failed for station '{}'", turnstile.station().name)
                    })?;
                report.events_published += 1;
            }
            report.steps_completed += 1;
            tracing::debug!(step = report.steps_completed, %timestamp, "Completed step");

            tokio::select! {
                biased;
                _ = &mut shutdown => {
                    tracing::info!("Shutdown requested, stopping simulation");
                    break;
                }
                _ = tokio::time::sleep(self.options.sleep) => {}
            }
        }

        Ok(report)
    }

    /// Close every turnstile, returning the first failure once all have been tried.
    async fn close(&self) -> anyhow::Result<()> {
        let mut first_error = None;
        for turnstile in &self.turnstiles {
            if let Err(e) = turnstile.close().await {
                tracing::error!(topic = turnstile.topic(), "Failed to close turnstile: {e}");
                first_error.get_or_insert_with(|| {
                    anyhow::Error::new(e)
                        .context(format!("Failed to close turnstile '{}'", turnstile.topic()))
                });
            }
        }
        match first_error {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }
}
