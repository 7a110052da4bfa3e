//! Simulated turnstile hardware producing rider entry counts.

use crate::error::Result;
use crate::station::Station;
use chrono::{DateTime, Datelike, Duration, Timelike, Utc, Weekday};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Share of a day's entries that happen in each hour, midnight first. Sums to 1.
const HOURLY_RIDERSHIP: [f64; 24] = [
    0.005, 0.003, 0.002, 0.002, 0.005, 0.015, 0.045, 0.085, 0.095, 0.060, 0.045, 0.045, 0.050,
    0.050, 0.050, 0.060, 0.080, 0.090, 0.070, 0.045, 0.035, 0.030, 0.020, 0.013,
];

const WEEK_SECS: i64 = 7 * 24 * 3600;

/// Relative spread of the random jitter applied to each count.
const JITTER: f64 = 0.10;

/// Source of rider entry counts for one station.
pub trait EntrySource: Send + Sync {
    /// Riders entering during `[timestamp, timestamp + interval)`.
    fn entries_in_interval(&mut self, timestamp: DateTime<Utc>, interval: Duration) -> Result<u32>;
}

/// Entry counts derived from a station's average ridership and a daily curve.
pub struct SimulatedTurnstile {
    weekday: f64,
    saturday: f64,
    sunday: f64,
    rng: StdRng,
}

impl SimulatedTurnstile {
    pub fn new(station: &Station, seed: u64) -> Self {
        Self {
            weekday: station.avg_weekday_entries,
            saturday: station.avg_saturday_entries,
            sunday: station.avg_sunday_entries,
            rng: StdRng::seed_from_u64(seed ^ station.station_id as u64),
        }
    }

    fn daily_entries(&self, timestamp: DateTime<Utc>) -> f64 {
        match timestamp.weekday() {
            Weekday::Sat => self.saturday,
            Weekday::Sun => self.sunday,
            _ => self.weekday,
        }
    }

    /// Expected entries for the interval before jitter.
    ///
    /// Each hour the interval overlaps contributes its share of that day's
    /// entries, scaled by how much of the hour is covered.
    pub fn expected_entries(&self, timestamp: DateTime<Utc>, interval: Duration) -> f64 {
        let interval_secs = interval.num_seconds().max(0);
        // A whole week covers every hour of every day type exactly once.
        let weeks = interval_secs / WEEK_SECS;
        let mut total = weeks as f64 * (5.0 * self.weekday + self.saturday + self.sunday);

        let mut cursor = timestamp;
        let mut remaining = interval_secs % WEEK_SECS;

        while remaining > 0 {
            let into_hour = i64::from(cursor.minute() * 60 + cursor.second());
            let segment = remaining.min(3600 - into_hour);
            let hour_share = HOURLY_RIDERSHIP[cursor.hour() as usize];
            total += self.daily_entries(cursor) * hour_share * segment as f64 / 3600.0;

            remaining -= segment;
            match cursor.checked_add_signed(Duration::seconds(segment)) {
                Some(next) => cursor = next,
                None => break,
            }
        }
        total
    }
}

impl EntrySource for SimulatedTurnstile {
    fn entries_in_interval(&mut self, timestamp: DateTime<Utc>, interval: Duration) -> Result<u32> {
        let expected = self.expected_entries(timestamp, interval);
        if expected <= 0.0 {
            return Ok(0);
        }
        let jitter = self.rng.random_range(-JITTER..=JITTER);
        Ok((expected * (1.0 + jitter)).round().max(0.0) as u32)
    }
}
