//! Station descriptors and the CSV loader for them.

use crate::error::{Result, TurnstileError};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::io::Read;
use std::path::Path;

/// Rail line a station belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Line {
    Blue,
    Green,
    Red,
}

impl Line {
    pub fn as_str(&self) -> &'static str {
        match self {
            Line::Blue => "blue",
            Line::Green => "green",
            Line::Red => "red",
        }
    }
}

impl fmt::Display for Line {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A station with its average daily ridership.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Station {
    pub station_id: i64,
    #[serde(rename = "station_name")]
    pub name: String,
    pub line: Line,
    #[serde(default)]
    pub avg_weekday_entries: f64,
    #[serde(default)]
    pub avg_saturday_entries: f64,
    #[serde(default)]
    pub avg_sunday_entries: f64,
}

impl Station {
    pub fn new(station_id: i64, name: impl Into<String>, line: Line) -> Self {
        Self {
            station_id,
            name: name.into(),
            line,
            avg_weekday_entries: 0.0,
            avg_saturday_entries: 0.0,
            avg_sunday_entries: 0.0,
        }
    }

    pub fn with_ridership(mut self, weekday: f64, saturday: f64, sunday: f64) -> Self {
        self.avg_weekday_entries = weekday;
        self.avg_saturday_entries = saturday;
        self.avg_sunday_entries = sunday;
        self
    }
}

/// Load stations from a CSV file with a header row.
pub fn load_stations<P: AsRef<Path>>(path: P) -> Result<Vec<Station>> {
    let reader = csv::Reader::from_path(path.as_ref())?;
    collect_stations(reader)
}

/// Read stations from any CSV source with a header row.
pub fn read_stations<R: Read>(source: R) -> Result<Vec<Station>> {
    collect_stations(csv::Reader::from_reader(source))
}

fn collect_stations<R: Read>(mut reader: csv::Reader<R>) -> Result<Vec<Station>> {
    let mut stations = Vec::new();
    for record in reader.deserialize() {
        let station: Station = record?;
        if station.name.trim().is_empty() {
            return Err(TurnstileError::InvalidStation(format!(
                "station {} has an empty name",
                station.station_id
            )));
        }
        stations.push(station);
    }
    tracing::debug!("Loaded {} stations", stations.len());
    Ok(stations)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const CSV: &str = "\
station_id,station_name,line,avg_weekday_entries,avg_saturday_entries,avg_sunday_entries
40380,Clark/Lake,blue,15000,6000,4500
40900,Howard,red,9000,4000,3000
";

    #[test]
    fn test_read_stations() {
        let stations = read_stations(CSV.as_bytes()).unwrap();
        assert_eq!(stations.len(), 2);
        assert_eq!(stations[0].name, "Clark/Lake");
        assert_eq!(stations[0].line, Line::Blue);
        assert_eq!(stations[1].avg_sunday_entries, 3000.0);
    }

    #[test]
    fn test_load_stations_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(CSV.as_bytes()).unwrap();
        let stations = load_stations(file.path()).unwrap();
        assert_eq!(stations[1].station_id, 40900);
    }

    #[test]
    fn test_unknown_line_is_rejected() {
        let csv = "station_id,station_name,line\n1,Nowhere,purple\n";
        assert!(matches!(
            read_stations(csv.as_bytes()),
            Err(TurnstileError::StationLoad(_))
        ));
    }

    #[test]
    fn test_empty_name_is_rejected() {
        let csv = "station_id,station_name,line\n1, ,red\n";
        assert!(matches!(
            read_stations(csv.as_bytes()),
            Err(TurnstileError::InvalidStation(_))
        ));
    }

    #[test]
    fn test_line_display() {
        assert_eq!(Line::Green.to_string(), "green");
    }
}
