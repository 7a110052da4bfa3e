//! End-to-end simulation runs against the in-memory transport.

use apache_avro::types::Value;
use chrono::{Duration, TimeZone, Utc};
use std::io::Write;
use std::sync::Arc;
use transit_event_producer::testing::{decode_payload, MemoryTransport};
use transit_event_producer::{MemorySchemaRegistry, ProducerConfig, ProducerContext};
use transit_sim::{Simulation, SimulationOptions, SimulationReport};
use transit_sim::config::duration::parse_duration;
use transit_turnstile::{load_stations, read_stations, turnstile_schemas};

const STATIONS: &str = "\
station_id,station_name,line,avg_weekday_entries,avg_saturday_entries,avg_sunday_entries
40380,Clark/Lake,blue,17000,4600,3100
40900,Howard-Red/Purple Line,red,7200,4300,3300
40020,Harlem/Lake,green,3500,1900,1400
";

fn context() -> (ProducerContext, Arc<MemoryTransport>) {
    let transport = Arc::new(MemoryTransport::new());
    let ctx = ProducerContext::new(
        ProducerConfig::default(),
        transport.clone(),
        Arc::new(MemorySchemaRegistry::new()),
    )
    .unwrap();
    (ctx, transport)
}

fn options(steps: u64) -> SimulationOptions {
    SimulationOptions {
        start: Utc.with_ymd_and_hms(2024, 3, 5, 7, 0, 0).unwrap(),
        time_step: Duration::minutes(5),
        steps,
        sleep: std::time::Duration::ZERO,
        seed: 42,
    }
}

#[tokio::test]
async fn test_simulation_publishes_one_event_per_station_and_step() {
    let (ctx, transport) = context();
    let stations = read_stations(STATIONS.as_bytes()).unwrap();

    let mut simulation = Simulation::build(&ctx, stations, options(4)).await.unwrap();
    let report = simulation.run(std::future::pending::<()>()).await.unwrap();

    assert_eq!(
        report,
        SimulationReport {
            steps_completed: 4,
            events_published: 12,
        }
    );
    assert_eq!(transport.create_requests().len(), 3);
    assert_eq!(transport.flush_count(), 3);
    assert!(simulation
        .turnstiles()
        .iter()
        .all(|t| t.producer().is_closed()));

    let schemas = turnstile_schemas().unwrap();
    let records = transport.records_for("howard_red_and_purple_line");
    assert_eq!(records.len(), 4);

    let start = options(4).start;
    for (step, record) in records.iter().enumerate() {
        let expected = start + Duration::minutes(5 * step as i64);
        assert_eq!(
            decode_payload(schemas.key(), &record.key),
            Value::Record(vec![(
                "timestamp".to_string(),
                Value::Long(expected.timestamp_millis())
            )])
        );
    }
}

#[tokio::test]
async fn test_shutdown_stops_after_current_step() {
    let (ctx, transport) = context();
    let stations = read_stations(STATIONS.as_bytes()).unwrap();

    let mut simulation = Simulation::build(&ctx, stations, options(0)).await.unwrap();
    let report = simulation.run(async {}).await.unwrap();

    assert_eq!(report.steps_completed, 1);
    assert_eq!(transport.records().len(), 3);
}

#[tokio::test]
async fn test_delivery_failures_stop_the_simulation() {
    let transport = Arc::new(MemoryTransport::new());
    let ctx = ProducerContext::new(
        ProducerConfig {
            max_consecutive_failures: 1,
            ..Default::default()
        },
        transport.clone(),
        Arc::new(MemorySchemaRegistry::new()),
    )
    .unwrap();
    transport.fail_deliveries(true);

    let stations = read_stations(STATIONS.as_bytes()).unwrap();
    let options = SimulationOptions {
        sleep: std::time::Duration::from_millis(10),
        ..options(0)
    };
    let mut simulation = Simulation::build(&ctx, stations, options).await.unwrap();

    let err = simulation
        .run(std::future::pending::<()>())
        .await
        .unwrap_err();
    assert!(format!("{err:#}").contains("consecutive delivery failures"));
}

#[tokio::test]
async fn test_zero_time_step_is_rejected() {
    let (ctx, _) = context();
    let stations = read_stations(STATIONS.as_bytes()).unwrap();
    let result = Simulation::build(
        &ctx,
        stations,
        SimulationOptions {
            time_step: Duration::zero(),
            ..options(1)
        },
    )
    .await;
    assert!(result.is_err());
}

#[tokio::test]
async fn test_simulation_from_stations_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(STATIONS.as_bytes()).unwrap();
    file.flush().unwrap();

    let (ctx, transport) = context();
    let stations = load_stations(file.path()).unwrap();
    let mut simulation = Simulation::build(&ctx, stations, options(2)).await.unwrap();
    let report = simulation.run(std::future::pending::<()>()).await.unwrap();

    assert_eq!(report.events_published, 6);
    let mut topics: Vec<String> = transport
        .create_requests()
        .into_iter()
        .map(|spec| spec.name)
        .collect();
    topics.sort();
    assert_eq!(
        topics,
        vec!["clark_and_lake", "harlem_and_lake", "howard_red_and_purple_line"]
    );
}

#[tokio::test]
async fn test_simulated_time_overflow_is_an_error() {
    let (ctx, transport) = context();
    let stations = read_stations(STATIONS.as_bytes()).unwrap();
    let options = SimulationOptions {
        time_step: parse_duration("10000000000h").unwrap(),
        ..options(3)
    };

    let mut simulation = Simulation::build(&ctx, stations, options).await.unwrap();
    let err = simulation
        .run(std::future::pending::<()>())
        .await
        .unwrap_err();

    assert!(format!("{err:#}").contains("simulated time overflowed"));
    // The first step is still published and every turnstile is closed
    assert_eq!(transport.records().len(), 3);
    assert!(simulation
        .turnstiles()
        .iter()
        .all(|t| t.producer().is_closed()));
}

#[tokio::test]
async fn test_simulation_runs_on_spawned_task() {
    let (ctx, _) = context();
    let stations = read_stations(STATIONS.as_bytes()).unwrap();
    let mut simulation = Simulation::build(&ctx, stations, options(2)).await.unwrap();

    let report = tokio::spawn(async move { simulation.run(std::future::pending::<()>()).await })
        .await
        .unwrap()
        .unwrap();
    assert_eq!(report.steps_completed, 2);
}

#[tokio::test]
async fn test_close_failure_still_closes_every_turnstile() {
    let (ctx, transport) = context();
    let stations = read_stations(STATIONS.as_bytes()).unwrap();
    let mut simulation = Simulation::build(&ctx, stations, options(1)).await.unwrap();
    transport.fail_flush(true);

    let err = simulation
        .run(std::future::pending::<()>())
        .await
        .unwrap_err();

    assert!(format!("{err:#}").contains("Failed to close turnstile 'clark_and_lake'"));
    assert_eq!(transport.flush_count(), 3);
    assert!(simulation
        .turnstiles()
        .iter()
        .all(|t| t.producer().is_closed()));
}
