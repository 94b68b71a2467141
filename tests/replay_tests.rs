//! Scenario files replayed end to end through the ad-aware pipeline.

mod common;

use std::io::Write;

use common::config;
use playback_telemetry::backend::MemoryBackend;
use playback_telemetry::hub::HubCoreAds;
use playback_telemetry::metricalc::MetricalcCore;
use playback_telemetry::replay::Scenario;
use playback_telemetry::{Action, Attribute, Instrument, TelemetryError};

const SESSION: &str = r#"
[[trackers]]
name = "content"
target = "html5"

[[trackers]]
name = "ads"
ads = true
ignore = ["AdPauseBegin"]

[[steps]]
tracker = "content"
action = "MediaRequest"

[[steps]]
tracker = "content"
action = "Start"
position_ms = 0

[[steps]]
tracker = "content"
action = "Start"

[[steps]]
tracker = "ads"
action = "AdBreakBegin"
position_ms = 0

[[steps]]
tracker = "ads"
action = "AdPauseBegin"

[[steps]]
tracker = "content"
action = "End"
position_ms = 30000

[[steps]]
tracker = "ads"
action = "AdBreakFinish"

[[steps]]
tracker = "content"
action = "End"
position_ms = 30000
"#;

fn instrument() -> (Instrument, MemoryBackend) {
    let backend = MemoryBackend::new();
    let instrument = Instrument::new(&config("replay"))
        .with_hub(HubCoreAds::new())
        .with_metricalc(MetricalcCore::new())
        .with_backend(backend.clone());
    (instrument, backend)
}

#[test]
fn test_replay_report_counts() {
    let scenario = Scenario::from_toml_str(SESSION).unwrap();
    let (mut instrument, backend) = instrument();
    let report = tokio_test::block_on(scenario.run(&mut instrument, 0.0)).unwrap();

    assert_eq!(report.steps, 8);
    // second Start and the End inside the ad break
    assert_eq!(report.rejected, 2);
    assert_eq!(report.vetoed, 1);
    assert_eq!(report.delivered, 5);
    assert_eq!(report.dropped, 0);

    let actions = backend.actions();
    assert_eq!(&actions[..2], &[Action::TRACKER_INIT, Action::TRACKER_INIT]);
    assert_eq!(actions.last(), Some(&Action::END));
    assert_eq!(
        backend.last_event().unwrap().get_u64(&Attribute::POSITION),
        Some(30_000)
    );
}

#[test]
fn test_replay_from_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(SESSION.as_bytes()).unwrap();

    let scenario = Scenario::from_file(file.path()).unwrap();
    assert_eq!(scenario.trackers.len(), 2);
    assert_eq!(scenario.steps.len(), 8);
}

#[test]
fn test_missing_file_is_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let err = Scenario::from_file(dir.path().join("absent.toml")).unwrap_err();
    assert!(matches!(err, TelemetryError::Io { .. }));
}

#[test]
fn test_invalid_scenario_leaves_instrument_untouched() {
    let scenario = Scenario {
        trackers: Vec::new(),
        steps: vec![playback_telemetry::replay::Step {
            tracker: "ghost".into(),
            action: "Start".into(),
            wait_ms: 0,
            position_ms: None,
        }],
    };
    let (mut instrument, backend) = instrument();
    let result = tokio_test::block_on(scenario.run(&mut instrument, 0.0));
    assert!(matches!(result, Err(TelemetryError::UnknownScenarioTracker { .. })));
    assert!(instrument.tracker_ids().is_empty());
    assert!(backend.events().is_empty());
}

#[tokio::test]
async fn test_replay_waits_between_steps() {
    let toml = r#"
[[trackers]]
name = "content"

[[steps]]
tracker = "content"
action = "PlayerSet"

[[steps]]
tracker = "content"
action = "StreamLoad"
wait_ms = 40
"#;
    let scenario = Scenario::from_toml_str(toml).unwrap();
    let (mut instrument, backend) = instrument();
    let started = std::time::Instant::now();
    let report = scenario.run(&mut instrument, 2.0).await.unwrap();
    assert!(started.elapsed() >= std::time::Duration::from_millis(20));
    assert_eq!(report.delivered, 2);

    let load = backend.last_event().unwrap();
    assert!(load.get_u64(&Action::PLAYER_SET.time_since_attribute()).unwrap() >= 20);
}
