use biogenesis_core::{ConfigError, CoreConfig, LogLevel, StatusReporter};
use serde_json::json;
use std::fs;
use std::time::Duration;

#[test]
fn log_is_bounded_and_newest_first() {
    let reporter = StatusReporter::new(5, 2, LogLevel::Debug);
    for index in 0..20 {
        reporter.log(LogLevel::Info, format!("entry {index}"));
    }

    let entries = reporter.entries();
    assert_eq!(entries.len(), 5);
    assert_eq!(entries[0].message, "entry 19");
    assert_eq!(entries[4].message, "entry 15");
}

#[test]
fn error_queue_drops_oldest_but_counter_keeps_counting() {
    let reporter = StatusReporter::new(50, 2, LogLevel::Debug);
    for code in [500, 501, 502] {
        reporter.report_error(&"boom", "unit", code);
    }

    let errors = reporter.errors();
    assert_eq!(errors.len(), 2);
    assert_eq!(errors[0].status_code, 501);
    assert_eq!(errors[1].status_code, 502);
    assert_eq!(reporter.critical_count(), 3);
    assert!(reporter.last_report_at().is_some());

    reporter.reset();
    assert_eq!(reporter.critical_count(), 0);
    assert_eq!(reporter.entries()[0].level, LogLevel::Warn);
}

#[test]
fn display_line_caps_context_excerpt() {
    let reporter = StatusReporter::new(10, 2, LogLevel::Debug);
    reporter.log_with(
        LogLevel::Error,
        "payload",
        json!({ "blob": "x".repeat(400) }),
    );
    let entry = &reporter.entries()[0];

    let plain = entry.display_line(false);
    assert!(plain.starts_with("[ERROR] "));
    assert!(plain.ends_with(": payload"));

    let detailed = entry.display_line(true);
    assert!(detailed.contains("(data: "));
    assert!(detailed.len() < plain.len() + 170);
}

#[test]
fn config_file_overrides_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("biogenesis.json");
    fs::write(
        &path,
        r#"{ "dataset_size": 12, "debounce_ms": 100, "failure_rate": 0.0, "map": { "zoom": 4 } }"#,
    )
    .unwrap();

    let config = CoreConfig::load(&path).unwrap();
    assert_eq!(config.dataset_size, 12);
    assert_eq!(config.debounce(), Duration::from_millis(100));
    assert_eq!(config.failure_rate, 0.0);
    assert_eq!(config.map.zoom, 4);
    assert_eq!(config.max_results, 20);
}

#[test]
fn config_rejects_bad_values_and_missing_files() {
    let dir = tempfile::tempdir().unwrap();
    let missing = CoreConfig::load(&dir.path().join("absent.json"));
    assert!(matches!(missing, Err(ConfigError::Io { .. })));

    let inverted = CoreConfig::from_json_str(r#"{ "latency_min_ms": 900, "latency_max_ms": 100 }"#);
    assert!(matches!(inverted, Err(ConfigError::Invalid(_))));

    let garbage = CoreConfig::from_json_str("{ not json");
    assert!(matches!(garbage, Err(ConfigError::Parse(_))));
}
