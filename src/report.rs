//! Reporting a measurement.

use crate::measure::DropMeasurement;
use anyhow::{Context, Result};
use tracing::{info, warn};

/// The report lines: elapsed time first, then one line per I/O metric.
pub fn format_lines(measurement: &DropMeasurement) -> Vec<String> {
    let mut lines = Vec::with_capacity(12);
    lines.push(format!("drop table takes {:?}", measurement.elapsed));
    for (name, value) in measurement.io.metrics() {
        lines.push(format!("drop table cause {name} {value}"));
    }
    lines
}

/// Log the report at info level, plus warnings for anything that makes the
/// numbers suspect.
pub fn log_report(measurement: &DropMeasurement) {
    if let Some(error) = &measurement.drop_error {
        warn!(
            "Drop of {} failed, numbers below cover the failed attempt: {}",
            measurement.table, error
        );
    }
    if measurement.io.has_resets() {
        warn!(
            "Counters went backwards on {:?}; their decreasing fields count as zero",
            measurement.io.reset_devices
        );
    }
    for line in format_lines(measurement) {
        info!("{}", line);
    }
}

/// Pretty-printed JSON form of the measurement.
pub fn to_json(measurement: &DropMeasurement) -> Result<String> {
    serde_json::to_string_pretty(measurement).context("Failed to serialize measurement")
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use diskstats::IoDelta;
    use std::time::Duration;

    fn measurement() -> DropMeasurement {
        DropMeasurement {
            table: "TEST_TABLE".to_string(),
            started_at: Utc::now(),
            elapsed: Duration::from_millis(1500),
            elapsed_ms: 1500.0,
            io: IoDelta {
                read_count: 3,
                write_count: 42,
                write_bytes: 4096,
                weighted_io: 7,
                ..IoDelta::default()
            },
            drop_error: None,
        }
    }

    #[test]
    fn test_format_lines() {
        let lines = format_lines(&measurement());

        assert_eq!(lines.len(), 12);
        assert_eq!(lines[0], "drop table takes 1.5s");
        assert_eq!(lines[1], "drop table cause ReadCount 3");
        assert_eq!(lines[3], "drop table cause WriteCount 42");
        assert_eq!(lines[6], "drop table cause WriteBytes 4096");
        assert_eq!(lines[11], "drop table cause WeightedIO 7");
    }

    #[test]
    fn test_to_json() {
        let json = to_json(&measurement()).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();

        assert_eq!(value["table"], "TEST_TABLE");
        assert_eq!(value["elapsed_ms"], 1500.0);
        assert_eq!(value["io"]["write_count"], 42);
        assert!(value.get("elapsed").is_none());
        assert!(value.get("drop_error").is_none());
        assert!(value["io"].get("reset_devices").is_none());
    }

    #[test]
    fn test_to_json_with_drop_error() {
        let mut failed = measurement();
        failed.drop_error = Some("MySQL error: gone away".to_string());
        let json = to_json(&failed).unwrap();
        assert!(json.contains("\"drop_error\": \"MySQL error: gone away\""));
    }
}
