//! Differences between two snapshots.

use crate::counters::IoCounters;
use crate::snapshot::Snapshot;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Counter deltas summed over every device seen in both snapshots.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IoDelta {
    pub read_count: u64,
    pub merged_read_count: u64,
    pub write_count: u64,
    pub merged_write_count: u64,
    pub read_bytes: u64,
    pub write_bytes: u64,
    pub read_time: u64,
    pub write_time: u64,
    pub iops_in_progress: u64,
    pub io_time: u64,
    pub weighted_io: u64,
    /// Devices whose cumulative counters went backwards during the window.
    /// Their decreasing fields contribute zero.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub reset_devices: Vec<String>,
}

impl IoDelta {
    /// Sum per-device differences from `before` to `after`.
    ///
    /// Devices that disappeared between the two snapshots are skipped, as are
    /// devices that only appear in `after`. Every field saturates at zero.
    pub fn between(before: &Snapshot, after: &Snapshot) -> Self {
        let mut delta = IoDelta::default();

        for (device, old) in before.devices() {
            let Some(new) = after.get(device) else {
                debug!("Device {} vanished between snapshots", device);
                continue;
            };

            if went_backwards(old, new) {
                delta.reset_devices.push(device.to_string());
            }

            delta.read_count += new.read_count.saturating_sub(old.read_count);
            delta.merged_read_count += new
                .merged_read_count
                .saturating_sub(old.merged_read_count);
            delta.write_count += new.write_count.saturating_sub(old.write_count);
            delta.merged_write_count += new
                .merged_write_count
                .saturating_sub(old.merged_write_count);
            delta.read_bytes += new.read_bytes.saturating_sub(old.read_bytes);
            delta.write_bytes += new.write_bytes.saturating_sub(old.write_bytes);
            delta.read_time += new.read_time.saturating_sub(old.read_time);
            delta.write_time += new.write_time.saturating_sub(old.write_time);
            delta.iops_in_progress += new.iops_in_progress.saturating_sub(old.iops_in_progress);
            delta.io_time += new.io_time.saturating_sub(old.io_time);
            delta.weighted_io += new.weighted_io.saturating_sub(old.weighted_io);
        }

        delta
    }

    /// The eleven metrics in report order.
    pub fn metrics(&self) -> [(&'static str, u64); 11] {
        [
            ("ReadCount", self.read_count),
            ("MergedReadCount", self.merged_read_count),
            ("WriteCount", self.write_count),
            ("MergedWriteCount", self.merged_write_count),
            ("ReadBytes", self.read_bytes),
            ("WriteBytes", self.write_bytes),
            ("ReadTime", self.read_time),
            ("WriteTime", self.write_time),
            ("IopsInProgress", self.iops_in_progress),
            ("IoTime", self.io_time),
            ("WeightedIO", self.weighted_io),
        ]
    }

    pub fn has_resets(&self) -> bool {
        !self.reset_devices.is_empty()
    }
}

// iops_in_progress is a gauge and may legitimately drop.
fn went_backwards(old: &IoCounters, new: &IoCounters) -> bool {
    new.read_count < old.read_count
        || new.merged_read_count < old.merged_read_count
        || new.write_count < old.write_count
        || new.merged_write_count < old.merged_write_count
        || new.read_bytes < old.read_bytes
        || new.write_bytes < old.write_bytes
        || new.read_time < old.read_time
        || new.write_time < old.write_time
        || new.io_time < old.io_time
        || new.weighted_io < old.weighted_io
}

#[cfg(test)]
mod tests {
    use super::*;

    const BEFORE: &str = "\
   8       0 sda 100 10 800 50 200 20 1600 70 2 90 120
   8      16 sdb 10 0 80 5 20 0 160 7 0 9 12
 259       0 nvme0n1 1 0 8 1 1 0 8 1 0 1 1
";

    const AFTER: &str = "\
   8       0 sda 110 11 880 55 260 25 2080 90 0 110 150
   8      16 sdb 15 1 120 6 21 0 168 8 1 10 14
   8      32 sdc 999 999 999 999 999 999 999 999 999 999 999
";

    #[test]
    fn test_sums_across_devices() {
        let before = Snapshot::parse(BEFORE).unwrap();
        let after = Snapshot::parse(AFTER).unwrap();
        let delta = IoDelta::between(&before, &after);

        assert_eq!(delta.read_count, 10 + 5);
        assert_eq!(delta.merged_read_count, 1 + 1);
        assert_eq!(delta.write_count, 60 + 1);
        assert_eq!(delta.merged_write_count, 5);
        assert_eq!(delta.read_bytes, (80 + 40) * 512);
        assert_eq!(delta.write_bytes, (480 + 8) * 512);
        assert_eq!(delta.read_time, 5 + 1);
        assert_eq!(delta.write_time, 20 + 1);
        // sda's gauge dropped from 2 to 0, sdb's rose from 0 to 1
        assert_eq!(delta.iops_in_progress, 1);
        assert_eq!(delta.io_time, 20 + 1);
        assert_eq!(delta.weighted_io, 30 + 2);
        assert!(!delta.has_resets());
    }

    #[test]
    fn test_identical_snapshots_give_zero() {
        let snapshot = Snapshot::parse(BEFORE).unwrap();
        let delta = IoDelta::between(&snapshot, &snapshot);
        assert!(delta.metrics().iter().all(|(_, value)| *value == 0));
    }

    #[test]
    fn test_reset_device_saturates() {
        let before = Snapshot::parse("8 0 sda 100 0 800 50 200 0 1600 70 0 90 120").unwrap();
        let after = Snapshot::parse("8 0 sda 5 0 40 2 210 0 1680 71 0 91 121").unwrap();
        let delta = IoDelta::between(&before, &after);

        assert_eq!(delta.read_count, 0);
        assert_eq!(delta.read_bytes, 0);
        assert_eq!(delta.write_count, 10);
        assert_eq!(delta.reset_devices, vec!["sda".to_string()]);
    }

    #[test]
    fn test_metric_names_in_report_order() {
        let names: Vec<&str> = IoDelta::default()
            .metrics()
            .iter()
            .map(|(name, _)| *name)
            .collect();
        assert_eq!(
            names,
            vec![
                "ReadCount",
                "MergedReadCount",
                "WriteCount",
                "MergedWriteCount",
                "ReadBytes",
                "WriteBytes",
                "ReadTime",
                "WriteTime",
                "IopsInProgress",
                "IoTime",
                "WeightedIO",
            ]
        );
    }
}
