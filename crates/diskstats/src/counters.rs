//! Cumulative counters for one block device.

use crate::error::DiskstatsError;
use serde::{Deserialize, Serialize};

/// Sector size the kernel uses for the diskstats sector columns,
/// regardless of the device's physical sector size.
pub const SECTOR_SIZE: u64 = 512;

/// Minimum number of whitespace-separated fields on a usable line:
/// major, minor, device name and the eleven classic counters.
pub(crate) const MIN_FIELDS: usize = 14;

/// Cumulative I/O counters of a single device.
///
/// Time values are in milliseconds. Every field except `iops_in_progress`
/// only grows until the device is reset or the host reboots.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IoCounters {
    pub read_count: u64,
    pub merged_read_count: u64,
    pub write_count: u64,
    pub merged_write_count: u64,
    pub read_bytes: u64,
    pub write_bytes: u64,
    pub read_time: u64,
    pub write_time: u64,
    /// Requests currently in flight. This is a gauge, not a counter.
    pub iops_in_progress: u64,
    pub io_time: u64,
    pub weighted_io: u64,
}

impl IoCounters {
    /// Parse the counter columns of a diskstats line.
    ///
    /// `fields` is the full whitespace-split line, `line` its 1-based number.
    /// Returns the device name and its counters, or `Ok(None)` for lines too
    /// short to carry counters.
    pub(crate) fn parse_fields<'a>(
        line: usize,
        fields: &[&'a str],
    ) -> Result<Option<(&'a str, IoCounters)>, DiskstatsError> {
        if fields.len() < MIN_FIELDS {
            return Ok(None);
        }

        let mut values = [0u64; 11];
        for (slot, token) in values.iter_mut().zip(&fields[3..MIN_FIELDS]) {
            *slot = token
                .parse::<u64>()
                .map_err(|source| DiskstatsError::Parse {
                    line,
                    token: token.to_string(),
                    source,
                })?;
        }

        let [reads, merged_reads, sectors_read, read_ms, writes, merged_writes, sectors_written, write_ms, in_progress, io_ms, weighted_ms] =
            values;

        Ok(Some((
            fields[2],
            IoCounters {
                read_count: reads,
                merged_read_count: merged_reads,
                write_count: writes,
                merged_write_count: merged_writes,
                read_bytes: sectors_read.saturating_mul(SECTOR_SIZE),
                write_bytes: sectors_written.saturating_mul(SECTOR_SIZE),
                read_time: read_ms,
                write_time: write_ms,
                iops_in_progress: in_progress,
                io_time: io_ms,
                weighted_io: weighted_ms,
            },
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn split(line: &str) -> Vec<&str> {
        line.split_whitespace().collect()
    }

    #[test]
    fn test_parse_full_line() {
        let fields = split(
            "   8       0 sda 1000 20 4096 300 2000 40 8192 600 3 700 900 0 0 0 0 10 20",
        );
        let (name, counters) = IoCounters::parse_fields(1, &fields).unwrap().unwrap();

        assert_eq!(name, "sda");
        assert_eq!(counters.read_count, 1000);
        assert_eq!(counters.merged_read_count, 20);
        assert_eq!(counters.read_bytes, 4096 * SECTOR_SIZE);
        assert_eq!(counters.read_time, 300);
        assert_eq!(counters.write_count, 2000);
        assert_eq!(counters.merged_write_count, 40);
        assert_eq!(counters.write_bytes, 8192 * SECTOR_SIZE);
        assert_eq!(counters.write_time, 600);
        assert_eq!(counters.iops_in_progress, 3);
        assert_eq!(counters.io_time, 700);
        assert_eq!(counters.weighted_io, 900);
    }

    #[test]
    fn test_short_line_is_skipped() {
        let fields = split("   1       0 ram0 0 0 0");
        assert!(IoCounters::parse_fields(1, &fields).unwrap().is_none());
    }

    #[test]
    fn test_non_numeric_counter() {
        let fields = split("8 0 sda 1 2 x 4 5 6 7 8 9 10 11");
        match IoCounters::parse_fields(7, &fields) {
            Err(DiskstatsError::Parse { line, token, .. }) => {
                assert_eq!(line, 7);
                assert_eq!(token, "x");
            }
            other => panic!("expected parse error, got {other:?}"),
        }
    }
}
