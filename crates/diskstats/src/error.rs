//! Error types for reading disk statistics.

use std::num::ParseIntError;
use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while capturing a snapshot.
#[derive(Error, Debug)]
pub enum DiskstatsError {
    /// The diskstats file could not be read.
    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A line had a counter that is not an unsigned integer.
    #[error("Malformed diskstats line {line}: invalid counter '{token}': {source}")]
    Parse {
        line: usize,
        token: String,
        #[source]
        source: ParseIntError,
    },

    /// Devices were requested that the snapshot does not contain.
    #[error("Unknown devices: {}", .0.join(", "))]
    UnknownDevices(Vec<String>),
}
