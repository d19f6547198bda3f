//! Disk I/O counters for measuring what a single operation costs the host.
//!
//! A [`Snapshot`] is a point-in-time read of the cumulative per-device
//! counters the kernel exposes in `/proc/diskstats`. Two snapshots taken
//! around an operation are reduced to an [`IoDelta`], summed over devices.

pub mod counters;
pub mod delta;
pub mod error;
pub mod snapshot;

pub use counters::IoCounters;
pub use delta::IoDelta;
pub use error::DiskstatsError;
pub use snapshot::{DiskstatsSource, Snapshot};
