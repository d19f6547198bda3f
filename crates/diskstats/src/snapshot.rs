//! Point-in-time snapshots of all devices' counters.

use crate::counters::IoCounters;
use crate::error::DiskstatsError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::debug;

const DEFAULT_PROC_ROOT: &str = "/proc";

/// Where snapshots are read from.
///
/// Point `proc_root` at a mounted host /proc when measuring from inside a
/// container.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiskstatsSource {
    pub proc_root: PathBuf,
}

impl DiskstatsSource {
    pub fn new(proc_root: impl Into<PathBuf>) -> Self {
        Self {
            proc_root: proc_root.into(),
        }
    }

    pub fn diskstats_path(&self) -> PathBuf {
        self.proc_root.join("diskstats")
    }
}

impl Default for DiskstatsSource {
    fn default() -> Self {
        Self::new(DEFAULT_PROC_ROOT)
    }
}

/// Counters of every device, keyed by device name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    devices: BTreeMap<String, IoCounters>,
}

impl Snapshot {
    /// Read the current counters from `source`.
    pub fn capture(source: &DiskstatsSource) -> Result<Self, DiskstatsError> {
        let path = source.diskstats_path();
        let contents = read_file(&path)?;
        let snapshot = Self::parse(&contents)?;
        debug!(
            "Captured diskstats snapshot of {} devices from {}",
            snapshot.len(),
            path.display()
        );
        Ok(snapshot)
    }

    /// Parse the contents of a diskstats file.
    pub fn parse(contents: &str) -> Result<Self, DiskstatsError> {
        let mut devices = BTreeMap::new();

        for (index, line) in contents.lines().enumerate() {
            let fields: Vec<&str> = line.split_whitespace().collect();
            if let Some((name, counters)) = IoCounters::parse_fields(index + 1, &fields)? {
                devices.insert(name.to_string(), counters);
            }
        }

        Ok(Self { devices })
    }

    /// Keep only the named devices. An empty list keeps everything.
    ///
    /// Fails without modifying the snapshot if any name is not a device here.
    pub fn retain_devices(&mut self, names: &[String]) -> Result<(), DiskstatsError> {
        if names.is_empty() {
            return Ok(());
        }

        let unknown: Vec<String> = names
            .iter()
            .filter(|name| !self.devices.contains_key(name.as_str()))
            .cloned()
            .collect();
        if !unknown.is_empty() {
            return Err(DiskstatsError::UnknownDevices(unknown));
        }

        self.devices.retain(|device, _| names.iter().any(|n| n == device));
        Ok(())
    }

    pub fn get(&self, device: &str) -> Option<&IoCounters> {
        self.devices.get(device)
    }

    pub fn devices(&self) -> impl Iterator<Item = (&str, &IoCounters)> {
        self.devices.iter().map(|(name, c)| (name.as_str(), c))
    }

    pub fn len(&self) -> usize {
        self.devices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.devices.is_empty()
    }
}

fn read_file(path: &Path) -> Result<String, DiskstatsError> {
    std::fs::read_to_string(path).map_err(|source| DiskstatsError::Io {
        path: path.to_path_buf(),
        source,
    })
}
