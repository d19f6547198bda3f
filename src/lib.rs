//! MySQL drop-table I/O measurement
//!
//! Measures how much disk I/O the host performs while MySQL drops a large
//! table. A table is bloated to `2^n` rows of about 1 KiB each, the kernel's
//! per-device disk counters are read, the table is dropped and timed, and the
//! counters are read again.
//!
//! # Crates
//!
//! - `diskstats` - per-device cumulative I/O counters and deltas
//! - `mysql_drop` - the drop operation, the bloat procedure, DSN parsing and a
//!   docker-backed MySQL container
//!
//! # CLI Usage
//!
//! ```bash
//! # Against an existing server, 1 GiB table
//! mysql-drop-io measure --dsn 'root:password@tcp(127.0.0.1:3306)/database' --exponent 20
//!
//! # Provision MySQL 5.7.44 in docker and run against it
//! mysql-drop-io bench --image 5.7.44 --exponent 10 --json
//! ```

use clap::{Args, Parser};
use mysql_drop::{MySQLConfig, TableName, MAX_EXPONENT, SIZE_1GB};
use std::path::PathBuf;

pub mod measure;
pub mod report;

pub use measure::{measure, measure_drop, run_measurement, DropMeasurement};

/// MySQL connection options
#[derive(Parser, Clone, Debug)]
pub struct MySQLOpts {
    /// MySQL DSN (e.g., user:password@tcp(host:port)/database)
    #[arg(
        long,
        env = "MYSQL_DSN",
        default_value = "root:password@tcp(127.0.0.1:3306)/database"
    )]
    pub dsn: MySQLConfig,
}

/// Options controlling what is bloated, dropped and measured
#[derive(Args, Clone, Debug)]
pub struct MeasureOpts {
    /// Table to bloat and drop
    #[arg(long, env = "DROP_TABLE_NAME", default_value = mysql_drop::DEFAULT_TABLE_NAME)]
    pub table: TableName,

    /// Bloat rounds; the table ends up with 2^exponent rows of ~1 KiB
    /// (10 = 1 MiB, 20 = 1 GiB, 24 = 16 GiB)
    #[arg(
        long,
        default_value_t = SIZE_1GB,
        value_parser = clap::value_parser!(u32).range(0..=MAX_EXPONENT as i64)
    )]
    pub exponent: u32,

    /// Drop the table as it is, without recreating and bloating it first
    #[arg(long)]
    pub skip_bloat: bool,

    /// Only count these devices (comma-separated, empty = all devices)
    #[arg(long, value_delimiter = ',')]
    pub device: Vec<String>,

    /// Root of the proc filesystem to read diskstats from
    #[arg(long, env = "HOST_PROC")]
    pub proc_root: Option<PathBuf>,

    /// Print the measurement as JSON on stdout
    #[arg(long)]
    pub json: bool,
}

impl MeasureOpts {
    pub fn diskstats_source(&self) -> diskstats::DiskstatsSource {
        match &self.proc_root {
            Some(root) => diskstats::DiskstatsSource::new(root),
            None => diskstats::DiskstatsSource::default(),
        }
    }
}
