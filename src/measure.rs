//! Timing a drop and diffing disk counters around it.

use crate::{MeasureOpts, MySQLOpts};
use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use diskstats::{DiskstatsSource, IoDelta, Snapshot};
use mysql_async::{Conn, Pool};
use mysql_drop::{create_table, expected_rows, normal_drop, row_count, DropError, TableName};
use serde::Serialize;
use std::future::Future;
use std::time::{Duration, Instant};
use tracing::{info, warn};

/// Outcome of a single timed drop.
#[derive(Debug, Clone, Serialize)]
pub struct DropMeasurement {
    pub table: String,
    pub started_at: DateTime<Utc>,
    #[serde(skip)]
    pub elapsed: Duration,
    pub elapsed_ms: f64,
    pub io: IoDelta,
    /// Set when the drop itself failed. Timing and counters are still valid
    /// for whatever the server did before failing.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub drop_error: Option<String>,
}

impl DropMeasurement {
    pub fn succeeded(&self) -> bool {
        self.drop_error.is_none()
    }
}

/// Snapshot, await `drop_op` under a timer, snapshot again.
///
/// `drop_op` must not have been polled yet. A failing `drop_op` does not
/// abort the measurement; its error is kept in the result. Failing to read
/// the counters, or a requested device that does not exist, does; in that
/// case `drop_op` is never run.
pub async fn measure<Fut>(
    source: &DiskstatsSource,
    devices: &[String],
    table: &TableName,
    drop_op: Fut,
) -> Result<DropMeasurement>
where
    Fut: Future<Output = Result<(), DropError>>,
{
    let mut before = Snapshot::capture(source)
        .context("Failed to capture disk I/O counters before drop")?;
    before
        .retain_devices(devices)
        .context("Cannot restrict the measurement to the requested devices")?;

    let started_at = Utc::now();
    let start = Instant::now();
    let result = drop_op.await;
    let elapsed = start.elapsed();

    // Only devices in `before` are summed, so `after` needs no filtering
    let after = Snapshot::capture(source)
        .context("Failed to capture disk I/O counters after drop")?;
    let io = IoDelta::between(&before, &after);

    let drop_error = match result {
        Ok(()) => None,
        Err(e) => {
            warn!("Dropping table {} failed: {}", table, e);
            Some(e.to_string())
        }
    };

    Ok(DropMeasurement {
        table: table.to_string(),
        started_at,
        elapsed,
        elapsed_ms: elapsed.as_secs_f64() * 1000.0,
        io,
        drop_error,
    })
}

/// Measure [`normal_drop`] of `table` over `conn`.
pub async fn measure_drop(
    conn: &mut Conn,
    table: &TableName,
    source: &DiskstatsSource,
    devices: &[String],
) -> Result<DropMeasurement> {
    measure(source, devices, table, normal_drop(conn, table)).await
}

/// Connect, bloat the table unless told not to, and measure dropping it.
pub async fn run_measurement(mysql: &MySQLOpts, opts: &MeasureOpts) -> Result<DropMeasurement> {
    info!("Connecting to MySQL at {}", mysql.dsn);
    let pool = Pool::new(mysql.dsn.opts());
    let mut conn = pool
        .get_conn()
        .await
        .with_context(|| format!("Failed to connect to {}", mysql.dsn))?;

    if opts.skip_bloat {
        info!("Skipping bloat, dropping {} as it is", opts.table);
    } else {
        create_table(&mut conn, &opts.table, opts.exponent)
            .await
            .with_context(|| format!("Failed to create table {}", opts.table))?;

        let rows = row_count(&mut conn, &opts.table).await?;
        let expected = expected_rows(opts.exponent)?;
        if rows != expected {
            anyhow::bail!(
                "Table {} has {rows} rows after bloating, expected {expected}",
                opts.table
            );
        }
    }

    let measurement = measure_drop(
        &mut conn,
        &opts.table,
        &opts.diskstats_source(),
        &opts.device,
    )
    .await?;

    drop(conn);
    pool.disconnect()
        .await
        .context("Failed to disconnect pool")?;

    Ok(measurement)
}
