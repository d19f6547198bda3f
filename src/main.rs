//! Command-line interface for mysql-drop-io
//!
//! # Usage Examples
//!
//! ## Single drop
//! ```bash
//! mysql-drop-io drop \
//!   --dsn 'root:password@tcp(127.0.0.1:3306)/database' \
//!   --table TEST_TABLE
//! ```
//!
//! ## Measure against an existing server
//! ```bash
//! # Bloat TEST_TABLE to 1 GiB, drop it and report disk I/O
//! mysql-drop-io measure \
//!   --dsn 'root:password@tcp(127.0.0.1:3306)/database' \
//!   --exponent 20 \
//!   --device nvme0n1
//! ```
//!
//! ## Measure against a throwaway container
//! ```bash
//! mysql-drop-io bench --image 8.0.35 --exponent 10 --json
//! ```

use anyhow::Context;
use clap::{Parser, Subcommand};
use mysql_drop::testing::{MySQLContainer, MySQLImage};
use mysql_drop::{normal_drop, TableName};
use mysql_drop_io::{report, run_measurement, DropMeasurement, MeasureOpts, MySQLOpts};
use std::time::Instant;

#[derive(Parser)]
#[command(name = "mysql-drop-io")]
#[command(about = "Measure the disk I/O cost of dropping a large MySQL table")]
#[command(long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Drop a table once and report how long it took
    Drop {
        #[command(flatten)]
        mysql: MySQLOpts,

        /// Table to drop
        #[arg(long, env = "DROP_TABLE_NAME", default_value = mysql_drop::DEFAULT_TABLE_NAME)]
        table: TableName,
    },

    /// Bloat a table on an existing server, drop it and report disk I/O
    Measure {
        #[command(flatten)]
        mysql: MySQLOpts,

        #[command(flatten)]
        measure: MeasureOpts,
    },

    /// Start a MySQL container, then bloat, drop and report as `measure` does
    Bench {
        /// MySQL server version to run
        #[arg(long, value_enum, default_value_t = MySQLImage::Mysql8_2_0)]
        image: MySQLImage,

        /// Host port mapped to the container's 3306
        #[arg(long, default_value = "13306")]
        port: u16,

        /// Docker container name
        #[arg(long, default_value = "mysql-drop-io")]
        container_name: String,

        /// Seconds to wait for the server to accept connections
        #[arg(long, default_value = "120")]
        ready_timeout: u64,

        #[command(flatten)]
        measure: MeasureOpts,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    if let Err(e) = run().await {
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }
    Ok(())
}

async fn run() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Drop { mysql, table } => run_drop(&mysql, &table).await,
        Commands::Measure { mysql, measure } => {
            let measurement = run_measurement(&mysql, &measure).await?;
            finish(&measurement, measure.json)
        }
        Commands::Bench {
            image,
            port,
            container_name,
            ready_timeout,
            measure,
        } => {
            // Removed again when `container` goes out of scope, on every path
            let container = MySQLContainer::new(&container_name, image, port);
            container.start()?;
            if let Err(e) = container.wait_until_ready(ready_timeout).await {
                if let Ok(logs) = container.get_logs() {
                    tracing::debug!("Container logs:\n{}", logs);
                }
                return Err(e);
            }

            let mysql = MySQLOpts {
                dsn: container.config().clone(),
            };
            let measurement = run_measurement(&mysql, &measure).await?;
            finish(&measurement, measure.json)
        }
    }
}

async fn run_drop(mysql: &MySQLOpts, table: &TableName) -> anyhow::Result<()> {
    tracing::info!("Connecting to MySQL at {}", mysql.dsn);
    let pool = mysql_async::Pool::new(mysql.dsn.opts());
    let mut conn = pool
        .get_conn()
        .await
        .with_context(|| format!("Failed to connect to {}", mysql.dsn))?;

    let start = Instant::now();
    let result = normal_drop(&mut conn, table).await;
    tracing::info!("drop table takes {:?}", start.elapsed());

    drop(conn);
    pool.disconnect().await?;

    result.with_context(|| format!("Failed to drop table {table}"))
}

/// Report the measurement and turn a failed drop into a non-zero exit,
/// after the numbers have been printed.
fn finish(measurement: &DropMeasurement, json: bool) -> anyhow::Result<()> {
    report::log_report(measurement);
    if json {
        println!("{}", report::to_json(measurement)?);
    }

    if let Some(error) = &measurement.drop_error {
        anyhow::bail!("Drop of {} failed: {error}", measurement.table);
    }
    Ok(())
}
