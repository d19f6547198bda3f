//! Growing a table to a target size before it is dropped.
//!
//! Every row is about 1 KiB, and each bloat round inserts the table into
//! itself, so `n` rounds leave exactly `2^n` rows, roughly `2^n` KiB of data.
//! Past 1 GiB InnoDB typically needs about 30% more on disk than that.

use crate::drop::normal_drop;
use crate::error::DropError;
use crate::table::TableName;
use mysql_async::prelude::*;
use mysql_async::Conn;
use std::time::Instant;
use tracing::{debug, info};

pub const SIZE_1KB: u32 = 0;
pub const SIZE_1MB: u32 = SIZE_1KB + 10;
pub const SIZE_1GB: u32 = SIZE_1MB + 10;
pub const SIZE_16GB: u32 = SIZE_1GB + 4;

/// Largest exponent accepted by [`create_table`].
pub const MAX_EXPONENT: u32 = 40;

const ROW_SIZE_BYTES: u64 = 1024;

/// Generate the CREATE TABLE statement for the fixed wide-row shape.
pub fn generate_create_table(table: &TableName) -> String {
    format!(
        "CREATE TABLE IF NOT EXISTS {} (a INT,b CHAR(255),c CHAR(255),d CHAR(255),e CHAR(255)) charset=latin1",
        table.quoted()
    )
}

/// Generate the INSERT of the single seed row.
pub fn generate_seed_row(table: &TableName) -> String {
    format!(
        "INSERT INTO {} VALUES(1,repeat('x', 255),repeat('x', 255),repeat('x', 255),repeat('x', 255))",
        table.quoted()
    )
}

/// Generate the self-insert that doubles the row count.
pub fn generate_bloat_round(table: &TableName) -> String {
    let quoted = table.quoted();
    format!("INSERT INTO {quoted} SELECT * FROM {quoted}")
}

/// Row count after bloating with `exponent` rounds.
///
/// Exponents above [`MAX_EXPONENT`] are rejected.
pub fn expected_rows(exponent: u32) -> Result<u64, DropError> {
    if exponent > MAX_EXPONENT {
        return Err(DropError::InvalidExponent(exponent));
    }
    Ok(1u64 << exponent)
}

/// Approximate data size after bloating, excluding storage engine overhead.
pub fn approx_size_bytes(exponent: u32) -> Result<u64, DropError> {
    Ok(expected_rows(exponent)? * ROW_SIZE_BYTES)
}

/// Recreate `table` and bloat it to `2^exponent` rows.
///
/// Any existing table of the same name is dropped first. The first SQL error
/// aborts the procedure and leaves the table partially bloated.
pub async fn create_table(
    conn: &mut Conn,
    table: &TableName,
    exponent: u32,
) -> Result<(), DropError> {
    let rows = expected_rows(exponent)?;

    info!(
        "Creating table {} with {} rows (~{} bytes)",
        table,
        rows,
        rows * ROW_SIZE_BYTES
    );
    let start = Instant::now();

    normal_drop(conn, table).await?;
    conn.query_drop(generate_create_table(table)).await?;
    conn.query_drop(generate_seed_row(table)).await?;

    let bloat_sql = generate_bloat_round(table);
    for round in 1..=exponent {
        conn.query_drop(bloat_sql.as_str()).await?;
        debug!("Bloat round {}/{}: {} rows", round, exponent, 1u64 << round);
    }

    info!("Created table {} in {:?}", table, start.elapsed());
    Ok(())
}

/// Count the rows currently in `table`.
pub async fn row_count(conn: &mut Conn, table: &TableName) -> Result<u64, DropError> {
    let count: Option<u64> = conn
        .query_first(format!("SELECT COUNT(*) FROM {}", table.quoted()))
        .await?;
    Ok(count.unwrap_or(0))
}
