//! Integration tests for the drop operation and the bloat procedure
//!
//! Each test starts its own MySQL container on a dedicated port.

use anyhow::Result;
use mysql_drop::testing::{MySQLContainer, MySQLImage};
use mysql_drop::{create_table, expected_rows, normal_drop, row_count, TableName, SIZE_1MB};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Ports that don't conflict with a local MySQL
const IDEMPOTENCE_PORT: u16 = 13316;
const BLOAT_PORT: u16 = 13317;

fn init_logging() {
    let _ = tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .try_init();
}

#[tokio::test]
async fn test_drop_is_idempotent() -> Result<()> {
    init_logging();

    let container = MySQLContainer::new(
        "drop-io-idempotence",
        MySQLImage::Mysql8_0_35,
        IDEMPOTENCE_PORT,
    );
    container.start()?;
    container.wait_until_ready(120).await?;

    let pool = container.get_pool();
    let mut conn = pool.get_conn().await?;

    // Never created
    let missing = TableName::new("never_created")?;
    normal_drop(&mut conn, &missing).await?;
    normal_drop(&mut conn, &missing).await?;

    let table = TableName::new("drop_twice")?;
    create_table(&mut conn, &table, 0).await?;
    assert_eq!(row_count(&mut conn, &table).await?, 1);

    normal_drop(&mut conn, &table).await?;
    normal_drop(&mut conn, &table).await?;
    info!("Dropped {} twice without error", table);

    drop(conn);
    pool.disconnect().await?;
    Ok(())
}

#[tokio::test]
async fn test_bloat_doubles_rows() -> Result<()> {
    init_logging();

    let container = MySQLContainer::new("drop-io-bloat", MySQLImage::Mysql8_2_0, BLOAT_PORT);
    container.start()?;
    container.wait_until_ready(120).await?;

    let pool = container.get_pool();
    let mut conn = pool.get_conn().await?;
    let table = TableName::default();

    create_table(&mut conn, &table, SIZE_1MB).await?;
    let rows = row_count(&mut conn, &table).await?;
    assert_eq!(rows, expected_rows(SIZE_1MB)?);
    assert_eq!(rows, 1024);

    // Recreating starts over from the seed row
    create_table(&mut conn, &table, 3).await?;
    assert_eq!(row_count(&mut conn, &table).await?, 8);

    normal_drop(&mut conn, &table).await?;

    drop(conn);
    pool.disconnect().await?;
    Ok(())
}
