//! MySQL side of the drop-table I/O benchmark
//!
//! Provides the drop operation itself, the procedure that bloats a table to
//! `2^n` rows before it is dropped, connection configuration from a DSN, and
//! a docker-backed MySQL container for running the whole thing locally.

mod bloat;
mod config;
mod drop;
pub mod error;
mod table;
pub mod testing;

pub use bloat::{
    approx_size_bytes, create_table, expected_rows, generate_bloat_round, generate_create_table,
    generate_seed_row, row_count, MAX_EXPONENT, SIZE_16GB, SIZE_1GB, SIZE_1KB, SIZE_1MB,
};
pub use config::{MySQLConfig, DEFAULT_DATABASE, DEFAULT_PASSWORD, DEFAULT_PORT, DEFAULT_USER};
pub use drop::{generate_drop_table, normal_drop};
pub use error::DropError;
pub use table::{TableName, DEFAULT_TABLE_NAME};
