//! Error types for the drop benchmark's MySQL operations.

use thiserror::Error;

/// Errors that can occur while preparing or dropping a table.
#[derive(Error, Debug)]
pub enum DropError {
    /// MySQL connection or query error, passed through unchanged.
    #[error("MySQL error: {0}")]
    MySQL(#[from] mysql_async::Error),

    /// Table name is not a plain MySQL identifier.
    #[error("Invalid table name '{name}': {reason}")]
    InvalidTableName { name: String, reason: String },

    /// Bloat exponent would overflow the row count.
    #[error("Size exponent {0} exceeds the maximum of {max}", max = crate::MAX_EXPONENT)]
    InvalidExponent(u32),

    /// Connection string could not be understood.
    #[error("Invalid DSN: {0}")]
    InvalidDsn(String),
}
