//! The operation being measured.

use crate::error::DropError;
use crate::table::TableName;
use mysql_async::prelude::*;
use mysql_async::Conn;
use tracing::debug;

/// Generate the DROP TABLE statement.
pub fn generate_drop_table(table: &TableName) -> String {
    format!("DROP TABLE IF EXISTS {}", table.quoted())
}

/// Drop `table` if it exists.
///
/// Succeeds whether or not the table was there, so calling it twice in a row
/// is fine. Driver errors are returned unchanged; there is no retry and no
/// surrounding transaction.
pub async fn normal_drop(conn: &mut Conn, table: &TableName) -> Result<(), DropError> {
    debug!("Dropping table {}", table);
    conn.query_drop(generate_drop_table(table)).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_drop_table() {
        let table = TableName::new("users").unwrap();
        assert_eq!(generate_drop_table(&table), "DROP TABLE IF EXISTS `users`");
    }
}
