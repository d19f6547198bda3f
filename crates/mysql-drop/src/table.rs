//! Validated table identifiers.

use crate::error::DropError;
use std::fmt;
use std::str::FromStr;

/// Table used when none is given.
pub const DEFAULT_TABLE_NAME: &str = "TEST_TABLE";

/// MySQL's identifier length limit.
const MAX_IDENTIFIER_LEN: usize = 64;

/// A table name that is safe to splice into DDL.
///
/// Only unquoted-identifier characters are accepted (ASCII letters, digits,
/// `_` and `$`), and the name may not consist of digits alone. The name is
/// still backtick-quoted whenever it is written into SQL.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TableName(String);

impl TableName {
    pub fn new(name: impl Into<String>) -> Result<Self, DropError> {
        let name = name.into();
        let invalid = |reason: &str| DropError::InvalidTableName {
            name: name.clone(),
            reason: reason.to_string(),
        };

        if name.is_empty() {
            return Err(invalid("name is empty"));
        }
        if name.len() > MAX_IDENTIFIER_LEN {
            return Err(invalid("name is longer than 64 characters"));
        }
        if let Some(c) = name
            .chars()
            .find(|c| !(c.is_ascii_alphanumeric() || *c == '_' || *c == '$'))
        {
            return Err(invalid(&format!("character '{c}' is not allowed")));
        }
        if name.chars().all(|c| c.is_ascii_digit()) {
            return Err(invalid("name cannot be purely numeric"));
        }

        Ok(Self(name))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The name wrapped in backticks, ready for use in a statement.
    pub fn quoted(&self) -> String {
        format!("`{}`", self.0)
    }
}

impl Default for TableName {
    fn default() -> Self {
        Self(DEFAULT_TABLE_NAME.to_string())
    }
}

impl fmt::Display for TableName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for TableName {
    type Err = DropError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}
