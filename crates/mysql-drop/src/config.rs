//! Connection configuration.

use crate::error::DropError;
use mysql_async::{Opts, OptsBuilder};
use std::fmt;
use std::str::FromStr;

pub const DEFAULT_USER: &str = "root";
pub const DEFAULT_PASSWORD: &str = "password";
pub const DEFAULT_DATABASE: &str = "database";
pub const DEFAULT_HOST: &str = "127.0.0.1";
pub const DEFAULT_PORT: u16 = 3306;

/// Where and as whom to connect.
///
/// Parsed from a DSN of the form `user:password@tcp(host:port)/database`.
/// The bare `user:password@host:port/database` form is accepted too.
#[derive(Clone, PartialEq, Eq)]
pub struct MySQLConfig {
    pub host: String,
    pub port: u16,
    pub user: String,
    pub password: String,
    pub database: String,
}

impl MySQLConfig {
    /// Root credentials against `host:port`, as used by the test container.
    pub fn root(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
            ..Self::default()
        }
    }

    pub fn from_dsn(dsn: &str) -> Result<Self, DropError> {
        let dsn = dsn.trim();

        let (head, tail) = dsn
            .rsplit_once('/')
            .ok_or_else(|| DropError::InvalidDsn(format!("missing '/<database>' in '{dsn}'")))?;
        let database = tail.split('?').next().unwrap_or_default().to_string();

        let (credentials, address) = match head.rsplit_once('@') {
            Some((credentials, address)) => (credentials, address),
            None => ("", head),
        };
        let (user, password) = match credentials.split_once(':') {
            Some((user, password)) => (user.to_string(), password.to_string()),
            None => (credentials.to_string(), String::new()),
        };

        let address = if let Some(inner) = address.strip_prefix("tcp(") {
            inner
                .strip_suffix(')')
                .ok_or_else(|| DropError::InvalidDsn(format!("unclosed 'tcp(' in '{dsn}'")))?
        } else if address.contains('(') {
            return Err(DropError::InvalidDsn(format!(
                "only tcp addresses are supported, got '{address}'"
            )));
        } else {
            address
        };

        let (host, port) = parse_host_port(address)?;

        Ok(Self {
            host,
            port,
            user,
            password,
            database,
        })
    }

    /// Driver options. Credentials are passed as-is, no URL escaping involved.
    pub fn opts(&self) -> Opts {
        let builder = OptsBuilder::default()
            .ip_or_hostname(self.host.clone())
            .tcp_port(self.port)
            .user(non_empty(&self.user))
            .pass(non_empty(&self.password))
            .db_name(non_empty(&self.database));
        Opts::from(builder)
    }
}

impl Default for MySQLConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            user: DEFAULT_USER.to_string(),
            password: DEFAULT_PASSWORD.to_string(),
            database: DEFAULT_DATABASE.to_string(),
        }
    }
}

impl FromStr for MySQLConfig {
    type Err = DropError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_dsn(s)
    }
}

/// Masks the password so the config can be logged.
impl fmt::Display for MySQLConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:***@tcp({}:{})/{}",
            self.user,
            format_host(&self.host),
            self.port,
            self.database
        )
    }
}

impl fmt::Debug for MySQLConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MySQLConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("user", &self.user)
            .field("password", &"***")
            .field("database", &self.database)
            .finish()
    }
}

fn parse_host_port(address: &str) -> Result<(String, u16), DropError> {
    if address.is_empty() {
        return Ok((DEFAULT_HOST.to_string(), DEFAULT_PORT));
    }

    // [::1]:3306
    if let Some(rest) = address.strip_prefix('[') {
        let (host, after) = rest
            .split_once(']')
            .ok_or_else(|| DropError::InvalidDsn(format!("unclosed '[' in '{address}'")))?;
        let port = match after.strip_prefix(':') {
            Some(port) => parse_port(port)?,
            None if after.is_empty() => DEFAULT_PORT,
            None => {
                return Err(DropError::InvalidDsn(format!(
                    "unexpected '{after}' after IPv6 host"
                )))
            }
        };
        return Ok((host.to_string(), port));
    }

    match address.rsplit_once(':') {
        Some((host, port)) => Ok((host.to_string(), parse_port(port)?)),
        None => Ok((address.to_string(), DEFAULT_PORT)),
    }
}

fn parse_port(port: &str) -> Result<u16, DropError> {
    port.parse::<u16>()
        .map_err(|e| DropError::InvalidDsn(format!("invalid port '{port}': {e}")))
}

fn format_host(host: &str) -> String {
    if host.contains(':') {
        format!("[{host}]")
    } else {
        host.to_string()
    }
}

fn non_empty(value: &str) -> Option<String> {
    (!value.is_empty()).then(|| value.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_go_style_dsn() {
        let config = MySQLConfig::from_dsn("root:password@tcp(localhost:32768)/database").unwrap();
        assert_eq!(config.user, "root");
        assert_eq!(config.password, "password");
        assert_eq!(config.host, "localhost");
        assert_eq!(config.port, 32768);
        assert_eq!(config.database, "database");
    }

    #[test]
    fn test_bare_address_and_params() {
        let config = MySQLConfig::from_dsn("bench@db.internal/drops?parseTime=true").unwrap();
        assert_eq!(config.user, "bench");
        assert_eq!(config.password, "");
        assert_eq!(config.host, "db.internal");
        assert_eq!(config.port, DEFAULT_PORT);
        assert_eq!(config.database, "drops");
    }

    #[test]
    fn test_password_with_special_characters() {
        let config = MySQLConfig::from_dsn("root:p@ss:w/rd@tcp(127.0.0.1:3306)/db").unwrap();
        assert_eq!(config.password, "p@ss:w/rd");
        assert_eq!(config.host, "127.0.0.1");
        assert_eq!(config.database, "db");
    }

    #[test]
    fn test_ipv6_host() {
        let config = MySQLConfig::from_dsn("root:pw@tcp([::1]:3307)/db").unwrap();
        assert_eq!(config.host, "::1");
        assert_eq!(config.port, 3307);
        assert_eq!(config.to_string(), "root:***@tcp([::1]:3307)/db");
    }

    #[test]
    fn test_empty_address_uses_defaults() {
        let config = MySQLConfig::from_dsn("root:pw@/db").unwrap();
        assert_eq!(config.host, DEFAULT_HOST);
        assert_eq!(config.port, DEFAULT_PORT);
    }

    #[test]
    fn test_invalid_dsns() {
        for dsn in [
            "root:pw@tcp(localhost:3306)",
            "root:pw@tcp(localhost:3306/db",
            "root:pw@unix(/tmp/mysql.sock)/db",
            "root:pw@tcp(localhost:notaport)/db",
        ] {
            assert!(
                matches!(MySQLConfig::from_dsn(dsn), Err(DropError::InvalidDsn(_))),
                "{dsn} should be rejected"
            );
        }
    }

    #[test]
    fn test_display_masks_password() {
        let config = MySQLConfig::root("localhost", 13306);
        let shown = config.to_string();
        assert_eq!(shown, "root:***@tcp(localhost:13306)/database");
        assert!(!shown.contains(DEFAULT_PASSWORD));
        assert!(!format!("{config:?}").contains(DEFAULT_PASSWORD));
    }

    #[test]
    fn test_opts() {
        let config = MySQLConfig::root("localhost", 13306);
        let opts = config.opts();
        assert_eq!(opts.ip_or_hostname(), "localhost");
        assert_eq!(opts.tcp_port(), 13306);
        assert_eq!(opts.user(), Some("root"));
        assert_eq!(opts.pass(), Some("password"));
        assert_eq!(opts.db_name(), Some("database"));
    }
}
