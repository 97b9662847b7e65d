use std::{fmt, path::PathBuf, str::FromStr, time::Duration};

use serde::{Deserialize, Serialize, Serializer};

use crate::{DbError, Result};

/// A database engine's connection and metadata-query conventions.
///
/// The only decoding path from a wire tag is [`Dialect::from_str`]; unknown
/// tags fail with an `UnsupportedDialect` error before any I/O happens.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(try_from = "String")]
pub enum Dialect {
    Mysql,
    Postgres,
    Sqlite,
}

impl Dialect {
    pub fn as_str(&self) -> &'static str {
        match self {
            Dialect::Mysql => "mysql",
            Dialect::Postgres => "postgres",
            Dialect::Sqlite => "sqlite",
        }
    }

    /// Default server port, `None` for file-based engines.
    pub fn default_port(&self) -> Option<u16> {
        match self {
            Dialect::Mysql => Some(3306),
            Dialect::Postgres => Some(5432),
            Dialect::Sqlite => None,
        }
    }

    /// Whether this dialect connects to a file instead of a server.
    pub fn is_embedded(&self) -> bool {
        matches!(self, Dialect::Sqlite)
    }
}

impl fmt::Display for Dialect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Dialect {
    type Err = DbError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "mysql" => Ok(Dialect::Mysql),
            "postgres" | "postgresql" => Ok(Dialect::Postgres),
            "sqlite" => Ok(Dialect::Sqlite),
            other => Err(DbError::unsupported_dialect(other)),
        }
    }
}

impl TryFrom<String> for Dialect {
    type Error = DbError;

    fn try_from(s: String) -> Result<Self> {
        s.parse()
    }
}

impl Serialize for Dialect {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(self.as_str())
    }
}

/// Connection configuration supplied by the caller per run.
///
/// Exactly one source of connection identity is authoritative per dialect:
/// host/credentials for server dialects, `path` for embedded dialects, or a
/// raw `dsn` override. Conflicting combinations are rejected by
/// [`DbConfig::validate`] before any connect attempt.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DbConfig {
    pub dialect: Dialect,
    #[serde(default)]
    pub host: Option<String>,
    #[serde(default)]
    pub port: Option<u16>,
    #[serde(default)]
    pub database: Option<String>,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
    #[serde(default)]
    pub ssl: bool,
    /// Database file path for embedded dialects.
    #[serde(default)]
    pub path: Option<PathBuf>,
    /// Raw connection string override; mutually exclusive with the field
    /// based configuration above.
    #[serde(default)]
    pub dsn: Option<String>,
    #[serde(default)]
    pub timeout_secs: Option<u64>,
    /// Pool cap carried for callers that hold the config long term. The
    /// drivers here open exactly one connection per run and ignore it.
    #[serde(default)]
    pub max_connections: Option<u32>,
}

impl DbConfig {
    pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

    pub fn new(dialect: Dialect) -> Self {
        Self {
            dialect,
            host: None,
            port: None,
            database: None,
            username: None,
            password: None,
            ssl: false,
            path: None,
            dsn: None,
            timeout_secs: None,
            max_connections: None,
        }
    }

    /// Configured connect/introspection bound, falling back to 10 seconds.
    pub fn timeout(&self) -> Duration {
        self.timeout_secs
            .map(Duration::from_secs)
            .unwrap_or(Self::DEFAULT_TIMEOUT)
    }

    /// Effective port, falling back to the dialect default.
    pub fn port(&self) -> Option<u16> {
        self.port.or_else(|| self.dialect.default_port())
    }

    fn has_server_fields(&self) -> bool {
        self.host.is_some() || self.port.is_some() || self.username.is_some()
    }

    /// Check the exactly-one-authority invariant for this config's dialect.
    ///
    /// Performs no I/O; connection failures are a separate concern.
    pub fn validate(&self) -> Result<()> {
        if let Some(dsn) = &self.dsn {
            if dsn.trim().is_empty() {
                return Err(DbError::validation("dsn override is empty"));
            }
            if self.has_server_fields() || self.path.is_some() {
                return Err(DbError::validation(
                    "dsn override conflicts with host/port/username/path fields",
                ));
            }
            return Ok(());
        }

        match self.dialect {
            Dialect::Sqlite => {
                let path = self
                    .path
                    .as_ref()
                    .ok_or_else(|| DbError::validation("sqlite requires a database file path"))?;
                if path.as_os_str().is_empty() {
                    return Err(DbError::validation("sqlite database file path is empty"));
                }
                if self.has_server_fields() {
                    return Err(DbError::validation(
                        "sqlite is file based; host/port/username fields conflict with path",
                    ));
                }
            }
            Dialect::Mysql | Dialect::Postgres => {
                if self.path.is_some() {
                    return Err(DbError::validation(format!(
                        "{} is server based; a database file path conflicts with host fields",
                        self.dialect
                    )));
                }
                if self.host.as_deref().is_none_or(str::is_empty) {
                    return Err(DbError::validation(format!(
                        "{} requires a host",
                        self.dialect
                    )));
                }
                if self.username.as_deref().is_none_or(str::is_empty) {
                    return Err(DbError::validation(format!(
                        "{} requires a username",
                        self.dialect
                    )));
                }
            }
        }
        Ok(())
    }
}
