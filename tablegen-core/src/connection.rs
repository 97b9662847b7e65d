use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::DbError;

/// Outcome of a connection attempt.
///
/// An immutable snapshot: built once per attempt and never mutated. Failed
/// attempts carry the classified error as data so the caller can re-prompt
/// instead of treating it as a process failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectionResult {
    pub success: bool,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub database: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub server_version: Option<String>,
    pub duration_ms: u64,
    pub tables: usize,
    pub connected: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<DbError>,
}

impl ConnectionResult {
    pub fn success(
        message: impl Into<String>,
        database: Option<String>,
        server_version: Option<String>,
        elapsed: Duration,
        tables: usize,
    ) -> Self {
        Self {
            success: true,
            message: message.into(),
            database,
            server_version,
            duration_ms: elapsed.as_millis() as u64,
            tables,
            connected: true,
            error: None,
        }
    }

    pub fn failure(error: DbError, elapsed: Duration) -> Self {
        Self {
            success: false,
            message: error.message.clone(),
            database: None,
            server_version: None,
            duration_ms: elapsed.as_millis() as u64,
            tables: 0,
            connected: false,
            error: Some(error),
        }
    }
}
