use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result type for database-facing tablegen operations.
pub type Result<T> = std::result::Result<T, DbError>;

/// Closed taxonomy of failure codes.
///
/// Every failure the pipeline can produce maps onto exactly one of these
/// codes so callers can branch without parsing messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// Malformed or conflicting configuration; no I/O was attempted.
    Validation,
    /// Unknown dialect tag.
    UnsupportedDialect,
    /// Host unreachable, connection refused, or the link dropped.
    Network,
    /// Credentials rejected by the server.
    Auth,
    /// Configured bound exceeded during connect or introspection.
    Timeout,
    /// Inconsistent or vanished schema object during a run.
    SchemaIntrospection,
    /// No project manifest discoverable.
    ProjectNotFound,
    /// Irreconcilable generation option conflicts.
    Plan,
    /// Target file modified outside generator-managed markers.
    WriteConflict,
}

impl ErrorCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::Validation => "VALIDATION_ERROR",
            ErrorCode::UnsupportedDialect => "UNSUPPORTED_DIALECT",
            ErrorCode::Network => "NETWORK_ERROR",
            ErrorCode::Auth => "AUTH_ERROR",
            ErrorCode::Timeout => "TIMEOUT_ERROR",
            ErrorCode::SchemaIntrospection => "SCHEMA_INTROSPECTION_ERROR",
            ErrorCode::ProjectNotFound => "PROJECT_NOT_FOUND",
            ErrorCode::Plan => "PLAN_ERROR",
            ErrorCode::WriteConflict => "WRITE_CONFLICT",
        }
    }
}

impl std::fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Classified failure: a stable code, a short user-facing message, and raw
/// diagnostic details kept out of the primary message.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
pub struct DbError {
    pub code: ErrorCode,
    pub message: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub details: String,
}

impl std::fmt::Display for DbError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.details.is_empty() {
            write!(f, "{}: {}", self.code, self.message)
        } else {
            write!(f, "{}: {} ({})", self.code, self.message, self.details)
        }
    }
}

impl DbError {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            details: String::new(),
        }
    }

    pub fn with_details(mut self, details: impl std::fmt::Display) -> Self {
        self.details = details.to_string();
        self
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::Validation, message)
    }

    pub fn unsupported_dialect(tag: impl std::fmt::Display) -> Self {
        Self::new(
            ErrorCode::UnsupportedDialect,
            format!("unsupported database dialect '{tag}'"),
        )
        .with_details("supported: mysql, postgres, sqlite")
    }

    pub fn network(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::Network, message)
    }

    pub fn auth(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::Auth, message)
    }

    pub fn timeout(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::Timeout, message)
    }

    pub fn schema_introspection(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::SchemaIntrospection, message)
    }

    pub fn project_not_found(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::ProjectNotFound, message)
    }
}
