//! Result and error types for the core library

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::forms::FieldErrors;

/// Core library error type
///
/// The first three variants mirror what the backend can tell us about a
/// request: no token to send, token rejected, or any other failed status.
#[derive(Error, Debug)]
pub enum Error {
    #[error("Authentication required. Please login.")]
    MissingToken,

    #[error("Session expired. Please login again.")]
    SessionExpired,

    #[error("{message}")]
    Request { status: u16, message: String },

    #[error("{0}")]
    Network(String),

    #[error("Validation error: {0}")]
    Validation(FieldErrors),

    #[error("Login failed: {0}")]
    Login(String),

    #[error("{0}")]
    Transaction(String),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Create a failed-request error
    pub fn request(status: u16, message: impl Into<String>) -> Self {
        Self::Request {
            status,
            message: message.into(),
        }
    }

    /// Create an invalid response error
    pub fn invalid_response(msg: impl Into<String>) -> Self {
        Self::InvalidResponse(msg.into())
    }

    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create a storage error
    pub fn storage(msg: impl Into<String>) -> Self {
        Self::Storage(msg.into())
    }

    /// True when the user has to log in (again) before retrying
    pub fn requires_login(&self) -> bool {
        matches!(self, Self::MissingToken | Self::SessionExpired)
    }

    /// HTTP status of the failed request, if the server answered
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Request { status, .. } => Some(*status),
            Self::SessionExpired => Some(401),
            _ => None,
        }
    }

    /// Stable snake_case name of the variant, as recorded in the event log
    pub fn kind(&self) -> &'static str {
        match self {
            Self::MissingToken => "missing_token",
            Self::SessionExpired => "session_expired",
            Self::Request { .. } => "request",
            Self::Network(_) => "network",
            Self::Validation(_) => "validation",
            Self::Login(_) => "login",
            Self::Transaction(_) => "transaction",
            Self::InvalidResponse(_) => "invalid_response",
            Self::Config(_) => "config",
            Self::Storage(_) => "storage",
            Self::Io(_) => "io",
            Self::Json(_) => "json",
            Self::Other(_) => "other",
        }
    }
}

/// Core library result type
pub type Result<T> = std::result::Result<T, Error>;

/// Operation result with optional context (for `--json` output)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OperationResult<T> {
    pub success: bool,
    pub data: Option<T>,
    pub error: Option<String>,
    pub context: Option<HashMap<String, serde_json::Value>>,
}

impl<T> OperationResult<T> {
    /// Create a successful result
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
            context: None,
        }
    }

    /// Create a failed result
    pub fn fail(error: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(error.into()),
            context: None,
        }
    }

    /// Create a failed result with context
    pub fn fail_with_context(
        error: impl Into<String>,
        context: HashMap<String, serde_json::Value>,
    ) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(error.into()),
            context: Some(context),
        }
    }
}

impl<T> From<Result<T>> for OperationResult<T> {
    fn from(result: Result<T>) -> Self {
        match result {
            Ok(data) => Self::ok(data),
            Err(Error::Validation(fields)) => {
                let context = fields
                    .iter()
                    .map(|(field, msg)| (field.as_str().to_string(), serde_json::json!(msg)))
                    .collect();
                Self::fail_with_context("Validation failed", context)
            }
            Err(e) => Self::fail(e.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::forms::Field;

    #[test]
    fn test_operation_result_ok() {
        let result: OperationResult<i32> = OperationResult::ok(42);
        assert!(result.success);
        assert_eq!(result.data, Some(42));
        assert!(result.error.is_none());
    }

    #[test]
    fn test_from_result() {
        let err: Result<i32> = Err(Error::SessionExpired);
        let result: OperationResult<i32> = err.into();
        assert!(!result.success);
        assert!(result.error.unwrap().contains("Session expired"));
    }

    #[test]
    fn test_validation_errors_become_context() {
        let mut fields = FieldErrors::new();
        fields.insert(Field::Email, "Invalid email address");
        let err: Result<()> = Err(Error::Validation(fields));

        let result: OperationResult<()> = err.into();
        let context = result.context.unwrap();
        assert_eq!(context["email"], "Invalid email address");
    }

    #[test]
    fn test_requires_login() {
        assert!(Error::MissingToken.requires_login());
        assert!(Error::SessionExpired.requires_login());
        assert!(!Error::request(500, "boom").requires_login());
        assert_eq!(Error::request(404, "missing").status(), Some(404));
    }

    #[test]
    fn test_kind_and_status_for_log() {
        assert_eq!(Error::SessionExpired.kind(), "session_expired");
        assert_eq!(Error::SessionExpired.status(), Some(401));
        assert_eq!(Error::request(503, "down").kind(), "request");
        assert_eq!(Error::Network("refused".into()).kind(), "network");
        assert_eq!(Error::Network("refused".into()).status(), None);
    }
}
