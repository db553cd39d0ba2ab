//! Error handling for the backend client

use std::fmt;

use reqwest::StatusCode;
use serde_json::Value;
use thiserror::Error;

/// Postgres `unique_violation`.
pub const UNIQUE_VIOLATION: &str = "23505";

/// PostgREST code for a single-object request that matched no rows.
pub const NO_ROWS: &str = "PGRST116";

/// Error body returned by the REST and auth APIs
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ApiErrorDetails {
    pub code: Option<String>,
    pub message: Option<String>,
    pub details: Option<String>,
    pub hint: Option<String>,
}

impl ApiErrorDetails {
    /// Parse an error body. PostgREST answers with `{code, message, details, hint}`,
    /// the auth API with `{code, error_code, msg}` or `{error, error_description}`.
    pub fn from_body(body: &str) -> Self {
        let value: Value = match serde_json::from_str(body) {
            Ok(value) => value,
            Err(_) => {
                let trimmed = body.trim();
                return Self {
                    message: (!trimmed.is_empty()).then(|| trimmed.to_string()),
                    ..Self::default()
                };
            }
        };

        let field = |key: &str| match value.get(key) {
            Some(Value::String(s)) => Some(s.clone()),
            Some(Value::Number(n)) => Some(n.to_string()),
            _ => None,
        };

        Self {
            code: field("error_code").or_else(|| field("code")),
            message: field("message")
                .or_else(|| field("msg"))
                .or_else(|| field("error_description"))
                .or_else(|| field("error")),
            details: field("details"),
            hint: field("hint"),
        }
    }
}

impl fmt::Display for ApiErrorDetails {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut parts = Vec::new();
        if let Some(code) = &self.code {
            parts.push(format!("Code: {}", code));
        }
        if let Some(message) = &self.message {
            parts.push(format!("Message: {}", message));
        }
        if let Some(details) = &self.details {
            parts.push(format!("Details: {}", details));
        }
        if let Some(hint) = &self.hint {
            parts.push(format!("Hint: {}", hint));
        }
        write!(f, "{}", parts.join(", "))
    }
}

/// Unified error type for the backend client
#[derive(Error, Debug)]
pub enum Error {
    /// Network or HTTP related errors
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON serialization or deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// The backend answered with a non-success status
    #[error("API error: {details} (Status: {status})")]
    Api {
        status: StatusCode,
        details: ApiErrorDetails,
    },

    /// Authentication errors raised locally (no session, malformed token)
    #[error("Authentication error: {0}")]
    Auth(String),

    /// URL parsing errors
    #[error("URL error: {0}")]
    Url(#[from] url::ParseError),

    /// JWT decoding errors
    #[error("JWT error: {0}")]
    Jwt(#[from] jsonwebtoken::errors::Error),

    /// Missing or invalid configuration
    #[error("Configuration error: {0}")]
    Config(String),

    /// General errors
    #[error("{0}")]
    General(String),
}

impl Error {
    /// Create a new authentication error
    pub fn auth<T: fmt::Display>(msg: T) -> Self {
        Error::Auth(msg.to_string())
    }

    /// Create a new configuration error
    pub fn config<T: fmt::Display>(msg: T) -> Self {
        Error::Config(msg.to_string())
    }

    /// Create a new general error
    pub fn general<T: fmt::Display>(msg: T) -> Self {
        Error::General(msg.to_string())
    }

    /// Build an API error from a failed response
    pub fn api(status: StatusCode, body: &str) -> Self {
        Error::Api {
            status,
            details: ApiErrorDetails::from_body(body),
        }
    }

    /// HTTP status of an API error
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            Error::Api { status, .. } => Some(*status),
            Error::Http(e) => e.status(),
            _ => None,
        }
    }

    /// Backend error code (`23505`, `PGRST116`, `email_exists`, ...)
    pub fn code(&self) -> Option<&str> {
        match self {
            Error::Api { details, .. } => details.code.as_deref(),
            _ => None,
        }
    }

    /// Backend error message
    pub fn message(&self) -> Option<&str> {
        match self {
            Error::Api { details, .. } => details.message.as_deref(),
            _ => None,
        }
    }

    /// Whether the backend rejected the write because of a unique constraint
    pub fn is_unique_violation(&self) -> bool {
        self.code() == Some(UNIQUE_VIOLATION)
    }

    /// Whether a single-object request matched no rows
    pub fn is_no_rows(&self) -> bool {
        self.code() == Some(NO_ROWS)
    }

    /// Whether the auth API refused an email because another identity owns it
    pub fn is_email_taken(&self) -> bool {
        if matches!(self.code(), Some("email_exists") | Some("user_already_exists")) {
            return true;
        }
        self.message()
            .map(|m| m.contains("already registered") || m.contains("already been registered"))
            .unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_postgrest_error_body() {
        let err = Error::api(
            StatusCode::CONFLICT,
            r#"{"code":"23505","message":"duplicate key value violates unique constraint \"variants_sku_child_key\"","details":"Key (sku_child)=(ABC1) already exists.","hint":null}"#,
        );
        assert!(err.is_unique_violation());
        assert!(!err.is_no_rows());
        assert_eq!(err.status(), Some(StatusCode::CONFLICT));
        assert!(err.to_string().contains("Code: 23505"));
    }

    #[test]
    fn parses_auth_error_body() {
        let err = Error::api(
            StatusCode::UNPROCESSABLE_ENTITY,
            r#"{"code":422,"error_code":"email_exists","msg":"A user with this email address has already been registered"}"#,
        );
        assert_eq!(err.code(), Some("email_exists"));
        assert!(err.is_email_taken());
    }

    #[test]
    fn keeps_plain_text_bodies_as_message() {
        let err = Error::api(StatusCode::BAD_GATEWAY, "upstream timeout\n");
        assert_eq!(err.message(), Some("upstream timeout"));
        assert_eq!(err.code(), None);
    }
}
