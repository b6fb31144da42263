// Client error types
use reqwest::StatusCode;
use serde_json::Value;
use std::collections::HashMap;
use thiserror::Error;

use crate::types::Role;

/// Every failure the client can surface to a caller
#[derive(Debug, Error)]
pub enum ClientError {
    // Session lifecycle
    #[error("Invalid username or password")]
    InvalidCredentials,

    #[error("Unrecognized response shape: {0}")]
    MalformedResponse(String),

    #[error("No registration endpoint found")]
    NoRegistrationEndpoint,

    #[error("Session expired, please log in again")]
    AuthenticationExpired,

    #[error("You are '{actual}', but selected the '{selected}' portal")]
    WrongPortal { actual: Role, selected: Role },

    // Resource resolution
    #[error("Unable to resolve resource: {0}")]
    ResourceUnresolvable(String),

    // Server answers
    #[error("{message}")]
    ValidationRejected {
        status: u16,
        message: String,
        body: Value,
    },

    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// 404, or a route the server does not offer (405, 501)
    #[error("{} ({status}): {path}", absent_reason(*status))]
    NotFound {
        status: u16,
        path: String,
        message: String,
    },

    #[error("Server error ({status}): {message}")]
    Server { status: u16, message: String },

    // Local failures
    #[error("{message}")]
    InvalidInput {
        message: String,
        field_errors: HashMap<String, String>,
    },

    #[error("Transport failure: {0}")]
    Transport(String),

    #[error("Credential storage error: {0}")]
    Storage(String),
}

impl ClientError {
    /// Classify a non-success HTTP answer.
    ///
    /// 401 is not handled here; the transport turns it into
    /// `AuthenticationExpired` after resetting the session.
    pub fn from_response(status: StatusCode, path: &str, body: Value) -> Self {
        let message = extract_message(&body)
            .unwrap_or_else(|| status.canonical_reason().unwrap_or("request failed").to_string());

        match status.as_u16() {
            401 => ClientError::AuthenticationExpired,
            403 => ClientError::Forbidden(message),
            404 | 405 | 501 => ClientError::NotFound {
                status: status.as_u16(),
                path: path.to_string(),
                message,
            },
            code if status.is_client_error() => ClientError::ValidationRejected {
                status: code,
                message,
                body,
            },
            code => ClientError::Server {
                status: code,
                message,
            },
        }
    }

    /// HTTP status behind this error, when it came from the server
    pub fn status(&self) -> Option<u16> {
        match self {
            ClientError::AuthenticationExpired => Some(401),
            ClientError::Forbidden(_) => Some(403),
            ClientError::NotFound { status, .. }
            | ClientError::ValidationRejected { status, .. }
            | ClientError::Server { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Stable code for machine-readable output
    pub fn error_code(&self) -> &'static str {
        match self {
            ClientError::InvalidCredentials => "INVALID_CREDENTIALS",
            ClientError::MalformedResponse(_) => "MALFORMED_RESPONSE",
            ClientError::NoRegistrationEndpoint => "NO_REGISTRATION_ENDPOINT",
            ClientError::AuthenticationExpired => "AUTHENTICATION_EXPIRED",
            ClientError::WrongPortal { .. } => "WRONG_PORTAL",
            ClientError::ResourceUnresolvable(_) => "RESOURCE_UNRESOLVABLE",
            ClientError::ValidationRejected { .. } => "VALIDATION_REJECTED",
            ClientError::Forbidden(_) => "FORBIDDEN",
            ClientError::NotFound { status: 405, .. } => "METHOD_NOT_ALLOWED",
            ClientError::NotFound { status: 501, .. } => "NOT_IMPLEMENTED",
            ClientError::NotFound { .. } => "NOT_FOUND",
            ClientError::Server { .. } => "SERVER_ERROR",
            ClientError::InvalidInput { .. } => "INVALID_INPUT",
            ClientError::Transport(_) => "TRANSPORT_FAILURE",
            ClientError::Storage(_) => "STORAGE_ERROR",
        }
    }

    pub fn invalid_input(
        message: impl Into<String>,
        field_errors: HashMap<String, String>,
    ) -> Self {
        ClientError::InvalidInput {
            message: message.into(),
            field_errors,
        }
    }

    pub fn invalid_field(field: &str, message: impl Into<String>) -> Self {
        let message = message.into();
        let mut field_errors = HashMap::new();
        field_errors.insert(field.to_string(), message.clone());
        ClientError::InvalidInput {
            message,
            field_errors,
        }
    }
}

fn absent_reason(status: u16) -> &'static str {
    match status {
        405 => "Method not allowed",
        501 => "Not implemented",
        _ => "Not found",
    }
}

/// Pull a human message out of a server error body (`message`, then `error`)
fn extract_message(body: &Value) -> Option<String> {
    match body {
        Value::String(s) if !s.trim().is_empty() => Some(s.clone()),
        Value::Object(map) => ["message", "error"]
            .iter()
            .filter_map(|key| map.get(*key))
            .find_map(|v| v.as_str().filter(|s| !s.is_empty()).map(str::to_string)),
        _ => None,
    }
}

// Timeouts and connection failures are not distinguished further
impl From<reqwest::Error> for ClientError {
    fn from(err: reqwest::Error) -> Self {
        ClientError::Transport(err.to_string())
    }
}

impl From<std::io::Error> for ClientError {
    fn from(err: std::io::Error) -> Self {
        ClientError::Storage(err.to_string())
    }
}

impl From<serde_json::Error> for ClientError {
    fn from(err: serde_json::Error) -> Self {
        ClientError::Storage(err.to_string())
    }
}

impl From<url::ParseError> for ClientError {
    fn from(err: url::ParseError) -> Self {
        ClientError::Transport(format!("invalid URL: {}", err))
    }
}
