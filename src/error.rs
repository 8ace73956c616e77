//! Error types for causerie.

use std::time::Duration;

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

/// Top-level error type.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("LLM error: {0}")]
    Llm(#[from] LlmError),

    #[error("Response table error: {0}")]
    Table(#[from] TableError),

    #[error("Chat error: {0}")]
    Chat(#[from] ChatError),
}

/// Configuration-related errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("Invalid configuration value for {key}: {message}")]
    InvalidValue { key: String, message: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// LLM provider errors.
#[derive(Debug, thiserror::Error)]
pub enum LlmError {
    #[error("Provider {provider} request failed: {reason}")]
    RequestFailed { provider: String, reason: String },

    #[error("Provider {provider} rate limited, retry after {retry_after:?}")]
    RateLimited {
        provider: String,
        retry_after: Option<Duration>,
    },

    #[error("Invalid response from {provider}: {reason}")]
    InvalidResponse { provider: String, reason: String },

    #[error("Authentication failed for provider {provider}")]
    AuthFailed { provider: String },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Errors raised while loading a response table.
#[derive(Debug, thiserror::Error)]
pub enum TableError {
    #[error("Failed to read table {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse table {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Table {path} has no entries")]
    Empty { path: String },
}

/// Client-facing chat errors.
#[derive(Debug, thiserror::Error)]
pub enum ChatError {
    #[error("no query provided")]
    NoQuery,
}

impl IntoResponse for ChatError {
    fn into_response(self) -> Response {
        let status = match self {
            Self::NoQuery => StatusCode::BAD_REQUEST,
        };
        (status, Json(serde_json::json!({ "error": self.to_string() }))).into_response()
    }
}

/// Result type alias.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_query_message() {
        assert_eq!(ChatError::NoQuery.to_string(), "no query provided");
    }

    #[test]
    fn no_query_is_bad_request() {
        let response = ChatError::NoQuery.into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn domain_errors_convert_into_top_level() {
        let err: Error = LlmError::AuthFailed {
            provider: "openai".to_string(),
        }
        .into();
        assert!(err.to_string().starts_with("LLM error:"));

        let err: Error = ConfigError::MissingEnvVar("OPENAI_API_KEY".to_string()).into();
        assert_eq!(
            err.to_string(),
            "Configuration error: Missing required environment variable: OPENAI_API_KEY"
        );
    }
}
