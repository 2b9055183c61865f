use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Error fetching repositories: {0}")]
    Http(#[from] reqwest::Error),

    #[error("{0}")]
    RateLimited(String),

    #[error("Invalid search query: {0}")]
    InvalidQuery(String),

    #[error("GitHub API error ({status}): {message}")]
    Upstream { status: u16, message: String },

    #[error("Serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Payload too large: {0}")]
    PayloadTooLarge(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Get a sanitized error message safe for logging
    /// Filters out potentially sensitive information
    pub fn log_safe(&self) -> String {
        match self {
            // Transport errors may echo request URLs
            Error::Http(_) => "External HTTP request failed".to_string(),

            Error::Internal(msg) | Error::Config(msg) => {
                let lower = msg.to_lowercase();
                if lower.contains("password")
                    || lower.contains("secret")
                    || lower.contains("token")
                    || lower.contains("key")
                {
                    "Error details redacted".to_string()
                } else {
                    self.to_string()
                }
            }

            Error::RateLimited(msg) => format!("Upstream rate limit: {msg}"),
            Error::InvalidQuery(msg) => format!("Invalid search query: {msg}"),
            Error::Upstream { status, message } => {
                format!("GitHub API error ({status}): {message}")
            }
            Error::Json(_) => "JSON serialization failed".to_string(),
            Error::Yaml(_) => "YAML parsing failed".to_string(),
            Error::Csv(_) => "CSV serialization failed".to_string(),
            Error::InvalidUrl(_) => "Invalid URL provided".to_string(),
            Error::Io(_) => "File system operation failed".to_string(),
            Error::NotFound(msg) => format!("Not found: {msg}"),
            Error::Validation(msg) => format!("Validation error: {msg}"),
            Error::PayloadTooLarge(msg) => format!("Payload too large: {msg}"),
        }
    }

    /// HTTP status and client-facing message for this error
    fn status_and_message(&self) -> (StatusCode, String) {
        match self {
            Error::Validation(msg) | Error::InvalidQuery(msg) => {
                (StatusCode::BAD_REQUEST, msg.clone())
            }
            Error::NotFound(msg) => (StatusCode::NOT_FOUND, msg.clone()),
            Error::PayloadTooLarge(msg) => (StatusCode::PAYLOAD_TOO_LARGE, msg.clone()),
            Error::RateLimited(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg.clone()),
            Error::Upstream { message, .. } => {
                (StatusCode::INTERNAL_SERVER_ERROR, message.clone())
            }
            Error::Http(_) => (StatusCode::INTERNAL_SERVER_ERROR, self.to_string()),
            _ => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Internal server error".to_string(),
            ),
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        tracing::error!("Request error: {}", self.log_safe());

        let (status, error_message) = self.status_and_message();

        let body = Json(json!({
            "success": false,
            "error": error_message,
        }));

        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_maps_to_bad_request() {
        let (status, message) =
            Error::Validation("num_repos must be between 1 and 100".to_string())
                .status_and_message();
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(message, "num_repos must be between 1 and 100");
    }

    #[test]
    fn test_payload_too_large_status() {
        let (status, _) =
            Error::PayloadTooLarge("length limit exceeded".to_string()).status_and_message();
        assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);
    }

    #[test]
    fn test_upstream_message_is_surfaced() {
        let (status, message) = Error::Upstream {
            status: 503,
            message: "Service Unavailable".to_string(),
        }
        .status_and_message();
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(message, "Service Unavailable");
    }

    #[test]
    fn test_internal_details_are_hidden() {
        let err = Error::Internal("bad token ghp_abc".to_string());
        let (status, message) = err.status_and_message();
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(message, "Internal server error");
        assert_eq!(err.log_safe(), "Error details redacted");
    }
}
