use miette::Diagnostic;
use thiserror::Error;

/// Main error type for the application
#[derive(Debug, Error, Diagnostic)]
pub enum Error {
    #[error("Unauthorized")]
    #[diagnostic(code(meeting_prep::unauthorized))]
    Unauthorized,

    #[error("Upstream unavailable: {0}")]
    #[diagnostic(code(meeting_prep::upstream))]
    UpstreamUnavailable(String),

    #[error("{0}")]
    #[diagnostic(code(meeting_prep::validation))]
    Validation(String),

    #[error("Environment error: {0}")]
    #[diagnostic(code(meeting_prep::environment))]
    Environment(String),

    #[error("Configuration error: {0}")]
    #[diagnostic(code(meeting_prep::config))]
    Config(String),

    #[error(transparent)]
    #[diagnostic(code(meeting_prep::io))]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    #[diagnostic(code(meeting_prep::serialization))]
    Serialization(String),

    #[error("Other error: {0}")]
    #[diagnostic(code(meeting_prep::other))]
    Other(String),
}

impl From<toml::de::Error> for Error {
    fn from(err: toml::de::Error) -> Self {
        Error::Serialization(err.to_string())
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Serialization(err.to_string())
    }
}

/// Type alias for Result with our Error type
pub type PrepResult<T> = Result<T, Error>;

/// Helper to create environment errors
pub fn env_error(var: &str) -> Error {
    Error::Environment(format!("Missing environment variable: {}", var))
}

/// Helper to create configuration errors
pub fn config_error(message: &str) -> Error {
    Error::Config(message.to_string())
}

/// Helper to create upstream errors
pub fn upstream_error(message: &str) -> Error {
    Error::UpstreamUnavailable(message.to_string())
}

/// Helper to create validation errors
pub fn validation_error(message: &str) -> Error {
    Error::Validation(message.to_string())
}

/// Helper to create other errors
pub fn other_error(message: &str) -> Error {
    Error::Other(message.to_string())
}

/// Map a failed upstream HTTP status into an error, keeping 401 distinct
pub(crate) fn status_error(service: &str, status: reqwest::StatusCode, body: &str) -> Error {
    if status == reqwest::StatusCode::UNAUTHORIZED {
        Error::Unauthorized
    } else {
        upstream_error(&format!("{} returned HTTP {} - {}", service, status, body))
    }
}
