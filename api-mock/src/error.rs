use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for api-mock operations
pub type Result<T> = std::result::Result<T, MockError>;

/// Error types for the mock harness and its transports
#[derive(Debug, Error)]
pub enum MockError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Configuration parse error: {0}")]
    ConfigParse(#[from] toml::de::Error),

    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("URL parse error: {0}")]
    UrlParse(#[from] url::ParseError),

    #[error("Configuration file not found: {path}")]
    ConfigNotFound { path: PathBuf },

    #[error("Invalid configuration: {message}")]
    InvalidConfig { message: String },

    #[error("No route registered for {method} {path}")]
    UnmatchedRoute { method: String, path: String },

    #[error("Route {method} {pattern} matched but has no handler attached")]
    MissingHandler { method: String, pattern: String },

    #[error("Transport failure: {message}")]
    Transport { message: String },

    #[error("Expected {expected} at '{pointer}', found {actual}")]
    UnexpectedType {
        pointer: String,
        expected: &'static str,
        actual: &'static str,
    },

    #[error("Missing key '{key}'")]
    MissingKey { key: String },

    #[error("API returned {status} {code}: {message}")]
    Api {
        status: u16,
        code: String,
        message: String,
    },

    #[error("Scenario step {step} failed: {message}")]
    Scenario { step: usize, message: String },

    #[error("General error: {message}")]
    General { message: String },
}

impl MockError {
    /// Create a new invalid configuration error
    pub fn invalid_config<S: Into<String>>(message: S) -> Self {
        Self::InvalidConfig {
            message: message.into(),
        }
    }

    /// Create a simulated transport failure, returned by handlers that model a broken connection
    pub fn transport<S: Into<String>>(message: S) -> Self {
        Self::Transport {
            message: message.into(),
        }
    }

    /// Create a new scenario failure error
    pub fn scenario<S: Into<String>>(step: usize, message: S) -> Self {
        Self::Scenario {
            step,
            message: message.into(),
        }
    }

    /// Create a new general error
    pub fn general<S: Into<String>>(message: S) -> Self {
        Self::General {
            message: message.into(),
        }
    }

    /// HTTP status carried by an API error, if any
    pub fn api_status(&self) -> Option<u16> {
        match self {
            Self::Api { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Envelope code carried by an API error, if any
    pub fn api_code(&self) -> Option<&str> {
        match self {
            Self::Api { code, .. } => Some(code.as_str()),
            _ => None,
        }
    }
}
