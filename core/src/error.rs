//! Error types for the typed HTTP client.
//!
//! # Design
//! Three failure sources stay distinguishable: local argument checks
//! (`InvalidArgument`, raised before any I/O), completed calls with a non-2xx
//! status (`HttpRequest`), and the network call itself failing (`Transport`).

use thiserror::Error;

/// Errors returned by `TypedHttpClient`.
#[derive(Debug, Error)]
pub enum ClientError {
    /// The request path was empty. Never reaches the transport.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// The server answered with a non-2xx status. Displays as the reason
    /// phrase alone, e.g. `Not Found`.
    #[error("{}", reason_or_status(.status, .reason))]
    HttpRequest { status: u16, reason: String },

    /// The round-trip did not complete (DNS, connect, timeout, ...).
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// The request body could not be serialized to JSON.
    #[error("serialization failed: {0}")]
    Serialization(String),

    /// The response body could not be deserialized into the expected type.
    #[error("deserialization failed: {0}")]
    Deserialization(String),
}

impl ClientError {
    /// Status code for `HttpRequest` errors.
    pub fn status(&self) -> Option<u16> {
        match self {
            ClientError::HttpRequest { status, .. } => Some(*status),
            _ => None,
        }
    }
}

fn reason_or_status(status: &u16, reason: &str) -> String {
    if reason.is_empty() {
        format!("HTTP {status}")
    } else {
        reason.to_string()
    }
}

/// Network-level failures reported by a `Transport`.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("connection failed: {0}")]
    Connect(String),

    #[error("request timed out: {0}")]
    Timeout(String),

    /// The request could not be built or encoded (bad URL, bad header, ...).
    #[error("invalid request: {0}")]
    Request(String),

    #[error("failed to read response body: {0}")]
    Body(String),

    #[error("transport failure: {0}")]
    Other(String),
}

impl From<reqwest::Error> for TransportError {
    fn from(err: reqwest::Error) -> Self {
        let msg = err.to_string();
        if err.is_timeout() {
            TransportError::Timeout(msg)
        } else if err.is_connect() {
            TransportError::Connect(msg)
        } else if err.is_builder() || err.is_request() {
            TransportError::Request(msg)
        } else if err.is_body() || err.is_decode() {
            TransportError::Body(msg)
        } else {
            TransportError::Other(msg)
        }
    }
}

/// Failure to load or validate `HttpClientConfig`.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to load http client configuration: {0}")]
    Load(#[from] Box<figment::Error>),

    /// A loaded value cannot be sent as the header it configures.
    #[error("invalid http client configuration: {0}")]
    Invalid(String),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        ConfigError::Load(Box::new(err))
    }
}
