//! Mock process error types

use shared::{EXIT_PORT_UNAVAILABLE, EXIT_RUNTIME_FAILURE};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum MockError {
    #[error("Port {port} is unavailable: already in use")]
    PortUnavailable { port: u16 },

    #[error("Failed to bind port {port}: {source}")]
    Bind {
        port: u16,
        #[source]
        source: std::io::Error,
    },

    #[error("No port resolved for {kind} process")]
    MissingPort { kind: String },

    #[error("HTTP server error: {message}")]
    Server { message: String },

    #[error("Signal handling failed: {message}")]
    Signal { message: String },

    #[error("Invalid configuration: {field} = {value}")]
    Config { field: String, value: String },

    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),
}

impl MockError {
    pub fn config(field: impl Into<String>, value: impl Into<String>) -> Self {
        Self::Config {
            field: field.into(),
            value: value.into(),
        }
    }

    /// Process exit code reported for this failure
    pub fn exit_code(&self) -> i32 {
        match self {
            MockError::PortUnavailable { .. } => EXIT_PORT_UNAVAILABLE,
            _ => EXIT_RUNTIME_FAILURE,
        }
    }
}

pub type MockResult<T> = Result<T, MockError>;
