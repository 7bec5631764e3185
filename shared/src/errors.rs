//! Shared error types for the host simulator

use thiserror::Error;

#[derive(Error, Debug)]
pub enum SharedError {
    #[error("Unknown process kind: {kind}")]
    UnknownKind { kind: String },

    #[error("Serialization failed: {message}")]
    SerializationError { message: String },

    #[error("Malformed readiness marker '{line}': {message}")]
    InvalidReadyMarker { line: String, message: String },
}

pub type SharedResult<T> = Result<T, SharedError>;
