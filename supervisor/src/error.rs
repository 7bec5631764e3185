//! Supervisor-specific error types

use std::time::Duration;
use thiserror::Error;

use shared::ProcessKind;

/// Scenario rejected before any process is spawned
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Failed to read scenario {path}: {message}")]
    Unreadable { path: String, message: String },

    #[error("Malformed scenario: {message}")]
    Malformed { message: String },

    #[error("Scenario id must not be empty")]
    EmptyId,

    #[error("Scenario {id} defines no processes")]
    EmptyScenario { id: String },

    #[error("Process #{index} has an empty name")]
    EmptyName { index: usize },

    #[error("Duplicate process name: {name}")]
    DuplicateName { name: String },

    #[error("Unknown process kind '{kind}' for {process}")]
    UnknownKind { process: String, kind: String },

    #[error("Port {port} is claimed by both {first} and {second}")]
    PortCollision { port: u16, first: String, second: String },

    #[error("Invalid port for {process}: {value}")]
    InvalidPort { process: String, value: String },

    #[error("{process} ({kind}) must declare exactly {expected} port(s), found {found}")]
    PortCount {
        process: String,
        kind: ProcessKind,
        expected: usize,
        found: usize,
    },

    #[error("Entrypoint wrapper of {process} contains an empty element")]
    EmptyWrapper { process: String },

    #[error("Invalid entrypoint arguments for {process}: {message}")]
    InvalidArgs { process: String, message: String },

    #[error("Failed to load env file {path} for {process}: {message}")]
    EnvFile {
        process: String,
        path: String,
        message: String,
    },
}

impl ValidationError {
    pub fn malformed(message: impl Into<String>) -> Self {
        Self::Malformed {
            message: message.into(),
        }
    }

    pub fn invalid_args(process: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidArgs {
            process: process.into(),
            message: message.into(),
        }
    }

    pub fn invalid_port(process: impl Into<String>, value: impl ToString) -> Self {
        Self::InvalidPort {
            process: process.into(),
            value: value.to_string(),
        }
    }
}

/// Why a process did not become ready
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StartupFailure {
    #[error("not ready within {timeout:?}")]
    Timeout { timeout: Duration },

    #[error("exited before becoming ready (exit code {code})")]
    EarlyExit { code: i32 },

    #[error("port unavailable")]
    PortUnavailable,

    #[error("malformed readiness marker: {message}")]
    MalformedMarker { message: String },

    #[error("reported ports {reported:?}, expected {expected:?}")]
    PortMismatch { expected: Vec<u16>, reported: Vec<u16> },

    #[error("spawn failed: {message}")]
    Spawn { message: String },

    #[error("lost track of process: {message}")]
    Lost { message: String },
}

#[derive(Error, Debug)]
pub enum SupervisorError {
    #[error("Scenario validation failed: {0}")]
    Validation(#[from] ValidationError),

    #[error("Process {process} failed to start: {reason}")]
    Startup { process: String, reason: StartupFailure },

    #[error("Failed to spawn {process}: {message}")]
    Spawn { process: String, message: String },

    #[error("Failed to signal {process}: {message}")]
    Signal { process: String, message: String },

    #[error("Supervisor already ran scenario {scenario}")]
    AlreadyStarted { scenario: String },

    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("JSON serialization error: {0}")]
    JsonError(#[from] serde_json::Error),
}

impl SupervisorError {
    pub fn spawn(process: impl Into<String>, message: impl ToString) -> Self {
        Self::Spawn {
            process: process.into(),
            message: message.to_string(),
        }
    }

    pub fn signal(process: impl Into<String>, message: impl ToString) -> Self {
        Self::Signal {
            process: process.into(),
            message: message.to_string(),
        }
    }
}

pub type SupervisorResult<T> = Result<T, SupervisorError>;
