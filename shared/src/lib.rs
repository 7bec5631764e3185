//! Shared types for the host simulator
//!
//! Contains the scenario data model, the readiness protocol spoken between
//! the supervisor and its mock processes, and process-aware logging.

pub mod env;
pub mod errors;
pub mod logging;
pub mod ready;
pub mod redact;
pub mod types;

pub use errors::*;
pub use ready::{READY_MARKER, ReadyReport};
pub use redact::redact_secret;
pub use types::*;

/// Exit code of a mock process whose port was already taken
pub const EXIT_PORT_UNAVAILABLE: i32 = 98;

/// Exit code of a mock process that failed for any other reason
pub const EXIT_RUNTIME_FAILURE: i32 = 1;
