//! Host supervisor library for the multi-process host simulator
//!
//! Loads scenario descriptors, launches their mock processes as isolated OS
//! processes, tracks readiness and liveness, and coordinates shutdown.

pub mod error;
pub mod scenario;
pub mod services;
pub mod state;
pub mod supervisor;
pub mod traits;

// Re-export commonly used types
pub use error::{StartupFailure, SupervisorError, SupervisorResult, ValidationError};
pub use scenario::ScenarioDescriptor;
pub use services::{RealProcessLauncher, TraceBuffer};
pub use state::{ProcessState, ProcessStatus, ShutdownReport};
pub use supervisor::{DEFAULT_READINESS_TIMEOUT, DEFAULT_SHUTDOWN_TIMEOUT, HostSupervisor};
pub use traits::{ChildProcess, Launched, ProcessLauncher};
