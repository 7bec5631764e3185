//! Core types used throughout the host simulator

pub mod process;

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::OnceLock;

pub use process::{EntrypointSpec, PortSpec, ProcessKind, ProcessSpec};

/// Global process ID singleton - set once at startup
static PROCESS_ID: OnceLock<ProcessId> = OnceLock::new();

/// Identity reported before any `init_*` call (library code under test)
static UNASSIGNED: ProcessId = ProcessId::Supervisor;

/// Process identifier for any component in the system
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ProcessId {
    /// Host supervisor (singleton)
    Supervisor,
    /// Mock process, named after its scenario entry
    Mock(String),
}

impl ProcessId {
    /// Initialize the global process ID for the supervisor
    pub fn init_supervisor() -> &'static ProcessId {
        PROCESS_ID.get_or_init(|| ProcessId::Supervisor)
    }

    /// Initialize the global process ID for a mock process
    pub fn init_mock(name: &str) -> &'static ProcessId {
        PROCESS_ID.get_or_init(|| ProcessId::Mock(name.to_string()))
    }

    /// Get the global process ID, falling back to the supervisor identity
    pub fn current() -> &'static ProcessId {
        PROCESS_ID.get().unwrap_or(&UNASSIGNED)
    }

    pub fn is_supervisor(&self) -> bool {
        matches!(self, ProcessId::Supervisor)
    }
}

impl fmt::Display for ProcessId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProcessId::Supervisor => write!(f, "supervisor"),
            ProcessId::Mock(name) => write!(f, "mock_{name}"),
        }
    }
}
