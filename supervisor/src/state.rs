//! Observable lifecycle state of supervised processes

use serde::Serialize;
use std::fmt;

use shared::ProcessKind;

/// Lifecycle of one supervised process
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ProcessState {
    Starting,
    Running,
    Stopping,
    /// Exited on its own or after SIGTERM
    Exited(i32),
    /// Killed after the graceful deadline
    ForcedExit(i32),
    /// Never became ready, or could not be stopped
    Failed(String),
}

impl ProcessState {
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            ProcessState::Exited(_) | ProcessState::ForcedExit(_) | ProcessState::Failed(_)
        )
    }

    pub fn exit_code(&self) -> Option<i32> {
        match self {
            ProcessState::Exited(code) | ProcessState::ForcedExit(code) => Some(*code),
            _ => None,
        }
    }
}

impl fmt::Display for ProcessState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProcessState::Starting => write!(f, "starting"),
            ProcessState::Running => write!(f, "running"),
            ProcessState::Stopping => write!(f, "stopping"),
            ProcessState::Exited(code) => write!(f, "exited ({code})"),
            ProcessState::ForcedExit(code) => write!(f, "forced exit ({code})"),
            ProcessState::Failed(reason) => write!(f, "failed: {reason}"),
        }
    }
}

/// Point-in-time view of one process
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProcessStatus {
    pub name: String,
    pub kind: ProcessKind,
    pub pid: Option<u32>,
    pub state: ProcessState,
    pub bound_ports: Vec<u16>,
}

/// Final status of every process after shutdown, in descriptor order
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ShutdownReport {
    pub processes: Vec<ProcessStatus>,
}

impl ShutdownReport {
    /// Every process exited on its own with code 0
    pub fn all_graceful(&self) -> bool {
        self.processes.iter().all(|p| p.state == ProcessState::Exited(0))
    }

    pub fn forced(&self) -> Vec<&ProcessStatus> {
        self.processes
            .iter()
            .filter(|p| matches!(p.state, ProcessState::ForcedExit(_)))
            .collect()
    }

    pub fn get(&self, name: &str) -> Option<&ProcessStatus> {
        self.processes.iter().find(|p| p.name == name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn status(name: &str, state: ProcessState) -> ProcessStatus {
        ProcessStatus {
            name: name.to_string(),
            kind: ProcessKind::Worker,
            pid: Some(1),
            state,
            bound_ports: vec![],
        }
    }

    #[test]
    fn test_terminal_states() {
        assert!(!ProcessState::Running.is_terminal());
        assert!(!ProcessState::Stopping.is_terminal());
        assert!(ProcessState::Exited(0).is_terminal());
        assert!(ProcessState::ForcedExit(137).is_terminal());
        assert!(ProcessState::Failed("gone".to_string()).is_terminal());
    }

    #[test]
    fn test_report_classification() {
        let report = ShutdownReport {
            processes: vec![
                status("api", ProcessState::Exited(0)),
                status("batch", ProcessState::ForcedExit(137)),
            ],
        };

        assert!(!report.all_graceful());
        assert_eq!(report.forced().len(), 1);
        assert_eq!(report.get("batch").unwrap().state.exit_code(), Some(137));
    }

    #[test]
    fn test_state_serialization() {
        assert_eq!(serde_json::to_string(&ProcessState::Running).unwrap(), r#""running""#);
        assert_eq!(
            serde_json::to_string(&ProcessState::ForcedExit(137)).unwrap(),
            r#"{"forced_exit":137}"#
        );
    }
}
