//! Scenario-level process description

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use crate::env;
use crate::errors::SharedError;

/// The class of workload a mock process emulates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProcessKind {
    Api,
    Metrics,
    Worker,
    Batch,
    Wrapped,
}

impl ProcessKind {
    pub const ALL: [ProcessKind; 5] = [
        ProcessKind::Api,
        ProcessKind::Metrics,
        ProcessKind::Worker,
        ProcessKind::Batch,
        ProcessKind::Wrapped,
    ];

    /// Number of ports a process of this kind binds
    pub fn port_count(&self) -> usize {
        match self {
            ProcessKind::Api | ProcessKind::Metrics | ProcessKind::Wrapped => 1,
            ProcessKind::Worker | ProcessKind::Batch => 0,
        }
    }

    /// Port used when neither the scenario nor the environment names one
    pub fn default_port(&self) -> Option<u16> {
        match self {
            ProcessKind::Api | ProcessKind::Wrapped => Some(env::DEFAULT_API_PORT),
            ProcessKind::Metrics => Some(env::DEFAULT_METRICS_PORT),
            ProcessKind::Worker | ProcessKind::Batch => None,
        }
    }

    /// Environment variable that may override the default port
    pub fn port_env_var(&self) -> Option<&'static str> {
        match self {
            ProcessKind::Api => Some(env::API_PORT),
            ProcessKind::Metrics => Some(env::METRICS_PORT),
            _ => None,
        }
    }

    /// Conventional name of the port a kind exposes
    pub fn default_port_name(&self) -> &'static str {
        match self {
            ProcessKind::Metrics => "metrics",
            _ => "http",
        }
    }

    /// Whether the kind exits cleanly on SIGTERM/SIGINT
    pub fn is_graceful(&self) -> bool {
        !matches!(self, ProcessKind::Batch)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ProcessKind::Api => "api",
            ProcessKind::Metrics => "metrics",
            ProcessKind::Worker => "worker",
            ProcessKind::Batch => "batch",
            ProcessKind::Wrapped => "wrapped",
        }
    }
}

impl fmt::Display for ProcessKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProcessKind {
    type Err = SharedError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "api" => Ok(ProcessKind::Api),
            "metrics" => Ok(ProcessKind::Metrics),
            "worker" => Ok(ProcessKind::Worker),
            "batch" => Ok(ProcessKind::Batch),
            "wrapped" => Ok(ProcessKind::Wrapped),
            _ => Err(SharedError::UnknownKind { kind: s.to_string() }),
        }
    }
}

/// A named port a process binds
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PortSpec {
    pub name: String,
    pub number: u16,
}

impl PortSpec {
    pub fn new(name: impl Into<String>, number: u16) -> Self {
        Self {
            name: name.into(),
            number,
        }
    }
}

/// How the mock process command line is assembled
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EntrypointSpec {
    /// Command prefix the mock process is launched through (e.g. `["env"]`)
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub wrapper: Vec<String>,
    /// Extra arguments appended to the mock process command line
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub args: Vec<String>,
}

impl EntrypointSpec {
    pub fn is_empty(&self) -> bool {
        self.wrapper.is_empty() && self.args.is_empty()
    }
}

/// Fully resolved description of one process in a scenario
///
/// `ports` holds the effective ports (defaults already applied) and `env` the
/// merged environment the process is spawned with.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ProcessSpec {
    pub name: String,
    pub kind: ProcessKind,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub ports: Vec<PortSpec>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub env: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "EntrypointSpec::is_empty")]
    pub entrypoint: EntrypointSpec,
}

impl ProcessSpec {
    pub fn port_numbers(&self) -> Vec<u16> {
        self.ports.iter().map(|p| p.number).collect()
    }

    /// The single port of an HTTP kind, if any
    pub fn primary_port(&self) -> Option<u16> {
        self.ports.first().map(|p| p.number)
    }
}
