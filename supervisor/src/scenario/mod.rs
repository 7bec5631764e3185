//! Scenario Descriptor: the validated topology of one simulated host

pub mod loader;
pub mod validation;

use serde::Serialize;
use std::collections::BTreeMap;
use std::path::Path;

use shared::ProcessSpec;

use crate::error::{SupervisorResult, ValidationError};

/// A validated, fully resolved scenario
///
/// Ports are effective (env and kind defaults applied) and every process env
/// is already merged. Serializing and loading again yields an equal value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScenarioDescriptor {
    pub id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Shared overrides, already merged into every process env
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub env: BTreeMap<String, String>,
    pub processes: Vec<ProcessSpec>,
}

impl ScenarioDescriptor {
    /// Load a scenario file; env files resolve against its directory
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ValidationError> {
        loader::load_file(path.as_ref())
    }

    /// Parse an in-memory scenario; env files resolve against the working directory
    pub fn from_json(json: &str) -> Result<Self, ValidationError> {
        loader::parse_str(json, Path::new("."))
    }

    pub fn to_json(&self) -> SupervisorResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn process(&self, name: &str) -> Option<&ProcessSpec> {
        self.processes.iter().find(|p| p.name == name)
    }

    /// Every port the scenario binds, in descriptor order
    pub fn ports(&self) -> Vec<u16> {
        self.processes.iter().flat_map(|p| p.port_numbers()).collect()
    }
}
