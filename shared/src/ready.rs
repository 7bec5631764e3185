//! Readiness marker exchanged between a mock process and the supervisor
//!
//! A mock process prints exactly one line of the form
//! `HOSTSIM_READY {"name":"api","pid":4242,"ports":[8080]}` on stdout once it
//! has bound its ports.

use serde::{Deserialize, Serialize};

use crate::errors::{SharedError, SharedResult};

pub const READY_MARKER: &str = "HOSTSIM_READY";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReadyReport {
    pub name: String,
    pub pid: u32,
    pub ports: Vec<u16>,
}

impl ReadyReport {
    pub fn to_line(&self) -> SharedResult<String> {
        let payload = serde_json::to_string(self).map_err(|e| SharedError::SerializationError {
            message: e.to_string(),
        })?;
        Ok(format!("{READY_MARKER} {payload}"))
    }

    /// Parse a stdout line; `Ok(None)` when the line is not a marker
    pub fn parse_line(line: &str) -> SharedResult<Option<Self>> {
        let Some(rest) = line.trim().strip_prefix(READY_MARKER) else {
            return Ok(None);
        };
        serde_json::from_str(rest.trim())
            .map(Some)
            .map_err(|e| SharedError::InvalidReadyMarker {
                line: line.to_string(),
                message: e.to_string(),
            })
    }
}
