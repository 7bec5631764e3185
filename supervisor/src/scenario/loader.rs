//! JSON scenario parsing and resolution into [`ScenarioDescriptor`]

use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use shared::{EntrypointSpec, PortSpec, ProcessKind, ProcessSpec};

use super::{ScenarioDescriptor, validation};
use crate::error::ValidationError;

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawScenario {
    id: String,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    env: BTreeMap<String, String>,
    #[serde(default)]
    processes: Vec<RawProcess>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawProcess {
    #[serde(default)]
    name: String,
    kind: String,
    #[serde(default)]
    ports: Vec<RawPort>,
    #[serde(default)]
    env: BTreeMap<String, String>,
    #[serde(default)]
    env_file: Option<PathBuf>,
    #[serde(default)]
    entrypoint: EntrypointSpec,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawPort {
    #[serde(default)]
    name: Option<String>,
    number: i64,
}

pub fn load_file(path: &Path) -> Result<ScenarioDescriptor, ValidationError> {
    let json = std::fs::read_to_string(path).map_err(|e| ValidationError::Unreadable {
        path: path.display().to_string(),
        message: e.to_string(),
    })?;
    let base_dir = path.parent().unwrap_or_else(|| Path::new("."));
    parse_str(&json, base_dir)
}

pub fn parse_str(json: &str, base_dir: &Path) -> Result<ScenarioDescriptor, ValidationError> {
    let raw: RawScenario = serde_json::from_str(json).map_err(|e| ValidationError::malformed(e.to_string()))?;

    if raw.id.trim().is_empty() {
        return Err(ValidationError::EmptyId);
    }
    if raw.processes.is_empty() {
        return Err(ValidationError::EmptyScenario { id: raw.id });
    }

    let processes = raw
        .processes
        .into_iter()
        .enumerate()
        .map(|(index, process)| resolve_process(index, process, &raw.env, base_dir))
        .collect::<Result<Vec<_>, _>>()?;

    validation::check_unique_names(&processes)?;
    validation::check_port_collisions(&processes)?;

    Ok(ScenarioDescriptor {
        id: raw.id,
        description: raw.description,
        env: raw.env,
        processes,
    })
}

fn resolve_process(
    index: usize,
    raw: RawProcess,
    shared_env: &BTreeMap<String, String>,
    base_dir: &Path,
) -> Result<ProcessSpec, ValidationError> {
    if raw.name.trim().is_empty() {
        return Err(ValidationError::EmptyName { index });
    }
    let name = raw.name;

    let kind: ProcessKind = raw.kind.parse().map_err(|_| ValidationError::UnknownKind {
        process: name.clone(),
        kind: raw.kind.clone(),
    })?;

    // shared < env_file < per-process
    let mut env = shared_env.clone();
    if let Some(env_file) = &raw.env_file {
        env.extend(read_env_file(&name, &base_dir.join(env_file))?);
    }
    env.extend(raw.env);

    validation::check_entrypoint(&name, &raw.entrypoint)?;
    let ports = resolve_ports(&name, kind, raw.ports, &env)?;

    Ok(ProcessSpec {
        name,
        kind,
        ports,
        env,
        entrypoint: raw.entrypoint,
    })
}

fn read_env_file(process: &str, path: &Path) -> Result<Vec<(String, String)>, ValidationError> {
    let env_file_error = |message: String| ValidationError::EnvFile {
        process: process.to_string(),
        path: path.display().to_string(),
        message,
    };

    dotenv::from_path_iter(path)
        .map_err(|e| env_file_error(e.to_string()))?
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| env_file_error(e.to_string()))
}

fn parse_port(process: &str, raw: &str) -> Result<u16, ValidationError> {
    raw.trim()
        .parse::<u16>()
        .ok()
        .filter(|port| *port != 0)
        .ok_or_else(|| ValidationError::invalid_port(process, raw))
}

/// Effective ports: declared ones, else the kind's env variable, else its default
fn resolve_ports(
    process: &str,
    kind: ProcessKind,
    declared: Vec<RawPort>,
    env: &BTreeMap<String, String>,
) -> Result<Vec<PortSpec>, ValidationError> {
    let expected = kind.port_count();
    let count_error = |found: usize| ValidationError::PortCount {
        process: process.to_string(),
        kind,
        expected,
        found,
    };

    if declared.is_empty() && expected > 0 {
        let number = match kind.port_env_var().and_then(|var| env.get(var)) {
            Some(raw) => parse_port(process, raw)?,
            None => kind.default_port().ok_or_else(|| count_error(0))?,
        };
        return Ok(vec![PortSpec::new(kind.default_port_name(), number)]);
    }

    if declared.len() != expected {
        return Err(count_error(declared.len()));
    }

    declared
        .into_iter()
        .map(|port| {
            let number = u16::try_from(port.number)
                .ok()
                .filter(|n| *n != 0)
                .ok_or_else(|| ValidationError::invalid_port(process, port.number))?;
            let name = port.name.unwrap_or_else(|| kind.default_port_name().to_string());
            Ok(PortSpec::new(name, number))
        })
        .collect()
}
