//! Cross-process scenario checks

use std::collections::{HashMap, HashSet};

use shared::{EntrypointSpec, ProcessSpec};

use crate::error::ValidationError;

pub fn check_unique_names(processes: &[ProcessSpec]) -> Result<(), ValidationError> {
    let mut seen = HashSet::new();
    for process in processes {
        if !seen.insert(process.name.as_str()) {
            return Err(ValidationError::DuplicateName {
                name: process.name.clone(),
            });
        }
    }
    Ok(())
}

/// Effective port numbers must be unique across the whole scenario
pub fn check_port_collisions(processes: &[ProcessSpec]) -> Result<(), ValidationError> {
    let mut owners: HashMap<u16, &str> = HashMap::new();
    for process in processes {
        for port in process.port_numbers() {
            if let Some(first) = owners.insert(port, &process.name) {
                return Err(ValidationError::PortCollision {
                    port,
                    first: first.to_string(),
                    second: process.name.clone(),
                });
            }
        }
    }
    Ok(())
}

/// Options the launcher always sets itself
const RESERVED_OPTIONS: [&str; 2] = ["--port", "--name"];
const INTERVAL_OPTION: &str = "--interval-ms";

pub fn check_entrypoint(process: &str, entrypoint: &EntrypointSpec) -> Result<(), ValidationError> {
    if entrypoint.wrapper.iter().any(|part| part.trim().is_empty()) {
        return Err(ValidationError::EmptyWrapper {
            process: process.to_string(),
        });
    }
    check_args(process, &entrypoint.args)
}

/// Extra mock arguments may only tune the cycle interval, which must be positive
fn check_args(process: &str, args: &[String]) -> Result<(), ValidationError> {
    let mut iter = args.iter();
    while let Some(arg) = iter.next() {
        let (option, inline) = match arg.split_once('=') {
            Some((option, value)) => (option, Some(value)),
            None => (arg.as_str(), None),
        };

        if RESERVED_OPTIONS.contains(&option) {
            return Err(ValidationError::invalid_args(
                process,
                format!("{option} is set by the supervisor"),
            ));
        }
        if option != INTERVAL_OPTION {
            return Err(ValidationError::invalid_args(process, format!("unsupported argument '{arg}'")));
        }

        let Some(value) = inline.or_else(|| iter.next().map(String::as_str)) else {
            return Err(ValidationError::invalid_args(process, format!("{INTERVAL_OPTION} needs a value")));
        };
        if !matches!(value.trim().parse::<u64>(), Ok(ms) if ms > 0) {
            return Err(ValidationError::invalid_args(
                process,
                format!("{INTERVAL_OPTION} must be a positive integer, got '{value}'"),
            ));
        }
    }
    Ok(())
}
