//! Environment-derived configuration of a mock process
//!
//! The process environment is captured once at startup into a
//! [`RuntimeConfig`]; adapters only ever see this object.

use std::collections::BTreeMap;
use std::fmt;

use shared::{ProcessKind, env, redact_secret};

use crate::error::{MockError, MockResult};

/// Where an effective configuration value came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Source {
    Env,
    Default,
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Source::Env => write!(f, "env"),
            Source::Default => write!(f, "default"),
        }
    }
}

/// One effective configuration value
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Setting {
    pub name: &'static str,
    pub value: String,
    pub source: Source,
}

impl Setting {
    /// Value as it may appear in a trace
    pub fn display_value(&self) -> String {
        if env::is_secret(self.name) {
            redact_secret(&self.value)
        } else {
            self.value.clone()
        }
    }

    /// Startup trace line, e.g. `APP_CONFIG_PATH: /etc/app.yaml (source: env)`
    pub fn trace_line(&self) -> String {
        format!("{}: {} (source: {})", self.name, self.display_value(), self.source)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RuntimeConfig {
    vars: BTreeMap<String, String>,
}

impl RuntimeConfig {
    pub fn from_vars<I, K, V>(vars: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            vars: vars.into_iter().map(|(k, v)| (k.into(), v.into())).collect(),
        }
    }

    /// Effective value of a well-known variable
    pub fn setting(&self, name: &'static str) -> Setting {
        match self.vars.get(name) {
            Some(value) => Setting {
                name,
                value: value.clone(),
                source: Source::Env,
            },
            None => Setting {
                name,
                value: env::default_value(name).unwrap_or_else(|| env::NOT_SET.to_string()),
                source: Source::Default,
            },
        }
    }

    pub fn log_level(&self) -> String {
        self.setting(env::LOG_LEVEL).value
    }

    pub fn worker_concurrency(&self) -> MockResult<usize> {
        let setting = self.setting(env::WORKER_CONCURRENCY);
        match setting.value.trim().parse::<usize>() {
            Ok(n) if n > 0 => Ok(n),
            _ => Err(MockError::config(env::WORKER_CONCURRENCY, setting.value)),
        }
    }

    /// Port named by the kind's environment variable, if set
    pub fn env_port(&self, kind: ProcessKind) -> MockResult<Option<u16>> {
        let Some(var) = kind.port_env_var() else {
            return Ok(None);
        };
        match self.vars.get(var) {
            Some(raw) => raw
                .trim()
                .parse::<u16>()
                .map(Some)
                .map_err(|_| MockError::config(var, raw.clone())),
            None => Ok(None),
        }
    }

    /// Resolve the port to bind: explicit argument, then env, then default
    pub fn resolve_port(&self, kind: ProcessKind, explicit: Option<u16>) -> MockResult<Option<u16>> {
        if kind.port_count() == 0 {
            return Ok(None);
        }
        if explicit.is_some() {
            return Ok(explicit);
        }
        Ok(self.env_port(kind)?.or(kind.default_port()))
    }

    pub fn trace_lines(&self, names: &[&'static str]) -> Vec<String> {
        names.iter().map(|name| self.setting(*name).trace_line()).collect()
    }
}
