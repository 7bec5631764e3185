//! Real process launching service implementation
//!
//! Spawns the `mockproc` binary for each scenario process, optionally through
//! a wrapper command, with a cleared environment and its own process group.

use async_trait::async_trait;
use nix::errno::Errno;
use nix::sys::signal::{Signal, killpg};
use nix::unistd::Pid;
use std::os::unix::process::{CommandExt, ExitStatusExt};
use std::path::PathBuf;
use std::process::{ExitStatus, Stdio};
use tokio::process::{Child, Command};

use shared::{ProcessId, ProcessSpec, process_debug};

use super::process_output_handler::{TraceBuffer, spawn_output_consumers};
use crate::error::{SupervisorError, SupervisorResult};
use crate::traits::{ChildProcess, Launched, ProcessLauncher};

pub const MOCKPROC_BINARY: &str = "mockproc";

/// Exit code of a finished process; signal deaths map to `128 + signal`
pub fn exit_code(status: ExitStatus) -> i32 {
    status
        .code()
        .unwrap_or_else(|| 128 + status.signal().unwrap_or_default())
}

/// Real launcher spawning `mockproc` child processes
#[derive(Debug, Clone)]
pub struct RealProcessLauncher {
    /// Path of the mock process binary
    binary: PathBuf,
}

impl RealProcessLauncher {
    pub fn new(binary: impl Into<PathBuf>) -> Self {
        Self { binary: binary.into() }
    }

    /// Locate `mockproc` next to the running executable
    pub fn beside_current_exe() -> SupervisorResult<Self> {
        let current = std::env::current_exe()?;
        Ok(Self::new(current.with_file_name(MOCKPROC_BINARY)))
    }


    /// Build the command line for `spec` without spawning it
    pub fn command(&self, spec: &ProcessSpec) -> Command {
        let mut cmd = match spec.entrypoint.wrapper.split_first() {
            Some((program, wrapper_args)) => {
                let mut cmd = std::process::Command::new(program);
                cmd.args(wrapper_args).arg(&self.binary);
                cmd
            }
            None => std::process::Command::new(&self.binary),
        };

        cmd.arg(spec.kind.as_str()).arg("--name").arg(&spec.name);
        if let Some(port) = spec.primary_port() {
            cmd.arg("--port").arg(port.to_string());
        }
        cmd.args(&spec.entrypoint.args);

        cmd.env_clear()
            .envs(&spec.env)
            .process_group(0)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());

        let mut cmd = Command::from(cmd);
        cmd.kill_on_drop(true);
        cmd
    }
}

#[async_trait]
impl ProcessLauncher for RealProcessLauncher {
    async fn launch(&self, spec: &ProcessSpec) -> SupervisorResult<Launched> {
        let mut child = self
            .command(spec)
            .spawn()
            .map_err(|e| SupervisorError::spawn(&spec.name, e))?;

        let pid = child.id();
        let trace = TraceBuffer::default();
        let ready = spawn_output_consumers(&mut child, &spec.name, &trace);

        process_debug!(
            ProcessId::current(),
            "Spawned {} ({}) PID: {:?} ports: {:?}",
            spec.name,
            spec.kind,
            pid,
            spec.port_numbers()
        );

        Ok(Launched {
            child: Box::new(RealChildProcess {
                name: spec.name.clone(),
                pid,
                child,
            }),
            ready,
            trace,
        })
    }
}

/// A spawned OS process leading its own process group
pub struct RealChildProcess {
    name: String,
    pid: Option<u32>,
    child: Child,
}

#[async_trait]
impl ChildProcess for RealChildProcess {
    fn pid(&self) -> Option<u32> {
        self.pid
    }

    fn signal(&self, signal: Signal) -> SupervisorResult<()> {
        let Some(pid) = self.pid else {
            return Ok(());
        };
        match killpg(Pid::from_raw(pid as i32), signal) {
            // Already gone
            Ok(()) | Err(Errno::ESRCH) => Ok(()),
            Err(e) => Err(SupervisorError::signal(&self.name, e)),
        }
    }

    fn try_wait(&mut self) -> SupervisorResult<Option<i32>> {
        Ok(self.child.try_wait()?.map(exit_code))
    }

    async fn wait(&mut self) -> SupervisorResult<i32> {
        Ok(exit_code(self.child.wait().await?))
    }
}
