//! Host Supervisor: runs one scenario as a set of isolated OS processes
//!
//! Processes are launched in descriptor order and awaited for readiness
//! concurrently under a single deadline. Shutdown fans SIGTERM out to every
//! live process, fans exit observation back in, and escalates to SIGKILL for
//! whatever is left when the deadline passes.

use futures_util::future::join_all;
use nix::sys::signal::Signal;
use std::time::Duration;
use tokio::time::{Instant, timeout, timeout_at};
use uuid::Uuid;

use shared::{
    ProcessId, ProcessSpec, ReadyReport, logging, process_debug, process_error, process_info,
    process_warn,
};

use crate::error::{StartupFailure, SupervisorError, SupervisorResult};
use crate::scenario::ScenarioDescriptor;
use crate::services::TraceBuffer;
use crate::state::{ProcessState, ProcessStatus, ShutdownReport};
use crate::traits::{ChildProcess, Launched, ProcessLauncher, ReadySignal};

pub const DEFAULT_READINESS_TIMEOUT: Duration = Duration::from_secs(10);
pub const DEFAULT_SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(5);

/// How long a SIGKILLed process may take to be reaped
pub const KILL_GRACE: Duration = Duration::from_secs(2);

/// Graceful deadline for processes torn down after a failed start
pub const STARTUP_TEARDOWN_TIMEOUT: Duration = Duration::from_secs(2);

/// Supervisor-owned runtime state of one process
pub struct ProcessHandle {
    spec: ProcessSpec,
    pid: Option<u32>,
    state: ProcessState,
    bound_ports: Vec<u16>,
    /// Present until the process has been reaped
    child: Option<Box<dyn ChildProcess>>,
    ready: Option<ReadySignal>,
    trace: TraceBuffer,
    startup_failure: Option<StartupFailure>,
}

impl ProcessHandle {
    fn launched(spec: ProcessSpec, launched: Launched) -> Self {
        Self {
            pid: launched.child.pid(),
            spec,
            state: ProcessState::Starting,
            bound_ports: Vec::new(),
            child: Some(launched.child),
            ready: Some(launched.ready),
            trace: launched.trace,
            startup_failure: None,
        }
    }

    fn spawn_failed(spec: ProcessSpec, failure: StartupFailure) -> Self {
        Self {
            spec,
            pid: None,
            state: ProcessState::Failed(failure.to_string()),
            bound_ports: Vec::new(),
            child: None,
            ready: None,
            trace: TraceBuffer::default(),
            startup_failure: Some(failure),
        }
    }

    pub fn name(&self) -> &str {
        &self.spec.name
    }

    pub fn status(&self) -> ProcessStatus {
        ProcessStatus {
            name: self.spec.name.clone(),
            kind: self.spec.kind,
            pid: self.pid,
            state: self.state.clone(),
            bound_ports: self.bound_ports.clone(),
        }
    }

    fn mark_ready(&mut self, report: ReadyReport) {
        process_debug!(
            ProcessId::current(),
            "{} ready (PID: {}) ports: {:?}",
            self.spec.name,
            report.pid,
            report.ports
        );
        self.bound_ports = report.ports;
        self.state = ProcessState::Running;
    }

    fn mark_failed(&mut self, failure: StartupFailure) {
        self.state = ProcessState::Failed(failure.to_string());
        self.startup_failure = Some(failure);
    }

    /// Record a terminal observation unless a startup failure is already recorded
    fn record_exit(&mut self, observed: ProcessState) {
        if self.startup_failure.is_none() {
            self.state = observed;
        }
    }

    fn verify_ports(&self, report: ReadyReport) -> Result<ReadyReport, StartupFailure> {
        let expected = self.spec.port_numbers();
        if report.ports == expected {
            Ok(report)
        } else {
            Err(StartupFailure::PortMismatch {
                expected,
                reported: report.ports,
            })
        }
    }

    fn send_signal(&self, signal: Signal) {
        if let Some(child) = &self.child {
            if let Err(e) = child.signal(signal) {
                logging::log_error(ProcessId::current(), &format!("Sending {signal} to {}", self.spec.name), &e);
            }
        }
    }

    /// Non-blocking liveness check; records an exit observed since the last poll
    fn poll_exit(&mut self) {
        let Some(child) = self.child.as_mut() else {
            return;
        };
        match child.try_wait() {
            Ok(Some(code)) => {
                self.child = None;
                if self.state == ProcessState::Running {
                    process_warn!(
                        ProcessId::current(),
                        "{} exited unexpectedly with code {}",
                        self.spec.name,
                        code
                    );
                }
                self.record_exit(ProcessState::Exited(code));
            }
            Ok(None) => {}
            Err(e) => logging::log_error(ProcessId::current(), &format!("Polling {}", self.spec.name), &e),
        }
    }

    /// Wait for the first readiness marker, or find out why there is none
    async fn await_ready(&mut self, deadline: Instant, readiness_timeout: Duration) {
        let Some(ready) = self.ready.take() else {
            return;
        };
        let timed_out = StartupFailure::Timeout {
            timeout: readiness_timeout,
        };

        let outcome = match timeout_at(deadline, ready).await {
            Err(_) => Err(timed_out),
            Ok(Ok(Ok(report))) => self.verify_ports(report),
            Ok(Ok(Err(e))) => Err(StartupFailure::MalformedMarker { message: e.to_string() }),
            // stdout closed without a marker: the process is going away
            Ok(Err(_)) => Err(self.await_early_exit(deadline).await.unwrap_or(timed_out)),
        };

        match outcome {
            Ok(report) => self.mark_ready(report),
            Err(failure) => {
                process_warn!(ProcessId::current(), "{} did not become ready: {}", self.spec.name, failure);
                self.mark_failed(failure);
            }
        }
    }

    /// Reap a process that closed stdout early; `None` if it is still running at `deadline`
    async fn await_early_exit(&mut self, deadline: Instant) -> Option<StartupFailure> {
        let child = self.child.as_mut()?;
        let waited = timeout_at(deadline, child.wait()).await.ok()?;
        self.child = None;

        Some(match waited {
            Ok(shared::EXIT_PORT_UNAVAILABLE) => StartupFailure::PortUnavailable,
            Ok(code) => StartupFailure::EarlyExit { code },
            Err(e) => StartupFailure::Lost { message: e.to_string() },
        })
    }

    /// Wait up to `grace` for exit after SIGTERM, then SIGKILL and reap
    async fn await_exit(&mut self, grace: Duration) {
        let Some(mut child) = self.child.take() else {
            return;
        };

        let observed = match timeout(grace, child.wait()).await {
            Ok(Ok(code)) => ProcessState::Exited(code),
            Ok(Err(e)) => ProcessState::Failed(e.to_string()),
            Err(_) => {
                process_warn!(
                    ProcessId::current(),
                    "{} still running after {:?}, sending SIGKILL",
                    self.spec.name,
                    grace
                );
                if let Err(e) = child.signal(Signal::SIGKILL) {
                    logging::log_error(ProcessId::current(), &format!("Killing {}", self.spec.name), &e);
                }
                match timeout(KILL_GRACE, child.wait()).await {
                    Ok(Ok(code)) => ProcessState::ForcedExit(code),
                    Ok(Err(e)) => ProcessState::Failed(e.to_string()),
                    Err(_) => ProcessState::Failed(format!("not reaped within {KILL_GRACE:?} of SIGKILL")),
                }
            }
        };

        process_debug!(ProcessId::current(), "{} stopped: {}", self.spec.name, observed);
        self.record_exit(observed);
    }
}

/// Launches, observes and stops the processes of one scenario run
pub struct HostSupervisor<L: ProcessLauncher> {
    launcher: L,
    run_id: Uuid,
    readiness_timeout: Duration,
    scenario_id: Option<String>,
    handles: Vec<ProcessHandle>,
}

impl<L: ProcessLauncher> HostSupervisor<L> {
    pub fn new(launcher: L) -> Self {
        Self {
            launcher,
            run_id: Uuid::new_v4(),
            readiness_timeout: DEFAULT_READINESS_TIMEOUT,
            scenario_id: None,
            handles: Vec::new(),
        }
    }

    /// Configure readiness deadline (fluent API)
    pub fn with_readiness_timeout(mut self, readiness_timeout: Duration) -> Self {
        self.readiness_timeout = readiness_timeout;
        self
    }

    pub fn run_id(&self) -> Uuid {
        self.run_id
    }

    /// Launch every process of `scenario` and wait until all are ready
    ///
    /// On failure every started process is torn down before the error naming
    /// the first unready process (in descriptor order) is returned.
    /// Processes are registered as soon as they are launched, so if this
    /// future is dropped early a later `shutdown` still reaches them.
    pub async fn start(&mut self, scenario: &ScenarioDescriptor) -> SupervisorResult<Vec<ProcessStatus>> {
        if let Some(scenario) = &self.scenario_id {
            return Err(SupervisorError::AlreadyStarted {
                scenario: scenario.clone(),
            });
        }
        self.scenario_id = Some(scenario.id.clone());

        process_info!(
            ProcessId::current(),
            run_id = %self.run_id,
            "Starting scenario '{}' with {} processes",
            scenario.id,
            scenario.processes.len()
        );

        for spec in &scenario.processes {
            let handle = match self.launcher.launch(spec).await {
                Ok(launched) => ProcessHandle::launched(spec.clone(), launched),
                Err(e) => {
                    logging::log_error(ProcessId::current(), &format!("Launching {}", spec.name), &e);
                    ProcessHandle::spawn_failed(spec.clone(), StartupFailure::Spawn { message: e.to_string() })
                }
            };
            self.handles.push(handle);
        }

        let deadline = Instant::now() + self.readiness_timeout;
        let readiness_timeout = self.readiness_timeout;
        join_all(
            self.handles
                .iter_mut()
                .map(|handle| handle.await_ready(deadline, readiness_timeout)),
        )
        .await;

        let first_failure = self.handles.iter().find_map(|handle| {
            handle
                .startup_failure
                .clone()
                .map(|reason| (handle.spec.name.clone(), reason))
        });

        if let Some((process, reason)) = first_failure {
            process_error!(
                ProcessId::current(),
                run_id = %self.run_id,
                "Scenario '{}' failed to start: {} {}",
                scenario.id,
                process,
                reason
            );
            self.stop_all(STARTUP_TEARDOWN_TIMEOUT).await;
            return Err(SupervisorError::Startup { process, reason });
        }

        logging::log_success(
            ProcessId::current(),
            &format!("All {} processes of '{}' ready", self.handles.len(), scenario.id),
        );
        Ok(self.status())
    }

    /// Stop every live process within `timeout` plus the kill grace
    pub async fn shutdown(&mut self, timeout: Duration) -> ShutdownReport {
        logging::log_shutdown(
            ProcessId::current(),
            &format!("stopping {} processes (timeout {:?})", self.live_count(), timeout),
        );
        self.stop_all(timeout).await;

        let report = ShutdownReport {
            processes: self.status(),
        };
        process_info!(
            ProcessId::current(),
            run_id = %self.run_id,
            "Shutdown complete: all graceful: {}, forced: {}",
            report.all_graceful(),
            report.forced().len()
        );
        report
    }

    /// Current state of every process, in descriptor order
    pub fn status(&self) -> Vec<ProcessStatus> {
        self.handles.iter().map(ProcessHandle::status).collect()
    }

    /// Poll liveness without blocking and record unexpected exits
    pub fn refresh(&mut self) {
        for handle in &mut self.handles {
            handle.poll_exit();
        }
    }

    /// Captured output lines of the named process
    pub fn trace(&self, name: &str) -> Option<Vec<String>> {
        self.handles
            .iter()
            .find(|handle| handle.name() == name)
            .map(|handle| handle.trace.lines())
    }

    /// Number of processes not yet reaped
    pub fn live_count(&self) -> usize {
        self.handles.iter().filter(|handle| handle.child.is_some()).count()
    }

    async fn stop_all(&mut self, grace: Duration) {
        self.refresh();

        let mut live: Vec<&mut ProcessHandle> = self
            .handles
            .iter_mut()
            .filter(|handle| handle.child.is_some())
            .collect();

        for handle in live.iter_mut() {
            handle.send_signal(Signal::SIGTERM);
            if !handle.state.is_terminal() {
                handle.state = ProcessState::Stopping;
            }
        }

        join_all(live.into_iter().map(|handle| handle.await_exit(grace))).await;
    }
}
