//! Mock process entrypoint shared by the `mockproc` binary
//!
//! Wires the command line and the captured environment to one
//! [`RuntimeAdapter`], prints the readiness marker and maps failures onto
//! process exit codes.

use clap::Parser;
use std::io::Write;
use std::time::Duration;
use tokio::sync::oneshot;
use tokio_util::sync::CancellationToken;

use shared::{ProcessId, ProcessKind, ReadyReport, logging, process_info};

use crate::adapters;
use crate::config::RuntimeConfig;
use crate::error::{MockError, MockResult};
use crate::signals;
use crate::traits::RuntimeContext;

/// Command line arguments passed by the supervisor's process launcher
#[derive(Parser, Debug, Clone)]
#[command(name = "mockproc")]
#[command(about = "Mock workload process spawned by the host supervisor")]
pub struct MockArgs {
    /// Workload kind (api, metrics, worker, batch, wrapped)
    pub kind: ProcessKind,

    /// Process name as declared in the scenario (defaults to the kind)
    #[arg(long)]
    pub name: Option<String>,

    /// Port to bind, overriding the kind's env variable and default
    #[arg(long)]
    pub port: Option<u16>,

    /// Cycle interval of worker and batch loops in milliseconds
    #[arg(long)]
    pub interval_ms: Option<u64>,
}

impl MockArgs {
    pub fn process_name(&self) -> String {
        self.name.clone().unwrap_or_else(|| self.kind.to_string())
    }
}

/// Run the mock process to completion and return its exit code
pub async fn run(args: MockArgs, config: RuntimeConfig) -> i32 {
    let name = args.process_name();
    let process_id = ProcessId::init_mock(&name);
    logging::init_tracing_with_level(&config.log_level());

    match run_adapter(&args, name, config).await {
        Ok(()) => {
            logging::log_success(process_id, "Stopped gracefully");
            0
        }
        Err(e) => {
            logging::log_error(process_id, "Mock process", &e);
            e.exit_code()
        }
    }
}

async fn run_adapter(args: &MockArgs, name: String, config: RuntimeConfig) -> MockResult<()> {
    let adapter = adapters::adapter_for(args.kind);
    logging::log_startup(ProcessId::current(), &format!("{} process '{}'", args.kind, name));
    for line in config.trace_lines(adapter.config_keys()) {
        process_info!(ProcessId::current(), "{}", line);
    }

    let port = config.resolve_port(args.kind, args.port)?;
    let interval = match args.interval_ms {
        Some(0) => return Err(MockError::config("--interval-ms", "0")),
        Some(ms) => Duration::from_millis(ms),
        None => adapter.default_interval(),
    };

    let shutdown = CancellationToken::new();
    let signal_task = signals::install_policy(adapter.signal_policy(), shutdown.clone())?;

    let (ready_tx, ready_rx) = oneshot::channel();
    let announcer = tokio::spawn(announce_ready(name.clone(), ready_rx));

    let ctx = RuntimeContext {
        name,
        config,
        port,
        interval,
        shutdown,
        ready: ready_tx,
    };
    let result = adapter.run(ctx).await;

    let _ = announcer.await;
    signal_task.abort();
    result
}

/// Print the readiness marker once the adapter reports its bound ports
async fn announce_ready(name: String, ready: oneshot::Receiver<Vec<u16>>) {
    let Ok(ports) = ready.await else {
        return;
    };
    let report = ReadyReport {
        name,
        pid: std::process::id(),
        ports,
    };
    match report.to_line() {
        Ok(line) => {
            let mut stdout = std::io::stdout().lock();
            let _ = writeln!(stdout, "{line}");
            let _ = stdout.flush();
        }
        Err(e) => logging::log_error(ProcessId::current(), "Readiness marker", &e),
    }
}
