//! Main entry point for the hostsim harness binary

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::signal::unix::{Signal, SignalKind, signal};

use shared::{ProcessId, logging, process_info};
use supervisor::{HostSupervisor, RealProcessLauncher, ScenarioDescriptor};

/// Multi-process host simulator
#[derive(Parser)]
#[command(name = "hostsim")]
#[command(about = "Runs scenarios of mock processes on the local host")]
pub struct Cli {
    /// Log level (trace, debug, info, warn, error)
    #[arg(long, global = true, default_value = "info")]
    pub log_level: String,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Start a scenario, hold it until a signal or the duration elapses, then shut it down
    Run(RunArgs),

    /// Load a scenario and print its resolved form
    Validate {
        /// Scenario JSON file
        #[arg(long)]
        scenario: PathBuf,
    },
}

#[derive(Args)]
pub struct RunArgs {
    /// Scenario JSON file
    #[arg(long)]
    pub scenario: PathBuf,

    /// Seconds to wait for every process to report ready
    #[arg(long, default_value = "10")]
    pub readiness_timeout_secs: u64,

    /// Seconds processes get to exit after SIGTERM before SIGKILL
    #[arg(long, default_value = "5")]
    pub shutdown_timeout_secs: u64,

    /// Shut down after this many seconds instead of waiting for a signal
    #[arg(long)]
    pub duration_secs: Option<u64>,

    /// Path of the mockproc binary (defaults to the one next to hostsim)
    #[arg(long)]
    pub mockproc: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    ProcessId::init_supervisor();
    logging::init_tracing_with_level(&cli.log_level);

    match cli.command {
        Command::Run(args) => run(args).await,
        Command::Validate { scenario } => {
            let descriptor = load(&scenario)?;
            println!("{}", descriptor.to_json()?);
            Ok(())
        }
    }
}

fn load(path: &Path) -> Result<ScenarioDescriptor> {
    ScenarioDescriptor::load(path).with_context(|| format!("loading scenario {}", path.display()))
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

async fn run(args: RunArgs) -> Result<()> {
    let descriptor = load(&args.scenario)?;
    logging::log_startup(ProcessId::current(), &format!("hostsim scenario '{}'", descriptor.id));

    let launcher = match args.mockproc {
        Some(path) => RealProcessLauncher::new(path),
        None => RealProcessLauncher::beside_current_exe().context("locating mockproc binary")?,
    };
    let mut supervisor =
        HostSupervisor::new(launcher).with_readiness_timeout(Duration::from_secs(args.readiness_timeout_secs));
    let shutdown_timeout = Duration::from_secs(args.shutdown_timeout_secs);
    process_info!(ProcessId::current(), run_id = %supervisor.run_id(), "Run started");

    // Listen before the first spawn so an interrupt during startup still tears down
    let mut signals = ShutdownSignals::install()?;

    let started = tokio::select! {
        result = supervisor.start(&descriptor) => Ok(result),
        received = signals.recv() => Err(received),
    };
    match started {
        Ok(Ok(_)) => print_json(&supervisor.status())?,
        Ok(Err(e)) => {
            print_json(&supervisor.status())?;
            return Err(e).context(format!("starting scenario '{}'", descriptor.id));
        }
        Err(received) => {
            logging::log_shutdown(ProcessId::current(), &format!("received {received} during startup"));
            let report = supervisor.shutdown(shutdown_timeout).await;
            print_json(&report)?;
            anyhow::bail!("interrupted by {received} while starting scenario '{}'", descriptor.id);
        }
    }

    let reason = match args.duration_secs {
        Some(secs) => tokio::select! {
            received = signals.recv() => received,
            _ = tokio::time::sleep(Duration::from_secs(secs)) => "duration elapsed",
        },
        None => signals.recv().await,
    };
    logging::log_shutdown(ProcessId::current(), reason);

    supervisor.refresh();
    let report = supervisor.shutdown(shutdown_timeout).await;
    print_json(&report)?;

    logging::log_success(ProcessId::current(), "hostsim stopped");
    Ok(())
}

/// SIGTERM and SIGINT listeners for the lifetime of a run
struct ShutdownSignals {
    sigterm: Signal,
    sigint: Signal,
}

impl ShutdownSignals {
    fn install() -> Result<Self> {
        Ok(Self {
            sigterm: signal(SignalKind::terminate()).context("installing SIGTERM handler")?,
            sigint: signal(SignalKind::interrupt()).context("installing SIGINT handler")?,
        })
    }

    /// Wait for SIGTERM or SIGINT
    async fn recv(&mut self) -> &'static str {
        tokio::select! {
            _ = self.sigterm.recv() => "SIGTERM",
            _ = self.sigint.recv() => "SIGINT",
        }
    }
}
