//! Trait definitions for the per-kind runtime adapters

use async_trait::async_trait;
use std::time::Duration;
use tokio::sync::oneshot;
use tokio_util::sync::CancellationToken;

use shared::ProcessKind;

use crate::config::RuntimeConfig;
use crate::error::MockResult;

/// How a process reacts to SIGTERM/SIGINT
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignalPolicy {
    /// Cancel the shutdown token and exit with code 0
    Graceful,
    /// Log the signal and keep running
    Ignore,
}

/// Everything an adapter needs to run, built once by the entrypoint
#[derive(Debug)]
pub struct RuntimeContext {
    pub name: String,
    pub config: RuntimeConfig,
    /// Port to bind; `None` for port-less kinds
    pub port: Option<u16>,
    /// Cycle interval of loop-driven kinds
    pub interval: Duration,
    pub shutdown: CancellationToken,
    /// Receives the bound ports once the adapter is ready to serve
    pub ready: oneshot::Sender<Vec<u16>>,
}

/// Observable behavior of one mock workload kind
#[async_trait]
pub trait RuntimeAdapter: Send + Sync {
    fn kind(&self) -> ProcessKind;

    /// Variables surfaced in the startup trace
    fn config_keys(&self) -> &'static [&'static str];

    fn signal_policy(&self) -> SignalPolicy {
        SignalPolicy::Graceful
    }

    /// Default cycle interval for loop-driven kinds
    fn default_interval(&self) -> Duration {
        Duration::ZERO
    }

    /// Run until the shutdown token is cancelled (or forever)
    async fn run(&self, ctx: RuntimeContext) -> MockResult<()>;
}
