//! Trait definitions with mockall annotations for testing
//!
//! The supervisor never touches `tokio::process` directly: launching goes
//! through [`ProcessLauncher`] and every spawned process is driven through
//! [`ChildProcess`], so lifecycle logic can be exercised with mocks.

use nix::sys::signal::Signal;
use tokio::sync::oneshot;

use shared::{ProcessSpec, ReadyReport, SharedResult};

use crate::error::SupervisorResult;
use crate::services::TraceBuffer;

/// Readiness outcome delivered by the output handler
///
/// Resolves with the first marker line seen on stdout (or the reason it could
/// not be parsed); the sender is dropped when stdout closes without a marker.
pub type ReadySignal = oneshot::Receiver<SharedResult<ReadyReport>>;

/// A freshly spawned mock process
pub struct Launched {
    pub child: Box<dyn ChildProcess>,
    pub ready: ReadySignal,
    pub trace: TraceBuffer,
}

impl std::fmt::Debug for Launched {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Launched").field("pid", &self.child.pid()).finish()
    }
}

/// Control surface of one running OS process
#[mockall::automock]
#[async_trait::async_trait]
pub trait ChildProcess: Send {
    /// OS process id captured at spawn
    fn pid(&self) -> Option<u32>;

    /// Deliver `signal` to the process group of the child
    fn signal(&self, signal: Signal) -> SupervisorResult<()>;

    /// Exit code if the process has already exited, without blocking
    fn try_wait(&mut self) -> SupervisorResult<Option<i32>>;

    /// Wait for exit; signal deaths are reported as `128 + signal`
    async fn wait(&mut self) -> SupervisorResult<i32>;
}

/// Process spawning abstraction
#[mockall::automock]
#[async_trait::async_trait]
pub trait ProcessLauncher: Send + Sync {
    /// Spawn the mock process described by `spec` in its own process group
    async fn launch(&self, spec: &ProcessSpec) -> SupervisorResult<Launched>;
}
