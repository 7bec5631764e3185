//! Background worker workload: concurrent loops that stop cooperatively

use async_trait::async_trait;
use std::time::Duration;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;

use shared::{ProcessId, ProcessKind, env, process_debug, process_info};

use crate::error::MockResult;
use crate::traits::{RuntimeAdapter, RuntimeContext};

pub const DEFAULT_INTERVAL: Duration = Duration::from_secs(5);

/// Simulated processing time of one cycle
pub const CYCLE_WORK: Duration = Duration::from_millis(20);

/// Run one worker loop until cancelled, returning the cycles completed
///
/// The token is checked at the start of every cycle. A cycle that has begun
/// always runs to completion; only the interval wait between cycles is
/// interrupted by cancellation.
pub async fn worker_loop(slot: usize, interval: Duration, work: Duration, shutdown: CancellationToken) -> u64 {
    let mut cycles = 0u64;
    loop {
        if shutdown.is_cancelled() {
            break;
        }

        process_debug!(ProcessId::current(), "Worker {} processing cycle {}", slot, cycles + 1);
        tokio::time::sleep(work).await;
        cycles += 1;

        tokio::select! {
            _ = shutdown.cancelled() => break,
            _ = tokio::time::sleep(interval) => {}
        }
    }
    cycles
}

pub struct WorkerAdapter;

#[async_trait]
impl RuntimeAdapter for WorkerAdapter {
    fn kind(&self) -> ProcessKind {
        ProcessKind::Worker
    }

    fn config_keys(&self) -> &'static [&'static str] {
        &[env::DATABASE_URL, env::REDIS_URL, env::WORKER_CONCURRENCY, env::LOG_LEVEL]
    }

    fn default_interval(&self) -> Duration {
        DEFAULT_INTERVAL
    }

    async fn run(&self, ctx: RuntimeContext) -> MockResult<()> {
        let concurrency = ctx.config.worker_concurrency()?;

        let mut loops = JoinSet::new();
        for slot in 1..=concurrency {
            loops.spawn(worker_loop(slot, ctx.interval, CYCLE_WORK, ctx.shutdown.clone()));
        }
        let _ = ctx.ready.send(Vec::new());

        let mut total_cycles = 0;
        while let Some(result) = loops.join_next().await {
            total_cycles += result.unwrap_or_default();
        }

        process_info!(
            ProcessId::current(),
            "Worker shutdown complete after {} cycles",
            total_cycles
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RuntimeConfig;
    use tokio::sync::oneshot;

    #[tokio::test]
    async fn test_cancelled_token_stops_loop_before_next_cycle() {
        let shutdown = CancellationToken::new();
        shutdown.cancel();

        let cycles = worker_loop(1, Duration::from_millis(10), CYCLE_WORK, shutdown).await;
        assert_eq!(cycles, 0);
    }

    #[tokio::test]
    async fn test_cycle_in_progress_completes_before_exit() {
        let shutdown = CancellationToken::new();
        let canceller = shutdown.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(20)).await;
            canceller.cancel();
        });

        let started = std::time::Instant::now();
        let cycles = worker_loop(1, Duration::from_secs(60), Duration::from_millis(200), shutdown).await;

        assert_eq!(cycles, 1);
        assert!(started.elapsed() >= Duration::from_millis(200));
        assert!(started.elapsed() < Duration::from_secs(5));
    }

    #[tokio::test]
    async fn test_worker_runs_all_slots_and_exits_on_cancel() {
        let shutdown = CancellationToken::new();
        let (ready_tx, ready_rx) = oneshot::channel();
        let ctx = RuntimeContext {
            name: "worker".to_string(),
            config: RuntimeConfig::from_vars([("WORKER_CONCURRENCY", "3")]),
            port: None,
            interval: Duration::from_millis(20),
            shutdown: shutdown.clone(),
            ready: ready_tx,
        };

        let task = tokio::spawn(async move { WorkerAdapter.run(ctx).await });
        assert_eq!(ready_rx.await.unwrap(), Vec::<u16>::new());

        tokio::time::sleep(Duration::from_millis(60)).await;
        shutdown.cancel();

        let result = tokio::time::timeout(Duration::from_secs(2), task)
            .await
            .expect("worker should exit promptly")
            .unwrap();
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn test_invalid_concurrency_fails_before_ready() {
        let (ready_tx, ready_rx) = oneshot::channel();
        let ctx = RuntimeContext {
            name: "worker".to_string(),
            config: RuntimeConfig::from_vars([("WORKER_CONCURRENCY", "many")]),
            port: None,
            interval: DEFAULT_INTERVAL,
            shutdown: CancellationToken::new(),
            ready: ready_tx,
        };

        assert!(WorkerAdapter.run(ctx).await.is_err());
        assert!(ready_rx.await.is_err());
    }
}
