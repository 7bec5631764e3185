//! Batch workload: periodic cycles with no graceful shutdown support

use async_trait::async_trait;
use std::time::Duration;

use shared::{ProcessId, ProcessKind, env, process_info};

use crate::error::MockResult;
use crate::traits::{RuntimeAdapter, RuntimeContext, SignalPolicy};

pub const DEFAULT_INTERVAL: Duration = Duration::from_secs(30);

pub struct BatchAdapter;

#[async_trait]
impl RuntimeAdapter for BatchAdapter {
    fn kind(&self) -> ProcessKind {
        ProcessKind::Batch
    }

    fn config_keys(&self) -> &'static [&'static str] {
        &[env::BATCH_INPUT_DIR, env::BATCH_OUTPUT_DIR, env::DATABASE_URL, env::LOG_LEVEL]
    }

    fn signal_policy(&self) -> SignalPolicy {
        SignalPolicy::Ignore
    }

    fn default_interval(&self) -> Duration {
        DEFAULT_INTERVAL
    }

    /// Never returns; the shutdown token is deliberately not consulted
    async fn run(&self, ctx: RuntimeContext) -> MockResult<()> {
        let input = ctx.config.setting(env::BATCH_INPUT_DIR).value;
        let output = ctx.config.setting(env::BATCH_OUTPUT_DIR).value;
        let _ = ctx.ready.send(Vec::new());

        let mut ticker = tokio::time::interval(ctx.interval);
        let mut cycle = 0u64;
        loop {
            ticker.tick().await;
            cycle += 1;
            process_info!(
                ProcessId::current(),
                "Processing batch {} ({} -> {})",
                cycle,
                input,
                output
            );
        }
    }
}
