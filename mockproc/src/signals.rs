//! Termination signal handling for mock processes

use tokio::signal::unix::{Signal, SignalKind, signal};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use shared::{ProcessId, logging, process_warn};

use crate::error::{MockError, MockResult};
use crate::traits::SignalPolicy;

fn install(kind: SignalKind, name: &str) -> MockResult<Signal> {
    signal(kind).map_err(|e| MockError::Signal {
        message: format!("failed to install {name} handler: {e}"),
    })
}

/// Install SIGTERM/SIGINT handlers according to `policy`
///
/// Must run before the readiness marker is printed so that a signal sent
/// after readiness never hits the default disposition.
pub fn install_policy(policy: SignalPolicy, shutdown: CancellationToken) -> MockResult<JoinHandle<()>> {
    let mut sigterm = install(SignalKind::terminate(), "SIGTERM")?;
    let mut sigint = install(SignalKind::interrupt(), "SIGINT")?;

    let handle = match policy {
        SignalPolicy::Graceful => tokio::spawn(async move {
            let received = tokio::select! {
                _ = sigterm.recv() => "SIGTERM",
                _ = sigint.recv() => "SIGINT",
                _ = shutdown.cancelled() => return,
            };
            logging::log_shutdown(ProcessId::current(), &format!("received {received}"));
            shutdown.cancel();
        }),
        SignalPolicy::Ignore => tokio::spawn(async move {
            loop {
                let received = tokio::select! {
                    _ = sigterm.recv() => "SIGTERM",
                    _ = sigint.recv() => "SIGINT",
                };
                process_warn!(
                    ProcessId::current(),
                    "Received {}, ignoring: no graceful shutdown hook installed",
                    received
                );
            }
        }),
    };

    Ok(handle)
}

#[cfg(test)]
mod tests {
    use super::*;
    use nix::sys::signal::{Signal as Sig, raise};
    use serial_test::serial;
    use std::time::Duration;

    #[tokio::test]
    #[serial]
    async fn test_sigint_cancels_graceful_token() {
        let shutdown = CancellationToken::new();
        let task = install_policy(SignalPolicy::Graceful, shutdown.clone()).unwrap();

        raise(Sig::SIGINT).unwrap();

        tokio::time::timeout(Duration::from_secs(2), shutdown.cancelled())
            .await
            .expect("SIGINT should cancel the token");
        task.await.unwrap();
    }

    #[tokio::test]
    #[serial]
    async fn test_sigterm_cancels_graceful_token() {
        let shutdown = CancellationToken::new();
        let task = install_policy(SignalPolicy::Graceful, shutdown.clone()).unwrap();

        raise(Sig::SIGTERM).unwrap();

        tokio::time::timeout(Duration::from_secs(2), shutdown.cancelled())
            .await
            .expect("SIGTERM should cancel the token");
        task.await.unwrap();
    }

    #[tokio::test]
    #[serial]
    async fn test_ignore_policy_survives_signals() {
        let shutdown = CancellationToken::new();
        let task = install_policy(SignalPolicy::Ignore, shutdown.clone()).unwrap();

        raise(Sig::SIGTERM).unwrap();
        raise(Sig::SIGINT).unwrap();
        tokio::time::sleep(Duration::from_millis(100)).await;

        assert!(!shutdown.is_cancelled());
        assert!(!task.is_finished());
        task.abort();
    }
}
