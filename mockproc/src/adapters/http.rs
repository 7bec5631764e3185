//! Listener binding and serving shared by the HTTP kinds

use axum::Router;
use std::net::SocketAddr;
use tokio::net::TcpListener;
use tokio::sync::oneshot;
use tokio_util::sync::CancellationToken;

use shared::{ProcessId, process_info};

use crate::error::{MockError, MockResult};

/// Bind `0.0.0.0:port`, failing fast when the port is taken
pub async fn bind(port: u16) -> MockResult<TcpListener> {
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    TcpListener::bind(addr).await.map_err(|e| {
        if e.kind() == std::io::ErrorKind::AddrInUse {
            MockError::PortUnavailable { port }
        } else {
            MockError::Bind { port, source: e }
        }
    })
}

/// Announce readiness and serve `router` until `shutdown` is cancelled
pub async fn serve(
    listener: TcpListener,
    router: Router,
    ready: oneshot::Sender<Vec<u16>>,
    shutdown: CancellationToken,
) -> MockResult<()> {
    let port = listener.local_addr()?.port();
    process_info!(ProcessId::current(), "Listening on port {}", port);
    let _ = ready.send(vec![port]);

    axum::serve(listener, router)
        .with_graceful_shutdown(async move { shutdown.cancelled().await })
        .await
        .map_err(|e| MockError::Server { message: e.to_string() })
}

/// Bind the context port and serve `router` on it
pub async fn bind_and_serve(
    port: Option<u16>,
    kind: shared::ProcessKind,
    router: Router,
    ready: oneshot::Sender<Vec<u16>>,
    shutdown: CancellationToken,
) -> MockResult<()> {
    let port = port.ok_or_else(|| MockError::MissingPort { kind: kind.to_string() })?;
    let listener = bind(port).await?;
    serve(listener, router, ready, shutdown).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_bind_reports_port_unavailable() {
        let held = std::net::TcpListener::bind("0.0.0.0:0").unwrap();
        let port = held.local_addr().unwrap().port();

        let result = bind(port).await;
        assert!(matches!(result, Err(MockError::PortUnavailable { port: p }) if p == port));
    }

    #[tokio::test]
    async fn test_serve_announces_bound_port_and_stops_on_cancel() {
        let listener = bind(0).await.unwrap();
        let port = listener.local_addr().unwrap().port();
        let (ready_tx, ready_rx) = oneshot::channel();
        let shutdown = CancellationToken::new();

        let server = tokio::spawn(serve(listener, Router::new(), ready_tx, shutdown.clone()));

        assert_eq!(ready_rx.await.unwrap(), vec![port]);
        shutdown.cancel();
        let result = tokio::time::timeout(std::time::Duration::from_secs(5), server)
            .await
            .expect("server should stop after cancellation")
            .unwrap();
        assert!(result.is_ok());
    }
}
