//! HTTP kinds served on real sockets through their runtime adapters

use std::time::Duration;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use mockproc::{MockResult, RuntimeConfig, RuntimeContext, adapter_for};
use shared::ProcessKind;

struct Running {
    port: u16,
    shutdown: CancellationToken,
    task: JoinHandle<MockResult<()>>,
}

impl Running {
    fn url(&self, path: &str) -> String {
        format!("http://127.0.0.1:{}{}", self.port, path)
    }

    async fn stop(self) -> MockResult<()> {
        self.shutdown.cancel();
        tokio::time::timeout(Duration::from_secs(5), self.task)
            .await
            .expect("adapter should stop after cancellation")
            .unwrap()
    }
}

/// Start `kind` on an ephemeral port and wait for it to report ready
async fn serve(kind: ProcessKind, name: &str) -> Running {
    let shutdown = CancellationToken::new();
    let (ready_tx, ready_rx) = oneshot::channel();
    let ctx = RuntimeContext {
        name: name.to_string(),
        config: RuntimeConfig::default(),
        port: Some(0),
        interval: Duration::ZERO,
        shutdown: shutdown.clone(),
        ready: ready_tx,
    };

    let task = tokio::spawn(async move { adapter_for(kind).run(ctx).await });
    let ports = ready_rx.await.expect("adapter should report ready");

    Running {
        port: ports[0],
        shutdown,
        task,
    }
}

#[tokio::test]
async fn test_api_routes_over_http() {
    let api = serve(ProcessKind::Api, "orders-api").await;

    let health: serde_json::Value = reqwest::get(api.url("/health")).await.unwrap().json().await.unwrap();
    assert_eq!(health, serde_json::json!({"status": "ok"}));

    let index: serde_json::Value = reqwest::get(api.url("/")).await.unwrap().json().await.unwrap();
    assert_eq!(index["service"], "orders-api");
    assert_eq!(index["version"], "1.0.0");

    let items = reqwest::get(api.url("/api/v1/items")).await.unwrap();
    assert_eq!(items.status().as_u16(), 200);

    assert!(api.stop().await.is_ok());
}

#[tokio::test]
async fn test_metrics_exposition_over_http() {
    let metrics = serve(ProcessKind::Metrics, "metrics").await;

    let response = reqwest::get(metrics.url("/metrics")).await.unwrap();
    assert_eq!(response.status().as_u16(), 200);
    let body = response.text().await.unwrap();
    assert!(body.contains("# TYPE requests_total counter"));
    assert!(body.contains("# TYPE uptime_seconds gauge"));

    let missing = reqwest::get(metrics.url("/nonexistent")).await.unwrap();
    assert_eq!(missing.status().as_u16(), 404);

    assert!(metrics.stop().await.is_ok());
}

#[tokio::test]
async fn test_wrapped_answers_any_path() {
    let wrapped = serve(ProcessKind::Wrapped, "wrapped").await;

    let response = reqwest::get(wrapped.url("/anything/at/all")).await.unwrap();
    assert_eq!(response.status().as_u16(), 200);
    assert_eq!(response.text().await.unwrap(), "OK");

    assert!(wrapped.stop().await.is_ok());
}
