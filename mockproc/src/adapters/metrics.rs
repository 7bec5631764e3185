//! Metrics exporter workload: Prometheus text exposition on `/metrics`

use async_trait::async_trait;
use axum::{
    Router,
    extract::State,
    http::{StatusCode, header},
    response::IntoResponse,
    routing::get,
};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusRecorder};
use std::sync::Arc;
use std::time::Instant;

use shared::{ProcessKind, env};

use super::http;
use crate::error::MockResult;
use crate::traits::{RuntimeAdapter, RuntimeContext};

pub const REQUESTS_TOTAL: &str = "requests_total";
pub const UPTIME_SECONDS: &str = "uptime_seconds";

/// Process-local recorder; snapshots are rendered per request
pub struct MetricsState {
    recorder: PrometheusRecorder,
    started: Instant,
}

impl MetricsState {
    pub fn new() -> Self {
        let recorder = PrometheusBuilder::new().build_recorder();
        metrics::with_local_recorder(&recorder, || {
            metrics::describe_counter!(REQUESTS_TOTAL, "Total requests");
            metrics::describe_gauge!(UPTIME_SECONDS, "Uptime in seconds");
        });
        Self {
            recorder,
            started: Instant::now(),
        }
    }

    /// Record this scrape and render the current snapshot
    pub fn snapshot(&self) -> String {
        let uptime = self.started.elapsed().as_secs_f64();
        metrics::with_local_recorder(&self.recorder, || {
            metrics::counter!(REQUESTS_TOTAL).increment(1);
            metrics::gauge!(UPTIME_SECONDS).set(uptime);
        });
        self.recorder.handle().render()
    }
}

impl Default for MetricsState {
    fn default() -> Self {
        Self::new()
    }
}

pub fn router() -> Router {
    Router::new()
        .route("/metrics", get(scrape))
        .fallback(not_found)
        .with_state(Arc::new(MetricsState::new()))
}

async fn scrape(State(state): State<Arc<MetricsState>>) -> impl IntoResponse {
    (
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.snapshot(),
    )
}

async fn not_found() -> StatusCode {
    StatusCode::NOT_FOUND
}

pub struct MetricsAdapter;

#[async_trait]
impl RuntimeAdapter for MetricsAdapter {
    fn kind(&self) -> ProcessKind {
        ProcessKind::Metrics
    }

    fn config_keys(&self) -> &'static [&'static str] {
        &[env::METRICS_PORT, env::LOG_LEVEL]
    }

    async fn run(&self, ctx: RuntimeContext) -> MockResult<()> {
        http::bind_and_serve(ctx.port, self.kind(), router(), ctx.ready, ctx.shutdown).await
    }
}
