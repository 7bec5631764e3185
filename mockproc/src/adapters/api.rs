//! HTTP API workload: health, item listing and a service descriptor

use async_trait::async_trait;
use axum::{Router, extract::State, response::Json, routing::get};
use serde::Serialize;
use std::sync::Arc;

use shared::{ProcessKind, env};

use super::http;
use crate::error::MockResult;
use crate::traits::{RuntimeAdapter, RuntimeContext};

pub const SERVICE_VERSION: &str = "1.0.0";

#[derive(Debug, Clone, Serialize)]
pub struct HealthState {
    pub status: &'static str,
}

#[derive(Debug, Clone, Serialize)]
pub struct ItemList {
    pub items: Vec<serde_json::Value>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ServiceDescriptor {
    pub service: String,
    pub version: &'static str,
}

struct ApiState {
    service: String,
}

pub fn router(service: &str) -> Router {
    let state = Arc::new(ApiState {
        service: service.to_string(),
    });

    Router::new()
        .route("/", get(index))
        .route("/health", get(health))
        .route("/api/v1/items", get(items))
        .with_state(state)
}

async fn health() -> Json<HealthState> {
    Json(HealthState { status: "ok" })
}

async fn items() -> Json<ItemList> {
    Json(ItemList { items: Vec::new() })
}

async fn index(State(state): State<Arc<ApiState>>) -> Json<ServiceDescriptor> {
    Json(ServiceDescriptor {
        service: state.service.clone(),
        version: SERVICE_VERSION,
    })
}

pub struct ApiAdapter;

#[async_trait]
impl RuntimeAdapter for ApiAdapter {
    fn kind(&self) -> ProcessKind {
        ProcessKind::Api
    }

    fn config_keys(&self) -> &'static [&'static str] {
        &[env::DATABASE_URL, env::REDIS_URL, env::API_PORT, env::LOG_LEVEL]
    }

    async fn run(&self, ctx: RuntimeContext) -> MockResult<()> {
        http::bind_and_serve(ctx.port, self.kind(), router(&ctx.name), ctx.ready, ctx.shutdown).await
    }
}
