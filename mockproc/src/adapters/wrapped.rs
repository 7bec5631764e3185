//! Wrapped application: answers every GET with a plain `OK`

use async_trait::async_trait;
use axum::{Router, routing::get};

use shared::{ProcessId, ProcessKind, env, process_info};

use super::http;
use crate::error::MockResult;
use crate::traits::{RuntimeAdapter, RuntimeContext};

pub fn router() -> Router {
    Router::new().route("/", get(ok)).route("/*path", get(ok))
}

async fn ok() -> &'static str {
    "OK"
}

pub struct WrappedAdapter;

#[async_trait]
impl RuntimeAdapter for WrappedAdapter {
    fn kind(&self) -> ProcessKind {
        ProcessKind::Wrapped
    }

    fn config_keys(&self) -> &'static [&'static str] {
        &[env::APP_CONFIG_PATH, env::LOG_LEVEL]
    }

    async fn run(&self, ctx: RuntimeContext) -> MockResult<()> {
        let config_path = ctx.config.setting(env::APP_CONFIG_PATH).value;
        process_info!(ProcessId::current(), "Starting with config: {}", config_path);
        http::bind_and_serve(ctx.port, self.kind(), router(), ctx.ready, ctx.shutdown).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{Body, to_bytes};
    use axum::http::{Request, StatusCode};
    use tower::ServiceExt;

    #[tokio::test]
    async fn test_any_path_answers_ok() {
        for path in ["/", "/anything", "/deeply/nested/path"] {
            let response = router()
                .oneshot(Request::builder().uri(path).body(Body::empty()).unwrap())
                .await
                .unwrap();
            assert_eq!(response.status(), StatusCode::OK, "path {path}");
            let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
            assert_eq!(&body[..], b"OK");
        }
    }
}
