//! Liveness and readiness endpoints.

use axum::{extract::State, http::StatusCode, response::Json, routing::get, Router};
use serde_json::{json, Value};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::info;

/// Build the health router. `ready` is set once the controller is running.
pub fn router(ready: Arc<AtomicBool>) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/ready", get(readiness_check))
        .with_state(ready)
}

/// Serve the health router until the process exits
pub async fn serve(port: u16, ready: Arc<AtomicBool>) -> anyhow::Result<()> {
    let listener = tokio::net::TcpListener::bind(("0.0.0.0", port)).await?;
    info!("Health endpoints listening on port {}", port);
    axum::serve(listener, router(ready)).await?;
    Ok(())
}

async fn health_check() -> Json<Value> {
    Json(json!({
        "status": "healthy",
        "service": "sync-notifier",
        "version": env!("CARGO_PKG_VERSION")
    }))
}

async fn readiness_check(State(ready): State<Arc<AtomicBool>>) -> (StatusCode, Json<Value>) {
    if ready.load(Ordering::SeqCst) {
        (
            StatusCode::OK,
            Json(json!({
                "status": "ready",
                "service": "sync-notifier",
                "version": env!("CARGO_PKG_VERSION")
            })),
        )
    } else {
        (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(json!({
                "status": "starting",
                "service": "sync-notifier"
            })),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::Request;
    use tower::ServiceExt;

    async fn status_of(router: Router, uri: &str) -> StatusCode {
        router
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap()
            .status()
    }

    #[tokio::test]
    async fn test_health_is_always_ok() {
        let ready = Arc::new(AtomicBool::new(false));
        assert_eq!(status_of(router(ready), "/health").await, StatusCode::OK);
    }

    #[tokio::test]
    async fn test_ready_follows_flag() {
        let ready = Arc::new(AtomicBool::new(false));
        assert_eq!(
            status_of(router(ready.clone()), "/ready").await,
            StatusCode::SERVICE_UNAVAILABLE
        );

        ready.store(true, Ordering::SeqCst);
        assert_eq!(status_of(router(ready), "/ready").await, StatusCode::OK);
    }
}
