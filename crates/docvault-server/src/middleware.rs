//! Route gate for the `docvault` server.
//!
//! Reads the `X-Wallet-Address` header, checks it against the session
//! store, and injects the caller's session context into the request
//! extensions. Requests without a connected session are rejected with
//! 401 — there are only two terminal outcomes: the handler runs, or the
//! caller is turned away. A session still mid-handshake does not pass.

use std::sync::Arc;

use axum::extract::{Request, State};
use axum::http::StatusCode;
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};

use crate::state::AppState;

/// Wallet header checked by the gate.
pub const WALLET_HEADER: &str = "x-wallet-address";

/// Session context injected into request extensions.
#[derive(Debug, Clone)]
pub struct SessionContext {
    /// The caller's connected wallet address.
    pub address: String,
}

/// Paths reachable without a connected session.
fn is_public(path: &str) -> bool {
    path == "/v1/sys/health" || path == "/v1/session/connect" || path == "/"
}

/// Middleware that enforces the wallet gate.
pub async fn session_middleware(
    State(state): State<Arc<AppState>>,
    mut req: Request,
    next: Next,
) -> Response {
    let path = req.uri().path().to_owned();

    if is_public(&path) {
        return next.run(req).await;
    }

    let address = req
        .headers()
        .get(WALLET_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(String::from);

    let Some(address) = address else {
        return unauthorized("missing X-Wallet-Address header");
    };

    if !state.sessions.is_connected(&address).await {
        return unauthorized("no connected session for this address");
    }

    state.sessions.touch(&address).await;
    req.extensions_mut().insert(SessionContext { address });
    next.run(req).await
}

fn unauthorized(message: &str) -> Response {
    (
        StatusCode::UNAUTHORIZED,
        axum::Json(serde_json::json!({"error": "unauthorized", "message": message})),
    )
        .into_response()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use axum::body::Body;
    use axum::http::Request as HttpRequest;
    use axum::routing::get;
    use axum::Router;
    use tower::ServiceExt;

    use docvault_core::upload::UploadSettings;
    use docvault_gateway::{MockBackend, MockLatency};

    use super::*;

    fn test_state() -> Arc<AppState> {
        let backend = Arc::new(MockBackend::with_seed(MockLatency::zero(), 9));
        Arc::new(AppState::new(
            Arc::clone(&backend) as _,
            Arc::clone(&backend) as _,
            Arc::clone(&backend) as _,
            backend as _,
            UploadSettings::default(),
        ))
    }

    fn app(state: Arc<AppState>) -> Router {
        Router::new()
            .route("/v1/documents", get(|| async { "ok" }))
            .route("/v1/sys/health", get(|| async { "ok" }))
            .layer(axum::middleware::from_fn_with_state(
                state,
                session_middleware,
            ))
    }

    #[tokio::test]
    async fn missing_header_is_rejected() {
        let res = app(test_state())
            .oneshot(
                HttpRequest::builder()
                    .uri("/v1/documents")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn unconnected_address_is_rejected() {
        let res = app(test_state())
            .oneshot(
                HttpRequest::builder()
                    .uri("/v1/documents")
                    .header("X-Wallet-Address", "0xnobody")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn connected_session_passes_the_gate() {
        let state = test_state();
        state.sessions.connect("0xabc").await.unwrap();
        let res = app(state)
            .oneshot(
                HttpRequest::builder()
                    .uri("/v1/documents")
                    .header("X-Wallet-Address", "0xabc")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn session_mid_handshake_does_not_pass() {
        let state = test_state();
        state.sessions.begin_connect("0xabc").await.unwrap();
        let res = app(state)
            .oneshot(
                HttpRequest::builder()
                    .uri("/v1/documents")
                    .header("X-Wallet-Address", "0xabc")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn health_is_public() {
        let res = app(test_state())
            .oneshot(
                HttpRequest::builder()
                    .uri("/v1/sys/health")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::OK);
    }
}
