//! Session routes: `/v1/session/*`.
//!
//! `connect` is the only route outside the gate — it is the login flow.

use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Extension, Json, Router};
use serde::{Deserialize, Serialize};

use docvault_core::session::{SessionState, WalletSession};

use crate::error::AppError;
use crate::middleware::SessionContext;
use crate::state::AppState;

/// Build the `/v1/session` router.
pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/connect", post(connect))
        .route("/disconnect", post(disconnect))
        .route("/", get(session_info))
}

#[derive(Debug, Deserialize)]
pub struct ConnectRequest {
    pub address: String,
}

#[derive(Debug, Serialize)]
pub struct SessionResponse {
    pub address: String,
    pub state: SessionState,
}

impl From<WalletSession> for SessionResponse {
    fn from(session: WalletSession) -> Self {
        Self {
            address: session.address,
            state: session.state,
        }
    }
}

/// Connect a wallet. The mock handshake resolves immediately.
async fn connect(
    State(state): State<Arc<AppState>>,
    Json(req): Json<ConnectRequest>,
) -> Result<Json<SessionResponse>, AppError> {
    let session = state.sessions.connect(&req.address).await?;
    Ok(Json(session.into()))
}

/// The caller's session.
async fn session_info(
    State(state): State<Arc<AppState>>,
    Extension(ctx): Extension<SessionContext>,
) -> Result<Json<SessionResponse>, AppError> {
    let session = state
        .sessions
        .get(&ctx.address)
        .await
        .ok_or_else(|| AppError::Unauthorized("session expired".to_owned()))?;
    Ok(Json(session.into()))
}

/// Drop the caller's session.
async fn disconnect(
    State(state): State<Arc<AppState>>,
    Extension(ctx): Extension<SessionContext>,
) -> Result<StatusCode, AppError> {
    state.sessions.disconnect(&ctx.address).await?;
    Ok(StatusCode::NO_CONTENT)
}
