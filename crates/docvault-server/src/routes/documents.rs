//! Document routes: `/v1/documents/*`.
//!
//! Uploads run the full pipeline before answering, so a successful
//! response carries the finished document. A second request from the
//! same wallet can watch progress on `GET /v1/documents/status`.

use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Extension, Json, Router};
use serde::{Deserialize, Serialize};

use docvault_core::document::{AccessPolicy, Document};
use docvault_core::share::ShareReceipt;
use docvault_core::upload::{UploadPhase, UploadRequest, UploadStatus};
use docvault_core::verify::AccessDecision;

use crate::error::AppError;
use crate::middleware::SessionContext;
use crate::state::AppState;

/// Build the `/v1/documents` router.
pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", post(upload_document).get(list_documents))
        .route("/status", get(upload_status))
        .route("/{id}/share", post(share_document))
        .route("/{id}/verify", post(verify_document))
        .route("/{id}/view", post(view_document))
}

#[derive(Debug, Deserialize)]
pub struct UploadParams {
    /// File name to register the document under.
    pub name: String,
    /// Sharing rule; defaults to `private` as in the source UI.
    pub policy: Option<AccessPolicy>,
}

#[derive(Debug, Serialize)]
pub struct ListResponse {
    pub documents: Vec<Document>,
}

#[derive(Debug, Deserialize)]
pub struct ShareRequest {
    pub recipient: String,
}

#[derive(Debug, Serialize)]
pub struct ViewResponse {
    pub document_id: String,
    pub views: u64,
}

/// Run the upload pipeline on the request body.
async fn upload_document(
    State(state): State<Arc<AppState>>,
    Extension(ctx): Extension<SessionContext>,
    Query(params): Query<UploadParams>,
    body: Bytes,
) -> Result<(StatusCode, Json<Document>), AppError> {
    let controller = state.upload_controller(&ctx.address).await;
    let doc = controller
        .upload(UploadRequest {
            name: params.name,
            bytes: body.to_vec(),
            policy: params.policy.unwrap_or(AccessPolicy::Private),
            owner: ctx.address,
        })
        .await?;
    Ok((StatusCode::CREATED, Json(doc)))
}

/// All documents in insertion order.
async fn list_documents(State(state): State<Arc<AppState>>) -> Json<ListResponse> {
    Json(ListResponse {
        documents: state.registry.list().await,
    })
}

/// Phase and progress of the caller's upload controller.
async fn upload_status(
    State(state): State<Arc<AppState>>,
    Extension(ctx): Extension<SessionContext>,
) -> Json<UploadStatus> {
    let status = match state.existing_upload_controller(&ctx.address).await {
        Some(controller) => controller.status().await,
        None => UploadStatus {
            phase: UploadPhase::Idle,
            progress: 0,
        },
    };
    Json(status)
}

/// Grant another wallet access to a document.
async fn share_document(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(req): Json<ShareRequest>,
) -> Result<Json<ShareReceipt>, AppError> {
    let receipt = state.share.share(&id, &req.recipient).await?;
    Ok(Json(receipt))
}

/// Ask the verifier whether the caller may access a document.
async fn verify_document(
    State(state): State<Arc<AppState>>,
    Extension(ctx): Extension<SessionContext>,
    Path(id): Path<String>,
) -> Result<Json<AccessDecision>, AppError> {
    let decision = state.access.verify(&id, &ctx.address).await?;
    Ok(Json(decision))
}

/// Record a view on a document.
async fn view_document(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<ViewResponse>, AppError> {
    let views = state
        .registry
        .record_view(&id)
        .await
        .ok_or_else(|| AppError::NotFound(format!("document '{id}' not found")))?;
    Ok(Json(ViewResponse {
        document_id: id,
        views,
    }))
}
