//! HTTP surface — chat turns, proposal triggers, resume uploads.

use std::path::PathBuf;
use std::sync::Arc;

use axum::extract::{Multipart, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use tower_http::cors::CorsLayer;
use tracing::{info, warn};

use crate::api::dto::{AcceptedResponse, ChatRequest, ChatResponse, ProposalRequest, UploadResponse};
use crate::dialog::DialogEngine;
use crate::pipeline::ProposalPipeline;
use crate::store::LeadStore;
use crate::worker::BackgroundExecutor;

/// Shared state for all routes.
#[derive(Clone)]
pub struct AppState {
    pub engine: Arc<DialogEngine>,
    pub pipeline: Arc<ProposalPipeline>,
    pub executor: Arc<BackgroundExecutor>,
    pub store: Arc<dyn LeadStore>,
    pub resume_dir: PathBuf,
}

/// POST /chat — one synchronous conversation turn.
async fn chat(
    State(state): State<AppState>,
    Json(request): Json<ChatRequest>,
) -> Json<ChatResponse> {
    let result = state
        .engine
        .handle_turn(request.stage, request.session, request.user_input.as_deref())
        .await;
    Json(result.into())
}

/// POST /generate-proposal — accept and run the pipeline in the background.
///
/// Returns 202 immediately; documents are delivered out-of-band. Pipeline
/// failures are logged by the executor and never reported back here.
async fn generate_proposal(
    State(state): State<AppState>,
    Json(request): Json<ProposalRequest>,
) -> impl IntoResponse {
    let pipeline = Arc::clone(&state.pipeline);
    let task_id = state
        .executor
        .submit("proposal-assembly", async move {
            pipeline
                .generate(
                    request.session,
                    request.category,
                    request.custom_category_name,
                    request.custom_category_data,
                )
                .await
        })
        .await;
    info!(task = %task_id, "Proposal generation accepted");
    (
        StatusCode::ACCEPTED,
        Json(AcceptedResponse {
            message: "Proposal generation accepted.".to_string(),
            task_id,
        }),
    )
}

/// POST /upload-resume — multipart pass-through to the resume store.
async fn upload_resume(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<UploadResponse>, (StatusCode, String)> {
    let mut email: Option<String> = None;
    let mut stored: Option<String> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| (StatusCode::BAD_REQUEST, format!("Malformed upload: {e}")))?
    {
        let name = field.name().map(str::to_string);
        match name.as_deref() {
            Some("email") => {
                email = Some(field.text().await.map_err(|e| {
                    (StatusCode::BAD_REQUEST, format!("Malformed email field: {e}"))
                })?);
            }
            Some("file") => {
                let original = field
                    .file_name()
                    .unwrap_or("resume.pdf")
                    .replace(['/', '\\'], "_");
                let filename = format!("{}_{original}", uuid::Uuid::new_v4());
                let bytes = field.bytes().await.map_err(|e| {
                    (StatusCode::BAD_REQUEST, format!("Malformed file field: {e}"))
                })?;
                tokio::fs::create_dir_all(&state.resume_dir).await.map_err(|e| {
                    (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        format!("Could not store file: {e}"),
                    )
                })?;
                tokio::fs::write(state.resume_dir.join(&filename), &bytes)
                    .await
                    .map_err(|e| {
                        (
                            StatusCode::INTERNAL_SERVER_ERROR,
                            format!("Could not store file: {e}"),
                        )
                    })?;
                stored = Some(filename);
            }
            _ => {}
        }
    }

    let email = email.ok_or((StatusCode::BAD_REQUEST, "Missing email field".to_string()))?;
    let filename = stored.ok_or((StatusCode::BAD_REQUEST, "Missing file field".to_string()))?;

    if let Err(e) = state.store.record_resume(&email, &filename).await {
        // The file is already on disk; the upload still counts.
        warn!(email = %email, error = %e, "Failed to record resume");
    }
    info!(email = %email, filename = %filename, "Resume stored");

    Ok(Json(UploadResponse {
        message: "Resume received. Our team will be in touch.".to_string(),
        filename,
    }))
}

/// GET /health — liveness probe.
async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({"status": "ok"}))
}

/// Build the application router.
pub fn app_routes(state: AppState) -> Router {
    Router::new()
        .route("/chat", post(chat))
        .route("/generate-proposal", post(generate_proposal))
        .route("/upload-resume", post(upload_resume))
        .route("/health", get(health))
        .layer(CorsLayer::permissive())
        .with_state(state)
}
