//! Axum request handlers for the HTTP API.
use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::api::routes::AppState;
use crate::error::{AppError, AppResult};
use crate::huggingface::{HfParameters, FLUX_DEV_MODEL};
use crate::orchestrator::{GenerationRequest, TaskHandle, TaskReport};

pub async fn root() -> &'static str {
    "Image Task Relay"
}

#[derive(Debug, Deserialize)]
pub struct EnhanceRequest {
    pub prompt: String,
    #[serde(default)]
    pub style: Option<String>,
    #[serde(default)]
    pub max_words: Option<u32>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct EnhanceResponse {
    pub enhanced_prompt: String,
}

#[derive(Debug, Deserialize)]
pub struct PromptOnly {
    pub prompt: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ImageUrlResponse {
    pub image_url: String,
}

#[derive(Debug, Deserialize)]
pub struct HfImageRequest {
    pub prompt: String,
    #[serde(flatten)]
    pub parameters: HfParameters,
}

fn require_prompt(prompt: &str) -> AppResult<()> {
    if prompt.trim().is_empty() {
        return Err(AppError::BadRequest("prompt must not be empty".to_string()));
    }
    Ok(())
}

/// Interactive enhancement: model failures are reported, not hidden.
pub async fn enhance_prompt(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<EnhanceRequest>,
) -> AppResult<Json<EnhanceResponse>> {
    require_prompt(&payload.prompt)?;
    let max_words = payload.max_words.filter(|n| *n > 0).unwrap_or(state.enhance_max_words);
    let enhanced = state.enhancer
        .try_enhance(&payload.prompt, payload.style.as_deref(), max_words)
        .await?;
    Ok(Json(EnhanceResponse { enhanced_prompt: enhanced.into_text() }))
}

pub async fn generate_image_flux(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<GenerationRequest>,
) -> AppResult<(StatusCode, Json<TaskHandle>)> {
    let handle = state.orchestrator.submit(&payload).await?;
    Ok((StatusCode::ACCEPTED, Json(handle)))
}

pub async fn image_task(
    State(state): State<Arc<AppState>>,
    Path(task_id): Path<String>,
) -> AppResult<Json<TaskReport>> {
    state.orchestrator.status(&task_id).await.map(Json)
}

pub async fn generate_image_openai(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<PromptOnly>,
) -> AppResult<Json<ImageUrlResponse>> {
    require_prompt(&payload.prompt)?;
    let image_url = state.openai.generate_image(&payload.prompt).await?;
    Ok(Json(ImageUrlResponse { image_url }))
}

/// Returns the generated image bytes directly in the response body.
pub async fn generate_image_hf(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<HfImageRequest>,
) -> AppResult<impl IntoResponse> {
    require_prompt(&payload.prompt)?;
    let image = state.huggingface
        .generate(FLUX_DEV_MODEL, &payload.prompt, &payload.parameters)
        .await?;
    Ok(([(header::CONTENT_TYPE, image.content_type)], image.bytes))
}
