//! Shared state and router wiring for the HTTP API.
use std::sync::Arc;

use axum::body::Body;
use axum::http::Request;
use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use uuid::Uuid;

use crate::api::handlers;
use crate::config::Config;
use crate::error::AppResult;
use crate::huggingface::HuggingFaceClient;
use crate::openai::OpenAiClient;
use crate::orchestrator::ImageTaskOrchestrator;
use crate::prompt::PromptEnhancer;
use crate::provider::TaskApiClient;

/// Read-only state shared by all handlers. Built once at start.
pub struct AppState {
    pub enhancer: PromptEnhancer,
    pub orchestrator: ImageTaskOrchestrator,
    pub openai: OpenAiClient,
    pub huggingface: HuggingFaceClient,
    pub enhance_max_words: u32,
}

impl AppState {
    pub fn from_config(config: &Config) -> AppResult<Self> {
        let http = config.http_client()?;
        let openai = OpenAiClient::new(
            http.clone(),
            config.openai_base_url.clone(),
            config.openai_api_key.clone(),
            config.openai_model.clone(),
        );
        let enhancer = PromptEnhancer::new(Arc::new(openai.clone()));
        let tasks = TaskApiClient::new(http.clone(), config.task_api_url.clone(), config.task_api_key.clone());
        let huggingface = HuggingFaceClient::new(http, config.hf_api_url.clone(), config.hf_api_token.clone());

        Ok(AppState {
            orchestrator: ImageTaskOrchestrator::new(enhancer.clone(), tasks, config.enhance_max_words),
            enhancer,
            openai,
            huggingface,
            enhance_max_words: config.enhance_max_words,
        })
    }
}

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(handlers::root))
        .route("/enhance_prompt/", post(handlers::enhance_prompt))
        .route("/generate_image_flux/", post(handlers::generate_image_flux))
        .route("/image_task/:task_id", get(handlers::image_task))
        .route("/generate_image_openai/", post(handlers::generate_image_openai))
        .route("/generate_image_hf/", post(handlers::generate_image_hf))
        .layer(
            TraceLayer::new_for_http().make_span_with(|request: &Request<Body>| {
                tracing::info_span!(
                    "request",
                    request_id = %Uuid::new_v4(),
                    method = %request.method(),
                    uri = %request.uri(),
                )
            }),
        )
        .layer(CorsLayer::permissive())
        .with_state(state)
}
