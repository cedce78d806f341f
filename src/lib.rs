//! Image task relay library
//!
//! Modules:
//! - `api`: Axum HTTP handlers and router setup used by the binary.
//! - `orchestrator`: Image task submission and status normalization.
//! - `prompt`: Prompt enhancement through a text-generation model.
//! - `provider`: Thin client for the job-based inference API.
//! - `openai`: Chat and image endpoints of an OpenAI-compatible API.
//! - `huggingface`: Direct text-to-image calls returning raw bytes.
//! - `config`: Env-driven configuration loader.
//! - `error`: Common error type and alias.
//!
//! Re-exports are provided for common types: `Config`, `AppError`,
//! `PromptEnhancer`, `ImageTaskOrchestrator`, `TaskApiClient`, `OpenAiClient`
//! and `HuggingFaceClient`.
pub mod api;
pub mod config;
pub mod error;
pub mod huggingface;
pub mod openai;
pub mod orchestrator;
pub mod prompt;
pub mod provider;

pub use config::Config;
pub use error::{AppError, AppResult};
pub use huggingface::HuggingFaceClient;
pub use openai::OpenAiClient;
pub use orchestrator::ImageTaskOrchestrator;
pub use prompt::PromptEnhancer;
pub use provider::TaskApiClient;
