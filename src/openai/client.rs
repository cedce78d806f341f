//! Thin HTTP client for OpenAI-compatible endpoints.
//!
//! - `chat` posts a single user message to `/chat/completions` and returns the
//!   first choice's text. It backs the prompt enhancer via `TextGenerator`.
//! - `generate_image` posts to `/images/generations` and returns the URL of the
//!   first generated image.
use async_trait::async_trait;
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppResult};
use crate::prompt::TextGenerator;

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChatChoiceMessage {
    content: Option<String>,
}

#[derive(Debug, Serialize)]
struct ImageRequest<'a> {
    prompt: &'a str,
    n: u8,
    size: &'a str,
}

#[derive(Debug, Deserialize)]
struct ImageResponse {
    data: Vec<ImageData>,
}

#[derive(Debug, Deserialize)]
struct ImageData {
    url: Option<String>,
}

#[derive(Clone)]
pub struct OpenAiClient {
    client: Client,
    base_url: String,
    api_key: String,
    model: String,
}

impl OpenAiClient {
    pub fn new(client: Client, base_url: String, api_key: String, model: String) -> Self {
        let base = base_url.trim_end_matches('/').to_string();
        OpenAiClient { client, base_url: base, api_key, model }
    }

    /// Send one user message and return the text of the first choice.
    pub async fn chat(&self, content: &str) -> AppResult<String> {
        let url = format!("{}/chat/completions", self.base_url);
        let body = ChatRequest {
            model: &self.model,
            messages: vec![ChatMessage { role: "user", content }],
        };
        tracing::debug!(model = %self.model, "Sending chat completion request");

        let response = self.client.post(&url)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await?;

        let parsed: ChatResponse = read_json(response, "chat completion").await?;
        parsed.choices
            .into_iter()
            .next()
            .map(|c| c.message.content.unwrap_or_default())
            .ok_or_else(|| AppError::ProviderParse("chat completion has no choices".to_string()))
    }

    /// Generate one 1024x1024 image and return its hosted URL.
    pub async fn generate_image(&self, prompt: &str) -> AppResult<String> {
        let url = format!("{}/images/generations", self.base_url);
        let body = ImageRequest { prompt, n: 1, size: "1024x1024" };
        tracing::info!("Requesting image generation from OpenAI");

        let response = self.client.post(&url)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await?;

        let parsed: ImageResponse = read_json(response, "image generation").await?;
        parsed.data
            .into_iter()
            .next()
            .and_then(|d| d.url)
            .ok_or_else(|| AppError::ProviderParse("image response has no data[0].url".to_string()))
    }
}

/// Non-2xx becomes `Provider`; a 2xx body that does not match `T` becomes `ProviderParse`.
async fn read_json<T: DeserializeOwned>(response: Response, op: &str) -> AppResult<T> {
    let status = response.status();
    let body = response.text().await?;
    if !status.is_success() {
        tracing::error!("{} failed. Status: {}, Body: {}", op, status, body);
        return Err(AppError::Provider { status: status.as_u16(), body });
    }
    serde_json::from_str(&body)
        .map_err(|e| AppError::ProviderParse(format!("{} response does not parse: {}", op, e)))
}

#[async_trait]
impl TextGenerator for OpenAiClient {
    async fn generate(&self, instruction: &str) -> AppResult<String> {
        self.chat(instruction).await
    }
}
