//! Thin client for the Hugging Face inference API.
//!
//! `generate` posts a text-to-image request for a model and returns the raw
//! image bytes together with the content type the API reported. Callers decide
//! where the bytes go; nothing is written to disk here.
use reqwest::header::CONTENT_TYPE;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppResult};
use crate::orchestrator::task::{DEFAULT_DIMENSION, DEFAULT_GUIDANCE_SCALE};

pub const FLUX_DEV_MODEL: &str = "black-forest-labs/FLUX.1-dev";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HfParameters {
    #[serde(default = "default_dimension")]
    pub width: u32,
    #[serde(default = "default_dimension")]
    pub height: u32,
    #[serde(default = "default_guidance_scale")]
    pub guidance_scale: f64,
    #[serde(default = "default_steps")]
    pub num_inference_steps: u32,
}

impl HfParameters {
    pub fn validate(&self) -> AppResult<()> {
        if self.width == 0 || self.height == 0 {
            return Err(AppError::BadRequest("width and height must be positive".to_string()));
        }
        if !(self.guidance_scale.is_finite() && self.guidance_scale > 0.0) {
            return Err(AppError::BadRequest("guidance_scale must be a positive number".to_string()));
        }
        if self.num_inference_steps == 0 {
            return Err(AppError::BadRequest("num_inference_steps must be positive".to_string()));
        }
        Ok(())
    }
}

fn default_dimension() -> u32 {
    DEFAULT_DIMENSION
}

fn default_guidance_scale() -> f64 {
    DEFAULT_GUIDANCE_SCALE
}

fn default_steps() -> u32 {
    50
}

#[derive(Debug, Serialize)]
struct HfRequest<'a> {
    inputs: &'a str,
    parameters: &'a HfParameters,
}

/// Image bytes returned by one generation call.
#[derive(Debug, Clone)]
pub struct GeneratedImage {
    pub bytes: Vec<u8>,
    pub content_type: String,
}

#[derive(Clone)]
pub struct HuggingFaceClient {
    client: Client,
    base_url: String,
    api_token: String,
}

impl HuggingFaceClient {
    pub fn new(client: Client, base_url: String, api_token: String) -> Self {
        let base = base_url.trim_end_matches('/').to_string();
        HuggingFaceClient { client, base_url: base, api_token }
    }

    pub async fn generate(&self, model: &str, prompt: &str, parameters: &HfParameters) -> AppResult<GeneratedImage> {
        parameters.validate()?;
        let url = format!("{}/{}", self.base_url, model);
        tracing::info!("Requesting image from Hugging Face model {}", model);

        let response = self.client.post(&url)
            .bearer_auth(&self.api_token)
            .json(&HfRequest { inputs: prompt, parameters })
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_else(|_| "Unable to read error body".to_string());
            tracing::error!("Hugging Face generation failed. Status: {}, Body: {}", status, body);
            return Err(AppError::Provider { status: status.as_u16(), body });
        }

        let content_type = response.headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("image/png")
            .to_string();
        let bytes = response.bytes().await?.to_vec();
        tracing::info!("Received {} bytes ({})", bytes.len(), content_type);
        Ok(GeneratedImage { bytes, content_type })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn params(value: serde_json::Value) -> HfParameters {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn missing_parameters_take_defaults() {
        let p = params(json!({}));
        assert_eq!((p.width, p.height, p.num_inference_steps), (1024, 1024, 50));
        assert_eq!(p.guidance_scale, DEFAULT_GUIDANCE_SCALE);
        assert!(p.validate().is_ok());
    }

    #[test]
    fn out_of_range_parameters_are_rejected() {
        for bad in [
            json!({"width": 0}),
            json!({"height": 0}),
            json!({"guidance_scale": -1.0}),
            json!({"guidance_scale": 0.0}),
            json!({"num_inference_steps": 0}),
        ] {
            assert!(
                matches!(params(bad.clone()).validate(), Err(AppError::BadRequest(_))),
                "accepted {}",
                bad
            );
        }
    }
}
