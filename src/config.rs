//! Env-driven configuration for the relay and the CLI.
//!
//! Values are read from the process environment; `dotenv` is loaded on demand
//! by the binaries. Defaults are provided for convenience during development.
use std::env;
use std::time::Duration;

use crate::error::{AppError, AppResult};

pub const DEFAULT_OPENAI_BASE_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_OPENAI_MODEL: &str = "gpt-4o-mini";
pub const DEFAULT_TASK_API_URL: &str = "https://api.piapi.ai/api/v1";
pub const DEFAULT_HF_API_URL: &str = "https://api-inference.huggingface.co/models";

#[derive(Debug, Clone)]
pub struct Config {
    pub openai_api_key: String,
    pub openai_base_url: String,
    pub openai_model: String,
    pub task_api_key: String,
    pub task_api_url: String,
    pub hf_api_token: String,
    pub hf_api_url: String,
    pub api_host: String,
    pub api_port: String,
    pub request_timeout: Duration,
    pub enhance_max_words: u32,
}

impl Config {
    pub fn dotenv_load() {
        dotenv::dotenv().ok();
    }

    pub fn new() -> AppResult<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build a config from an arbitrary key lookup. `new` uses the process env.
    pub fn from_lookup<F>(lookup: F) -> AppResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_string());

        let timeout_secs: u64 = get("REQUEST_TIMEOUT_SECS", "60")
            .parse()
            .map_err(|_| AppError::Config("REQUEST_TIMEOUT_SECS must be a whole number of seconds".into()))?;
        let enhance_max_words: u32 = get("ENHANCE_MAX_WORDS", "75")
            .parse()
            .map_err(|_| AppError::Config("ENHANCE_MAX_WORDS must be a positive integer".into()))?;
        if enhance_max_words == 0 {
            return Err(AppError::Config("ENHANCE_MAX_WORDS must be a positive integer".into()));
        }

        Ok(Config {
            openai_api_key: get("OPENAI_API_KEY", ""),
            openai_base_url: get("OPENAI_BASE_URL", DEFAULT_OPENAI_BASE_URL),
            openai_model: get("OPENAI_MODEL", DEFAULT_OPENAI_MODEL),
            task_api_key: get("TASK_API_KEY", ""),
            task_api_url: get("TASK_API_URL", DEFAULT_TASK_API_URL),
            hf_api_token: get("HF_API_TOKEN", ""),
            hf_api_url: get("HF_API_URL", DEFAULT_HF_API_URL),
            api_host: get("API_HOST", "127.0.0.1"),
            api_port: get("API_PORT", "8000"),
            request_timeout: Duration::from_secs(timeout_secs),
            enhance_max_words,
        })
    }

    /// Shared outbound HTTP client; every upstream call is bounded by the configured timeout.
    pub fn http_client(&self) -> AppResult<reqwest::Client> {
        reqwest::Client::builder()
            .timeout(self.request_timeout)
            .build()
            .map_err(AppError::HttpClient)
    }

    pub fn log_effective(&self) {
        tracing::info!(
            openai_base_url = %self.openai_base_url,
            openai_model = %self.openai_model,
            openai_api_key = %mask(&self.openai_api_key),
            task_api_url = %self.task_api_url,
            task_api_key = %mask(&self.task_api_key),
            hf_api_url = %self.hf_api_url,
            hf_api_token = %mask(&self.hf_api_token),
            api_host = %self.api_host,
            api_port = %self.api_port,
            timeout_secs = self.request_timeout.as_secs(),
            enhance_max_words = self.enhance_max_words,
            "effective configuration"
        );
        for (name, value) in [
            ("OPENAI_API_KEY", &self.openai_api_key),
            ("TASK_API_KEY", &self.task_api_key),
            ("HF_API_TOKEN", &self.hf_api_token),
        ] {
            if value.is_empty() {
                tracing::warn!("{} is not set; requests to that provider will fail authentication", name);
            }
        }
    }
}

fn mask(secret: &str) -> &'static str {
    if secret.is_empty() { "<unset>" } else { "<set>" }
}
