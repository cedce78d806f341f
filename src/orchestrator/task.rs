//! Image task lifecycle: submit a txt2img job and report its status.
//!
//! The relay is stateless. A task id is handed back to the caller and every
//! status query goes to the provider again; nothing is cached between calls.
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{AppError, AppResult};
use crate::prompt::PromptEnhancer;
use crate::provider::types::{CreateTaskBody, Envelope, TaskInput};
use crate::provider::TaskApiClient;

pub const DEFAULT_DIMENSION: u32 = 1024;
pub const DEFAULT_GUIDANCE_SCALE: f64 = 7.5;

fn default_dimension() -> u32 {
    DEFAULT_DIMENSION
}

fn default_guidance_scale() -> f64 {
    DEFAULT_GUIDANCE_SCALE
}

#[derive(Debug, Clone, Deserialize)]
pub struct GenerationRequest {
    pub prompt: String,
    #[serde(default = "default_dimension")]
    pub width: u32,
    #[serde(default = "default_dimension")]
    pub height: u32,
    #[serde(default = "default_guidance_scale")]
    pub guidance_scale: f64,
    #[serde(default)]
    pub style: Option<String>,
}

impl GenerationRequest {
    pub fn new(prompt: impl Into<String>) -> Self {
        GenerationRequest {
            prompt: prompt.into(),
            width: DEFAULT_DIMENSION,
            height: DEFAULT_DIMENSION,
            guidance_scale: DEFAULT_GUIDANCE_SCALE,
            style: None,
        }
    }

    pub fn validate(&self) -> AppResult<()> {
        if self.prompt.trim().is_empty() {
            return Err(AppError::BadRequest("prompt must not be empty".to_string()));
        }
        if self.width == 0 || self.height == 0 {
            return Err(AppError::BadRequest("width and height must be positive".to_string()));
        }
        if !(self.guidance_scale.is_finite() && self.guidance_scale > 0.0) {
            return Err(AppError::BadRequest("guidance_scale must be a positive number".to_string()));
        }
        Ok(())
    }
}

/// Opaque provider task identifier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskHandle {
    pub task_id: String,
}

/// Coarse lifecycle state derived from the provider's status string.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskState {
    Queued,
    Running,
    Succeeded,
    Failed,
    Unknown,
}

impl TaskState {
    pub fn from_provider(status: &str) -> Self {
        match status.to_lowercase().as_str() {
            "success" | "completed" => TaskState::Succeeded,
            "pending" | "queued" | "staged" => TaskState::Queued,
            "processing" | "running" | "in_progress" => TaskState::Running,
            "failed" | "error" => TaskState::Failed,
            _ => TaskState::Unknown,
        }
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, TaskState::Succeeded | TaskState::Failed)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NormalizedStatus {
    pub status: String,
    pub task_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// What a status query hands back to the client.
///
/// Finished tasks return the provider envelope untouched so provider-specific
/// result fields survive; everything else is reshaped into `NormalizedStatus`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum TaskReport {
    Completed(Value),
    Pending(NormalizedStatus),
}

impl TaskReport {
    pub fn state(&self) -> TaskState {
        match self {
            TaskReport::Completed(_) => TaskState::Succeeded,
            TaskReport::Pending(s) => TaskState::from_provider(&s.status),
        }
    }
}

/// Turn a provider envelope for `task_id` into a client-facing report.
pub fn normalize_status(task_id: &str, raw: Value) -> AppResult<TaskReport> {
    let envelope = Envelope::from_value(&raw)?;
    let status = envelope.status()?.to_lowercase();
    if status == "success" || status == "completed" {
        return Ok(TaskReport::Completed(raw));
    }
    let error = envelope.error_message().map(str::to_string);
    Ok(TaskReport::Pending(NormalizedStatus {
        status,
        task_id: task_id.to_string(),
        error,
    }))
}

#[derive(Clone)]
pub struct ImageTaskOrchestrator {
    enhancer: PromptEnhancer,
    client: TaskApiClient,
    max_words: u32,
}

impl ImageTaskOrchestrator {
    pub fn new(enhancer: PromptEnhancer, client: TaskApiClient, max_words: u32) -> Self {
        ImageTaskOrchestrator { enhancer, client, max_words }
    }

    /// Enhance the prompt (never failing) and submit one txt2img job.
    pub async fn submit(&self, request: &GenerationRequest) -> AppResult<TaskHandle> {
        request.validate()?;

        let enhanced = self.enhancer
            .enhance(&request.prompt, request.style.as_deref(), self.max_words)
            .await;
        tracing::info!(fallback = enhanced.is_fallback(), prompt = %enhanced.text(), "Prompt prepared for submission");

        let body = CreateTaskBody::txt2img(TaskInput {
            prompt: enhanced.into_text(),
            width: request.width,
            height: request.height,
            guidance_scale: request.guidance_scale,
        });
        let raw = self.client.create_task(&body).await?;
        let task_id = Envelope::from_value(&raw)?.task_id()?.to_string();
        tracing::info!(task_id = %task_id, "Task submitted");
        Ok(TaskHandle { task_id })
    }

    /// Query the provider for `task_id` and normalize the answer.
    pub async fn status(&self, task_id: &str) -> AppResult<TaskReport> {
        let raw = self.client.get_task(task_id).await?;
        let report = normalize_status(task_id, raw)?;
        tracing::debug!(task_id = %task_id, state = ?report.state(), "Task status fetched");
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn mixed_case_completed_returns_raw_envelope() {
        let raw = json!({
            "code": 200,
            "data": {"task_id": "t1", "status": "Completed", "output": {"image_url": "https://cdn/x.png"}}
        });
        let report = normalize_status("t1", raw.clone()).unwrap();
        assert_eq!(report, TaskReport::Completed(raw.clone()));
        assert_eq!(serde_json::to_value(&report).unwrap(), raw);
    }

    #[test]
    fn success_is_an_alias_for_completed() {
        let raw = json!({"data": {"status": "SUCCESS"}});
        assert!(matches!(normalize_status("t1", raw).unwrap(), TaskReport::Completed(_)));
    }

    #[test]
    fn failed_status_carries_provider_error() {
        let raw = json!({"data": {"task_id": "t9", "status": "failed", "error": {"message": "oom"}}});
        let report = normalize_status("t9", raw).unwrap();
        assert_eq!(
            serde_json::to_value(&report).unwrap(),
            json!({"status": "failed", "task_id": "t9", "error": "oom"})
        );
        assert_eq!(report.state(), TaskState::Failed);
    }

    #[test]
    fn in_flight_status_omits_error_field() {
        let raw = json!({"data": {"status": "Processing", "error": {"message": ""}}});
        let report = normalize_status("t2", raw).unwrap();
        assert_eq!(
            serde_json::to_value(&report).unwrap(),
            json!({"status": "processing", "task_id": "t2"})
        );
        assert_eq!(report.state(), TaskState::Running);
    }

    #[test]
    fn unrecognized_status_is_passed_through_as_unknown() {
        let report = normalize_status("t3", json!({"data": {"status": "retrying"}})).unwrap();
        assert_eq!(report.state(), TaskState::Unknown);
        assert!(!report.state().is_terminal());
    }

    #[test]
    fn missing_status_is_a_parse_error() {
        let err = normalize_status("t4", json!({"data": {}})).unwrap_err();
        assert!(matches!(err, AppError::ProviderParse(_)));
    }

    #[test]
    fn request_defaults_fill_missing_fields() {
        let req: GenerationRequest = serde_json::from_value(json!({"prompt": "a fox"})).unwrap();
        assert_eq!(req.width, 1024);
        assert_eq!(req.height, 1024);
        assert_eq!(req.guidance_scale, DEFAULT_GUIDANCE_SCALE);
        assert!(req.style.is_none());
    }

    #[test]
    fn validation_rejects_blank_prompt_and_bad_numbers() {
        assert!(GenerationRequest::new("  ").validate().is_err());

        let mut req = GenerationRequest::new("a fox");
        req.width = 0;
        assert!(req.validate().is_err());

        let mut req = GenerationRequest::new("a fox");
        req.guidance_scale = -1.0;
        assert!(req.validate().is_err());

        assert!(GenerationRequest::new("a fox").validate().is_ok());
    }
}
