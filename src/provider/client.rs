//! Thin HTTP client for the job-based inference API.
//!
//! - `create_task` posts a job body to `/task`.
//! - `get_task` fetches `/task/{task_id}`.
//!
//! Both return the raw JSON envelope; interpretation lives in the orchestrator.
//! Every call is attempted exactly once.
use reqwest::{Client, Response, Url};
use serde_json::Value;

use crate::error::{AppError, AppResult};
use crate::provider::types::CreateTaskBody;

#[derive(Clone)]
pub struct TaskApiClient {
    client: Client,
    base_url: String,
    api_key: String,
}

impl TaskApiClient {
    pub fn new(client: Client, base_url: String, api_key: String) -> Self {
        let base = base_url.trim_end_matches('/').to_string();
        TaskApiClient { client, base_url: base, api_key }
    }

    pub async fn create_task(&self, body: &CreateTaskBody) -> AppResult<Value> {
        let url = format!("{}/task", self.base_url);
        tracing::info!("Submitting {} task to {}", body.task_type, url);
        tracing::debug!("Task payload: {:?}", body);

        let response = self.client.post(&url)
            .header("x-api-key", &self.api_key)
            .json(body)
            .send()
            .await?;

        read_envelope(response, "create task").await
    }

    pub async fn get_task(&self, task_id: &str) -> AppResult<Value> {
        let url = task_url(&self.base_url, task_id)?;
        tracing::debug!("Fetching task status from {}", url);

        let response = self.client.get(url)
            .header("x-api-key", &self.api_key)
            .send()
            .await?;

        read_envelope(response, "get task").await
    }
}

/// `{base}/task/{task_id}` with the id confined to a single path segment.
fn task_url(base_url: &str, task_id: &str) -> AppResult<Url> {
    // Provider ids are UUID-like: alphanumeric, underscore, and hyphen only
    if task_id.is_empty() || !task_id.chars().all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-') {
        return Err(AppError::BadRequest(format!("invalid task id '{}'", task_id)));
    }
    let mut url = Url::parse(base_url)
        .map_err(|e| AppError::Config(format!("invalid TASK_API_URL '{}': {}", base_url, e)))?;
    url.path_segments_mut()
        .map_err(|_| AppError::Config(format!("TASK_API_URL '{}' cannot take a path", base_url)))?
        .pop_if_empty()
        .push("task")
        .push(task_id);
    Ok(url)
}

async fn read_envelope(response: Response, op: &str) -> AppResult<Value> {
    let status = response.status();
    let body = response.text().await?;
    if !status.is_success() {
        tracing::error!("Failed to {}. Status: {}, Body: {}", op, status, body);
        return Err(AppError::Provider { status: status.as_u16(), body });
    }
    serde_json::from_str(&body)
        .map_err(|e| AppError::ProviderParse(format!("{} response is not JSON: {}", op, e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn task_url_appends_id_as_one_segment() {
        let url = task_url("https://api.example.com/api/v1", "0f8e-41_ab").unwrap();
        assert_eq!(url.as_str(), "https://api.example.com/api/v1/task/0f8e-41_ab");
    }

    #[test]
    fn task_url_rejects_path_and_query_characters() {
        for id in ["../../admin/keys", "abc?delete=true", "a/b", "..", "", "abc#frag", "a%2Fb"] {
            assert!(
                matches!(task_url("https://api.example.com/api/v1", id), Err(AppError::BadRequest(_))),
                "accepted {:?}",
                id
            );
        }
    }

    #[test]
    fn task_url_reports_unusable_base() {
        assert!(matches!(task_url("not a url", "abc"), Err(AppError::Config(_))));
    }
}
