//! Wire types for the job-based inference API.
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{AppError, AppResult};

/// Model identifier sent with every txt2img job.
pub const FLUX_MODEL: &str = "Qubico/flux1-dev";
pub const TASK_TYPE_TXT2IMG: &str = "txt2img";

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct TaskInput {
    pub prompt: String,
    pub width: u32,
    pub height: u32,
    pub guidance_scale: f64,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct CreateTaskBody {
    pub model: String,
    pub task_type: String,
    pub input: TaskInput,
}

impl CreateTaskBody {
    pub fn txt2img(input: TaskInput) -> Self {
        CreateTaskBody {
            model: FLUX_MODEL.to_string(),
            task_type: TASK_TYPE_TXT2IMG.to_string(),
            input,
        }
    }
}

/// `data` section of the provider envelope. Only the fields the relay reads are typed.
#[derive(Debug, Clone, Deserialize)]
pub struct TaskData {
    #[serde(default)]
    pub task_id: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub error: Option<TaskError>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TaskError {
    #[serde(default)]
    pub message: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Envelope {
    pub data: TaskData,
}

impl Envelope {
    pub fn from_value(raw: &Value) -> AppResult<Self> {
        Envelope::deserialize(raw)
            .map_err(|e| AppError::ProviderParse(format!("unexpected envelope shape: {}", e)))
    }

    pub fn task_id(&self) -> AppResult<&str> {
        self.data.task_id
            .as_deref()
            .ok_or_else(|| AppError::ProviderParse("missing data.task_id".to_string()))
    }

    pub fn status(&self) -> AppResult<&str> {
        self.data.status
            .as_deref()
            .ok_or_else(|| AppError::ProviderParse("missing data.status".to_string()))
    }

    /// Provider-supplied error message, if any and non-empty.
    pub fn error_message(&self) -> Option<&str> {
        self.data.error
            .as_ref()
            .and_then(|e| e.message.as_deref())
            .filter(|m| !m.is_empty())
    }
}
