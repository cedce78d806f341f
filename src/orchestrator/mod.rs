pub mod task;

pub use task::{GenerationRequest, ImageTaskOrchestrator, NormalizedStatus, TaskHandle, TaskReport, TaskState};
