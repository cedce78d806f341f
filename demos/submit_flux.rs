use std::time::Duration;

use image_task_relay::api::AppState;
use image_task_relay::orchestrator::{GenerationRequest, TaskReport};
use image_task_relay::Config;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load env (if .env present)
    Config::dotenv_load();
    let cfg = Config::new()?;
    let state = AppState::from_config(&cfg)?;

    let mut request = GenerationRequest::new("a lighthouse on a basalt cliff at dawn");
    request.style = Some("oil painting".to_string());

    println!("Submitting task to {}", cfg.task_api_url);
    let handle = state.orchestrator.submit(&request).await?;
    println!("Task id: {}", handle.task_id);

    // Polling cadence is up to the caller.
    loop {
        match state.orchestrator.status(&handle.task_id).await? {
            TaskReport::Completed(envelope) => {
                println!("Result: {}", serde_json::to_string_pretty(&envelope)?);
                break;
            }
            TaskReport::Pending(status) if status.status == "failed" => {
                println!("Task failed: {}", status.error.unwrap_or_default());
                break;
            }
            TaskReport::Pending(status) => {
                println!("Status: {}", status.status);
                tokio::time::sleep(Duration::from_secs(5)).await;
            }
        }
    }
    Ok(())
}
