use std::path::PathBuf;
use std::time::Duration;

use clap::{Parser, Subcommand};
use image_task_relay::api::AppState;
use image_task_relay::huggingface::{HfParameters, FLUX_DEV_MODEL};
use image_task_relay::orchestrator::{GenerationRequest, TaskReport, TaskState};
use image_task_relay::Config;

#[derive(Parser, Debug)]
#[command(name = "relayctl", about = "CLI for the image task relay", version)]
struct Cli {
    /// Override TASK_API_URL
    #[arg(global = true, long)]
    task_api_url: Option<String>,

    /// Override OPENAI_BASE_URL
    #[arg(global = true, long)]
    openai_base_url: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Rewrite a prompt with the text model
    Enhance {
        prompt: String,
        /// Style tag to evoke, e.g. "watercolor"
        #[arg(long)]
        style: Option<String>,
        /// Advisory word bound passed to the model
        #[arg(long)]
        max_words: Option<u32>,
        /// Fail instead of falling back when the model call fails
        #[arg(long)]
        strict: bool,
    },
    /// Submit a txt2img task and print its id
    Submit {
        prompt: String,
        #[arg(long, default_value_t = 1024)]
        width: u32,
        #[arg(long, default_value_t = 1024)]
        height: u32,
        #[arg(long, default_value_t = 7.5)]
        guidance_scale: f64,
        #[arg(long)]
        style: Option<String>,
    },
    /// Fetch the current status of a task once
    Status {
        task_id: String,
        /// Pretty-print JSON
        #[arg(long)]
        pretty: bool,
    },
    /// Poll a task until it finishes or the poll budget runs out
    Wait {
        task_id: String,
        /// Seconds between polls
        #[arg(long, default_value_t = 5)]
        interval: u64,
        /// Give up after this many polls
        #[arg(long, default_value_t = 120)]
        max_polls: u32,
    },
    /// Generate an image with OpenAI and print its URL
    Openai { prompt: String },
    /// Generate an image with Hugging Face FLUX and save the bytes
    Hf {
        prompt: String,
        /// Output path for the image bytes
        #[arg(long, value_name = "PATH")]
        out: PathBuf,
        #[arg(long, default_value_t = 1024)]
        width: u32,
        #[arg(long, default_value_t = 1024)]
        height: u32,
        #[arg(long, default_value_t = 7.5)]
        guidance_scale: f64,
        #[arg(long, default_value_t = 50)]
        steps: u32,
    },
}

fn print_json(value: &impl serde::Serialize, pretty: bool) -> Result<(), Box<dyn std::error::Error>> {
    if pretty {
        println!("{}", serde_json::to_string_pretty(value)?);
    } else {
        println!("{}", serde_json::to_string(value)?);
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load env and parse CLI
    Config::dotenv_load();
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "warn".into()))
        .with_writer(std::io::stderr)
        .init();
    let cli = Cli::parse();

    let mut conf = Config::new()?;
    if let Some(url) = cli.task_api_url {
        conf.task_api_url = url;
    }
    if let Some(url) = cli.openai_base_url {
        conf.openai_base_url = url;
    }
    let state = AppState::from_config(&conf)?;

    match cli.command {
        Commands::Enhance { prompt, style, max_words, strict } => {
            let max_words = max_words.unwrap_or(conf.enhance_max_words);
            let enhanced = if strict {
                state.enhancer.try_enhance(&prompt, style.as_deref(), max_words).await?
            } else {
                state.enhancer.enhance(&prompt, style.as_deref(), max_words).await
            };
            if enhanced.is_fallback() {
                eprintln!("Note: model output unavailable, using fallback prompt");
            }
            println!("{}", enhanced.text());
            Ok(())
        }
        Commands::Submit { prompt, width, height, guidance_scale, style } => {
            let request = GenerationRequest { prompt, width, height, guidance_scale, style };
            let handle = state.orchestrator.submit(&request).await?;
            println!("{}", handle.task_id);
            Ok(())
        }
        Commands::Status { task_id, pretty } => {
            let report = state.orchestrator.status(&task_id).await?;
            print_json(&report, pretty)
        }
        Commands::Wait { task_id, interval, max_polls } => {
            for attempt in 1..=max_polls {
                let report = state.orchestrator.status(&task_id).await?;
                let current = report.state();
                if current.is_terminal() {
                    print_json(&report, true)?;
                    if current == TaskState::Failed {
                        std::process::exit(1);
                    }
                    return Ok(());
                }
                if let TaskReport::Pending(s) = &report {
                    eprintln!("[{}/{}] {}: {}", attempt, max_polls, task_id, s.status);
                }
                tokio::time::sleep(Duration::from_secs(interval)).await;
            }
            eprintln!("Task {} did not finish after {} polls", task_id, max_polls);
            std::process::exit(2);
        }
        Commands::Openai { prompt } => {
            let url = state.openai.generate_image(&prompt).await?;
            println!("{}", url);
            Ok(())
        }
        Commands::Hf { prompt, out, width, height, guidance_scale, steps } => {
            let parameters = HfParameters { width, height, guidance_scale, num_inference_steps: steps };
            let image = state.huggingface.generate(FLUX_DEV_MODEL, &prompt, &parameters).await?;
            if let Some(parent) = out.parent().filter(|p| !p.as_os_str().is_empty()) {
                tokio::fs::create_dir_all(parent).await?;
            }
            tokio::fs::write(&out, &image.bytes).await?;
            println!("Saved {} ({} bytes, {})", out.display(), image.bytes.len(), image.content_type);
            Ok(())
        }
    }
}
