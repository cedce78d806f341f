//! Prompt rewriting through an external text-generation model.
//!
//! Two entry points share one instruction builder but differ in error policy:
//! - `enhance` never fails; upstream errors or empty output fall back to a
//!   deterministic `"{prompt}, {style} style"` string. Used on task submission.
//! - `try_enhance` surfaces upstream failures as `AppError::Enhancement`. Used
//!   by the interactive `/enhance_prompt/` endpoint.
use std::sync::Arc;

use async_trait::async_trait;

use crate::error::{AppError, AppResult};

/// Single prompt-in, text-out call to a language model.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    async fn generate(&self, instruction: &str) -> AppResult<String>;
}

/// Outcome of an enhancement attempt. Both variants carry non-empty text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Enhanced {
    Rewritten(String),
    Fallback(String),
}

impl Enhanced {
    pub fn text(&self) -> &str {
        match self {
            Enhanced::Rewritten(s) | Enhanced::Fallback(s) => s,
        }
    }

    pub fn into_text(self) -> String {
        match self {
            Enhanced::Rewritten(s) | Enhanced::Fallback(s) => s,
        }
    }

    pub fn is_fallback(&self) -> bool {
        matches!(self, Enhanced::Fallback(_))
    }
}

#[derive(Clone)]
pub struct PromptEnhancer {
    generator: Arc<dyn TextGenerator>,
}

impl PromptEnhancer {
    pub fn new(generator: Arc<dyn TextGenerator>) -> Self {
        PromptEnhancer { generator }
    }

    /// Rewrite `prompt`, falling back to plain concatenation on any failure.
    pub async fn enhance(&self, prompt: &str, style: Option<&str>, max_words: u32) -> Enhanced {
        let instruction = build_instruction(prompt, style, max_words);
        match self.generator.generate(&instruction).await {
            Ok(raw) => match clean_response(&raw) {
                Some(text) => Enhanced::Rewritten(text),
                None => {
                    tracing::warn!("Text model returned an empty rewrite; using fallback prompt");
                    Enhanced::Fallback(fallback_prompt(prompt, style))
                }
            },
            Err(e) => {
                tracing::warn!(error = %e, "Prompt enhancement failed; using fallback prompt");
                Enhanced::Fallback(fallback_prompt(prompt, style))
            }
        }
    }

    /// Rewrite `prompt`, propagating a failed model call to the caller.
    ///
    /// An empty rewrite is not a failure of the call, so it still yields the
    /// fallback text.
    pub async fn try_enhance(&self, prompt: &str, style: Option<&str>, max_words: u32) -> AppResult<Enhanced> {
        let instruction = build_instruction(prompt, style, max_words);
        let raw = self.generator.generate(&instruction).await.map_err(|e| {
            tracing::error!(error = %e, "Prompt enhancement failed");
            match e {
                AppError::Enhancement(msg) => AppError::Enhancement(msg),
                other => AppError::Enhancement(other.to_string()),
            }
        })?;
        Ok(match clean_response(&raw) {
            Some(text) => Enhanced::Rewritten(text),
            None => Enhanced::Fallback(fallback_prompt(prompt, style)),
        })
    }
}

/// Empty or whitespace-only styles count as unset.
fn effective_style(style: Option<&str>) -> Option<&str> {
    style.map(str::trim).filter(|s| !s.is_empty())
}

pub fn build_instruction(prompt: &str, style: Option<&str>, max_words: u32) -> String {
    let mut instruction = format!(
        "Rewrite the following image generation prompt so it is vivid, concrete and visually detailed. \
         Keep it under {} words.",
        max_words
    );
    if let Some(style) = effective_style(style) {
        instruction.push_str(&format!(" Make the result evoke the {} style.", style));
    }
    instruction.push_str(" Reply with the rewritten prompt only.\n\nPrompt: ");
    instruction.push_str(prompt);
    instruction
}

pub fn fallback_prompt(prompt: &str, style: Option<&str>) -> String {
    match effective_style(style) {
        Some(style) => format!("{}, {} style", prompt, style),
        None => prompt.to_string(),
    }
}

/// Strip surrounding whitespace and quote characters; `None` if nothing is left.
fn clean_response(raw: &str) -> Option<String> {
    let cleaned = raw.trim_matches(|c: char| c.is_whitespace() || c == '"' || c == '\'');
    if cleaned.is_empty() {
        None
    } else {
        Some(cleaned.to_string())
    }
}
