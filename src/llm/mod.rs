//! AI-assisted diagram generation.
//!
//! Wraps the OpenAI chat-completion API and orchestrates the two delegated
//! generation paths (whole-repository and focused). Model output is never
//! trusted to be well-formed PlantUML: every response goes through the
//! normalizer before leaving this module. Generation failures degrade to a
//! renderable error diagram instead of propagating.

mod prompts;

use anyhow::{anyhow, Context};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::uml::normalizer::normalize;
use crate::uml::{ranker, DiagramType, SourceFile};

/// Sampling temperature for diagram generation: low, we want syntax.
const TEMPERATURE: f64 = 0.2;
const MAX_TOKENS: u32 = 4000;

// Context budgets: the first attempt, and the fallback after the model
// reports its context window was exceeded.
const PLAIN_BUDGET: (usize, usize) = (10, 800); // (max files, chars per file)
const PLAIN_REDUCED_BUDGET: (usize, usize) = (5, 400);
const FOCUSED_BUDGET: (usize, usize, usize) = (10, 1500, 500); // (max files, high, low)
const FOCUSED_REDUCED_BUDGET: (usize, usize, usize) = (5, 800, 300);

/// Errors from a completion request, split so callers can retry on context
/// overflow specifically.
#[derive(Debug, Error)]
pub enum CompletionError {
    #[error("model context length exceeded")]
    ContextLengthExceeded,
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f64,
    max_tokens: u32,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatResponseMessage,
}

#[derive(Deserialize)]
struct ChatResponseMessage {
    content: String,
}

/// Client for the OpenAI chat-completion API.
pub struct OpenAiClient {
    client: Client,
    base_url: String,
    api_key: String,
    model: String,
}

impl OpenAiClient {
    pub fn new(base_url: &str, api_key: &str, model: &str) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
            model: model.to_string(),
        }
    }

    /// Whether an API key was configured at all.
    pub fn is_configured(&self) -> bool {
        !self.api_key.is_empty()
    }

    /// Run one chat completion and return the assistant text, trimmed.
    pub async fn complete(&self, system: &str, user: &str) -> Result<String, CompletionError> {
        let url = format!("{}/chat/completions", self.base_url);

        let request = ChatRequest {
            model: &self.model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: system,
                },
                ChatMessage {
                    role: "user",
                    content: user,
                },
            ],
            temperature: TEMPERATURE,
            max_tokens: MAX_TOKENS,
        };

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .context("Failed to send request to OpenAI")?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            if body.contains("context_length_exceeded") || body.contains("maximum context length")
            {
                return Err(CompletionError::ContextLengthExceeded);
            }
            return Err(anyhow!("OpenAI API error: {} - {}", status, body).into());
        }

        let result: ChatResponse = response
            .json()
            .await
            .context("Failed to parse OpenAI response")?;

        let content = result
            .choices
            .into_iter()
            .next()
            .map(|choice| choice.message.content)
            .ok_or_else(|| anyhow!("OpenAI response contained no choices"))?;

        Ok(content.trim().to_string())
    }
}

/// Generate a diagram over the whole file set. On context overflow the
/// request is retried once with reduced budgets; any remaining failure
/// yields an error diagram.
pub async fn generate_diagram(
    client: &OpenAiClient,
    files: &[SourceFile],
    diagram_type: DiagramType,
) -> String {
    let (max_files, content_length) = PLAIN_BUDGET;
    match try_generate(client, files, diagram_type, max_files, content_length).await {
        Ok(diagram) => diagram,
        Err(CompletionError::ContextLengthExceeded) => {
            tracing::info!("Context length exceeded, retrying with reduced context");
            let (max_files, content_length) = PLAIN_REDUCED_BUDGET;
            try_generate(client, files, diagram_type, max_files, content_length)
                .await
                .unwrap_or_else(|e| error_diagram(&e.to_string()))
        }
        Err(e) => {
            tracing::error!("AI diagram generation failed: {}", e);
            error_diagram(&e.to_string())
        }
    }
}

/// Generate a diagram focused on a phrase and/or an explicit class list.
/// Retry and failure semantics match [`generate_diagram`].
pub async fn generate_focused_diagram(
    client: &OpenAiClient,
    files: &[SourceFile],
    diagram_type: DiagramType,
    focus_phrase: &str,
    custom_prompt: &str,
    included_classes: &[String],
) -> String {
    let (max_files, high, low) = FOCUSED_BUDGET;
    let first = try_generate_focused(
        client,
        files,
        diagram_type,
        focus_phrase,
        custom_prompt,
        included_classes,
        max_files,
        high,
        low,
    )
    .await;

    match first {
        Ok(diagram) => diagram,
        Err(CompletionError::ContextLengthExceeded) => {
            tracing::info!("Context length exceeded, retrying with reduced context");
            let (max_files, high, low) = FOCUSED_REDUCED_BUDGET;
            try_generate_focused(
                client,
                files,
                diagram_type,
                focus_phrase,
                custom_prompt,
                included_classes,
                max_files,
                high,
                low,
            )
            .await
            .unwrap_or_else(|e| error_diagram(&e.to_string()))
        }
        Err(e) => {
            tracing::error!("Focused AI diagram generation failed: {}", e);
            error_diagram(&e.to_string())
        }
    }
}

async fn try_generate(
    client: &OpenAiClient,
    files: &[SourceFile],
    diagram_type: DiagramType,
    max_files: usize,
    content_length: usize,
) -> Result<String, CompletionError> {
    let ranked = ranker::rank(files, "", &[]);
    let context = prompts::build_context(&ranked, max_files, content_length);

    let system = prompts::system_prompt(diagram_type);
    let user = prompts::user_prompt(&context, prompts::instructions(diagram_type), diagram_type);

    let raw = client.complete(&system, &user).await?;
    Ok(normalize(&raw))
}

#[allow(clippy::too_many_arguments)]
async fn try_generate_focused(
    client: &OpenAiClient,
    files: &[SourceFile],
    diagram_type: DiagramType,
    focus_phrase: &str,
    custom_prompt: &str,
    included_classes: &[String],
    max_files: usize,
    high_length: usize,
    low_length: usize,
) -> Result<String, CompletionError> {
    let ranked = ranker::rank(files, focus_phrase, included_classes);
    let context = prompts::build_focused_context(
        &ranked,
        focus_phrase,
        included_classes,
        max_files,
        high_length,
        low_length,
    );

    let mut instructions = prompts::instructions(diagram_type).to_string();
    if !custom_prompt.is_empty() {
        instructions.push_str(&format!(" Additional instructions: {custom_prompt}"));
    }

    let system = prompts::system_prompt(diagram_type);
    let user = prompts::user_prompt(&context, &instructions, diagram_type);

    let raw = client.complete(&system, &user).await?;
    Ok(normalize(&raw))
}

/// A renderable PlantUML document reporting a generation failure.
fn error_diagram(message: &str) -> String {
    normalize(&format!(
        "title UML Generation Error\nnote \"Error: {message}\" as N1"
    ))
}
