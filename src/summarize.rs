//! Summarization stage.
//!
//! The word-count guard lives in the pipeline so that no backend is ever
//! called with a near-empty input.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::SummarizeError;

pub const DEFAULT_DELIMITER: &str = "Summary:";

#[async_trait]
pub trait Summarizer: Send + Sync {
    fn name(&self) -> &'static str;

    async fn summarize(&self, text: &str) -> Result<String, SummarizeError>;
}

/// Extracts the answer from a hosted-inference body.
///
/// Accepts a list (first element is used) or a bare object. `summary_text` is
/// returned as is; `generated_text` echoes the prompt, so only the part after
/// the last `delimiter` is kept.
pub fn parse_inference_response(body: &Value, delimiter: &str) -> Result<String, SummarizeError> {
    let first = match body {
        Value::Array(items) => items
            .first()
            .ok_or_else(|| SummarizeError::Decode("empty response list".to_string()))?,
        other => other,
    };

    if let Some(summary) = first.get("summary_text").and_then(Value::as_str) {
        return Ok(summary.trim().to_string());
    }
    if let Some(generated) = first.get("generated_text").and_then(Value::as_str) {
        let answer = match generated.rsplit_once(delimiter) {
            Some((_, after)) => after,
            None => generated,
        };
        return Ok(answer.trim().to_string());
    }

    Err(SummarizeError::Decode(format!(
        "no summary_text or generated_text in {body}"
    )))
}

#[derive(Serialize)]
struct InferenceRequest<'a> {
    inputs: &'a str,
}

/// Hosted summarization or text-generation model.
pub struct InferenceSummarizer {
    client: Client,
    url: String,
    api_token: String,
    /// When set, the text is wrapped in a prompt ending in this delimiter.
    prompt_delimiter: Option<String>,
}

impl InferenceSummarizer {
    pub fn new(client: Client, url: &str, api_token: &str) -> Self {
        Self {
            client,
            url: url.to_string(),
            api_token: api_token.to_string(),
            prompt_delimiter: None,
        }
    }

    pub fn with_prompt_delimiter(mut self, delimiter: &str) -> Self {
        self.prompt_delimiter = Some(delimiter.to_string());
        self
    }

    pub fn build_input(&self, text: &str) -> String {
        match &self.prompt_delimiter {
            Some(delimiter) => format!(
                "Summarize the following information:\n\n{text}\n\n{delimiter}"
            ),
            None => text.to_string(),
        }
    }
}

#[async_trait]
impl Summarizer for InferenceSummarizer {
    fn name(&self) -> &'static str {
        "inference"
    }

    async fn summarize(&self, text: &str) -> Result<String, SummarizeError> {
        let input = self.build_input(text);
        let response = self
            .client
            .post(&self.url)
            .bearer_auth(&self.api_token)
            .json(&InferenceRequest { inputs: &input })
            .send()
            .await
            .map_err(SummarizeError::Transport)?;

        let status = response.status();
        let body = response.text().await.map_err(SummarizeError::Transport)?;
        if !status.is_success() {
            log::warn!("summarizer returned {status}");
            return Err(SummarizeError::Status { status, body });
        }

        let value: Value =
            serde_json::from_str(&body).map_err(|e| SummarizeError::Decode(e.to_string()))?;
        let delimiter = self.prompt_delimiter.as_deref().unwrap_or(DEFAULT_DELIMITER);
        parse_inference_response(&value, delimiter)
    }
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage>,
}

#[derive(Serialize, Deserialize)]
struct ChatMessage {
    role: String,
    content: String,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

const CONTEXT_INSTRUCTION: &str =
    "Using only the information below, give a short answer about Indian defence.";

/// OpenAI-compatible chat completions endpoint.
///
/// Built with [`ChatSummarizer::new`] it summarizes search context. Built with
/// [`ChatSummarizer::direct`] it forwards the user's question untouched.
pub struct ChatSummarizer {
    client: Client,
    base_url: String,
    api_key: String,
    model: String,
    instruction: Option<&'static str>,
}

impl ChatSummarizer {
    pub fn new(client: Client, base_url: &str, api_key: &str, model: &str) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
            model: model.to_string(),
            instruction: Some(CONTEXT_INSTRUCTION),
        }
    }

    pub fn direct(client: Client, base_url: &str, api_key: &str, model: &str) -> Self {
        Self {
            instruction: None,
            ..Self::new(client, base_url, api_key, model)
        }
    }

    pub fn build_prompt(&self, text: &str) -> String {
        match self.instruction {
            Some(instruction) => format!("{instruction}\n\n{text}"),
            None => text.to_string(),
        }
    }
}

#[async_trait]
impl Summarizer for ChatSummarizer {
    fn name(&self) -> &'static str {
        match self.instruction {
            Some(_) => "chat",
            None => "chat_direct",
        }
    }

    async fn summarize(&self, text: &str) -> Result<String, SummarizeError> {
        let url = format!("{}/v1/chat/completions", self.base_url);
        let req = ChatRequest {
            model: &self.model,
            messages: vec![ChatMessage {
                role: "user".to_string(),
                content: self.build_prompt(text),
            }],
        };

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&req)
            .send()
            .await
            .map_err(SummarizeError::Transport)?;

        let status = response.status();
        let body = response.text().await.map_err(SummarizeError::Transport)?;
        if !status.is_success() {
            log::warn!("chat completion returned {status}");
            return Err(SummarizeError::Status { status, body });
        }

        let parsed: ChatResponse =
            serde_json::from_str(&body).map_err(|e| SummarizeError::Decode(e.to_string()))?;
        parsed
            .choices
            .into_iter()
            .next()
            .map(|c| c.message.content.trim().to_string())
            .ok_or_else(|| SummarizeError::Decode("no choices in chat response".to_string()))
    }
}
