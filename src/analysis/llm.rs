//! Text completion through an OpenAI-compatible chat API.

use crate::config::{ENV_OPENAI_KEY, LlmConfig, RetryConfig};
use crate::error::{Error, Result};
use crate::retry::{is_retryable_status, with_retry};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// System prompt for comment analysis
pub const SYSTEM_PROMPT: &str = "You are an SEO expert analyzing YouTube comments.";

/// Produces a narrative completion for a prompt
#[async_trait]
pub trait TextCompletion: Send + Sync {
    /// Complete `prompt` under the given system instruction
    async fn complete(&self, system: &str, prompt: &str) -> Result<String>;
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 2],
    temperature: f32,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChatChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

/// Chat-completions client
#[derive(Clone, Debug)]
pub struct OpenAiClient {
    http: reqwest::Client,
    config: LlmConfig,
    api_key: String,
    retry: RetryConfig,
}

impl OpenAiClient {
    /// Create a client; fails with [`Error::Config`] when no API key is configured
    pub fn new(config: LlmConfig, retry: RetryConfig) -> Result<Self> {
        let api_key = config
            .api_key
            .clone()
            .filter(|k| !k.trim().is_empty())
            .ok_or_else(|| {
                Error::config(
                    ENV_OPENAI_KEY,
                    format!("required environment variable {ENV_OPENAI_KEY} is not set"),
                )
            })?;

        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()?;

        Ok(Self {
            http,
            config,
            api_key,
            retry,
        })
    }

    /// Model completions are requested from
    pub fn model(&self) -> &str {
        &self.config.model
    }

    async fn send_once(&self, url: &str, body: &ChatRequest<'_>, attempt: u32) -> Result<String> {
        let response = self
            .http
            .post(url)
            .bearer_auth(&self.api_key)
            .json(body)
            .send()
            .await
            .map_err(|e| transport_error(e, attempt))?;

        let status = response.status();
        if !status.is_success() {
            let code = status.as_u16();
            let message = response.text().await.unwrap_or_default();
            if is_retryable_status(code) {
                return Err(Error::TransientService {
                    status: Some(code),
                    message,
                    attempts: attempt,
                });
            }
            return Err(Error::Llm(format!("completion request failed with status {code}: {message}")));
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| transport_error(e, attempt))?;
        let parsed: ChatResponse = serde_json::from_slice(&bytes)
            .map_err(|e| Error::MalformedResponse(format!("unexpected completion response: {e}")))?;

        parsed
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .map(|content| content.trim().to_string())
            .ok_or_else(|| Error::Llm("completion response contained no choices".to_string()))
    }
}

#[async_trait]
impl TextCompletion for OpenAiClient {
    async fn complete(&self, system: &str, prompt: &str) -> Result<String> {
        let url = format!("{}/chat/completions", self.config.base_url.trim_end_matches('/'));
        let url = url.as_str();
        let body = ChatRequest {
            model: &self.config.model,
            messages: [
                ChatMessage {
                    role: "system",
                    content: system,
                },
                ChatMessage {
                    role: "user",
                    content: prompt,
                },
            ],
            temperature: self.config.temperature,
        };
        let body = &body;

        tracing::info!(model = %self.config.model, "Sending completion request");
        let mut attempt: u32 = 0;
        let completion = with_retry(&self.retry, "chat_completion", || {
            attempt += 1;
            self.send_once(url, body, attempt)
        })
        .await?;
        tracing::info!("Completion received");

        Ok(completion)
    }
}

fn transport_error(e: reqwest::Error, attempt: u32) -> Error {
    if e.is_timeout() || e.is_connect() {
        Error::TransientService {
            status: None,
            message: e.to_string(),
            attempts: attempt,
        }
    } else {
        Error::Network(e)
    }
}

/// Cut `text` to `max_chars` characters, appending `...` when anything was dropped
pub fn truncate_input(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((end, _)) => format!("{}...", &text[..end]),
        None => text.to_string(),
    }
}

/// User prompt asking for sentiment and SEO suggestions on `comments`
pub fn analysis_prompt(comments: &str) -> String {
    format!(
        "Analyze the sentiment and SEO relevance of the following YouTube comments and provide suggestions for SEO optimization: '{comments}'"
    )
}
