/// LLM Client — the single point of entry for all model calls in the planner.
///
/// ARCHITECTURAL RULE: No other module may call the Groq API directly.
/// The planner core only sees the `CompletionModel` trait.
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

use crate::errors::StartupError;

const MAX_RETRIES: u32 = 3;
const REQUEST_TIMEOUT: Duration = Duration::from_secs(120);

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Rate limited after {retries} retries")]
    RateLimited { retries: u32 },

    #[error("LLM returned empty content")]
    EmptyContent,
}

/// A text-completion backend: one rendered prompt in, one completion out.
///
/// Carried in `AppState` as `Arc<dyn CompletionModel>`.
#[async_trait]
pub trait CompletionModel: Send + Sync {
    async fn complete(&self, model: &str, prompt: &str) -> Result<String, LlmError>;
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
pub struct ChatResponse {
    pub choices: Vec<Choice>,
    pub usage: Option<Usage>,
}

#[derive(Debug, Deserialize)]
pub struct Choice {
    pub message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
pub struct ResponseMessage {
    pub content: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct Usage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
}

impl ChatResponse {
    /// Extracts the non-blank text of the first choice.
    pub fn text(&self) -> Option<&str> {
        self.choices
            .first()
            .and_then(|c| c.message.content.as_deref())
            .filter(|t| !t.trim().is_empty())
    }
}

#[derive(Debug, Deserialize)]
struct ApiErrorEnvelope {
    error: ApiErrorBody,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    message: String,
}

/// Groq chat-completions client (OpenAI-compatible wire format).
/// Retries 429 and 5xx responses with exponential backoff.
#[derive(Clone)]
pub struct GroqClient {
    client: Client,
    api_key: String,
    base_url: String,
}

impl GroqClient {
    pub fn new(api_key: String, base_url: String) -> Result<Self, StartupError> {
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| StartupError::ModelInit(e.to_string()))?;

        Ok(Self {
            client,
            api_key,
            base_url,
        })
    }

    fn endpoint(&self) -> String {
        format!("{}/chat/completions", self.base_url)
    }

    /// Makes a raw call to the chat-completions API, returning the full response object.
    /// Transient failures are retried up to `MAX_RETRIES` attempts in total.
    pub async fn call(&self, model: &str, prompt: &str) -> Result<ChatResponse, LlmError> {
        let request_body = ChatRequest {
            model,
            messages: vec![ChatMessage {
                role: "user",
                content: prompt,
            }],
        };

        let mut attempt = 0;
        loop {
            let failure = match self.send_once(&request_body).await {
                Ok(response) => {
                    if let Some(usage) = &response.usage {
                        debug!(
                            "Groq call succeeded: model={}, prompt_tokens={}, completion_tokens={}",
                            model, usage.prompt_tokens, usage.completion_tokens
                        );
                    }
                    return Ok(response);
                }
                Err(AttemptFailure::Fatal(e)) => return Err(e),
                Err(AttemptFailure::Transient(e)) => e,
            };

            attempt += 1;
            if attempt >= MAX_RETRIES {
                return Err(retries_exhausted(failure));
            }

            let delay = backoff_delay(attempt);
            warn!(
                "Groq call for model {} failed on attempt {}: {}. Retrying in {}ms",
                model,
                attempt,
                failure,
                delay.as_millis()
            );
            tokio::time::sleep(delay).await;
        }
    }

    async fn send_once(&self, body: &ChatRequest<'_>) -> Result<ChatResponse, AttemptFailure> {
        let response = self
            .client
            .post(self.endpoint())
            .bearer_auth(&self.api_key)
            .json(body)
            .send()
            .await
            .map_err(|e| AttemptFailure::Transient(LlmError::Http(e)))?;

        let status = response.status();
        if status.is_success() {
            let text = response
                .text()
                .await
                .map_err(|e| AttemptFailure::Fatal(e.into()))?;
            return serde_json::from_str(&text).map_err(|e| AttemptFailure::Fatal(e.into()));
        }

        let error = LlmError::Api {
            status: status.as_u16(),
            message: api_error_message(response.text().await.unwrap_or_default()),
        };
        if is_transient(status) {
            Err(AttemptFailure::Transient(error))
        } else {
            Err(AttemptFailure::Fatal(error))
        }
    }
}

#[async_trait]
impl CompletionModel for GroqClient {
    async fn complete(&self, model: &str, prompt: &str) -> Result<String, LlmError> {
        let response = self.call(model, prompt).await?;
        response
            .text()
            .map(str::to_string)
            .ok_or(LlmError::EmptyContent)
    }
}

/// Why a single request produced no response.
#[derive(Debug)]
enum AttemptFailure {
    /// Worth another attempt: transport errors, 429 and 5xx.
    Transient(LlmError),
    Fatal(LlmError),
}

fn is_transient(status: StatusCode) -> bool {
    status == StatusCode::TOO_MANY_REQUESTS || status.is_server_error()
}

/// Final error once every attempt failed. Persistent 429s surface as `RateLimited`.
fn retries_exhausted(last: LlmError) -> LlmError {
    match last {
        LlmError::Api { status: 429, .. } => LlmError::RateLimited {
            retries: MAX_RETRIES,
        },
        other => other,
    }
}

/// 1s, 2s, 4s ...
fn backoff_delay(attempt: u32) -> Duration {
    Duration::from_millis(1000 * (1 << (attempt - 1)))
}

/// Pulls `error.message` out of an OpenAI-style error body, falling back to the raw body.
fn api_error_message(body: String) -> String {
    serde_json::from_str::<ApiErrorEnvelope>(&body)
        .map(|e| e.error.message)
        .unwrap_or(body)
}
