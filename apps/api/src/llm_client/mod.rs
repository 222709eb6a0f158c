/// LLM client, the single point of entry for all inference calls.
/// No other module talks to the inference endpoint directly.
use reqwest::Client;
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;
use tracing::debug;

use crate::errors::ErrorResult;

pub mod prompts;
pub mod sanitize;

/// Sampling temperature for every chat request. Kept low so parsing the
/// same resume twice yields the same structure.
const TEMPERATURE: f32 = 0.1;

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("Exception while querying model: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API request failed with status code {status}")]
    Api { status: u16, details: String },

    #[error("No message field in result")]
    Shape { raw: Value },
}

impl From<LlmError> for ErrorResult {
    fn from(err: LlmError) -> Self {
        match err {
            LlmError::Http(e) => {
                ErrorResult::new(format!("Exception while querying model: {e}"))
            }
            LlmError::Api { status, details } => {
                ErrorResult::new(format!("API request failed with status code {status}"))
                    .with_details(details)
            }
            LlmError::Shape { raw } => {
                ErrorResult::new("No message field in result").with_raw_result(raw)
            }
        }
    }
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    stream: bool,
    temperature: f32,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

/// The single LLM client used by the parse pipeline. Wraps an Ollama-style
/// `/api/chat` endpoint: one request per call, no retries, and no request
/// timeout, so the handler blocks for as long as inference takes.
#[derive(Clone)]
pub struct LlmClient {
    client: Client,
    endpoint: String,
    model: String,
}

impl LlmClient {
    pub fn new(endpoint: String, model: String) -> Self {
        Self {
            client: Client::new(),
            endpoint,
            model,
        }
    }

    /// Sends one two-message conversation (system persona + user prompt)
    /// and returns the reply text.
    ///
    /// Every failure mode maps to an `LlmError`: transport faults and
    /// undecodable bodies to `Http`, non-200 statuses to `Api` with the
    /// response body attached, and 200 replies without a `message.content`
    /// string to `Shape` carrying the decoded reply for diagnosis.
    pub async fn chat(&self, prompt: &str, system: &str) -> Result<String, LlmError> {
        let request_body = ChatRequest {
            model: &self.model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: system,
                },
                ChatMessage {
                    role: "user",
                    content: prompt,
                },
            ],
            stream: false,
            temperature: TEMPERATURE,
        };

        let response = self
            .client
            .post(&self.endpoint)
            .json(&request_body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let details = response.text().await.unwrap_or_default();
            return Err(LlmError::Api {
                status: status.as_u16(),
                details,
            });
        }

        let result: Value = response.json().await?;
        match result
            .get("message")
            .and_then(|m| m.get("content"))
            .and_then(|c| c.as_str())
        {
            Some(text) => {
                debug!("Model reply ({} bytes)", text.len());
                Ok(text.to_string())
            }
            None => Err(LlmError::Shape { raw: result }),
        }
    }
}
