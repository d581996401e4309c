//! Answers for application form questions
//!
//! [`OpenAiResponder`] is the only place that talks to the chat completion
//! API. The driver only sees [`ResponseGenerator`], which never fails: an
//! unavailable answer is an empty string and the field stays blank.

use async_trait::async_trait;
use quickapply_core::config::LlmOptions;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, warn};

const SYSTEM_PROMPT: &str = "You are a helpful assistant creating job application responses.";
const MAX_BACKOFF: Duration = Duration::from_secs(30);

#[async_trait]
pub trait ResponseGenerator: Send + Sync {
    /// Answer `question`; an empty string when no answer is available
    async fn generate(&self, question: &str, context: &str) -> String;
}

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
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ApiError {
    error: ApiErrorBody,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    message: String,
}

/// Chat-completion backed answers grounded in the applicant's resume
#[derive(Clone)]
pub struct OpenAiResponder {
    client: Client,
    api_key: String,
    resume: String,
    options: LlmOptions,
}

impl OpenAiResponder {
    pub fn new(api_key: String, resume: String, options: LlmOptions) -> Result<Self, LlmError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(options.timeout_secs))
            .build()?;
        Ok(Self {
            client,
            api_key,
            resume,
            options,
        })
    }

    fn endpoint(&self) -> String {
        format!("{}/chat/completions", self.options.base_url.trim_end_matches('/'))
    }

    fn prompt(&self, question: &str, context: &str) -> String {
        format!(
            "Based on my resume: {}\n\n\
             And this additional context: {}\n\n\
             Please provide a professional response to this question: {}\n\n\
             Keep the response concise, professional, and relevant to my experience.",
            self.resume, context, question
        )
    }

    /// Ask the model; retries on 429 and 5xx with exponential backoff
    pub async fn complete(&self, question: &str, context: &str) -> Result<String, LlmError> {
        let prompt = self.prompt(question, context);
        let request_body = ChatRequest {
            model: &self.options.model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: SYSTEM_PROMPT,
                },
                ChatMessage {
                    role: "user",
                    content: &prompt,
                },
            ],
        };

        let retries = self.options.max_retries.max(1);
        let mut last_error: Option<LlmError> = None;

        for attempt in 0..retries {
            if attempt > 0 {
                let delay = backoff(attempt);
                warn!(
                    "LLM call attempt {} failed, retrying after {}ms...",
                    attempt,
                    delay.as_millis()
                );
                tokio::time::sleep(delay).await;
            }

            let response = self
                .client
                .post(self.endpoint())
                .bearer_auth(&self.api_key)
                .json(&request_body)
                .send()
                .await;

            let response = match response {
                Ok(r) => r,
                Err(e) => {
                    last_error = Some(LlmError::Http(e));
                    continue;
                }
            };

            let status = response.status();

            if status.as_u16() == 429 || status.is_server_error() {
                let body = response.text().await.unwrap_or_default();
                warn!("LLM API returned {}: {}", status, body);
                last_error = Some(LlmError::Api {
                    status: status.as_u16(),
                    message: body,
                });
                continue;
            }

            if !status.is_success() {
                let body = response.text().await.unwrap_or_default();
                let message = serde_json::from_str::<ApiError>(&body)
                    .map(|e| e.error.message)
                    .unwrap_or(body);
                return Err(LlmError::Api {
                    status: status.as_u16(),
                    message,
                });
            }

            let body = response.text().await?;
            return extract_answer(&body);
        }

        Err(last_error.unwrap_or(LlmError::RateLimited { retries }))
    }
}

fn extract_answer(body: &str) -> Result<String, LlmError> {
    let parsed: ChatResponse = serde_json::from_str(body)?;
    let answer = parsed
        .choices
        .into_iter()
        .next()
        .and_then(|c| c.message.content)
        .map(|c| c.trim().to_string())
        .unwrap_or_default();
    if answer.is_empty() {
        return Err(LlmError::EmptyContent);
    }
    debug!("LLM answer of {} chars", answer.len());
    Ok(answer)
}

/// Delay before retry `attempt`: 1s, 2s, 4s, capped at 30s
fn backoff(attempt: u32) -> Duration {
    let factor = 1u64.checked_shl(attempt.saturating_sub(1)).unwrap_or(u64::MAX);
    Duration::from_millis(1000u64.saturating_mul(factor)).min(MAX_BACKOFF)
}

#[async_trait]
impl ResponseGenerator for OpenAiResponder {
    async fn generate(&self, question: &str, context: &str) -> String {
        match self.complete(question, context).await {
            Ok(answer) => answer,
            Err(e) => {
                tracing::error!("Error generating response: {}", e);
                String::new()
            }
        }
    }
}
