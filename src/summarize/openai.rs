//! OpenAI-compatible chat-completions client.

use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::prompt::{build_prompt, SYSTEM_PROMPT};
use super::throttle::RateLimiter;
use super::{Summarizer, Summary, SummaryError};
use crate::config::SummarizerConfig;
use crate::model::record::SummaryRequest;

/// Blocking client for `POST {api_base}/chat/completions`.
pub struct OpenAiSummarizer {
    client: reqwest::blocking::Client,
    api_base: String,
    api_key: SecretString,
    model: String,
    temperature: f32,
    max_tokens: u32,
    timeout_secs: u64,
    body_char_limit: usize,
    limiter: RateLimiter,
}

impl OpenAiSummarizer {
    /// Build a client, reading the key from `config.api_key_env`.
    ///
    /// A missing or empty key is an error: nothing can be summarized
    /// without it.
    pub fn from_config(config: &SummarizerConfig) -> Result<Self, SummaryError> {
        let key = std::env::var(&config.api_key_env)
            .ok()
            .filter(|k| !k.trim().is_empty())
            .ok_or_else(|| SummaryError::MissingApiKey(config.api_key_env.clone()))?;
        Self::with_api_key(config, SecretString::from(key))
    }

    pub fn with_api_key(config: &SummarizerConfig, api_key: SecretString) -> Result<Self, SummaryError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(config.timeout())
            .build()
            .map_err(|e| SummaryError::Http(e.to_string()))?;

        info!(api_base = %config.api_base, model = %config.model, "Summarizer ready");

        Ok(Self {
            client,
            api_base: config.api_base.trim_end_matches('/').to_string(),
            api_key,
            model: config.model.clone(),
            temperature: config.temperature,
            max_tokens: config.max_tokens,
            timeout_secs: config.timeout_secs,
            body_char_limit: config.body_char_limit,
            limiter: RateLimiter::new(config.min_call_interval()),
        })
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// Model ids offered by the backend (`GET {api_base}/models`).
    pub fn list_models(&self) -> Result<Vec<String>, SummaryError> {
        let url = format!("{}/models", self.api_base);
        let response = self
            .client
            .get(&url)
            .bearer_auth(self.api_key.expose_secret())
            .send()
            .map_err(|e| self.transport_error(e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(SummaryError::Backend {
                status: status.as_u16(),
                body: response.text().unwrap_or_default(),
            });
        }

        let parsed: ModelList = response
            .json()
            .map_err(|e| SummaryError::ResponseParsing(e.to_string()))?;
        Ok(parsed.data.into_iter().map(|m| m.id).collect())
    }

    fn complete(&self, prompt: &str) -> Result<String, SummaryError> {
        let url = format!("{}/chat/completions", self.api_base);
        let body = ChatRequest {
            model: &self.model,
            messages: [
                ChatMessage {
                    role: "system",
                    content: SYSTEM_PROMPT,
                },
                ChatMessage {
                    role: "user",
                    content: prompt,
                },
            ],
            temperature: self.temperature,
            max_tokens: self.max_tokens,
        };

        let response = self
            .client
            .post(&url)
            .bearer_auth(self.api_key.expose_secret())
            .json(&body)
            .send()
            .map_err(|e| self.transport_error(e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(SummaryError::Backend {
                status: status.as_u16(),
                body: response.text().unwrap_or_default(),
            });
        }

        let text = response
            .text()
            .map_err(|e| SummaryError::ResponseParsing(e.to_string()))?;
        parse_completion(&text)
    }

    fn transport_error(&self, e: reqwest::Error) -> SummaryError {
        if e.is_timeout() {
            SummaryError::Timeout(self.timeout_secs)
        } else {
            SummaryError::Http(e.to_string())
        }
    }
}

impl Summarizer for OpenAiSummarizer {
    fn summarize(&self, request: &SummaryRequest<'_>) -> Result<Summary, SummaryError> {
        let prompt = build_prompt(request, self.body_char_limit);
        debug!(prompt_chars = prompt.len(), "Requesting summary");

        let text = self.limiter.run(|| self.complete(&prompt))?;
        Ok(Summary {
            text,
            model: self.model.clone(),
        })
    }
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 2],
    temperature: f32,
    max_tokens: u32,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Deserialize)]
struct ResponseMessage {
    content: Option<String>,
}

#[derive(Deserialize)]
struct ModelList {
    data: Vec<ModelEntry>,
}

#[derive(Deserialize)]
struct ModelEntry {
    id: String,
}

/// Content of the first choice in a chat-completions response.
fn parse_completion(body: &str) -> Result<String, SummaryError> {
    let parsed: ChatResponse =
        serde_json::from_str(body).map_err(|e| SummaryError::ResponseParsing(e.to_string()))?;
    parsed
        .choices
        .into_iter()
        .next()
        .and_then(|c| c.message.content)
        .filter(|c| !c.trim().is_empty())
        .ok_or(SummaryError::EmptyResponse)
}
