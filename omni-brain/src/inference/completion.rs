//! Chat-completion client for the language-model runtime
//!
//! **[BRN-INF-010]** Speaks the OpenAI-compatible surface of the local
//! llama.cpp server: `POST {base}/v1/chat/completions`. Generation length
//! is always bounded by `max_tokens`, which acts as the soft timeout on
//! top of the HTTP timeout.

use super::InferenceError;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

const USER_AGENT: &str = "OmniOS/1.0 (brain)";

/// Per-call generation bounds.
#[derive(Debug, Clone)]
pub struct GenerationOptions {
    pub max_tokens: u32,
    pub temperature: f32,
    pub stop: Vec<String>,
}

/// Client for one completion runtime (one base URL, one model name).
pub struct CompletionClient {
    http: Client,
    base_url: String,
    model: String,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<Message<'a>>,
    max_tokens: u32,
    temperature: f32,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    stop: Vec<String>,
}

#[derive(Serialize)]
struct Message<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Deserialize)]
struct ChoiceMessage {
    content: String,
}

impl CompletionClient {
    pub fn new(base_url: &str, model: &str, timeout: Duration) -> Result<Self, InferenceError> {
        let http = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(timeout)
            .build()
            .map_err(|e| InferenceError::Build(e.to_string()))?;
        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            model: model.to_string(),
        })
    }

    /// The (base URL, model) pair this client is bound to. The lane
    /// binding table aliases locks by comparing these.
    pub fn binding(&self) -> (&str, &str) {
        (&self.base_url, &self.model)
    }

    /// One system+user exchange, trimmed completion text back.
    pub async fn chat(
        &self,
        system: &str,
        user: &str,
        options: &GenerationOptions,
    ) -> Result<String, InferenceError> {
        let request = ChatRequest {
            model: &self.model,
            messages: vec![
                Message {
                    role: "system",
                    content: system,
                },
                Message {
                    role: "user",
                    content: user,
                },
            ],
            max_tokens: options.max_tokens,
            temperature: options.temperature,
            stop: options.stop.clone(),
        };

        debug!(model = %self.model, max_tokens = options.max_tokens, "Chat completion request");

        let response = self
            .http
            .post(format!("{}/v1/chat/completions", self.base_url))
            .json(&request)
            .send()
            .await
            .map_err(|e| InferenceError::Request(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(InferenceError::Api {
                status: status.as_u16(),
                body,
            });
        }

        let completion: ChatResponse = response
            .json()
            .await
            .map_err(|e| InferenceError::Malformed(e.to_string()))?;

        completion
            .choices
            .first()
            .map(|c| c.message.content.trim().to_string())
            .ok_or_else(|| InferenceError::Malformed("empty choices".to_string()))
    }

    /// One-token generation that forces the runtime to page the weights
    /// in. Used by the registry as the load step; its failure is fatal to
    /// readiness.
    pub async fn warm_up(&self) -> Result<(), InferenceError> {
        let options = GenerationOptions {
            max_tokens: 1,
            temperature: 0.0,
            stop: Vec::new(),
        };
        self.chat("You are Omni, a smart OS assistant.", "ping", &options)
            .await
            .map(|_| ())
    }
}
