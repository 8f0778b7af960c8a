use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;
use tracing::{debug, warn};

use super::extract::extract_text;
use super::{CompletionError, CompletionService};

const DEFAULT_BASE_URL: &str = "https://api.openai.com";
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

/// Client for an OpenAI-style `/v1/responses` endpoint.
pub struct ResponsesClient {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
    timeout: Duration,
    instructions: Option<String>,
}

impl ResponsesClient {
    pub fn new(api_key: String, base_url: Option<String>) -> Self {
        let base_url = base_url.unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
        Self {
            client: reqwest::Client::new(),
            api_key,
            base_url: base_url.trim_end_matches('/').to_string(),
            timeout: DEFAULT_TIMEOUT,
            instructions: None,
        }
    }

    /// Deadline for a whole call, connect to last body byte.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// System instructions sent with every request.
    pub fn with_instructions(mut self, instructions: Option<String>) -> Self {
        self.instructions = instructions.filter(|s| !s.trim().is_empty());
        self
    }

    fn request_body(&self, prompt: &str, model: &str) -> Value {
        let mut body = serde_json::json!({
            "model": model,
            "input": prompt,
        });
        if let Some(instructions) = &self.instructions {
            body["instructions"] = Value::String(instructions.clone());
        }
        body
    }

    async fn send(&self, prompt: &str, model: &str) -> Result<String, CompletionError> {
        let url = format!("{}/v1/responses", self.base_url);
        debug!(model, prompt_len = prompt.len(), "sending completion request");

        let resp = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .header("content-type", "application/json")
            .json(&self.request_body(prompt, model))
            .send()
            .await?;

        let status = resp.status().as_u16();
        if status == 401 || status == 403 {
            let message = resp.text().await.unwrap_or_default();
            warn!(status, "completion service rejected credentials");
            return Err(CompletionError::Auth { status, message });
        }
        if !resp.status().is_success() {
            let message = resp.text().await.unwrap_or_default();
            warn!(status, body = %message, "completion service error");
            return Err(CompletionError::Api { status, message });
        }

        let body = resp.text().await?;
        match serde_json::from_str::<Value>(&body) {
            Ok(value) => Ok(extract_text(&value)),
            Err(_) => {
                debug!(len = body.len(), "non-JSON completion body, passing through");
                Ok(body)
            }
        }
    }
}

#[async_trait]
impl CompletionService for ResponsesClient {
    fn name(&self) -> &str {
        "responses"
    }

    async fn complete(&self, prompt: &str, model: &str) -> Result<String, CompletionError> {
        match tokio::time::timeout(self.timeout, self.send(prompt, model)).await {
            Ok(result) => result,
            Err(_) => {
                warn!(model, timeout_ms = self.timeout.as_millis() as u64, "completion timed out");
                Err(CompletionError::Timeout {
                    after: self.timeout,
                })
            }
        }
    }
}
