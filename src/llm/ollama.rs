use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde_json::{json, Value};

use crate::core::config::BackendConfig;
use crate::core::errors::AppError;
use super::provider::ChatBackend;
use super::types::ChatRequest;

/// Chat backend talking to a local Ollama server over its REST API.
///
/// Transient failures (connection errors, HTTP 429 and 5xx) are retried with
/// exponential backoff: 1s, 2s, 4s, ... capped at 32s. Other 4xx responses and
/// timeouts fail immediately.
#[derive(Clone)]
pub struct OllamaBackend {
    base_url: String,
    client: Client,
    request_timeout: Duration,
    pull_timeout: Duration,
    max_retries: u32,
}

impl OllamaBackend {
    pub fn new(config: &BackendConfig) -> Result<Self, AppError> {
        let client = Client::builder().build().map_err(AppError::internal)?;
        Ok(Self {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            client,
            request_timeout: config.request_timeout(),
            pull_timeout: config.pull_timeout(),
            max_retries: config.max_retries,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn post_json(
        &self,
        path: &str,
        body: &Value,
        timeout: Duration,
    ) -> Result<Value, AppError> {
        let url = format!("{}{}", self.base_url, path);
        let mut last_err = None;

        for attempt in 0..=self.max_retries {
            if attempt > 0 {
                let delay = BackendConfig::retry_delay(attempt);
                tracing::debug!("Retrying {} in {:?} (attempt {})", url, delay, attempt + 1);
                tokio::time::sleep(delay).await;
            }

            let resp = self
                .client
                .post(&url)
                .timeout(timeout)
                .json(body)
                .send()
                .await;

            match resp {
                Ok(response) => {
                    let status = response.status();

                    if status.is_success() {
                        return response.json::<Value>().await.map_err(|e| {
                            AppError::Backend(format!("Malformed response from {}: {}", path, e))
                        });
                    }

                    let body_text = response.text().await.unwrap_or_default();
                    let message = error_message(status, &body_text);

                    if status == StatusCode::TOO_MANY_REQUESTS || status.is_server_error() {
                        tracing::warn!("Ollama {} returned {}: {}", path, status, message);
                        last_err = Some(AppError::Backend(message));
                        continue;
                    }

                    return Err(AppError::Backend(message));
                }
                Err(e) if e.is_timeout() => {
                    return Err(AppError::Backend(format!(
                        "Ollama request to {} timed out after {}s",
                        path,
                        timeout.as_secs()
                    )));
                }
                Err(e) => {
                    tracing::warn!("Ollama connection error on {}: {}", path, e);
                    last_err = Some(AppError::Backend(format!(
                        "Ollama connection error (is Ollama running at {}?): {}",
                        self.base_url, e
                    )));
                }
            }
        }

        Err(last_err.unwrap_or_else(|| AppError::backend("Ollama request failed after retries")))
    }
}

#[async_trait]
impl ChatBackend for OllamaBackend {
    fn name(&self) -> &str {
        "ollama"
    }

    async fn pull(&self, model_id: &str) -> Result<(), AppError> {
        let body = json!({
            "model": model_id,
            "stream": false,
        });
        let payload = self.post_json("/api/pull", &body, self.pull_timeout).await?;
        check_pull_response(&payload)
    }

    async fn chat(&self, request: ChatRequest, model_id: &str) -> Result<String, AppError> {
        let mut body = json!({
            "model": model_id,
            "messages": request.messages,
            "stream": false,
        });

        if let (Some(obj), Some(t)) = (body.as_object_mut(), request.temperature) {
            obj.insert("options".to_string(), json!({ "temperature": t }));
        }

        let payload = self.post_json("/api/chat", &body, self.request_timeout).await?;
        parse_chat_response(&payload)
    }
}

/// Ollama reports failures as `{"error": "..."}`; surface that text as is.
fn error_message(status: StatusCode, body: &str) -> String {
    if let Ok(value) = serde_json::from_str::<Value>(body) {
        if let Some(message) = value.get("error").and_then(|v| v.as_str()) {
            return message.to_string();
        }
    }
    let body = body.trim();
    if body.is_empty() {
        format!("Ollama API error {}", status)
    } else {
        format!("Ollama API error {}: {}", status, body)
    }
}

fn check_pull_response(payload: &Value) -> Result<(), AppError> {
    if let Some(message) = payload.get("error").and_then(|v| v.as_str()) {
        return Err(AppError::backend(message));
    }
    match payload.get("status").and_then(|v| v.as_str()) {
        Some("success") | None => Ok(()),
        Some(other) => Err(AppError::Backend(format!(
            "Model pull did not complete: {}",
            other
        ))),
    }
}

fn parse_chat_response(payload: &Value) -> Result<String, AppError> {
    if let Some(message) = payload.get("error").and_then(|v| v.as_str()) {
        return Err(AppError::backend(message));
    }
    payload
        .get("message")
        .and_then(|m| m.get("content"))
        .and_then(|c| c.as_str())
        .map(|s| s.to_string())
        .ok_or_else(|| AppError::backend("Malformed chat response: missing message.content"))
}
