use async_trait::async_trait;

use crate::core::errors::AppError;
use super::types::ChatRequest;

/// The inference capability the assistant is grounded against.
#[async_trait]
pub trait ChatBackend: Send + Sync {
    /// return the backend name (e.g. "ollama")
    fn name(&self) -> &str;

    /// make `model_id` available locally; pulling a model that is already
    /// present succeeds without doing anything
    async fn pull(&self, model_id: &str) -> Result<(), AppError>;

    /// chat completion (non-streaming), returns the reply text
    async fn chat(&self, request: ChatRequest, model_id: &str) -> Result<String, AppError>;
}
