pub mod ollama;
pub mod provider;
pub mod types;

#[cfg(test)]
mod tests;

pub use ollama::OllamaBackend;
pub use provider::ChatBackend;
pub use types::{ChatMessage, ChatRequest, Role};
