pub mod prompt;
pub mod service;
pub mod types;

pub use prompt::PromptBuilder;
pub use service::{Assistant, AssistantOptions};
pub use types::{AssistantState, ModelReadiness, QueryResult, WarmUpReport};
