use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::defaults::*;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub model: ModelConfig,
    #[serde(default)]
    pub backend: BackendConfig,
    #[serde(default)]
    pub knowledge: KnowledgeConfig,
    #[serde(default)]
    pub assistant: AssistantConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelConfig {
    #[serde(default = "default_model")]
    pub name: String,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            name: default_model(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackendConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
    #[serde(default = "default_pull_timeout_secs")]
    pub pull_timeout_secs: u64,
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            request_timeout_secs: default_request_timeout_secs(),
            pull_timeout_secs: default_pull_timeout_secs(),
            max_retries: default_max_retries(),
        }
    }
}

impl BackendConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn pull_timeout(&self) -> Duration {
        Duration::from_secs(self.pull_timeout_secs)
    }

    /// Sleep before retry number `attempt` (1-based): 1s, 2s, 4s, ... capped at 32s.
    pub fn retry_delay(attempt: u32) -> Duration {
        Duration::from_secs(1u64 << attempt.saturating_sub(1).min(5))
    }

    /// Longest one backend call can take: every attempt at `per_attempt`
    /// plus the sleeps between them.
    pub fn call_budget(&self, per_attempt: Duration) -> Duration {
        let sleeps: Duration = (1..=self.max_retries).map(Self::retry_delay).sum();
        per_attempt * (self.max_retries + 1) + sleeps
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KnowledgeConfig {
    /// Relative paths resolve against the user data directory.
    #[serde(default = "default_knowledge_path")]
    pub path: PathBuf,
    /// Seed the sample location when the knowledge file does not exist yet.
    #[serde(default = "default_true")]
    pub seed_sample: bool,
}

impl Default for KnowledgeConfig {
    fn default() -> Self {
        Self {
            path: default_knowledge_path(),
            seed_sample: true,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssistantConfig {
    #[serde(default = "default_language")]
    pub language: String,
    /// Replaces the persona paragraph; the output contract is always kept.
    #[serde(default)]
    pub system_prompt: Option<String>,
    #[serde(default)]
    pub temperature: Option<f64>,
    #[serde(default)]
    pub warm_up_on_update: bool,
}

impl Default for AssistantConfig {
    fn default() -> Self {
        Self {
            language: default_language(),
            system_prompt: None,
            temperature: None,
            warm_up_on_update: false,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Filter directive used when `RUST_LOG` is not set.
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Also write a daily-rolling file under the log directory.
    #[serde(default = "default_true")]
    pub file: bool,
    #[serde(default = "default_log_file_name")]
    pub file_name: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            file: true,
            file_name: default_log_file_name(),
        }
    }
}
