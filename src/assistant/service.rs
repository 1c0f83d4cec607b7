use std::sync::Arc;

use crate::core::config::defaults::DEFAULT_MODEL;
use crate::core::config::AppConfig;
use crate::core::errors::AppError;
use crate::knowledge::{KnowledgeBase, KnowledgeStore, KnowledgeUpdate};
use crate::llm::{ChatBackend, ChatRequest};

use super::prompt::PromptBuilder;
use super::types::{AssistantState, ModelReadiness, QueryResult, WarmUpReport};

const READY_MESSAGE: &str = "模型準備完成";
const QUERY_FAILED_PREFIX: &str = "查詢失敗";

#[derive(Debug, Clone)]
pub struct AssistantOptions {
    pub model: String,
    pub temperature: Option<f64>,
    pub warm_up_on_update: bool,
    pub prompt: PromptBuilder,
}

impl Default for AssistantOptions {
    fn default() -> Self {
        Self {
            model: DEFAULT_MODEL.to_string(),
            temperature: None,
            warm_up_on_update: false,
            prompt: PromptBuilder::default(),
        }
    }
}

impl AssistantOptions {
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            model: config.model.name.clone(),
            temperature: config.assistant.temperature,
            warm_up_on_update: config.assistant.warm_up_on_update,
            prompt: PromptBuilder::from_config(&config.assistant),
        }
    }
}

/// Answers donation questions grounded in the knowledge base it owns.
///
/// `ensure_model_ready` and `query` never fail: backend problems come back as
/// [`ModelReadiness::Unready`] and [`QueryResult::Error`].
pub struct Assistant {
    backend: Arc<dyn ChatBackend>,
    store: KnowledgeStore,
    knowledge: KnowledgeBase,
    options: AssistantOptions,
    state: AssistantState,
}

impl Assistant {
    /// Loads the knowledge base right away.
    pub fn new(
        backend: Arc<dyn ChatBackend>,
        store: KnowledgeStore,
        options: AssistantOptions,
    ) -> Self {
        let mut assistant = Self {
            backend,
            store,
            knowledge: KnowledgeBase::default(),
            options,
            state: AssistantState::Constructed,
        };
        assistant.knowledge = assistant.store.load();
        assistant.transition(AssistantState::KnowledgeLoaded);
        assistant
    }

    pub fn state(&self) -> AssistantState {
        self.state
    }

    pub fn knowledge(&self) -> &KnowledgeBase {
        &self.knowledge
    }

    pub fn model(&self) -> &str {
        &self.options.model
    }

    pub fn store(&self) -> &KnowledgeStore {
        &self.store
    }

    /// May block for a long time while the backend downloads the model.
    pub async fn ensure_model_ready(&mut self, model_name: &str) -> ModelReadiness {
        if model_name.trim().is_empty() {
            self.transition(AssistantState::ModelUnready);
            return ModelReadiness::Unready {
                message: "model name must not be empty".to_string(),
            };
        }

        tracing::info!("Pulling model {} via {}", model_name, self.backend.name());
        match self.backend.pull(model_name).await {
            Ok(()) => {
                self.transition(AssistantState::ModelReady);
                ModelReadiness::Ready {
                    message: READY_MESSAGE.to_string(),
                }
            }
            Err(err) => {
                tracing::warn!("Model {} is not available: {}", model_name, err);
                self.transition(AssistantState::ModelUnready);
                ModelReadiness::Unready {
                    message: err.to_string(),
                }
            }
        }
    }

    /// `user_input` should be non-blank; blank input is logged and still sent.
    pub async fn query(&mut self, user_input: &str) -> QueryResult {
        if user_input.trim().is_empty() {
            tracing::warn!("Dispatching a blank question");
        }

        self.transition(AssistantState::Querying);
        let result = match self.dispatch(user_input).await {
            Ok(response) => QueryResult::Success { response },
            Err(err) => {
                tracing::warn!("Query failed: {}", err);
                QueryResult::Error {
                    message: format!("{}: {}", QUERY_FAILED_PREFIX, err),
                }
            }
        };
        self.transition(AssistantState::Idle);
        result
    }

    async fn dispatch(&self, user_input: &str) -> Result<String, AppError> {
        let messages = self.options.prompt.compose(&self.knowledge, user_input)?;
        let request = ChatRequest::new(messages).with_temperature(self.options.temperature);
        tracing::debug!(
            "Dispatching query to {} ({}), {} locations in context",
            self.backend.name(),
            self.options.model,
            self.knowledge.locations.len()
        );
        self.backend.chat(request, &self.options.model).await
    }

    /// Merges `new_data` into the knowledge base and saves it. With warm-up
    /// enabled, each updated record is then replayed to the model.
    pub async fn update_knowledge(&mut self, new_data: KnowledgeUpdate) -> Result<(), AppError> {
        if new_data.is_empty() {
            tracing::debug!("Knowledge update carries no collections");
        }
        let replay = self.options.warm_up_on_update.then(|| new_data.clone());

        self.knowledge.update(new_data);
        self.store.save(&self.knowledge)?;
        tracing::info!(
            "Knowledge base saved to {} ({} locations, {} rules, {} items)",
            self.store.path().display(),
            self.knowledge.locations.len(),
            self.knowledge.rules.len(),
            self.knowledge.items.len()
        );

        if let Some(update) = replay {
            let report = self.warm_up_replay(&update).await;
            tracing::info!(
                "Warm-up replay finished: {} sent, {} failed",
                report.attempted,
                report.failed
            );
        }
        Ok(())
    }

    /// Sends one chat call per record in `update` so the model sees the new
    /// content. Replies are discarded and nothing is stored; this is not
    /// training.
    pub async fn warm_up_replay(&self, update: &KnowledgeUpdate) -> WarmUpReport {
        let mut report = WarmUpReport::default();

        let records = match update.records() {
            Ok(records) => records,
            Err(err) => {
                tracing::warn!("Skipping warm-up replay: {}", err);
                return report;
            }
        };

        for record in records {
            report.attempted += 1;
            let outcome = match self.options.prompt.warm_up(&record) {
                Ok(messages) => {
                    let request =
                        ChatRequest::new(messages).with_temperature(self.options.temperature);
                    self.backend.chat(request, &self.options.model).await.map(|_| ())
                }
                Err(err) => Err(err),
            };
            if let Err(err) = outcome {
                report.failed += 1;
                tracing::warn!("Warm-up call failed: {}", err);
            }
        }
        report
    }

    /// Puts the assistant back to `Idle` when a `query` future was dropped
    /// before it finished, e.g. by an outer timeout.
    pub fn recover_interrupted(&mut self) {
        if self.state == AssistantState::Querying {
            tracing::warn!("Previous query was abandoned before completing");
            self.transition(AssistantState::Idle);
        }
    }

    fn transition(&mut self, next: AssistantState) {
        tracing::debug!("Assistant state {:?} -> {:?}", self.state, next);
        self.state = next;
    }
}
