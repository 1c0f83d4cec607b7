use std::env;
use std::sync::Arc;

use anyhow::Context;
use tokio::time::timeout;

use donation_assistant::assistant::{Assistant, AssistantOptions, ModelReadiness, QueryResult};
use donation_assistant::core::config::{AppPaths, ConfigService};
use donation_assistant::core::logging;
use donation_assistant::knowledge::sample::{sample_update, SAMPLE_QUESTION};
use donation_assistant::knowledge::{KnowledgeStore, LoadOutcome};
use donation_assistant::llm::OllamaBackend;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config_service = ConfigService::new(Arc::new(AppPaths::new()));
    let (config, config_warnings) = config_service
        .load_config_with_warnings()
        .context("Failed to load configuration")?;
    logging::init(config_service.paths(), &config.logging);
    for warning in &config_warnings {
        tracing::warn!("{}", warning);
    }

    let store = KnowledgeStore::new(config_service.knowledge_path(&config));
    let first_run = matches!(store.inspect(), LoadOutcome::Absent);

    let backend = OllamaBackend::new(&config.backend).context("Failed to build Ollama client")?;
    let options = AssistantOptions::from_config(&config);
    tracing::info!(
        "Using Ollama at {} with model {}, answering in {}",
        backend.base_url(),
        config.model.name,
        options.prompt.language()
    );

    let mut assistant = Assistant::new(Arc::new(backend), store, options);

    if first_run && config.knowledge.seed_sample {
        assistant
            .update_knowledge(sample_update()?)
            .await
            .context("Failed to seed sample knowledge")?;
        tracing::info!("Seeded sample knowledge into {}", assistant.store().path().display());
    }
    if assistant.knowledge().is_empty() {
        tracing::warn!("Knowledge base is empty; answers will not be grounded");
    }

    println!("正在確認模型...");
    let pull_budget = config.backend.call_budget(config.backend.pull_timeout());
    let readiness = timeout(pull_budget, assistant.ensure_model_ready(&config.model.name))
        .await
        .unwrap_or_else(|_| ModelReadiness::Unready {
            message: format!(
                "Timed out waiting for model {} after {}s",
                config.model.name,
                pull_budget.as_secs()
            ),
        });
    println!("{}", serde_json::to_string_pretty(&readiness)?);

    if !readiness.is_ready() {
        anyhow::bail!("Model {} is not ready: {}", config.model.name, readiness.message());
    }

    let words: Vec<String> = env::args().skip(1).collect();
    let question = if words.is_empty() {
        SAMPLE_QUESTION.to_string()
    } else {
        words.join(" ")
    };

    println!("\n問題: {}", question);
    let query_budget = config.backend.call_budget(config.backend.request_timeout());
    let outcome = timeout(query_budget, assistant.query(&question)).await;
    let result = match outcome {
        Ok(result) => result,
        Err(_) => {
            assistant.recover_interrupted();
            QueryResult::Error {
                message: format!("查詢失敗: timed out after {}s", query_budget.as_secs()),
            }
        }
    };

    if result.is_success() {
        println!("回答: {}", result.text());
        return Ok(());
    }
    println!("{}", serde_json::to_string_pretty(&result)?);
    anyhow::bail!("{}", result.text())
}
