use serde_json::Value;

use crate::core::config::defaults::{DEFAULT_LANGUAGE, DEFAULT_PERSONA};
use crate::core::config::AssistantConfig;
use crate::core::errors::AppError;
use crate::knowledge::KnowledgeBase;
use crate::llm::ChatMessage;

/// The six fields every answer has to fill in.
pub const ANSWER_FIELDS: [&str; 6] = [
    "地點名稱",
    "地址",
    "接受物資",
    "服務時間",
    "聯絡方式",
    "注意事項",
];

/// Builds the system and user messages that ground a question in the
/// knowledge base.
///
/// The whole knowledge base is embedded in every user message; prompt size
/// grows linearly with it.
#[derive(Debug, Clone)]
pub struct PromptBuilder {
    persona: String,
    language: String,
}

impl Default for PromptBuilder {
    fn default() -> Self {
        Self {
            persona: DEFAULT_PERSONA.to_string(),
            language: DEFAULT_LANGUAGE.to_string(),
        }
    }
}

impl PromptBuilder {
    pub fn new(language: impl Into<String>) -> Self {
        Self {
            language: language.into(),
            ..Default::default()
        }
    }

    pub fn from_config(config: &AssistantConfig) -> Self {
        let builder = Self::new(config.language.clone());
        match config.system_prompt.as_deref().map(str::trim) {
            Some(persona) if !persona.is_empty() => builder.with_persona(persona),
            _ => builder,
        }
    }

    pub fn with_persona(mut self, persona: impl Into<String>) -> Self {
        self.persona = persona.into();
        self
    }

    pub fn language(&self) -> &str {
        &self.language
    }

    pub fn system_message(&self) -> String {
        let fields = ANSWER_FIELDS
            .iter()
            .enumerate()
            .map(|(i, field)| format!("{}. {}：", i + 1, field))
            .collect::<Vec<_>>()
            .join("\n");

        format!(
            "{persona}\n\
             請只使用{lang}回答，不得使用任何其他語言。回答務必簡潔。\n\
             每個回答都必須依照以下格式，完整包含六個欄位：\n\
             {fields}\n\
             若知識庫中沒有相符的資訊，請在注意事項中說明。",
            persona = self.persona,
            lang = self.language,
            fields = fields,
        )
    }

    pub fn user_message(&self, context: &str, question: &str) -> String {
        format!("知識庫資訊：\n{}\n\n用戶問題：{}", context, question)
    }

    /// System message first, then the grounded question.
    pub fn compose(
        &self,
        knowledge: &KnowledgeBase,
        question: &str,
    ) -> Result<Vec<ChatMessage>, AppError> {
        let context = knowledge.to_pretty_json()?;
        Ok(vec![
            ChatMessage::system(self.system_message()),
            ChatMessage::user(self.user_message(&context, question)),
        ])
    }

    /// Messages replayed for one newly added record during warm-up.
    pub fn warm_up(&self, record: &Value) -> Result<Vec<ChatMessage>, AppError> {
        let record = serde_json::to_string_pretty(record)?;
        Ok(vec![
            ChatMessage::system(self.system_message()),
            ChatMessage::user(format!("請熟悉以下新增的捐贈資訊：\n{}", record)),
        ])
    }
}
