use serde::{Deserialize, Serialize};

/// Outcome of a single question. Serializes as
/// `{"status": "success", "response": ...}` or `{"status": "error", "message": ...}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum QueryResult {
    Success { response: String },
    Error { message: String },
}

impl QueryResult {
    pub fn is_success(&self) -> bool {
        matches!(self, QueryResult::Success { .. })
    }

    /// The reply on success, the failure description otherwise.
    pub fn text(&self) -> &str {
        match self {
            QueryResult::Success { response } => response,
            QueryResult::Error { message } => message,
        }
    }
}

/// Outcome of making sure the model is available to the backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status")]
pub enum ModelReadiness {
    #[serde(rename = "success")]
    Ready { message: String },
    #[serde(rename = "error")]
    Unready { message: String },
}

impl ModelReadiness {
    pub fn is_ready(&self) -> bool {
        matches!(self, ModelReadiness::Ready { .. })
    }

    pub fn message(&self) -> &str {
        match self {
            ModelReadiness::Ready { message } | ModelReadiness::Unready { message } => message,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssistantState {
    Constructed,
    KnowledgeLoaded,
    ModelReady,
    ModelUnready,
    Querying,
    Idle,
}

/// Counts from a warm-up replay. Replies are never kept.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct WarmUpReport {
    pub attempted: usize,
    pub failed: usize,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn query_result_wire_shape() {
        let ok = QueryResult::Success {
            response: "台北食物銀行".to_string(),
        };
        assert_eq!(
            serde_json::to_value(&ok).unwrap(),
            json!({ "status": "success", "response": "台北食物銀行" })
        );

        let err = QueryResult::Error {
            message: "查詢失敗: timeout".to_string(),
        };
        assert_eq!(
            serde_json::to_value(&err).unwrap(),
            json!({ "status": "error", "message": "查詢失敗: timeout" })
        );
        assert!(!err.is_success());
        assert_eq!(err.text(), "查詢失敗: timeout");
    }

    #[test]
    fn readiness_wire_shape() {
        let unready = ModelReadiness::Unready {
            message: "model not found".to_string(),
        };
        assert_eq!(
            serde_json::to_value(&unready).unwrap(),
            json!({ "status": "error", "message": "model not found" })
        );
        let parsed: ModelReadiness =
            serde_json::from_value(json!({ "status": "success", "message": "ok" })).unwrap();
        assert!(parsed.is_ready());
    }
}
