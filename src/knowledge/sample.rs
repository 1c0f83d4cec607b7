use serde_json::json;

use crate::core::errors::AppError;

use super::types::KnowledgeUpdate;

pub const SAMPLE_QUESTION: &str = "我想捐贈罐頭，請問哪裡可以捐？";

/// First-run seed data: the Taipei Food Bank drop-off point.
pub fn sample_update() -> Result<KnowledgeUpdate, AppError> {
    KnowledgeUpdate::from_value(json!({
        "locations": [
            {
                "id": "loc_001",
                "name": "台北食物銀行",
                "address": "台北市信義區信義路5段150號",
                "accepted_items": ["乾糧", "罐頭"],
                "hours": "週一至週五 9:00-18:00",
                "contact": "02-1234-5678"
            }
        ]
    }))
}
