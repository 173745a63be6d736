use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct HistoryRecordRow {
    pub id: Uuid,
    pub user_id: String,
    pub job_description: String,
    pub match_score: i32,
    pub full_analysis: Value,
    pub created_at: DateTime<Utc>,
}
