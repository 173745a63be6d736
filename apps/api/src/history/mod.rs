//! Per-user evaluation history — a best-effort side channel.
//!
//! The optimize pipeline appends after a successful evaluation and swallows
//! failures; only the history listing endpoint surfaces store errors.

use anyhow::Result;
use async_trait::async_trait;
use sqlx::PgPool;
use tracing::info;
use uuid::Uuid;

use crate::models::evaluation::CandidateEvaluation;
use crate::models::history::HistoryRecordRow;

/// Characters of the job description kept with each record.
pub const JOB_DESCRIPTION_PREVIEW_CHARS: usize = 200;

#[async_trait]
pub trait HistoryStore: Send + Sync {
    async fn append(
        &self,
        user_id: &str,
        job_description: &str,
        evaluation: &CandidateEvaluation,
    ) -> Result<Uuid>;

    /// Most recent first.
    async fn list(&self, user_id: &str, limit: i64) -> Result<Vec<HistoryRecordRow>>;
}

pub struct PgHistoryStore {
    pool: PgPool,
}

impl PgHistoryStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl HistoryStore for PgHistoryStore {
    async fn append(
        &self,
        user_id: &str,
        job_description: &str,
        evaluation: &CandidateEvaluation,
    ) -> Result<Uuid> {
        let id = Uuid::new_v4();
        sqlx::query(
            r#"
            INSERT INTO evaluation_history
                (id, user_id, job_description, match_score, full_analysis)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(id)
        .bind(user_id)
        .bind(job_description_preview(job_description))
        .bind(evaluation.match_score())
        .bind(serde_json::to_value(evaluation)?)
        .execute(&self.pool)
        .await?;

        info!("Saved evaluation {id} to history for user {user_id}");
        Ok(id)
    }

    async fn list(&self, user_id: &str, limit: i64) -> Result<Vec<HistoryRecordRow>> {
        Ok(sqlx::query_as::<_, HistoryRecordRow>(
            r#"
            SELECT id, user_id, job_description, match_score, full_analysis, created_at
            FROM evaluation_history
            WHERE user_id = $1
            ORDER BY created_at DESC
            LIMIT $2
            "#,
        )
        .bind(user_id)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?)
    }
}

/// First `JOB_DESCRIPTION_PREVIEW_CHARS` characters, with `...` appended only
/// when something was cut.
pub fn job_description_preview(job_description: &str) -> String {
    let mut chars = job_description.char_indices();
    match chars.nth(JOB_DESCRIPTION_PREVIEW_CHARS) {
        Some((cut, _)) => format!("{}...", &job_description[..cut]),
        None => job_description.to_string(),
    }
}
