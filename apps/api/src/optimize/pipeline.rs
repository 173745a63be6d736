//! The evaluation pipeline shared by the multipart and JSON intake routes.

use axum::http::HeaderMap;
use bytes::Bytes;
use tracing::{error, info, warn};

use crate::auth::bearer_token;
use crate::document::{self, MediaType, ResumeContent};
use crate::errors::AppError;
use crate::llm_client::extract::extract_json_object;
use crate::llm_client::Prompt;
use crate::models::evaluation::CandidateEvaluation;
use crate::optimize::prompts::build_evaluation_prompt;
use crate::state::AppState;

#[derive(Debug)]
pub struct OptimizeInput {
    pub resume: ResumeContent,
    pub job_description: String,
    /// Verified caller; `None` skips history.
    pub user_id: Option<String>,
}

/// Resolves the caller from a bearer token, if both a token and a verifier exist.
/// Verification failure is logged and treated as anonymous.
pub async fn resolve_user(state: &AppState, headers: &HeaderMap) -> Option<String> {
    let token = bearer_token(headers)?;
    let verifier = state.identity.as_ref()?;

    match verifier.verify(token).await {
        Ok(user_id) => Some(user_id),
        Err(e) => {
            warn!("Error verifying token, continuing without history: {e}");
            None
        }
    }
}

/// Runs document extraction on the blocking pool.
pub async fn extract_document(
    media_type: MediaType,
    data: Bytes,
) -> Result<ResumeContent, AppError> {
    tokio::task::spawn_blocking(move || document::extract(media_type, data))
        .await
        .map_err(|e| AppError::Internal(anyhow::anyhow!("extraction task failed: {e}")))?
        .map_err(AppError::from)
}

/// Prompt → model → JSON recovery → best-effort history append.
pub async fn run_evaluation(
    state: &AppState,
    input: OptimizeInput,
) -> Result<CandidateEvaluation, AppError> {
    let OptimizeInput {
        resume,
        job_description,
        user_id,
    } = input;

    let prompt = Prompt {
        instructions: build_evaluation_prompt(&job_description),
        resume,
    };

    let raw = state.model.generate(&prompt).await?;

    let evaluation: CandidateEvaluation = match extract_json_object(&raw) {
        Some(object) => object.into(),
        None => {
            error!("Failed to parse JSON from model output. Raw text: {raw}");
            return Err(AppError::UnparseableOutput);
        }
    };

    info!(
        "Evaluation complete: match_score={}, missing_keywords={}",
        evaluation.match_score(),
        evaluation.missing_keywords().len()
    );

    if let (Some(user_id), Some(history)) = (user_id.as_deref(), state.history.as_ref()) {
        if let Err(e) = history.append(user_id, &job_description, &evaluation).await {
            error!("Failed to save evaluation to history for user {user_id}: {e:#}");
        }
    }

    Ok(evaluation)
}
