//! Axum route handlers for the Optimize API.

use axum::{
    extract::{multipart::Field, rejection::JsonRejection, Multipart, Query, State},
    http::HeaderMap,
    Json,
};
use bytes::Bytes;
use serde::Deserialize;
use tracing::info;

use crate::document::{MediaType, ResumeContent};
use crate::errors::AppError;
use crate::models::evaluation::CandidateEvaluation;
use crate::models::history::HistoryRecordRow;
use crate::optimize::pipeline::{extract_document, resolve_user, run_evaluation, OptimizeInput};
use crate::state::AppState;

const RESUME_FILE_FIELD: &str = "resume_file";
const JOB_DESCRIPTION_FIELD: &str = "job_description";
const DEFAULT_HISTORY_LIMIT: i64 = 20;
const MAX_HISTORY_LIMIT: i64 = 100;

// ────────────────────────────────────────────────────────────────────────────
// Request types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct OptimizeTextRequest {
    pub resume: String,
    pub job_description: String,
}

#[derive(Debug, Deserialize)]
pub struct HistoryQuery {
    pub limit: Option<i64>,
}

struct Upload {
    file_name: String,
    content_type: Option<String>,
    data: Bytes,
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/v1/optimize
///
/// Multipart upload: `resume_file` (PDF, DOCX, JPEG or PNG) and `job_description`.
/// Input is validated before any outbound call is made.
pub async fn handle_optimize_upload(
    State(state): State<AppState>,
    headers: HeaderMap,
    mut multipart: Multipart,
) -> Result<Json<CandidateEvaluation>, AppError> {
    let mut upload: Option<Upload> = None;
    let mut job_description = String::new();

    while let Some(field) = multipart.next_field().await.map_err(malformed_multipart)? {
        let name = field.name().map(str::to_string);
        match name.as_deref() {
            Some(RESUME_FILE_FIELD) => upload = Some(read_upload(field).await?),
            Some(JOB_DESCRIPTION_FIELD) => {
                job_description = field.text().await.map_err(malformed_multipart)?;
            }
            _ => {}
        }
    }

    let upload =
        upload.ok_or_else(|| AppError::Validation("No resume file part".to_string()))?;
    if upload.file_name.is_empty() {
        return Err(AppError::Validation("No selected file".to_string()));
    }

    let declared = upload.content_type.unwrap_or_default();
    let media_type = MediaType::from_mime(&declared)
        .ok_or_else(|| AppError::Validation(format!("Unsupported file type: {declared}")))?;
    require_job_description(&job_description)?;

    info!(
        "Optimize request: file={} type={} size={}B",
        upload.file_name,
        media_type.mime(),
        upload.data.len()
    );

    let resume = extract_document(media_type, upload.data).await?;
    let user_id = resolve_user(&state, &headers).await;

    let evaluation = run_evaluation(
        &state,
        OptimizeInput {
            resume,
            job_description,
            user_id,
        },
    )
    .await?;

    Ok(Json(evaluation))
}

/// POST /api/v1/optimize/text
///
/// JSON intake for callers that already hold the résumé as text.
pub async fn handle_optimize_text(
    State(state): State<AppState>,
    headers: HeaderMap,
    payload: Result<Json<OptimizeTextRequest>, JsonRejection>,
) -> Result<Json<CandidateEvaluation>, AppError> {
    let Json(request) = payload.map_err(|e| {
        AppError::Validation(format!("Missing resume or job description: {}", e.body_text()))
    })?;

    if request.resume.trim().is_empty() {
        return Err(AppError::Validation("resume cannot be empty".to_string()));
    }
    require_job_description(&request.job_description)?;

    let user_id = resolve_user(&state, &headers).await;

    let evaluation = run_evaluation(
        &state,
        OptimizeInput {
            resume: ResumeContent::Text(request.resume),
            job_description: request.job_description,
            user_id,
        },
    )
    .await?;

    Ok(Json(evaluation))
}

/// GET /api/v1/history
///
/// The caller's past evaluations, newest first. Requires a valid bearer token.
pub async fn handle_history(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(params): Query<HistoryQuery>,
) -> Result<Json<Vec<HistoryRecordRow>>, AppError> {
    let user_id = resolve_user(&state, &headers)
        .await
        .ok_or(AppError::Unauthorized)?;

    let Some(history) = state.history.as_ref() else {
        return Ok(Json(Vec::new()));
    };

    let limit = params
        .limit
        .unwrap_or(DEFAULT_HISTORY_LIMIT)
        .clamp(1, MAX_HISTORY_LIMIT);

    let records = history
        .list(&user_id, limit)
        .await
        .map_err(|e| AppError::Database(format!("{e:#}")))?;

    Ok(Json(records))
}

// ────────────────────────────────────────────────────────────────────────────
// Helpers
// ────────────────────────────────────────────────────────────────────────────

async fn read_upload(field: Field<'_>) -> Result<Upload, AppError> {
    let file_name = field.file_name().unwrap_or_default().to_string();
    let content_type = field.content_type().map(str::to_string);
    let data = field.bytes().await.map_err(malformed_multipart)?;
    Ok(Upload {
        file_name,
        content_type,
        data,
    })
}

fn require_job_description(job_description: &str) -> Result<(), AppError> {
    if job_description.trim().is_empty() {
        return Err(AppError::Validation(
            "job_description cannot be empty".to_string(),
        ));
    }
    Ok(())
}

fn malformed_multipart(e: axum::extract::multipart::MultipartError) -> AppError {
    AppError::Validation(format!("Malformed multipart body: {}", e.body_text()))
}
