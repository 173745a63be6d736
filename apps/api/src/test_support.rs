//! In-memory stand-ins for the external collaborators, used by handler tests.

use std::sync::{Arc, Mutex};

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use chrono::Utc;
use uuid::Uuid;

use crate::auth::{AuthError, IdentityVerifier};
use crate::config::Config;
use crate::history::{job_description_preview, HistoryStore};
use crate::llm_client::{GenerativeModel, LlmError, Prompt};
use crate::models::evaluation::CandidateEvaluation;
use crate::models::history::HistoryRecordRow;
use crate::state::AppState;

pub const VALID_TOKEN: &str = "valid-token";
pub const TEST_USER: &str = "user-1";

pub enum ModelReply {
    Text(String),
    Blocked(&'static str),
    ApiError,
}

/// Replays a canned reply and records every prompt it receives.
pub struct FakeModel {
    reply: ModelReply,
    pub prompts: Mutex<Vec<Prompt>>,
}

impl FakeModel {
    pub fn new(reply: ModelReply) -> Arc<Self> {
        Arc::new(Self {
            reply,
            prompts: Mutex::new(Vec::new()),
        })
    }

    pub fn replying(text: &str) -> Arc<Self> {
        Self::new(ModelReply::Text(text.to_string()))
    }

    pub fn calls(&self) -> usize {
        self.prompts.lock().unwrap().len()
    }
}

#[async_trait]
impl GenerativeModel for FakeModel {
    async fn generate(&self, prompt: &Prompt) -> Result<String, LlmError> {
        self.prompts.lock().unwrap().push(prompt.clone());
        match &self.reply {
            ModelReply::Text(text) => Ok(text.clone()),
            ModelReply::Blocked(reason) => Err(LlmError::Blocked {
                reason: reason.to_string(),
            }),
            ModelReply::ApiError => Err(LlmError::Api {
                status: 503,
                message: "model overloaded".to_string(),
            }),
        }
    }
}

/// Accepts exactly `VALID_TOKEN` as `TEST_USER`.
pub struct FakeIdentity;

#[async_trait]
impl IdentityVerifier for FakeIdentity {
    async fn verify(&self, token: &str) -> Result<String, AuthError> {
        if token == VALID_TOKEN {
            Ok(TEST_USER.to_string())
        } else {
            Err(AuthError::UnknownUser)
        }
    }
}

#[derive(Default)]
pub struct MemoryHistory {
    pub records: Mutex<Vec<HistoryRecordRow>>,
    pub fail_appends: bool,
}

impl MemoryHistory {
    pub fn failing() -> Self {
        Self {
            fail_appends: true,
            ..Self::default()
        }
    }
}

#[async_trait]
impl HistoryStore for MemoryHistory {
    async fn append(
        &self,
        user_id: &str,
        job_description: &str,
        evaluation: &CandidateEvaluation,
    ) -> Result<Uuid> {
        if self.fail_appends {
            return Err(anyhow!("connection refused"));
        }
        let id = Uuid::new_v4();
        self.records.lock().unwrap().push(HistoryRecordRow {
            id,
            user_id: user_id.to_string(),
            job_description: job_description_preview(job_description),
            match_score: evaluation.match_score(),
            full_analysis: serde_json::to_value(evaluation)?,
            created_at: Utc::now(),
        });
        Ok(id)
    }

    async fn list(&self, user_id: &str, limit: i64) -> Result<Vec<HistoryRecordRow>> {
        let records = self.records.lock().unwrap();
        Ok(records
            .iter()
            .rev()
            .filter(|r| r.user_id == user_id)
            .take(limit as usize)
            .cloned()
            .collect())
    }
}

pub fn test_config() -> Config {
    Config {
        gemini_api_key: "test-key".to_string(),
        firebase_api_key: None,
        database_url: None,
        port: 0,
        max_upload_bytes: 1024 * 1024,
        rust_log: "info".to_string(),
    }
}

pub fn test_state(model: Arc<FakeModel>, history: Option<Arc<MemoryHistory>>) -> AppState {
    AppState {
        model,
        identity: Some(Arc::new(FakeIdentity)),
        history: history.map(|h| h as Arc<dyn HistoryStore>),
        config: test_config(),
    }
}

/// A minimal PDF with one Helvetica text line per page, in the given order.
pub fn pdf_with_pages(pages: &[&str]) -> Vec<u8> {
    // 1 = catalog, 2 = page tree, 3 = font, then a (page, contents) pair per page.
    let page_id = |i: usize| 4 + 2 * i;
    let kids: Vec<String> = (0..pages.len())
        .map(|i| format!("{} 0 R", page_id(i)))
        .collect();

    let mut objects = vec![
        "<< /Type /Catalog /Pages 2 0 R >>".to_string(),
        format!(
            "<< /Type /Pages /Kids [{}] /Count {} >>",
            kids.join(" "),
            pages.len()
        ),
        "<< /Type /Font /Subtype /Type1 /BaseFont /Helvetica >>".to_string(),
    ];
    for (i, text) in pages.iter().enumerate() {
        let stream = format!("BT /F1 12 Tf 72 720 Td ({text}) Tj ET");
        objects.push(format!(
            "<< /Type /Page /Parent 2 0 R /MediaBox [0 0 612 792] \
             /Resources << /Font << /F1 3 0 R >> >> /Contents {} 0 R >>",
            page_id(i) + 1
        ));
        objects.push(format!(
            "<< /Length {} >>\nstream\n{stream}\nendstream",
            stream.len()
        ));
    }

    let mut pdf = b"%PDF-1.4\n".to_vec();
    let mut offsets = Vec::with_capacity(objects.len());
    for (i, body) in objects.iter().enumerate() {
        offsets.push(pdf.len());
        pdf.extend_from_slice(format!("{} 0 obj\n{body}\nendobj\n", i + 1).as_bytes());
    }

    let xref_offset = pdf.len();
    let mut xref = format!("xref\n0 {}\n0000000000 65535 f \n", objects.len() + 1);
    for offset in offsets {
        xref.push_str(&format!("{offset:010} 00000 n \n"));
    }
    xref.push_str(&format!(
        "trailer\n<< /Size {} /Root 1 0 R >>\nstartxref\n{xref_offset}\n%EOF\n",
        objects.len() + 1
    ));
    pdf.extend_from_slice(xref.as_bytes());
    pdf
}
