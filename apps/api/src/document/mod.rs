//! Résumé document intake — maps an upload's declared media type to an
//! extraction strategy.
//!
//! PDF and DOCX are reduced to plain text here. Images are not OCR'd; they are
//! checked for a matching signature and handed to the model as-is.

use bytes::Bytes;
use thiserror::Error;

mod docx;
mod pdf;

const DOCX_MIME: &str = "application/vnd.openxmlformats-officedocument.wordprocessingml.document";
const JPEG_MAGIC: &[u8] = &[0xFF, 0xD8, 0xFF];
const PNG_MAGIC: &[u8] = &[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaType {
    Pdf,
    Docx,
    Jpeg,
    Png,
}

impl MediaType {
    /// Recognizes a declared MIME type. Parameters (`; charset=...`) are ignored.
    pub fn from_mime(mime: &str) -> Option<Self> {
        let essence = mime.split(';').next().unwrap_or_default().trim();
        match essence.to_ascii_lowercase().as_str() {
            "application/pdf" => Some(Self::Pdf),
            DOCX_MIME => Some(Self::Docx),
            "image/jpeg" | "image/jpg" => Some(Self::Jpeg),
            "image/png" => Some(Self::Png),
            _ => None,
        }
    }

    pub fn mime(self) -> &'static str {
        match self {
            Self::Pdf => "application/pdf",
            Self::Docx => DOCX_MIME,
            Self::Jpeg => "image/jpeg",
            Self::Png => "image/png",
        }
    }
}

/// What the model receives as the résumé.
#[derive(Debug, Clone)]
pub enum ResumeContent {
    Text(String),
    Image { media_type: MediaType, data: Bytes },
}

#[derive(Debug, Error)]
pub enum ExtractionError {
    #[error("uploaded file is empty")]
    Empty,

    #[error("PDF extraction failed: {0}")]
    Pdf(String),

    #[error("DOCX archive is unreadable: {0}")]
    DocxArchive(#[from] ::zip::result::ZipError),

    #[error("DOCX body is not valid XML: {0}")]
    DocxXml(#[from] roxmltree::Error),

    #[error("DOCX read failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("file content does not match declared type {0}")]
    SignatureMismatch(&'static str),
}

/// Produces the model-facing résumé content for an upload.
///
/// CPU-bound for PDF and DOCX; call from `spawn_blocking` in async contexts.
pub fn extract(media_type: MediaType, data: Bytes) -> Result<ResumeContent, ExtractionError> {
    if data.is_empty() {
        return Err(ExtractionError::Empty);
    }

    match media_type {
        MediaType::Pdf => pdf::extract_text(&data).map(ResumeContent::Text),
        MediaType::Docx => docx::extract_text(&data).map(ResumeContent::Text),
        MediaType::Jpeg | MediaType::Png => {
            let magic = if media_type == MediaType::Jpeg {
                JPEG_MAGIC
            } else {
                PNG_MAGIC
            };
            if !data.starts_with(magic) {
                return Err(ExtractionError::SignatureMismatch(media_type.mime()));
            }
            Ok(ResumeContent::Image { media_type, data })
        }
    }
}
