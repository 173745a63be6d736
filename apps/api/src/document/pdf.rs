use std::panic;

use super::ExtractionError;

/// Text of every page, in page order.
///
/// The PDF parser panics on some malformed inputs; that is reported as an
/// extraction error like any other corrupt file.
pub(super) fn extract_text(data: &[u8]) -> Result<String, ExtractionError> {
    match panic::catch_unwind(|| pdf_extract::extract_text_from_mem(data)) {
        Ok(Ok(text)) => Ok(text),
        Ok(Err(e)) => Err(ExtractionError::Pdf(format!("{e:?}"))),
        Err(_) => Err(ExtractionError::Pdf("parser panicked".to_string())),
    }
}
