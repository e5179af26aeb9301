//! Text extraction for uploaded transcript PDFs.

use crate::error::{AppError, AppResult};

/// Reported when an upload is not named like a PDF
pub const NOT_A_PDF: &str = "File must be a PDF";

/// Extracts the text layer of a PDF document
///
/// Parsing is CPU bound, so it runs on the blocking pool. A document the
/// parser cannot read, or one that makes it panic, is reported as
/// `AppError::PdfExtraction`.
pub async fn extract_pdf_text(bytes: Vec<u8>) -> AppResult<String> {
    tokio::task::spawn_blocking(move || pdf_extract::extract_text_from_mem(&bytes))
        .await
        .map_err(|e| AppError::PdfExtraction(e.to_string()))?
        .map_err(|e| AppError::PdfExtraction(e.to_string()))
}

/// True when the uploaded file name has a `.pdf` extension
pub fn is_pdf_file_name(file_name: &str) -> bool {
    file_name.ends_with(".pdf")
}
