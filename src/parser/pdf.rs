use regex::Regex;
use std::panic::{self, AssertUnwindSafe};
use std::path::Path;
use std::sync::LazyLock;

use crate::error::ExtractionError;

static INLINE_WHITESPACE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[ \t]{2,}").unwrap());

/// Extracted pages of a PDF, already cleaned
pub struct PdfText {
    pub pages: usize,
    pub text: String,
}

/// Extract text from a PDF file, page by page
pub fn extract_text(path: &Path) -> Result<PdfText, ExtractionError> {
    let bytes = read_pdf(path)?;
    let pages = extract_pages(path, &bytes)?;
    let page_count = pages.len();

    for (i, page) in pages.iter().enumerate() {
        tracing::debug!("Page {}/{}: {} chars", i + 1, page_count, page.len());
    }

    let text = clean_pdf_text(&pages.join("\n"));
    if text.is_empty() {
        tracing::warn!("{} has no extractable text", path.display());
        return Err(ExtractionError::NoText(path.to_path_buf()));
    }

    Ok(PdfText {
        pages: page_count,
        text,
    })
}

/// Validate the path and read the raw bytes
pub(crate) fn read_pdf(path: &Path) -> Result<Vec<u8>, ExtractionError> {
    if !path.exists() {
        return Err(ExtractionError::NotFound(path.to_path_buf()));
    }

    let is_pdf = path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("pdf"));
    if !is_pdf {
        return Err(ExtractionError::NotPdf(path.to_path_buf()));
    }

    std::fs::read(path).map_err(|source| ExtractionError::Unreadable {
        path: path.to_path_buf(),
        source,
    })
}

pub(crate) fn extract_pages(path: &Path, bytes: &[u8]) -> Result<Vec<String>, ExtractionError> {
    // pdf-extract panics instead of erroring on some broken fonts and encodings
    let result = panic::catch_unwind(AssertUnwindSafe(|| {
        pdf_extract::extract_text_from_mem_by_pages(bytes)
    }));

    match result {
        Ok(Ok(pages)) => Ok(pages),
        Ok(Err(e)) => Err(ExtractionError::Parse {
            path: path.to_path_buf(),
            message: e.to_string(),
        }),
        Err(payload) => {
            let message = panic_message(payload.as_ref());
            tracing::warn!("PDF parser panicked on {}: {}", path.display(), message);
            Err(ExtractionError::Parse {
                path: path.to_path_buf(),
                message,
            })
        }
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    payload
        .downcast_ref::<&str>()
        .map(|s| s.to_string())
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "PDF parser aborted on malformed content".to_string())
}

/// Clean up extracted PDF text
pub(crate) fn clean_pdf_text(text: &str) -> String {
    let text = text.replace(['\u{0}', '\u{FEFF}', '\u{C}'], "");

    text.lines()
        // Remove empty lines and whitespace-only lines
        .map(|line| INLINE_WHITESPACE.replace_all(line.trim(), " "))
        .filter(|line| !line.is_empty())
        // Join with single newlines
        .collect::<Vec<_>>()
        .join("\n")
}
