mod pdf;

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::ExtractionError;

/// A scientific article ready for analysis. The text is never empty.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Article {
    pub source: PathBuf,
    pub text: String,
    pub pages: usize,
    pub size_bytes: u64,
}

impl Article {
    /// Extract an article from a PDF on disk
    pub fn from_pdf(path: &Path) -> Result<Self, ExtractionError> {
        tracing::info!("Extracting text from {}", path.display());

        let extracted = pdf::extract_text(path)?;
        let size_bytes = std::fs::metadata(path).map(|m| m.len()).unwrap_or(0);

        tracing::info!(
            "Extraction complete: {} chars, {} pages",
            extracted.text.len(),
            extracted.pages
        );

        Ok(Self {
            source: path.to_path_buf(),
            text: extracted.text,
            pages: extracted.pages,
            size_bytes,
        })
    }

    /// Build an article from text that was obtained some other way
    #[cfg(test)]
    pub fn from_text(source: impl Into<PathBuf>, text: &str) -> Result<Self, ExtractionError> {
        let source = source.into();
        let text = pdf::clean_pdf_text(text);
        if text.is_empty() {
            return Err(ExtractionError::NoText(source));
        }
        Ok(Self {
            size_bytes: text.len() as u64,
            source,
            text,
            pages: 1,
        })
    }

    /// File name of the source, for headers and status lines
    pub fn file_name(&self) -> String {
        self.source
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| self.source.display().to_string())
    }
}

/// Basic facts about a PDF, available even when it has no text layer
#[derive(Debug, Clone, Serialize)]
pub struct PdfInfo {
    pub pages: usize,
    pub size_bytes: u64,
    pub text_chars: usize,
}

impl PdfInfo {
    pub fn size_kb(&self) -> f64 {
        self.size_bytes as f64 / 1024.0
    }
}

/// Inspect a PDF without requiring extractable text
pub fn pdf_info(path: &Path) -> Result<PdfInfo, ExtractionError> {
    let bytes = pdf::read_pdf(path)?;
    let pages = pdf::extract_pages(path, &bytes)?;
    let text_chars = pdf::clean_pdf_text(&pages.join("\n")).chars().count();

    Ok(PdfInfo {
        pages: pages.len(),
        size_bytes: bytes.len() as u64,
        text_chars,
    })
}

#[cfg(test)]
pub(crate) mod fixtures {
    use lopdf::content::{Content, Operation};
    use lopdf::{Dictionary, Document, Object, Stream, dictionary};
    use std::path::Path;

    /// Write a one-page-per-entry PDF. `None` produces a page with no text.
    pub fn write_pdf(path: &Path, pages: &[Option<&str>]) {
        let courier = dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => "Courier",
        };
        write_pages(path, courier, pages);
    }

    /// Single page of text set in an arbitrary font dictionary
    pub fn write_pdf_with_font(path: &Path, font: Dictionary, text: &str) {
        write_pages(path, font, &[Some(text)]);
    }

    fn write_pages(path: &Path, font: Dictionary, pages: &[Option<&str>]) {
        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();
        let font_id = doc.add_object(font);
        let resources_id = doc.add_object(dictionary! {
            "Font" => dictionary! {
                "F1" => font_id,
            },
        });

        let mut kids: Vec<Object> = Vec::new();
        for page in pages {
            let operations = match page {
                Some(text) => vec![
                    Operation::new("BT", vec![]),
                    Operation::new("Tf", vec!["F1".into(), 12.into()]),
                    Operation::new("Td", vec![72.into(), 720.into()]),
                    Operation::new("Tj", vec![Object::string_literal(*text)]),
                    Operation::new("ET", vec![]),
                ],
                None => vec![],
            };
            let content = Content { operations };
            let content_id =
                doc.add_object(Stream::new(dictionary! {}, content.encode().unwrap()));
            let page_id = doc.add_object(dictionary! {
                "Type" => "Page",
                "Parent" => pages_id,
                "Contents" => content_id,
                "Resources" => resources_id,
                "MediaBox" => vec![0.into(), 0.into(), 612.into(), 792.into()],
            });
            kids.push(page_id.into());
        }

        let count = kids.len() as i64;
        let pages_dict = dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => count,
            "Resources" => resources_id,
            "MediaBox" => vec![0.into(), 0.into(), 612.into(), 792.into()],
        };
        doc.objects.insert(pages_id, Object::Dictionary(pages_dict));
        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        doc.trailer.set("Root", catalog_id);
        doc.save(path).unwrap();
    }
}
