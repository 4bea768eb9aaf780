//! PDF text extraction.
//!
//! Pages are read in document order and joined with a newline; each page's
//! own trailing newline is kept, so a two-page document renders as
//! `page one\n\npage two` after the ends are trimmed.

use lopdf::Document;
use std::path::Path;
use thiserror::Error;
use tracing::{error, info};

#[derive(Error, Debug)]
enum ExtractError {
    #[error("failed to read PDF: {0}")]
    Unreadable(#[from] lopdf::Error),
}

pub struct PdfExtractor;

impl PdfExtractor {
    pub fn new() -> Self {
        Self
    }

    /// Extract the concatenated text of every page, trimmed.
    ///
    /// Returns the empty string for anything that prevents extraction — a
    /// corrupt or unreadable file as much as a document with no text layer.
    /// Callers treat the empty string as the uniform "no usable text"
    /// signal; the two root causes are only distinguished in the logs.
    pub fn extract_text(&self, path: &Path) -> String {
        match self.read_pages(path) {
            Ok(text) if text.is_empty() => {
                info!(path = %path.display(), "PDF readable but contains no text layer");
                text
            }
            Ok(text) => text,
            Err(e) => {
                error!(path = %path.display(), error = %e, "PDF text extraction failed");
                String::new()
            }
        }
    }

    fn read_pages(&self, path: &Path) -> Result<String, ExtractError> {
        let doc = Document::load(path)?;

        let mut text = String::new();
        for &page_number in doc.get_pages().keys() {
            let page_text = doc.extract_text(&[page_number])?;
            text.push_str(&page_text);
            text.push('\n');
        }

        Ok(text.trim().to_string())
    }

    pub fn is_available(&self) -> bool {
        true
    }
}

impl Default for PdfExtractor {
    fn default() -> Self {
        Self::new()
    }
}
