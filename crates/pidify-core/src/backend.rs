use std::path::Path;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum RenderError {
    #[error("failed to open document: {0}")]
    Open(String),
    #[error("failed to render text: {0}")]
    Extraction(String),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Turns a source document into the plain text the field extractor reads.
///
/// The PDF implementation lives in `pidify-pdf-mupdf` so that the core crate
/// does not depend on mupdf.
pub trait TextRenderer: Send + Sync {
    fn render_text(&self, path: &Path) -> Result<String, RenderError>;
}

/// Reads a document that has already been rendered to UTF-8 text.
#[derive(Debug, Default, Clone, Copy)]
pub struct PlainTextRenderer;

impl TextRenderer for PlainTextRenderer {
    fn render_text(&self, path: &Path) -> Result<String, RenderError> {
        let text = std::fs::read_to_string(path)?;
        Ok(text.trim_start_matches('\u{feff}').to_string())
    }
}
