use std::path::Path;

use mupdf::{Document, TextPageFlags};

use pidify_core::{RenderError, TextRenderer};

/// MuPDF-based implementation of [`TextRenderer`].
///
/// This crate isolates the mupdf dependency (AGPL-3.0) so that the core
/// crate and the plain-text path do not transitively depend on it.
///
/// Every page is rendered in reading order, one text line per output line,
/// with pages separated by a blank line. Plan exports put labels such as
/// `Funder:` in page headers as well as the body, so nothing is cropped.
#[derive(Debug, Default, Clone, Copy)]
pub struct MupdfRenderer;

impl MupdfRenderer {
    pub fn new() -> Self {
        Self
    }
}

impl TextRenderer for MupdfRenderer {
    fn render_text(&self, path: &Path) -> Result<String, RenderError> {
        let path_str = path
            .to_str()
            .ok_or_else(|| RenderError::Open("invalid path encoding".into()))?;

        let document = Document::open(path_str).map_err(|e| RenderError::Open(e.to_string()))?;

        let mut pages_text = Vec::new();

        for page_result in document
            .pages()
            .map_err(|e| RenderError::Extraction(e.to_string()))?
        {
            let page = page_result.map_err(|e| RenderError::Extraction(e.to_string()))?;
            let text_page = page
                .to_text_page(TextPageFlags::empty())
                .map_err(|e| RenderError::Extraction(e.to_string()))?;

            let mut page_text = String::new();
            for block in text_page.blocks() {
                for line in block.lines() {
                    let line_text: String = line
                        .chars()
                        .map(|c| c.char().unwrap_or('\u{FFFD}'))
                        .collect();
                    page_text.push_str(&line_text);
                    page_text.push('\n');
                }
            }
            pages_text.push(page_text);
        }

        Ok(pages_text.join("\n"))
    }
}
