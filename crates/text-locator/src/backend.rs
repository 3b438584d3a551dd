//! Contract between the locator and a document rendering/extraction backend
//!
//! A backend opens one document per request. The document hands out pages
//! by 1-indexed number. Each page exposes its size, exact search, plain
//! text and the block → line → span tree.

use std::path::PathBuf;

use crate::error::BackendError;
use crate::layout::{PageLayout, Rect, TextBlock};

/// Where the document bytes come from
#[derive(Debug, Clone)]
pub enum DocumentSource {
    Path(PathBuf),
    Bytes(Vec<u8>),
}

impl DocumentSource {
    pub fn path(path: impl Into<PathBuf>) -> Self {
        DocumentSource::Path(path.into())
    }

    pub fn bytes(bytes: impl Into<Vec<u8>>) -> Self {
        DocumentSource::Bytes(bytes.into())
    }

    /// Short description for log lines
    pub fn describe(&self) -> String {
        match self {
            DocumentSource::Path(path) => path.display().to_string(),
            DocumentSource::Bytes(bytes) => format!("<{} bytes in memory>", bytes.len()),
        }
    }
}

/// A single page, immutable from the locator's point of view
pub trait TextPage {
    /// Width and height in points
    fn dimensions(&self) -> (f64, f64);

    /// Rectangles of every exact occurrence of `needle`
    fn search_exact(&self, needle: &str) -> Vec<Rect>;

    fn plain_text(&self) -> String;

    fn blocks(&self) -> &[TextBlock];
}

impl TextPage for PageLayout {
    fn dimensions(&self) -> (f64, f64) {
        (self.width, self.height)
    }

    fn search_exact(&self, needle: &str) -> Vec<Rect> {
        PageLayout::search_exact(self, needle)
    }

    fn plain_text(&self) -> String {
        PageLayout::plain_text(self)
    }

    fn blocks(&self) -> &[TextBlock] {
        &self.blocks
    }
}

/// An open document. Dropping it releases the backend handle.
pub trait TextDocument {
    type Page: TextPage;

    fn page_count(&self) -> usize;

    /// Load page `number` (1-indexed)
    fn page(&self, number: u32) -> Result<Self::Page, BackendError>;
}

/// Factory for request-scoped documents
pub trait DocumentBackend {
    type Document: TextDocument;

    /// Backend identifier
    fn name(&self) -> &'static str;

    fn open(&self, source: &DocumentSource) -> Result<Self::Document, BackendError>;
}
