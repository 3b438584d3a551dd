use shared_types::RecordError;
use thiserror::Error;

/// Failures raised by a document backend
#[derive(Error, Debug)]
pub enum BackendError {
    #[error("Failed to parse PDF: {0}")]
    Parse(String),

    #[error("Page {page} out of range (document has {count} pages)")]
    PageOutOfRange { page: u32, count: usize },

    #[error("Failed to read content of page {page}: {message}")]
    Content { page: u32, message: String },
}

#[derive(Error, Debug)]
pub enum LocatorError {
    /// Unreadable, corrupt or unsupported input; fatal for the request
    #[error("PDF open failed: {0}")]
    DocumentOpen(#[source] BackendError),

    /// Zero, negative or non-finite page area; only that page is skipped
    #[error("Page {page} has invalid dimensions {width}x{height}")]
    PageDimension { page: u32, width: f64, height: f64 },

    #[error(transparent)]
    InvalidItem(#[from] RecordError),
}
