//! Error types for the invex-core library.

use thiserror::Error;

/// Main error type for the invex library.
#[derive(Error, Debug)]
pub enum InvexError {
    /// PDF processing error.
    #[error("PDF error: {0}")]
    Pdf(#[from] PdfError),

    /// Completion service error.
    #[error("completion error: {0}")]
    Completion(#[from] CompletionError),

    /// Invoice extraction error.
    #[error("extraction error: {0}")]
    Extraction(#[from] ExtractionError),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A required input was missing or empty; reported before any external call.
    #[error("invalid input: {0}")]
    InvalidInput(String),
}

/// Errors related to PDF processing.
#[derive(Error, Debug)]
pub enum PdfError {
    /// Failed to open/parse the PDF file.
    #[error("failed to parse PDF: {0}")]
    Parse(String),

    /// Failed to extract text from PDF.
    #[error("failed to extract text: {0}")]
    TextExtraction(String),

    /// The PDF is empty or has no pages.
    #[error("PDF has no pages")]
    NoPages,

    /// Invalid page number requested.
    #[error("invalid page number: {0}")]
    InvalidPage(u32),
}

/// Errors related to the completion service call.
#[derive(Error, Debug)]
pub enum CompletionError {
    /// Transport-level failure (connect, timeout, TLS).
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// The service answered with a non-success status.
    #[error("completion service returned {status}: {message}")]
    Api { status: u16, message: String },

    /// The response carried no choices.
    #[error("completion response contained no choices")]
    EmptyResponse,
}

/// Errors related to interpreting the extraction result.
#[derive(Error, Debug)]
pub enum ExtractionError {
    /// The completion service returned something that is not a JSON object.
    #[error("malformed extraction result: {0}")]
    MalformedResponse(String),

    /// A field value has a shape the locator cannot search.
    #[error("unexpected shape for field {field}")]
    UnexpectedShape { field: String },
}

/// Result type for the invex library.
pub type Result<T> = std::result::Result<T, InvexError>;
