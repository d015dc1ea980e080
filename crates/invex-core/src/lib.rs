//! Core library for LLM-based invoice extraction.
//!
//! This crate provides:
//! - A prompt/schema driver that maps invoice text or images to a fixed
//!   JSON field set through a chat-completion service
//! - PDF processing (whole-document text plus positioned per-page lines)
//! - Coordinate reconciliation: locating each extracted value's bounding
//!   regions in the source PDF's page geometry

pub mod completion;
pub mod error;
pub mod extract;
pub mod locate;
pub mod models;
pub mod pdf;

pub use completion::{ChatRequest, CompletionService, OpenAiClient};
pub use error::{CompletionError, ExtractionError, InvexError, PdfError, Result};
pub use extract::{InvoiceExtractor, ProcessedInvoice};
pub use locate::{FieldMatch, LineMatch, LocatedValue, PageMatch, locate};
pub use models::{ExtractedInvoice, InvexConfig};
pub use pdf::{PageIndex, PageSearch, PdfDocument, Region};
