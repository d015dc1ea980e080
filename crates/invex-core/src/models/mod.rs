//! Data models: extraction schema, invoice object, configuration.

pub mod config;
pub mod invoice;
pub mod schema;

pub use config::{CompletionConfig, InvexConfig, PdfConfig};
pub use invoice::ExtractedInvoice;
