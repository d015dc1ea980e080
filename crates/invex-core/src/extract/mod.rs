//! The extraction driver: builds completion requests and runs the full
//! PDF/image pipelines.

use std::path::Path;

use serde::Serialize;
use tracing::{debug, info};

use crate::completion::{ChatRequest, CompletionService, ContentPart, ImageUrl, prompt};
use crate::error::{InvexError, Result};
use crate::locate::{self, PageMatch};
use crate::models::{ExtractedInvoice, InvexConfig};
use crate::pdf::PdfDocument;

/// Result of the PDF path: the extracted invoice plus where each value was
/// found, page by page.
#[derive(Debug, Serialize)]
pub struct ProcessedInvoice {
    /// The parsed extraction result.
    pub invoice: ExtractedInvoice,
    /// Per-page match records, one per PDF page.
    pub pages: Vec<PageMatch>,
}

/// Drives the completion service with the extraction instruction and runs
/// the coordinate locator over the source document.
///
/// Request-scoped and stateless between calls: one outbound completion call
/// plus one page scan per invocation, no retries, no caching.
#[derive(Debug)]
pub struct InvoiceExtractor<C> {
    service: C,
    config: InvexConfig,
}

impl<C: CompletionService> InvoiceExtractor<C> {
    /// Build an extractor over a completion service.
    pub fn new(service: C, config: InvexConfig) -> Self {
        Self { service, config }
    }

    /// Run the extraction instruction against raw invoice text.
    ///
    /// Returns the completion service's raw response; no JSON validation
    /// happens at this layer.
    pub async fn extract_from_text(&self, text: &str) -> Result<String> {
        if text.trim().is_empty() {
            return Err(InvexError::InvalidInput("no text provided".to_string()));
        }

        let instruction = prompt::build_instruction(Some(text));
        let request = ChatRequest::text(
            &self.config.completion.text_model,
            instruction,
            self.config.completion.temperature,
        );
        Ok(self.service.complete(request).await?)
    }

    /// Run the extraction instruction against a set of invoice images.
    ///
    /// The instruction goes first, followed by one image part per reference,
    /// in the given order.
    pub async fn extract_from_images(&self, image_urls: &[String]) -> Result<String> {
        if image_urls.is_empty() {
            return Err(InvexError::InvalidInput(
                "no image URLs provided".to_string(),
            ));
        }

        let mut parts = Vec::with_capacity(image_urls.len() + 1);
        parts.push(ContentPart::Text {
            text: prompt::build_instruction(None),
        });
        for url in image_urls {
            parts.push(ContentPart::ImageUrl {
                image_url: ImageUrl { url: url.clone() },
            });
        }

        let request = ChatRequest::parts(
            &self.config.completion.vision_model,
            parts,
            self.config.completion.temperature,
        );
        Ok(self.service.complete(request).await?)
    }

    /// Full PDF path: extract the document's text, map it to invoice fields
    /// through the completion service, then locate every field value in the
    /// page geometry.
    pub async fn process_pdf(&self, path: &Path) -> Result<ProcessedInvoice> {
        if path.as_os_str().is_empty() {
            return Err(InvexError::InvalidInput("no PDF path provided".to_string()));
        }
        if !path.exists() {
            return Err(InvexError::InvalidInput(format!(
                "PDF not found: {}",
                path.display()
            )));
        }

        let document = PdfDocument::open(path)?;
        let text = document.extract_text()?;
        debug!(chars = text.len(), "Extracted PDF text");

        let raw = self.extract_from_text(&text).await?;
        let invoice = ExtractedInvoice::from_completion(&raw)?;
        info!(fields = invoice.len(), "Parsed extraction result");

        let index = document.page_index(&self.config.pdf)?;
        let pages = locate::locate(&invoice, &index)?;

        Ok(ProcessedInvoice { invoice, pages })
    }

    /// Image path: map the referenced images to invoice fields. No geometry
    /// is produced; there is no PDF to reconcile against.
    pub async fn process_images(&self, image_urls: &[String]) -> Result<ExtractedInvoice> {
        let raw = self.extract_from_images(image_urls).await?;
        let invoice = ExtractedInvoice::from_completion(&raw)?;
        info!(fields = invoice.len(), "Parsed extraction result");
        Ok(invoice)
    }
}
