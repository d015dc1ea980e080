//! PDF processing: document handle, whole-document text, page search.

pub mod layout;
pub mod search;

pub use layout::TextLine;
pub use search::Region;

use lopdf::{Document, ObjectId};
use tracing::debug;

use crate::error::PdfError;
use crate::models::PdfConfig;

/// Result type for PDF operations.
pub type Result<T> = std::result::Result<T, PdfError>;

/// A page-enumerate-and-search capability.
///
/// The coordinate locator accepts any implementation; [`PageIndex`] is the
/// real one, tests use stand-ins.
pub trait PageSearch {
    /// Number of pages.
    fn page_count(&self) -> u32;

    /// Find a literal string on a page (1-indexed).
    fn search(&self, page: u32, needle: &str) -> Result<Vec<Region>>;
}

/// An opened PDF document.
///
/// Owns the parsed structure and the raw bytes; both are released when the
/// handle drops, on every exit path.
#[derive(Debug)]
pub struct PdfDocument {
    document: Document,
    raw_data: Vec<u8>,
    page_ids: Vec<ObjectId>,
}

impl PdfDocument {
    /// Open a PDF from a file path.
    pub fn open(path: &std::path::Path) -> Result<Self> {
        let data = std::fs::read(path).map_err(|e| PdfError::Parse(e.to_string()))?;
        Self::from_bytes(data)
    }

    /// Open a PDF from raw bytes.
    pub fn from_bytes(data: Vec<u8>) -> Result<Self> {
        let document = Document::load_mem(&data).map_err(|e| PdfError::Parse(e.to_string()))?;

        let page_ids: Vec<ObjectId> = document.get_pages().into_values().collect();
        if page_ids.is_empty() {
            return Err(PdfError::NoPages);
        }

        debug!(pages = page_ids.len(), "Loaded PDF");
        Ok(Self {
            document,
            raw_data: data,
            page_ids,
        })
    }

    /// Number of pages.
    pub fn page_count(&self) -> u32 {
        self.page_ids.len() as u32
    }

    /// Extract the document's text, all pages concatenated with no
    /// page-boundary marker. This is what the completion service sees in
    /// text mode.
    pub fn extract_text(&self) -> Result<String> {
        pdf_extract::extract_text_from_mem(&self.raw_data)
            .map_err(|e| PdfError::TextExtraction(e.to_string()))
    }

    /// Build the positioned-line index used for coordinate search.
    pub fn page_index(&self, config: &PdfConfig) -> Result<PageIndex> {
        let mut pages = Vec::with_capacity(self.page_ids.len());
        for (idx, page_id) in self.page_ids.iter().enumerate() {
            let lines = layout::extract_page_lines(&self.document, *page_id, config)?;
            debug!(page = idx + 1, lines = lines.len(), "Indexed page");
            pages.push(lines);
        }
        Ok(PageIndex { pages })
    }
}

/// Positioned lines for every page of a document, in page order.
#[derive(Debug)]
pub struct PageIndex {
    pages: Vec<Vec<TextLine>>,
}

impl PageIndex {
    /// Build an index directly from per-page lines.
    pub fn from_pages(pages: Vec<Vec<TextLine>>) -> Self {
        Self { pages }
    }
}

impl PageSearch for PageIndex {
    fn page_count(&self) -> u32 {
        self.pages.len() as u32
    }

    fn search(&self, page: u32, needle: &str) -> Result<Vec<Region>> {
        let lines = self
            .pages
            .get(page.checked_sub(1).ok_or(PdfError::InvalidPage(page))? as usize)
            .ok_or(PdfError::InvalidPage(page))?;
        Ok(search::search_lines(lines, needle))
    }
}
