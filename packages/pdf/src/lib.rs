#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Document acquisition and extraction sources for vendor price sheets.
//!
//! The recovery algorithms in `price_sheet_tables` and `price_sheet_text`
//! never touch documents directly. They consume the output of two
//! collaborators defined here:
//!
//! - a [`TextSource`] yielding one [`TextPage`] per page, backed by
//!   pure-Rust text extraction ([`pdf_extract`]) in [`PdfTextSource`];
//! - a [`TableSource`] yielding a flat list of [`RawTable`]s, backed by the
//!   JSON table dump of a lattice-mode table extractor in
//!   [`tabula::TabulaJsonSource`].
//!
//! Both take a [`DocumentRef`], which is either a path or an in-memory
//! buffer, never both.

pub mod document;
pub mod tabula;

pub use document::DocumentRef;
pub use tabula::{ExtractionMode, TabulaJsonSource};

use price_sheet_models::{RawTable, TextPage};

/// Errors raised while acquiring or extracting a document.
#[derive(Debug, thiserror::Error)]
pub enum PdfError {
    /// The caller supplied both a path and a byte buffer, or neither.
    #[error("Invalid document reference: {0}")]
    DocumentRef(String),

    /// PDF text extraction failed.
    #[error("PDF extraction error: {0}")]
    Extraction(String),

    /// The table dump could not be decoded.
    #[error("Invalid table JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// An I/O operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Produces the page-ordered text lines of a document.
pub trait TextSource {
    /// Extracts every page of `document`.
    ///
    /// # Errors
    ///
    /// Returns [`PdfError`] if the document cannot be read or decoded.
    fn pages(&self, document: &DocumentRef) -> Result<Vec<TextPage>, PdfError>;
}

/// Produces the page-ordered tables of a document.
pub trait TableSource {
    /// Extracts every table of `document`.
    ///
    /// # Errors
    ///
    /// Returns [`PdfError`] if the document cannot be read or decoded.
    fn tables(&self, document: &DocumentRef) -> Result<Vec<RawTable>, PdfError>;
}

/// [`TextSource`] backed by [`pdf_extract`].
#[derive(Debug, Clone, Copy, Default)]
pub struct PdfTextSource;

impl TextSource for PdfTextSource {
    fn pages(&self, document: &DocumentRef) -> Result<Vec<TextPage>, PdfError> {
        let bytes = document.read()?;

        log::debug!("Read {} bytes from {document}", bytes.len());

        let pages = pdf_extract::extract_text_from_mem_by_pages(&bytes)
            .map_err(|e| PdfError::Extraction(format!("failed to extract text from PDF: {e}")))?;

        log::debug!("Extracted {} pages of text from {document}", pages.len());

        Ok(pages.iter().map(|text| TextPage::from_text(text)).collect())
    }
}
