//! Tables from a lattice-mode table extractor's JSON dump.
//!
//! The dump is a JSON array with one object per detected table:
//!
//! ```json
//! [{"extraction_method": "lattice", "page_number": 1,
//!   "data": [[{"text": "CÓDIGO\rDE VENDAS"}, {"text": "PREÇO"}],
//!            [{"text": "1TR48"}, {"text": "119.990"}]]}]
//! ```
//!
//! The first row of each table is its header. Header cells the extractor
//! left empty are named `Unnamed: <n>` so the classifier drops them.

use price_sheet_models::RawTable;
use serde::Deserialize;
use strum_macros::{AsRefStr, Display, EnumString};

use crate::{DocumentRef, PdfError, TableSource};

/// Table detection strategy the extractor used.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Display, EnumString, AsRefStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum ExtractionMode {
    /// Tables bounded by ruling lines.
    #[serde(alias = "spreadsheet")]
    Lattice,
    /// Tables inferred from whitespace alignment.
    Stream,
}

#[derive(Debug, Deserialize)]
struct DumpTable {
    extraction_method: ExtractionMode,
    #[serde(default)]
    page_number: Option<u32>,
    #[serde(default)]
    data: Vec<Vec<DumpCell>>,
}

#[derive(Debug, Deserialize)]
struct DumpCell {
    #[serde(default)]
    text: String,
}

/// [`TableSource`] reading a JSON table dump.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TabulaJsonSource {
    mode: ExtractionMode,
}

impl Default for TabulaJsonSource {
    fn default() -> Self {
        Self::new(ExtractionMode::Lattice)
    }
}

impl TabulaJsonSource {
    /// Creates a source keeping only tables detected with `mode`.
    #[must_use]
    pub const fn new(mode: ExtractionMode) -> Self {
        Self { mode }
    }

    #[must_use]
    pub const fn mode(&self) -> ExtractionMode {
        self.mode
    }

    /// Decodes a JSON dump.
    ///
    /// # Errors
    ///
    /// Returns [`PdfError::Json`] if `bytes` is not a valid dump.
    pub fn parse(&self, bytes: &[u8]) -> Result<Vec<RawTable>, PdfError> {
        let dump: Vec<DumpTable> = serde_json::from_slice(bytes)?;
        let total = dump.len();

        let tables: Vec<RawTable> = dump
            .into_iter()
            .filter(|t| {
                let keep = t.extraction_method == self.mode;
                if !keep {
                    log::debug!(
                        "Skipping {} table on page {:?}",
                        t.extraction_method,
                        t.page_number
                    );
                }
                keep
            })
            .map(into_raw_table)
            .collect();

        log::debug!(
            "Decoded {} of {total} tables in {} mode",
            tables.len(),
            self.mode
        );

        Ok(tables)
    }
}

fn into_raw_table(table: DumpTable) -> RawTable {
    let mut rows = table
        .data
        .into_iter()
        .map(|row| row.into_iter().map(|cell| cell.text).collect::<Vec<_>>());

    let headers = rows
        .next()
        .unwrap_or_default()
        .into_iter()
        .enumerate()
        .map(|(i, h)| {
            if h.trim().is_empty() {
                format!("Unnamed: {i}")
            } else {
                h
            }
        })
        .collect();

    RawTable::new(headers, rows.collect())
}

impl TableSource for TabulaJsonSource {
    fn tables(&self, document: &DocumentRef) -> Result<Vec<RawTable>, PdfError> {
        let bytes = document.read()?;
        self.parse(&bytes)
    }
}
