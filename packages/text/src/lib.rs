#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Record recovery from free-text price sheets.
//!
//! Some vendors publish price lists whose extracted text has no table
//! structure at all. Records are recovered in two scans over the page
//! lines:
//!
//! 1. [`parser`] finds the listing region between a column-header line and
//!    a footer line and turns each line into a [`VehicleRecord`] keyed by
//!    the model name.
//! 2. [`enrich`] walks the detail pages that follow, locates each model's
//!    block by name, and back-fills attributes such as the power rating.
//!
//! [`VehicleRecord`]: price_sheet_models::VehicleRecord

pub mod enrich;
pub mod parser;

pub use enrich::{EnrichmentConfig, Enricher};
pub use parser::{ParserConfig, RecordParser, parse_records};

/// Errors raised while setting up a text scan.
#[derive(Debug, thiserror::Error)]
pub enum TextError {
    /// The configured extraction pattern failed to compile.
    #[error("Invalid extraction pattern: {0}")]
    Pattern(#[from] regex::Error),
}

/// Footer printed under every listing page of the reference price sheet.
pub const DEFAULT_FOOTER_ANCHOR: &str = "Tabela temporária e provisória, sujeita a modificações \
    diárias. Para uso exclusivo e simples consulta por parte do profissional vendedor, não \
    gerando obrigações de venda pelos valores meramente indicativos.";
