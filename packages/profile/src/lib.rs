#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Config-driven vendor price sheet profiles.
//!
//! A [`ProfileDefinition`] captures everything vendor-specific about a price
//! sheet (section names, anchor strings, fuel vocabulary, extraction
//! pattern) in a TOML file. The generic algorithms in `price_sheet_tables`
//! and `price_sheet_text` are bound to these values at construction, so
//! supporting a new vendor means writing a new TOML file.

pub mod registry;

use price_sheet_models::{ColumnRef, RowRef};
use price_sheet_pdf::ExtractionMode;
use price_sheet_tables::ClassifierConfig;
use price_sheet_text::{EnrichmentConfig, ParserConfig};
use serde::Deserialize;

pub use registry::{all_profiles, find_profile};

/// Errors raised while loading a profile.
#[derive(Debug, thiserror::Error)]
pub enum ProfileError {
    /// The TOML config could not be parsed.
    #[error("Invalid profile TOML: {0}")]
    Parse(#[from] toml::de::Error),

    /// No embedded profile has the requested id.
    #[error("Unknown profile: {0}")]
    Unknown(String),
}

/// A complete vendor price sheet definition.
#[derive(Debug, Clone, Deserialize)]
pub struct ProfileDefinition {
    /// Unique identifier (e.g., `"jeep"`).
    pub id: String,
    /// Human-readable name.
    pub name: String,
    /// Brand attached to every record recovered with this profile.
    pub brand: String,
    /// How the document is laid out and which algorithm reads it.
    pub layout: LayoutConfig,
}

/// Layout-specific settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum LayoutConfig {
    /// Bordered tables read through a table extractor.
    Tables {
        /// Table detection mode to keep from the extractor's dump.
        #[serde(default = "default_mode")]
        mode: ExtractionMode,
        /// Similarity threshold for cell lookups.
        #[serde(default = "default_threshold")]
        threshold: u8,
        #[serde(default)]
        classifier: ClassifierConfig,
        /// Named lookups run against every classified document.
        #[serde(default)]
        queries: Vec<CellQuery>,
        /// Header of the column that identifies a vehicle row. When set,
        /// every table carrying it is exported keyed by that column.
        #[serde(default)]
        record_key: Option<String>,
    },
    /// Free text read line by line.
    Text {
        #[serde(default)]
        parser: ParserConfig,
        #[serde(default)]
        enrichment: EnrichmentConfig,
    },
}

const fn default_mode() -> ExtractionMode {
    ExtractionMode::Lattice
}

const fn default_threshold() -> u8 {
    price_sheet_fuzzy::DEFAULT_THRESHOLD
}

/// A named cell lookup declared in a profile.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CellQuery {
    pub label: String,
    pub group: String,
    pub table: usize,
    pub column: ColumnRef,
    pub row: RowRef,
}

impl ProfileDefinition {
    /// Parser settings with this profile's brand applied, for text layouts.
    #[must_use]
    pub fn parser_config(&self) -> Option<ParserConfig> {
        match &self.layout {
            LayoutConfig::Text { parser, .. } => Some(ParserConfig {
                brand: self.brand.clone(),
                ..parser.clone()
            }),
            LayoutConfig::Tables { .. } => None,
        }
    }

    /// Enrichment settings, for text layouts.
    #[must_use]
    pub fn enrichment_config(&self) -> Option<&EnrichmentConfig> {
        match &self.layout {
            LayoutConfig::Text { enrichment, .. } => Some(enrichment),
            LayoutConfig::Tables { .. } => None,
        }
    }

    /// Classifier settings, for table layouts.
    #[must_use]
    pub fn classifier_config(&self) -> Option<&ClassifierConfig> {
        match &self.layout {
            LayoutConfig::Tables { classifier, .. } => Some(classifier),
            LayoutConfig::Text { .. } => None,
        }
    }

    /// Layout kind as shown in listings.
    #[must_use]
    pub const fn layout_name(&self) -> &'static str {
        match self.layout {
            LayoutConfig::Tables { .. } => "tables",
            LayoutConfig::Text { .. } => "text",
        }
    }
}

/// Parses a profile definition from a TOML string.
///
/// # Errors
///
/// Returns [`ProfileError::Parse`] if the TOML is invalid or does not match
/// the expected schema.
pub fn parse_profile_toml(toml_str: &str) -> Result<ProfileDefinition, ProfileError> {
    Ok(toml::de::from_str(toml_str)?)
}
