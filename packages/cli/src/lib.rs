#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Glue between embedded profiles, extraction sources, and the recovery
//! algorithms, plus the JSON export shapes printed by the `price_sheet`
//! binary.

use std::collections::BTreeMap;

use price_sheet_models::{ColumnRef, GroupMap, RecordList, RowRef};
use price_sheet_pdf::{DocumentRef, PdfError, TableSource, TabulaJsonSource, TextSource};
use price_sheet_profile::{LayoutConfig, ProfileDefinition, ProfileError};
use price_sheet_tables::{CellLocator, KeyedRows, classify};
use price_sheet_text::{Enricher, TextError, parse_records};
use serde::Serialize;

/// Errors surfaced by the command-line tool.
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    #[error(transparent)]
    Pdf(#[from] PdfError),

    #[error(transparent)]
    Profile(#[from] ProfileError),

    #[error(transparent)]
    Text(#[from] TextError),

    /// The chosen profile does not describe the layout the command reads.
    #[error("Profile '{profile}' has a {actual} layout, expected {expected}")]
    Layout {
        profile: String,
        expected: &'static str,
        actual: &'static str,
    },

    /// Command-line arguments that clap cannot validate on its own.
    #[error("Invalid arguments: {0}")]
    Usage(String),
}

/// Export shape of a classified tabular document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TablesReport {
    /// Group name → tables → rows keyed by header.
    pub groups: BTreeMap<String, Vec<Vec<BTreeMap<String, String>>>>,
    /// Profile query label → resolved cell, `null` when not found.
    pub queries: BTreeMap<String, Option<String>>,
    /// Identifying cell → remaining columns, for profiles declaring a
    /// record key column.
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub records: KeyedRows,
}

impl TablesReport {
    #[must_use]
    pub fn from_groups(groups: &GroupMap) -> Self {
        Self {
            groups: groups
                .iter()
                .map(|g| {
                    (
                        g.name.clone(),
                        g.tables.iter().map(|t| t.row_maps()).collect(),
                    )
                })
                .collect(),
            queries: BTreeMap::new(),
            records: KeyedRows::new(),
        }
    }
}

/// Interprets a `--column` argument: a number is an index, anything else a
/// header name.
#[must_use]
pub fn parse_column_ref(value: &str) -> ColumnRef {
    value
        .trim()
        .parse::<usize>()
        .map_or_else(|_| ColumnRef::ByName(value.to_owned()), ColumnRef::ByIndex)
}

/// Builds a row reference from either `--row` or the anchor pair.
///
/// # Errors
///
/// Returns [`CliError::Usage`] unless exactly one form is complete.
pub fn row_ref(
    row: Option<usize>,
    anchor_column: Option<usize>,
    anchor_text: Option<String>,
) -> Result<RowRef, CliError> {
    match (row, anchor_column, anchor_text) {
        (Some(index), None, None) => Ok(RowRef::ByIndex(index)),
        (None, Some(column), Some(text)) => Ok(RowRef::ByAnchor { column, text }),
        _ => Err(CliError::Usage(
            "give either --row or both --anchor-column and --anchor-text".to_owned(),
        )),
    }
}

fn layout_error(profile: &ProfileDefinition, expected: &'static str) -> CliError {
    CliError::Layout {
        profile: profile.id.clone(),
        expected,
        actual: profile.layout_name(),
    }
}

/// Classifies the tables of `document` and runs the profile's queries.
///
/// # Errors
///
/// Returns [`CliError`] if the profile is not a table layout or the
/// document cannot be read.
pub fn extract_tables(
    profile: &ProfileDefinition,
    source: &impl TableSource,
    document: &DocumentRef,
) -> Result<(GroupMap, TablesReport), CliError> {
    let LayoutConfig::Tables {
        threshold,
        classifier,
        queries,
        record_key,
        ..
    } = &profile.layout
    else {
        return Err(layout_error(profile, "tables"));
    };

    let tables = source.tables(document)?;
    log::info!("[{}] {} tables extracted", profile.id, tables.len());

    let groups = classify(tables, classifier);
    let locator = CellLocator::new(*threshold);

    let mut report = TablesReport::from_groups(&groups);
    for query in queries {
        let value = locator
            .resolve(&groups, &query.group, query.table, &query.column, &query.row)
            .map(ToOwned::to_owned);
        if value.is_none() {
            log::info!("[{}] query '{}' not found", profile.id, query.label);
        }
        report.queries.insert(query.label.clone(), value);
    }
    if let Some(key_column) = record_key {
        report.records = locator.keyed_rows(&groups, key_column);
    }

    Ok((groups, report))
}

/// Parses and enriches the vehicle records of `document`.
///
/// # Errors
///
/// Returns [`CliError`] if the profile is not a text layout, its extraction
/// pattern is invalid, or the document cannot be read.
pub fn extract_records(
    profile: &ProfileDefinition,
    source: &impl TextSource,
    document: &DocumentRef,
) -> Result<RecordList, CliError> {
    let (Some(parser), Some(enrichment)) = (profile.parser_config(), profile.enrichment_config())
    else {
        return Err(layout_error(profile, "text"));
    };
    let enricher = Enricher::new(enrichment.clone())?;

    let pages = source.pages(document)?;

    let mut records = parse_records(&pages, &parser);
    enricher.enrich(&mut records, &pages);

    let incomplete = records.iter().filter(|r| !r.is_complete()).count();
    log::info!(
        "[{}] {} records ({incomplete} incomplete)",
        profile.id,
        records.len()
    );

    Ok(records)
}
