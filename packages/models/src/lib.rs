#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Shared types for vendor price sheet extraction.
//!
//! Tabular documents arrive as a flat sequence of [`RawTable`]s which are
//! classified into a [`GroupMap`]. Free-text documents arrive as a sequence
//! of [`TextPage`]s which are scanned into a [`RecordList`] of
//! [`VehicleRecord`]s.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

/// Field holding the first token of a record's composite description.
pub const LINE_FIELD: &str = "line";

/// Field holding everything after the first token of a record's composite
/// description.
pub const DESCRIPTION_FIELD: &str = "description";

/// Field holding the vendor brand attached to every parsed record.
pub const BRAND_FIELD: &str = "brand";

// ── Tables ───────────────────────────────────────────────────────────────

/// A single table as produced by the table extraction collaborator.
///
/// Rows may be ragged; a missing cell reads as absent rather than empty.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawTable {
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl RawTable {
    /// Creates a table from its header row and body rows.
    #[must_use]
    pub const fn new(headers: Vec<String>, rows: Vec<Vec<String>>) -> Self {
        Self { headers, rows }
    }

    /// Column headers in document order.
    #[must_use]
    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    /// Body rows in document order.
    #[must_use]
    pub fn rows(&self) -> &[Vec<String>] {
        &self.rows
    }

    #[must_use]
    pub const fn column_count(&self) -> usize {
        self.headers.len()
    }

    #[must_use]
    pub const fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Returns the cell at `(row, column)`, or `None` when either index is
    /// out of range.
    #[must_use]
    pub fn cell(&self, row: usize, column: usize) -> Option<&str> {
        self.rows.get(row)?.get(column).map(String::as_str)
    }

    /// Converts every body row into a `header → value` map.
    ///
    /// Cells beyond the header count are ignored.
    #[must_use]
    pub fn row_maps(&self) -> Vec<BTreeMap<String, String>> {
        self.rows
            .iter()
            .map(|row| {
                self.headers
                    .iter()
                    .zip(row)
                    .map(|(header, value)| (header.clone(), value.clone()))
                    .collect()
            })
            .collect()
    }

    /// Splits the table back into its header row and body rows.
    #[must_use]
    pub fn into_parts(self) -> (Vec<String>, Vec<Vec<String>>) {
        (self.headers, self.rows)
    }
}

/// A named section of a tabular document and the tables filed into it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableGroup {
    pub name: String,
    pub tables: Vec<RawTable>,
}

/// The classifier's output: every group name mapped to its ordered tables.
///
/// Groups keep the order in which they were declared or first filed into.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupMap {
    groups: Vec<TableGroup>,
}

impl GroupMap {
    /// Creates a map holding an empty group for each of `names`.
    #[must_use]
    pub fn with_groups<S: AsRef<str>>(names: &[S]) -> Self {
        let mut map = Self::default();
        for name in names {
            map.ensure_group(name.as_ref());
        }
        map
    }

    /// Appends `table` to the group called `name`, creating the group if it
    /// does not exist yet.
    pub fn file(&mut self, name: &str, table: RawTable) {
        self.ensure_group(name).tables.push(table);
    }

    fn ensure_group(&mut self, name: &str) -> &mut TableGroup {
        let idx = if let Some(idx) = self.groups.iter().position(|g| g.name == name) {
            idx
        } else {
            self.groups.push(TableGroup {
                name: name.to_owned(),
                tables: Vec::new(),
            });
            self.groups.len() - 1
        };
        &mut self.groups[idx]
    }

    /// Returns the group called `name`.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&TableGroup> {
        self.groups.iter().find(|g| g.name == name)
    }

    /// Returns the tables filed under `name`.
    #[must_use]
    pub fn tables(&self, name: &str) -> Option<&[RawTable]> {
        self.get(name).map(|g| g.tables.as_slice())
    }

    /// Iterates over every group in order.
    pub fn iter(&self) -> impl Iterator<Item = &TableGroup> {
        self.groups.iter()
    }

    /// Group names in order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.groups.iter().map(|g| g.name.as_str())
    }

    /// Total number of tables across all groups.
    #[must_use]
    pub fn table_count(&self) -> usize {
        self.groups.iter().map(|g| g.tables.len()).sum()
    }
}

/// How a cell query addresses a column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColumnRef {
    /// Zero-based column index, used as-is.
    ByIndex(usize),
    /// Header text resolved by fuzzy matching.
    ByName(String),
}

/// How a cell query addresses a row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RowRef {
    /// Zero-based body row index.
    ByIndex(usize),
    /// The row whose cell in `column` best matches `text`.
    ByAnchor { column: usize, text: String },
}

// ── Text ─────────────────────────────────────────────────────────────────

/// The extracted text lines of one document page, in reading order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextPage {
    lines: Vec<String>,
}

impl TextPage {
    #[must_use]
    pub const fn new(lines: Vec<String>) -> Self {
        Self { lines }
    }

    /// Splits raw page text into lines, dropping trailing carriage returns.
    #[must_use]
    pub fn from_text(text: &str) -> Self {
        Self {
            lines: text.lines().map(ToOwned::to_owned).collect(),
        }
    }

    pub fn lines(&self) -> impl Iterator<Item = &str> {
        self.lines.iter().map(String::as_str)
    }
}

/// State of the line scanner that recognizes record regions.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum ParserState {
    /// Waiting for a line that looks like the column header.
    #[default]
    SeekingHeader,
    /// Inside a record region; each line is a candidate record.
    ReadingRecords,
}

/// A vehicle recovered from a free-text price list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VehicleRecord {
    key: String,
    name: String,
    fields: BTreeMap<String, String>,
    complete: bool,
}

impl VehicleRecord {
    /// Creates a record whose model name doubles as its key.
    #[must_use]
    pub fn new(name: String, fields: BTreeMap<String, String>, complete: bool) -> Self {
        Self {
            key: name.clone(),
            name,
            fields,
            complete,
        }
    }

    /// Replaces the key, leaving the model name untouched.
    #[must_use]
    pub fn with_key(mut self, key: impl Into<String>) -> Self {
        self.key = key.into();
        self
    }

    /// Unique identifier within a [`RecordList`].
    #[must_use]
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Model name as printed in the listing; detail headings repeat it.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub const fn fields(&self) -> &BTreeMap<String, String> {
        &self.fields
    }

    #[must_use]
    pub fn field(&self, name: &str) -> Option<&str> {
        self.fields.get(name).map(String::as_str)
    }

    /// Sets `name` to `value`, replacing any previous value.
    pub fn set_field(&mut self, name: &str, value: impl Into<String>) {
        self.fields.insert(name.to_owned(), value.into());
    }

    /// Whether the source line carried every declared column.
    ///
    /// A line without a fuel token folds all trailing tokens into the name
    /// and leaves the columns after it unset.
    #[must_use]
    pub const fn is_complete(&self) -> bool {
        self.complete
    }
}

/// Records in creation order, addressable by key.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordList {
    records: Vec<VehicleRecord>,
}

impl RecordList {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            records: Vec::new(),
        }
    }

    /// Adds `record`, or replaces the fields of an existing record with the
    /// same key while keeping its position.
    ///
    /// Returns `true` when a new record was created.
    pub fn upsert(&mut self, record: VehicleRecord) -> bool {
        if let Some(existing) = self.records.iter_mut().find(|r| r.key == record.key) {
            existing.name = record.name;
            existing.fields = record.fields;
            existing.complete = record.complete;
            false
        } else {
            self.records.push(record);
            true
        }
    }

    #[must_use]
    pub fn get(&self, key: &str) -> Option<&VehicleRecord> {
        self.records.iter().find(|r| r.key == key)
    }

    pub fn get_mut(&mut self, key: &str) -> Option<&mut VehicleRecord> {
        self.records.iter_mut().find(|r| r.key == key)
    }

    /// Keys in creation order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.records.iter().map(|r| r.key.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = &VehicleRecord> {
        self.records.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut VehicleRecord> {
        self.records.iter_mut()
    }

    #[must_use]
    pub const fn len(&self) -> usize {
        self.records.len()
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Converts the list into its export shape, `key → field map`.
    #[must_use]
    pub fn to_field_maps(&self) -> BTreeMap<String, BTreeMap<String, String>> {
        self.records
            .iter()
            .map(|r| (r.key.clone(), r.fields.clone()))
            .collect()
    }
}
