//! Groups a flat table sequence into named document sections.
//!
//! A price sheet section usually spans several pages, and the extractor
//! emits one table per page. Consecutive tables with the same column
//! signature belong to the same section; a change in signature starts the
//! next one.

use std::collections::BTreeSet;

use price_sheet_models::{GroupMap, RawTable};
use serde::Deserialize;

use crate::sanitize::sanitize;

/// Immutable settings for a classification run.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ClassifierConfig {
    /// Section names in document order.
    pub group_names: Vec<String>,
    /// Name prefix for slots past the end of `group_names`. The slot index
    /// is appended (e.g. `Group 4`).
    pub anonymous_prefix: String,
    /// Header title of the known single-column layout.
    pub single_column_anchor: String,
    /// Group receiving single-column tables that match the anchor.
    pub single_column_group: String,
    /// Minimum similarity between a single-column header and the anchor.
    pub single_column_threshold: u8,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            group_names: ["Introduction", "Configuration", "Specification", "Accessories"]
                .map(ToOwned::to_owned)
                .to_vec(),
            anonymous_prefix: "Group ".to_owned(),
            single_column_anchor: "TRACKER - ANO/MODELO 2024".to_owned(),
            single_column_group: "Models".to_owned(),
            single_column_threshold: 50,
        }
    }
}

impl ClassifierConfig {
    /// Name of the section at `slot`, synthesizing one for slots past the
    /// declared names.
    #[must_use]
    pub fn slot_name(&self, slot: usize) -> String {
        self.group_names
            .get(slot)
            .cloned()
            .unwrap_or_else(|| format!("{}{slot}", self.anonymous_prefix))
    }
}

/// Column count plus the order-insensitive set of column names.
#[derive(Debug, Clone, PartialEq, Eq)]
struct ColumnSignature {
    count: usize,
    names: BTreeSet<String>,
}

impl ColumnSignature {
    fn of(table: &RawTable) -> Self {
        Self {
            count: table.column_count(),
            names: table.headers().iter().cloned().collect(),
        }
    }
}

/// Position of the classifier within the section list.
#[derive(Debug, Default)]
struct Cursor {
    slot: usize,
    /// Signature of the last table filed into `slot`.
    last: Option<ColumnSignature>,
}

impl Cursor {
    /// Returns the slot `signature` belongs to, advancing past the current
    /// slot when it already holds a table with a different signature.
    fn place(&mut self, signature: ColumnSignature) -> usize {
        if self.last.as_ref().is_some_and(|last| *last != signature) {
            self.slot += 1;
        }
        self.last = Some(signature);
        self.slot
    }
}

/// Classifies `tables` into sections.
///
/// Every declared group and the single-column group are present in the
/// result even when empty. The output depends only on table order and
/// header signatures.
#[must_use]
pub fn classify<I>(tables: I, config: &ClassifierConfig) -> GroupMap
where
    I: IntoIterator<Item = RawTable>,
{
    let mut declared = config.group_names.clone();
    declared.push(config.single_column_group.clone());
    let mut groups = GroupMap::with_groups(&declared);

    let mut cursor = Cursor::default();

    for (position, table) in tables.into_iter().enumerate() {
        let Some(table) = sanitize(table) else {
            log::debug!("Discarding table {position}: no body rows");
            continue;
        };

        match table.column_count() {
            0 => {
                log::debug!("Discarding table {position}: every column is a placeholder");
            }
            1 => {
                let score =
                    price_sheet_fuzzy::ratio(&table.headers()[0], &config.single_column_anchor);
                if score >= config.single_column_threshold {
                    log::debug!(
                        "Filing single-column table {position} into '{}' (score {score})",
                        config.single_column_group
                    );
                    groups.file(&config.single_column_group, table);
                } else {
                    log::debug!(
                        "Discarding single-column table {position} '{}' (score {score})",
                        table.headers()[0]
                    );
                }
            }
            _ => {
                let previous = cursor.slot;
                let slot = cursor.place(ColumnSignature::of(&table));
                let name = config.slot_name(slot);
                if slot != previous {
                    log::debug!("Table {position} starts section '{name}'");
                }
                log::debug!(
                    "Filing table {position} ({} columns, {} rows) into '{name}'",
                    table.column_count(),
                    table.row_count()
                );
                groups.file(&name, table);
            }
        }
    }

    log::info!(
        "Classified {} tables into {} sections",
        groups.table_count(),
        cursor.slot + 1
    );

    groups
}
