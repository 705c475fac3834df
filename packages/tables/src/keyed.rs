//! Rows flattened into a map keyed by an identifying column.
//!
//! Listing sections carry one vehicle per row with a code column such as
//! `"CÓDIGO DE VENDAS"`. Every classified table whose header matches that
//! column contributes its rows as `code → remaining columns`, regardless of
//! the section it was filed under.

use std::collections::BTreeMap;

use price_sheet_models::{ColumnRef, GroupMap};

use crate::CellLocator;

/// Row value maps keyed by the identifying cell.
pub type KeyedRows = BTreeMap<String, BTreeMap<String, String>>;

impl CellLocator {
    /// Collects the rows of every table with a header matching
    /// `key_column`.
    ///
    /// Rows with an empty key cell are skipped. A key listed again replaces
    /// the earlier row.
    #[must_use]
    pub fn keyed_rows(&self, groups: &GroupMap, key_column: &str) -> KeyedRows {
        let column = ColumnRef::ByName(key_column.to_owned());
        let mut keyed = KeyedRows::new();
        let mut tables = 0_usize;

        for group in groups.iter() {
            for table in &group.tables {
                let Some(key_index) = self.resolve_column(table, &column) else {
                    continue;
                };
                tables += 1;

                for row in table.rows() {
                    let Some(key) = row
                        .get(key_index)
                        .map(|k| k.trim())
                        .filter(|k| !k.is_empty())
                    else {
                        continue;
                    };

                    let values = table
                        .headers()
                        .iter()
                        .zip(row)
                        .enumerate()
                        .filter(|(i, _)| *i != key_index)
                        .map(|(_, (header, value))| (header.clone(), value.clone()))
                        .collect();

                    if keyed.insert(key.to_owned(), values).is_some() {
                        log::debug!(
                            "Key '{key}' listed again in '{}'; keeping the latest row",
                            group.name
                        );
                    }
                }
            }
        }

        log::info!(
            "Keyed {} rows by '{key_column}' from {tables} tables",
            keyed.len()
        );
        keyed
    }
}

#[cfg(test)]
mod tests {
    use price_sheet_models::RawTable;

    use super::*;

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| (*s).to_owned()).collect()
    }

    fn listing(rows: &[&[&str]]) -> RawTable {
        RawTable::new(
            strings(&[
                "CÓDIGO DE VENDAS",
                "DESCRIÇÃO VENDAS",
                "MARCA MODELO",
                "DESCRIÇÃO CAT",
                "PRODUÇÃO",
            ]),
            rows.iter().map(|r| strings(r)).collect(),
        )
    }

    #[test]
    fn rows_of_every_matching_table_are_keyed_by_code() {
        let mut groups = GroupMap::with_groups(&["Introduction", "Configuration"]);
        groups.file(
            "Introduction",
            listing(&[&["1TR48", "TRACKER 1.0", "123", "SUV", "Nacional"]]),
        );
        groups.file(
            "Configuration",
            RawTable::new(strings(&["Item", "AT"]), vec![strings(&["Teto", "S"])]),
        );
        groups.file(
            "Configuration",
            listing(&[
                &["1TR58", "TRACKER LT", "124", "SUV", "Nacional"],
                &["", "sem código", "0", "-", "-"],
            ]),
        );

        let keyed = CellLocator::default().keyed_rows(&groups, "Código de vendas");

        let codes: Vec<&str> = keyed.keys().map(String::as_str).collect();
        assert_eq!(codes, vec!["1TR48", "1TR58"]);
        assert_eq!(keyed["1TR48"]["DESCRIÇÃO VENDAS"], "TRACKER 1.0");
        assert_eq!(keyed["1TR58"]["MARCA MODELO"], "124");
        assert!(!keyed["1TR48"].contains_key("CÓDIGO DE VENDAS"));
    }

    #[test]
    fn repeated_code_keeps_latest_row() {
        let mut groups = GroupMap::with_groups(&["Introduction"]);
        groups.file(
            "Introduction",
            listing(&[
                &["1TR48", "old", "1", "SUV", "Nacional"],
                &["1TR48", "new", "2", "SUV", "Nacional"],
            ]),
        );

        let keyed = CellLocator::default().keyed_rows(&groups, "CÓDIGO DE VENDAS");

        assert_eq!(keyed.len(), 1);
        assert_eq!(keyed["1TR48"]["DESCRIÇÃO VENDAS"], "new");
    }

    #[test]
    fn no_matching_header_yields_empty_map() {
        let mut groups = GroupMap::with_groups(&["Configuration"]);
        groups.file(
            "Configuration",
            RawTable::new(strings(&["Item", "AT"]), vec![strings(&["Teto", "S"])]),
        );

        assert!(
            CellLocator::default()
                .keyed_rows(&groups, "CÓDIGO DE VENDAS")
                .is_empty()
        );
    }
}
