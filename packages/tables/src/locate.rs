//! Approximate cell lookup against classified tables.
//!
//! Header labels and row labels shift slightly between price sheet editions
//! (`"AT Turbo 116cv"` one year, `"AT turbo116 cv"` the next), so queries
//! may address columns and rows by text and let fuzzy matching pick the
//! closest one. A query that cannot be resolved yields `None`; lookups never
//! fail.

use price_sheet_fuzzy::{DEFAULT_THRESHOLD, best_match};
use price_sheet_models::{ColumnRef, GroupMap, RawTable, RowRef};

/// Resolves cell queries with a fixed similarity threshold.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CellLocator {
    threshold: u8,
}

impl Default for CellLocator {
    fn default() -> Self {
        Self::new(DEFAULT_THRESHOLD)
    }
}

impl CellLocator {
    #[must_use]
    pub const fn new(threshold: u8) -> Self {
        Self { threshold }
    }

    #[must_use]
    pub const fn threshold(&self) -> u8 {
        self.threshold
    }

    /// Returns the cell addressed by `column` and `row` in table
    /// `table_index` of `group`.
    ///
    /// Returns `None` for an unknown group, an out-of-range table or row
    /// index, or a name/anchor that no header or cell matches closely
    /// enough.
    #[must_use]
    pub fn resolve<'a>(
        &self,
        groups: &'a GroupMap,
        group: &str,
        table_index: usize,
        column: &ColumnRef,
        row: &RowRef,
    ) -> Option<&'a str> {
        let Some(tables) = groups.tables(group) else {
            log::debug!("No group named '{group}'");
            return None;
        };
        let Some(table) = tables.get(table_index) else {
            log::debug!(
                "Group '{group}' has {} tables, no table {table_index}",
                tables.len()
            );
            return None;
        };

        let column = self.resolve_column(table, column)?;
        let row = self.resolve_row(table, row)?;

        table.cell(row, column)
    }

    /// Resolves `column` to a column index of `table`.
    #[must_use]
    pub fn resolve_column(&self, table: &RawTable, column: &ColumnRef) -> Option<usize> {
        match column {
            ColumnRef::ByIndex(index) => {
                if *index >= table.column_count() {
                    log::warn!(
                        "Column index {index} out of range for table with {} columns",
                        table.column_count()
                    );
                    return None;
                }
                Some(*index)
            }
            ColumnRef::ByName(name) => {
                let found = best_match(
                    name,
                    table
                        .headers()
                        .iter()
                        .enumerate()
                        .map(|(i, h)| (i, h.as_str())),
                    self.threshold,
                );
                match found {
                    Some(m) => {
                        log::debug!(
                            "Column '{name}' matched '{}' (score {})",
                            table.headers()[m.index],
                            m.score
                        );
                        Some(m.index)
                    }
                    None => {
                        log::debug!("No column header matches '{name}'");
                        None
                    }
                }
            }
        }
    }

    /// Resolves `row` to a body row index of `table`.
    #[must_use]
    pub fn resolve_row(&self, table: &RawTable, row: &RowRef) -> Option<usize> {
        match row {
            RowRef::ByIndex(index) => (*index < table.row_count()).then_some(*index),
            RowRef::ByAnchor { column, text } => {
                if *column >= table.column_count() {
                    log::warn!(
                        "Anchor column {column} out of range for table with {} columns",
                        table.column_count()
                    );
                    return None;
                }
                let cells = table.rows().iter().enumerate().filter_map(|(i, r)| {
                    r.get(*column)
                        .map(String::as_str)
                        .filter(|cell| !cell.trim().is_empty())
                        .map(|cell| (i, cell))
                });
                best_match(text, cells, self.threshold).map(|m| m.index)
            }
        }
    }
}

/// Looks up a cell with the default similarity threshold.
///
/// See [`CellLocator::resolve`].
#[must_use]
pub fn get_cell<'a>(
    groups: &'a GroupMap,
    group: &str,
    table_index: usize,
    column: &ColumnRef,
    row: &RowRef,
) -> Option<&'a str> {
    CellLocator::default().resolve(groups, group, table_index, column, row)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| (*s).to_owned()).collect()
    }

    fn configuration_groups() -> GroupMap {
        let mut groups = GroupMap::with_groups(&["Introduction", "Configuration"]);
        groups.file(
            "Configuration",
            RawTable::new(
                strings(&["Item", "AT Turbo 116cv", "LT Turbo 116cv"]),
                vec![
                    strings(&["Ar-condicionado", "S", "S"]),
                    strings(&["Teto solar", "O", "-"]),
                    strings(&["", "X", "Y"]),
                ],
            ),
        );
        groups
    }

    #[test]
    fn name_and_index_resolve_to_same_cell() {
        let groups = configuration_groups();
        let by_index = get_cell(
            &groups,
            "Configuration",
            0,
            &ColumnRef::ByIndex(1),
            &RowRef::ByIndex(1),
        );
        let by_name = get_cell(
            &groups,
            "Configuration",
            0,
            &ColumnRef::ByName("AT turbo116 cv".to_owned()),
            &RowRef::ByIndex(1),
        );
        assert_eq!(by_index, Some("O"));
        assert_eq!(by_name, by_index);
    }

    #[test]
    fn name_prefers_exact_header_over_near_miss() {
        let groups = configuration_groups();
        let value = get_cell(
            &groups,
            "Configuration",
            0,
            &ColumnRef::ByName("LT Turbo 116cv".to_owned()),
            &RowRef::ByIndex(1),
        );
        assert_eq!(value, Some("-"));
    }

    #[test]
    fn unknown_group_or_table_is_not_found() {
        let groups = configuration_groups();
        assert_eq!(
            get_cell(
                &groups,
                "Warranty",
                0,
                &ColumnRef::ByIndex(0),
                &RowRef::ByIndex(0)
            ),
            None
        );
        assert_eq!(
            get_cell(
                &groups,
                "Configuration",
                1,
                &ColumnRef::ByIndex(0),
                &RowRef::ByIndex(0)
            ),
            None
        );
        assert_eq!(
            get_cell(
                &groups,
                "Introduction",
                0,
                &ColumnRef::ByIndex(0),
                &RowRef::ByIndex(0)
            ),
            None
        );
    }

    #[test]
    fn unmatched_column_name_is_not_found_instead_of_first_column() {
        let groups = configuration_groups();
        let value = get_cell(
            &groups,
            "Configuration",
            0,
            &ColumnRef::ByName("Preço sugerido".to_owned()),
            &RowRef::ByIndex(0),
        );
        assert_eq!(value, None);
    }

    #[test]
    fn out_of_range_row_or_column_is_not_found() {
        let groups = configuration_groups();
        assert_eq!(
            get_cell(
                &groups,
                "Configuration",
                0,
                &ColumnRef::ByIndex(1),
                &RowRef::ByIndex(9)
            ),
            None
        );
        assert_eq!(
            get_cell(
                &groups,
                "Configuration",
                0,
                &ColumnRef::ByIndex(9),
                &RowRef::ByIndex(0)
            ),
            None
        );
    }

    #[test]
    fn anchor_row_matches_fuzzy_label() {
        let groups = configuration_groups();
        let value = get_cell(
            &groups,
            "Configuration",
            0,
            &ColumnRef::ByName("LT Turbo 116cv".to_owned()),
            &RowRef::ByAnchor {
                column: 0,
                text: "ar condicionado".to_owned(),
            },
        );
        assert_eq!(value, Some("S"));
    }

    #[test]
    fn anchor_row_without_match_is_not_found() {
        let groups = configuration_groups();
        let value = get_cell(
            &groups,
            "Configuration",
            0,
            &ColumnRef::ByIndex(1),
            &RowRef::ByAnchor {
                column: 0,
                text: "Rodas de liga leve".to_owned(),
            },
        );
        assert_eq!(value, None);
    }

    #[test]
    fn anchor_column_out_of_range_is_not_found() {
        let groups = configuration_groups();
        let value = get_cell(
            &groups,
            "Configuration",
            0,
            &ColumnRef::ByIndex(1),
            &RowRef::ByAnchor {
                column: 3,
                text: "Teto solar".to_owned(),
            },
        );
        assert_eq!(value, None);

        let table = &groups.tables("Configuration").unwrap()[0];
        let row = CellLocator::new(0).resolve_row(
            table,
            &RowRef::ByAnchor {
                column: 7,
                text: "S".to_owned(),
            },
        );
        assert_eq!(row, None);
    }

    #[test]
    fn anchor_row_skips_empty_cells() {
        let groups = configuration_groups();
        let locator = CellLocator::new(0);
        let table = &groups.tables("Configuration").unwrap()[0];
        let row = locator.resolve_row(
            table,
            &RowRef::ByAnchor {
                column: 0,
                text: String::new(),
            },
        );
        // With a zero threshold every non-empty cell is eligible, but the
        // empty label in row 2 is never considered.
        assert_ne!(row, Some(2));
        assert!(row.is_some());
    }
}
