//! Header cleanup applied to every extracted table before classification.

use price_sheet_models::RawTable;

/// Whether `header` is an auto-generated placeholder for a column the
/// extractor could not name (e.g. `Unnamed: 3`).
#[must_use]
pub fn is_placeholder(header: &str) -> bool {
    header.to_lowercase().contains("unnamed")
}

/// Replaces embedded line breaks in a header with single spaces.
#[must_use]
pub fn normalize_header(header: &str) -> String {
    header.replace("\r\n", " ").replace(['\r', '\n'], " ")
}

/// Cleans up `table` for classification.
///
/// Returns `None` for tables without body rows. Otherwise headers are
/// normalized and placeholder columns are removed from the header row and
/// from every body row.
#[must_use]
pub fn sanitize(table: RawTable) -> Option<RawTable> {
    if table.row_count() == 0 {
        return None;
    }

    let (headers, rows) = table.into_parts();

    let keep: Vec<bool> = headers.iter().map(|h| !is_placeholder(h)).collect();

    let headers = headers
        .iter()
        .zip(&keep)
        .filter(|(_, keep)| **keep)
        .map(|(h, _)| normalize_header(h))
        .collect();

    let rows = rows
        .into_iter()
        .map(|row| {
            row.into_iter()
                .enumerate()
                .filter(|(i, _)| keep.get(*i).copied().unwrap_or(true))
                .map(|(_, cell)| cell)
                .collect()
        })
        .collect();

    Some(RawTable::new(headers, rows))
}
