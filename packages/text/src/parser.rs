//! First scan: recognizes listing lines and builds keyed records.
//!
//! The scanner is a two-state machine driven one line at a time:
//!
//! | State            | Line                                   | Next state       |
//! |------------------|----------------------------------------|------------------|
//! | `SeekingHeader`  | similar to the header anchor           | `ReadingRecords` |
//! | `SeekingHeader`  | anything else                          | `SeekingHeader`  |
//! | `ReadingRecords` | code of the expected width, not footer | `ReadingRecords` |
//! | `ReadingRecords` | anything else                          | `SeekingHeader`  |
//!
//! State carries across page boundaries. A listing interrupted by a page
//! break resumes once the next page repeats the column header.

use std::collections::BTreeMap;

use price_sheet_fuzzy::{DEFAULT_THRESHOLD, is_similar};
use price_sheet_models::{
    BRAND_FIELD, DESCRIPTION_FIELD, LINE_FIELD, ParserState, RecordList, TextPage, VehicleRecord,
};
use serde::Deserialize;

use crate::DEFAULT_FOOTER_ANCHOR;

/// Immutable settings for the listing scan.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ParserConfig {
    /// Text of the column header line that opens a listing region.
    pub header_anchor: String,
    /// Text of the footer line that closes a listing region.
    pub footer_anchor: String,
    /// Exact character width of a record's leading code.
    pub code_width: usize,
    /// Index of the token where the model name starts.
    pub name_token: usize,
    /// Tokens that end the model name (matched case-insensitively).
    pub fuel_types: Vec<String>,
    /// Column names paired with each record's values. When empty, the
    /// tokens of the matched header line are used.
    pub column_names: Vec<String>,
    /// Column split into the derived `line` and `description` fields.
    /// Defaults to the name column.
    pub composite_column: Option<String>,
    /// Brand attached to every record.
    pub brand: String,
    /// Similarity threshold for anchor matching.
    pub threshold: u8,
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self {
            header_anchor: "MVS MY DESCRIÇÃO COMB. PREÇO(R$) PÁGINA".to_owned(),
            footer_anchor: DEFAULT_FOOTER_ANCHOR.to_owned(),
            code_width: 7,
            name_token: 2,
            fuel_types: ["flex", "diesel", "gasolina"].map(ToOwned::to_owned).to_vec(),
            column_names: Vec::new(),
            composite_column: None,
            brand: "Jeep".to_owned(),
            threshold: DEFAULT_THRESHOLD,
        }
    }
}

impl ParserConfig {
    fn is_fuel(&self, token: &str) -> bool {
        let token = token.to_lowercase();
        self.fuel_types.iter().any(|f| f.to_lowercase() == token)
    }
}

/// Values of one listing line after the model name has been folded back
/// together.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FoldedLine {
    /// Positional values: the leading tokens, the name, then the fuel token
    /// and everything after it.
    pub values: Vec<String>,
    /// The reassembled model name.
    pub name: String,
    /// Whether a fuel token ended the name.
    pub fuel_found: bool,
}

/// Rejoins a model name that whitespace tokenization split apart.
///
/// Tokens before `config.name_token` are copied as-is. From there on tokens
/// accumulate into the name until one is a fuel type; that token and the
/// rest follow the name. Without a fuel token the name absorbs every
/// remaining token.
#[must_use]
pub fn fold_tokens(tokens: &[&str], config: &ParserConfig) -> FoldedLine {
    let lead = config.name_token.min(tokens.len());
    let mut values: Vec<String> = tokens[..lead].iter().map(|t| (*t).to_owned()).collect();

    if lead < config.name_token {
        return FoldedLine {
            values,
            name: String::new(),
            fuel_found: false,
        };
    }

    let rest = &tokens[lead..];
    let fuel_at = rest.iter().position(|t| config.is_fuel(t));
    let name_end = fuel_at.unwrap_or(rest.len());

    let name = rest[..name_end].join(" ").trim().to_owned();
    values.push(name.clone());
    values.extend(rest[name_end..].iter().map(|t| (*t).to_owned()));

    FoldedLine {
        values,
        name,
        fuel_found: fuel_at.is_some(),
    }
}

/// What the parser did with one line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LineOutcome {
    /// The line was the column header; a listing region starts.
    HeaderFound,
    /// The line became (or updated) the record with this key.
    Record(String),
    /// The line ended the listing region and was not treated as data.
    RegionEnded,
    /// The line was outside any listing region.
    Skipped,
}

/// Incremental listing scanner.
#[derive(Debug)]
pub struct RecordParser<'a> {
    config: &'a ParserConfig,
    state: ParserState,
    columns: Vec<String>,
    records: RecordList,
}

impl<'a> RecordParser<'a> {
    #[must_use]
    pub fn new(config: &'a ParserConfig) -> Self {
        Self {
            config,
            state: ParserState::SeekingHeader,
            columns: config.column_names.clone(),
            records: RecordList::new(),
        }
    }

    #[must_use]
    pub const fn state(&self) -> ParserState {
        self.state
    }

    /// Column names records are currently built with.
    #[must_use]
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Advances the state machine by one line.
    pub fn feed_line(&mut self, line: &str) -> LineOutcome {
        match self.state {
            ParserState::SeekingHeader => {
                if !is_similar(line, &self.config.header_anchor, self.config.threshold) {
                    return LineOutcome::Skipped;
                }
                if self.config.column_names.is_empty() {
                    self.columns = line.split_whitespace().map(ToOwned::to_owned).collect();
                }
                log::debug!("Listing header found: {line:?}");
                self.state = ParserState::ReadingRecords;
                LineOutcome::HeaderFound
            }
            ParserState::ReadingRecords => {
                let tokens: Vec<&str> = line.split_whitespace().collect();
                let code_ok = tokens
                    .first()
                    .is_some_and(|code| code.chars().count() == self.config.code_width);

                if !code_ok || is_similar(line, &self.config.footer_anchor, self.config.threshold) {
                    log::debug!("Listing region ended at {line:?}");
                    self.state = ParserState::SeekingHeader;
                    return LineOutcome::RegionEnded;
                }

                LineOutcome::Record(self.build_record(&tokens))
            }
        }
    }

    fn build_record(&mut self, tokens: &[&str]) -> String {
        let folded = fold_tokens(tokens, self.config);
        let complete = folded.fuel_found && folded.values.len() >= self.columns.len();

        let mut fields: BTreeMap<String, String> = self
            .columns
            .iter()
            .cloned()
            .zip(folded.values)
            .collect();

        let code = tokens[0];
        let name = if folded.name.is_empty() {
            code.to_owned()
        } else {
            folded.name
        };
        let key = self.unique_key(&name, code);

        if !complete {
            log::warn!(
                "Record '{key}' is incomplete: {} of {} columns recognized",
                fields.len(),
                self.columns.len()
            );
        }

        let composite = self
            .config
            .composite_column
            .as_ref()
            .or_else(|| self.columns.get(self.config.name_token))
            .and_then(|column| fields.get(column))
            .cloned();
        if let Some(composite) = composite {
            let mut parts = composite.split_whitespace();
            let line = parts.next().unwrap_or_default().to_owned();
            let description = parts.collect::<Vec<_>>().join(" ");
            fields.insert(LINE_FIELD.to_owned(), line);
            fields.insert(DESCRIPTION_FIELD.to_owned(), description);
        }
        fields.insert(BRAND_FIELD.to_owned(), self.config.brand.clone());

        if !self
            .records
            .upsert(VehicleRecord::new(name, fields, complete).with_key(key.clone()))
        {
            log::debug!("Record '{key}' listed more than once; keeping the latest values");
        }

        key
    }

    /// Key for a record named `name` with leading code `code`.
    ///
    /// The name alone is used unless a record listed under a different code
    /// already holds it, in which case the code is appended. The same name
    /// and code listed twice map to the same key.
    fn unique_key(&self, name: &str, code: &str) -> String {
        let code_column = self.columns.first().map(String::as_str);
        let taken_by_other = self.records.get(name).is_some_and(|existing| {
            code_column.and_then(|c| existing.field(c)) != Some(code)
        });

        if taken_by_other {
            let key = format!("{name} ({code})");
            log::debug!("Model name '{name}' already listed under another code; keyed as '{key}'");
            key
        } else {
            name.to_owned()
        }
    }

    /// Consumes the parser, returning the records in creation order.
    #[must_use]
    pub fn finish(self) -> RecordList {
        self.records
    }
}

/// Scans every line of `pages` and returns the listed records.
#[must_use]
pub fn parse_records(pages: &[TextPage], config: &ParserConfig) -> RecordList {
    let mut parser = RecordParser::new(config);

    for page in pages {
        for line in page.lines() {
            parser.feed_line(line);
        }
    }

    let records = parser.finish();
    log::info!(
        "Parsed {} records from {} pages",
        records.len(),
        pages.len()
    );
    records
}

#[cfg(test)]
mod tests {
    use super::*;

    const HEADER: &str = "MVS MY DESCRIÇÃO COMB. PREÇO(R$) PÁGINA";

    fn config() -> ParserConfig {
        ParserConfig {
            column_names: ["code", "year", "name", "fuel", "price", "page"]
                .map(ToOwned::to_owned)
                .to_vec(),
            ..ParserConfig::default()
        }
    }

    fn page(lines: &[&str]) -> TextPage {
        TextPage::new(lines.iter().map(|s| (*s).to_owned()).collect())
    }

    #[test]
    fn tokenizes_listing_line_into_record() {
        let cfg = config();
        let records = parse_records(
            &[page(&[HEADER, "ABC1234 2024 SUV COMPLETO flex 150000 12"])],
            &cfg,
        );

        assert_eq!(records.len(), 1);
        let record = records.get("SUV COMPLETO").unwrap();
        assert_eq!(record.field("code"), Some("ABC1234"));
        assert_eq!(record.field("year"), Some("2024"));
        assert_eq!(record.field("name"), Some("SUV COMPLETO"));
        assert_eq!(record.field("fuel"), Some("flex"));
        assert_eq!(record.field("price"), Some("150000"));
        assert_eq!(record.field("page"), Some("12"));
        assert!(record.is_complete());
    }

    #[test]
    fn derives_line_description_and_brand_from_name() {
        let cfg = config();
        let records = parse_records(
            &[page(&[HEADER, "ABC1234 2024 SUV COMPLETO flex 150000 12"])],
            &cfg,
        );
        let record = records.get("SUV COMPLETO").unwrap();
        assert_eq!(record.field(LINE_FIELD), Some("SUV"));
        assert_eq!(record.field(DESCRIPTION_FIELD), Some("COMPLETO"));
        assert_eq!(record.field(BRAND_FIELD), Some("Jeep"));
    }

    #[test]
    fn header_line_supplies_columns_when_none_configured() {
        let cfg = ParserConfig::default();
        let records = parse_records(
            &[page(&[
                HEADER,
                "6291C2E 2025 COMPASS LONGITUDE T270 Flex 199990 8",
            ])],
            &cfg,
        );
        let record = records.get("COMPASS LONGITUDE T270").unwrap();
        assert_eq!(record.field("MVS"), Some("6291C2E"));
        assert_eq!(record.field("COMB."), Some("Flex"));
        assert_eq!(record.field("PREÇO(R$)"), Some("199990"));
        assert_eq!(record.field("PÁGINA"), Some("8"));
        assert_eq!(record.field(LINE_FIELD), Some("COMPASS"));
        assert_eq!(record.field(DESCRIPTION_FIELD), Some("LONGITUDE T270"));
    }

    #[test]
    fn lines_before_header_are_ignored() {
        let cfg = config();
        let records = parse_records(
            &[page(&["ABC1234 2024 SUV flex 1 2", "Lista de preços"])],
            &cfg,
        );
        assert!(records.is_empty());
    }

    #[test]
    fn state_transitions_follow_header_code_and_footer() {
        let cfg = config();
        let mut parser = RecordParser::new(&cfg);
        assert_eq!(parser.state(), ParserState::SeekingHeader);

        assert_eq!(parser.feed_line("Lista de preços"), LineOutcome::Skipped);
        assert_eq!(parser.feed_line(HEADER), LineOutcome::HeaderFound);
        assert_eq!(parser.state(), ParserState::ReadingRecords);

        assert_eq!(
            parser.feed_line("ABC1234 2024 SUV flex 100 1"),
            LineOutcome::Record("SUV".to_owned())
        );
        assert_eq!(parser.state(), ParserState::ReadingRecords);

        assert_eq!(parser.feed_line(DEFAULT_FOOTER_ANCHOR), LineOutcome::RegionEnded);
        assert_eq!(parser.state(), ParserState::SeekingHeader);
    }

    #[test]
    fn wrong_code_width_ends_region_without_consuming_line() {
        let cfg = config();
        let mut parser = RecordParser::new(&cfg);
        parser.feed_line(HEADER);
        assert_eq!(
            parser.feed_line("AB12 2024 SUV flex 100 1"),
            LineOutcome::RegionEnded
        );
        assert_eq!(parser.feed_line(""), LineOutcome::Skipped);
        assert!(parser.finish().is_empty());
    }

    #[test]
    fn scanning_resumes_on_next_page_header() {
        let cfg = config();
        let records = parse_records(
            &[
                page(&[HEADER, "AAA0001 2024 RENEGADE SPORT flex 100 1", "Página 1"]),
                page(&[
                    "Continuação",
                    "BBB0002 2024 IGNORED flex 100 2",
                    HEADER,
                    "CCC0003 2024 COMMANDER LIMITED diesel 300 2",
                ]),
            ],
            &cfg,
        );
        let keys: Vec<&str> = records.keys().collect();
        assert_eq!(keys, vec!["RENEGADE SPORT", "COMMANDER LIMITED"]);
    }

    #[test]
    fn shared_model_name_under_different_codes_keeps_both_records() {
        let cfg = config();
        let records = parse_records(
            &[page(&[
                HEADER,
                "AAA0001 2024 COMPASS LIMITED flex 100 1",
                "AAA0002 2025 COMPASS LIMITED flex 120 1",
            ])],
            &cfg,
        );

        let keys: Vec<&str> = records.keys().collect();
        assert_eq!(keys, vec!["COMPASS LIMITED", "COMPASS LIMITED (AAA0002)"]);

        let first = records.get("COMPASS LIMITED").unwrap();
        assert_eq!(first.field("code"), Some("AAA0001"));
        assert_eq!(first.field("price"), Some("100"));

        let second = records.get("COMPASS LIMITED (AAA0002)").unwrap();
        assert_eq!(second.name(), "COMPASS LIMITED");
        assert_eq!(second.field("year"), Some("2025"));
        assert_eq!(second.field("price"), Some("120"));
    }

    #[test]
    fn same_code_listed_again_updates_in_place() {
        let cfg = config();
        let records = parse_records(
            &[
                page(&[HEADER, "AAA0001 2024 COMPASS LIMITED flex 100 1"]),
                page(&[HEADER, "AAA0001 2024 COMPASS LIMITED flex 110 2"]),
            ],
            &cfg,
        );

        assert_eq!(records.len(), 1);
        let record = records.get("COMPASS LIMITED").unwrap();
        assert_eq!(record.field("price"), Some("110"));
        assert_eq!(record.field("page"), Some("2"));
    }

    #[test]
    fn line_without_fuel_token_is_flagged_incomplete() {
        let cfg = config();
        let records = parse_records(
            &[page(&[HEADER, "ABC1234 2024 SUV COMPLETO 150000 12"])],
            &cfg,
        );
        let record = records.get("SUV COMPLETO 150000 12").unwrap();
        assert!(!record.is_complete());
        assert_eq!(record.field("name"), Some("SUV COMPLETO 150000 12"));
        assert_eq!(record.field("fuel"), None);
        assert_eq!(record.field("price"), None);
        assert_eq!(record.field("page"), None);
    }

    #[test]
    fn extra_values_are_dropped() {
        let cfg = config();
        let records = parse_records(
            &[page(&[HEADER, "ABC1234 2024 SUV diesel 1 2 extra more"])],
            &cfg,
        );
        let record = records.get("SUV").unwrap();
        assert_eq!(record.field("page"), Some("2"));
        assert!(!record.fields().values().any(|v| v == "extra"));
    }

    #[test]
    fn fuel_matching_is_case_insensitive() {
        let folded = fold_tokens(&["ABC1234", "2024", "A", "B", "DIESEL", "9"], &config());
        assert!(folded.fuel_found);
        assert_eq!(folded.name, "A B");
        assert_eq!(folded.values, vec!["ABC1234", "2024", "A B", "DIESEL", "9"]);
    }

    #[test]
    fn code_only_line_falls_back_to_code_key() {
        let cfg = config();
        let records = parse_records(&[page(&[HEADER, "ABC1234"])], &cfg);
        let record = records.get("ABC1234").unwrap();
        assert!(!record.is_complete());
        assert_eq!(record.field("code"), Some("ABC1234"));
    }
}
