//! Second scan: back-fills record attributes from per-model detail blocks.
//!
//! Detail pages repeat each model name as a heading followed by a block of
//! specification lines. Records are visited strictly in creation order: the
//! scan waits for a heading equal to the current record's model name,
//! captures marker lines until the footer (or the next record's heading),
//! then moves on. Once every record has been visited the scan stops, even if
//! lines remain.

use price_sheet_fuzzy::{DEFAULT_THRESHOLD, is_similar};
use price_sheet_models::{RecordList, TextPage};
use regex::Regex;
use serde::Deserialize;

use crate::{DEFAULT_FOOTER_ANCHOR, TextError};

/// Immutable settings for the enrichment scan.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct EnrichmentConfig {
    /// Text of the footer line that closes a detail block.
    pub footer_anchor: String,
    /// Prefix of lines the extraction pattern is tried against.
    pub marker_prefix: String,
    /// Pattern pulling the value out of a marker line. Uses the `value`
    /// named group when present, else the first group, else the whole match.
    pub pattern: String,
    /// Field the extracted value is stored under.
    pub field: String,
    /// Similarity threshold for footer matching.
    pub threshold: u8,
}

impl Default for EnrichmentConfig {
    fn default() -> Self {
        Self {
            footer_anchor: DEFAULT_FOOTER_ANCHOR.to_owned(),
            marker_prefix: "Modelo:".to_owned(),
            pattern: r"(?i)Potência máxima \(cv\)\s*:\s*(?P<value>\S+)".to_owned(),
            field: "potencia_maxima".to_owned(),
            threshold: DEFAULT_THRESHOLD,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Scan {
    /// Waiting for the heading of the record at this position.
    Seeking(usize),
    /// Inside the detail block of the record at this position.
    Capturing(usize),
    Done,
}

/// Enrichment scan with a compiled extraction pattern.
#[derive(Debug)]
pub struct Enricher {
    config: EnrichmentConfig,
    pattern: Regex,
}

impl Enricher {
    /// Compiles the extraction pattern of `config`.
    ///
    /// # Errors
    ///
    /// Returns [`TextError::Pattern`] if the pattern fails to compile.
    pub fn new(config: EnrichmentConfig) -> Result<Self, TextError> {
        let pattern = Regex::new(&config.pattern)?;
        Ok(Self { config, pattern })
    }

    #[must_use]
    pub const fn config(&self) -> &EnrichmentConfig {
        &self.config
    }

    /// Pulls the labeled value out of a marker line.
    #[must_use]
    pub fn extract<'l>(&self, line: &'l str) -> Option<&'l str> {
        if !line.trim_start().starts_with(&self.config.marker_prefix) {
            return None;
        }
        let caps = self.pattern.captures(line)?;
        caps.name("value")
            .or_else(|| caps.get(1))
            .or_else(|| caps.get(0))
            .map(|m| m.as_str().trim())
    }

    /// Scans `pages` and stores extracted values into `records` in place.
    pub fn enrich(&self, records: &mut RecordList, pages: &[TextPage]) {
        let targets: Vec<(String, String)> = records
            .iter()
            .map(|r| (r.key().to_owned(), r.name().to_owned()))
            .collect();
        if targets.is_empty() {
            return;
        }

        let mut scan = Scan::Seeking(0);
        let mut enriched = 0_usize;

        'pages: for page in pages {
            for line in page.lines() {
                scan = match scan {
                    Scan::Seeking(i) => {
                        if is_heading(line, &targets[i].1) {
                            log::debug!("Capturing details for '{}'", targets[i].0);
                            Scan::Capturing(i)
                        } else {
                            scan
                        }
                    }
                    Scan::Capturing(i) => {
                        if is_similar(line, &self.config.footer_anchor, self.config.threshold) {
                            log::debug!("Detail block for '{}' ended at footer", targets[i].0);
                            advance(i, targets.len())
                        } else if targets
                            .get(i + 1)
                            .is_some_and(|(_, next)| is_heading(line, next))
                        {
                            log::debug!("Capturing details for '{}'", targets[i + 1].0);
                            Scan::Capturing(i + 1)
                        } else {
                            if let Some(value) = self.extract(line)
                                && let Some(record) = records.get_mut(&targets[i].0)
                            {
                                record.set_field(&self.config.field, value);
                                enriched += 1;
                            }
                            scan
                        }
                    }
                    Scan::Done => scan,
                };

                if scan == Scan::Done {
                    break 'pages;
                }
            }
        }

        log::info!(
            "Enriched {enriched} of {} records with '{}'{}",
            targets.len(),
            self.config.field,
            if scan == Scan::Done {
                ""
            } else {
                " (input ended before every record was visited)"
            }
        );
    }
}

fn is_heading(line: &str, name: &str) -> bool {
    line.trim().to_lowercase() == name.trim().to_lowercase()
}

const fn advance(current: usize, total: usize) -> Scan {
    if current + 1 < total {
        Scan::Seeking(current + 1)
    } else {
        Scan::Done
    }
}

/// Runs an enrichment scan with `config` over `pages`.
///
/// # Errors
///
/// Returns [`TextError::Pattern`] if the configured pattern fails to compile.
pub fn enrich(
    records: &mut RecordList,
    pages: &[TextPage],
    config: &EnrichmentConfig,
) -> Result<(), TextError> {
    Enricher::new(config.clone())?.enrich(records, pages);
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use price_sheet_models::VehicleRecord;

    use super::*;

    const POWER_LINE: &str = "Modelo: XPTO Potência máxima (cv) : 130cv";

    fn records(keys: &[&str]) -> RecordList {
        let mut list = RecordList::new();
        for key in keys {
            list.upsert(VehicleRecord::new((*key).to_owned(), BTreeMap::new(), true));
        }
        list
    }

    fn page(lines: &[&str]) -> TextPage {
        TextPage::new(lines.iter().map(|s| (*s).to_owned()).collect())
    }

    #[test]
    fn captures_power_rating_until_footer() {
        let mut list = records(&["MODEL-X"]);
        let pages = [page(&[
            "Ficha técnica",
            "MODEL-X",
            "Motor 1.3 turbo",
            POWER_LINE,
            DEFAULT_FOOTER_ANCHOR,
            "Modelo: XPTO Potência máxima (cv) : 999cv",
        ])];

        enrich(&mut list, &pages, &EnrichmentConfig::default()).unwrap();

        assert_eq!(
            list.get("MODEL-X").unwrap().field("potencia_maxima"),
            Some("130cv")
        );
    }

    #[test]
    fn marker_lines_before_heading_are_ignored() {
        let mut list = records(&["MODEL-X"]);
        let pages = [page(&[POWER_LINE, "model-x ", DEFAULT_FOOTER_ANCHOR])];

        enrich(&mut list, &pages, &EnrichmentConfig::default()).unwrap();

        assert_eq!(list.get("MODEL-X").unwrap().field("potencia_maxima"), None);
    }

    #[test]
    fn records_are_visited_in_creation_order_across_pages() {
        let mut list = records(&["RENEGADE SPORT", "COMPASS LIMITED"]);
        let pages = [
            page(&[
                "Renegade Sport",
                "Modelo: RNG Potência máxima (cv) : 185cv",
                DEFAULT_FOOTER_ANCHOR,
            ]),
            page(&[
                "COMPASS LIMITED",
                "Modelo: CMP Potência máxima (cv) : 272cv",
            ]),
        ];

        enrich(&mut list, &pages, &EnrichmentConfig::default()).unwrap();

        assert_eq!(
            list.get("RENEGADE SPORT").unwrap().field("potencia_maxima"),
            Some("185cv")
        );
        assert_eq!(
            list.get("COMPASS LIMITED").unwrap().field("potencia_maxima"),
            Some("272cv")
        );
    }

    #[test]
    fn next_heading_hands_capture_to_next_record() {
        let mut list = records(&["A1", "B2"]);
        let pages = [page(&[
            "A1",
            "Modelo: A Potência máxima (cv) : 100cv",
            "B2",
            "Modelo: B Potência máxima (cv) : 200cv",
        ])];

        enrich(&mut list, &pages, &EnrichmentConfig::default()).unwrap();

        assert_eq!(list.get("A1").unwrap().field("potencia_maxima"), Some("100cv"));
        assert_eq!(list.get("B2").unwrap().field("potencia_maxima"), Some("200cv"));
    }

    #[test]
    fn headings_match_model_name_not_disambiguated_key() {
        let mut list = RecordList::new();
        list.upsert(VehicleRecord::new("COMPASS LIMITED".to_owned(), BTreeMap::new(), true));
        list.upsert(
            VehicleRecord::new("COMPASS LIMITED".to_owned(), BTreeMap::new(), true)
                .with_key("COMPASS LIMITED (AAA0002)"),
        );
        let pages = [page(&[
            "COMPASS LIMITED",
            "Modelo: CMP Potência máxima (cv) : 185cv",
            DEFAULT_FOOTER_ANCHOR,
            "COMPASS LIMITED",
            "Modelo: CMP Potência máxima (cv) : 272cv",
            DEFAULT_FOOTER_ANCHOR,
        ])];

        enrich(&mut list, &pages, &EnrichmentConfig::default()).unwrap();

        assert_eq!(
            list.get("COMPASS LIMITED").unwrap().field("potencia_maxima"),
            Some("185cv")
        );
        assert_eq!(
            list.get("COMPASS LIMITED (AAA0002)")
                .unwrap()
                .field("potencia_maxima"),
            Some("272cv")
        );
    }

    #[test]
    fn scan_stops_once_every_record_is_visited() {
        let mut list = records(&["A1"]);
        let pages = [
            page(&["A1", DEFAULT_FOOTER_ANCHOR]),
            page(&["A1", "Modelo: A Potência máxima (cv) : 100cv"]),
        ];

        enrich(&mut list, &pages, &EnrichmentConfig::default()).unwrap();

        assert_eq!(list.get("A1").unwrap().field("potencia_maxima"), None);
    }

    #[test]
    fn extract_requires_marker_prefix() {
        let enricher = Enricher::new(EnrichmentConfig::default()).unwrap();
        assert_eq!(enricher.extract(POWER_LINE), Some("130cv"));
        assert_eq!(enricher.extract("Potência máxima (cv) : 130cv"), None);
        assert_eq!(enricher.extract("Modelo: XPTO Torque 27kgfm"), None);
    }

    #[test]
    fn invalid_pattern_is_rejected() {
        let config = EnrichmentConfig {
            pattern: "(unclosed".to_owned(),
            ..EnrichmentConfig::default()
        };
        assert!(matches!(Enricher::new(config), Err(TextError::Pattern(_))));
    }
}
