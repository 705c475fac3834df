#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Section classification and cell lookup for tabular price sheets.
//!
//! Lattice-style price sheets come out of the table extractor as a flat,
//! page-ordered list of tables with no indication of which section each
//! belongs to. [`classify`] groups them into named sections by comparing
//! column signatures of consecutive tables, and [`CellLocator`] answers
//! approximate "give me this cell" queries against the result.
//! [`CellLocator::keyed_rows`] flattens listing tables into a map keyed by
//! an identifying column.

pub mod classify;
pub mod keyed;
pub mod locate;
pub mod sanitize;

pub use classify::{ClassifierConfig, classify};
pub use keyed::KeyedRows;
pub use locate::{CellLocator, get_cell};
