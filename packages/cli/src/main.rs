#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! CLI entry point for vendor price sheet extraction.

use std::io::Read as _;
use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use price_sheet_cli::{CliError, extract_records, extract_tables, parse_column_ref, row_ref};
use price_sheet_pdf::{DocumentRef, PdfTextSource, TabulaJsonSource};
use price_sheet_profile::{LayoutConfig, all_profiles, find_profile};
use price_sheet_tables::CellLocator;

#[derive(Parser)]
#[command(name = "price_sheet", about = "Vendor price sheet extraction tool")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct Input {
    /// Profile identifier (e.g., "jeep")
    #[arg(long)]
    profile: String,
    /// Document to read
    file: Option<PathBuf>,
    /// Read the document from standard input instead of a file
    #[arg(long)]
    stdin: bool,
}

impl Input {
    fn document(&self) -> Result<DocumentRef, Box<dyn std::error::Error>> {
        let bytes = if self.stdin {
            let mut buf = Vec::new();
            std::io::stdin().read_to_end(&mut buf)?;
            Some(buf)
        } else {
            None
        };
        Ok(DocumentRef::from_parts(self.file.clone(), bytes)?)
    }
}

#[derive(Subcommand)]
enum Commands {
    /// List all embedded profiles
    Profiles,
    /// Classify the tables of a lattice table dump and run the profile's queries
    Tables {
        #[command(flatten)]
        input: Input,
    },
    /// Look up a single cell in a classified table dump
    Cell {
        #[command(flatten)]
        input: Input,
        /// Section name (e.g., "Configuration")
        #[arg(long)]
        group: String,
        /// Table index within the section
        #[arg(long, default_value = "0")]
        table: usize,
        /// Column index or header text
        #[arg(long)]
        column: String,
        /// Row index
        #[arg(long)]
        row: Option<usize>,
        /// Column holding the row labels to match against
        #[arg(long)]
        anchor_column: Option<usize>,
        /// Row label to match
        #[arg(long)]
        anchor_text: Option<String>,
    },
    /// Parse and enrich the vehicle records of a free-text PDF
    Records {
        #[command(flatten)]
        input: Input,
    },
}

fn print_json(value: &impl serde::Serialize) -> Result<(), Box<dyn std::error::Error>> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    pretty_env_logger::init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Profiles => {
            println!("{:<12} {:<8} NAME", "ID", "LAYOUT");
            println!("{}", "-".repeat(50));
            for profile in &all_profiles() {
                println!(
                    "{:<12} {:<8} {}",
                    profile.id,
                    profile.layout_name(),
                    profile.name
                );
            }
        }
        Commands::Tables { input } => {
            let profile = find_profile(&input.profile)?;
            let source = match &profile.layout {
                LayoutConfig::Tables { mode, .. } => TabulaJsonSource::new(*mode),
                LayoutConfig::Text { .. } => TabulaJsonSource::default(),
            };
            let (_, report) = extract_tables(&profile, &source, &input.document()?)?;
            print_json(&report)?;
        }
        Commands::Cell {
            input,
            group,
            table,
            column,
            row,
            anchor_column,
            anchor_text,
        } => {
            let profile = find_profile(&input.profile)?;
            let LayoutConfig::Tables {
                mode, threshold, ..
            } = &profile.layout
            else {
                return Err(CliError::Usage(format!(
                    "profile '{}' does not read tables",
                    profile.id
                ))
                .into());
            };
            let row = row_ref(row, anchor_column, anchor_text)?;
            let column = parse_column_ref(&column);

            let (groups, _) = extract_tables(
                &profile,
                &TabulaJsonSource::new(*mode),
                &input.document()?,
            )?;
            let value = CellLocator::new(*threshold).resolve(&groups, &group, table, &column, &row);
            print_json(&value)?;
        }
        Commands::Records { input } => {
            let profile = find_profile(&input.profile)?;
            let records = extract_records(&profile, &PdfTextSource, &input.document()?)?;
            print_json(&records.to_field_maps())?;
        }
    }

    Ok(())
}
