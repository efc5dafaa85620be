use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Parser, ValueEnum};
use serde::Deserialize;

use crate::report::ReportKind;

#[derive(Parser, Debug)]
#[command(
    name = "poolstat",
    about = "Summarize virtual-desktop pool usage into PDF and CSV reports"
)]
pub struct Cli {
    /// Usage records: a .jsonl or .csv file, or a directory of them
    pub input: PathBuf,

    /// Only include this pool id (repeatable; default: all pools)
    #[arg(long = "pool", value_name = "ID")]
    pub pools: Vec<String>,

    /// Start date (YYYY-MM-DD), default 30 days ago
    #[arg(long)]
    pub from: Option<NaiveDate>,

    /// End date (YYYY-MM-DD), default today
    #[arg(long)]
    pub to: Option<NaiveDate>,

    /// Output format: table, json, pdf, csv
    #[arg(long)]
    pub format: Option<OutputFormat>,

    /// File or directory for pdf/csv output
    #[arg(long, short)]
    pub output: Option<PathBuf>,

    /// Only log warnings and errors
    #[arg(long, short)]
    pub quiet: bool,
}

#[derive(ValueEnum, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Table,
    Json,
    Pdf,
    Csv,
}

impl OutputFormat {
    /// File-producing formats map onto a report kind.
    pub fn report_kind(self) -> Option<ReportKind> {
        match self {
            OutputFormat::Pdf => Some(ReportKind::Pdf),
            OutputFormat::Csv => Some(ReportKind::Csv),
            OutputFormat::Table | OutputFormat::Json => None,
        }
    }
}

/// Fill in missing ends of the date range relative to `today`.
pub fn resolve_range(
    from: Option<NaiveDate>,
    to: Option<NaiveDate>,
    today: NaiveDate,
) -> (NaiveDate, NaiveDate) {
    let end = to.unwrap_or(today);
    let start = from.unwrap_or(end - chrono::Duration::days(30));
    (start, end)
}
