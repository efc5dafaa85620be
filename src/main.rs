mod aggregate;
mod cli;
mod config;
mod duration;
mod error;
mod output;
mod report;
mod sources;
mod types;

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use cli::Cli;
use report::{BuiltinPdf, Captions, ReportKind, SummaryPayload};
use types::{PoolSelector, ReportParams};

fn init_logging(quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("warn")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("poolstat=info"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// A directory (existing, or given with a trailing separator) receives the
/// report's default file name.
fn output_path(explicit: Option<PathBuf>, fallback_dir: Option<PathBuf>, kind: ReportKind) -> PathBuf {
    match explicit {
        Some(p) if p.is_dir() || p.as_os_str().to_string_lossy().ends_with(std::path::MAIN_SEPARATOR) => {
            p.join(kind.filename())
        }
        Some(p) => p,
        None => fallback_dir
            .unwrap_or_else(|| PathBuf::from("."))
            .join(kind.filename()),
    }
}

fn write_report(path: &Path, bytes: &[u8]) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }
    fs::write(path, bytes).with_context(|| format!("Failed to write {}", path.display()))
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.quiet);

    let config = config::load_config();

    let (start, end) = cli::resolve_range(cli.from, cli.to, chrono::Local::now().date_naive());
    let params = ReportParams::new(PoolSelector::from_ids(cli.pools), start, end)?;

    let source = sources::open(&cli.input)
        .with_context(|| format!("Cannot read usage from {}", cli.input.display()))?;
    let records = source.load(&params)?;
    info!(
        source = source.name(),
        records = records.len(),
        "loaded usage from {} to {}",
        params.start_str(),
        params.end_str()
    );

    let summary = aggregate::aggregate(&records);

    let captions = Captions {
        watermark: config
            .watermark
            .unwrap_or_else(|| report::DEFAULT_WATERMARK.to_string()),
    };
    let format = cli.format.or(config.format).unwrap_or_default();

    match format.report_kind() {
        Some(kind) => {
            let bytes = kind.generate(&summary, &params, &captions, &BuiltinPdf)?;
            let path = output_path(cli.output, config.output_dir, kind);
            write_report(&path, &bytes)?;
            tracing::debug!(report = kind.uuid(), "{}: {}", kind.name(), kind.description());
            info!(
                mime = kind.mime_type(),
                bytes = bytes.len(),
                "wrote {}",
                path.display()
            );
        }
        None => {
            let payload = SummaryPayload::build(&summary, &params, &captions);
            match format {
                cli::OutputFormat::Json => output::print_json(&payload)?,
                _ => output::print_table(&payload),
            }
        }
    }

    Ok(())
}
