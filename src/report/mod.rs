pub mod csv;
pub mod pdf;

use serde::Serialize;

use crate::aggregate::PoolUsageSummary;
use crate::duration::format_duration;
use crate::error::Result;
use crate::types::ReportParams;

pub use pdf::{BuiltinPdf, TemplateEngine};

pub const TEMPLATE_ID: &str = "stats/pools-usage-summary";
pub const DEFAULT_WATERMARK: &str = "Report Summary of pools usage";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportKind {
    Pdf,
    Csv,
}

impl ReportKind {
    pub fn filename(self) -> &'static str {
        match self {
            ReportKind::Pdf => "summary_pools_usage.pdf",
            ReportKind::Csv => "summary_pools_usage.csv",
        }
    }

    pub fn mime_type(self) -> &'static str {
        match self {
            ReportKind::Pdf => "application/pdf",
            ReportKind::Csv => "text/csv",
        }
    }

    pub fn uuid(self) -> &'static str {
        match self {
            ReportKind::Pdf => "aba55fe5-c4df-5240-bbe6-36340220cb5d",
            ReportKind::Csv => "811b1261-82c4-524e-b1c7-a4b7fe70050f",
        }
    }

    pub fn name(self) -> &'static str {
        "Summary of pools usage"
    }

    pub fn description(self) -> &'static str {
        "Summary of Pools usage with time totals, accesses totals, time total by pool"
    }

    pub fn generate(
        self,
        summary: &PoolUsageSummary,
        params: &ReportParams,
        captions: &Captions,
        engine: &dyn TemplateEngine,
    ) -> Result<Vec<u8>> {
        match self {
            ReportKind::Pdf => {
                let payload = SummaryPayload::build(summary, params, captions);
                engine.render(TEMPLATE_ID, &payload)
            }
            ReportKind::Csv => csv::render(summary),
        }
    }
}

/// Caption strings that are not derived from the data.
#[derive(Debug, Clone)]
pub struct Captions {
    pub watermark: String,
}

impl Default for Captions {
    fn default() -> Self {
        Self {
            watermark: DEFAULT_WATERMARK.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PayloadRow {
    pub name: String,
    pub time: String,
    pub count: u64,
    pub users: u64,
    pub mean: String,
}

/// Display-ready view of a summary handed to a [`TemplateEngine`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SummaryPayload {
    pub data: Vec<PayloadRow>,
    pub time: String,
    pub count: u64,
    pub users: u64,
    pub mean: String,
    pub start: String,
    pub end: String,
    pub header: String,
    pub watermark: String,
}

impl SummaryPayload {
    pub fn build(summary: &PoolUsageSummary, params: &ReportParams, captions: &Captions) -> Self {
        let start = params.start_str();
        let end = params.end_str();

        let data = summary
            .pools()
            .iter()
            .map(|p| PayloadRow {
                name: p.name.clone(),
                time: format_duration(p.total_time),
                count: p.count.get(),
                users: p.unique_users,
                mean: format_duration(p.mean_time()),
            })
            .collect();

        Self {
            data,
            time: format_duration(summary.total_time),
            count: summary.total_count.get(),
            users: summary.unique_users,
            mean: format_duration(summary.mean_time()),
            header: format!("Summary of Pools usage {start} to {end}"),
            watermark: captions.watermark.clone(),
            start,
            end,
        }
    }
}
