use crate::aggregate::PoolUsageSummary;
use crate::error::{ReportError, Result};

const HEADER: [&str; 5] = [
    "Pool",
    "Total Time (seconds)",
    "Total Accesses",
    "Unique users",
    "Mean time (seconds)",
];

/// Raw-seconds CSV: header, one row per pool in first-seen order, then totals.
/// Rows end with CRLF.
pub fn render(summary: &PoolUsageSummary) -> Result<Vec<u8>> {
    let mut writer = csv::WriterBuilder::new()
        .terminator(csv::Terminator::CRLF)
        .from_writer(Vec::new());

    writer.write_record(HEADER)?;

    for p in summary.pools() {
        writer.write_record([
            p.name.clone(),
            p.total_time.to_string(),
            p.count.to_string(),
            p.unique_users.to_string(),
            p.mean_time().to_string(),
        ])?;
    }

    writer.write_record([
        "Total".to_string(),
        summary.total_time.to_string(),
        summary.total_count.to_string(),
        summary.unique_users.to_string(),
        summary.mean_time().to_string(),
    ])?;

    writer
        .into_inner()
        .map_err(|e| ReportError::Io(e.into_error()))
}
