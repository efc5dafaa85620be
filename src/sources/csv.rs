use std::path::{Path, PathBuf};

use super::{malformed, UsageSource};
use crate::error::Result;
use crate::types::{ReportParams, UsageRecord};

/// Headered CSV with columns `pool,pool_name,name,time` and an optional `date`.
pub struct CsvSource {
    path: PathBuf,
}

impl CsvSource {
    pub fn new(path: &Path) -> Self {
        Self {
            path: path.to_path_buf(),
        }
    }
}

impl UsageSource for CsvSource {
    fn name(&self) -> &str {
        "csv"
    }

    fn load(&self, params: &ReportParams) -> Result<Vec<UsageRecord>> {
        let mut reader = csv::Reader::from_path(&self.path)?;
        let mut records = Vec::new();

        for row in reader.deserialize::<UsageRecord>() {
            let record = row.map_err(|e| {
                let line = e.position().map(|p| p.line()).unwrap_or(0);
                malformed(&self.path, line, e)
            })?;
            if params.accepts(&record) {
                records.push(record);
            }
        }

        tracing::debug!(
            source = self.name(),
            path = %self.path.display(),
            records = records.len(),
            "loaded usage records"
        );
        Ok(records)
    }
}
