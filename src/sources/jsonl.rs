use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

use super::{malformed, UsageSource};
use crate::error::Result;
use crate::types::{ReportParams, UsageRecord};

/// One JSON object per line: `{"pool":..,"pool_name":..,"name":..,"time":..}`.
pub struct JsonlSource {
    path: PathBuf,
}

impl JsonlSource {
    pub fn new(path: &Path) -> Self {
        Self {
            path: path.to_path_buf(),
        }
    }
}

impl UsageSource for JsonlSource {
    fn name(&self) -> &str {
        "jsonl"
    }

    fn load(&self, params: &ReportParams) -> Result<Vec<UsageRecord>> {
        let reader = BufReader::new(File::open(&self.path)?);
        let mut records = Vec::new();

        for (idx, line) in reader.lines().enumerate() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }
            let record: UsageRecord = serde_json::from_str(&line)
                .map_err(|e| malformed(&self.path, idx as u64 + 1, e))?;
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ReportError;
    use crate::types::PoolSelector;
    use chrono::NaiveDate;
    use std::io::Write;

    fn params(pools: PoolSelector) -> ReportParams {
        ReportParams::new(
            pools,
            NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
            NaiveDate::from_ymd_opt(2024, 3, 31).unwrap(),
        )
        .unwrap()
    }

    fn write_jsonl(body: &str) -> tempfile::NamedTempFile {
        let mut f = tempfile::Builder::new().suffix(".jsonl").tempfile().unwrap();
        f.write_all(body.as_bytes()).unwrap();
        f
    }

    #[test]
    fn loads_and_filters() {
        let f = write_jsonl(concat!(
            r#"{"pool":"A","pool_name":"Pool A","name":"u1","time":100,"date":"2024-03-05T10:00:00Z"}"#,
            "\n\n",
            r#"{"pool":"A","pool_name":"Pool A","name":"u2","time":50,"date":"2024-04-05T10:00:00Z"}"#,
            "\n",
            r#"{"pool":"B","pool_name":"Pool B","name":"u1","time":30}"#,
            "\n",
        ));

        let all = JsonlSource::new(f.path())
            .load(&params(PoolSelector::All))
            .unwrap();
        assert_eq!(all.len(), 2);
        assert_eq!(all[0].time, 100);
        assert_eq!(all[1].pool_id, "B");

        let only_b = JsonlSource::new(f.path())
            .load(&params(PoolSelector::Only(vec!["B".into()])))
            .unwrap();
        assert_eq!(only_b.len(), 1);
    }

    #[test]
    fn missing_field_reports_line() {
        let f = write_jsonl(concat!(
            r#"{"pool":"A","pool_name":"Pool A","name":"u1","time":1}"#,
            "\n",
            r#"{"pool":"A","pool_name":"Pool A","name":"u1"}"#,
            "\n",
        ));
        let err = JsonlSource::new(f.path())
            .load(&params(PoolSelector::All))
            .unwrap_err();
        match err {
            ReportError::MalformedRecord { line, message, .. } => {
                assert_eq!(line, 2);
                assert!(message.contains("time"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn maximum_times_aggregate_without_overflow() {
        let f = write_jsonl(concat!(
            r#"{"pool":"A","pool_name":"Pool A","name":"u1","time":18446744073709551615}"#,
            "\n",
            r#"{"pool":"A","pool_name":"Pool A","name":"u2","time":18446744073709551615}"#,
            "\n",
        ));
        let records = JsonlSource::new(f.path())
            .load(&params(PoolSelector::All))
            .unwrap();
        let summary = crate::aggregate::aggregate(&records);
        assert_eq!(summary.total_time, 2 * u128::from(u64::MAX));
        assert_eq!(summary.pools()[0].mean_time(), u128::from(u64::MAX));
    }

    #[test]
    fn negative_time_is_malformed() {
        let f = write_jsonl(r#"{"pool":"A","pool_name":"Pool A","name":"u1","time":-5}"#);
        assert!(JsonlSource::new(f.path())
            .load(&params(PoolSelector::All))
            .is_err());
    }
}
