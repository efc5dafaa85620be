use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{ReportError, Result};

/// One logged access to a pool.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UsageRecord {
    #[serde(rename = "pool")]
    pub pool_id: String,
    pub pool_name: String,
    #[serde(rename = "name")]
    pub user_name: String,
    /// Connected time in seconds.
    pub time: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<DateTime<Utc>>,
}

impl UsageRecord {
    #[cfg(test)]
    pub fn new(pool_id: &str, pool_name: &str, user_name: &str, time: u64) -> Self {
        Self {
            pool_id: pool_id.to_string(),
            pool_name: pool_name.to_string(),
            user_name: user_name.to_string(),
            time,
            date: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum PoolSelector {
    #[default]
    All,
    Only(Vec<String>),
}

impl PoolSelector {
    pub fn from_ids(ids: Vec<String>) -> Self {
        if ids.is_empty() {
            PoolSelector::All
        } else {
            PoolSelector::Only(ids)
        }
    }

    pub fn matches(&self, pool_id: &str) -> bool {
        match self {
            PoolSelector::All => true,
            PoolSelector::Only(ids) => ids.iter().any(|id| id == pool_id),
        }
    }
}

/// Input parameters for a report run. The date range is inclusive.
#[derive(Debug, Clone)]
pub struct ReportParams {
    pub pools: PoolSelector,
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl ReportParams {
    pub fn new(pools: PoolSelector, start: NaiveDate, end: NaiveDate) -> Result<Self> {
        if start > end {
            return Err(ReportError::InvalidDateRange { start, end });
        }
        Ok(Self { pools, start, end })
    }

    /// Records without a date have already been range-filtered upstream.
    pub fn accepts(&self, record: &UsageRecord) -> bool {
        if !self.pools.matches(&record.pool_id) {
            return false;
        }
        match record.date {
            Some(ts) => {
                let day = ts.date_naive();
                day >= self.start && day <= self.end
            }
            None => true,
        }
    }

    pub fn start_str(&self) -> String {
        self.start.format("%Y-%m-%d").to_string()
    }

    pub fn end_str(&self) -> String {
        self.end.format("%Y-%m-%d").to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn rejects_inverted_range() {
        let err = ReportParams::new(PoolSelector::All, day(2024, 3, 2), day(2024, 3, 1)).unwrap_err();
        assert!(matches!(err, ReportError::InvalidDateRange { .. }));
    }

    #[test]
    fn single_day_range_is_valid() {
        assert!(ReportParams::new(PoolSelector::All, day(2024, 3, 1), day(2024, 3, 1)).is_ok());
    }

    #[test]
    fn accepts_filters_pool_and_date() {
        let params = ReportParams::new(
            PoolSelector::from_ids(vec!["A".into()]),
            day(2024, 3, 1),
            day(2024, 3, 31),
        )
        .unwrap();

        let mut inside = UsageRecord::new("A", "Pool A", "u1", 10);
        inside.date = Some(Utc.with_ymd_and_hms(2024, 3, 31, 23, 59, 0).unwrap());
        assert!(params.accepts(&inside));

        let mut outside = inside.clone();
        outside.date = Some(Utc.with_ymd_and_hms(2024, 4, 1, 0, 0, 0).unwrap());
        assert!(!params.accepts(&outside));

        let undated = UsageRecord::new("A", "Pool A", "u1", 10);
        assert!(params.accepts(&undated));

        let other_pool = UsageRecord::new("B", "Pool B", "u1", 10);
        assert!(!params.accepts(&other_pool));
    }

    #[test]
    fn empty_selector_means_all() {
        assert_eq!(PoolSelector::from_ids(vec![]), PoolSelector::All);
        assert!(PoolSelector::All.matches("anything"));
    }

    #[test]
    fn deserializes_upstream_field_names() {
        let json = r#"{"pool":"A","pool_name":"Pool A","name":"u1","time":100}"#;
        let r: UsageRecord = serde_json::from_str(json).unwrap();
        assert_eq!(r, UsageRecord::new("A", "Pool A", "u1", 100));
    }
}
