use std::collections::{HashMap, HashSet};
use std::num::NonZeroU64;

use serde::Serialize;

use crate::types::UsageRecord;

/// Finalized per-pool totals. Only the distinct-user count survives
/// finalization, not the user names themselves.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PoolAggregate {
    pub pool_id: String,
    pub name: String,
    /// Seconds; widened so sums of `u64` record times cannot overflow.
    pub total_time: u128,
    pub count: NonZeroU64,
    pub unique_users: u64,
}

impl PoolAggregate {
    /// Mean connected time per access, truncated to whole seconds.
    pub fn mean_time(&self) -> u128 {
        self.total_time / u128::from(self.count.get())
    }
}

/// Per-pool state accumulated during the hot loop. Created from the pool's
/// first record, so `count` starts at one.
struct PoolState {
    name: String,
    total_time: u128,
    count: NonZeroU64,
    users: HashSet<String>,
}

/// Single-pass group-by over usage records. Consumed by [`finish`](Self::finish).
#[derive(Default)]
pub struct PoolAccumulator {
    index: HashMap<String, usize>,
    pools: Vec<(String, PoolState)>,
    total_time: u128,
    total_count: u64,
    users: HashSet<String>,
}

impl PoolAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, r: &UsageRecord) {
        match self.index.get(&r.pool_id) {
            // First-seen pool name wins; later names for the same id are ignored.
            Some(&i) => {
                let state = &mut self.pools[i].1;
                state.total_time += u128::from(r.time);
                state.count = state.count.saturating_add(1);
                if !state.users.contains(&r.user_name) {
                    state.users.insert(r.user_name.clone());
                }
            }
            None => {
                self.index.insert(r.pool_id.clone(), self.pools.len());
                self.pools.push((
                    r.pool_id.clone(),
                    PoolState {
                        name: r.pool_name.clone(),
                        total_time: u128::from(r.time),
                        count: NonZeroU64::MIN,
                        users: HashSet::from([r.user_name.clone()]),
                    },
                ));
            }
        }

        if !self.users.contains(&r.user_name) {
            self.users.insert(r.user_name.clone());
        }
        self.total_time += u128::from(r.time);
        self.total_count += 1;
    }

    pub fn finish(self) -> PoolUsageSummary {
        let pools: Vec<PoolAggregate> = self
            .pools
            .into_iter()
            .map(|(pool_id, state)| PoolAggregate {
                pool_id,
                name: state.name,
                total_time: state.total_time,
                count: state.count,
                unique_users: state.users.len() as u64,
            })
            .collect();

        tracing::debug!(
            pools = pools.len(),
            records = self.total_count,
            "aggregated pool usage"
        );

        PoolUsageSummary {
            pools,
            total_time: self.total_time,
            total_count: NonZeroU64::new(self.total_count).unwrap_or(NonZeroU64::MIN),
            unique_users: self.users.len() as u64,
        }
    }
}

/// Immutable result of aggregating one report's worth of records.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PoolUsageSummary {
    pools: Vec<PoolAggregate>,
    pub total_time: u128,
    /// Number of records, reported as 1 when there were none.
    pub total_count: NonZeroU64,
    pub unique_users: u64,
}

impl PoolUsageSummary {
    /// Pools in first-seen order.
    pub fn pools(&self) -> &[PoolAggregate] {
        &self.pools
    }

    #[cfg(test)]
    pub fn get(&self, pool_id: &str) -> Option<&PoolAggregate> {
        self.pools.iter().find(|p| p.pool_id == pool_id)
    }

    pub fn mean_time(&self) -> u128 {
        self.total_time / u128::from(self.total_count.get())
    }
}

pub fn aggregate<'a, I>(records: I) -> PoolUsageSummary
where
    I: IntoIterator<Item = &'a UsageRecord>,
{
    records
        .into_iter()
        .fold(PoolAccumulator::new(), |mut acc, r| {
            acc.add(r);
            acc
        })
        .finish()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn example() -> Vec<UsageRecord> {
        vec![
            UsageRecord::new("A", "Pool A", "u1", 100),
            UsageRecord::new("A", "Pool A", "u2", 50),
            UsageRecord::new("B", "Pool B", "u1", 30),
        ]
    }

    #[test]
    fn worked_example() {
        let summary = aggregate(&example());

        let a = summary.get("A").unwrap();
        assert_eq!(a.name, "Pool A");
        assert_eq!(a.total_time, 150);
        assert_eq!(a.count.get(), 2);
        assert_eq!(a.unique_users, 2);
        assert_eq!(a.mean_time(), 75);

        let b = summary.get("B").unwrap();
        assert_eq!(b.total_time, 30);
        assert_eq!(b.count.get(), 1);
        assert_eq!(b.unique_users, 1);

        assert_eq!(summary.total_time, 180);
        assert_eq!(summary.total_count.get(), 3);
        assert_eq!(summary.unique_users, 2);
        assert_eq!(summary.mean_time(), 60);
    }

    #[test]
    fn empty_input_floors_count() {
        let summary = aggregate(std::iter::empty());
        assert!(summary.pools().is_empty());
        assert_eq!(summary.total_time, 0);
        assert_eq!(summary.total_count.get(), 1);
        assert_eq!(summary.unique_users, 0);
        assert_eq!(summary.mean_time(), 0);
    }

    #[test]
    fn pools_keep_first_seen_order() {
        let records = vec![
            UsageRecord::new("z", "Zulu", "u1", 1),
            UsageRecord::new("a", "Alpha", "u1", 500),
            UsageRecord::new("z", "Zulu", "u2", 1),
            UsageRecord::new("m", "Mike", "u3", 9),
        ];
        let ids: Vec<_> = aggregate(&records)
            .pools()
            .iter()
            .map(|p| p.pool_id.clone())
            .collect();
        assert_eq!(ids, ["z", "a", "m"]);
    }

    #[test]
    fn first_seen_name_is_kept() {
        let records = vec![
            UsageRecord::new("A", "Original", "u1", 1),
            UsageRecord::new("A", "Renamed", "u1", 1),
        ];
        let summary = aggregate(&records);
        assert_eq!(summary.get("A").unwrap().name, "Original");
    }

    #[test]
    fn mean_truncates() {
        let records = vec![
            UsageRecord::new("A", "Pool A", "u1", 10),
            UsageRecord::new("A", "Pool A", "u1", 11),
        ];
        let summary = aggregate(&records);
        assert_eq!(summary.get("A").unwrap().mean_time(), 10);
        assert_eq!(summary.get("A").unwrap().unique_users, 1);
    }

    #[test]
    fn huge_times_do_not_overflow() {
        let records = vec![
            UsageRecord::new("A", "Pool A", "u1", u64::MAX),
            UsageRecord::new("A", "Pool A", "u2", u64::MAX),
            UsageRecord::new("B", "Pool B", "u1", u64::MAX),
        ];
        let summary = aggregate(&records);

        let a = summary.get("A").unwrap();
        assert_eq!(a.total_time, 2 * u128::from(u64::MAX));
        assert_eq!(a.mean_time(), u128::from(u64::MAX));
        assert_eq!(summary.total_time, 3 * u128::from(u64::MAX));
        assert_eq!(summary.mean_time(), u128::from(u64::MAX));
    }

    #[test]
    fn single_record_pool_is_counted_once() {
        let summary = aggregate(&vec![UsageRecord::new("A", "Pool A", "u1", 42)]);
        let pools = summary.pools();
        assert_eq!(pools.len(), 1);
        assert_eq!(pools[0].count.get(), 1);
        assert_eq!(pools[0].unique_users, 1);
        assert_eq!(pools[0].total_time, 42);
        assert_eq!(summary.total_count.get(), 1);
    }

    prop_compose! {
        fn arb_record()(
            pool in prop::sample::select(vec!["p1", "p2", "p3", "p4"]),
            user in "[a-e]",
            time in 0u64..100_000,
        ) -> UsageRecord {
            UsageRecord::new(pool, &format!("Pool {pool}"), &user, time)
        }
    }

    proptest! {
        #[test]
        fn totals_match_records(records in prop::collection::vec(arb_record(), 1..200)) {
            let summary = aggregate(&records);
            let time: u128 = records.iter().map(|r| u128::from(r.time)).sum();
            prop_assert_eq!(summary.total_time, time);
            prop_assert_eq!(summary.total_count.get(), records.len() as u64);
        }

        #[test]
        fn pools_sum_to_global(records in prop::collection::vec(arb_record(), 0..200)) {
            let summary = aggregate(&records);
            let pool_time: u128 = summary.pools().iter().map(|p| p.total_time).sum();
            let pool_count: u64 = summary.pools().iter().map(|p| p.count.get()).sum();
            prop_assert_eq!(pool_time, summary.total_time);
            prop_assert_eq!(pool_count, records.len() as u64);
        }

        #[test]
        fn unique_users_bounded_by_count(records in prop::collection::vec(arb_record(), 0..200)) {
            let summary = aggregate(&records);
            for p in summary.pools() {
                prop_assert!(p.unique_users <= p.count.get());
            }
            prop_assert!(summary.unique_users <= summary.total_count.get());
        }
    }
}
