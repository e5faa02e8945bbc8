//! Daily usage series for reporting

use curfew_api::DailySeries;
use curfew_store::{StoreResult, UsageStore};
use curfew_util::UserId;
use std::sync::Arc;
use tracing::debug;

/// Turns the usage ledger into a contiguous per-day series
pub struct DailyAggregator {
    store: Arc<dyn UsageStore>,
}

impl DailyAggregator {
    pub fn new(store: Arc<dyn UsageStore>) -> Self {
        Self { store }
    }

    /// Minutes per day for `user` from their first recorded day to their
    /// last, with days without usage present as zero.
    pub fn build_series(&self, user: &UserId) -> StoreResult<DailySeries> {
        let totals = self.store.daily_totals(user)?;
        let series = DailySeries::from_sparse(totals.into_iter().map(|t| (t.day, t.minutes())));

        debug!(
            user = %user,
            days = series.len(),
            total_minutes = series.total_minutes(),
            "Daily series built"
        );

        Ok(series)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, Local, NaiveDate, TimeZone};
    use curfew_store::SqliteStore;

    fn at(d: u32, h: u32, m: u32) -> DateTime<Local> {
        Local.with_ymd_and_hms(2025, 12, d, h, m, 0).unwrap()
    }

    fn date(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 12, d).unwrap()
    }

    #[test]
    fn test_empty_history() {
        let store = Arc::new(SqliteStore::in_memory().unwrap());
        let aggregator = DailyAggregator::new(store);

        let series = aggregator.build_series(&UserId::new("alice")).unwrap();
        assert!(series.is_empty());
    }

    #[test]
    fn test_gaps_are_zero_filled() {
        let store = Arc::new(SqliteStore::in_memory().unwrap());
        let alice = UserId::new("alice");

        for m in 0..3 {
            store.record_tick_at(&alice, at(1, 10, m)).unwrap();
        }
        store.record_tick_at(&alice, at(4, 10, 0)).unwrap();

        let aggregator = DailyAggregator::new(store);
        let series = aggregator.build_series(&alice).unwrap();

        let days: Vec<_> = series.iter().collect();
        assert_eq!(
            days,
            vec![(date(1), 3), (date(2), 0), (date(3), 0), (date(4), 1)]
        );
    }

    #[test]
    fn test_single_day() {
        let store = Arc::new(SqliteStore::in_memory().unwrap());
        let alice = UserId::new("alice");
        store.record_tick_at(&alice, at(29, 10, 0)).unwrap();
        store.record_tick_at(&alice, at(29, 10, 1)).unwrap();

        let series = DailyAggregator::new(store).build_series(&alice).unwrap();

        assert_eq!(series.len(), 1);
        assert_eq!(series.get(date(29)), Some(2));
    }

    #[test]
    fn test_other_users_excluded() {
        let store = Arc::new(SqliteStore::in_memory().unwrap());
        store.record_tick_at(&UserId::new("alice"), at(1, 10, 0)).unwrap();
        store.record_tick_at(&UserId::new("bob"), at(10, 10, 0)).unwrap();

        let series = DailyAggregator::new(store)
            .build_series(&UserId::new("alice"))
            .unwrap();

        assert_eq!(series.len(), 1);
        assert_eq!(series.last_date(), Some(date(1)));
    }
}
