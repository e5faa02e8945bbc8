//! Store trait definitions

use chrono::{DateTime, Local, NaiveDate};
use curfew_util::UserId;

use crate::StoreResult;

/// Minutes of usage represented by one tick.
///
/// The check runs once a minute, so counting rows counts minutes. A scheduler
/// running at a different cadence breaks this equivalence.
pub const TICK_MINUTES: u32 = 1;

/// Ticks recorded for one user on one day
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DailyTotal {
    pub day: NaiveDate,
    pub ticks: u32,
}

impl DailyTotal {
    pub fn minutes(&self) -> u32 {
        self.ticks * TICK_MINUTES
    }
}

/// Usage ledger
pub trait UsageStore: Send + Sync {
    /// Create the usage table and its indexes if they are missing
    fn ensure_schema(&self) -> StoreResult<()>;

    /// Append one tick for `user` stamped with `at` (local date and time)
    fn record_tick_at(&self, user: &UserId, at: DateTime<Local>) -> StoreResult<()>;

    /// Append one tick for `user` stamped with the current time
    fn record_tick(&self, user: &UserId) -> StoreResult<()> {
        self.record_tick_at(user, curfew_util::now())
    }

    /// Number of ticks for `user` on `day`; zero when none
    fn count_on(&self, user: &UserId, day: NaiveDate) -> StoreResult<u32>;

    /// Number of ticks for `user` today
    fn count_today(&self, user: &UserId) -> StoreResult<u32> {
        self.count_on(user, curfew_util::now().date_naive())
    }

    /// Per-day tick counts for `user` over every recorded day, ascending
    fn daily_totals(&self, user: &UserId) -> StoreResult<Vec<DailyTotal>>;

    /// Check if store is healthy
    fn is_healthy(&self) -> bool;
}
