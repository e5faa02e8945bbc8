//! Pure decision functions
//!
//! Everything here is a function of its arguments; the engine feeds in the
//! clock and the stored usage.

use chrono::{DateTime, Local};
use curfew_api::{
    EnforcementReason, UsageSnapshot, WARNING_STEP_MINUTES, WARNING_WINDOW_MINUTES,
};
use curfew_util::WallClock;

/// Minutes from `from` to `to`, rounded to the nearest whole minute.
/// Negative when `to` is earlier.
pub fn minutes_between(from: DateTime<Local>, to: DateTime<Local>) -> i64 {
    let millis = to.signed_duration_since(from).num_milliseconds();
    (millis as f64 / 60_000.0).round() as i64
}

/// Minutes allowed by `max_duration` when evaluated at `now`.
///
/// The duration is read as a clock offset: the distance from `now` to
/// `now + max_duration`. The result does not shrink as the day goes on, so
/// the budget acts as a fixed ceiling on the day's tick count.
pub fn allowed_minutes_from_now(max_duration: chrono::Duration, now: DateTime<Local>) -> i64 {
    minutes_between(now, now + max_duration)
}

/// Minutes until today's `cutoff`; zero or negative once it has passed
pub fn minutes_until(now: DateTime<Local>, cutoff: WallClock) -> i64 {
    minutes_between(now, cutoff.on_date_of(&now))
}

/// Whether `remaining` minutes should raise a proximity warning.
///
/// Fires at 30, 25, 20, 15, 10, 5 and 1 minutes remaining.
pub fn should_warn(remaining: i64) -> bool {
    let in_window = remaining > 0 && remaining <= WARNING_WINDOW_MINUTES;
    (in_window && remaining % WARNING_STEP_MINUTES == 0) || remaining == 1
}

/// Why the session must end now, if it must.
///
/// The cutoff is reported ahead of the budget when both are exceeded.
pub fn enforcement_reason(snapshot: &UsageSnapshot, cutoff: WallClock) -> Option<EnforcementReason> {
    if snapshot.cutoff_passed() {
        Some(EnforcementReason::CutoffPassed { cutoff })
    } else if snapshot.budget_exhausted() {
        Some(EnforcementReason::BudgetExhausted {
            used_minutes: snapshot.usage_minutes_today,
            max_minutes: snapshot.max_minutes,
        })
    } else {
        None
    }
}

/// Outcome of evaluating one snapshot
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Decision {
    /// Remaining minutes to announce, if a warning threshold was hit
    pub warning: Option<i64>,
    /// Set when the session must end
    pub enforcement: Option<EnforcementReason>,
}

/// Evaluate both checks. They are independent: one call can warn and enforce.
pub fn decide(snapshot: &UsageSnapshot, cutoff: WallClock) -> Decision {
    let remaining = snapshot.remaining();
    Decision {
        warning: should_warn(remaining).then_some(remaining),
        enforcement: enforcement_reason(snapshot, cutoff),
    }
}
