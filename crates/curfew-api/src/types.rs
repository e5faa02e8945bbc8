//! Shared types for the curfew engine

use chrono::NaiveDate;
use curfew_util::{UserId, WallClock};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Remaining-minute values at which a proximity warning is surfaced
pub const WARNING_WINDOW_MINUTES: i64 = 30;

/// Warnings inside the window fire on multiples of this step
pub const WARNING_STEP_MINUTES: i64 = 5;

/// Usage figures for one user at one check. Derived, never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UsageSnapshot {
    pub user: UserId,
    pub day: NaiveDate,
    /// Ticks recorded today; one tick is one minute
    pub usage_minutes_today: u32,
    /// Minutes allowed by the policy's max duration
    pub max_minutes: i64,
    /// Minutes between now and today's cutoff; negative once passed
    pub minutes_until_cutoff: i64,
}

impl UsageSnapshot {
    /// `max_minutes - usage_minutes_today`
    pub fn budget_remaining(&self) -> i64 {
        self.max_minutes - self.usage_minutes_today as i64
    }

    /// The tighter of the remaining budget and the time to cutoff
    pub fn remaining(&self) -> i64 {
        self.budget_remaining().min(self.minutes_until_cutoff)
    }

    pub fn cutoff_passed(&self) -> bool {
        self.minutes_until_cutoff <= 0
    }

    pub fn budget_exhausted(&self) -> bool {
        self.usage_minutes_today as i64 >= self.max_minutes
    }
}

/// Why enforcement fired
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum EnforcementReason {
    /// Today's cutoff time has been reached
    CutoffPassed { cutoff: WallClock },
    /// Accumulated usage reached the allowed minutes
    BudgetExhausted { used_minutes: u32, max_minutes: i64 },
}

impl fmt::Display for EnforcementReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EnforcementReason::CutoffPassed { cutoff } => {
                write!(f, "cutoff {} reached", cutoff)
            }
            EnforcementReason::BudgetExhausted {
                used_minutes,
                max_minutes,
            } => write!(f, "used {} of {} minutes", used_minutes, max_minutes),
        }
    }
}

/// What happens to the session once the grace period runs out
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EnforcementAction {
    /// End the user's login session
    #[default]
    Logout,
    /// Suspend the machine
    Suspend,
}

impl fmt::Display for EnforcementAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EnforcementAction::Logout => write!(f, "logout"),
            EnforcementAction::Suspend => write!(f, "suspend"),
        }
    }
}
