//! Core events emitted by the engine

use curfew_api::{EnforcementAction, EnforcementReason, UsageSnapshot};
use curfew_util::UserId;

/// Events emitted by the limit engine during one check
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CoreEvent {
    /// A tick was counted against today's usage
    UsageRecorded { snapshot: UsageSnapshot },

    /// Warning threshold reached
    Warning {
        user: UserId,
        minutes_remaining: i64,
        message: String,
    },

    /// The session is being ended
    EnforcementDue {
        user: UserId,
        reason: EnforcementReason,
        action: EnforcementAction,
    },
}

/// Result of a single `LimitEngine::update` call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckReport {
    pub user: UserId,
    /// Absent when no policy covers the user today
    pub snapshot: Option<UsageSnapshot>,
    pub events: Vec<CoreEvent>,
}

impl CheckReport {
    pub(crate) fn idle(user: UserId) -> Self {
        Self {
            user,
            snapshot: None,
            events: Vec::new(),
        }
    }

    /// True when the user had no policy for today
    pub fn is_idle(&self) -> bool {
        self.snapshot.is_none()
    }

    /// Minutes announced by a warning, if one fired
    pub fn warning(&self) -> Option<i64> {
        self.events.iter().find_map(|e| match e {
            CoreEvent::Warning {
                minutes_remaining, ..
            } => Some(*minutes_remaining),
            _ => None,
        })
    }

    /// Why the session was ended, if it was
    pub fn enforcement(&self) -> Option<&EnforcementReason> {
        self.events.iter().find_map(|e| match e {
            CoreEvent::EnforcementDue { reason, .. } => Some(reason),
            _ => None,
        })
    }
}
