//! Limit engine

use chrono::{DateTime, Datelike, Local};
use curfew_api::{EnforcementAction, EnforcementReason, UsageSnapshot};
use curfew_config::{DEFAULT_GRACE_PERIOD, PolicyEntry, PolicyTable, Settings};
use curfew_host_api::HostAdapter;
use curfew_store::{TICK_MINUTES, UsageStore};
use curfew_util::{UserId, weekday_label};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info, warn};

use crate::{CheckReport, CoreError, CoreEvent, CoreResult, allowed_minutes_from_now, decide, minutes_until};

pub const WARNING_TITLE: &str = "Computer time";
pub const ALERT_TITLE: &str = "Time is up";

/// Status line published once the session is being ended
pub const STATUS_TIME_UP: &str = "Time is up";

/// Enforcement behaviour of the engine
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineOptions {
    /// Pause between the final alert and the enforcement action
    pub grace_period: Duration,
    pub enforcement: EnforcementAction,
    /// Also speak warnings when the host can
    pub speak_warnings: bool,
}

impl Default for EngineOptions {
    fn default() -> Self {
        Self {
            grace_period: DEFAULT_GRACE_PERIOD,
            enforcement: EnforcementAction::default(),
            speak_warnings: true,
        }
    }
}

impl From<&Settings> for EngineOptions {
    fn from(settings: &Settings) -> Self {
        Self {
            grace_period: settings.grace_period,
            enforcement: settings.enforcement,
            speak_warnings: settings.speak_warnings,
        }
    }
}

/// Text of the proximity warning
pub fn warning_message(minutes_remaining: i64) -> String {
    format!("{} minutes remaining", minutes_remaining)
}

/// Text of the final alert shown before the grace period
pub fn enforcement_message(action: EnforcementAction, grace_period: Duration) -> String {
    let consequence = match action {
        EnforcementAction::Logout => "you will be logged out",
        EnforcementAction::Suspend => "the computer will go to sleep",
    };
    format!(
        "Your computer time for today is over. Save your work now, {} in {} seconds.",
        consequence,
        grace_period.as_secs()
    )
}

/// The limit engine
///
/// Each `update` is one stateless check: the only memory between runs is the
/// usage store.
pub struct LimitEngine {
    table: PolicyTable,
    store: Arc<dyn UsageStore>,
    host: Arc<dyn HostAdapter>,
    options: EngineOptions,
}

impl LimitEngine {
    pub fn new(
        table: PolicyTable,
        store: Arc<dyn UsageStore>,
        host: Arc<dyn HostAdapter>,
        options: EngineOptions,
    ) -> Self {
        info!(
            users = table.user_count(),
            entries = table.entry_count(),
            rejected = table.rejected().len(),
            enforcement = %options.enforcement,
            "Limit engine initialized"
        );

        Self {
            table,
            store,
            host,
            options,
        }
    }

    pub fn table(&self) -> &PolicyTable {
        &self.table
    }

    pub fn options(&self) -> &EngineOptions {
        &self.options
    }

    /// Run one check at `now`.
    ///
    /// Errors when the current user cannot be determined, when that user's
    /// limits were rejected at load, or when the enforcement action itself
    /// fails. Store and advisory failures are logged and the check carries on.
    pub fn update(&self, now: DateTime<Local>) -> CoreResult<CheckReport> {
        let user = self.host.current_user().map_err(CoreError::Capability)?;
        let weekday = now.weekday();

        if let Some(rejected) = self.table.rejection(&user) {
            error!(user = %user, errors = rejected.errors.len(), "Limits for user are invalid");
            return Err(CoreError::Config {
                user,
                message: rejected.summary(),
            });
        }

        let Some(entry) = self.table.lookup(&user, weekday) else {
            debug!(
                user = %user,
                weekday = weekday_label(weekday),
                "No limit applies today"
            );
            self.clear_status();
            return Ok(CheckReport::idle(user));
        };

        let snapshot = self.track(&user, entry, now);
        let decision = decide(&snapshot, entry.cutoff);

        let mut events = vec![CoreEvent::UsageRecorded {
            snapshot: snapshot.clone(),
        }];

        if let Some(minutes_remaining) = decision.warning {
            let message = warning_message(minutes_remaining);
            self.announce(&message);
            events.push(CoreEvent::Warning {
                user: user.clone(),
                minutes_remaining,
                message,
            });
        }

        self.publish_status(&snapshot, decision.enforcement.is_some());

        if let Some(reason) = decision.enforcement {
            let action = self.enforce(&user, &reason)?;
            events.push(CoreEvent::EnforcementDue {
                user: user.clone(),
                reason,
                action,
            });
        }

        Ok(CheckReport {
            user,
            snapshot: Some(snapshot),
            events,
        })
    }

    /// Record this run's tick and read back today's usage
    fn track(&self, user: &UserId, entry: &PolicyEntry, now: DateTime<Local>) -> UsageSnapshot {
        let day = now.date_naive();

        let mut written = 0;
        match self.store.record_tick_at(user, now) {
            Ok(()) => written = 1,
            Err(e) => warn!(user = %user, error = %e, "Failed to record usage tick"),
        }

        let ticks = match self.store.count_on(user, day) {
            Ok(count) => count,
            Err(e) => {
                warn!(
                    user = %user,
                    error = %e,
                    "Failed to read usage, counting this run only"
                );
                written
            }
        };

        let snapshot = UsageSnapshot {
            user: user.clone(),
            day,
            usage_minutes_today: ticks * TICK_MINUTES,
            max_minutes: allowed_minutes_from_now(entry.max_duration, now),
            minutes_until_cutoff: minutes_until(now, entry.cutoff),
        };

        debug!(
            user = %user,
            used = snapshot.usage_minutes_today,
            max = snapshot.max_minutes,
            until_cutoff = snapshot.minutes_until_cutoff,
            "Usage evaluated"
        );

        snapshot
    }

    fn announce(&self, message: &str) {
        let caps = self.host.capabilities();
        info!(warning = message, "Usage warning");

        if caps.can_notify {
            if let Err(e) = self.host.notify(WARNING_TITLE, message) {
                warn!(error = %e, "Failed to show warning notification");
            }
        }

        if self.options.speak_warnings && caps.can_speak {
            if let Err(e) = self.host.speak(message) {
                warn!(error = %e, "Failed to speak warning");
            }
        }
    }

    fn publish_status(&self, snapshot: &UsageSnapshot, enforcing: bool) {
        if !self.host.capabilities().can_write_status {
            return;
        }

        let line = if enforcing {
            STATUS_TIME_UP.to_string()
        } else {
            warning_message(snapshot.remaining())
        };

        if let Err(e) = self.host.write_status_line(&line) {
            warn!(error = %e, "Failed to write status line");
        }
    }

    /// Blank out a status line left over from an earlier limited day
    fn clear_status(&self) {
        if !self.host.capabilities().can_write_status {
            return;
        }

        if let Err(e) = self.host.write_status_line("") {
            warn!(error = %e, "Failed to clear status line");
        }
    }

    /// Alert, wait out the grace period, then end the session
    fn enforce(&self, user: &UserId, reason: &EnforcementReason) -> CoreResult<EnforcementAction> {
        let caps = self.host.capabilities();
        let action = self.effective_action();
        let message = enforcement_message(action, self.options.grace_period);

        info!(user = %user, reason = %reason, action = %action, "Enforcing limit");

        let shown = if caps.can_alert {
            self.host.alert(ALERT_TITLE, &message)
        } else {
            self.host.notify(ALERT_TITLE, &message)
        };
        if let Err(e) = shown {
            warn!(error = %e, "Failed to show enforcement alert");
        }

        if !self.options.grace_period.is_zero() {
            debug!(grace_secs = self.options.grace_period.as_secs(), "Grace period");
            std::thread::sleep(self.options.grace_period);
        }

        let result = match action {
            EnforcementAction::Logout => self.host.force_logout(user),
            EnforcementAction::Suspend => self.host.sleep_system(),
        };

        result.map_err(|e| {
            error!(user = %user, action = %action, error = %e, "Enforcement failed");
            CoreError::Enforcement(e)
        })?;

        Ok(action)
    }

    /// Configured action, falling back to logout when the host cannot suspend
    fn effective_action(&self) -> EnforcementAction {
        let caps = self.host.capabilities();
        let configured = self.options.enforcement;

        if !caps.supports_enforcement(configured)
            && caps.supports_enforcement(EnforcementAction::Logout)
        {
            warn!(configured = %configured, "Host cannot {}, logging out instead", configured);
            return EnforcementAction::Logout;
        }

        configured
    }
}
