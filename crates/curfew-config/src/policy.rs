//! Validated policy structures

use crate::schema::{RawConfig, RawLimit, RawSettings, RawUser};
use crate::validation::{ValidationError, parse_days, parse_duration, parse_time, validate_limit};
use chrono::Weekday;
use curfew_api::EnforcementAction;
use curfew_util::{UserId, WallClock, weekday_label};
use std::path::PathBuf;
use std::time::Duration;
use tracing::warn;

/// Default delay between the final alert and the enforcement action
pub const DEFAULT_GRACE_PERIOD: Duration = Duration::from_secs(30);

/// Default lifetime of the final alert dialog
pub const DEFAULT_ALERT_TIMEOUT: Duration = Duration::from_secs(20);

/// Validated policy ready for use by the core engine
#[derive(Debug, Clone, Default)]
pub struct Policy {
    /// Process settings
    pub settings: Settings,

    /// Per-user weekly limits
    pub table: PolicyTable,
}

impl Policy {
    /// Convert from raw config.
    ///
    /// A user whose limit expressions fail to parse is recorded as rejected
    /// instead of failing the whole load.
    pub fn from_raw(raw: RawConfig) -> Self {
        let mut table = PolicyTable::new();

        for user in &raw.users {
            let id = UserId::new(user.name.clone());
            match convert_user(user) {
                Ok(entries) => {
                    for entry in entries {
                        table.insert(id.clone(), entry);
                    }
                }
                Err(errors) => {
                    for e in &errors {
                        warn!(user = %id, error = %e, "Rejecting limits for user");
                    }
                    table.reject(id, errors);
                }
            }
        }

        Self {
            settings: Settings::from_raw(raw.settings),
            table,
        }
    }
}

/// Process settings
#[derive(Debug, Clone)]
pub struct Settings {
    pub data_dir: PathBuf,
    /// Rotating log directory; None logs to stderr
    pub log_dir: Option<PathBuf>,
    pub status_path: PathBuf,
    pub grace_period: Duration,
    pub alert_timeout: Duration,
    pub enforcement: EnforcementAction,
    pub speak_warnings: bool,
}

impl Settings {
    fn from_raw(raw: RawSettings) -> Self {
        Self {
            data_dir: raw.data_dir.unwrap_or_else(curfew_util::default_data_dir),
            log_dir: raw.log_dir,
            status_path: raw
                .status_path
                .unwrap_or_else(curfew_util::default_status_path),
            grace_period: raw
                .grace_period_seconds
                .map(Duration::from_secs)
                .unwrap_or(DEFAULT_GRACE_PERIOD),
            alert_timeout: raw
                .alert_timeout_seconds
                .map(Duration::from_secs)
                .unwrap_or(DEFAULT_ALERT_TIMEOUT),
            enforcement: raw.enforcement.unwrap_or_default(),
            speak_warnings: raw.speak_warnings.unwrap_or(true),
        }
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self::from_raw(RawSettings::default())
    }
}

/// One weekday's budget and cutoff for one user
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PolicyEntry {
    pub weekday: Weekday,
    /// Allowed usage, evaluated as an offset from the moment of the check
    pub max_duration: chrono::Duration,
    /// Time of day after which usage is disallowed
    pub cutoff: WallClock,
    /// Expression as written in the config, for display
    pub max_duration_expr: String,
    pub cutoff_expr: String,
}

impl PolicyEntry {
    /// Build an entry from config expressions
    pub fn parse(
        weekday: Weekday,
        max_duration: &str,
        cutoff: &str,
    ) -> Result<Self, String> {
        Ok(Self {
            weekday,
            max_duration: parse_duration(max_duration)?,
            cutoff: parse_time(cutoff)?,
            max_duration_expr: max_duration.to_string(),
            cutoff_expr: cutoff.to_string(),
        })
    }
}

/// A user's weekly schedule, in config order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserSchedule {
    pub user: UserId,
    pub entries: Vec<PolicyEntry>,
}

/// A user whose limits could not be parsed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RejectedUser {
    pub user: UserId,
    pub errors: Vec<ValidationError>,
}

impl RejectedUser {
    /// All errors on one line
    pub fn summary(&self) -> String {
        self.errors
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join("; ")
    }
}

/// Read-only per-user, per-weekday limits
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PolicyTable {
    schedules: Vec<UserSchedule>,
    rejected: Vec<RejectedUser>,
}

impl PolicyTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an entry to a user's schedule
    pub fn insert(&mut self, user: UserId, entry: PolicyEntry) {
        match self.schedules.iter_mut().find(|s| s.user == user) {
            Some(schedule) => schedule.entries.push(entry),
            None => self.schedules.push(UserSchedule {
                user,
                entries: vec![entry],
            }),
        }
    }

    /// Builder form of [`insert`](Self::insert)
    pub fn with_entry(mut self, user: impl Into<UserId>, entry: PolicyEntry) -> Self {
        self.insert(user.into(), entry);
        self
    }

    /// Find the user's entry for `weekday`.
    ///
    /// None is the normal answer for days without limits. If a table was
    /// built with duplicate weekdays, the first entry wins.
    pub fn lookup(&self, user: &UserId, weekday: Weekday) -> Option<&PolicyEntry> {
        self.schedules
            .iter()
            .find(|s| &s.user == user)?
            .entries
            .iter()
            .find(|e| e.weekday == weekday)
    }

    /// Mark a user's limits as unusable. Their checks fail until the config is fixed.
    pub fn reject(&mut self, user: UserId, errors: Vec<ValidationError>) {
        self.schedules.retain(|s| s.user != user);
        self.rejected.push(RejectedUser { user, errors });
    }

    pub fn rejection(&self, user: &UserId) -> Option<&RejectedUser> {
        self.rejected.iter().find(|r| &r.user == user)
    }

    pub fn rejected(&self) -> &[RejectedUser] {
        &self.rejected
    }

    pub fn schedules(&self) -> &[UserSchedule] {
        &self.schedules
    }

    pub fn user_count(&self) -> usize {
        self.schedules.len()
    }

    pub fn entry_count(&self) -> usize {
        self.schedules.iter().map(|s| s.entries.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.schedules.is_empty() && self.rejected.is_empty()
    }
}

// Conversion helpers

fn convert_user(raw: &RawUser) -> Result<Vec<PolicyEntry>, Vec<ValidationError>> {
    let mut entries = Vec::new();
    let mut errors: Vec<_> = raw
        .limits
        .iter()
        .flat_map(|limit| validate_limit(limit, &raw.name))
        .collect();
    if !errors.is_empty() {
        return Err(errors);
    }

    for limit in &raw.limits {
        match convert_limit(limit, &raw.name) {
            Ok(converted) => entries.extend(converted),
            Err(e) => errors.push(e),
        }
    }

    if errors.is_empty() {
        Ok(entries)
    } else {
        Err(errors)
    }
}

fn convert_limit(raw: &RawLimit, user: &str) -> Result<Vec<PolicyEntry>, ValidationError> {
    let days = parse_days(&raw.days).map_err(|message| ValidationError::InvalidDaySpec {
        user: user.to_string(),
        message,
    })?;

    days.into_iter()
        .map(|day| {
            PolicyEntry::parse(day, &raw.max_duration, &raw.cutoff).map_err(|message| {
                ValidationError::UserError {
                    user: user.to_string(),
                    message: format!("{} limit: {}", weekday_label(day), message),
                }
            })
        })
        .collect()
}
