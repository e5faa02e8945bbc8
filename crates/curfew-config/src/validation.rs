//! Configuration validation

use crate::schema::{RawConfig, RawDays, RawLimit, RawUser};
use chrono::Weekday;
use curfew_util::{WallClock, parse_weekday, weekday_label};
use std::collections::HashSet;
use thiserror::Error;

/// Longest accepted max duration
const MAX_DURATION_MINUTES: i64 = 24 * 60;

/// Validation error
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("User '{user}': {message}")]
    UserError { user: String, message: String },

    #[error("Duplicate user: {0}")]
    DuplicateUser(String),

    #[error("User '{user}' has more than one limit for {day}")]
    DuplicateWeekday { user: String, day: String },

    #[error("User '{user}': invalid duration '{value}': {message}")]
    InvalidDuration {
        user: String,
        value: String,
        message: String,
    },

    #[error("User '{user}': invalid time '{value}': {message}")]
    InvalidTimeFormat {
        user: String,
        value: String,
        message: String,
    },

    #[error("User '{user}': invalid day specification: {message}")]
    InvalidDaySpec { user: String, message: String },

    #[error("Global config error: {0}")]
    GlobalError(String),
}

impl ValidationError {
    /// Errors confined to one user's limit expressions.
    ///
    /// These reject that user only; everything else fails the whole load.
    pub fn is_user_scoped(&self) -> bool {
        matches!(
            self,
            Self::InvalidDuration { .. } | Self::InvalidTimeFormat { .. } | Self::InvalidDaySpec { .. }
        )
    }
}

/// Validate a raw configuration, collecting every problem found
pub fn validate_config(config: &RawConfig) -> Vec<ValidationError> {
    let mut errors = Vec::new();

    let mut seen_users = HashSet::new();
    for user in &config.users {
        if !seen_users.insert(&user.name) {
            errors.push(ValidationError::DuplicateUser(user.name.clone()));
        }
    }

    if config.settings.alert_timeout_seconds == Some(0) {
        errors.push(ValidationError::GlobalError(
            "alert_timeout_seconds must be greater than 0".into(),
        ));
    }

    for user in &config.users {
        errors.extend(validate_user(user));
    }

    errors
}

fn validate_user(user: &RawUser) -> Vec<ValidationError> {
    let mut errors = Vec::new();

    if user.name.trim().is_empty() {
        errors.push(ValidationError::UserError {
            user: user.name.clone(),
            message: "name cannot be empty".into(),
        });
    }

    // A later row for the same weekday would be shadowed by lookup's first match
    let mut seen_days = HashSet::new();
    for limit in &user.limits {
        errors.extend(validate_limit(limit, &user.name));

        if let Ok(days) = parse_days(&limit.days) {
            for day in days {
                if !seen_days.insert(day) {
                    errors.push(ValidationError::DuplicateWeekday {
                        user: user.name.clone(),
                        day: weekday_label(day).to_string(),
                    });
                }
            }
        }
    }

    errors
}

pub(crate) fn validate_limit(limit: &RawLimit, user: &str) -> Vec<ValidationError> {
    let mut errors = Vec::new();

    if let Err(e) = parse_days(&limit.days) {
        errors.push(ValidationError::InvalidDaySpec {
            user: user.to_string(),
            message: e,
        });
    }

    if let Err(e) = parse_duration(&limit.max_duration) {
        errors.push(ValidationError::InvalidDuration {
            user: user.to_string(),
            value: limit.max_duration.clone(),
            message: e,
        });
    }

    if let Err(e) = parse_time(&limit.cutoff) {
        errors.push(ValidationError::InvalidTimeFormat {
            user: user.to_string(),
            value: limit.cutoff.clone(),
            message: e,
        });
    }

    errors
}

/// Parse a time of day: 24-hour "HH:MM", or 12-hour "H[:MM] am|pm"
pub fn parse_time(s: &str) -> Result<WallClock, String> {
    let text = s.trim().to_lowercase();

    let (clock, pm) = if let Some(rest) = text.strip_suffix("pm") {
        (rest.trim_end(), Some(true))
    } else if let Some(rest) = text.strip_suffix("am") {
        (rest.trim_end(), Some(false))
    } else {
        (text.as_str(), None)
    };

    let (hour_str, minute_str) = match (clock.split_once(':'), pm) {
        (Some((h, m)), _) => (h, m),
        (None, Some(_)) => (clock, "0"),
        (None, None) => return Err("Expected HH:MM or H[:MM] am/pm".into()),
    };

    let hour: u8 = hour_str
        .trim()
        .parse()
        .map_err(|_| "Invalid hour".to_string())?;
    let minute: u8 = minute_str
        .trim()
        .parse()
        .map_err(|_| "Invalid minute".to_string())?;

    if minute >= 60 {
        return Err("Minute must be 0-59".into());
    }

    let hour = match pm {
        None => {
            if hour >= 24 {
                return Err("Hour must be 0-23".into());
            }
            hour
        }
        Some(is_pm) => {
            if hour == 0 || hour > 12 {
                return Err("Hour must be 1-12 with am/pm".into());
            }
            (hour % 12) + if is_pm { 12 } else { 0 }
        }
    };

    WallClock::new(hour, minute).ok_or_else(|| "Time out of range".to_string())
}

/// Parse a duration expression made of `<n> <unit>` terms.
///
/// Units: h, hr, hrs, hour, hours, m, min, mins, minute, minutes.
/// Terms may be written together ("1h30m") and joined by commas or "and".
pub fn parse_duration(s: &str) -> Result<chrono::Duration, String> {
    let text = s.trim().to_lowercase();
    if text.is_empty() {
        return Err("Duration cannot be empty".into());
    }

    // Split "1h30m" into "1 h 30 m"
    let mut spaced = String::with_capacity(text.len() + 8);
    let mut prev: Option<char> = None;
    for c in text.chars() {
        if let Some(p) = prev {
            let boundary = p.is_ascii_alphanumeric()
                && c.is_ascii_alphanumeric()
                && p.is_ascii_digit() != c.is_ascii_digit();
            if boundary {
                spaced.push(' ');
            }
        }
        spaced.push(if c == ',' { ' ' } else { c });
        prev = Some(c);
    }

    let tokens: Vec<&str> = spaced
        .split_whitespace()
        .filter(|t| *t != "and")
        .collect();

    if tokens.is_empty() || tokens.len() % 2 != 0 {
        return Err("Expected '<number> <unit>' terms, e.g. '5 hours'".into());
    }

    let mut total_minutes: i64 = 0;
    for term in tokens.chunks(2) {
        let amount = term[0]
            .parse::<u32>()
            .map(i64::from)
            .map_err(|_| format!("Invalid number '{}'", term[0]))?;
        let unit_minutes = match term[1] {
            "h" | "hr" | "hrs" | "hour" | "hours" => 60,
            "m" | "min" | "mins" | "minute" | "minutes" => 1,
            other => return Err(format!("Unknown unit '{}'", other)),
        };
        total_minutes = amount
            .checked_mul(unit_minutes)
            .and_then(|m| total_minutes.checked_add(m))
            .ok_or_else(|| "Duration too large".to_string())?;
    }

    if total_minutes > MAX_DURATION_MINUTES {
        return Err("Duration must not exceed 24 hours".into());
    }

    Ok(chrono::Duration::minutes(total_minutes))
}

/// Parse days specification into weekdays, in the order written
pub fn parse_days(days: &RawDays) -> Result<Vec<Weekday>, String> {
    const ALL: [Weekday; 7] = [
        Weekday::Mon,
        Weekday::Tue,
        Weekday::Wed,
        Weekday::Thu,
        Weekday::Fri,
        Weekday::Sat,
        Weekday::Sun,
    ];

    match days {
        RawDays::Preset(preset) => match preset.to_lowercase().as_str() {
            "all" | "every" | "daily" => Ok(ALL.to_vec()),
            "weekdays" => Ok(ALL[..5].to_vec()),
            "weekends" => Ok(ALL[5..].to_vec()),
            other => parse_weekday(other)
                .map(|d| vec![d])
                .ok_or_else(|| format!("Unknown day preset: {}", other)),
        },
        RawDays::List(list) => {
            if list.is_empty() {
                return Err("Day list cannot be empty".into());
            }
            list.iter()
                .map(|day| parse_weekday(day).ok_or_else(|| format!("Unknown day: {}", day)))
                .collect()
        }
    }
}
