//! Raw configuration schema (as parsed from TOML)

use curfew_api::EnforcementAction;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Raw configuration as parsed from TOML
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RawConfig {
    /// Config schema version
    pub config_version: u32,

    /// Global settings
    #[serde(default)]
    pub settings: RawSettings,

    /// Users subject to limits
    #[serde(default)]
    pub users: Vec<RawUser>,
}

/// Process-level settings
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct RawSettings {
    /// Directory holding the usage database
    pub data_dir: Option<PathBuf>,

    /// Directory for rotating log files (stderr when unset)
    pub log_dir: Option<PathBuf>,

    /// File the status line is written to
    pub status_path: Option<PathBuf>,

    /// Delay between the final alert and the enforcement action
    pub grace_period_seconds: Option<u64>,

    /// How long the final alert stays up before it dismisses itself
    pub alert_timeout_seconds: Option<u64>,

    /// "logout" (default) or "suspend"
    pub enforcement: Option<EnforcementAction>,

    /// Also speak proximity warnings aloud
    pub speak_warnings: Option<bool>,
}

/// Raw per-user schedule
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RawUser {
    /// Login name as reported by the OS
    pub name: String,

    /// Weekly limits
    #[serde(default)]
    pub limits: Vec<RawLimit>,
}

/// One limit row, covering one or more weekdays
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RawLimit {
    /// "weekdays", "weekends", "all", a single day, or a list like ["mon", "tue"]
    pub days: RawDays,

    /// Allowed duration, e.g. "5 hours" or "1 hour 30 minutes"
    pub max_duration: String,

    /// Time of day after which usage is disallowed, e.g. "9:30 pm" or "21:30"
    pub cutoff: String,
}

/// Days specification
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(untagged)]
pub enum RawDays {
    Preset(String),
    List(Vec<String>),
}
