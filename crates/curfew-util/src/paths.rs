//! Default paths for curfew components
//!
//! Paths are user-writable by default (no root required):
//! - Config: `$XDG_CONFIG_HOME/curfew/config.toml` or `~/.config/curfew/config.toml`
//! - Data: `$XDG_DATA_HOME/curfew` or `~/.local/share/curfew`
//! - Status line and lock file: `$XDG_RUNTIME_DIR/curfew` or `/tmp/curfew-$USER`

use std::path::PathBuf;

/// Environment variable for overriding the config file path
pub const CURFEW_CONFIG_ENV: &str = "CURFEW_CONFIG";

/// Environment variable for overriding the data directory
pub const CURFEW_DATA_DIR_ENV: &str = "CURFEW_DATA_DIR";

/// Application subdirectory name
const APP_DIR: &str = "curfew";

/// Database filename within the data directory
pub const DATABASE_FILENAME: &str = "usage.db";

const CONFIG_FILENAME: &str = "config.toml";
const STATUS_FILENAME: &str = "status";
const LOCK_FILENAME: &str = "curfew.lock";

/// Get the default config file path.
///
/// Order of precedence:
/// 1. `$XDG_CONFIG_HOME/curfew/config.toml` (if XDG_CONFIG_HOME is set)
/// 2. `~/.config/curfew/config.toml` (fallback)
pub fn default_config_path() -> PathBuf {
    if let Ok(config_home) = std::env::var("XDG_CONFIG_HOME") {
        return PathBuf::from(config_home).join(APP_DIR).join(CONFIG_FILENAME);
    }

    if let Ok(home) = std::env::var("HOME") {
        return PathBuf::from(home)
            .join(".config")
            .join(APP_DIR)
            .join(CONFIG_FILENAME);
    }

    PathBuf::from("/etc").join(APP_DIR).join(CONFIG_FILENAME)
}

/// Get the default data directory.
///
/// Order of precedence:
/// 1. `$CURFEW_DATA_DIR` environment variable (if set)
/// 2. `$XDG_DATA_HOME/curfew` (if XDG_DATA_HOME is set)
/// 3. `~/.local/share/curfew` (fallback)
pub fn default_data_dir() -> PathBuf {
    if let Ok(path) = std::env::var(CURFEW_DATA_DIR_ENV) {
        return PathBuf::from(path);
    }

    data_dir_without_env()
}

/// Get the data directory without checking CURFEW_DATA_DIR.
/// Used for default values in configs where the env var is checked separately.
pub fn data_dir_without_env() -> PathBuf {
    if let Ok(data_home) = std::env::var("XDG_DATA_HOME") {
        return PathBuf::from(data_home).join(APP_DIR);
    }

    if let Ok(home) = std::env::var("HOME") {
        return PathBuf::from(home)
            .join(".local")
            .join("share")
            .join(APP_DIR);
    }

    // Last resort
    PathBuf::from("/tmp").join(APP_DIR).join("data")
}

/// Runtime directory holding the status line and the instance lock
pub fn runtime_dir() -> PathBuf {
    if let Ok(runtime_dir) = std::env::var("XDG_RUNTIME_DIR") {
        return PathBuf::from(runtime_dir).join(APP_DIR);
    }

    let username = std::env::var("USER").unwrap_or_else(|_| "unknown".to_string());
    PathBuf::from(format!("/tmp/{}-{}", APP_DIR, username))
}

/// Default path of the status line file
pub fn default_status_path() -> PathBuf {
    runtime_dir().join(STATUS_FILENAME)
}

/// Default path of the single-instance lock file
pub fn default_lock_path() -> PathBuf {
    runtime_dir().join(LOCK_FILENAME)
}
