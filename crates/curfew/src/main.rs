//! curfew - per-user daily computer time limits
//!
//! Meant to be run once a minute (cron or a systemd timer) inside the user's
//! session. Each run:
//! - Loads the weekly limits
//! - Records one minute of usage for the current user
//! - Warns as the budget or cutoff approaches
//! - Ends the session once either is reached
//!
//! Given a user name instead, prints that user's daily usage history.

mod report;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use curfew_config::{Policy, load_config_or_default};
use curfew_core::{CoreEvent, EngineOptions, LimitEngine};
use curfew_host_linux::{InstanceLock, LinuxHost};
use curfew_store::{SqliteStore, UsageStore};
use curfew_util::{
    DATABASE_FILENAME, UserId, default_config_path, default_lock_path, format_datetime_full,
};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

const LOG_FILE_PREFIX: &str = "curfew.log";

/// curfew - Per-user daily computer time limits
#[derive(Parser, Debug)]
#[command(name = "curfew", version)]
#[command(about = "Per-user daily computer time limits", long_about = None)]
struct Args {
    /// Configuration file path (default: ~/.config/curfew/config.toml)
    #[arg(short, long, env = "CURFEW_CONFIG", default_value_os_t = default_config_path())]
    config: PathBuf,

    /// Data directory override (or set CURFEW_DATA_DIR env var)
    #[arg(short, long, env = "CURFEW_DATA_DIR")]
    data_dir: Option<PathBuf>,

    /// Log level
    #[arg(short, long, default_value = "info")]
    log_level: String,

    /// Write logs to a daily rotating file in this directory
    #[arg(long, value_name = "DIR")]
    log_file: Option<PathBuf>,

    /// Disable logging
    #[arg(short, long)]
    quiet: bool,

    /// Output format for usage reports
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,

    /// Print this user's daily usage instead of running a check
    user: Option<String>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

/// Install the log sink. The returned guard flushes file logs on drop.
fn init_logging(args: &Args, config_log_dir: Option<&Path>) -> Result<Option<WorkerGuard>> {
    if args.quiet {
        return Ok(None);
    }

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&args.log_level));

    let Some(dir) = args.log_file.as_deref().or(config_log_dir) else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(true)
            .with_writer(std::io::stderr)
            .init();
        return Ok(None);
    };

    std::fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create log directory {:?}", dir))?;

    let appender = tracing_appender::rolling::daily(dir, LOG_FILE_PREFIX);
    let (writer, guard) = tracing_appender::non_blocking(appender);

    tracing_subscriber::fmt()
        .json()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(writer)
        .init();

    Ok(Some(guard))
}

fn open_store(policy: &Policy, args: &Args) -> Result<Arc<dyn UsageStore>> {
    let data_dir = args
        .data_dir
        .clone()
        .unwrap_or_else(|| policy.settings.data_dir.clone());

    std::fs::create_dir_all(&data_dir)
        .with_context(|| format!("Failed to create data directory {:?}", data_dir))?;

    let db_path = data_dir.join(DATABASE_FILENAME);
    let store = SqliteStore::open(&db_path)
        .with_context(|| format!("Failed to open database {:?}", db_path))?;

    debug!(db_path = %db_path.display(), "Store opened");
    Ok(Arc::new(store))
}

/// One enforcement check for whoever owns this session
fn run_check(policy: Policy, args: &Args) -> Result<()> {
    let lock_path = default_lock_path();
    let Some(_lock) = InstanceLock::try_acquire(&lock_path)
        .with_context(|| format!("Failed to take instance lock {:?}", lock_path))?
    else {
        info!("Another check is running, skipping this one");
        return Ok(());
    };

    let store = open_store(&policy, args)?;
    if !store.is_healthy() {
        warn!("Usage store failed its health check");
    }
    let Policy { settings, table } = policy;

    let host = Arc::new(LinuxHost::new(
        Some(settings.status_path.clone()),
        settings.alert_timeout,
    ));
    let engine = LimitEngine::new(table, store, host, EngineOptions::from(&settings));

    let now = curfew_util::now();
    if curfew_util::is_mock_time_active() {
        warn!(now = %format_datetime_full(&now), "Mock time is active");
    }

    let report = engine.update(now)?;

    if report.is_idle() {
        return Ok(());
    }

    for event in &report.events {
        match event {
            CoreEvent::UsageRecorded { snapshot } => info!(
                user = %snapshot.user,
                used = snapshot.usage_minutes_today,
                remaining = snapshot.remaining(),
                "Usage recorded"
            ),
            CoreEvent::Warning { message, .. } => debug!(text = %message, "Warning shown"),
            CoreEvent::EnforcementDue {
                user,
                reason,
                action,
            } => warn!(user = %user, reason = %reason, action = %action, "Session ended"),
        }
    }

    Ok(())
}

fn main() -> Result<()> {
    let args = Args::parse();

    let policy = load_config_or_default(&args.config)
        .with_context(|| format!("Failed to load config from {:?}", args.config))?;

    let _guard = init_logging(&args, policy.settings.log_dir.as_deref())?;

    info!(
        version = env!("CARGO_PKG_VERSION"),
        config_path = %args.config.display(),
        users = policy.table.user_count(),
        rejected = policy.table.rejected().len(),
        "curfew starting"
    );

    match &args.user {
        Some(name) => {
            let store = open_store(&policy, &args)?;
            report::print_report(store, &UserId::new(name.as_str()), args.format)
        }
        None => run_check(policy, &args),
    }
}
