//! Config validation CLI tool
//!
//! Validates a curfew configuration file and reports any errors.

use curfew_util::{default_config_path, format_duration, weekday_label};
use std::path::PathBuf;
use std::process::ExitCode;

fn main() -> ExitCode {
    let args: Vec<String> = std::env::args().collect();

    let config_path = match args.get(1) {
        Some(path) => PathBuf::from(path),
        None => {
            let default_path = default_config_path();
            eprintln!("Usage: validate-config [config-file]");
            eprintln!();
            eprintln!("Validates a curfew configuration file.");
            eprintln!();
            eprintln!("Example:");
            eprintln!("  validate-config {}", default_path.display());
            return ExitCode::from(2);
        }
    };

    if !config_path.exists() {
        eprintln!("Error: Configuration file not found: {}", config_path.display());
        return ExitCode::from(1);
    }

    match curfew_config::load_config(&config_path) {
        Ok(policy) if !policy.table.rejected().is_empty() => {
            let rejected = policy.table.rejected();
            eprintln!("✗ Configuration validation failed");
            eprintln!();
            eprintln!("Rejected users ({}):", rejected.len());
            for user in rejected {
                eprintln!("  {}:", user.user);
                for err in &user.errors {
                    eprintln!("    - {}", err);
                }
            }
            ExitCode::from(1)
        }
        Ok(policy) => {
            println!("✓ Configuration is valid");
            println!();
            println!("Summary:");
            println!("  Config version: {}", curfew_config::CURRENT_CONFIG_VERSION);
            println!("  Users: {}", policy.table.user_count());
            println!(
                "  Grace period: {}",
                format_duration(policy.settings.grace_period)
            );
            println!("  Enforcement: {}", policy.settings.enforcement);

            for schedule in policy.table.schedules() {
                println!();
                println!("{}:", schedule.user);
                for entry in &schedule.entries {
                    println!(
                        "  {}  up to {} ({} min), until {}",
                        weekday_label(entry.weekday),
                        entry.max_duration_expr,
                        entry.max_duration.num_minutes(),
                        entry.cutoff
                    );
                }
            }

            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("✗ Configuration validation failed");
            eprintln!();
            match &e {
                curfew_config::ConfigError::ReadError(io_err) => {
                    eprintln!("Failed to read file: {}", io_err);
                }
                curfew_config::ConfigError::ParseError(parse_err) => {
                    eprintln!("TOML parse error:");
                    eprintln!("  {}", parse_err);
                }
                curfew_config::ConfigError::ValidationFailed { errors } => {
                    eprintln!("Validation errors ({}):", errors.len());
                    for err in errors {
                        eprintln!("  - {}", err);
                    }
                }
                curfew_config::ConfigError::UnsupportedVersion(ver) => {
                    eprintln!(
                        "Unsupported config version: {} (expected {})",
                        ver,
                        curfew_config::CURRENT_CONFIG_VERSION
                    );
                }
            }
            ExitCode::from(1)
        }
    }
}
