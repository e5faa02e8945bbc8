//! Running external desktop and session tools

use curfew_host_api::{HostError, HostResult};
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use tracing::debug;

/// Locate an executable on `$PATH`
pub fn find_in_path(program: &str) -> Option<PathBuf> {
    let path = std::env::var_os("PATH")?;
    std::env::split_paths(&path)
        .map(|dir| dir.join(program))
        .find(|candidate| is_executable(candidate))
}

/// Whether `program` can be run from `$PATH`
pub fn command_available(program: &str) -> bool {
    find_in_path(program).is_some()
}

fn is_executable(path: &Path) -> bool {
    std::fs::metadata(path)
        .map(|m| m.is_file() && m.permissions().mode() & 0o111 != 0)
        .unwrap_or(false)
}

/// Run a command to completion, failing on a non-zero exit
pub fn run_command(program: &str, args: &[&str]) -> HostResult<()> {
    run_command_accepting(program, args, &[0])
}

/// Run a command to completion, treating any exit code in `ok_codes` as success
pub fn run_command_accepting(program: &str, args: &[&str], ok_codes: &[i32]) -> HostResult<()> {
    debug!(program, ?args, "Running command");

    let output = Command::new(program)
        .args(args)
        .stdin(Stdio::null())
        .output()
        .map_err(|e| HostError::CommandFailed {
            command: program.to_string(),
            message: e.to_string(),
        })?;

    if output.status.code().is_some_and(|code| ok_codes.contains(&code)) {
        return Ok(());
    }

    let stderr = String::from_utf8_lossy(&output.stderr);
    let message = match stderr.trim() {
        "" => format!("exited with {}", output.status),
        text => text.to_string(),
    };

    Err(HostError::CommandFailed {
        command: program.to_string(),
        message,
    })
}
