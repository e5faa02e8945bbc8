//! Linux host adapter implementation

use curfew_host_api::{HostAdapter, HostCapabilities, HostError, HostResult};
use curfew_util::UserId;
use nix::unistd::{Uid, User};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::desktop::{DialogTool, LOGINCTL_COMMAND, NOTIFY_COMMAND, SYSTEMCTL_COMMAND, SpeechTool};
use crate::process::{command_available, run_command, run_command_accepting};

/// Linux host adapter
pub struct LinuxHost {
    capabilities: HostCapabilities,
    dialog: Option<DialogTool>,
    speech: Option<SpeechTool>,
    status_path: Option<PathBuf>,
    alert_timeout: Duration,
}

impl LinuxHost {
    /// Probe the machine for the tools each capability needs
    pub fn new(status_path: Option<PathBuf>, alert_timeout: Duration) -> Self {
        let dialog = DialogTool::detect();
        let speech = SpeechTool::detect();

        let capabilities = HostCapabilities {
            can_notify: command_available(NOTIFY_COMMAND),
            can_alert: dialog.is_some(),
            can_speak: speech.is_some(),
            can_write_status: status_path.is_some(),
            can_force_logout: command_available(LOGINCTL_COMMAND),
            can_suspend: command_available(SYSTEMCTL_COMMAND),
        };

        info!(?capabilities, "Linux host initialized");

        Self {
            capabilities,
            dialog,
            speech,
            status_path,
            alert_timeout,
        }
    }

    pub fn status_path(&self) -> Option<&Path> {
        self.status_path.as_deref()
    }
}

fn run(program: &str, args: &[String], ok_codes: &[i32]) -> HostResult<()> {
    let args: Vec<&str> = args.iter().map(String::as_str).collect();
    run_command_accepting(program, &args, ok_codes)
}

/// Replace the file at `path` with `line` without readers seeing a partial write
pub fn write_status_file(path: &Path, line: &str) -> HostResult<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let tmp = path.with_extension("tmp");
    std::fs::write(&tmp, format!("{}\n", line))?;
    std::fs::rename(&tmp, path)?;
    Ok(())
}

/// Name of the user running this process
pub fn lookup_current_user() -> HostResult<UserId> {
    let uid = Uid::current();
    match User::from_uid(uid) {
        Ok(Some(user)) => return Ok(UserId::new(user.name)),
        Ok(None) => debug!(%uid, "No passwd entry for uid"),
        Err(e) => warn!(%uid, error = %e, "passwd lookup failed"),
    }

    match std::env::var("USER") {
        Ok(name) if !name.is_empty() => Ok(UserId::new(name)),
        _ => Err(HostError::UserLookup(format!("no user name for uid {}", uid))),
    }
}

impl HostAdapter for LinuxHost {
    fn capabilities(&self) -> &HostCapabilities {
        &self.capabilities
    }

    fn current_user(&self) -> HostResult<UserId> {
        lookup_current_user()
    }

    fn notify(&self, title: &str, message: &str) -> HostResult<()> {
        if !self.capabilities.can_notify {
            return Err(HostError::Unsupported("notifications"));
        }
        run_command(NOTIFY_COMMAND, &["--app-name=curfew", title, message])
    }

    fn alert(&self, title: &str, message: &str) -> HostResult<()> {
        let Some(dialog) = self.dialog else {
            return Err(HostError::Unsupported("alert dialog"));
        };

        run(
            dialog.program(),
            &dialog.args(title, message, self.alert_timeout),
            dialog.ok_codes(),
        )
    }

    fn force_logout(&self, user: &UserId) -> HostResult<()> {
        info!(user = %user, "Terminating user session");
        run_command(LOGINCTL_COMMAND, &["terminate-user", user.as_str()])
    }

    fn speak(&self, message: &str) -> HostResult<()> {
        let Some(speech) = self.speech else {
            return Err(HostError::Unsupported("speech"));
        };
        run(speech.program(), &speech.args(message), &[0])
    }

    fn write_status_line(&self, message: &str) -> HostResult<()> {
        let Some(path) = &self.status_path else {
            return Err(HostError::Unsupported("status line"));
        };
        write_status_file(path, message)
    }

    fn sleep_system(&self) -> HostResult<()> {
        info!("Suspending system");
        run_command(SYSTEMCTL_COMMAND, &["suspend"])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_file_is_replaced() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("status");

        write_status_file(&path, "30 minutes remaining").unwrap();
        write_status_file(&path, "25 minutes remaining").unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert_eq!(content, "25 minutes remaining\n");
        assert!(!path.with_extension("tmp").exists());
    }

    #[test]
    fn status_line_through_adapter() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("status");
        let host = LinuxHost::new(Some(path.clone()), Duration::from_secs(1));

        assert!(host.capabilities().can_write_status);
        host.write_status_line("Time is up").unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "Time is up\n");
    }

    #[test]
    fn status_line_unsupported_without_path() {
        let host = LinuxHost::new(None, Duration::from_secs(1));
        assert!(!host.capabilities().can_write_status);
        assert!(matches!(
            host.write_status_line("x"),
            Err(HostError::Unsupported(_))
        ));
    }

    #[test]
    fn current_user_resolves() {
        let user = lookup_current_user().unwrap();
        assert!(!user.as_str().is_empty());
    }
}
