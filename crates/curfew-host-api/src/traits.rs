//! Host adapter traits

use curfew_util::UserId;
use thiserror::Error;

use crate::HostCapabilities;

/// Errors from host adapter operations
#[derive(Debug, Error)]
pub enum HostError {
    #[error("Command '{command}' failed: {message}")]
    CommandFailed { command: String, message: String },

    #[error("Unsupported on this host: {0}")]
    Unsupported(&'static str),

    #[error("Cannot determine current user: {0}")]
    UserLookup(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

pub type HostResult<T> = Result<T, HostError>;

/// Host adapter trait - implemented by platform-specific adapters
///
/// All calls block until the host action completes.
pub trait HostAdapter: Send + Sync {
    /// Get the capabilities of this host adapter
    fn capabilities(&self) -> &HostCapabilities;

    /// Name of the user owning the session being limited
    fn current_user(&self) -> HostResult<UserId>;

    /// Show a transient desktop notification
    fn notify(&self, title: &str, message: &str) -> HostResult<()>;

    /// Show a modal alert; returns once dismissed or timed out
    fn alert(&self, title: &str, message: &str) -> HostResult<()>;

    /// End the user's login session
    fn force_logout(&self, user: &UserId) -> HostResult<()>;

    /// Optional: speak a message aloud
    fn speak(&self, _message: &str) -> HostResult<()> {
        Err(HostError::Unsupported("speech"))
    }

    /// Optional: publish a one-line status for panels and bars
    fn write_status_line(&self, _message: &str) -> HostResult<()> {
        Err(HostError::Unsupported("status line"))
    }

    /// Optional: suspend the machine
    fn sleep_system(&self) -> HostResult<()> {
        Err(HostError::Unsupported("suspend"))
    }

    /// Optional: check if the host adapter is healthy
    fn is_healthy(&self) -> bool {
        true
    }
}
