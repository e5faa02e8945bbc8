//! Core limit engine for curfew
//!
//! This crate is the heart of curfew, containing:
//! - Pure decision functions (allowed minutes, time to cutoff, warning and
//!   enforcement thresholds)
//! - The limit engine run once per invocation (Idle -> Tracking -> Warning -> Enforcing)
//! - The daily aggregator feeding reports

mod aggregator;
mod decision;
mod engine;
mod events;

pub use aggregator::*;
pub use decision::*;
pub use engine::*;
pub use events::*;

use curfew_host_api::HostError;
use curfew_util::UserId;
use thiserror::Error;

/// Errors that abort a check
#[derive(Debug, Error)]
pub enum CoreError {
    /// The host could not tell whose session this is
    #[error("Host capability failed: {0}")]
    Capability(#[source] HostError),

    /// This user's limits failed to parse; nothing is recorded for them
    #[error("Invalid limits for {user}: {message}")]
    Config { user: UserId, message: String },

    /// The session should have ended but the host refused
    #[error("Enforcement failed: {0}")]
    Enforcement(#[source] HostError),
}

pub type CoreResult<T> = Result<T, CoreError>;
