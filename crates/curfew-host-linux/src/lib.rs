//! Linux host adapter for curfew
//!
//! Provides:
//! - Desktop notifications, alert dialogs and speech via common desktop tools
//! - Session logout through logind and suspend through systemd
//! - Auto-detection of the tools present on this machine
//! - A status line file for panels and bars
//! - A single-instance lock

mod adapter;
mod desktop;
mod lock;
mod process;

pub use adapter::*;
pub use desktop::*;
pub use lock::*;
pub use process::*;
