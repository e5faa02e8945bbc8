//! Host capabilities model

use curfew_api::EnforcementAction;
use serde::{Deserialize, Serialize};

/// Describes what a host adapter can do
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HostCapabilities {
    /// Can show desktop notifications
    pub can_notify: bool,

    /// Can show a blocking alert dialog
    pub can_alert: bool,

    /// Can speak messages (text-to-speech)
    pub can_speak: bool,

    /// Can publish a status line
    pub can_write_status: bool,

    /// Can terminate the user's session
    pub can_force_logout: bool,

    /// Can suspend the machine
    pub can_suspend: bool,
}

impl HostCapabilities {
    /// Create minimal capabilities (notifications and logout only)
    pub fn minimal() -> Self {
        Self {
            can_notify: true,
            can_alert: false,
            can_speak: false,
            can_write_status: false,
            can_force_logout: true,
            can_suspend: false,
        }
    }

    /// Everything supported
    pub fn full() -> Self {
        Self {
            can_notify: true,
            can_alert: true,
            can_speak: true,
            can_write_status: true,
            can_force_logout: true,
            can_suspend: true,
        }
    }

    /// Check if this host can carry out the given enforcement action
    pub fn supports_enforcement(&self, action: EnforcementAction) -> bool {
        match action {
            EnforcementAction::Logout => self.can_force_logout,
            EnforcementAction::Suspend => self.can_suspend,
        }
    }
}

impl Default for HostCapabilities {
    fn default() -> Self {
        Self::minimal()
    }
}
