//! Mock host adapter for testing

use curfew_util::UserId;
use std::sync::{Arc, Mutex};

use crate::{HostAdapter, HostCapabilities, HostError, HostResult};

/// A call made against the mock host
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HostCall {
    CurrentUser,
    Notify { title: String, message: String },
    Alert { title: String, message: String },
    Speak { message: String },
    StatusLine { message: String },
    ForceLogout { user: UserId },
    SleepSystem,
}

/// Mock host adapter for unit/integration testing
///
/// Records every call in order. Failures can be switched on per action.
pub struct MockHost {
    capabilities: HostCapabilities,
    user: Arc<Mutex<Option<UserId>>>,
    calls: Arc<Mutex<Vec<HostCall>>>,

    /// Configure notify/speak/status calls to fail
    pub fail_advisory: Arc<Mutex<bool>>,

    /// Configure alert to fail
    pub fail_alert: Arc<Mutex<bool>>,

    /// Configure logout and suspend to fail
    pub fail_enforcement: Arc<Mutex<bool>>,
}

impl MockHost {
    /// Mock whose session belongs to `user`
    pub fn new(user: impl Into<UserId>) -> Self {
        Self {
            capabilities: HostCapabilities::full(),
            user: Arc::new(Mutex::new(Some(user.into()))),
            calls: Arc::new(Mutex::new(Vec::new())),
            fail_advisory: Arc::new(Mutex::new(false)),
            fail_alert: Arc::new(Mutex::new(false)),
            fail_enforcement: Arc::new(Mutex::new(false)),
        }
    }

    /// Mock that cannot determine the current user
    pub fn without_user() -> Self {
        let host = Self::new("");
        *lock(&host.user) = None;
        host
    }

    pub fn with_capabilities(mut self, caps: HostCapabilities) -> Self {
        self.capabilities = caps;
        self
    }

    /// Every call recorded so far
    pub fn calls(&self) -> Vec<HostCall> {
        lock(&self.calls).clone()
    }

    /// Calls other than `current_user`
    pub fn action_calls(&self) -> Vec<HostCall> {
        self.calls()
            .into_iter()
            .filter(|c| *c != HostCall::CurrentUser)
            .collect()
    }

    pub fn clear_calls(&self) {
        lock(&self.calls).clear();
    }

    pub fn set_user(&self, user: Option<UserId>) {
        *lock(&self.user) = user;
    }

    pub fn set_fail_advisory(&self, fail: bool) {
        *lock(&self.fail_advisory) = fail;
    }

    pub fn set_fail_alert(&self, fail: bool) {
        *lock(&self.fail_alert) = fail;
    }

    pub fn set_fail_enforcement(&self, fail: bool) {
        *lock(&self.fail_enforcement) = fail;
    }

    fn record(&self, call: HostCall) {
        lock(&self.calls).push(call);
    }

    fn advisory_result(&self) -> HostResult<()> {
        if *lock(&self.fail_advisory) {
            return Err(HostError::Internal("Mock advisory failure".into()));
        }
        Ok(())
    }
}

// A panicking test thread must not hide the calls it already made
fn lock<T>(m: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    m.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

impl HostAdapter for MockHost {
    fn capabilities(&self) -> &HostCapabilities {
        &self.capabilities
    }

    fn current_user(&self) -> HostResult<UserId> {
        self.record(HostCall::CurrentUser);
        lock(&self.user)
            .clone()
            .ok_or_else(|| HostError::UserLookup("Mock has no user".into()))
    }

    fn notify(&self, title: &str, message: &str) -> HostResult<()> {
        self.record(HostCall::Notify {
            title: title.to_string(),
            message: message.to_string(),
        });
        self.advisory_result()
    }

    fn alert(&self, title: &str, message: &str) -> HostResult<()> {
        self.record(HostCall::Alert {
            title: title.to_string(),
            message: message.to_string(),
        });
        if *lock(&self.fail_alert) {
            return Err(HostError::Internal("Mock alert failure".into()));
        }
        Ok(())
    }

    fn force_logout(&self, user: &UserId) -> HostResult<()> {
        self.record(HostCall::ForceLogout { user: user.clone() });
        if *lock(&self.fail_enforcement) {
            return Err(HostError::CommandFailed {
                command: "logout".into(),
                message: "Mock logout failure".into(),
            });
        }
        Ok(())
    }

    fn speak(&self, message: &str) -> HostResult<()> {
        self.record(HostCall::Speak {
            message: message.to_string(),
        });
        self.advisory_result()
    }

    fn write_status_line(&self, message: &str) -> HostResult<()> {
        self.record(HostCall::StatusLine {
            message: message.to_string(),
        });
        self.advisory_result()
    }

    fn sleep_system(&self) -> HostResult<()> {
        self.record(HostCall::SleepSystem);
        if *lock(&self.fail_enforcement) {
            return Err(HostError::CommandFailed {
                command: "suspend".into(),
                message: "Mock suspend failure".into(),
            });
        }
        Ok(())
    }
}
