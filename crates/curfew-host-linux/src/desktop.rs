//! Detection of desktop tools for dialogs and speech
//!
//! Tries tools in order of preference and picks the first one installed.

use std::time::Duration;
use tracing::{debug, info};

use crate::process::command_available;

pub const NOTIFY_COMMAND: &str = "notify-send";
pub const LOGINCTL_COMMAND: &str = "loginctl";
pub const SYSTEMCTL_COMMAND: &str = "systemctl";

/// Tool used to show a modal alert
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DialogTool {
    Zenity,
    Kdialog,
    Xmessage,
}

impl DialogTool {
    /// Detect the available dialog tool
    pub fn detect() -> Option<Self> {
        let found = [Self::Zenity, Self::Kdialog, Self::Xmessage]
            .into_iter()
            .find(|tool| command_available(tool.program()));

        match found {
            Some(tool) => info!(tool = tool.program(), "Detected dialog tool"),
            None => debug!("No dialog tool found"),
        }
        found
    }

    pub fn program(&self) -> &'static str {
        match self {
            Self::Zenity => "zenity",
            Self::Kdialog => "kdialog",
            Self::Xmessage => "xmessage",
        }
    }

    /// Exit codes meaning the dialog was shown and closed
    pub fn ok_codes(&self) -> &'static [i32] {
        match self {
            // 5: timed out
            Self::Zenity => &[0, 5],
            Self::Kdialog | Self::Xmessage => &[0],
        }
    }

    /// Arguments showing `message` until dismissed or `timeout` elapses
    pub fn args(&self, title: &str, message: &str, timeout: Duration) -> Vec<String> {
        let secs = timeout.as_secs().max(1).to_string();
        match self {
            Self::Zenity => vec![
                "--warning".into(),
                format!("--title={}", title),
                format!("--text={}", message),
                format!("--timeout={}", secs),
            ],
            // kdialog has no timeout; dismissal ends it
            Self::Kdialog => vec![
                "--title".into(),
                title.into(),
                "--sorry".into(),
                message.into(),
            ],
            Self::Xmessage => vec![
                "-center".into(),
                "-timeout".into(),
                secs,
                format!("{}: {}", title, message),
            ],
        }
    }
}

/// Text-to-speech tool
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpeechTool {
    SpeechDispatcher,
    EspeakNg,
    Espeak,
}

impl SpeechTool {
    /// Detect the available speech tool
    pub fn detect() -> Option<Self> {
        let found = [Self::SpeechDispatcher, Self::EspeakNg, Self::Espeak]
            .into_iter()
            .find(|tool| command_available(tool.program()));

        match found {
            Some(tool) => info!(tool = tool.program(), "Detected speech tool"),
            None => debug!("No speech tool found"),
        }
        found
    }

    pub fn program(&self) -> &'static str {
        match self {
            Self::SpeechDispatcher => "spd-say",
            Self::EspeakNg => "espeak-ng",
            Self::Espeak => "espeak",
        }
    }

    pub fn args(&self, message: &str) -> Vec<String> {
        match self {
            // Block until spoken so a following logout does not cut it off
            Self::SpeechDispatcher => vec!["--wait".into(), message.into()],
            Self::EspeakNg | Self::Espeak => vec![message.into()],
        }
    }
}
