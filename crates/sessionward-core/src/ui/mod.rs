//! User-interface collaborators of the session lifecycle.
//!
//! The lifecycle never renders anything itself. It asks a [`Navigator`] to
//! change route, a [`Notifier`] to show non-blocking messages, and a
//! [`ConfirmationPrompt`] to ask the user a yes/no question.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Default lifetime of a notification
const DEFAULT_NOTIFY_DURATION: Duration = Duration::from_secs(3);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
pub enum NotifyCategory {
    Info,
    Success,
    Warning,
    Error,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NotifyOptions {
    /// Whether the user can close the message by hand
    pub closable: bool,
    /// Auto-dismiss delay; `None` keeps the message until closed
    pub duration: Option<Duration>,
}

impl NotifyOptions {
    /// Closable error notice that disappears after three seconds
    pub fn closable() -> Self {
        Self {
            closable: true,
            duration: Some(DEFAULT_NOTIFY_DURATION),
        }
    }
}

impl Default for NotifyOptions {
    fn default() -> Self {
        Self {
            closable: false,
            duration: Some(DEFAULT_NOTIFY_DURATION),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
pub enum ConfirmationOutcome {
    Confirmed,
    Cancelled,
    /// Closed without choosing either button
    Dismissed,
}

/// What a confirmation prompt shows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfirmRequest {
    pub message: String,
    pub title: String,
    pub confirm_label: String,
    pub cancel_label: String,
    pub category: NotifyCategory,
}

impl ConfirmRequest {
    pub fn logout() -> Self {
        Self {
            message: "Log out of the current account?".to_string(),
            title: "Confirm".to_string(),
            confirm_label: "confirm logout".to_string(),
            cancel_label: "cancel".to_string(),
            category: NotifyCategory::Warning,
        }
    }
}

#[derive(Error, Debug)]
pub enum PromptError {
    #[error("Confirmation prompt unavailable: {0}")]
    Unavailable(String),
}

pub trait Navigator: Send + Sync {
    fn go_to(&self, path: &str);
}

pub trait Notifier: Send + Sync {
    fn show(&self, message: &str, category: NotifyCategory, options: NotifyOptions);
}

#[async_trait]
pub trait ConfirmationPrompt: Send + Sync {
    /// Ask the user and wait for exactly one outcome.
    async fn ask(&self, request: &ConfirmRequest) -> Result<ConfirmationOutcome, PromptError>;
}
