use std::sync::Arc;

use tokio::sync::Mutex;
use tracing::{debug, warn};

use crate::ui::{ConfirmRequest, ConfirmationOutcome, ConfirmationPrompt};

use super::FeedbackFlags;

/// Wraps the confirmation prompt with the gray flag and a pending guard.
pub(crate) struct ConfirmationGate {
    prompt: Arc<dyn ConfirmationPrompt>,
    flags: FeedbackFlags,
    pending: Mutex<()>,
}

impl ConfirmationGate {
    pub(crate) fn new(prompt: Arc<dyn ConfirmationPrompt>, flags: FeedbackFlags) -> Self {
        Self {
            prompt,
            flags,
            pending: Mutex::new(()),
        }
    }

    /// Ask once. Returns `None` when another confirmation is still open.
    ///
    /// A prompt that fails counts as dismissed.
    pub(crate) async fn ask(&self, request: &ConfirmRequest) -> Option<ConfirmationOutcome> {
        let Ok(_pending) = self.pending.try_lock() else {
            warn!("Confirmation already pending, ignoring second request");
            return None;
        };

        let gray = self.flags.raise_gray();
        let outcome = match self.prompt.ask(request).await {
            Ok(outcome) => outcome,
            Err(e) => {
                warn!(error = %e, "Confirmation prompt failed, treating as dismissed");
                ConfirmationOutcome::Dismissed
            }
        };
        drop(gray);

        debug!(?outcome, "Confirmation answered");
        Some(outcome)
    }
}
