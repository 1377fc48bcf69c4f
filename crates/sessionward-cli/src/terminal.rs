//! Terminal implementations of the UI collaborators.

use std::io::{self, BufRead, Write};
use std::sync::{Mutex, PoisonError};

use async_trait::async_trait;
use sessionward_core::{
    ConfirmRequest, ConfirmationOutcome, ConfirmationPrompt, Navigator, NotifyCategory,
    NotifyOptions, Notifier, PromptError,
};
use tracing::debug;

/// Prints notifications to stderr. Durations have no meaning here.
pub struct TerminalNotifier;

impl Notifier for TerminalNotifier {
    fn show(&self, message: &str, category: NotifyCategory, options: NotifyOptions) {
        debug!(?category, ?options, "Notification");
        eprintln!("[{}] {}", category_label(category), message);
    }
}

fn category_label(category: NotifyCategory) -> &'static str {
    match category {
        NotifyCategory::Info => "info",
        NotifyCategory::Success => "ok",
        NotifyCategory::Warning => "warning",
        NotifyCategory::Error => "error",
    }
}

/// Remembers where the lifecycle last sent the user.
#[derive(Default)]
pub struct TerminalNavigator {
    last: Mutex<Option<String>>,
}

impl TerminalNavigator {
    pub fn last(&self) -> Option<String> {
        self.last
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl Navigator for TerminalNavigator {
    fn go_to(&self, path: &str) {
        debug!(%path, "Navigate");
        *self.last.lock().unwrap_or_else(PoisonError::into_inner) = Some(path.to_string());
    }
}

/// Asks on stdin. End of input or an empty answer counts as dismissed.
pub struct TerminalPrompt;

#[async_trait]
impl ConfirmationPrompt for TerminalPrompt {
    async fn ask(&self, request: &ConfirmRequest) -> Result<ConfirmationOutcome, PromptError> {
        let question = format!(
            "{} ({}): {} [y = {}, n = {}]: ",
            request.title,
            category_label(request.category),
            request.message,
            request.confirm_label,
            request.cancel_label
        );

        tokio::task::spawn_blocking(move || -> Result<Option<String>, io::Error> {
            let mut stderr = io::stderr();
            stderr.write_all(question.as_bytes())?;
            stderr.flush()?;

            let mut line = String::new();
            let read = io::stdin().lock().read_line(&mut line)?;
            Ok((read > 0).then_some(line))
        })
        .await
        .map_err(|e| PromptError::Unavailable(e.to_string()))?
        .map(|line| parse_answer(line.as_deref()))
        .map_err(|e| PromptError::Unavailable(e.to_string()))
    }
}

/// Map a raw answer line to an outcome; `None` means end of input.
pub fn parse_answer(line: Option<&str>) -> ConfirmationOutcome {
    let Some(line) = line else {
        return ConfirmationOutcome::Dismissed;
    };
    match line.trim().to_lowercase().as_str() {
        "y" | "yes" => ConfirmationOutcome::Confirmed,
        "n" | "no" => ConfirmationOutcome::Cancelled,
        _ => ConfirmationOutcome::Dismissed,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(Some("y\n"), ConfirmationOutcome::Confirmed)]
    #[case(Some("YES"), ConfirmationOutcome::Confirmed)]
    #[case(Some("n\n"), ConfirmationOutcome::Cancelled)]
    #[case(Some(" no "), ConfirmationOutcome::Cancelled)]
    #[case(Some("\n"), ConfirmationOutcome::Dismissed)]
    #[case(Some("maybe"), ConfirmationOutcome::Dismissed)]
    #[case(None, ConfirmationOutcome::Dismissed)]
    fn test_parse_answer(#[case] line: Option<&str>, #[case] expected: ConfirmationOutcome) {
        assert_eq!(parse_answer(line), expected);
    }

    #[test]
    fn test_navigator_remembers_last_destination() {
        let nav = TerminalNavigator::default();
        assert_eq!(nav.last(), None);
        nav.go_to("/index");
        nav.go_to("/login");
        assert_eq!(nav.last().as_deref(), Some("/login"));
    }
}
