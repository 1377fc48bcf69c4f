use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// The two visual-feedback booleans owned by the session lifecycle.
///
/// `busy` brackets the remote authenticate call. `gray` brackets the
/// logout confirmation prompt. Both are only ever raised through a
/// [`FlagGuard`], so every exit path lowers them again.
#[derive(Debug, Clone, Default)]
pub struct FeedbackFlags {
    busy: Arc<AtomicBool>,
    gray: Arc<AtomicBool>,
}

impl FeedbackFlags {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn handle(&self) -> FlagsHandle {
        FlagsHandle {
            busy: self.busy.clone(),
            gray: self.gray.clone(),
        }
    }

    pub(crate) fn raise_busy(&self) -> FlagGuard {
        FlagGuard::raise(self.busy.clone())
    }

    pub(crate) fn raise_gray(&self) -> FlagGuard {
        FlagGuard::raise(self.gray.clone())
    }
}

/// Read-only view of the feedback flags.
#[derive(Debug, Clone)]
pub struct FlagsHandle {
    busy: Arc<AtomicBool>,
    gray: Arc<AtomicBool>,
}

impl FlagsHandle {
    pub fn busy(&self) -> bool {
        self.busy.load(Ordering::SeqCst)
    }

    pub fn gray(&self) -> bool {
        self.gray.load(Ordering::SeqCst)
    }
}

/// Lowers its flag when dropped.
#[must_use = "the flag is lowered as soon as the guard is dropped"]
pub(crate) struct FlagGuard {
    flag: Arc<AtomicBool>,
}

impl FlagGuard {
    fn raise(flag: Arc<AtomicBool>) -> Self {
        flag.store(true, Ordering::SeqCst);
        Self { flag }
    }
}

impl Drop for FlagGuard {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::SeqCst);
    }
}
