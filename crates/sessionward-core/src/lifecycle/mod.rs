//! The session state machine and its login/logout protocol.
//!
//! `SessionManager` is the only writer of the [`Session`](crate::auth::Session).
//! Login goes `Unauthenticated → Authenticating → Authenticated`; logout
//! returns to `Unauthenticated`. Collaborator failures are handled here and
//! reported through [`LoginOutcome`] / [`LogoutOutcome`], never as errors.

mod confirm;
pub mod flags;
pub mod manager;


pub use flags::{FeedbackFlags, FlagsHandle};
pub use manager::{LoginOutcome, LogoutOutcome, Routes, SessionManager, SessionManagerBuilder};
