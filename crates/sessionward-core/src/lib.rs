//! Client-side session lifecycle for sessionward.
//!
//! The crate is built around [`SessionManager`], which owns the session
//! state machine: it exchanges credentials for a token, persists the token,
//! hydrates dependent settings, and tears everything down again on logout.
//! Every side effect goes through a narrow collaborator trait so the
//! terminal front end, tests, and other shells can plug in their own.

pub mod api;
pub mod auth;
pub mod config;
pub mod lifecycle;
pub mod settings;
pub mod ui;

pub use api::{ApiError, HttpAuthClient};
pub use auth::{
    AuthClient, AuthError, AuthResult, CredentialKey, CredentialStore, Credentials, Identity,
    KeyringCredentialStore, MemoryCredentialStore, Session, SessionHandle, SessionStatus,
    StoreError,
};
pub use config::{Config, RedirectPolicy};
pub use lifecycle::{
    FeedbackFlags, FlagsHandle, LoginOutcome, LogoutOutcome, Routes, SessionManager,
    SessionManagerBuilder,
};
pub use settings::{
    CascadeReport, ComponentSize, HydrateError, HydrationCascade, Hydrator, IdentityHydrator,
    IdentityStore, OpenedPage, OpenedPages, SettingSlot, SettingsBundle, SettingsDb,
    SettingsDomain, ThemeSetting, TransitionSetting,
};
pub use ui::{
    ConfirmRequest, ConfirmationOutcome, ConfirmationPrompt, Navigator, NotifyCategory,
    NotifyOptions, Notifier, PromptError,
};
