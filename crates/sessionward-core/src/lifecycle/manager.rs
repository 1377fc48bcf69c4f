use std::sync::Arc;

use anyhow::Result;
use tokio::sync::Mutex;
use tracing::{debug, error, info, warn};

use crate::auth::session::{PendingLogin, SessionCell};
use crate::auth::{
    AuthClient, AuthResult, CredentialKey, CredentialStore, Credentials, Identity, Session,
    SessionHandle, StoreError,
};
use crate::config::{Config, RedirectPolicy};
use crate::settings::{HydrationCascade, IdentityHydrator};
use crate::ui::{
    ConfirmRequest, ConfirmationOutcome, ConfirmationPrompt, Navigator, NotifyCategory,
    NotifyOptions, Notifier,
};

use super::confirm::ConfirmationGate;
use super::{FeedbackFlags, FlagsHandle};

// ============================================================================
// Constants
// ============================================================================

/// Shown when the user backs out of the logout confirmation
const LOGOUT_ABANDONED_MESSAGE: &str = "logout abandoned";

/// Shown for network failures, only when enabled in config
const TRANSPORT_FAILURE_MESSAGE: &str = "Unable to reach the server. Please try again.";

/// The two destinations the lifecycle navigates to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Routes {
    pub home: String,
    pub login: String,
}

impl Routes {
    fn from_config(config: &Config) -> Self {
        Self {
            home: config.home_path.clone(),
            login: config.login_path.clone(),
        }
    }
}

impl Default for Routes {
    fn default() -> Self {
        Self::from_config(&Config::default())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoginOutcome {
    Authenticated { destination: String },
    /// The service refused the credentials; the message was shown to the user.
    Rejected { message: String },
    /// No answer from the service; logged only.
    TransportFailed,
    /// Another login was still running. Nothing was changed.
    AlreadyInFlight,
}

impl LoginOutcome {
    pub fn is_authenticated(&self) -> bool {
        matches!(self, LoginOutcome::Authenticated { .. })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogoutOutcome {
    LoggedOut,
    /// The user cancelled or dismissed the confirmation. Session unchanged.
    Abandoned(ConfirmationOutcome),
    /// Another logout confirmation was still open. Nothing was changed.
    ConfirmationPending,
}

/// Owns the session and drives login, logout and restore.
pub struct SessionManager {
    auth: Arc<dyn AuthClient>,
    store: Arc<dyn CredentialStore>,
    identity: Arc<dyn IdentityHydrator>,
    cascade: HydrationCascade,
    navigator: Arc<dyn Navigator>,
    notifier: Arc<dyn Notifier>,
    gate: ConfirmationGate,
    session: SessionCell,
    flags: FeedbackFlags,
    routes: Routes,
    redirect_policy: RedirectPolicy,
    notify_transport_errors: bool,
    login_lock: Mutex<()>,
}

impl SessionManager {
    pub fn builder() -> SessionManagerBuilder {
        SessionManagerBuilder::default()
    }

    /// Read-only view of the session
    pub fn session(&self) -> SessionHandle {
        self.session.handle()
    }

    pub fn flags(&self) -> FlagsHandle {
        self.flags.handle()
    }

    pub fn routes(&self) -> &Routes {
        &self.routes
    }

    // =========================================================================
    // Login
    // =========================================================================

    /// Exchange credentials for a session.
    ///
    /// Credentials are forwarded as-is; the service decides whether empty
    /// values are acceptable.
    pub async fn login(&self, credentials: &Credentials) -> LoginOutcome {
        let Ok(_serial) = self.login_lock.try_lock() else {
            warn!(username = credentials.username(), "Login already in flight, rejecting");
            return LoginOutcome::AlreadyInFlight;
        };

        info!(username = credentials.username(), "Login started");

        // A failed login must not leave a previous session's token or user behind
        if let Err(e) = self.store.remove(CredentialKey::Token) {
            warn!(error = %e, "Failed to remove stale token");
        }
        if let Err(e) = self.identity.clear() {
            warn!(error = %e, "Failed to clear stale identity");
        }
        let pending = self.session.begin_authenticating();

        let busy = self.flags.raise_busy();
        let result = self.auth.authenticate(credentials).await;
        drop(busy);

        match result {
            Err(e) => {
                error!(error = %e, "Login request failed");
                if self.notify_transport_errors {
                    self.notifier.show(
                        TRANSPORT_FAILURE_MESSAGE,
                        NotifyCategory::Error,
                        NotifyOptions::closable(),
                    );
                }
                pending.settle(Session::unauthenticated());
                LoginOutcome::TransportFailed
            }
            Ok(AuthResult::Failure { message }) => {
                info!(%message, "Login rejected by service");
                self.notifier
                    .show(&message, NotifyCategory::Error, NotifyOptions::closable());
                pending.settle(Session::unauthenticated());
                LoginOutcome::Rejected { message }
            }
            Ok(AuthResult::Success { identity, token }) => {
                let destination = self.complete_login(pending, identity, token);
                LoginOutcome::Authenticated { destination }
            }
        }
    }

    fn complete_login(
        &self,
        pending: PendingLogin<'_>,
        identity: Identity,
        token: String,
    ) -> String {
        if let Err(e) = self.store.set(CredentialKey::Token, &token) {
            error!(error = %e, "Failed to persist token, session will not survive a restart");
        }
        pending.settle(Session::authenticated(token, identity.clone()));

        if let Err(e) = self.identity.set(&identity) {
            warn!(error = %e, "Failed to store identity");
        }
        let report = self.cascade.run();
        debug!(
            loaded = report.loaded.len(),
            failed = report.failed.len(),
            "Settings cascade finished"
        );

        let stored = match self.store.get(CredentialKey::RedirectTarget) {
            Ok(path) => path,
            Err(e) => {
                warn!(error = %e, "Failed to read redirect marker");
                None
            }
        };
        if let Err(e) = self.store.remove(CredentialKey::RedirectTarget) {
            warn!(error = %e, "Failed to remove redirect marker");
        }

        let destination = self.login_destination(stored);
        info!(user = identity.display_name(), %destination, "Login successful");
        self.navigator.go_to(&destination);
        destination
    }

    fn login_destination(&self, stored: Option<String>) -> String {
        let stored = stored.filter(|p| !p.is_empty());
        match (self.redirect_policy, stored) {
            (RedirectPolicy::Stored, Some(path)) => path,
            (RedirectPolicy::Home, Some(path)) => {
                debug!(redirect = %path, "Stored redirect ignored, going home");
                self.routes.home.clone()
            }
            (_, None) => self.routes.home.clone(),
        }
    }

    // =========================================================================
    // Logout
    // =========================================================================

    /// End the session, optionally asking the user first.
    pub async fn logout(&self, require_confirmation: bool) -> LogoutOutcome {
        if require_confirmation {
            let Some(outcome) = self.gate.ask(&ConfirmRequest::logout()).await else {
                return LogoutOutcome::ConfirmationPending;
            };

            match outcome {
                ConfirmationOutcome::Confirmed => {}
                ConfirmationOutcome::Cancelled => {
                    info!("Logout cancelled");
                    self.notifier.show(
                        LOGOUT_ABANDONED_MESSAGE,
                        NotifyCategory::Info,
                        NotifyOptions::default(),
                    );
                    return LogoutOutcome::Abandoned(outcome);
                }
                ConfirmationOutcome::Dismissed => {
                    info!("Logout dismissed");
                    return LogoutOutcome::Abandoned(outcome);
                }
            }
        }

        self.teardown().await;
        LogoutOutcome::LoggedOut
    }

    /// Local teardown always completes, whatever the server says.
    async fn teardown(&self) {
        let token = self.session.get().token().map(str::to_string).or_else(|| {
            self.store
                .get(CredentialKey::Token)
                .unwrap_or_else(|e| {
                    warn!(error = %e, "Failed to read token for remote logout");
                    None
                })
        });

        if let Err(e) = self.auth.invalidate(token.as_deref()).await {
            warn!(error = %e, "Remote logout failed, clearing local session anyway");
        }

        for key in [CredentialKey::Token, CredentialKey::IdentityMarker] {
            if let Err(e) = self.store.remove(key) {
                warn!(%key, error = %e, "Failed to remove credential");
            }
        }
        if let Err(e) = self.identity.clear() {
            warn!(error = %e, "Failed to clear identity");
        }

        self.session.replace(Session::unauthenticated());
        info!("Logged out");
        self.navigator.go_to(&self.routes.login);
    }

    // =========================================================================
    // Restore and redirect marker
    // =========================================================================

    /// Rebuild the session from a persisted token, without navigating.
    ///
    /// Returns whether a session was restored.
    pub fn restore(&self) -> bool {
        let Ok(_serial) = self.login_lock.try_lock() else {
            warn!("Login in flight, not restoring");
            return false;
        };

        let token = match self.store.get(CredentialKey::Token) {
            Ok(Some(token)) if !token.is_empty() => token,
            Ok(_) => {
                debug!("No persisted token");
                return false;
            }
            Err(e) => {
                warn!(error = %e, "Failed to read persisted token");
                return false;
            }
        };

        let identity = match self.identity.load() {
            Ok(identity) => identity,
            Err(e) => {
                warn!(error = %e, "Failed to load identity, restoring without it");
                Identity::default()
            }
        };
        self.cascade.run();

        info!(user = identity.display_name(), "Session restored");
        self.session.replace(Session::authenticated(token, identity));
        true
    }

    /// Remember where the user was going before being sent to log in.
    pub fn remember_redirect(&self, path: &str) -> Result<(), StoreError> {
        debug!(%path, "Storing redirect marker");
        self.store.set(CredentialKey::RedirectTarget, path)
    }
}

/// Wires collaborators into a [`SessionManager`].
#[derive(Default)]
pub struct SessionManagerBuilder {
    auth: Option<Arc<dyn AuthClient>>,
    store: Option<Arc<dyn CredentialStore>>,
    identity: Option<Arc<dyn IdentityHydrator>>,
    cascade: HydrationCascade,
    navigator: Option<Arc<dyn Navigator>>,
    notifier: Option<Arc<dyn Notifier>>,
    prompt: Option<Arc<dyn ConfirmationPrompt>>,
    routes: Routes,
    redirect_policy: RedirectPolicy,
    notify_transport_errors: bool,
}

impl SessionManagerBuilder {
    pub fn auth(mut self, auth: Arc<dyn AuthClient>) -> Self {
        self.auth = Some(auth);
        self
    }

    pub fn store(mut self, store: Arc<dyn CredentialStore>) -> Self {
        self.store = Some(store);
        self
    }

    pub fn identity(mut self, identity: Arc<dyn IdentityHydrator>) -> Self {
        self.identity = Some(identity);
        self
    }

    pub fn cascade(mut self, cascade: HydrationCascade) -> Self {
        self.cascade = cascade;
        self
    }

    pub fn navigator(mut self, navigator: Arc<dyn Navigator>) -> Self {
        self.navigator = Some(navigator);
        self
    }

    pub fn notifier(mut self, notifier: Arc<dyn Notifier>) -> Self {
        self.notifier = Some(notifier);
        self
    }

    pub fn prompt(mut self, prompt: Arc<dyn ConfirmationPrompt>) -> Self {
        self.prompt = Some(prompt);
        self
    }

    /// Take routes and policies from configuration
    pub fn config(mut self, config: &Config) -> Self {
        self.routes = Routes::from_config(config);
        self.redirect_policy = config.redirect_policy;
        self.notify_transport_errors = config.notify_transport_errors;
        self
    }

    pub fn build(self) -> Result<SessionManager> {
        fn required<T>(value: Option<T>, what: &str) -> Result<T> {
            value.ok_or_else(|| anyhow::anyhow!("SessionManager is missing its {}", what))
        }

        let flags = FeedbackFlags::new();
        let prompt = required(self.prompt, "confirmation prompt")?;

        Ok(SessionManager {
            auth: required(self.auth, "auth client")?,
            store: required(self.store, "credential store")?,
            identity: required(self.identity, "identity hydrator")?,
            cascade: self.cascade,
            navigator: required(self.navigator, "navigator")?,
            notifier: required(self.notifier, "notifier")?,
            gate: ConfirmationGate::new(prompt, flags.clone()),
            session: SessionCell::new(),
            flags,
            routes: self.routes,
            redirect_policy: self.redirect_policy,
            notify_transport_errors: self.notify_transport_errors,
            login_lock: Mutex::new(()),
        })
    }
}
