use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tokio::sync::watch;

/// Identity attribute names that may carry a display name when `name` is absent
const NAME_FALLBACK_KEYS: [&str; 3] = ["userName", "username", "account"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
pub enum SessionStatus {
    Unauthenticated,
    /// Only observable while a login call is in flight.
    Authenticating,
    Authenticated,
}

/// User identity record returned by the auth service.
///
/// Only `name` is interpreted; every other field is kept verbatim.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Identity {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(flatten)]
    pub attributes: Map<String, Value>,
}

impl Identity {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            attributes: Map::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.attributes.is_empty()
    }

    /// Best available human-readable name
    pub fn display_name(&self) -> Option<&str> {
        if let Some(ref name) = self.name {
            return Some(name.as_str());
        }
        NAME_FALLBACK_KEYS
            .iter()
            .find_map(|key| self.attributes.get(*key).and_then(Value::as_str))
    }
}

/// The in-memory authentication record.
///
/// A token is present exactly when the status is `Authenticated`; the
/// constructors are the only way to build one.
#[derive(Debug, Clone, PartialEq)]
pub struct Session {
    status: SessionStatus,
    token: Option<String>,
    identity: Option<Identity>,
}

impl Session {
    pub fn unauthenticated() -> Self {
        Self {
            status: SessionStatus::Unauthenticated,
            token: None,
            identity: None,
        }
    }

    pub(crate) fn authenticating() -> Self {
        Self {
            status: SessionStatus::Authenticating,
            token: None,
            identity: None,
        }
    }

    pub fn authenticated(token: impl Into<String>, identity: Identity) -> Self {
        Self {
            status: SessionStatus::Authenticated,
            token: Some(token.into()),
            identity: Some(identity),
        }
    }

    pub fn status(&self) -> SessionStatus {
        self.status
    }

    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    pub fn identity(&self) -> Option<&Identity> {
        self.identity.as_ref()
    }

    pub fn is_authenticated(&self) -> bool {
        self.status == SessionStatus::Authenticated
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::unauthenticated()
    }
}

/// Read-only view of the session, cheap to clone and hand out.
#[derive(Debug, Clone)]
pub struct SessionHandle {
    rx: watch::Receiver<Session>,
}

impl SessionHandle {
    /// Snapshot of the current session
    pub fn current(&self) -> Session {
        self.rx.borrow().clone()
    }

    pub fn status(&self) -> SessionStatus {
        self.rx.borrow().status()
    }

    pub fn is_authenticated(&self) -> bool {
        self.rx.borrow().is_authenticated()
    }

    pub fn token(&self) -> Option<String> {
        self.rx.borrow().token().map(str::to_string)
    }

    pub fn identity(&self) -> Option<Identity> {
        self.rx.borrow().identity().cloned()
    }

    /// Wait for the next session change.
    ///
    /// Returns `false` once the owning state machine has been dropped.
    pub async fn changed(&mut self) -> bool {
        self.rx.changed().await.is_ok()
    }
}

/// Single writer side of the session. Held only by the state machine.
#[derive(Debug)]
pub(crate) struct SessionCell {
    tx: watch::Sender<Session>,
}

impl SessionCell {
    pub(crate) fn new() -> Self {
        let (tx, _rx) = watch::channel(Session::unauthenticated());
        Self { tx }
    }

    pub(crate) fn handle(&self) -> SessionHandle {
        SessionHandle {
            rx: self.tx.subscribe(),
        }
    }

    pub(crate) fn get(&self) -> Session {
        self.tx.borrow().clone()
    }

    pub(crate) fn replace(&self, session: Session) {
        self.tx.send_replace(session);
    }

    /// Mark the session as authenticating until the returned guard settles it.
    pub(crate) fn begin_authenticating(&self) -> PendingLogin<'_> {
        self.replace(Session::authenticating());
        PendingLogin {
            cell: self,
            settled: false,
        }
    }
}

/// An in-flight login. Reverts to unauthenticated if dropped unsettled.
#[must_use = "the session reverts to unauthenticated when the guard is dropped"]
pub(crate) struct PendingLogin<'a> {
    cell: &'a SessionCell,
    settled: bool,
}

impl PendingLogin<'_> {
    pub(crate) fn settle(mut self, session: Session) {
        self.cell.replace(session);
        self.settled = true;
    }
}

impl Drop for PendingLogin<'_> {
    fn drop(&mut self) {
        if !self.settled {
            self.cell.replace(Session::unauthenticated());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_token_present_only_when_authenticated() {
        assert_eq!(Session::unauthenticated().token(), None);
        assert_eq!(Session::authenticating().token(), None);

        let session = Session::authenticated("abc", Identity::named("alice"));
        assert_eq!(session.status(), SessionStatus::Authenticated);
        assert_eq!(session.token(), Some("abc"));
        assert_eq!(session.identity().and_then(|i| i.name.as_deref()), Some("alice"));
    }

    #[test]
    fn test_identity_keeps_unknown_fields() {
        let identity: Identity = serde_json::from_value(json!({
            "name": "alice",
            "id": 7,
            "roles": ["admin"]
        }))
        .unwrap();

        assert_eq!(identity.name.as_deref(), Some("alice"));
        assert_eq!(identity.attributes.get("id"), Some(&json!(7)));

        let back = serde_json::to_value(&identity).unwrap();
        assert_eq!(back["roles"], json!(["admin"]));
    }

    #[test]
    fn test_identity_display_name_fallback() {
        let identity: Identity = serde_json::from_value(json!({ "userName": "bob" })).unwrap();
        assert_eq!(identity.display_name(), Some("bob"));
        assert!(Identity::default().display_name().is_none());
        assert!(Identity::default().is_empty());
    }

    #[test]
    fn test_unsettled_login_reverts_to_unauthenticated() {
        let cell = SessionCell::new();
        let pending = cell.begin_authenticating();
        assert_eq!(cell.get().status(), SessionStatus::Authenticating);
        drop(pending);
        assert_eq!(cell.get().status(), SessionStatus::Unauthenticated);

        cell.begin_authenticating()
            .settle(Session::authenticated("t", Identity::named("alice")));
        assert_eq!(cell.get().token(), Some("t"));
    }

    #[tokio::test]
    async fn test_handle_observes_writer() {
        let cell = SessionCell::new();
        let mut handle = cell.handle();
        assert_eq!(handle.status(), SessionStatus::Unauthenticated);

        cell.replace(Session::authenticated("t", Identity::named("alice")));
        assert!(handle.changed().await);
        assert!(handle.is_authenticated());
        assert_eq!(handle.token().as_deref(), Some("t"));

        drop(cell);
        assert!(!handle.changed().await);
    }
}
