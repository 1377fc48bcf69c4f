use std::fmt;

use async_trait::async_trait;
use thiserror::Error;

use super::Identity;

/// Username and password for one login attempt. Never persisted.
#[derive(Clone)]
pub struct Credentials {
    username: String,
    password: String,
}

impl Credentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    pub fn password(&self) -> &str {
        &self.password
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Application-level outcome of an authentication call.
#[derive(Debug, Clone, PartialEq)]
pub enum AuthResult {
    Success { identity: Identity, token: String },
    /// The service answered but refused the credentials.
    Failure { message: String },
}

/// The call never produced an application-level answer.
#[derive(Error, Debug)]
pub enum AuthError {
    #[error("Auth transport failed: {0}")]
    Transport(String),

    #[error("Auth service returned an unusable response: {0}")]
    InvalidResponse(String),
}

/// Port to the remote authentication service.
#[async_trait]
pub trait AuthClient: Send + Sync {
    /// Exchange credentials for a token and identity.
    async fn authenticate(&self, credentials: &Credentials) -> Result<AuthResult, AuthError>;

    /// Best-effort server-side invalidation of the current session.
    async fn invalidate(&self, token: Option<&str>) -> Result<(), AuthError>;
}
