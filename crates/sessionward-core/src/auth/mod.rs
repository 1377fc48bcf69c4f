//! Authentication module for managing sessions and credentials.
//!
//! This module provides:
//! - `Session`: the in-memory authentication record and its read-only handle
//! - `CredentialStore`: durable key-value storage for the token and markers
//! - `AuthClient`: the port to the remote authentication service
//!
//! Only the token is mirrored into the credential store; identity and
//! other settings are persisted by their own hydrators.

pub mod client;
pub mod credentials;
pub mod session;

pub use client::{AuthClient, AuthError, AuthResult, Credentials};
pub use credentials::{
    CredentialKey, CredentialStore, KeyringCredentialStore, MemoryCredentialStore, StoreError,
};
pub use session::{Identity, Session, SessionHandle, SessionStatus};
