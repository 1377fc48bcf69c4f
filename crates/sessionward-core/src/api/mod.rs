//! REST client for the remote authentication service.
//!
//! This module provides `HttpAuthClient`, the reqwest-backed implementation
//! of the `AuthClient` port. Login posts a form with the username and
//! password; logout posts an empty body carrying the current token.

pub mod client;
pub mod error;

pub use client::HttpAuthClient;
pub use error::ApiError;
