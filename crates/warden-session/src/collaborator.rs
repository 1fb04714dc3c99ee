// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Boundary traits for the collaborators the controller drives.
//!
//! The concrete HTTP exchange with an identity provider lives outside this
//! workspace. The controller only needs something that can trade credentials
//! for a token, renew it, and end it.

use std::fmt;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::{AuthServiceError, PersistenceError};

// =============================================================================
// Credentials
// =============================================================================

/// Sign-in form contents.
#[derive(Clone, Default, Serialize, Deserialize)]
pub struct Credentials {
    /// User name or e-mail.
    pub username: String,
    /// Password.
    pub password: String,
    /// OAuth client identifier, when the provider requires one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client_id: Option<String>,
    /// OAuth client secret, when the provider requires one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client_secret: Option<String>,
    /// "Remember me".
    #[serde(default)]
    pub remember: bool,
}

impl Credentials {
    /// Creates credentials from a user name and password.
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
            ..Default::default()
        }
    }

    /// Sets the client id and secret.
    pub fn with_client(mut self, client_id: impl Into<String>, client_secret: impl Into<String>) -> Self {
        self.client_id = Some(client_id.into());
        self.client_secret = Some(client_secret.into());
        self
    }

    /// Sets the "remember me" flag.
    pub fn with_remember(mut self, remember: bool) -> Self {
        self.remember = remember;
        self
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .field("client_id", &self.client_id)
            .field("client_secret", &self.client_secret.as_ref().map(|_| "<redacted>"))
            .field("remember", &self.remember)
            .finish()
    }
}

// =============================================================================
// TokenGrant
// =============================================================================

/// A token issued by the auth service.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenGrant {
    /// The bearer token.
    pub access_token: String,
}

impl TokenGrant {
    /// Wraps a bearer token.
    pub fn new(access_token: impl Into<String>) -> Self {
        Self {
            access_token: access_token.into(),
        }
    }
}

impl fmt::Debug for TokenGrant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenGrant")
            .field("access_token", &"<redacted>")
            .finish()
    }
}

// =============================================================================
// Traits
// =============================================================================

/// The identity-provider exchange.
#[async_trait]
pub trait AuthService: Send + Sync {
    /// Trades credentials for a token.
    async fn login(&self, credentials: &Credentials) -> Result<TokenGrant, AuthServiceError>;

    /// Obtains a fresh token for the current session.
    async fn refresh(&self) -> Result<TokenGrant, AuthServiceError>;

    /// Ends the session at the provider.
    async fn logout(&self) -> Result<(), AuthServiceError>;
}

/// Durable storage for the single current token.
///
/// Implementations are synchronous; the token is small and local.
pub trait TokenPersistence: Send + Sync {
    /// Reads the stored token.
    fn get_token(&self) -> Result<Option<String>, PersistenceError>;

    /// Replaces the stored token.
    fn set_token(&self, token: &str) -> Result<(), PersistenceError>;

    /// Removes the stored token. Clearing an empty store is not an error.
    fn clear_token(&self) -> Result<(), PersistenceError>;
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_credentials_debug_redacts_secrets() {
        let creds = Credentials::new("ops", "hunter2")
            .with_client("dashboard", "s3cret")
            .with_remember(true);
        let debug = format!("{:?}", creds);

        assert!(debug.contains("ops"));
        assert!(debug.contains("dashboard"));
        assert!(!debug.contains("hunter2"));
        assert!(!debug.contains("s3cret"));
    }

    #[test]
    fn test_token_grant_debug_redacts() {
        let grant = TokenGrant::new("aaa.bbb.ccc");
        assert!(!format!("{:?}", grant).contains("aaa.bbb.ccc"));
    }

    #[test]
    fn test_credentials_deserialize_defaults() {
        let creds: Credentials =
            serde_json::from_str(r#"{"username":"ops","password":"pw"}"#).unwrap();
        assert!(creds.client_id.is_none());
        assert!(!creds.remember);
    }
}
