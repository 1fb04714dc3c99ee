// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Error types for session management.
//!
//! Controller errors are `Clone` because one refresh outcome is fanned out
//! to every caller that joined it.

use std::path::PathBuf;

use thiserror::Error;

use warden_core::ValidationFailure;

/// Result type for session operations.
pub type SessionResult<T> = Result<T, SessionError>;

// =============================================================================
// AuthServiceError
// =============================================================================

/// Failure reported by the auth-service collaborator.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthServiceError {
    /// Credentials were refused.
    #[error("Invalid credentials: {0}")]
    InvalidCredentials(String),

    /// The refresh credential is no longer accepted.
    #[error("Refresh rejected: {0}")]
    RefreshRejected(String),

    /// The service could not be reached or did not answer in time.
    #[error("Auth service unavailable: {0}")]
    Unavailable(String),

    /// Any other service-side failure.
    #[error("Auth service error: {0}")]
    Other(String),
}

impl AuthServiceError {
    /// Creates an invalid-credentials error.
    pub fn invalid_credentials(message: impl Into<String>) -> Self {
        Self::InvalidCredentials(message.into())
    }

    /// Creates a refresh-rejected error.
    pub fn refresh_rejected(message: impl Into<String>) -> Self {
        Self::RefreshRejected(message.into())
    }

    /// Creates an unavailable error.
    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::Unavailable(message.into())
    }

    /// Creates a generic error.
    pub fn other(message: impl Into<String>) -> Self {
        Self::Other(message.into())
    }

    /// Returns `true` if retrying later might succeed.
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Unavailable(_))
    }
}

// =============================================================================
// PersistenceError
// =============================================================================

/// Failure reading or writing the persisted token.
#[derive(Debug, Error)]
pub enum PersistenceError {
    /// Filesystem failure.
    #[error("Token store I/O error at '{path}': {source}")]
    Io {
        /// Store location.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },

    /// The store's contents could not be parsed.
    #[error("Token store at '{path}' is corrupt: {message}")]
    Corrupt {
        /// Store location.
        path: PathBuf,
        /// Parse error.
        message: String,
    },

    /// Backend-specific failure.
    #[error("Token store error: {0}")]
    Backend(String),
}

impl PersistenceError {
    /// Creates an I/O error.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Creates a corrupt-store error.
    pub fn corrupt(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::Corrupt {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Creates a backend error.
    pub fn backend(message: impl Into<String>) -> Self {
        Self::Backend(message.into())
    }
}

// =============================================================================
// StoreError
// =============================================================================

/// Failure publishing to the session store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum StoreError {
    /// A listener tried to publish while being notified.
    #[error("Session store written from inside a listener")]
    ReentrantWrite,
}

// =============================================================================
// SessionError
// =============================================================================

/// Error returned by the session controller.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    /// The auth service refused or failed.
    #[error(transparent)]
    Auth(#[from] AuthServiceError),

    /// The auth service answered with a token that is not currently valid.
    #[error("Auth service returned an unusable token: {0}")]
    RejectedToken(ValidationFailure),

    /// Another login or refresh is in progress.
    #[error("Session is busy ({state})")]
    Busy {
        /// State at the time of the call.
        state: &'static str,
    },

    /// Refresh requires an authenticated session.
    #[error("Not authenticated")]
    NotAuthenticated,

    /// A logout or login happened while this refresh was in flight.
    #[error("Refresh superseded by a newer session")]
    Superseded,

    /// The caller driving the shared refresh went away before it finished.
    #[error("Refresh abandoned before completion")]
    RefreshAbandoned,

    /// Publishing the new session failed.
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl SessionError {
    /// Returns `true` if the auth service was at fault.
    pub fn is_auth(&self) -> bool {
        matches!(self, Self::Auth(_))
    }

    /// Returns `true` if the call was refused because of controller state.
    pub fn is_state_conflict(&self) -> bool {
        matches!(self, Self::Busy { .. } | Self::NotAuthenticated)
    }
}

// =============================================================================
// Tests
// =============================================================================
