// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Error types for token decoding and validation.
//!
//! Neither error type here is ever surfaced to an end user: callers downgrade
//! both to "treat as unauthenticated". They exist so that diagnostics (the CLI
//! `inspect` command, debug logs) can say *why* a token was rejected.

use thiserror::Error;

/// Result type alias for core operations.
pub type CoreResult<T, E = DecodeError> = Result<T, E>;

// =============================================================================
// DecodeError
// =============================================================================

/// A bearer token could not be turned into claims.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    /// The token string was empty.
    #[error("Token is empty")]
    Empty,

    /// The token did not have exactly three dot-separated segments.
    #[error("Token must have 3 segments, found {found}")]
    SegmentCount {
        /// Number of segments found.
        found: usize,
    },

    /// The payload segment was not valid base64url.
    #[error("Token payload is not valid base64url: {message}")]
    Base64 {
        /// Underlying decoder message.
        message: String,
    },

    /// The payload bytes were not valid JSON.
    #[error("Token payload is not valid JSON: {message}")]
    Json {
        /// Underlying parser message.
        message: String,
    },

    /// The payload was JSON but not an object.
    #[error("Token payload must be a JSON object, found {kind}")]
    NotAnObject {
        /// The JSON kind that was found instead.
        kind: &'static str,
    },
}

impl DecodeError {
    /// Creates a base64 error.
    pub fn base64(message: impl Into<String>) -> Self {
        Self::Base64 {
            message: message.into(),
        }
    }

    /// Creates a JSON error.
    pub fn json(message: impl Into<String>) -> Self {
        Self::Json {
            message: message.into(),
        }
    }

    /// Returns `true` if the token was structurally broken (as opposed to
    /// merely carrying an unreadable payload).
    pub fn is_structural(&self) -> bool {
        matches!(self, Self::Empty | Self::SegmentCount { .. })
    }
}

// =============================================================================
// ValidationFailure
// =============================================================================

/// A token is not usable as a session credential.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationFailure {
    /// No token was present.
    #[error("No token present")]
    Absent,

    /// The token could not be decoded.
    #[error("Token could not be decoded: {0}")]
    Malformed(#[from] DecodeError),

    /// The token has no numeric `exp` claim.
    #[error("Token has no expiration claim")]
    MissingExpiry,

    /// The token expired at or before the evaluation time.
    #[error("Token expired at {exp} (now {now})")]
    Expired {
        /// The token's `exp` claim, seconds since epoch.
        exp: i64,
        /// Evaluation time, seconds since epoch.
        now: i64,
    },
}

impl ValidationFailure {
    /// Returns `true` if the failure is an expiry rather than a broken token.
    pub fn is_expired(&self) -> bool {
        matches!(self, Self::Expired { .. })
    }
}

// =============================================================================
// Tests
// =============================================================================
