// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Error types for the warden binary.

use thiserror::Error;

/// Result type alias for warden-bin operations.
pub type BinResult<T> = Result<T, BinError>;

/// Errors that can occur in the warden binary.
#[derive(Debug, Error)]
pub enum BinError {
    /// Configuration error.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Config loading error.
    #[error("Config error: {0}")]
    Config(#[from] warden_config::ConfigError),

    /// No token could be found or the token is unusable.
    #[error("Token error: {0}")]
    Token(String),

    /// Token storage error.
    #[error("Token store error: {0}")]
    Persistence(#[from] warden_session::PersistenceError),

    /// The guard redirected or denied.
    #[error("Access refused: {0}")]
    Access(String),

    /// No route at the requested path.
    #[error("No route at {0}")]
    RouteNotFound(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(String),

    /// Output could not be rendered.
    #[error("Output error: {0}")]
    Output(String),
}

impl BinError {
    /// Creates a token error.
    pub fn token(msg: impl Into<String>) -> Self {
        Self::Token(msg.into())
    }

    /// Returns the exit code for this error.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Configuration(_) | Self::Config(_) => 1,
            Self::Token(_) => 2,
            Self::Persistence(_) => 3,
            Self::Access(_) => 4,
            Self::RouteNotFound(_) => 5,
            Self::Io(_) => 6,
            Self::Output(_) => 7,
        }
    }
}

impl From<std::io::Error> for BinError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err.to_string())
    }
}

impl From<serde_json::Error> for BinError {
    fn from(err: serde_json::Error) -> Self {
        Self::Output(format!("serialization failed: {}", err))
    }
}

// =============================================================================
// Error Reporting
// =============================================================================

/// Reports an error with appropriate formatting.
pub fn report_error(error: &BinError) {
    eprintln!("Error: {}", error);

    let mut source = std::error::Error::source(error);
    while let Some(cause) = source {
        eprintln!("  Caused by: {}", cause);
        source = cause.source();
    }
}

/// Reports an error and exits with the appropriate code.
pub fn report_error_and_exit(error: BinError) -> ! {
    report_error(&error);
    std::process::exit(error.exit_code())
}

// =============================================================================
// Tests
// =============================================================================
