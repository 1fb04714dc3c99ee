// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! # warden-config
//!
//! Configuration management for the warden dashboard core.
//!
//! ## Features
//!
//! - **Schema Definition**: roles, session timing, navigation, route catalog
//!   and element rules, all with defaults
//! - **Multi-Format Support**: YAML, TOML and JSON configuration files
//! - **Environment Overrides**: `WARDEN_*` variables and `${VAR:default}`
//!   placeholders
//!
//! ## Quick Start
//!
//! ```no_run
//! use warden_config::loader::load_config;
//!
//! let config = load_config("warden.yaml").unwrap();
//! let policy = config.access_policy();
//! let resolver = config.role_resolver();
//! ```
//!
//! ## Environment Variables
//!
//! ```text
//! WARDEN_ROLES=admin,manager,user
//! WARDEN_DEFAULT_ROLE=user
//! WARDEN_LOG_LEVEL=debug
//! ```

#![warn(missing_docs)]
#![deny(unsafe_code)]

// =============================================================================
// Modules
// =============================================================================

pub mod error;
pub mod loader;
pub mod schema;

// =============================================================================
// Re-exports
// =============================================================================

pub use error::{ConfigError, ConfigResult};
pub use schema::{
    default_elements, AccessConfig, LogFormat, LogLevel, LoggingConfig, NavigationConfig,
    SessionConfig, WardenConfig,
};
pub use loader::{load_config, load_config_str, ConfigFormat, ConfigLoader, DEFAULT_ENV_PREFIX};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Crate name
pub const NAME: &str = env!("CARGO_PKG_NAME");

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_name() {
        assert_eq!(NAME, "warden-config");
    }
}
