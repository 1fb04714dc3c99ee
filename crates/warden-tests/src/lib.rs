// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! # warden Integration Tests
//!
//! Integration tests for the warden session and access-control core, plus the
//! shared utilities they use.
//!
//! ## Module Structure
//!
//! - [`common`]: Shared test utilities
//!   - `fixtures`: Signed tokens, catalogs and configurations
//!   - `mocks`: Scriptable auth service and failing token persistence
//!   - `assertions`: Guard and catalog assertion helpers
//!
//! ## Running Tests
//!
//! ```bash
//! cargo test -p warden-tests
//! cargo test -p warden-tests --test integration_session
//! cargo test -p warden-tests --test integration_policy
//! cargo test -p warden-tests --test integration_config
//! ```
//!
//! ## Test Categories
//!
//! ### Session Tests (`integration_session.rs`)
//! - Startup restore from a persisted token
//! - Login, refresh and logout against a mock auth service
//! - Refresh coalescing
//! - Persistence failures
//!
//! ### Policy Tests (`integration_policy.rs`)
//! - Token validity and role resolution
//! - Catalog filtering, element visibility and navigation decisions
//!
//! ### Config Tests (`integration_config.rs`)
//! - YAML/TOML/JSON loading
//! - Environment overrides
//! - Validation rules

#![warn(missing_docs)]
#![deny(unsafe_code)]

pub mod common;

/// Re-export commonly used items for convenience.
pub mod prelude {
    pub use crate::common::assertions::*;
    pub use crate::common::fixtures::*;
    pub use crate::common::mocks::*;
}
