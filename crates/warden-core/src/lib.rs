// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! # warden-core
//!
//! Session and access-control primitives for the operator dashboard.
//!
//! Everything in this crate is synchronous and free of I/O:
//!
//! - **Token**: bearer-token payload decoding and expiry checks
//! - **Roles**: role normalization and resolution from claims
//! - **Session**: the immutable session snapshot derived from a token
//! - **Catalog**: the role-annotated route catalog
//! - **Policy**: role-membership checks over routes and UI elements
//! - **Guard**: per-navigation allow / redirect / deny decisions
//!
//! ## Example
//!
//! ```rust,ignore
//! use warden_core::{AccessPolicy, RoleResolver, RouteGuard, Session};
//!
//! let resolver = RoleResolver::new().with_default_role(Some("user"));
//! let session = Session::from_token(token, &resolver);
//!
//! let policy = AccessPolicy::default();
//! let sidebar = policy.sidebar(&session.roles);
//!
//! let decision = RouteGuard::new().navigate(&policy, "/dashboard/energy", &session);
//! ```

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]
#![deny(unsafe_code)]

// =============================================================================
// Token & Identity Modules
// =============================================================================

pub mod error;
pub mod roles;
pub mod session;
pub mod token;

// =============================================================================
// Access Control Modules
// =============================================================================

pub mod catalog;
pub mod guard;
pub mod policy;

// =============================================================================
// Re-exports for convenience
// =============================================================================

pub use error::{CoreResult, DecodeError, ValidationFailure};

pub use token::{decode, is_valid, is_valid_at, Claims, TokenValidator};

pub use roles::{normalize_role, RoleResolver, RoleSet, DEFAULT_ROLES_CLAIM_PATH};

pub use session::Session;

pub use catalog::{
    full_path, RequiredRoles, RouteCatalog, RouteDefinition, RouteGroup, RouteRef, WILDCARD,
};

pub use policy::{
    decide, filter_catalog, is_permitted, visible_elements, AccessDecision, AccessPolicy,
    ElementRule,
};

pub use guard::{GuardDecision, RouteGuard, DEFAULT_FORBIDDEN_PATH, DEFAULT_SIGN_IN_PATH};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Crate name
pub const NAME: &str = env!("CARGO_PKG_NAME");
