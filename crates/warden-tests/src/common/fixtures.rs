// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! # Test Fixtures
//!
//! Signed tokens and ready-made catalogs and configurations.
//!
//! Tokens are real HS256 JWTs minted with `jsonwebtoken`; the warden core
//! never checks the signature, but using real tokens keeps the segment and
//! base64url handling honest.

use chrono::Utc;
use jsonwebtoken::{encode, EncodingKey, Header};
use serde_json::{json, Value};

use warden_core::{RequiredRoles, RouteCatalog, RouteDefinition, RouteGroup};

/// Key used to sign fixture tokens.
pub const FIXTURE_SECRET: &[u8] = b"warden-fixture-secret";

// =============================================================================
// Token Fixtures
// =============================================================================

/// Fixture providing signed bearer tokens.
pub struct TokenFixtures;

impl TokenFixtures {
    /// Signs an arbitrary payload.
    pub fn sign(payload: &Value) -> String {
        encode(&Header::default(), payload, &EncodingKey::from_secret(FIXTURE_SECRET))
            .expect("Failed to sign fixture token")
    }

    /// A token with a flat `role` claim expiring `ttl_secs` from now.
    pub fn with_role(role: &str, ttl_secs: i64) -> String {
        Self::sign(&json!({
            "sub": "operator-1",
            "preferred_username": "operator",
            "iat": Utc::now().timestamp(),
            "exp": Utc::now().timestamp() + ttl_secs,
            "role": role,
        }))
    }

    /// A token carrying roles under `realm_access.roles`.
    pub fn with_realm_roles(roles: &[&str], ttl_secs: i64) -> String {
        Self::sign(&json!({
            "sub": "operator-2",
            "exp": Utc::now().timestamp() + ttl_secs,
            "realm_access": { "roles": roles },
        }))
    }

    /// An admin token valid for an hour.
    pub fn admin() -> String {
        Self::with_role("Admin", 3600)
    }

    /// A plain user token valid for an hour.
    pub fn user() -> String {
        Self::with_role("user", 3600)
    }

    /// A token that expired one second ago.
    pub fn expired() -> String {
        Self::with_role("Admin", -1)
    }

    /// A token without an `exp` claim.
    pub fn without_expiry() -> String {
        Self::sign(&json!({ "sub": "operator-3", "role": "admin" }))
    }

    /// A string that is not a token at all.
    pub fn malformed() -> String {
        "definitely-not-a-token".to_string()
    }
}

// =============================================================================
// Catalog Fixtures
// =============================================================================

/// Fixture providing route catalogs.
pub struct CatalogFixtures;

impl CatalogFixtures {
    /// A catalog with one group open to all, one for managers only and a
    /// public auth group.
    pub fn mixed() -> RouteCatalog {
        RouteCatalog::new(vec![
            RouteGroup::new("dashboard")
                .with_title("Overview")
                .page(RouteDefinition::new("Home", "/home", RequiredRoles::Any))
                .page(RouteDefinition::new(
                    "Energy",
                    "/energy",
                    RequiredRoles::roles(["admin", "manager"]),
                ))
                .page(RouteDefinition::new("Users", "/users", RequiredRoles::roles(["admin"]))),
            RouteGroup::new("dashboard")
                .with_title("Reports")
                .page(RouteDefinition::new(
                    "Monthly",
                    "/reports/monthly",
                    RequiredRoles::roles(["manager"]),
                ))
                .page(RouteDefinition::new(
                    "Yearly",
                    "/reports/yearly",
                    RequiredRoles::roles(["manager"]),
                )),
            RouteGroup::new("auth")
                .page(RouteDefinition::new("Sign in", "/sign-in", RequiredRoles::Any)),
        ])
    }
}

// =============================================================================
// Config Fixtures
// =============================================================================

/// Fixture providing configuration documents.
pub struct ConfigFixtures;

impl ConfigFixtures {
    /// A complete YAML configuration.
    pub fn yaml() -> &'static str {
        r#"
access:
  available_roles: [admin, manager, user]
  default_role: user
  roles_claim_path: realm_access.roles

session:
  token_path: state/session.json
  leeway_secs: 5
  refresh_lead_secs: 120

navigation:
  sign_in_path: /auth/sign-in
  forbidden_path: /dashboard/403

catalog:
  - title: Overview
    layout: dashboard
    pages:
      - name: Home
        path: /home
        required_roles: ["*"]
      - name: Energy
        path: /energy
        required_roles: [admin, manager]
  - layout: auth
    pages:
      - name: Sign in
        path: /sign-in
        required_roles: ["*"]

elements:
  - id: energy
    required_roles: [admin, manager]
  - id: trafficLights
    required_roles: ["*"]

logging:
  level: debug
  format: json
"#
    }

    /// A minimal TOML configuration.
    pub fn toml() -> &'static str {
        r#"
[access]
available_roles = ["admin", "user"]
default_role = "user"

[session]
leeway_secs = 2

[logging]
level = "warn"
"#
    }
}
