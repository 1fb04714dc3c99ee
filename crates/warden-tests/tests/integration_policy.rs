// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! # Access Policy Integration Tests
//!
//! Token validity, role resolution, catalog filtering and the navigation
//! guard working together on real signed tokens.
//!
//! ## Test Categories
//!
//! - `test_token_*`: Decoding and validity
//! - `test_roles_*`: Role resolution
//! - `test_catalog_*`: Catalog and element filtering
//! - `test_guard_*`: Navigation decisions
//! - `test_scenario_*`: End-to-end flows

use chrono::{DateTime, Utc};
use serde_json::json;

use warden_core::{
    decode, filter_catalog, is_permitted, is_valid, is_valid_at, AccessPolicy, DecodeError,
    ElementRule, GuardDecision, RequiredRoles, RoleResolver, RoleSet, RouteCatalog,
    RouteDefinition, RouteGroup, RouteGuard, Session, TokenValidator, ValidationFailure,
    DEFAULT_FORBIDDEN_PATH, DEFAULT_SIGN_IN_PATH,
};
use warden_tests::prelude::*;

fn at(secs: i64) -> DateTime<Utc> {
    DateTime::from_timestamp(secs, 0).unwrap()
}

fn session(token: String) -> Session {
    Session::from_token(token, &RoleResolver::new())
}

// =============================================================================
// Token Tests
// =============================================================================

#[test]
fn test_token_expiry_boundary() {
    let token = TokenFixtures::sign(&json!({ "exp": 1_700_000_000 }));

    assert!(is_valid_at(Some(&token), at(1_699_999_999)));
    assert!(!is_valid_at(Some(&token), at(1_700_000_000)));
    assert!(!is_valid_at(Some(&token), at(1_700_000_001)));
}

#[test]
fn test_token_absent_malformed_and_without_expiry() {
    assert!(!is_valid(None));
    assert!(!is_valid(Some("")));
    assert!(!is_valid(Some(&TokenFixtures::malformed())));
    assert!(!is_valid(Some(&TokenFixtures::without_expiry())));

    let validator = TokenValidator::new();
    assert_eq!(validator.check(None), Err(ValidationFailure::Absent));
    assert_eq!(
        validator.check(Some(&TokenFixtures::without_expiry())),
        Err(ValidationFailure::MissingExpiry)
    );
    assert!(matches!(
        validator.check(Some(&TokenFixtures::malformed())),
        Err(ValidationFailure::Malformed(DecodeError::SegmentCount { found: 1 }))
    ));
}

#[test]
fn test_token_decode_real_jwt() {
    let claims = decode(&TokenFixtures::admin()).unwrap();
    assert_eq!(claims.subject(), Some("operator-1"));
    assert_eq!(claims.preferred_username(), Some("operator"));
    assert_eq!(claims.role(), Some("Admin"));
    assert!(claims.expires_at().unwrap() > Utc::now());
}

#[test]
fn test_token_seconds_remaining() {
    let token = TokenFixtures::sign(&json!({ "exp": 1_000 }));
    let validator = TokenValidator::new();

    assert_eq!(validator.seconds_remaining(Some(&token), at(400)), Some(600));
    assert_eq!(validator.seconds_remaining(Some(&token), at(1_000)), None);
    assert_eq!(
        TokenValidator::new().with_leeway(10).seconds_remaining(Some(&token), at(1_005)),
        Some(5)
    );
}

// =============================================================================
// Role Tests
// =============================================================================

#[test]
fn test_roles_merge_flat_and_nested() {
    let token = TokenFixtures::sign(&json!({
        "exp": 4_000_000_000i64,
        "role": "AreaManager",
        "realm_access": { "roles": ["USER", "Admin", "user"] },
    }));
    let roles = RoleResolver::new().resolve(&decode(&token).unwrap());

    assert_eq!(roles, ["admin", "areamanager", "user"].into_iter().collect::<RoleSet>());
}

#[test]
fn test_roles_idempotent_and_order_independent() {
    let resolver = RoleResolver::new();
    let a = decode(&TokenFixtures::with_realm_roles(&["Admin", "manager", "admin"], 60)).unwrap();
    let b = decode(&TokenFixtures::with_realm_roles(&["manager", "ADMIN"], 60)).unwrap();

    assert_eq!(resolver.resolve(&a), resolver.resolve(&a));
    assert_eq!(resolver.resolve(&a), resolver.resolve(&b));
    assert_eq!(resolver.resolve(&a).len(), 2);
}

#[test]
fn test_roles_custom_claim_path_and_default() {
    let token = TokenFixtures::sign(&json!({
        "exp": 4_000_000_000i64,
        "resource_access": { "dashboard": { "roles": ["Manager"] } },
    }));
    let claims = decode(&token).unwrap();

    let standard = RoleResolver::new().with_default_role(Some("User"));
    assert_eq!(standard.resolve(&claims), RoleSet::single("user"));

    let custom = RoleResolver::new().with_roles_claim_path("resource_access.dashboard.roles");
    assert_eq!(custom.resolve(&claims), RoleSet::single("manager"));
}

// =============================================================================
// Catalog Tests
// =============================================================================

#[test]
fn test_catalog_wildcard_admits_everyone() {
    for roles in [RoleSet::new(), RoleSet::single("user"), RoleSet::single("nobody")] {
        assert!(is_permitted(&RequiredRoles::Any, &roles));
    }
    assert!(!is_permitted(&RequiredRoles::roles(Vec::<String>::new()), &RoleSet::single("admin")));
}

#[test]
fn test_catalog_filter_preserves_order() {
    let catalog = CatalogFixtures::mixed();

    let admin = filter_catalog(&catalog, &RoleSet::single("admin"));
    assert_eq!(
        catalog_paths(&admin),
        vec!["/dashboard/home", "/dashboard/energy", "/dashboard/users", "/auth/sign-in"]
    );

    let manager = filter_catalog(&catalog, &RoleSet::single("manager"));
    assert_eq!(
        catalog_paths(&manager),
        vec![
            "/dashboard/home",
            "/dashboard/energy",
            "/dashboard/reports/monthly",
            "/dashboard/reports/yearly",
            "/auth/sign-in",
        ]
    );
}

#[test]
fn test_catalog_sidebar_and_elements() {
    let policy = AccessPolicy::new(CatalogFixtures::mixed())
        .with_sidebar_layouts(vec!["dashboard".to_string()])
        .with_elements(vec![
            ElementRule::new("energy", RequiredRoles::roles(["admin", "manager"])),
            ElementRule::new("trafficLights", RequiredRoles::Any),
            ElementRule::new("users", RequiredRoles::roles(["admin"])),
        ]);

    let user = RoleSet::single("user");
    let sidebar = policy.sidebar(&user);
    assert_eq!(sidebar.groups().len(), 2);
    assert_eq!(catalog_paths(&sidebar), vec!["/dashboard/home"]);

    assert_eq!(policy.visible_elements(&user), vec!["trafficLights"]);
    assert_eq!(
        policy.visible_elements(&RoleSet::single("admin")),
        vec!["energy", "trafficLights", "users"]
    );
    assert!(!policy.is_element_visible("missing", &RoleSet::single("admin")));
}

// =============================================================================
// Guard Tests
// =============================================================================

#[test]
fn test_guard_decisions() {
    let guard = RouteGuard::new();
    let required = RequiredRoles::roles(["admin"]);

    let admin = session(TokenFixtures::admin());
    assert_eq!(guard.guard(&required, &admin), GuardDecision::Allow);

    let user = session(TokenFixtures::user());
    assert_denied(&guard.guard(&required, &user), DEFAULT_FORBIDDEN_PATH);

    let anonymous = Session::anonymous(&RoleResolver::new().with_default_role(Some("admin")));
    assert_redirect(&guard.guard(&required, &anonymous), DEFAULT_SIGN_IN_PATH);
    assert_redirect(&guard.guard(&RequiredRoles::Any, &anonymous), DEFAULT_SIGN_IN_PATH);
}

#[test]
fn test_guard_navigate_public_and_unknown() {
    let policy = AccessPolicy::new(CatalogFixtures::mixed());
    let guard = RouteGuard::new().with_sign_in_path("/login");
    let anonymous = Session::anonymous(&RoleResolver::new());

    assert_eq!(guard.navigate(&policy, "/auth/sign-in", &anonymous), Some(GuardDecision::Allow));
    assert_eq!(guard.navigate(&policy, "/dashboard/nowhere", &anonymous), None);

    let decision = guard.navigate(&policy, "/dashboard/home", &anonymous).unwrap();
    assert_redirect(&decision, "/login");
    assert_eq!(decision.status_code(), 302);
}

// =============================================================================
// Scenarios
// =============================================================================

#[test]
fn test_scenario_valid_admin_token_allowed() {
    let token = TokenFixtures::with_role("Admin", 3600);
    assert!(is_valid(Some(&token)));

    let resolved = RoleResolver::new().resolve(&decode(&token).unwrap());
    assert_eq!(resolved, RoleSet::single("admin"));

    let decision = RouteGuard::new().guard(&RequiredRoles::roles(["admin", "manager"]), &session(token));
    assert!(decision.is_allowed());
}

#[test]
fn test_scenario_expired_token_redirects() {
    let token = TokenFixtures::expired();
    assert!(!is_valid(Some(&token)));

    let expired = session(token);
    assert!(!expired.is_authenticated());

    let guard = RouteGuard::new();
    for required in [RequiredRoles::Any, RequiredRoles::roles(["admin"]), RequiredRoles::roles(["user"])] {
        assert_redirect(&guard.guard(&required, &expired), DEFAULT_SIGN_IN_PATH);
    }
}

#[test]
fn test_scenario_group_kept_without_pages() {
    let catalog = RouteCatalog::new(vec![
        RouteGroup::new("dashboard")
            .with_title("Reports")
            .page(RouteDefinition::new("Monthly", "/monthly", RequiredRoles::roles(["manager"])))
            .page(RouteDefinition::new("Yearly", "/yearly", RequiredRoles::roles(["manager"]))),
    ]);

    let filtered = filter_catalog(&catalog, &RoleSet::single("user"));

    assert_eq!(filtered.groups().len(), 1);
    assert_eq!(filtered.groups()[0].title.as_deref(), Some("Reports"));
    assert_eq!(pages_per_group(&filtered), vec![0]);
}
