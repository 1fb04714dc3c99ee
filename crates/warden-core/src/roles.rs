// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Role sets and role resolution from claims.

use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::token::Claims;

/// Where identity providers following the realm convention put role lists.
pub const DEFAULT_ROLES_CLAIM_PATH: &str = "realm_access.roles";

/// Normalizes a role identifier: trimmed and lowercased. Returns `None` for
/// blank input.
pub fn normalize_role(role: &str) -> Option<String> {
    let trimmed = role.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_lowercase())
    }
}

// =============================================================================
// RoleSet
// =============================================================================

/// A deduplicated set of lowercase role identifiers.
///
/// Every way into the set normalizes, so `"Admin"` and `"admin"` are the same
/// member. Equality ignores the order roles were added in.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "Vec<String>", into = "Vec<String>")]
pub struct RoleSet {
    roles: BTreeSet<String>,
}

impl RoleSet {
    /// Creates an empty role set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a set holding a single role.
    pub fn single(role: &str) -> Self {
        let mut set = Self::new();
        set.insert(role);
        set
    }

    /// Adds a role. Returns `true` if it was not already present.
    pub fn insert(&mut self, role: &str) -> bool {
        match normalize_role(role) {
            Some(role) => self.roles.insert(role),
            None => false,
        }
    }

    /// Returns `true` if the set contains the role (case-insensitively).
    pub fn contains(&self, role: &str) -> bool {
        normalize_role(role).is_some_and(|role| self.roles.contains(&role))
    }

    /// Returns `true` if the two sets share at least one role.
    pub fn intersects(&self, other: &RoleSet) -> bool {
        !self.roles.is_disjoint(&other.roles)
    }

    /// Adds every role of `other`.
    pub fn extend_from(&mut self, other: &RoleSet) {
        self.roles.extend(other.roles.iter().cloned());
    }

    /// Returns `true` if the set is empty.
    pub fn is_empty(&self) -> bool {
        self.roles.is_empty()
    }

    /// Number of roles.
    pub fn len(&self) -> usize {
        self.roles.len()
    }

    /// Iterates roles in sorted order.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.roles.iter().map(String::as_str)
    }

    /// Collects the roles into a sorted vector.
    pub fn to_vec(&self) -> Vec<String> {
        self.roles.iter().cloned().collect()
    }
}

impl<S: AsRef<str>> FromIterator<S> for RoleSet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        let mut set = Self::new();
        for role in iter {
            set.insert(role.as_ref());
        }
        set
    }
}

impl From<Vec<String>> for RoleSet {
    fn from(roles: Vec<String>) -> Self {
        roles.iter().collect()
    }
}

impl From<RoleSet> for Vec<String> {
    fn from(set: RoleSet) -> Self {
        set.roles.into_iter().collect()
    }
}

impl fmt::Display for RoleSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{")?;
        for (i, role) in self.roles.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", role)?;
        }
        write!(f, "}}")
    }
}

// =============================================================================
// RoleResolver
// =============================================================================

/// Derives a [`RoleSet`] from token claims.
///
/// Two claim shapes are reconciled here and nowhere else:
///
/// - a flat `role` string
/// - a list of strings under a provider namespace (`realm_access.roles` by default)
///
/// Both are lowercased and merged. If neither yields anything, the configured
/// default role (if any) stands in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoleResolver {
    default_role: Option<String>,
    roles_claim_path: String,
}

impl RoleResolver {
    /// Creates a resolver with no default role and the standard claim path.
    pub fn new() -> Self {
        Self {
            default_role: None,
            roles_claim_path: DEFAULT_ROLES_CLAIM_PATH.to_string(),
        }
    }

    /// Sets the fallback role used when claims carry none.
    pub fn with_default_role(mut self, role: Option<&str>) -> Self {
        self.default_role = role.and_then(normalize_role);
        self
    }

    /// Sets the dotted path of the nested roles list.
    pub fn with_roles_claim_path(mut self, path: impl Into<String>) -> Self {
        self.roles_claim_path = path.into();
        self
    }

    /// Returns the normalized default role.
    pub fn default_role(&self) -> Option<&str> {
        self.default_role.as_deref()
    }

    /// Returns the nested roles claim path.
    pub fn roles_claim_path(&self) -> &str {
        &self.roles_claim_path
    }

    /// The role set used when there are no claims at all.
    pub fn fallback(&self) -> RoleSet {
        self.default_role
            .as_deref()
            .map(RoleSet::single)
            .unwrap_or_default()
    }

    /// Resolves the role set for the given claims.
    pub fn resolve(&self, claims: &Claims) -> RoleSet {
        let mut roles = RoleSet::new();

        for role in claims.nested_roles(&self.roles_claim_path).unwrap_or_default() {
            roles.insert(role);
        }

        if let Some(role) = claims.role() {
            roles.insert(role);
        }

        if roles.is_empty() {
            return self.fallback();
        }
        roles
    }

    /// Resolves roles for optional claims, falling back when absent.
    pub fn resolve_opt(&self, claims: Option<&Claims>) -> RoleSet {
        match claims {
            Some(claims) => self.resolve(claims),
            None => self.fallback(),
        }
    }
}

impl Default for RoleResolver {
    fn default() -> Self {
        Self::new()
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};

    fn claims(value: Value) -> Claims {
        match value {
            Value::Object(map) => Claims::from_map(map),
            _ => unreachable!(),
        }
    }

    #[test]
    fn test_role_set_normalizes() {
        let set: RoleSet = ["Admin", "admin", " ADMIN ", "", "User"].into_iter().collect();
        assert_eq!(set.len(), 2);
        assert!(set.contains("ADMIN"));
        assert!(set.contains("user"));
        assert_eq!(set.to_string(), "{admin, user}");
    }

    #[test]
    fn test_role_set_serde_roundtrip_normalizes() {
        let set: RoleSet = serde_json::from_value(json!(["Manager", "manager"])).unwrap();
        assert_eq!(set, RoleSet::single("manager"));
        assert_eq!(serde_json::to_value(&set).unwrap(), json!(["manager"]));
    }

    #[test]
    fn test_resolve_merges_both_shapes() {
        let resolver = RoleResolver::new();
        let roles = resolver.resolve(&claims(json!({
            "role": "Operator",
            "realm_access": { "roles": ["Admin", "manager", "admin", 7] }
        })));

        let expected: RoleSet = ["admin", "manager", "operator"].into_iter().collect();
        assert_eq!(roles, expected);
    }

    #[test]
    fn test_resolve_is_order_independent() {
        let resolver = RoleResolver::new();
        let a = resolver.resolve(&claims(json!({ "realm_access": { "roles": ["b", "A", "c"] } })));
        let b = resolver.resolve(&claims(json!({ "realm_access": { "roles": ["C", "a", "B"] } })));
        assert_eq!(a, b);
        assert_eq!(a, resolver.resolve(&claims(json!({ "realm_access": { "roles": ["b", "A", "c"] } }))));
    }

    #[test]
    fn test_resolve_falls_back_to_default_role() {
        let empty = claims(json!({ "exp": 1 }));

        assert!(RoleResolver::new().resolve(&empty).is_empty());

        let resolver = RoleResolver::new().with_default_role(Some("Guest"));
        assert_eq!(resolver.resolve(&empty), RoleSet::single("guest"));
        assert_eq!(resolver.resolve_opt(None), RoleSet::single("guest"));

        let explicit = claims(json!({ "role": "admin" }));
        assert_eq!(resolver.resolve(&explicit), RoleSet::single("admin"));
    }

    #[test]
    fn test_custom_claim_path() {
        let resolver = RoleResolver::new().with_roles_claim_path("app.roles");
        assert_eq!(
            resolver.resolve(&claims(json!({ "app": { "roles": ["Viewer"] } }))),
            RoleSet::single("viewer")
        );
    }

    #[test]
    fn test_intersects() {
        let a: RoleSet = ["admin", "manager"].into_iter().collect();
        let b: RoleSet = ["Manager"].into_iter().collect();
        let c: RoleSet = ["user"].into_iter().collect();
        assert!(a.intersects(&b));
        assert!(!a.intersects(&c));
        assert!(!RoleSet::new().intersects(&a));
    }
}
