// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Route catalog: the static, role-annotated list of navigable destinations.
//!
//! The catalog is an ordered sequence of groups, each tagged with a layout and
//! an optional title, each holding an ordered sequence of pages. A page is
//! addressed as `/{layout}{path}`, e.g. `/dashboard/home`.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::roles::RoleSet;

/// Required-roles entry that grants access to every role set, including none.
pub const WILDCARD: &str = "*";

// =============================================================================
// RequiredRoles
// =============================================================================

/// The roles a route or element asks for.
///
/// In configuration this is a plain list of strings; a list containing `"*"`
/// becomes [`RequiredRoles::Any`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<String>", into = "Vec<String>")]
pub enum RequiredRoles {
    /// Universal access.
    Any,
    /// Any one of these roles grants access.
    Roles(RoleSet),
}

impl RequiredRoles {
    /// Creates a requirement from role names.
    pub fn roles<S: AsRef<str>>(roles: impl IntoIterator<Item = S>) -> Self {
        let names: Vec<String> = roles.into_iter().map(|r| r.as_ref().to_string()).collect();
        Self::from(names)
    }

    /// Returns `true` for the wildcard requirement.
    pub fn is_any(&self) -> bool {
        matches!(self, Self::Any)
    }
}

impl From<Vec<String>> for RequiredRoles {
    fn from(names: Vec<String>) -> Self {
        if names.iter().any(|name| name.trim() == WILDCARD) {
            Self::Any
        } else {
            Self::Roles(names.iter().collect())
        }
    }
}

impl From<RequiredRoles> for Vec<String> {
    fn from(required: RequiredRoles) -> Self {
        match required {
            RequiredRoles::Any => vec![WILDCARD.to_string()],
            RequiredRoles::Roles(roles) => roles.into(),
        }
    }
}

// =============================================================================
// Catalog entries
// =============================================================================

/// A single navigable page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouteDefinition {
    /// Display name.
    pub name: String,
    /// Path relative to the group's layout, starting with `/`.
    pub path: String,
    /// Roles that may reach this page.
    pub required_roles: RequiredRoles,
    /// Reference to the content rendered at this route.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
}

impl RouteDefinition {
    /// Creates a route definition.
    pub fn new(name: impl Into<String>, path: impl Into<String>, required_roles: RequiredRoles) -> Self {
        Self {
            name: name.into(),
            path: path.into(),
            required_roles,
            content: None,
        }
    }

    /// Sets the content reference.
    pub fn with_content(mut self, content: impl Into<String>) -> Self {
        self.content = Some(content.into());
        self
    }
}

/// An ordered group of pages sharing a layout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouteGroup {
    /// Optional heading shown above the group.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// Layout tag.
    pub layout: String,
    /// Pages, in display order.
    #[serde(default)]
    pub pages: Vec<RouteDefinition>,
}

impl RouteGroup {
    /// Creates an untitled group.
    pub fn new(layout: impl Into<String>) -> Self {
        Self {
            title: None,
            layout: layout.into(),
            pages: Vec::new(),
        }
    }

    /// Sets the title.
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Appends a page.
    pub fn page(mut self, route: RouteDefinition) -> Self {
        self.pages.push(route);
        self
    }
}

/// A route together with the group it belongs to.
#[derive(Debug, Clone, Copy)]
pub struct RouteRef<'a> {
    /// Owning group.
    pub group: &'a RouteGroup,
    /// The route itself.
    pub route: &'a RouteDefinition,
}

impl RouteRef<'_> {
    /// The layout-qualified path.
    pub fn full_path(&self) -> String {
        full_path(&self.group.layout, &self.route.path)
    }
}

/// Joins a layout tag and a page path into `/{layout}{path}`.
pub fn full_path(layout: &str, path: &str) -> String {
    let layout = layout.trim_matches('/');
    let path = path.trim_end_matches('/');
    if path.starts_with('/') || path.is_empty() {
        format!("/{}{}", layout, path)
    } else {
        format!("/{}/{}", layout, path)
    }
}

// =============================================================================
// RouteCatalog
// =============================================================================

/// The ordered route catalog.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RouteCatalog {
    groups: Vec<RouteGroup>,
}

impl RouteCatalog {
    /// Creates a catalog from groups.
    pub fn new(groups: Vec<RouteGroup>) -> Self {
        Self { groups }
    }

    /// The operator dashboard's stock catalog.
    pub fn dashboard_default() -> Self {
        let staff = ["areamanager", "admin", "user", "manager"];
        let analysts = ["areamanager", "admin", "manager"];

        Self::new(vec![
            RouteGroup::new("dashboard")
                .page(RouteDefinition::new("dashboard", "/home", RequiredRoles::roles(staff)).with_content("Home"))
                .page(RouteDefinition::new("energy", "/energy", RequiredRoles::roles(analysts)).with_content("Energy"))
                .page(
                    RouteDefinition::new("environment", "/environment", RequiredRoles::roles(analysts))
                        .with_content("Environment"),
                )
                .page(
                    RouteDefinition::new("mobility", "/mobility", RequiredRoles::roles(["areamanager", "user", "admin"]))
                        .with_content("Mobility"),
                ),
            RouteGroup::new("dashboard").with_title("Documentation").page(
                RouteDefinition::new("documentation", "/documentation", RequiredRoles::roles(staff))
                    .with_content("Documentation"),
            ),
            RouteGroup::new("auth")
                .with_title("auth pages")
                .page(RouteDefinition::new("sign in", "/sign-in", RequiredRoles::Any).with_content("SignIn")),
        ])
    }

    /// Groups, in order.
    pub fn groups(&self) -> &[RouteGroup] {
        &self.groups
    }

    /// Consumes the catalog into its groups.
    pub fn into_groups(self) -> Vec<RouteGroup> {
        self.groups
    }

    /// Iterates every route in catalog order.
    pub fn routes(&self) -> impl Iterator<Item = RouteRef<'_>> {
        self.groups
            .iter()
            .flat_map(|group| group.pages.iter().map(move |route| RouteRef { group, route }))
    }

    /// Total number of pages across all groups.
    pub fn page_count(&self) -> usize {
        self.groups.iter().map(|g| g.pages.len()).sum()
    }

    /// Finds the route addressed by a layout-qualified path.
    pub fn find(&self, path: &str) -> Option<RouteRef<'_>> {
        let wanted = normalize_path(path);
        self.routes().find(|r| r.full_path() == wanted)
    }

    /// Keeps only the groups whose layout is listed, preserving order.
    pub fn with_layouts<S: AsRef<str>>(&self, layouts: &[S]) -> RouteCatalog {
        let groups = self
            .groups
            .iter()
            .filter(|g| layouts.iter().any(|l| l.as_ref() == g.layout))
            .cloned()
            .collect();
        RouteCatalog::new(groups)
    }

    /// Layout-qualified paths that appear more than once.
    pub fn duplicate_paths(&self) -> Vec<String> {
        let mut seen = HashSet::new();
        let mut duplicates = Vec::new();
        for route in self.routes() {
            let path = route.full_path();
            if !seen.insert(path.clone()) && !duplicates.contains(&path) {
                duplicates.push(path);
            }
        }
        duplicates
    }
}

fn normalize_path(path: &str) -> String {
    let trimmed = path.trim().trim_end_matches('/');
    if trimmed.starts_with('/') {
        trimmed.to_string()
    } else {
        format!("/{}", trimmed)
    }
}

// =============================================================================
// Tests
// =============================================================================
