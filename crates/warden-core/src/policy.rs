// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Access policy: static role-membership checks over routes and UI elements.
//!
//! Every function here is pure. Nothing is cached, so a decision always
//! reflects the role set it was handed.

use std::collections::HashSet;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::catalog::{RequiredRoles, RouteCatalog, RouteDefinition, RouteGroup};
use crate::roles::RoleSet;

// =============================================================================
// Decisions
// =============================================================================

/// Whether a role set may see or reach something.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessDecision {
    /// The outcome.
    pub permitted: bool,
}

/// Returns `true` if `current` satisfies `required`.
///
/// The wildcard admits everyone, including an empty role set. Otherwise at
/// least one required role must be held. An empty requirement list admits
/// nobody.
pub fn is_permitted(required: &RequiredRoles, current: &RoleSet) -> bool {
    match required {
        RequiredRoles::Any => true,
        RequiredRoles::Roles(roles) => roles.intersects(current),
    }
}

/// Decides access to a single route.
pub fn decide(route: &RouteDefinition, current: &RoleSet) -> AccessDecision {
    AccessDecision {
        permitted: is_permitted(&route.required_roles, current),
    }
}

/// Drops the pages `current` may not reach.
///
/// Group and page order are preserved. Groups left with no pages stay in the
/// result as empty groups; whether to draw their heading is a rendering
/// concern.
pub fn filter_catalog(catalog: &RouteCatalog, current: &RoleSet) -> RouteCatalog {
    let groups = catalog
        .groups()
        .iter()
        .map(|group| RouteGroup {
            title: group.title.clone(),
            layout: group.layout.clone(),
            pages: group
                .pages
                .iter()
                .filter(|page| is_permitted(&page.required_roles, current))
                .cloned()
                .collect(),
        })
        .collect();

    RouteCatalog::new(groups)
}

// =============================================================================
// Elements
// =============================================================================

/// Visibility rule for a UI element such as a dashboard card or KPI tile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ElementRule {
    /// Element identifier.
    pub id: String,
    /// Roles that may see the element.
    pub required_roles: RequiredRoles,
}

impl ElementRule {
    /// Creates an element rule.
    pub fn new(id: impl Into<String>, required_roles: RequiredRoles) -> Self {
        Self {
            id: id.into(),
            required_roles,
        }
    }
}

/// Ids of the elements `current` may see, in rule order.
pub fn visible_elements<'a>(rules: &'a [ElementRule], current: &RoleSet) -> Vec<&'a str> {
    rules
        .iter()
        .filter(|rule| is_permitted(&rule.required_roles, current))
        .map(|rule| rule.id.as_str())
        .collect()
}

// =============================================================================
// AccessPolicy
// =============================================================================

/// The catalog and element rules loaded at startup, with the queries the
/// presentation layer needs.
///
/// Cheap to clone; the underlying data is shared and immutable.
#[derive(Debug, Clone)]
pub struct AccessPolicy {
    catalog: Arc<RouteCatalog>,
    elements: Arc<Vec<ElementRule>>,
    sidebar_layouts: Arc<Vec<String>>,
}

impl AccessPolicy {
    /// Creates a policy over a catalog with no element rules. The sidebar
    /// shows every layout.
    pub fn new(catalog: RouteCatalog) -> Self {
        let sidebar_layouts = catalog
            .groups()
            .iter()
            .map(|g| g.layout.clone())
            .fold(Vec::new(), |mut acc, layout| {
                if !acc.contains(&layout) {
                    acc.push(layout);
                }
                acc
            });

        Self {
            catalog: Arc::new(catalog),
            elements: Arc::new(Vec::new()),
            sidebar_layouts: Arc::new(sidebar_layouts),
        }
    }

    /// Sets the element rules.
    pub fn with_elements(mut self, elements: Vec<ElementRule>) -> Self {
        self.elements = Arc::new(elements);
        self
    }

    /// Restricts the sidebar to these layouts.
    pub fn with_sidebar_layouts(mut self, layouts: Vec<String>) -> Self {
        self.sidebar_layouts = Arc::new(layouts);
        self
    }

    /// The full catalog.
    pub fn catalog(&self) -> &RouteCatalog {
        &self.catalog
    }

    /// The element rules.
    pub fn elements(&self) -> &[ElementRule] {
        &self.elements
    }

    /// Layouts shown in the sidebar.
    pub fn sidebar_layouts(&self) -> &[String] {
        &self.sidebar_layouts
    }

    /// The catalog filtered to what `roles` may reach.
    pub fn visible_catalog(&self, roles: &RoleSet) -> RouteCatalog {
        filter_catalog(&self.catalog, roles)
    }

    /// The sidebar: sidebar layouts only, filtered by `roles`.
    pub fn sidebar(&self, roles: &RoleSet) -> RouteCatalog {
        filter_catalog(&self.catalog.with_layouts(&self.sidebar_layouts), roles)
    }

    /// Ids of the elements `roles` may see.
    pub fn visible_elements(&self, roles: &RoleSet) -> Vec<&str> {
        visible_elements(&self.elements, roles)
    }

    /// Returns `true` if `roles` may see the element. Unknown ids are hidden.
    pub fn is_element_visible(&self, id: &str, roles: &RoleSet) -> bool {
        self.elements
            .iter()
            .find(|rule| rule.id == id)
            .is_some_and(|rule| is_permitted(&rule.required_roles, roles))
    }

    /// Element ids that appear more than once.
    pub fn duplicate_element_ids(&self) -> Vec<&str> {
        let mut seen = HashSet::new();
        let mut duplicates = Vec::new();
        for rule in self.elements.iter() {
            let id = rule.id.as_str();
            if !seen.insert(id) && !duplicates.contains(&id) {
                duplicates.push(id);
            }
        }
        duplicates
    }
}

impl Default for AccessPolicy {
    fn default() -> Self {
        Self::new(RouteCatalog::dashboard_default())
    }
}

// =============================================================================
// Tests
// =============================================================================
