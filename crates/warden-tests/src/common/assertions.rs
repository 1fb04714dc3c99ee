// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! # Custom Assertions
//!
//! Assertion helpers that print useful context on failure.

use warden_core::{GuardDecision, RouteCatalog};

/// Asserts the decision is a redirect to `to`.
#[track_caller]
pub fn assert_redirect(decision: &GuardDecision, to: &str) {
    match decision {
        GuardDecision::Redirect { to: actual } => assert_eq!(actual, to, "redirect target"),
        other => panic!("Expected redirect to {}, got {:?}", to, other),
    }
}

/// Asserts the decision is a deny to `to`.
#[track_caller]
pub fn assert_denied(decision: &GuardDecision, to: &str) {
    match decision {
        GuardDecision::Deny { to: actual } => assert_eq!(actual, to, "forbidden target"),
        other => panic!("Expected deny to {}, got {:?}", to, other),
    }
}

/// Layout-qualified paths of every page in the catalog, in order.
pub fn catalog_paths(catalog: &RouteCatalog) -> Vec<String> {
    catalog.routes().map(|r| r.full_path()).collect()
}

/// Page count per group, in order.
pub fn pages_per_group(catalog: &RouteCatalog) -> Vec<usize> {
    catalog.groups().iter().map(|g| g.pages.len()).collect()
}
