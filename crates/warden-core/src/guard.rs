// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Navigation guard.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::catalog::RequiredRoles;
use crate::policy::{is_permitted, AccessPolicy};
use crate::session::Session;

/// Default sign-in location.
pub const DEFAULT_SIGN_IN_PATH: &str = "/auth/sign-in";

/// Default "not authorized" location.
pub const DEFAULT_FORBIDDEN_PATH: &str = "/dashboard/403";

/// Outcome of a navigation attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "decision", rename_all = "snake_case")]
pub enum GuardDecision {
    /// Render the route.
    Allow,
    /// No usable session: send the user to sign in.
    Redirect {
        /// Where to go.
        to: String,
    },
    /// Signed in, but lacking a required role (403).
    Deny {
        /// The not-authorized page.
        to: String,
    },
}

impl GuardDecision {
    /// Returns `true` for [`GuardDecision::Allow`].
    pub fn is_allowed(&self) -> bool {
        matches!(self, Self::Allow)
    }

    /// HTTP-style status for the decision.
    pub fn status_code(&self) -> u16 {
        match self {
            Self::Allow => 200,
            Self::Redirect { .. } => 302,
            Self::Deny { .. } => 403,
        }
    }
}

impl fmt::Display for GuardDecision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Allow => write!(f, "allow"),
            Self::Redirect { to } => write!(f, "redirect to {}", to),
            Self::Deny { to } => write!(f, "deny (403, {})", to),
        }
    }
}

/// Decides, per navigation, whether a route may be entered.
///
/// Decisions are computed fresh every time from the session handed in.
#[derive(Debug, Clone)]
pub struct RouteGuard {
    sign_in_path: String,
    forbidden_path: String,
    public_layouts: Vec<String>,
}

impl RouteGuard {
    /// Creates a guard with the default paths. Pages in the `auth` layout are
    /// public.
    pub fn new() -> Self {
        Self {
            sign_in_path: DEFAULT_SIGN_IN_PATH.to_string(),
            forbidden_path: DEFAULT_FORBIDDEN_PATH.to_string(),
            public_layouts: vec!["auth".to_string()],
        }
    }

    /// Sets the sign-in path.
    pub fn with_sign_in_path(mut self, path: impl Into<String>) -> Self {
        self.sign_in_path = path.into();
        self
    }

    /// Sets the not-authorized path.
    pub fn with_forbidden_path(mut self, path: impl Into<String>) -> Self {
        self.forbidden_path = path.into();
        self
    }

    /// Sets the layouts reachable without a session.
    pub fn with_public_layouts(mut self, layouts: Vec<String>) -> Self {
        self.public_layouts = layouts;
        self
    }

    /// The sign-in path.
    pub fn sign_in_path(&self) -> &str {
        &self.sign_in_path
    }

    /// Guards a route with the given requirement.
    ///
    /// No session ⇒ redirect, whatever the route asks for. Session without a
    /// required role ⇒ deny. Otherwise allow.
    pub fn guard(&self, required: &RequiredRoles, session: &Session) -> GuardDecision {
        self.guard_at(required, session, Utc::now())
    }

    /// [`RouteGuard::guard`] evaluated at a fixed instant.
    pub fn guard_at(
        &self,
        required: &RequiredRoles,
        session: &Session,
        now: DateTime<Utc>,
    ) -> GuardDecision {
        if !session.is_authenticated_at(now) {
            return GuardDecision::Redirect {
                to: self.sign_in_path.clone(),
            };
        }

        if !is_permitted(required, &session.roles) {
            tracing::debug!(
                roles = %session.roles,
                required = ?required,
                "Navigation denied"
            );
            return GuardDecision::Deny {
                to: self.forbidden_path.clone(),
            };
        }

        GuardDecision::Allow
    }

    /// Resolves a layout-qualified path against the policy's catalog and
    /// guards it. Returns `None` when no route lives at `path`.
    ///
    /// Pages in a public layout are allowed without a session.
    pub fn navigate(
        &self,
        policy: &AccessPolicy,
        path: &str,
        session: &Session,
    ) -> Option<GuardDecision> {
        self.navigate_at(policy, path, session, Utc::now())
    }

    /// [`RouteGuard::navigate`] evaluated at a fixed instant.
    pub fn navigate_at(
        &self,
        policy: &AccessPolicy,
        path: &str,
        session: &Session,
        now: DateTime<Utc>,
    ) -> Option<GuardDecision> {
        let found = policy.catalog().find(path)?;

        if self.public_layouts.iter().any(|l| *l == found.group.layout) {
            return Some(GuardDecision::Allow);
        }

        Some(self.guard_at(&found.route.required_roles, session, now))
    }
}

impl Default for RouteGuard {
    fn default() -> Self {
        Self::new()
    }
}

// =============================================================================
// Tests
// =============================================================================
