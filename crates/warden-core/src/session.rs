// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! The session record derived from the current token.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::roles::{RoleResolver, RoleSet};
use crate::token::{decode, Claims, TokenValidator};

/// Authenticated-or-not state derived from a token.
///
/// A session is always built in one step from a token (or its absence) and is
/// never edited afterwards, so its token, claims and roles always belong to the
/// same login or refresh cycle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    /// Unique identifier of this session snapshot.
    pub id: Uuid,
    /// The bearer token, if any.
    #[serde(skip_serializing)]
    pub token: Option<String>,
    /// Decoded claims, present whenever the token decoded.
    pub claims: Option<Claims>,
    /// Roles resolved from the claims, or the fallback set.
    pub roles: RoleSet,
    /// When this snapshot was built.
    pub established_at: DateTime<Utc>,
    #[serde(skip)]
    validator: TokenValidator,
}

impl Session {
    /// A session with no token. Roles are the resolver's fallback set.
    pub fn anonymous(resolver: &RoleResolver) -> Self {
        Self {
            id: Uuid::now_v7(),
            token: None,
            claims: None,
            roles: resolver.fallback(),
            established_at: Utc::now(),
            validator: TokenValidator::new(),
        }
    }

    /// Builds a session from a token.
    ///
    /// A token that does not decode yields a session with no claims and the
    /// fallback roles. Whether the token is still current is not decided here;
    /// see [`Session::is_authenticated`].
    pub fn from_token(token: impl Into<String>, resolver: &RoleResolver) -> Self {
        let token = token.into();
        let claims = match decode(&token) {
            Ok(claims) => Some(claims),
            Err(e) => {
                tracing::debug!(error = %e, "Session token did not decode");
                None
            }
        };
        let roles = resolver.resolve_opt(claims.as_ref());

        Self {
            id: Uuid::now_v7(),
            token: Some(token),
            claims,
            roles,
            established_at: Utc::now(),
            validator: TokenValidator::new(),
        }
    }

    /// Uses the given validator (e.g. one with clock-skew leeway) for
    /// authentication checks.
    pub fn with_validator(mut self, validator: TokenValidator) -> Self {
        self.validator = validator;
        self
    }

    /// Returns `true` if the token is present and valid right now.
    pub fn is_authenticated(&self) -> bool {
        self.is_authenticated_at(Utc::now())
    }

    /// Returns `true` if the token is present and valid at `now`.
    pub fn is_authenticated_at(&self, now: DateTime<Utc>) -> bool {
        match (&self.token, &self.claims) {
            (Some(_), Some(claims)) => self.validator.check_claims_at(claims, now).is_ok(),
            _ => false,
        }
    }

    /// Returns `true` if this session carries no token.
    pub fn is_anonymous(&self) -> bool {
        self.token.is_none()
    }

    /// Token expiry, if the claims carry one.
    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        self.claims.as_ref().and_then(Claims::expires_at)
    }

    /// Best display name available from the claims.
    pub fn display_name(&self) -> Option<&str> {
        let claims = self.claims.as_ref()?;
        claims
            .preferred_username()
            .or_else(|| claims.get("name").and_then(|v| v.as_str()))
            .or_else(|| claims.subject())
    }

    /// Returns the validator used for authentication checks.
    pub fn validator(&self) -> TokenValidator {
        self.validator
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use jsonwebtoken::{encode, EncodingKey, Header};
    use serde_json::json;

    fn token_for(payload: serde_json::Value) -> String {
        encode(&Header::default(), &payload, &EncodingKey::from_secret(b"k")).unwrap()
    }

    fn at(secs: i64) -> DateTime<Utc> {
        DateTime::from_timestamp(secs, 0).unwrap()
    }

    #[test]
    fn test_anonymous_session() {
        let session = Session::anonymous(&RoleResolver::new());
        assert!(session.is_anonymous());
        assert!(!session.is_authenticated());
        assert!(session.roles.is_empty());

        let with_default = Session::anonymous(&RoleResolver::new().with_default_role(Some("guest")));
        assert_eq!(with_default.roles, RoleSet::single("guest"));
    }

    #[test]
    fn test_session_from_valid_token() {
        let resolver = RoleResolver::new();
        let token = token_for(json!({
            "exp": 2_000,
            "preferred_username": "ops",
            "realm_access": { "roles": ["Manager"] }
        }));
        let session = Session::from_token(token.clone(), &resolver);

        assert_eq!(session.token.as_deref(), Some(token.as_str()));
        assert_eq!(session.roles, resolver.resolve(session.claims.as_ref().unwrap()));
        assert!(session.is_authenticated_at(at(1_999)));
        assert!(!session.is_authenticated_at(at(2_000)));
        assert_eq!(session.display_name(), Some("ops"));
    }

    #[test]
    fn test_session_from_garbage_token() {
        let resolver = RoleResolver::new().with_default_role(Some("guest"));
        let session = Session::from_token("not-a-token", &resolver);

        assert!(!session.is_anonymous());
        assert!(session.claims.is_none());
        assert!(!session.is_authenticated_at(at(0)));
        assert_eq!(session.roles, RoleSet::single("guest"));
    }

    #[test]
    fn test_session_validator_leeway() {
        let token = token_for(json!({ "exp": 1_000 }));
        let session = Session::from_token(token, &RoleResolver::new())
            .with_validator(TokenValidator::new().with_leeway(60));

        assert!(session.is_authenticated_at(at(1_030)));
        assert!(!session.is_authenticated_at(at(1_060)));
    }

    #[test]
    fn test_session_serialization_omits_token() {
        let token = token_for(json!({ "exp": 1_000, "role": "admin" }));
        let session = Session::from_token(token, &RoleResolver::new());
        let value = serde_json::to_value(&session).unwrap();

        assert!(value.get("token").is_none());
        assert_eq!(value["roles"], json!(["admin"]));
    }
}
