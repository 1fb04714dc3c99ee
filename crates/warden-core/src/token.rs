// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Bearer token decoding and validity checks.
//!
//! Tokens are `header.payload.signature`, each segment base64url. Only the
//! payload is read here. Signatures are *not* verified: the services behind
//! protected calls do that. What this module answers is narrower: "what does
//! the token claim" and "is it still worth presenting".

use base64::alphabet;
use base64::engine::general_purpose::GeneralPurpose;
use base64::engine::{DecodePaddingMode, GeneralPurposeConfig};
use base64::Engine;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{DecodeError, ValidationFailure};

/// Base64url engine that accepts payloads with or without `=` padding.
const PAYLOAD_ENGINE: GeneralPurpose = GeneralPurpose::new(
    &alphabet::URL_SAFE,
    GeneralPurposeConfig::new().with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

// =============================================================================
// Claims
// =============================================================================

/// Decoded token payload.
///
/// All fields are kept, including ones nothing here interprets. Typed
/// accessors cover the fields the session core cares about.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Claims {
    fields: Map<String, Value>,
}

impl Claims {
    /// Creates an empty claim set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Wraps an existing JSON object.
    pub fn from_map(fields: Map<String, Value>) -> Self {
        Self { fields }
    }

    /// Adds or replaces a claim.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.fields.insert(key.into(), value.into());
        self
    }

    /// Returns a raw claim.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }

    /// Walks a dotted path (`realm_access.roles`) through nested objects.
    pub fn lookup(&self, path: &str) -> Option<&Value> {
        let mut segments = path.split('.');
        let first = segments.next()?;
        let mut current = self.fields.get(first)?;
        for segment in segments {
            current = current.as_object()?.get(segment)?;
        }
        Some(current)
    }

    /// Expiration, seconds since epoch. Integer and float encodings are both accepted.
    pub fn exp(&self) -> Option<f64> {
        self.fields.get("exp").and_then(Value::as_f64)
    }

    /// Expiration as a timestamp.
    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        self.exp()
            .and_then(|exp| DateTime::from_timestamp(exp.floor() as i64, 0))
    }

    /// Issued-at as a timestamp.
    pub fn issued_at(&self) -> Option<DateTime<Utc>> {
        self.fields
            .get("iat")
            .and_then(Value::as_f64)
            .and_then(|iat| DateTime::from_timestamp(iat.floor() as i64, 0))
    }

    /// The flat, single-string `role` claim.
    pub fn role(&self) -> Option<&str> {
        self.fields.get("role").and_then(Value::as_str)
    }

    /// The string entries of the list found at a dotted path. Non-string
    /// entries are skipped; `None` if the path does not lead to a list.
    pub fn nested_roles(&self, path: &str) -> Option<Vec<&str>> {
        let entries = self.lookup(path)?.as_array()?;
        Some(entries.iter().filter_map(Value::as_str).collect())
    }

    /// The `sub` claim.
    pub fn subject(&self) -> Option<&str> {
        self.fields.get("sub").and_then(Value::as_str)
    }

    /// The `iss` claim.
    pub fn issuer(&self) -> Option<&str> {
        self.fields.get("iss").and_then(Value::as_str)
    }

    /// The `preferred_username` claim.
    pub fn preferred_username(&self) -> Option<&str> {
        self.fields.get("preferred_username").and_then(Value::as_str)
    }

    /// Number of claims.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Returns `true` if the payload was an empty object.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Iterates all claims.
    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.fields.iter()
    }

    /// Unwraps into the underlying JSON object.
    pub fn into_map(self) -> Map<String, Value> {
        self.fields
    }
}

// =============================================================================
// Decoding
// =============================================================================

/// Decodes a token's payload into claims.
///
/// Fails only on structural problems. A payload without `exp` or roles
/// decodes fine; semantic checks belong to [`TokenValidator`].
pub fn decode(token: &str) -> Result<Claims, DecodeError> {
    if token.trim().is_empty() {
        return Err(DecodeError::Empty);
    }

    let segments: Vec<&str> = token.split('.').collect();
    if segments.len() != 3 {
        return Err(DecodeError::SegmentCount {
            found: segments.len(),
        });
    }

    let bytes = PAYLOAD_ENGINE
        .decode(segments[1])
        .map_err(|e| DecodeError::base64(e.to_string()))?;

    let value: Value =
        serde_json::from_slice(&bytes).map_err(|e| DecodeError::json(e.to_string()))?;

    match value {
        Value::Object(fields) => Ok(Claims::from_map(fields)),
        other => Err(DecodeError::NotAnObject {
            kind: json_kind(&other),
        }),
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

// =============================================================================
// Validity
// =============================================================================

/// Decides whether a token is usable right now.
///
/// The default applies no clock-skew tolerance: a token is valid while
/// `exp > now`, strictly. `leeway_secs` is a deployment parameter for
/// installations whose issuer clock is known to drift.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TokenValidator {
    leeway_secs: u64,
}

impl TokenValidator {
    /// Creates a validator with no leeway.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the clock-skew leeway, in seconds.
    pub fn with_leeway(mut self, leeway_secs: u64) -> Self {
        self.leeway_secs = leeway_secs;
        self
    }

    /// Returns the configured leeway.
    pub fn leeway_secs(&self) -> u64 {
        self.leeway_secs
    }

    /// Checks a token against the current wall clock.
    pub fn check(&self, token: Option<&str>) -> Result<Claims, ValidationFailure> {
        self.check_at(token, Utc::now())
    }

    /// Checks a token against the given instant, returning its claims when usable.
    pub fn check_at(
        &self,
        token: Option<&str>,
        now: DateTime<Utc>,
    ) -> Result<Claims, ValidationFailure> {
        let token = token.ok_or(ValidationFailure::Absent)?;
        let claims = decode(token)?;
        self.check_claims_at(&claims, now)?;
        Ok(claims)
    }

    /// Checks already-decoded claims against the given instant.
    pub fn check_claims_at(
        &self,
        claims: &Claims,
        now: DateTime<Utc>,
    ) -> Result<(), ValidationFailure> {
        let exp = claims.exp().ok_or(ValidationFailure::MissingExpiry)?;
        let now_secs = epoch_secs(now);

        if exp + self.leeway_secs as f64 > now_secs {
            Ok(())
        } else {
            Err(ValidationFailure::Expired {
                exp: exp.floor() as i64,
                now: now.timestamp(),
            })
        }
    }

    /// Returns `true` if the token is usable now.
    pub fn is_valid(&self, token: Option<&str>) -> bool {
        self.check(token).is_ok()
    }

    /// Returns `true` if the token is usable at `now`.
    pub fn is_valid_at(&self, token: Option<&str>, now: DateTime<Utc>) -> bool {
        self.check_at(token, now).is_ok()
    }

    /// Whole seconds until the token stops being valid, or `None` if it
    /// already is not.
    pub fn seconds_remaining(&self, token: Option<&str>, now: DateTime<Utc>) -> Option<i64> {
        let claims = self.check_at(token, now).ok()?;
        let exp = claims.exp()? + self.leeway_secs as f64;
        Some((exp - epoch_secs(now)).floor().max(0.0) as i64)
    }
}

/// Returns `true` if the token is usable now, with no clock-skew leeway.
pub fn is_valid(token: Option<&str>) -> bool {
    TokenValidator::new().is_valid(token)
}

/// Returns `true` if the token is usable at `now`, with no clock-skew leeway.
pub fn is_valid_at(token: Option<&str>, now: DateTime<Utc>) -> bool {
    TokenValidator::new().is_valid_at(token, now)
}

fn epoch_secs(now: DateTime<Utc>) -> f64 {
    now.timestamp_millis() as f64 / 1000.0
}

// =============================================================================
// Tests
// =============================================================================
