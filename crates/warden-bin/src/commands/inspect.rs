// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Implementation of the `inspect` command.

use chrono::Utc;
use warden_config::WardenConfig;
use warden_core::{decode, ValidationFailure};

use crate::cli::{InspectArgs, OutputFormat};
use crate::commands::{print_json, resolve_token};
use crate::error::{BinError, BinResult};

/// Executes the `inspect` command.
///
/// Decodes the token without verifying its signature and reports claims,
/// validity, remaining lifetime and resolved roles. Fails when there is no
/// token or it does not decode.
pub fn inspect(config: &WardenConfig, args: InspectArgs) -> BinResult<()> {
    let token = resolve_token(&args.token, config)?
        .ok_or_else(|| BinError::token("no token given and none stored"))?;

    let claims = decode(&token).map_err(|e| BinError::token(format!("malformed token: {}", e)))?;

    let now = Utc::now();
    let validator = config.token_validator();
    let validity = match validator.check_claims_at(&claims, now) {
        Ok(()) => "valid".to_string(),
        Err(ValidationFailure::Expired { .. }) => "expired".to_string(),
        Err(e) => e.to_string(),
    };
    let remaining = validator.seconds_remaining(Some(&token), now);
    let roles = config.role_resolver().resolve(&claims);

    match args.format {
        OutputFormat::Text => {
            println!("Token:");
            println!("  Subject:    {}", claims.subject().unwrap_or("(none)"));
            println!("  Issuer:     {}", claims.issuer().unwrap_or("(none)"));
            println!(
                "  Issued at:  {}",
                claims.issued_at().map(|t| t.to_rfc3339()).unwrap_or_else(|| "(none)".into())
            );
            println!(
                "  Expires at: {}",
                claims.expires_at().map(|t| t.to_rfc3339()).unwrap_or_else(|| "(none)".into())
            );
            println!("  Validity:   {}", validity);
            if let Some(secs) = remaining {
                println!("  Remaining:  {}s", secs);
            }
            println!("  Roles:      {}", roles);
            println!();
            println!("Claims:");
            for (key, value) in claims.iter() {
                println!("  {}: {}", key, value);
            }
        }
        OutputFormat::Json => {
            let output = serde_json::json!({
                "valid": remaining.is_some(),
                "validity": validity,
                "seconds_remaining": remaining,
                "expires_at": claims.expires_at().map(|t| t.to_rfc3339()),
                "roles": roles,
                "claims": claims,
            });
            print_json(&output)?;
        }
    }

    Ok(())
}
