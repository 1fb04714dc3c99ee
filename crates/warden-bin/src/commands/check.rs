// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Implementation of the `check` command.

use warden_config::WardenConfig;

use crate::cli::{CheckArgs, OutputFormat};
use crate::commands::{print_json, resolve_token, session_for};
use crate::error::{BinError, BinResult};

/// Executes the `check` command.
///
/// Prints the guard decision for the path and fails with an access error
/// unless the decision is `allow`.
pub fn check(config: &WardenConfig, args: CheckArgs) -> BinResult<()> {
    let token = resolve_token(&args.token, config)?;
    let session = session_for(token, config);

    let policy = config.access_policy();
    let guard = config.route_guard();
    let decision = guard
        .navigate(&policy, &args.path, &session)
        .ok_or_else(|| BinError::RouteNotFound(args.path.clone()))?;

    tracing::debug!(path = %args.path, decision = %decision, "Guard evaluated");

    match args.format {
        OutputFormat::Text => {
            println!("{} -> {} ({})", args.path, decision, decision.status_code());
        }
        OutputFormat::Json => {
            let output = serde_json::json!({
                "path": args.path,
                "status": decision.status_code(),
                "result": decision,
                "roles": session.roles,
            });
            print_json(&output)?;
        }
    }

    if decision.is_allowed() {
        Ok(())
    } else {
        Err(BinError::Access(format!("{} for {}", decision, args.path)))
    }
}
