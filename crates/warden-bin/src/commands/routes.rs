// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Implementation of the `routes` command.

use warden_config::WardenConfig;
use warden_core::{RequiredRoles, RoleSet, Session};

use crate::cli::{OutputFormat, RoutesArgs};
use crate::commands::{print_json, resolve_token, session_for};
use crate::error::BinResult;

/// Executes the `routes` command: the sidebar and dashboard elements a
/// session holding the token would see.
pub fn routes(config: &WardenConfig, args: RoutesArgs) -> BinResult<()> {
    let token = resolve_token(&args.token, config)?;
    let session = session_for(token, config);
    let roles = effective_roles(&session, config);

    let policy = config.access_policy();
    let catalog = if args.all {
        policy.visible_catalog(&roles)
    } else {
        policy.sidebar(&roles)
    };
    let elements = policy.visible_elements(&roles);

    match args.format {
        OutputFormat::Text => {
            println!(
                "Session: {}",
                if session.is_authenticated() { "authenticated" } else { "not authenticated" }
            );
            println!("Roles:   {}", roles);
            println!();
            for group in catalog.groups() {
                println!("[{}] {}", group.layout, group.title.as_deref().unwrap_or(""));
                if group.pages.is_empty() {
                    println!("  (no visible pages)");
                }
                for page in &group.pages {
                    println!(
                        "  {:<24} /{}{}  ({})",
                        page.name,
                        group.layout,
                        page.path,
                        describe(&page.required_roles)
                    );
                }
            }
            println!();
            println!("Elements: {}", if elements.is_empty() { "(none)".to_string() } else { elements.join(", ") });
        }
        OutputFormat::Json => {
            let output = serde_json::json!({
                "authenticated": session.is_authenticated(),
                "roles": roles,
                "groups": catalog.groups(),
                "elements": elements,
            });
            print_json(&output)?;
        }
    }

    Ok(())
}

/// Roles used for filtering: the session's roles while it is authenticated,
/// otherwise the anonymous fallback.
pub(crate) fn effective_roles(session: &Session, config: &WardenConfig) -> RoleSet {
    if session.is_authenticated() {
        session.roles.clone()
    } else {
        config.role_resolver().fallback()
    }
}

fn describe(required: &RequiredRoles) -> String {
    match required {
        RequiredRoles::Any => "any role".to_string(),
        RequiredRoles::Roles(roles) => roles.to_string(),
    }
}
