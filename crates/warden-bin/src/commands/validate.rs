// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Implementation of the `validate` command.

use warden_config::WardenConfig;

use crate::cli::{Cli, OutputFormat, ValidateArgs};
use crate::commands::print_json;
use crate::error::{BinError, BinResult};

/// Executes the `validate` command.
///
/// The configuration was already loaded and validated by the caller; this
/// reports the summary and any warnings.
pub fn validate(cli: &Cli, config: &WardenConfig, args: ValidateArgs) -> BinResult<()> {
    let source = cli
        .config
        .as_ref()
        .map(|p| p.display().to_string())
        .unwrap_or_else(|| "(built-in defaults)".to_string());

    let mut warnings = config.warnings();

    if let Some(parent) = config.session.token_path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            warnings.push(format!(
                "Token store directory does not exist yet: {}",
                parent.display()
            ));
        }
    }

    if config.access.default_role.is_none() {
        warnings.push("No default role: anonymous sessions see only public routes".to_string());
    }

    match args.format {
        OutputFormat::Text => {
            println!("✓ Configuration is valid: {}", source);
            println!();
            println!("Summary:");
            println!("  Roles:         {}", list_or_none(&config.access.available_roles));
            println!(
                "  Default role:  {}",
                config.access.default_role.as_deref().unwrap_or("(none)")
            );
            println!("  Claim path:    {}", config.access.roles_claim_path);
            println!("  Route groups:  {}", config.catalog.groups().len());
            println!("  Pages:         {}", config.catalog.page_count());
            println!("  Elements:      {}", config.elements.len());
            println!("  Token store:   {}", config.session.token_path.display());
            println!("  Leeway:        {}s", config.session.leeway_secs);
            println!("  Sign-in path:  {}", config.navigation.sign_in_path);

            if !warnings.is_empty() {
                println!();
                println!("Warnings:");
                for warning in &warnings {
                    println!("  ⚠ {}", warning);
                }
            }

            if args.show_config {
                println!();
                println!("Parsed configuration:");
                println!("{}", serde_json::to_string_pretty(config)?);
            }
        }
        OutputFormat::Json => {
            let output = serde_json::json!({
                "valid": true,
                "config_path": source,
                "summary": {
                    "available_roles": config.access.available_roles,
                    "default_role": config.access.default_role,
                    "roles_claim_path": config.access.roles_claim_path,
                    "route_groups": config.catalog.groups().len(),
                    "pages": config.catalog.page_count(),
                    "elements": config.elements.len(),
                    "token_path": config.session.token_path.display().to_string(),
                    "leeway_secs": config.session.leeway_secs,
                },
                "warnings": warnings,
                "config": if args.show_config { Some(config) } else { None },
            });
            print_json(&output)?;
        }
    }

    if args.strict && !warnings.is_empty() {
        return Err(BinError::Configuration(format!(
            "Strict mode: {} warning(s) found",
            warnings.len()
        )));
    }

    Ok(())
}

fn list_or_none(items: &[String]) -> String {
    if items.is_empty() {
        "(any)".to_string()
    } else {
        items.join(", ")
    }
}
