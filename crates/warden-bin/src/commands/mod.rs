// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! CLI command implementations.
//!
//! - `validate`: Validate the configuration
//! - `inspect`: Decode a token
//! - `routes`: Visible sidebar and elements
//! - `check`: Navigation guard decision
//! - `version`: Show version information

mod check;
mod inspect;
mod routes;
mod validate;
mod version;

pub use check::check;
pub use inspect::inspect;
pub use routes::routes;
pub use validate::validate;
pub use version::version;

use warden_config::{ConfigLoader, WardenConfig};
use warden_core::Session;
use warden_session::TokenPersistence;

use crate::cli::{Cli, Commands, TokenArgs};
use crate::error::{BinError, BinResult};
use crate::logging::init_logging;

/// Executes the appropriate command based on CLI arguments.
pub fn execute(cli: Cli) -> BinResult<()> {
    let command = cli.effective_command();

    if let Commands::Version = command {
        init_logging(cli.effective_log_level("info"), cli.effective_log_format(Default::default()));
        return version::version(&cli);
    }

    let config = load_config(&cli)?;
    init_logging(
        cli.effective_log_level(config.logging.level.as_str()),
        cli.effective_log_format(config.logging.format),
    );

    match command {
        Commands::Validate(args) => validate::validate(&cli, &config, args),
        Commands::Inspect(args) => inspect::inspect(&config, args),
        Commands::Routes(args) => routes::routes(&config, args),
        Commands::Check(args) => check::check(&config, args),
        Commands::Version => version::version(&cli),
    }
}

/// Loads the configured file, or the defaults when no file was given.
pub fn load_config(cli: &Cli) -> BinResult<WardenConfig> {
    ConfigLoader::new()
        .load_or_default(cli.config.as_deref())
        .map_err(BinError::from)
}

/// Finds the token to evaluate.
///
/// `--token` and `WARDEN_TOKEN` arrive through `args`; failing those, the
/// token file named by the configuration is read.
pub fn resolve_token(args: &TokenArgs, config: &WardenConfig) -> BinResult<Option<String>> {
    if let Some(token) = args.token.as_deref().map(str::trim).filter(|t| !t.is_empty()) {
        tracing::debug!("Using token from the command line or environment");
        return Ok(Some(token.to_string()));
    }

    let store = config.token_store();
    let token = store.get_token()?;
    if token.is_some() {
        tracing::debug!(path = %store.path().display(), "Using token from token store");
    }
    Ok(token)
}

/// Builds the session the dashboard would hold for `token`.
pub fn session_for(token: Option<String>, config: &WardenConfig) -> Session {
    let resolver = config.role_resolver();
    let session = match token {
        Some(token) => Session::from_token(token, &resolver),
        None => Session::anonymous(&resolver),
    };
    session.with_validator(config.token_validator())
}

pub(crate) fn print_json(value: &serde_json::Value) -> BinResult<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

// =============================================================================
// Tests
// =============================================================================
