// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! CLI argument parsing and command definitions.
//!
//! - `validate`: Validate the configuration
//! - `inspect`: Decode a token and show its claims, validity and roles
//! - `routes`: Show the sidebar and elements visible to a token
//! - `check`: Run the navigation guard for a path
//! - `version`: Show version information

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

// =============================================================================
// Main CLI Structure
// =============================================================================

/// warden - session and access-control tooling for the operator dashboard
///
/// Inspects bearer tokens, resolves roles and evaluates route visibility
/// against a warden configuration.
#[derive(Parser, Debug)]
#[command(
    name = "warden",
    author = "Sylvex <contact@sylvex.io>",
    version = warden_core::VERSION,
    about = "Session and access-control tooling for the operator dashboard",
    long_about = None,
    propagate_version = true
)]
pub struct Cli {
    /// Configuration file path (built-in defaults when omitted)
    #[arg(short, long, env = "WARDEN_CONFIG", global = true)]
    pub config: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error); overrides the config file
    #[arg(short, long, env = "WARDEN_LOG_LEVEL", global = true)]
    pub log_level: Option<String>,

    /// Log format; overrides the config file
    #[arg(long, env = "WARDEN_LOG_FORMAT", global = true)]
    pub log_format: Option<LogFormat>,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Option<Commands>,
}

// =============================================================================
// Subcommands
// =============================================================================

/// Available subcommands for the warden CLI.
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Validate the configuration file
    ///
    /// This is the default command when no subcommand is specified.
    Validate(ValidateArgs),

    /// Decode a token and report its claims, validity and roles
    Inspect(InspectArgs),

    /// Show the sidebar routes and elements visible to a token
    Routes(RoutesArgs),

    /// Run the navigation guard for a layout-qualified path
    ///
    /// Exits non-zero when the guard redirects or denies.
    Check(CheckArgs),

    /// Show detailed version information
    Version,
}

// =============================================================================
// Command Arguments
// =============================================================================

/// Token source shared by commands that evaluate a session.
///
/// Precedence: `--token`, then `WARDEN_TOKEN`, then the configured token file.
#[derive(Args, Debug, Default, Clone)]
pub struct TokenArgs {
    /// Bearer token to evaluate
    #[arg(short, long, env = "WARDEN_TOKEN", hide_env_values = true)]
    pub token: Option<String>,
}

/// Arguments for the `validate` command.
#[derive(Args, Debug, Clone, Default)]
pub struct ValidateArgs {
    /// Show parsed configuration after validation
    #[arg(short, long)]
    pub show_config: bool,

    /// Output format for validation results
    #[arg(short, long, default_value = "text")]
    pub format: OutputFormat,

    /// Strict mode: treat warnings as errors
    #[arg(long)]
    pub strict: bool,
}

/// Arguments for the `inspect` command.
#[derive(Args, Debug, Clone, Default)]
pub struct InspectArgs {
    #[command(flatten)]
    #[allow(missing_docs)]
    pub token: TokenArgs,

    /// Output format
    #[arg(short, long, default_value = "text")]
    pub format: OutputFormat,
}

/// Arguments for the `routes` command.
#[derive(Args, Debug, Clone, Default)]
pub struct RoutesArgs {
    #[command(flatten)]
    #[allow(missing_docs)]
    pub token: TokenArgs,

    /// List every layout, not only the sidebar ones
    #[arg(long)]
    pub all: bool,

    /// Output format
    #[arg(short, long, default_value = "text")]
    pub format: OutputFormat,
}

/// Arguments for the `check` command.
#[derive(Args, Debug, Clone)]
pub struct CheckArgs {
    /// Layout-qualified path, e.g. /dashboard/energy
    pub path: String,

    #[command(flatten)]
    #[allow(missing_docs)]
    pub token: TokenArgs,

    /// Output format
    #[arg(short, long, default_value = "text")]
    pub format: OutputFormat,
}

// =============================================================================
// Enums
// =============================================================================

/// Log output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum LogFormat {
    /// Human-readable text format
    #[default]
    Text,
    /// JSON format for structured logging
    Json,
    /// Compact format for minimal output
    Compact,
}

impl From<warden_config::LogFormat> for LogFormat {
    fn from(format: warden_config::LogFormat) -> Self {
        match format {
            warden_config::LogFormat::Text => LogFormat::Text,
            warden_config::LogFormat::Json => LogFormat::Json,
            warden_config::LogFormat::Compact => LogFormat::Compact,
        }
    }
}

/// Output format for command results.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text format
    #[default]
    Text,
    /// JSON format for programmatic parsing
    Json,
}

// =============================================================================
// Helper Methods
// =============================================================================

impl Cli {
    /// Parse CLI arguments from the command line.
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Get the effective command, defaulting to `Validate` if none specified.
    pub fn effective_command(&self) -> Commands {
        self.command
            .clone()
            .unwrap_or_else(|| Commands::Validate(ValidateArgs::default()))
    }

    /// Log level from the flag, else from the configuration.
    pub fn effective_log_level<'a>(&'a self, configured: &'a str) -> &'a str {
        self.log_level.as_deref().unwrap_or(configured)
    }

    /// Log format from the flag, else from the configuration.
    pub fn effective_log_format(&self, configured: warden_config::LogFormat) -> LogFormat {
        self.log_format.unwrap_or_else(|| configured.into())
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_command() {
        let cli = Cli::parse_from(["warden"]);
        assert!(cli.command.is_none());
        assert!(matches!(cli.effective_command(), Commands::Validate(_)));
    }

    #[test]
    fn test_validate_command() {
        let cli = Cli::parse_from(["warden", "validate", "--strict", "-f", "json"]);
        if let Some(Commands::Validate(args)) = cli.command {
            assert!(args.strict);
            assert!(!args.show_config);
            assert_eq!(args.format, OutputFormat::Json);
        } else {
            panic!("Expected Validate command");
        }
    }

    #[test]
    fn test_config_path() {
        let cli = Cli::parse_from(["warden", "-c", "/etc/warden/warden.yaml", "version"]);
        assert_eq!(cli.config, Some(PathBuf::from("/etc/warden/warden.yaml")));
    }

    #[test]
    fn test_log_overrides() {
        let cli = Cli::parse_from(["warden", "--log-format", "json", "version"]);
        assert_eq!(cli.effective_log_format(warden_config::LogFormat::Text), LogFormat::Json);

        let cli = Cli::parse_from(["warden", "-l", "debug", "version"]);
        assert_eq!(cli.effective_log_level("warn"), "debug");
        assert_eq!(
            cli.effective_log_format(warden_config::LogFormat::Compact),
            LogFormat::Compact
        );
    }

    #[test]
    fn test_inspect_command() {
        let cli = Cli::parse_from(["warden", "inspect", "--token", "a.b.c"]);
        if let Some(Commands::Inspect(args)) = cli.command {
            assert_eq!(args.token.token.as_deref(), Some("a.b.c"));
            assert_eq!(args.format, OutputFormat::Text);
        } else {
            panic!("Expected Inspect command");
        }
    }

    #[test]
    fn test_check_command() {
        let cli = Cli::parse_from(["warden", "check", "/dashboard/energy", "-t", "x.y.z"]);
        if let Some(Commands::Check(args)) = cli.command {
            assert_eq!(args.path, "/dashboard/energy");
            assert_eq!(args.token.token.as_deref(), Some("x.y.z"));
        } else {
            panic!("Expected Check command");
        }
    }

    #[test]
    fn test_routes_all_flag() {
        let cli = Cli::parse_from(["warden", "routes", "--all"]);
        assert!(matches!(cli.command, Some(Commands::Routes(ref a)) if a.all));
    }
}
