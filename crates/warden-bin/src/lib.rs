// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! # warden-bin
//!
//! Command-line tooling around the warden session and access-control core.
//!
//! - CLI argument parsing with clap
//! - Logging initialization
//! - Command implementations (validate, inspect, routes, check, version)
//!
//! ## Usage
//!
//! ```bash
//! # Validate configuration (default command)
//! warden -c warden.yaml
//!
//! # Decode a token and show its roles
//! warden inspect --token "$TOKEN"
//!
//! # Which sidebar entries does the stored session see?
//! warden -c warden.yaml routes
//!
//! # Would navigation to a page be allowed?
//! WARDEN_TOKEN="$TOKEN" warden check /dashboard/energy
//!
//! # Show version
//! warden version
//! ```

#![warn(missing_docs)]
#![deny(unsafe_code)]

pub mod cli;
pub mod commands;
pub mod error;
pub mod logging;

pub use cli::{Cli, Commands, LogFormat, OutputFormat};
pub use error::{BinError, BinResult};
