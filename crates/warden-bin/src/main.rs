// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! warden - session and access-control tooling for the operator dashboard.

use warden_bin::cli::Cli;
use warden_bin::commands;
use warden_bin::error::report_error_and_exit;

fn main() {
    let cli = Cli::parse_args();

    if let Err(e) = commands::execute(cli) {
        report_error_and_exit(e);
    }
}
