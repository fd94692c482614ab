// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Keystone Legal Technologies, Inc.

//! isync-adapterd
//!
//! Background process that keeps a cloud-mounted directory and a local
//! processing root converged, bidirectionally, while tolerating an
//! independent OS-level file synchronizer acting on the same cloud tree
//! (spec §4.5).

use std::path::PathBuf;

use isync_daemon::{config_env_override, parse, Action, Supervisor, USAGE};
use tracing::error;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = std::env::args().skip(1);
    let action = match parse(args, config_env_override()) {
        Ok(action) => action,
        Err(e) => {
            eprintln!("error: {e}");
            eprintln!("{USAGE}");
            std::process::exit(1);
        }
    };

    let config_path = match action {
        Action::PrintVersion => {
            println!("isync-adapterd {}", env!("CARGO_PKG_VERSION"));
            return Ok(());
        }
        Action::PrintHelp => {
            print!("{USAGE}");
            return Ok(());
        }
        Action::Run { config_path } => config_path,
    };

    run(config_path).await
}

async fn run(config_path: PathBuf) -> Result<(), Box<dyn std::error::Error>> {
    let supervisor = match Supervisor::startup(&config_path) {
        Ok(supervisor) => supervisor,
        Err(e) => {
            // `tracing` may not be initialized yet if startup failed before
            // reaching the logging step, so this is never the only record
            // of the failure (spec §8 S7: "a structured error log is
            // emitted").
            error!(error = %e, "failed to start isync-adapterd");
            eprintln!("error: failed to start isync-adapterd: {e}");
            std::process::exit(1);
        }
    };

    supervisor.run().await?;
    Ok(())
}
