// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Keystone Legal Technologies, Inc.

//! Argument parsing for the `isync-adapterd` binary (spec §4.5, CLI contract).
//!
//! Hand-rolled `match` over `env::args()`, the same style this codebase's
//! other single-purpose daemon binary uses for its own `--version`/`--help`
//! handling — no `clap` here, since this binary has exactly one real flag.

use std::path::PathBuf;

use thiserror::Error;

pub const DEFAULT_CONFIG_FILE_NAME: &str = "config.json";
const CONFIG_OVERRIDE_ENV_VAR: &str = "ADAPTER_CONFIG";

#[derive(Debug, Error)]
pub enum CliError {
    #[error("unexpected argument '{0}'")]
    UnexpectedArgument(String),

    #[error("--config requires a path argument")]
    MissingConfigValue,
}

/// What the binary should do, decided from argv before anything else is
/// constructed (spec §4.5: "Any other arguments: error, print usage to
/// stderr, exit non-zero").
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    Run { config_path: PathBuf },
    PrintVersion,
    PrintHelp,
}

/// Parse CLI arguments (excluding argv[0]), applying the `ADAPTER_CONFIG`
/// environment variable override. Per spec §6, "`ADAPTER_CONFIG` overrides
/// `--config`": the environment variable wins when both are present.
pub fn parse<I, S>(args: I, config_env_override: Option<String>) -> Result<Action, CliError>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    let args: Vec<String> = args.into_iter().map(Into::into).collect();
    let mut flag_config_path: Option<PathBuf> = None;

    let mut iter = args.into_iter();
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--version" | "-V" => return Ok(Action::PrintVersion),
            "--help" | "-h" => return Ok(Action::PrintHelp),
            "--config" => {
                let value = iter.next().ok_or(CliError::MissingConfigValue)?;
                flag_config_path = Some(PathBuf::from(value));
            }
            other => return Err(CliError::UnexpectedArgument(other.to_string())),
        }
    }

    let config_path = config_env_override
        .map(PathBuf::from)
        .or(flag_config_path)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE_NAME));

    Ok(Action::Run { config_path })
}

/// Resolve the `ADAPTER_CONFIG` environment variable, exactly as the real
/// binary would see it. Split out so tests can pass an explicit override
/// without mutating process-global environment state.
pub fn config_env_override() -> Option<String> {
    std::env::var(CONFIG_OVERRIDE_ENV_VAR).ok()
}

pub const USAGE: &str = "\
isync-adapterd - bidirectional cloud/local synchronization daemon

USAGE:
    isync-adapterd [--config <path>]
    isync-adapterd --version
    isync-adapterd --help

The daemon is normally started by the OS service manager (see the packaging
notes in DESIGN.md), not invoked directly.

OPTIONS:
    --config <path>  Path to the daemon's config.json (default: ./config.json).
                      Overridden by the ADAPTER_CONFIG environment variable.
    -h, --help       Print this help text and exit.
    -V, --version    Print the daemon's name and version and exit.
";

#[cfg(test)]
#[path = "cli_tests.rs"]
mod tests;
