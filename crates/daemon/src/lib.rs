// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Keystone Legal Technologies, Inc.

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! Process composition for the iSync Adapter daemon: CLI parsing and the
//! `Supervisor` that wires configuration, logging, the filesystem watcher,
//! and the reconciler together (spec §4.5).

mod cli;
mod supervisor;

pub use cli::{config_env_override, parse, Action, CliError, DEFAULT_CONFIG_FILE_NAME, USAGE};
pub use supervisor::{Supervisor, SupervisorError};
