// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Keystone Legal Technologies, Inc.

//! S7: a config path that cannot be read as a configuration file fails
//! startup with a non-zero exit and a structured error log, rather than
//! crashing uncleanly (spec §8).
//!
//! The scenario's original framing is an unreadable-permissions config
//! file; this exercises the same `io-fatal` startup path (spec §7) with a
//! directory in place of the config file, which fails deterministically
//! even when the test suite runs as a user (e.g. root) that bypasses POSIX
//! permission bits.

use crate::prelude::*;
use std::fs;

#[test]
fn unreadable_config_path_fails_startup_with_nonzero_exit() {
    let mut project = Project::new();
    // Pre-create config.json as a directory so it exists (load() takes the
    // "read existing config" branch) but can never be read as a file.
    fs::create_dir_all(project.config_path()).unwrap();

    project.spawn_with_existing_config();
    let status = project
        .wait_for_exit(SPEC_WAIT_MAX_MS)
        .expect("daemon should fail fast rather than hang");

    assert!(!status.success(), "startup failure must exit non-zero");
}
