// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Keystone Legal Technologies, Inc.

//! CLI contract tests (spec §4.5, §6): `--version`/`--help` exit 0,
//! unrecognized arguments exit non-zero with usage on stderr.

use crate::prelude::*;

#[test]
fn version_flag_exits_zero() {
    let result = run_cli(&["--version"]);
    assert!(result.success);
    assert!(result.stdout.contains("isync-adapterd"));
}

#[test]
fn help_flag_exits_zero_and_prints_usage() {
    let result = run_cli(&["--help"]);
    assert!(result.success);
    assert!(result.stdout.contains("USAGE"));
}

#[test]
fn unrecognized_argument_exits_nonzero_with_usage_on_stderr() {
    let result = run_cli(&["--bogus"]);
    assert!(!result.success);
    assert!(result.stderr.contains("USAGE"));
}
