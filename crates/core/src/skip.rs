// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Keystone Legal Technologies, Inc.

//! The skip-set: path patterns the watcher must never enroll and the
//! reconciler must never mirror (spec §4.3, §4.4). Kept as a single
//! source of truth so both components agree (invariant 4, spec §8).

/// Directory basenames that are never recursed into or enrolled, even when
/// they appear inside a watched root. The hidden-directory check (leading
/// `.`) is handled separately by [`is_hidden_dir_name`] so callers can
/// exempt the watched roots themselves from that rule.
const TRANSIENT_DIR_NAMES: &[&str] = &[
    ".git",
    ".svn",
    ".hg",
    "node_modules",
    "__pycache__",
    ".venv",
    "venv",
    "target",
    ".Trash",
    ".Trashes",
    ".Spotlight-V100",
];

/// Exact file basenames that are always suppressed.
const SKIPPED_FILE_NAMES: &[&str] = &[".DS_Store", "Thumbs.db", "desktop.ini"];

/// Suffixes that mark an editor swap/lock/temp file.
const SKIPPED_FILE_SUFFIXES: &[&str] =
    &[".tmp", ".temp", ".swp", ".swo", "~", ".lock", ".pid"];

/// Prefix that marks a macOS resource fork (AppleDouble) file.
const RESOURCE_FORK_PREFIX: &str = "._";

/// True if `name` is a hidden directory (starts with `.`). Callers are
/// responsible for exempting the watched roots themselves, since the
/// distilled spec only excludes hidden directories *other than the roots*.
pub fn is_hidden_dir_name(name: &str) -> bool {
    name.starts_with('.')
}

/// True if `name` is one of the well-known transient directories that must
/// never be enrolled or mirrored, regardless of where it appears.
pub fn is_transient_dir_name(name: &str) -> bool {
    TRANSIENT_DIR_NAMES.contains(&name)
}

/// True if a directory with this basename must be skipped by the watcher
/// and reconciler. `is_root` exempts the watched roots from the
/// hidden-directory rule (they may themselves start with `.`, e.g. a
/// dotfile-style cloud mount subdirectory).
pub fn is_skipped_dir_name(name: &str, is_root: bool) -> bool {
    is_transient_dir_name(name) || (!is_root && is_hidden_dir_name(name))
}

/// True if a file with this basename must never be mirrored or surfaced as
/// an event (OS metadata, editor transients, macOS resource forks).
pub fn is_skipped_file_name(name: &str) -> bool {
    SKIPPED_FILE_NAMES.contains(&name)
        || name.starts_with(RESOURCE_FORK_PREFIX)
        || SKIPPED_FILE_SUFFIXES
            .iter()
            .any(|suffix| name.ends_with(suffix))
}
