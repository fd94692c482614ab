// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Keystone Legal Technologies, Inc.

//! Recursive directory enrollment (spec §4.3). Registration walks the tree
//! itself rather than relying on `notify`'s own recursive mode, so that
//! skip-listed directories (`.git`, `node_modules`, ...) are never
//! registered in the first place and their contents never generate churn.

use std::path::Path;

use isync_core::is_skipped_dir_name;
use notify::{RecommendedWatcher, RecursiveMode, Watcher as _};
use tracing::warn;

/// Walk `root` and register every directory (including `root` itself) with
/// `watcher`. The root itself is always enrolled even if its name would
/// otherwise be skip-listed (spec §4.3: "except the roots themselves");
/// only descendants are filtered.
pub fn enroll_tree(watcher: &mut RecommendedWatcher, root: &Path) {
    if let Err(e) = watcher.watch(root, RecursiveMode::NonRecursive) {
        warn!(path = %root.display(), error = %e, "failed to register watch for root directory");
    }
    enroll_children(watcher, root);
}

fn enroll_children(watcher: &mut RecommendedWatcher, dir: &Path) {
    let entries = match std::fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) => {
            warn!(path = %dir.display(), error = %e, "failed to list directory during enrollment");
            return;
        }
    };

    for entry in entries {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                warn!(path = %dir.display(), error = %e, "failed to read directory entry");
                continue;
            }
        };

        let file_type = match entry.file_type() {
            Ok(ft) => ft,
            Err(e) => {
                warn!(path = %entry.path().display(), error = %e, "failed to stat directory entry");
                continue;
            }
        };

        if !file_type.is_dir() {
            continue;
        }

        let name = entry.file_name();
        if is_skipped_dir_name(&name.to_string_lossy(), false) {
            continue;
        }

        let path = entry.path();
        if let Err(e) = watcher.watch(&path, RecursiveMode::NonRecursive) {
            warn!(path = %path.display(), error = %e, "failed to register watch for directory");
        }
        enroll_children(watcher, &path);
    }
}

/// True if a freshly created directory at `path` should be enrolled
/// (i.e. is not itself skip-listed). Used for dynamic enrollment on
/// `Create` events (spec §4.3).
pub fn should_enroll(path: &Path) -> bool {
    path.file_name()
        .map(|n| !is_skipped_dir_name(&n.to_string_lossy(), false))
        .unwrap_or(false)
}
