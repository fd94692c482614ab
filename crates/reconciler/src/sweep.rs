// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Keystone Legal Technologies, Inc.

//! Tree-walking and streaming copy for the full-sweep algorithm (spec
//! §4.4). Individual-file failures are caught here and never escape: a
//! bad stat or a permission error increments `errors` and moves on to the
//! next entry, exactly as the per-file decision algorithm requires.

use std::fs::{self, File};
use std::io::{self, BufReader, BufWriter};
use std::path::Path;

use filetime::FileTime;
use isync_core::{is_skipped_dir_name, is_skipped_file_name, SyncDirection, SyncStats};
use tracing::{debug, warn};

use crate::decide::decide;
use crate::ReconcileError;

/// Walk `src_dir`, mirroring non-skipped files and directories into
/// `dst_dir` in the given `direction`. The top-level call treats `src_dir`
/// itself as the root (never skip-listed, matching the Watcher's own
/// root exemption); descendants are filtered normally.
pub fn sync_tree(src_dir: &Path, dst_dir: &Path, direction: SyncDirection, stats: &SyncStats) {
    walk(src_dir, dst_dir, direction, stats);
}

fn walk(src_dir: &Path, dst_dir: &Path, direction: SyncDirection, stats: &SyncStats) {
    if !dst_dir.exists() {
        if let Err(e) = fs::create_dir_all(dst_dir) {
            warn!(path = %dst_dir.display(), error = %e, "failed to create mirrored directory");
            stats.record_error();
            return;
        }
        stats.record_directory_synced();
    }

    let entries = match fs::read_dir(src_dir) {
        Ok(entries) => entries,
        Err(e) => {
            warn!(path = %src_dir.display(), error = %e, "failed to list directory during sweep");
            stats.record_error();
            return;
        }
    };

    for entry in entries {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                warn!(path = %src_dir.display(), error = %e, "failed to read directory entry during sweep");
                stats.record_error();
                continue;
            }
        };
        let name = entry.file_name();
        let name = name.to_string_lossy();
        let path = entry.path();

        let symlink_meta = match fs::symlink_metadata(&path) {
            Ok(m) => m,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "failed to stat directory entry during sweep");
                stats.record_error();
                continue;
            }
        };

        if symlink_meta.file_type().is_symlink() {
            debug!(path = %path.display(), "skipping symlink during sweep");
            continue;
        }

        if symlink_meta.is_dir() {
            if is_skipped_dir_name(&name, false) {
                debug!(path = %path.display(), "skipping well-known transient directory");
                continue;
            }
            let child_dst = dst_dir.join(entry.file_name());
            walk(&path, &child_dst, direction, stats);
        } else if symlink_meta.is_file() {
            if is_skipped_file_name(&name) {
                debug!(path = %path.display(), "skipping filtered file");
                continue;
            }
            let dest = dst_dir.join(entry.file_name());
            match reconcile_file(&path, &dest, direction, &symlink_meta) {
                Ok(true) => stats.record_file_synced(),
                Ok(false) => {}
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "failed to reconcile file");
                    stats.record_error();
                }
            }
        }
    }
}

/// Apply the per-file decision algorithm to a single (source, dest) pair,
/// copying if warranted. Returns whether a copy was actually performed, so
/// callers can distinguish "converged, nothing to do" from "synced".
/// `source_meta` is supplied by the caller (already stat'd while walking)
/// to avoid a redundant syscall.
pub fn reconcile_file(
    source: &Path,
    dest: &Path,
    direction: SyncDirection,
    source_meta: &fs::Metadata,
) -> Result<bool, ReconcileError> {
    let dest_meta = match fs::metadata(dest) {
        Ok(m) => Some(m),
        Err(e) if e.kind() == io::ErrorKind::NotFound => None,
        Err(e) => return Err(e.into()),
    };

    let decision = decide(direction, source_meta, dest_meta.as_ref())?;
    if !decision.should_copy() {
        return Ok(false);
    }

    copy_file(source, dest, source_meta)?;
    Ok(true)
}

/// Stream `source`'s contents to `dest` (creating parent directories as
/// needed) and replicate `source`'s mtime afterward.
pub fn copy_file(source: &Path, dest: &Path, source_meta: &fs::Metadata) -> Result<(), ReconcileError> {
    if let Some(parent) = dest.parent() {
        fs::create_dir_all(parent)?;
    }

    {
        let mut reader = BufReader::new(File::open(source)?);
        let mut writer = BufWriter::new(File::create(dest)?);
        io::copy(&mut reader, &mut writer)?;
        io::Write::flush(&mut writer)?;
    }

    let mtime = FileTime::from_system_time(source_meta.modified()?);
    filetime::set_file_mtime(dest, mtime)?;
    Ok(())
}
