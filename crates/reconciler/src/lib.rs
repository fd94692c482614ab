// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Keystone Legal Technologies, Inc.

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! Full-sweep and event-driven reconciliation between the cloud and local
//! roots (spec §4.4).

mod decide;
mod sweep;

use std::fs;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::SystemTime;

use isync_core::{FileEvent, FileOperation, SyncDirection, SyncStats};
use thiserror::Error;
use tracing::{debug, warn};

#[derive(Debug, Error)]
pub enum ReconcileError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// The two synchronization roots the Reconciler keeps converged: the
/// bidirectional cloud/local "cases" pair, and the unidirectional local
/// outputs → cloud outputs pair (spec §4.4, "Two-root scheme").
pub struct Reconciler {
    cloud_root: PathBuf,
    local_root: PathBuf,
    output_path: PathBuf,
    cloud_outputs_path: PathBuf,
    stats: Arc<SyncStats>,
    sweeping: AtomicBool,
}

impl Reconciler {
    pub fn new(
        cloud_root: PathBuf,
        local_root: PathBuf,
        output_path: PathBuf,
        cloud_outputs_path: PathBuf,
        stats: Arc<SyncStats>,
    ) -> Self {
        Self {
            cloud_root,
            local_root,
            output_path,
            cloud_outputs_path,
            stats,
            sweeping: AtomicBool::new(false),
        }
    }

    pub fn stats(&self) -> &Arc<SyncStats> {
        &self.stats
    }

    /// True while a full sweep is in progress (spec §4.4, "loop
    /// avoidance" / §5 `isSweeping`).
    pub fn is_sweeping(&self) -> bool {
        self.sweeping.load(Ordering::SeqCst)
    }

    /// Walk both roots once, converging cloud→local and local-outputs→
    /// cloud-outputs. Never returns an error: individual failures are
    /// logged and counted, and a sweep that cannot proceed at all (e.g.
    /// the cloud mount is absent) is itself just a no-op pass, matching
    /// the Supervisor's "failure is logged but not fatal" contract.
    pub fn full_sweep(&self) {
        self.sweeping.store(true, Ordering::SeqCst);
        self.run_sweep();
        self.sweeping.store(false, Ordering::SeqCst);
        self.stats.mark_sweep_completed();
    }

    fn run_sweep(&self) {
        if self.cloud_root.exists() {
            sweep::sync_tree(
                &self.cloud_root,
                &self.local_root,
                SyncDirection::CloudToLocal,
                &self.stats,
            );
        } else {
            warn!(
                path = %self.cloud_root.display(),
                "cloud root unavailable, skipping cloud-to-local pass this sweep"
            );
        }

        if self.output_path.exists() {
            if let Err(e) = fs::create_dir_all(&self.cloud_outputs_path) {
                warn!(
                    path = %self.cloud_outputs_path.display(),
                    error = %e,
                    "failed to create cloud outputs directory, skipping outputs pass"
                );
                self.stats.record_error();
                return;
            }
            sweep::sync_tree(
                &self.output_path,
                &self.cloud_outputs_path,
                SyncDirection::LocalToCloud,
                &self.stats,
            );
        }
    }

    /// Reconcile a single filesystem event (spec §4.4, "Event-driven
    /// path"). A no-op while a full sweep is in progress — the sweep is
    /// authoritative and will re-resolve anything missed here at the next
    /// sweep or event (§4.4 "Loop avoidance").
    pub fn handle_event(&self, event: &FileEvent) {
        if self.is_sweeping() {
            debug!(path = %event.path.display(), "sweep in progress, deferring event");
            return;
        }

        if let Ok(rel) = event.path.strip_prefix(&self.cloud_root) {
            let dest = self.local_root.join(rel);
            self.handle_bidirectional_event(event, &dest, SyncDirection::CloudToLocal, true);
        } else if let Ok(rel) = event.path.strip_prefix(&self.output_path) {
            let dest = self.cloud_outputs_path.join(rel);
            self.handle_bidirectional_event(event, &dest, SyncDirection::LocalToCloud, false);
        }
    }

    fn handle_bidirectional_event(
        &self,
        event: &FileEvent,
        dest: &std::path::Path,
        direction: SyncDirection,
        deletions_propagate: bool,
    ) {
        match event.operation {
            FileOperation::Remove => {
                if deletions_propagate {
                    self.remove_if_stale(dest, event.timestamp, event.is_dir);
                }
                // The upload-only outputs path never deletes (spec §4.4).
            }
            FileOperation::Create if event.is_dir => {
                if let Err(e) = fs::create_dir_all(dest) {
                    warn!(path = %dest.display(), error = %e, "failed to ensure mirrored directory");
                    self.stats.record_error();
                } else {
                    self.stats.record_directory_synced();
                }
            }
            FileOperation::Create | FileOperation::Write | FileOperation::Chmod | FileOperation::Rename => {
                if event.is_dir {
                    return;
                }
                self.reconcile_single_file(&event.path, dest, direction);
            }
        }
    }

    fn reconcile_single_file(&self, source: &std::path::Path, dest: &std::path::Path, direction: SyncDirection) {
        let source_meta = match fs::symlink_metadata(source) {
            Ok(m) => m,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return,
            Err(e) => {
                warn!(path = %source.display(), error = %e, "failed to stat event source path");
                self.stats.record_error();
                return;
            }
        };
        if source_meta.file_type().is_symlink() {
            debug!(path = %source.display(), "skipping symlink event");
            return;
        }

        match sweep::reconcile_file(source, dest, direction, &source_meta) {
            Ok(true) => self.stats.record_file_synced(),
            Ok(false) => {}
            Err(e) => {
                warn!(path = %source.display(), error = %e, "failed to reconcile event-driven change");
                self.stats.record_error();
            }
        }
    }

    /// The conservative deletion rule (spec §4.4, §9): remove the mirror
    /// only if it is older than the deletion's observed timestamp. When in
    /// doubt (mirror absent, or newer than the deletion), do nothing.
    fn remove_if_stale(&self, dest: &std::path::Path, event_timestamp: SystemTime, is_dir: bool) {
        let meta = match fs::symlink_metadata(dest) {
            Ok(m) => m,
            Err(_) => return,
        };
        let mtime = match meta.modified() {
            Ok(m) => m,
            Err(_) => return,
        };
        if mtime >= event_timestamp {
            debug!(path = %dest.display(), "mirror is not older than the deletion, leaving in place");
            return;
        }

        let result = if is_dir {
            fs::remove_dir_all(dest)
        } else {
            fs::remove_file(dest)
        };
        if let Err(e) = result {
            warn!(path = %dest.display(), error = %e, "failed to propagate deletion");
            self.stats.record_error();
        }
    }
}
