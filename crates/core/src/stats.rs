// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Keystone Legal Technologies, Inc.

//! Process-wide, monotonically-updated sync counters.
//!
//! Counters are lock-free atomics so the status reporter can snapshot them
//! without contending with the sweep/event-handling task that is the sole
//! writer at any instant (single-writer discipline, spec §5). The two
//! timestamps are not individually representable as atomics, but the same
//! single-writer discipline means the `Mutex` here is never contended.

use parking_lot::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::SystemTime;

#[derive(Debug, Default)]
pub struct SyncStats {
    pub files_synced: AtomicU64,
    pub directories_synced: AtomicU64,
    pub errors: AtomicU64,
    start_time: Mutex<Option<SystemTime>>,
    last_sweep_completed: Mutex<Option<SystemTime>>,
}

impl SyncStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mark_started(&self) {
        *self.start_time.lock() = Some(SystemTime::now());
    }

    pub fn mark_sweep_completed(&self) {
        *self.last_sweep_completed.lock() = Some(SystemTime::now());
    }

    pub fn start_time(&self) -> Option<SystemTime> {
        *self.start_time.lock()
    }

    pub fn last_sweep_completed(&self) -> Option<SystemTime> {
        *self.last_sweep_completed.lock()
    }

    pub fn record_file_synced(&self) {
        self.files_synced.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_directory_synced(&self) {
        self.directories_synced.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_error(&self) {
        self.errors.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> SyncStatsSnapshot {
        SyncStatsSnapshot {
            files_synced: self.files_synced.load(Ordering::Relaxed),
            directories_synced: self.directories_synced.load(Ordering::Relaxed),
            errors: self.errors.load(Ordering::Relaxed),
            start_time: self.start_time(),
            last_sweep_completed: self.last_sweep_completed(),
        }
    }
}

/// A torn-free-enough point-in-time read of [`SyncStats`] for logging.
#[derive(Debug, Clone, Copy)]
pub struct SyncStatsSnapshot {
    pub files_synced: u64,
    pub directories_synced: u64,
    pub errors: u64,
    pub start_time: Option<SystemTime>,
    pub last_sweep_completed: Option<SystemTime>,
}
