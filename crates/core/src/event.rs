// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Keystone Legal Technologies, Inc.

//! Filesystem change events produced by the watcher and consumed by the
//! reconciler. Ephemeral: never persisted, never replayed.

use std::path::PathBuf;
use std::time::SystemTime;

/// The kind of change a single filesystem event represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FileOperation {
    Create,
    Write,
    Chmod,
    Remove,
    Rename,
}

/// A single observed filesystem change under one of the two watched roots.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileEvent {
    pub path: PathBuf,
    pub operation: FileOperation,
    pub is_dir: bool,
    pub timestamp: SystemTime,
}

impl FileEvent {
    pub fn new(path: PathBuf, operation: FileOperation, is_dir: bool) -> Self {
        Self {
            path,
            operation,
            is_dir,
            timestamp: SystemTime::now(),
        }
    }
}
