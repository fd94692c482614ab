// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Keystone Legal Technologies, Inc.

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! Recursive filesystem watcher for the two synchronization roots
//! (spec §4.3).

mod enroll;
mod queue;

use std::path::PathBuf;
use std::sync::Arc;

use isync_core::{is_skipped_file_name, FileEvent, FileOperation};
use notify::event::{CreateKind, ModifyKind, RemoveKind, RenameMode};
use notify::{EventKind, RecommendedWatcher};
use parking_lot::Mutex;
use thiserror::Error;
use tracing::{debug, warn};

pub use queue::EventQueue;

/// Minimum channel capacity required by spec §4.3.
pub const MIN_QUEUE_CAPACITY: usize = 100;

#[derive(Debug, Error)]
pub enum WatchError {
    #[error("failed to construct filesystem watcher: {0}")]
    Construction(#[from] notify::Error),
}

/// A live watcher over one or more root directories. Dropping this value
/// releases the underlying OS watch handles (spec §4.3, `stop`).
pub struct Watcher {
    inner: Arc<Mutex<Option<RecommendedWatcher>>>,
    events: Arc<EventQueue>,
}

impl Watcher {
    /// Start watching `roots`, recursively enrolling every existing
    /// directory beneath each one. Returns the watcher and a handle to the
    /// queue that delivered events are pushed onto.
    pub fn start(roots: &[PathBuf]) -> Result<(Self, Arc<EventQueue>), WatchError> {
        Self::start_with_capacity(roots, MIN_QUEUE_CAPACITY)
    }

    pub fn start_with_capacity(
        roots: &[PathBuf],
        capacity: usize,
    ) -> Result<(Self, Arc<EventQueue>), WatchError> {
        let events = Arc::new(EventQueue::new(capacity.max(MIN_QUEUE_CAPACITY)));

        // The watcher handle is shared with the event callback itself so
        // that a newly created directory can be enrolled (spec §4.3:
        // "the Watcher MUST register it, recursively, before returning
        // from event handling") without a second construction step.
        let inner: Arc<Mutex<Option<RecommendedWatcher>>> = Arc::new(Mutex::new(None));
        let inner_for_handler = Arc::clone(&inner);
        let events_for_handler = Arc::clone(&events);

        let watcher = notify::recommended_watcher(move |res: notify::Result<notify::Event>| {
            match res {
                Ok(event) => handle_event(&inner_for_handler, &events_for_handler, event),
                Err(e) => warn!(error = %e, "filesystem watcher reported an error"),
            }
        })?;
        *inner.lock() = Some(watcher);

        for root in roots {
            if let Some(watcher) = inner.lock().as_mut() {
                enroll::enroll_tree(watcher, root);
            }
        }

        Ok((Self { inner, events: Arc::clone(&events) }, events))
    }

    /// Release OS watch handles and close the event channel.
    pub fn stop(self) {
        self.events.close();
        self.inner.lock().take();
    }
}

fn handle_event(
    watcher: &Arc<Mutex<Option<RecommendedWatcher>>>,
    queue: &Arc<EventQueue>,
    event: notify::Event,
) {
    let operation = match classify(&event.kind) {
        Some(op) => op,
        None => return,
    };

    for path in event.paths {
        let Some(name) = path.file_name() else {
            continue;
        };
        if is_skipped_file_name(&name.to_string_lossy()) {
            debug!(path = %path.display(), "skipping event for filtered path");
            continue;
        }

        let is_dir = match event.kind {
            EventKind::Create(CreateKind::Folder) | EventKind::Remove(RemoveKind::Folder) => true,
            EventKind::Create(CreateKind::File) | EventKind::Remove(RemoveKind::File) => false,
            _ => path.is_dir(),
        };

        if is_dir
            && matches!(event.kind, EventKind::Create(_))
            && enroll::should_enroll(&path)
        {
            if let Some(w) = watcher.lock().as_mut() {
                enroll::enroll_tree(w, &path);
            }
        }

        queue.push(FileEvent::new(path, operation, is_dir));
    }
}

fn classify(kind: &EventKind) -> Option<FileOperation> {
    match kind {
        EventKind::Create(_) => Some(FileOperation::Create),
        EventKind::Modify(ModifyKind::Data(_)) => Some(FileOperation::Write),
        EventKind::Modify(ModifyKind::Metadata(_)) => Some(FileOperation::Chmod),
        EventKind::Modify(ModifyKind::Name(RenameMode::Any))
        | EventKind::Modify(ModifyKind::Name(RenameMode::Both))
        | EventKind::Modify(ModifyKind::Name(RenameMode::From))
        | EventKind::Modify(ModifyKind::Name(RenameMode::To)) => Some(FileOperation::Rename),
        EventKind::Remove(_) => Some(FileOperation::Remove),
        _ => None,
    }
}
