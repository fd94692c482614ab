// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Keystone Legal Technologies, Inc.

//! A bounded, drop-oldest-on-full event queue (spec §4.3: "capacity >= 100
//! ... drop the oldest event and log at warn"). `tokio::sync::mpsc` has no
//! built-in eviction policy, so the watcher's delivery channel is this small
//! hand-rolled primitive instead: a `Mutex<VecDeque<_>>` paired with a
//! `tokio::sync::Notify` to wake a waiting receiver.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};

use isync_core::FileEvent;
use parking_lot::Mutex;
use tokio::sync::Notify;
use tracing::warn;

pub struct EventQueue {
    capacity: usize,
    buffer: Mutex<VecDeque<FileEvent>>,
    notify: Notify,
    closed: AtomicBool,
}

impl EventQueue {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            buffer: Mutex::new(VecDeque::with_capacity(capacity)),
            notify: Notify::new(),
            closed: AtomicBool::new(false),
        }
    }

    /// Push an event, dropping the oldest buffered event (and logging at
    /// warn) if the queue is already at capacity.
    pub fn push(&self, event: FileEvent) {
        let mut buffer = self.buffer.lock();
        if buffer.len() >= self.capacity {
            let dropped = buffer.pop_front();
            warn!(
                ?dropped,
                capacity = self.capacity,
                "event queue full, dropping oldest event; periodic sweep will reconverge"
            );
        }
        buffer.push_back(event);
        drop(buffer);
        self.notify.notify_one();
    }

    /// Mark the queue closed; future and pending `recv` calls observe
    /// `None` once the buffer drains.
    pub fn close(&self) {
        self.closed.store(true, Ordering::SeqCst);
        self.notify.notify_waiters();
    }

    /// Await the next event, or `None` once the queue is closed and empty.
    pub async fn recv(&self) -> Option<FileEvent> {
        loop {
            if let Some(event) = self.buffer.lock().pop_front() {
                return Some(event);
            }
            if self.closed.load(Ordering::SeqCst) {
                return None;
            }
            self.notify.notified().await;
        }
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.buffer.lock().len()
    }
}
