// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Keystone Legal Technologies, Inc.

//! S1: a file that exists only in the cloud root is mirrored to the local
//! root by the daemon's initial synchronous sweep (spec §8).

use crate::prelude::*;

#[test]
fn cloud_only_file_appears_locally_after_initial_sweep() {
    let mut project = Project::new();
    project.write_cloud_file("alpha/doc.txt", b"hello");

    project.spawn();
    let mirrored = project.local_root().join("alpha/doc.txt");
    assert!(
        wait_for(SPEC_WAIT_MAX_MS, || mirrored.exists()),
        "expected {} to exist after the initial sweep",
        mirrored.display()
    );
    assert_eq!(std::fs::read(&mirrored).unwrap(), b"hello");

    let status = project.shutdown();
    assert!(status.success(), "daemon should exit 0 on graceful shutdown");
}
