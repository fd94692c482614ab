// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Keystone Legal Technologies, Inc.

//! S5: a directory created at runtime under a watched root is enrolled
//! dynamically, so a later file created inside it is mirrored event-driven,
//! without waiting for the next periodic sweep (spec §4.3, §8).

use crate::prelude::*;

#[test]
fn directory_created_at_runtime_is_enrolled_for_event_driven_copies() {
    let mut project = Project::new();
    project.spawn();

    // Wait for the initial (empty) sweep to complete before introducing the
    // new directory, so this exercises the event path, not the next timer
    // sweep.
    std::thread::sleep(std::time::Duration::from_millis(200));

    project.write_cloud_file("new_case/a.pdf", b"first file");
    let mirrored_a = project.local_root().join("new_case/a.pdf");
    assert!(
        wait_for(SPEC_WAIT_MAX_MS, || mirrored_a.exists()),
        "new_case/ and a.pdf should mirror within one sweep interval"
    );

    // The watcher must have enrolled new_case/ itself (not just relied on
    // the next full sweep) — a second file should mirror quickly too.
    project.write_cloud_file("new_case/b.pdf", b"second file");
    let mirrored_b = project.local_root().join("new_case/b.pdf");
    assert!(
        wait_for(SPEC_WAIT_MAX_MS, || mirrored_b.exists()),
        "new_case/ should be enrolled for event-driven copies after its creation"
    );

    project.shutdown();
}
