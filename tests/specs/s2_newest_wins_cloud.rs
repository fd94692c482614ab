// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Keystone Legal Technologies, Inc.

//! S2: when the same relative path exists on both sides with differing
//! content, the side with the strictly newer mtime wins (spec §4.4, §8).

use crate::prelude::*;
use filetime::FileTime;
use std::time::{Duration, SystemTime};

#[test]
fn strictly_newer_cloud_file_overwrites_local() {
    let mut project = Project::new();

    let base = SystemTime::now() - Duration::from_secs(3600);
    let newer = base + Duration::from_secs(10);

    project.write_local_file("alpha/doc.txt", b"stale local draft");
    filetime::set_file_mtime(
        project.local_root().join("alpha/doc.txt"),
        FileTime::from_system_time(base),
    )
    .unwrap();

    project.write_cloud_file("alpha/doc.txt", b"final cloud version");
    filetime::set_file_mtime(
        project.cloud_root().join("alpha/doc.txt"),
        FileTime::from_system_time(newer),
    )
    .unwrap();

    project.spawn();
    let mirrored = project.local_root().join("alpha/doc.txt");
    assert!(wait_for(SPEC_WAIT_MAX_MS, || {
        std::fs::read(&mirrored).map(|c| c == b"final cloud version").unwrap_or(false)
    }));

    project.shutdown();
}
