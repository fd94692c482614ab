// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Keystone Legal Technologies, Inc.

//! The per-file decision algorithm (spec §4.4), in isolation from any I/O
//! beyond the two stats the caller has already taken.

use std::fs::Metadata;
use std::io;

use isync_core::{SyncDecision, SyncDirection, SyncReason};

/// Decide whether `source` (already stat'd as `source_meta`) should be
/// copied onto `dest`. `dest_meta` is `None` when `dest` does not exist.
///
/// The "strictly newer on D" branch and the "equal mtime, equal size"
/// branch both resolve to [`SyncDirection::None`]; the spec's `SyncReason`
/// enum has no dedicated label for "destination is newer", so both share
/// [`SyncReason::Equal`] — the reason only needs to disambiguate the
/// affirmative-copy branches for logging.
pub fn decide(
    direction: SyncDirection,
    source_meta: &Metadata,
    dest_meta: Option<&Metadata>,
) -> io::Result<SyncDecision> {
    let dest_meta = match dest_meta {
        None => return Ok(SyncDecision::copy(direction, SyncReason::MissingAtDestination)),
        Some(m) => m,
    };

    let source_mtime = source_meta.modified()?;
    let dest_mtime = dest_meta.modified()?;

    Ok(match source_mtime.cmp(&dest_mtime) {
        std::cmp::Ordering::Greater => SyncDecision::copy(direction, SyncReason::SourceNewer),
        std::cmp::Ordering::Less => SyncDecision::none(SyncReason::Equal),
        std::cmp::Ordering::Equal => {
            if source_meta.len() != dest_meta.len() {
                SyncDecision::copy(direction, SyncReason::SizeDiffersSameMtime)
            } else {
                SyncDecision::none(SyncReason::Equal)
            }
        }
    })
}
