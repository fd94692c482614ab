// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Keystone Legal Technologies, Inc.

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! Leveled structured logging for the iSync Adapter daemon (spec §4.1).
//!
//! Built directly on `tracing`: every log call made anywhere in the process
//! before [`init`] has run is a documented, safe no-op, because `tracing`'s
//! global dispatcher defaults to a no-op subscriber. That is the "silent
//! no-op before init" invariant the spec requires, satisfied by construction
//! rather than by a bespoke null-object logger.
//!
//! [`init`] may only be called once per process (a second call would panic
//! trying to install a second global subscriber). The Supervisor's startup
//! sequence calls [`init`] once at a default level, then, once configuration
//! is known, retargets the same subscriber via [`LoggingHandle::set_level`] —
//! this is what "re-initialize Logger at the configured level" means in
//! practice for a `tracing`-backed logger.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing_subscriber::{fmt as tracing_fmt, reload, EnvFilter};

/// One of the four levels the spec's configuration format recognizes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Debug,
    Info,
    Warn,
    Error,
}

impl LogLevel {
    fn as_filter_str(self) -> &'static str {
        match self {
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_filter_str())
    }
}

impl FromStr for LogLevel {
    type Err = LoggingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "debug" => Ok(LogLevel::Debug),
            "info" => Ok(LogLevel::Info),
            "warn" => Ok(LogLevel::Warn),
            "error" => Ok(LogLevel::Error),
            other => Err(LoggingError::UnrecognizedLevel(other.to_string())),
        }
    }
}

#[derive(Debug, Error)]
pub enum LoggingError {
    #[error("unrecognized log level: {0}")]
    UnrecognizedLevel(String),

    #[error("failed to install global subscriber (already initialized?)")]
    AlreadyInitialized,

    #[error("failed to reload log level: {0}")]
    Reload(#[from] reload::Error),
}

type FilterHandle = reload::Handle<EnvFilter, tracing_subscriber::Registry>;

/// A handle to the process-wide logging subscriber, returned by [`init`].
/// Dropping it has no effect — the subscriber stays installed for the life
/// of the process; the handle exists only to retarget the active level.
pub struct LoggingHandle {
    filter: FilterHandle,
}

impl LoggingHandle {
    /// Retarget the active log level without re-registering a subscriber.
    /// Called by the Supervisor once Config has been loaded (spec §4.5,
    /// startup step 2).
    pub fn set_level(&self, level: LogLevel) -> Result<(), LoggingError> {
        self.filter
            .reload(EnvFilter::new(level.as_filter_str()))
            .map_err(LoggingError::from)
    }
}

/// Install the process-wide tracing subscriber at `level`. Must be called
/// exactly once, before any other component is constructed (spec §4.5,
/// startup step 1). Output goes to stdout; the OS service manager is
/// responsible for redirecting it to the log files named in spec §6.
pub fn init(level: LogLevel) -> Result<LoggingHandle, LoggingError> {
    use tracing_subscriber::prelude::*;

    let (filter_layer, filter_handle) = reload::Layer::new(EnvFilter::new(level.as_filter_str()));

    let registry = tracing_subscriber::registry()
        .with(filter_layer)
        .with(tracing_fmt::layer());

    registry
        .try_init()
        .map_err(|_| LoggingError::AlreadyInitialized)?;

    Ok(LoggingHandle {
        filter: filter_handle,
    })
}
