// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Keystone Legal Technologies, Inc.

//! Process composition and top-level control flow (spec §4.5). Wires
//! Logger, Config, Watcher, and Reconciler together, runs the initial
//! sweep, then drives the steady-state concurrent contexts until an
//! orderly shutdown is requested.

use std::fs;
use std::panic::{self, AssertUnwindSafe};
use std::path::Path;
use std::sync::Arc;
use std::time::{Duration, Instant};

use isync_config::{Config, ConfigError};
use isync_core::SyncStats;
use isync_logging::{LogLevel, LoggingError, LoggingHandle};
use isync_reconciler::Reconciler;
use isync_watcher::{WatchError, Watcher};
use thiserror::Error;
use tokio::signal::unix::{signal, SignalKind};
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

/// How often the status reporter logs `SyncStats` and process uptime
/// (spec §4.5, startup step 7).
const STATUS_REPORT_INTERVAL: Duration = Duration::from_secs(5 * 60);

#[derive(Debug, Error)]
pub enum SupervisorError {
    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),

    #[error("logging initialization failed: {0}")]
    Logging(#[from] LoggingError),

    #[error("failed to start filesystem watcher: {0}")]
    Watch(#[from] WatchError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// A fully constructed, not-yet-running daemon. Splitting construction
/// ([`Supervisor::startup`]) from the steady-state loop ([`Supervisor::run`])
/// mirrors how this codebase's other daemon separates `lifecycle::startup`
/// from the engine loop in `main`, and lets tests drive the loop against an
/// externally supplied [`CancellationToken`] without needing real OS
/// signals.
pub struct Supervisor {
    config: Config,
    reconciler: Arc<Reconciler>,
    watcher: Watcher,
    events: Arc<isync_watcher::EventQueue>,
    stats: Arc<SyncStats>,
    _logging: LoggingHandle,
}

impl Supervisor {
    /// Run the full startup sequence from spec §4.5: init logging at a
    /// default level, load config (re-initializing logging at the
    /// configured level), attempt to create the cloud root if the mount is
    /// present but the subdirectory is not, construct the Watcher and
    /// Reconciler, and run one synchronous full sweep. Failures during the
    /// sweep itself are logged but never fail startup; only config, logging,
    /// or watcher construction errors are fatal, matching the `invalid-config`
    /// / `io-fatal` taxonomy in spec §7.
    pub fn startup(config_path: &Path) -> Result<Self, SupervisorError> {
        let logging = isync_logging::init(LogLevel::Info)?;

        let config = Config::load(config_path)?;
        logging.set_level(config.log_level)?;

        ensure_cloud_root(&config)?;

        let cloud_root = config.cloud_root_path()?;
        let local_root = config.local_root.clone();
        let output_path = config.output_path();
        let cloud_outputs_path = cloud_root.join("outputs");

        let stats = Arc::new(SyncStats::new());
        stats.mark_started();

        let reconciler = Arc::new(Reconciler::new(
            cloud_root.clone(),
            local_root,
            output_path.clone(),
            cloud_outputs_path,
            Arc::clone(&stats),
        ));

        // Initial full sweep, synchronous, before the Watcher starts (spec
        // §4.5 startup step 5). Never fatal: `full_sweep` swallows its own
        // per-path errors and simply leaves `errors` nonzero.
        reconciler.full_sweep();

        let (watcher, events) = Watcher::start(&[cloud_root, output_path])?;

        Ok(Self {
            config,
            reconciler,
            watcher,
            events,
            stats,
            _logging: logging,
        })
    }

    /// Run until a SIGTERM/SIGINT is received, then shut down gracefully.
    pub async fn run(self) -> Result<(), SupervisorError> {
        let cancel = CancellationToken::new();
        let signal_cancel = cancel.clone();
        let signal_task = tokio::spawn(async move {
            if let Err(e) = wait_for_termination_signal().await {
                error!(error = %e, "failed to install signal handlers");
            }
            signal_cancel.cancel();
        });

        self.run_until_cancelled(cancel).await?;
        signal_task.abort();
        Ok(())
    }

    /// The steady-state loop (spec §4.5 startup step 6-7, §5): concurrently
    /// drain watcher events into the reconciler, tick periodic full sweeps,
    /// and emit a status line every 5 minutes, until `cancel` fires. Exposed
    /// separately from [`Supervisor::run`] so integration tests can trigger
    /// shutdown deterministically instead of racing real OS signals.
    pub async fn run_until_cancelled(self, cancel: CancellationToken) -> Result<(), SupervisorError> {
        let start = Instant::now();
        let Supervisor {
            config,
            reconciler,
            watcher,
            events,
            stats,
            _logging,
        } = self;

        let drain_handle = tokio::spawn(drain_events(
            Arc::clone(&events),
            Arc::clone(&reconciler),
            cancel.child_token(),
        ));
        let sweep_handle = tokio::spawn(sweep_ticker(
            Arc::clone(&reconciler),
            Duration::from_secs(config.sweep_interval_seconds),
            cancel.child_token(),
        ));
        let status_handle = tokio::spawn(status_reporter(
            Arc::clone(&stats),
            start,
            cancel.child_token(),
        ));

        cancel.cancelled().await;
        info!("shutdown requested, draining in-flight work");

        // Cancellation is cooperative: each task observes `cancel` at its
        // next suspension point and returns, so this join never forces a
        // copy-in-progress to abort mid-stream (spec §5).
        let (drain_result, sweep_result, status_result) =
            tokio::join!(drain_handle, sweep_handle, status_handle);
        for result in [drain_result, sweep_result, status_result] {
            if let Err(e) = result {
                error!(error = %e, "a supervisor task panicked during shutdown");
            }
        }

        // `Watcher::stop` closes the event queue itself.
        watcher.stop();

        let snapshot = stats.snapshot();
        info!(
            files_synced = snapshot.files_synced,
            directories_synced = snapshot.directories_synced,
            errors = snapshot.errors,
            uptime_secs = start.elapsed().as_secs(),
            "daemon stopped"
        );
        Ok(())
    }
}

/// Attempt to create the cloud root directory if the fixed OS mount point
/// is present but the `cloudRoot` subdirectory within it is absent.
/// Non-fatal in every branch (spec §4.2, §4.5 startup step 3): an absent
/// mount is logged at error and the daemon continues, an absent subdirectory
/// that fails to create is logged at warn.
fn ensure_cloud_root(config: &Config) -> Result<(), SupervisorError> {
    match config.cloud_mount_available() {
        Ok(true) => {
            let cloud_root = config.cloud_root_path()?;
            if !cloud_root.exists() {
                if let Err(e) = fs::create_dir_all(&cloud_root) {
                    warn!(
                        path = %cloud_root.display(),
                        error = %e,
                        "failed to create cloud root; will retry at next sweep"
                    );
                }
            }
        }
        Ok(false) => {
            error!(
                "cloud mount is not available on this host; sync is paused until it reappears"
            );
        }
        Err(e) => return Err(e.into()),
    }
    Ok(())
}

async fn drain_events(
    events: Arc<isync_watcher::EventQueue>,
    reconciler: Arc<Reconciler>,
    cancel: CancellationToken,
) {
    loop {
        tokio::select! {
            event = events.recv() => {
                match event {
                    Some(event) => catch_and_log_panic("event-driven reconciliation", || {
                        reconciler.handle_event(&event)
                    }),
                    None => break,
                }
            }
            _ = cancel.cancelled() => break,
        }
    }
}

async fn sweep_ticker(reconciler: Arc<Reconciler>, interval: Duration, cancel: CancellationToken) {
    // Created once, outside the loop: `tokio::time::interval` re-evaluated
    // inside a `select!` branch would otherwise reset its own deadline every
    // time a *different* branch fired, and the sweep would never tick during
    // a burst of events.
    let mut ticker = tokio::time::interval(interval);
    ticker.tick().await; // first tick fires immediately; the startup sweep already covered it.
    loop {
        tokio::select! {
            _ = ticker.tick() => catch_and_log_panic("full sweep", || reconciler.full_sweep()),
            _ = cancel.cancelled() => break,
        }
    }
}

/// Run `task`, catching any panic so a single bad path never takes down the
/// drain loop or sweep ticker (spec §7: "A panic/unhandled exception
/// anywhere in an event-handler or sweep task MUST be caught at the task
/// boundary and logged; it MUST NOT terminate the daemon" — the direct
/// corrective to the historical null-dereference crash-loop defect, spec
/// §9). `reconciler.full_sweep`/`handle_event` already catch every I/O
/// error internally; this is the last-resort backstop for anything that
/// slips through as an actual panic instead.
fn catch_and_log_panic(task: &str, work: impl FnOnce()) {
    if let Err(payload) = panic::catch_unwind(AssertUnwindSafe(work)) {
        let message = payload
            .downcast_ref::<&str>()
            .map(|s| s.to_string())
            .or_else(|| payload.downcast_ref::<String>().cloned())
            .unwrap_or_else(|| "<non-string panic payload>".to_string());
        error!(task, message, "recovered from a panic; daemon continues running");
    }
}

async fn status_reporter(stats: Arc<SyncStats>, start: Instant, cancel: CancellationToken) {
    let mut ticker = tokio::time::interval(STATUS_REPORT_INTERVAL);
    ticker.tick().await;
    loop {
        tokio::select! {
            _ = ticker.tick() => {
                let snapshot = stats.snapshot();
                info!(
                    files_synced = snapshot.files_synced,
                    directories_synced = snapshot.directories_synced,
                    errors = snapshot.errors,
                    uptime_secs = start.elapsed().as_secs(),
                    "status"
                );
            }
            _ = cancel.cancelled() => break,
        }
    }
}

async fn wait_for_termination_signal() -> std::io::Result<()> {
    let mut sigterm = signal(SignalKind::terminate())?;
    let mut sigint = signal(SignalKind::interrupt())?;
    tokio::select! {
        _ = sigterm.recv() => info!("received SIGTERM"),
        _ = sigint.recv() => info!("received SIGINT"),
    }
    Ok(())
}

#[cfg(test)]
#[path = "supervisor_tests.rs"]
mod tests;
