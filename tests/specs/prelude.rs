// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Keystone Legal Technologies, Inc.

//! Test helpers for black-box `isync-adapterd` specifications.
//!
//! Each [`Project`] fakes a whole host: an isolated `$HOME` (so the fixed
//! `Library/Mobile Documents/com~apple~CloudDocs` mount path resolves inside
//! a tempdir instead of the real account) plus a local processing root laid
//! out the way the installer would (`<workspace>/project/cases`, with
//! `<workspace>/outputs` as its sibling outputs tree, per spec §4.2).

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic, dead_code)]

use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Child, Command, Stdio};
use std::time::{Duration, Instant};

pub const SPEC_POLL_INTERVAL_MS: u64 = 20;
pub const SPEC_WAIT_MAX_MS: u64 = 5_000;

const CLOUD_MOUNT_SUBPATH: &str = "Library/Mobile Documents/com~apple~CloudDocs";

/// Resolve the compiled `isync-adapterd` binary the same way the teacher's
/// own spec suite resolves its daemon binary: prefer the llvm-cov target
/// directory, fall back to the standard debug directory, fall back to a
/// path relative to this test binary itself.
fn binary_path() -> PathBuf {
    let manifest_dir = Path::new(env!("CARGO_MANIFEST_DIR"));

    let llvm_cov_path = manifest_dir
        .join("target/llvm-cov-target/debug")
        .join("isync-adapterd");
    if llvm_cov_path.exists() {
        return llvm_cov_path;
    }

    let standard = manifest_dir.join("target/debug").join("isync-adapterd");
    if standard.exists() {
        return standard;
    }

    if let Ok(exe) = std::env::current_exe() {
        if let Some(debug_dir) = exe.parent().and_then(|d| d.parent()) {
            let fallback = debug_dir.join("isync-adapterd");
            if fallback.exists() {
                return fallback;
            }
        }
    }

    standard
}

/// Run `isync-adapterd` with `args` to completion and capture its result.
/// For the CLI-contract specs (`--version`/`--help`/bad arguments), which
/// need no fake host at all.
pub fn run_cli(args: &[&str]) -> CliOutput {
    let output = Command::new(binary_path())
        .args(args)
        .output()
        .expect("isync-adapterd should run");
    CliOutput {
        success: output.status.success(),
        stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
        stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
    }
}

pub struct CliOutput {
    pub success: bool,
    pub stdout: String,
    pub stderr: String,
}

/// Poll `condition` until it returns true or `timeout_ms` elapses.
pub fn wait_for<F>(timeout_ms: u64, mut condition: F) -> bool
where
    F: FnMut() -> bool,
{
    let start = Instant::now();
    let timeout = Duration::from_millis(timeout_ms);
    let poll_interval = Duration::from_millis(SPEC_POLL_INTERVAL_MS);

    while start.elapsed() < timeout {
        if condition() {
            return true;
        }
        std::thread::sleep(poll_interval);
    }
    false
}

/// A fake host for one test: an isolated `$HOME` and a local processing
/// root, with helper methods for writing files on either side and driving
/// the daemon process against them.
pub struct Project {
    home: tempfile::TempDir,
    workspace: tempfile::TempDir,
    cloud_root_name: String,
    sweep_interval_seconds: u64,
    child: Option<Child>,
}

impl Project {
    /// A project with the cloud mount present (so `cloud_mount_available`
    /// returns true) and an empty "cases" local root.
    pub fn new() -> Self {
        let home = tempfile::tempdir().unwrap();
        fs::create_dir_all(home.path().join(CLOUD_MOUNT_SUBPATH)).unwrap();

        let workspace = tempfile::tempdir().unwrap();
        fs::create_dir_all(Self::cases_dir(&workspace)).unwrap();

        Self {
            home,
            workspace,
            cloud_root_name: "LegalDocs".to_string(),
            sweep_interval_seconds: 1,
            child: None,
        }
    }

    /// A project whose cloud mount point is entirely absent (spec §4.2,
    /// S7-adjacent: cloud service disabled/not installed).
    pub fn without_cloud_mount() -> Self {
        let home = tempfile::tempdir().unwrap();
        let workspace = tempfile::tempdir().unwrap();
        fs::create_dir_all(Self::cases_dir(&workspace)).unwrap();
        Self {
            home,
            workspace,
            cloud_root_name: "LegalDocs".to_string(),
            sweep_interval_seconds: 1,
            child: None,
        }
    }

    fn cases_dir(workspace: &tempfile::TempDir) -> PathBuf {
        workspace.path().join("project").join("cases")
    }

    pub fn local_root(&self) -> PathBuf {
        Self::cases_dir(&self.workspace)
    }

    /// `<workspace>/outputs`, the sibling of `<workspace>/project/cases`
    /// (spec §4.2: `localRoot` ascended two levels, `outputs` appended).
    pub fn output_path(&self) -> PathBuf {
        self.workspace.path().join("outputs")
    }

    pub fn cloud_root(&self) -> PathBuf {
        self.home
            .path()
            .join(CLOUD_MOUNT_SUBPATH)
            .join(&self.cloud_root_name)
    }

    pub fn cloud_outputs(&self) -> PathBuf {
        self.cloud_root().join("outputs")
    }

    pub fn config_path(&self) -> PathBuf {
        self.workspace.path().join("config.json")
    }

    /// Write a config.json with this project's roots. Intervals default to
    /// 1 second so sweep-driven scenarios don't need to wait long.
    pub fn write_config(&self) {
        let config = serde_json::json!({
            "cloudRoot": self.cloud_root_name,
            "localRoot": self.local_root(),
            "sweepIntervalSeconds": self.sweep_interval_seconds,
            "logLevel": "debug",
            "backupEnabled": false,
        });
        fs::write(
            self.config_path(),
            serde_json::to_string_pretty(&config).unwrap(),
        )
        .unwrap();
    }

    pub fn write_cloud_file(&self, rel: impl AsRef<Path>, content: &[u8]) {
        let path = self.cloud_root().join(rel.as_ref());
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(path, content).unwrap();
    }

    pub fn write_local_file(&self, rel: impl AsRef<Path>, content: &[u8]) {
        let path = self.local_root().join(rel.as_ref());
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(path, content).unwrap();
    }

    pub fn write_output_file(&self, rel: impl AsRef<Path>, content: &[u8]) {
        let path = self.output_path().join(rel.as_ref());
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(path, content).unwrap();
    }

    /// Spawn the daemon against this project's config, with `$HOME`
    /// redirected into this project's fake home directory.
    pub fn spawn(&mut self) {
        self.write_config();
        self.spawn_with_existing_config();
    }

    /// Spawn the daemon without (re-)writing `config.json` first, for
    /// scenarios that need to control the config path's contents directly
    /// (spec §8 S7: an unreadable/malformed config path).
    pub fn spawn_with_existing_config(&mut self) {
        let child = Command::new(binary_path())
            .env("HOME", self.home.path())
            .env("ADAPTER_CONFIG", self.config_path())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .expect("isync-adapterd should spawn");
        self.child = Some(child);
    }

    /// Send SIGTERM and wait (bounded) for an orderly, zero-status exit
    /// (spec §4.5 step 4, §6 exit codes).
    pub fn shutdown(&mut self) -> std::process::ExitStatus {
        let mut child = self.child.take().expect("daemon must be running");
        let pid = child.id();
        Command::new("kill")
            .args(["-TERM", &pid.to_string()])
            .status()
            .expect("kill should run");

        let deadline = Instant::now() + Duration::from_secs(5);
        loop {
            if let Some(status) = child.try_wait().expect("try_wait should not error") {
                return status;
            }
            if Instant::now() >= deadline {
                let _ = child.kill();
                panic!("daemon did not exit within 5s of SIGTERM");
            }
            std::thread::sleep(Duration::from_millis(SPEC_POLL_INTERVAL_MS));
        }
    }

    /// Wait (bounded) for the spawned daemon to exit on its own, returning
    /// its status. Used for startup-failure scenarios (spec §8 S7).
    pub fn wait_for_exit(&mut self, timeout_ms: u64) -> Option<std::process::ExitStatus> {
        let child = self.child.as_mut().expect("daemon must have been spawned");
        let deadline = Instant::now() + Duration::from_millis(timeout_ms);
        loop {
            if let Some(status) = child.try_wait().expect("try_wait should not error") {
                return Some(status);
            }
            if Instant::now() >= deadline {
                return None;
            }
            std::thread::sleep(Duration::from_millis(SPEC_POLL_INTERVAL_MS));
        }
    }
}

impl Drop for Project {
    fn drop(&mut self) {
        if let Some(mut child) = self.child.take() {
            let _ = child.kill();
            let _ = child.wait();
        }
    }
}
