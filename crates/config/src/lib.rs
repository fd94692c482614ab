// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Keystone Legal Technologies, Inc.

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! Daemon configuration: load, validate, persist defaults, derive absolute
//! paths (spec §4.2).

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use isync_logging::LogLevel;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors surfaced while loading, validating, or deriving paths from a
/// [`Config`]. `Invalid` and `Io` are fatal at startup; `CloudUnavailable`
/// is not (spec §7).
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid configuration: {field}: {message}")]
    Invalid { field: String, message: String },

    #[error("could not determine home directory")]
    NoHomeDir,

    #[error("cloud mount is not available on this host")]
    CloudUnavailable,

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("malformed configuration file: {0}")]
    Json(#[from] serde_json::Error),
}

impl ConfigError {
    fn invalid(field: &str, message: impl Into<String>) -> Self {
        ConfigError::Invalid {
            field: field.to_string(),
            message: message.into(),
        }
    }
}

/// The on-disk, human-editable daemon configuration (spec §3). Field names
/// are renamed to camelCase so the on-disk document matches what the
/// (out-of-scope) dashboard already generates.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(rename = "cloudRoot")]
    pub cloud_root: String,

    #[serde(rename = "localRoot")]
    pub local_root: PathBuf,

    #[serde(rename = "sweepIntervalSeconds")]
    pub sweep_interval_seconds: u64,

    #[serde(rename = "logLevel")]
    pub log_level: LogLevel,

    #[serde(rename = "backupEnabled")]
    pub backup_enabled: bool,

    /// Unknown fields from the on-disk document, preserved so `save`
    /// round-trips them rather than silently dropping what a newer
    /// dashboard version may have written (spec §6: "Unknown fields MUST
    /// be tolerated").
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// Path segment that marks an un-interpolated installer template
/// (spec §9, "Coupling between the installer's template generator and the
/// daemon's configuration").
const PLACEHOLDER_SEGMENT: &str = "username";

impl Config {
    /// Build a default configuration rooted at the current user's real
    /// home directory. Never emits a `username`-literal placeholder path
    /// (spec §6).
    pub fn default_for_current_user() -> Result<Self, ConfigError> {
        let home = dirs::home_dir().ok_or(ConfigError::NoHomeDir)?;
        Ok(Self {
            cloud_root: "LegalDocs".to_string(),
            local_root: home.join("KeystoneDocs").join("cases"),
            sweep_interval_seconds: 30,
            log_level: LogLevel::Info,
            backup_enabled: false,
            extra: serde_json::Map::new(),
        })
    }

    /// Load configuration from `path`. If the file does not exist, a
    /// default is constructed, persisted, and returned with a warning
    /// (spec §4.2).
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            let config = Self::default_for_current_user()?;
            config.save(path)?;
            tracing::warn!(path = %path.display(), "no configuration found, wrote default");
            return Ok(config);
        }

        let contents = fs::read_to_string(path)?;
        let config: Config = serde_json::from_str(&contents)?;

        if !config.extra.is_empty() {
            tracing::debug!(
                keys = ?config.extra.keys().collect::<Vec<_>>(),
                "ignoring unrecognized configuration fields"
            );
        }

        config.validate()?;
        Ok(config)
    }

    /// Validate the invariants in spec §3. Returns the name of the first
    /// offending field on failure.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.cloud_root.trim().is_empty() {
            return Err(ConfigError::invalid("cloudRoot", "must not be empty"));
        }
        if self.local_root.as_os_str().is_empty() {
            return Err(ConfigError::invalid("localRoot", "must not be empty"));
        }
        if contains_placeholder_segment(&self.local_root) {
            return Err(ConfigError::invalid(
                "localRoot",
                "contains an un-interpolated 'username' placeholder; re-run the installer",
            ));
        }
        if !self.local_root.exists() {
            return Err(ConfigError::invalid(
                "localRoot",
                format!("{} does not exist", self.local_root.display()),
            ));
        }
        if !is_writable(&self.local_root) {
            return Err(ConfigError::invalid(
                "localRoot",
                format!("{} is not writable", self.local_root.display()),
            ));
        }
        if self.sweep_interval_seconds < 1 {
            return Err(ConfigError::invalid(
                "sweepIntervalSeconds",
                "must be >= 1",
            ));
        }
        Ok(())
    }

    /// Serialize with stable field order and indentation, writing
    /// atomically (temp file + rename) so a crash mid-write never leaves a
    /// config file that could be mistaken for valid on restart (spec §4.2).
    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
            set_permissive_dir_perms(parent);
        }

        let tmp_path = path.with_extension("tmp");
        {
            let mut file = fs::File::create(&tmp_path)?;
            let json = serde_json::to_string_pretty(self)?;
            file.write_all(json.as_bytes())?;
            file.sync_all()?;
        }
        fs::rename(&tmp_path, path)?;
        Ok(())
    }

    /// The fixed OS-provided parent directory under which the cloud
    /// provider exposes synced user directories. Isolated behind this
    /// function so a future non-macOS mount convention is a one-line
    /// change (spec §6 only documents the macOS path).
    fn cloud_mount_subpath() -> &'static Path {
        Path::new("Library/Mobile Documents/com~apple~CloudDocs")
    }

    /// Whether the fixed OS cloud-mount point itself (not the `cloudRoot`
    /// subdirectory within it) is present on this host. `false` means the
    /// cloud service is disabled or not installed (spec §6).
    pub fn cloud_mount_available(&self) -> Result<bool, ConfigError> {
        let home = dirs::home_dir().ok_or(ConfigError::NoHomeDir)?;
        Ok(home.join(Self::cloud_mount_subpath()).exists())
    }

    /// `<home>/<fixed OS cloud-mount parent>/<cloudRoot>`, computed
    /// regardless of whether the mount point or the `cloudRoot`
    /// subdirectory currently exist. Callers that need to know whether the
    /// path is actually reachable right now should check
    /// [`Config::cloud_mount_available`] (or call [`Config::cloud_path`],
    /// which folds the two together).
    pub fn cloud_root_path(&self) -> Result<PathBuf, ConfigError> {
        let home = dirs::home_dir().ok_or(ConfigError::NoHomeDir)?;
        Ok(home.join(Self::cloud_mount_subpath()).join(&self.cloud_root))
    }

    /// The absolute cloud root: `<home>/<fixed OS cloud-mount parent>/<cloudRoot>`.
    /// Not fatal if absent from the host — the caller decides whether to
    /// treat [`ConfigError::CloudUnavailable`] as a reason to create it or
    /// simply retry at the next sweep (spec §4.2, §4.5). Returns
    /// `CloudUnavailable` only when the fixed mount point itself is absent;
    /// a missing `cloudRoot` subdirectory within an otherwise-present mount
    /// is not an error here (the Supervisor creates it).
    pub fn cloud_path(&self) -> Result<PathBuf, ConfigError> {
        if !self.cloud_mount_available()? {
            return Err(ConfigError::CloudUnavailable);
        }
        self.cloud_root_path()
    }

    /// `localRoot` ascended two levels, with `outputs` appended (spec
    /// §4.2). `localRoot` is conventionally a "cases" subdirectory of a
    /// larger workspace; this mirrors the sibling "outputs" tree.
    pub fn output_path(&self) -> PathBuf {
        ascend(&self.local_root, 2).join("outputs")
    }
}

fn ascend(path: &Path, levels: u32) -> PathBuf {
    let mut result = path.to_path_buf();
    for _ in 0..levels {
        result = result
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or(result);
    }
    result
}

fn contains_placeholder_segment(path: &Path) -> bool {
    path.components().any(|c| c.as_os_str() == PLACEHOLDER_SEGMENT)
}

#[cfg(unix)]
fn is_writable(path: &Path) -> bool {
    use std::os::unix::fs::PermissionsExt;
    fs::metadata(path)
        .map(|m| m.permissions().mode() & 0o200 != 0)
        .unwrap_or(false)
}

#[cfg(not(unix))]
fn is_writable(path: &Path) -> bool {
    fs::metadata(path)
        .map(|m| !m.permissions().readonly())
        .unwrap_or(false)
}

#[cfg(unix)]
fn set_permissive_dir_perms(dir: &Path) {
    use std::os::unix::fs::PermissionsExt;
    if let Ok(metadata) = fs::metadata(dir) {
        let mut perms = metadata.permissions();
        perms.set_mode(0o755);
        let _ = fs::set_permissions(dir, perms);
    }
}

#[cfg(not(unix))]
fn set_permissive_dir_perms(_dir: &Path) {}

#[cfg(test)]
#[path = "lib_tests.rs"]
mod tests;
