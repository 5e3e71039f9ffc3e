//! Firmware Artifact Store
//!
//! Artifacts are flat `<name>.bin` files under a single root directory.
//! Freshness comes from filesystem mtime, read on every lookup, so a newly
//! deployed binary is visible on the very next request.

use chrono::{DateTime, Local, NaiveDateTime, Timelike};
use std::path::{Component, Path, PathBuf};
use thiserror::Error;

/// Artifact lookup errors
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("no artifact named {0:?}")]
    NotFound(String),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// A resolved artifact: where its bytes live and when they last changed.
///
/// Derived fresh from storage metadata on each lookup, never cached.
#[derive(Debug, Clone)]
pub struct ArtifactRecord {
    pub name: String,
    pub path: PathBuf,
    pub modified_at: NaiveDateTime,
}

/// Read-only view over the firmware directory.
pub struct ArtifactStore {
    root: PathBuf,
}

impl ArtifactStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Resolve `name` to `<root>/<name>.bin` and its current mtime.
    ///
    /// The mtime is truncated to whole seconds in local time, matching the
    /// resolution of device build stamps. Names that would escape the root
    /// resolve to `NotFound`.
    pub fn lookup(&self, name: &str) -> Result<ArtifactRecord, StoreError> {
        if !is_plain_file_name(name) {
            return Err(StoreError::NotFound(name.to_string()));
        }
        let path = self.root.join(format!("{name}.bin"));
        if !path.is_file() {
            return Err(StoreError::NotFound(name.to_string()));
        }
        let mtime = std::fs::metadata(&path)?.modified()?;
        Ok(ArtifactRecord {
            name: name.to_string(),
            path,
            modified_at: truncate_to_seconds(mtime),
        })
    }
}

/// A name is plain when it stays a single normal path component.
pub(crate) fn is_plain_file_name(name: &str) -> bool {
    let mut components = Path::new(name).components();
    matches!(
        (components.next(), components.next()),
        (Some(Component::Normal(_)), None)
    )
}

fn truncate_to_seconds(mtime: std::time::SystemTime) -> NaiveDateTime {
    let local = DateTime::<Local>::from(mtime).naive_local();
    local.with_nanosecond(0).unwrap_or(local)
}
