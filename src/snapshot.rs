//! The snapshot store: private copies of the live credential file.
//!
//! `save` captures whatever the claude CLI is currently logged in with into
//! `<state-dir>/auth/<name>.auth.json`. Each name owns exactly one slot;
//! re-saving overwrites it.

use anyhow::{Context, Result};
use std::path::PathBuf;

use crate::error::Error;
use crate::fs_utils::{copy_file, restrict_permissions};
use crate::paths::Paths;

/// Copy the live credential file into the snapshot slot for `name` and
/// return the snapshot's path.
///
/// Fails with [`Error::NoActiveCredentials`] when there is nothing to save.
pub fn save_snapshot(paths: &Paths, name: &str) -> Result<PathBuf> {
    if !paths.live_credentials.is_file() {
        return Err(Error::NoActiveCredentials(paths.live_credentials.clone()).into());
    }

    std::fs::create_dir_all(&paths.snapshots_dir).with_context(|| {
        format!(
            "Failed to create snapshot directory: {:?}",
            paths.snapshots_dir
        )
    })?;

    let snapshot = paths.snapshot_path(name);
    copy_file(&paths.live_credentials, &snapshot)?;
    restrict_permissions(&snapshot);

    Ok(snapshot)
}
