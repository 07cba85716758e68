//! Filesystem helpers shared across the codebase.

use anyhow::{Context, Result};
use fs2::FileExt;
use std::fs::{self, File, OpenOptions};
use std::path::Path;

/// Copy a file, with context naming both ends on failure.
pub fn copy_file(src: &Path, dst: &Path) -> Result<()> {
    fs::copy(src, dst)
        .with_context(|| format!("Failed to copy file: {:?} -> {:?}", src, dst))?;
    Ok(())
}

/// Best-effort restriction of a credential file to owner read/write.
///
/// Some filesystems reject permission changes; that is not worth failing a
/// switch over, so errors are swallowed.
pub fn restrict_permissions(path: &Path) {
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let _ = fs::set_permissions(path, fs::Permissions::from_mode(0o600));
    }
    #[cfg(not(unix))]
    {
        let _ = path;
    }
}

/// Advisory exclusive lock on the state directory, held for the duration of
/// a mutating command and released on drop.
///
/// Locks a dedicated `.lock` file rather than the registry itself so the
/// registry's write-then-rename persistence is unaffected.
pub struct StateLock {
    file: File,
}

impl StateLock {
    pub fn acquire(state_dir: &Path) -> Result<Self> {
        fs::create_dir_all(state_dir)
            .with_context(|| format!("Failed to create state directory: {:?}", state_dir))?;

        let lock_path = state_dir.join(".lock");
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(&lock_path)
            .with_context(|| format!("Failed to open lock file: {:?}", lock_path))?;

        file.lock_exclusive()
            .with_context(|| format!("Failed to lock state directory: {:?}", state_dir))?;

        Ok(Self { file })
    }
}

impl Drop for StateLock {
    fn drop(&mut self) {
        let _ = self.file.unlock();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_copy_file() {
        let temp = TempDir::new().unwrap();
        let src = temp.path().join("src.json");
        let dst = temp.path().join("dst.json");
        fs::write(&src, "payload").unwrap();

        copy_file(&src, &dst).unwrap();
        assert_eq!(fs::read_to_string(&dst).unwrap(), "payload");
    }

    #[test]
    fn test_copy_missing_source_fails() {
        let temp = TempDir::new().unwrap();
        let src = temp.path().join("missing.json");
        let dst = temp.path().join("dst.json");
        assert!(copy_file(&src, &dst).is_err());
    }

    #[cfg(unix)]
    #[test]
    fn test_restrict_permissions() {
        use std::os::unix::fs::PermissionsExt;

        let temp = TempDir::new().unwrap();
        let path = temp.path().join("auth.json");
        fs::write(&path, "{}").unwrap();

        restrict_permissions(&path);
        let mode = fs::metadata(&path).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);

        // Missing file: swallowed, no panic.
        restrict_permissions(&temp.path().join("nope"));
    }

    #[test]
    fn test_state_lock_creates_dir_and_releases() {
        let temp = TempDir::new().unwrap();
        let state_dir = temp.path().join("state");

        {
            let _lock = StateLock::acquire(&state_dir).unwrap();
            assert!(state_dir.join(".lock").exists());
        }

        // Re-acquirable after drop.
        let _lock = StateLock::acquire(&state_dir).unwrap();
    }
}
