//! Account switching: the only code that writes the live credential file.
//!
//! The apply sequence is fixed: back up whatever is live into the single
//! `.bak` slot, copy the source over it, then (and only then) record the new
//! active account. A failed backup aborts the switch - overwriting the live
//! file without a recovery copy risks silent credential loss. There is no
//! rollback; after a failed copy the `.bak` file is the manual recovery path
//! and the active pointer is left untouched.

use anyhow::{Context, Result};
use std::path::Path;

use crate::active;
use crate::error::Error;
use crate::fs_utils::{copy_file, restrict_permissions};
use crate::paths::Paths;
use crate::registry::Registry;

/// Copy `source` onto the live credential file, backing up the current one.
pub fn apply_credentials(paths: &Paths, source: &Path) -> Result<()> {
    if !source.is_file() {
        return Err(Error::SourceMissing(source.to_path_buf()).into());
    }

    std::fs::create_dir_all(&paths.claude_dir)
        .with_context(|| format!("Failed to create directory: {:?}", paths.claude_dir))?;

    // Single-slot backup: always overwrites the previous one.
    if paths.live_credentials.exists() {
        copy_file(&paths.live_credentials, &paths.live_backup)?;
    }

    copy_file(source, &paths.live_credentials)?;
    restrict_permissions(&paths.live_credentials);

    Ok(())
}

/// Apply the named account and record it as active.
pub fn apply_account(paths: &Paths, registry: &Registry, name: &str) -> Result<()> {
    let account = registry
        .find(name)
        .ok_or_else(|| Error::UnknownAccount(name.to_string()))?;

    apply_credentials(paths, &account.path)?;
    active::write(&paths.active_file, name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::setup_test_paths;
    use std::fs;
    use std::path::PathBuf;
    use tempfile::TempDir;

    fn registry_with(entries: &[(&str, PathBuf)]) -> Registry {
        let mut registry = Registry::default();
        for (name, path) in entries {
            registry.upsert(name, path.clone());
        }
        registry
    }

    #[test]
    fn test_apply_missing_source() {
        let temp = TempDir::new().unwrap();
        let paths = setup_test_paths(&temp);

        let err = apply_credentials(&paths, &temp.path().join("gone.json")).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<Error>(),
            Some(Error::SourceMissing(_))
        ));
        assert!(!paths.live_credentials.exists());
    }

    #[test]
    fn test_apply_creates_live_file_without_backup() {
        let temp = TempDir::new().unwrap();
        let paths = setup_test_paths(&temp);

        let source = temp.path().join("w.json");
        fs::write(&source, "work-creds").unwrap();

        // No live file yet: nothing to back up.
        apply_credentials(&paths, &source).unwrap();
        assert_eq!(
            fs::read_to_string(&paths.live_credentials).unwrap(),
            "work-creds"
        );
        assert!(!paths.live_backup.exists());
    }

    #[test]
    fn test_apply_backs_up_previous_live_file() {
        let temp = TempDir::new().unwrap();
        let paths = setup_test_paths(&temp);

        fs::create_dir_all(&paths.claude_dir).unwrap();
        fs::write(&paths.live_credentials, "old-creds").unwrap();

        let source = temp.path().join("p.json");
        fs::write(&source, "new-creds").unwrap();

        apply_credentials(&paths, &source).unwrap();
        assert_eq!(
            fs::read_to_string(&paths.live_credentials).unwrap(),
            "new-creds"
        );
        assert_eq!(fs::read_to_string(&paths.live_backup).unwrap(), "old-creds");
    }

    #[test]
    fn test_apply_twice_is_idempotent() {
        let temp = TempDir::new().unwrap();
        let paths = setup_test_paths(&temp);

        let source = temp.path().join("w.json");
        fs::write(&source, "creds").unwrap();

        apply_credentials(&paths, &source).unwrap();
        apply_credentials(&paths, &source).unwrap();

        // Second backup captures the first apply's result.
        assert_eq!(fs::read_to_string(&paths.live_credentials).unwrap(), "creds");
        assert_eq!(fs::read_to_string(&paths.live_backup).unwrap(), "creds");
    }

    #[test]
    fn test_apply_account_sets_pointer() {
        let temp = TempDir::new().unwrap();
        let paths = setup_test_paths(&temp);

        let source = temp.path().join("w.json");
        fs::write(&source, "creds").unwrap();
        let registry = registry_with(&[("work", source.clone())]);

        apply_account(&paths, &registry, "work").unwrap();
        assert_eq!(
            active::read(&paths.active_file).unwrap(),
            Some("work".to_string())
        );
    }

    #[test]
    fn test_apply_account_unknown_name() {
        let temp = TempDir::new().unwrap();
        let paths = setup_test_paths(&temp);
        let registry = Registry::default();

        let err = apply_account(&paths, &registry, "nope").unwrap_err();
        assert!(matches!(
            err.downcast_ref::<Error>(),
            Some(Error::UnknownAccount(_))
        ));
        assert_eq!(active::read(&paths.active_file).unwrap(), None);
    }

    #[test]
    fn test_failed_apply_leaves_pointer_unchanged() {
        let temp = TempDir::new().unwrap();
        let paths = setup_test_paths(&temp);

        let good = temp.path().join("w.json");
        fs::write(&good, "creds").unwrap();
        let registry = registry_with(&[
            ("work", good.clone()),
            ("stale", PathBuf::from("/nonexistent/creds.json")),
        ]);

        apply_account(&paths, &registry, "work").unwrap();
        assert!(apply_account(&paths, &registry, "stale").is_err());

        assert_eq!(
            active::read(&paths.active_file).unwrap(),
            Some("work".to_string())
        );
        assert_eq!(fs::read_to_string(&paths.live_credentials).unwrap(), "creds");
    }

    #[cfg(unix)]
    #[test]
    fn test_live_file_is_owner_only() {
        use std::os::unix::fs::PermissionsExt;

        let temp = TempDir::new().unwrap();
        let paths = setup_test_paths(&temp);

        let source = temp.path().join("w.json");
        fs::write(&source, "creds").unwrap();
        apply_credentials(&paths, &source).unwrap();

        let mode = fs::metadata(&paths.live_credentials)
            .unwrap()
            .permissions()
            .mode();
        assert_eq!(mode & 0o777, 0o600);
    }
}
