//! The active pointer: which account is currently applied.
//!
//! A bare-text file holding the account name plus a trailing newline. The
//! pointer is written only after a successful apply, and it is never
//! validated against the registry on read - a stale pointer (left behind by
//! a remove or an out-of-band edit) must not break read paths.

use anyhow::{Context, Result};
use std::fs;
use std::path::Path;

/// Read the active account name, if any.
///
/// Returns `None` when the pointer file is missing or blank.
pub fn read(path: &Path) -> Result<Option<String>> {
    if !path.exists() {
        return Ok(None);
    }

    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read active pointer: {:?}", path))?;
    let name = content.trim();

    if name.is_empty() {
        Ok(None)
    } else {
        Ok(Some(name.to_string()))
    }
}

/// Overwrite the active pointer with `name`.
pub fn write(path: &Path, name: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create state directory: {:?}", parent))?;
    }

    fs::write(path, format!("{name}\n"))
        .with_context(|| format!("Failed to write active pointer: {:?}", path))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_read_missing_is_none() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("active");
        assert_eq!(read(&path).unwrap(), None);
    }

    #[test]
    fn test_read_blank_is_none() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("active");
        fs::write(&path, "  \n").unwrap();
        assert_eq!(read(&path).unwrap(), None);
    }

    #[test]
    fn test_write_then_read() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("active");

        write(&path, "work").unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "work\n");
        assert_eq!(read(&path).unwrap(), Some("work".to_string()));

        write(&path, "personal").unwrap();
        assert_eq!(read(&path).unwrap(), Some("personal".to_string()));
    }

    #[test]
    fn test_read_trims_whitespace() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("active");
        fs::write(&path, " work \n").unwrap();
        assert_eq!(read(&path).unwrap(), Some("work".to_string()));
    }
}
