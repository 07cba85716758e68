use anyhow::{Context, Result};
use directories::BaseDirs;
use std::env;
use std::path::{Path, PathBuf};

/// All computed paths used by ccauth.
///
/// Resolution is a pure function of the environment: `CCAUTH_DIR` overrides
/// the state directory, `CLAUDE_HOME` overrides where the wrapped CLI keeps
/// its live credentials. No directory is created here; see [`ensure_dirs`].
///
/// [`ensure_dirs`]: Paths::ensure_dirs
#[derive(Debug, Clone)]
pub struct Paths {
    /// ~/.ccauth (or $CCAUTH_DIR)
    pub base_dir: PathBuf,
    /// ~/.ccauth/accounts.json
    pub registry_file: PathBuf,
    /// ~/.ccauth/active
    pub active_file: PathBuf,
    /// ~/.ccauth/auth
    pub snapshots_dir: PathBuf,
    /// ~/.claude (or $CLAUDE_HOME)
    pub claude_dir: PathBuf,
    /// ~/.claude/auth.json - the file the claude CLI reads its credentials from
    pub live_credentials: PathBuf,
    /// ~/.claude/auth.json.bak - single-slot backup written before every apply
    pub live_backup: PathBuf,
}

impl Paths {
    pub fn new() -> Result<Self> {
        let base_dirs = BaseDirs::new().context("Failed to determine home directory")?;
        let home = base_dirs.home_dir();

        let base_dir = env::var_os("CCAUTH_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|| home.join(".ccauth"));
        let claude_dir = env::var_os("CLAUDE_HOME")
            .map(PathBuf::from)
            .unwrap_or_else(|| home.join(".claude"));

        Ok(Self::from_roots(base_dir, claude_dir))
    }

    /// Derive all fixed locations from the two root directories.
    pub fn from_roots(base_dir: PathBuf, claude_dir: PathBuf) -> Self {
        let registry_file = base_dir.join("accounts.json");
        let active_file = base_dir.join("active");
        let snapshots_dir = base_dir.join("auth");
        let live_credentials = claude_dir.join("auth.json");
        let live_backup = claude_dir.join("auth.json.bak");

        Self {
            base_dir,
            registry_file,
            active_file,
            snapshots_dir,
            claude_dir,
            live_credentials,
            live_backup,
        }
    }

    /// Snapshot slot for a given account name.
    pub fn snapshot_path(&self, name: &str) -> PathBuf {
        self.snapshots_dir.join(format!("{name}.auth.json"))
    }

    /// Check if a path is within the snapshot directory (owned by ccauth).
    pub fn owns_snapshot(&self, path: &Path) -> bool {
        path.starts_with(&self.snapshots_dir)
    }

    /// Ensure the state directory and snapshot directory exist.
    pub fn ensure_dirs(&self) -> Result<()> {
        std::fs::create_dir_all(&self.base_dir)
            .with_context(|| format!("Failed to create state directory: {:?}", self.base_dir))?;
        std::fs::create_dir_all(&self.snapshots_dir).with_context(|| {
            format!(
                "Failed to create snapshot directory: {:?}",
                self.snapshots_dir
            )
        })?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use tempfile::TempDir;

    #[test]
    fn test_snapshot_path() {
        let paths = Paths::from_roots(PathBuf::from("/state"), PathBuf::from("/claude"));
        assert_eq!(
            paths.snapshot_path("work"),
            PathBuf::from("/state/auth/work.auth.json")
        );
    }

    #[test]
    fn test_owns_snapshot() {
        let paths = Paths::from_roots(PathBuf::from("/state"), PathBuf::from("/claude"));
        assert!(paths.owns_snapshot(&paths.snapshot_path("x")));
        assert!(!paths.owns_snapshot(&paths.live_credentials));
    }

    #[test]
    #[serial]
    fn test_env_overrides() {
        let temp = TempDir::new().unwrap();
        let state = temp.path().join("state-root");
        let claude = temp.path().join("claude-home");
        unsafe {
            std::env::set_var("CCAUTH_DIR", &state);
            std::env::set_var("CLAUDE_HOME", &claude);
        }

        let paths = Paths::new().unwrap();
        assert_eq!(paths.base_dir, state);
        assert_eq!(paths.registry_file, state.join("accounts.json"));
        assert_eq!(paths.live_credentials, claude.join("auth.json"));
        assert_eq!(paths.live_backup, claude.join("auth.json.bak"));

        unsafe {
            std::env::remove_var("CCAUTH_DIR");
            std::env::remove_var("CLAUDE_HOME");
        }
    }

    #[test]
    #[serial]
    fn test_defaults_under_home() {
        unsafe {
            std::env::remove_var("CCAUTH_DIR");
            std::env::remove_var("CLAUDE_HOME");
        }
        let paths = Paths::new().unwrap();
        assert!(paths.base_dir.ends_with(".ccauth"));
        assert!(paths.claude_dir.ends_with(".claude"));
        assert!(paths.active_file.ends_with(".ccauth/active"));
    }
}
