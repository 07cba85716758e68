//! Test utilities shared across test modules.

use crate::paths::Paths;
use tempfile::TempDir;

/// Create a Paths struct rooted in a temporary directory, mimicking the real
/// ~/.ccauth and ~/.claude layout without touching the environment.
pub fn setup_test_paths(temp_dir: &TempDir) -> Paths {
    Paths::from_roots(
        temp_dir.path().join(".ccauth"),
        temp_dir.path().join(".claude"),
    )
}
