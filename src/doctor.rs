//! Diagnostics for the `ccauth doctor` command.
//!
//! Checks the state directory, the registry file (including malformed
//! entries that would be dropped on load), the active pointer, each
//! account's backing credential file, and the live credential file and its
//! backup slot. A stale active pointer is reported as a warning, never an
//! error.

use anstyle::AnsiColor;
use chrono::{DateTime, Utc};
use std::fs;
use std::path::Path;

use crate::active;
use crate::paths::Paths;
use crate::registry::Registry;
use crate::ui::Ui;

pub fn run_doctor(paths: &Paths, ui: &Ui) {
    ui.section("ccauth Doctor");
    ui.newline();

    // 1. Directories
    check_step(ui, "Directories", || {
        let mut ok = true;
        if paths.base_dir.exists() {
            ui.println(format!(
                "  {} State directory exists: {}",
                ui.icon_ok(),
                paths.base_dir.display()
            ));
        } else {
            ui.println(format!(
                "  {} State directory missing: {}",
                ui.icon_err(),
                paths.base_dir.display()
            ));
            ok = false;
        }

        if paths.claude_dir.exists() {
            ui.println(format!(
                "  {} Claude directory exists: {}",
                ui.icon_ok(),
                paths.claude_dir.display()
            ));
        } else {
            // Not an error if the wrapped CLI has never run
            ui.println(format!(
                "  {} Claude directory missing: {}",
                ui.icon_warn(),
                paths.claude_dir.display()
            ));
        }
        ok
    });

    // 2. Registry
    let registry = check_registry(paths, ui);

    // 3. Active pointer
    check_step(ui, "Active Pointer", || {
        match active::read(&paths.active_file) {
            Ok(Some(name)) => {
                ui.println(format!("  {} Active account: {}", ui.icon_info(), name));
                if let Some(registry) = &registry {
                    if registry.find(&name).is_some() {
                        ui.println(format!("  {} Name is registered", ui.icon_ok()));
                    } else {
                        ui.println(format!(
                            "  {} Pointer is stale: '{}' is not in the registry",
                            ui.icon_warn(),
                            name
                        ));
                    }
                }
                true
            }
            Ok(None) => {
                ui.println(format!("  {} No active account set", ui.icon_info()));
                true
            }
            Err(e) => {
                ui.println(format!("  {} Failed to read pointer: {}", ui.icon_err(), e));
                false
            }
        }
    });

    // 4. Account backing files
    check_step(ui, "Accounts", || {
        let Some(registry) = &registry else {
            ui.println(format!("  {} Skipped (registry unreadable)", ui.icon_warn()));
            return true;
        };

        if registry.is_empty() {
            ui.println(format!("  {} No accounts registered", ui.icon_warn()));
            return true;
        }

        ui.println(format!("  Found {} account(s):", registry.len()));
        let mut all_valid = true;
        for account in registry.accounts() {
            if account.path.is_file() {
                ui.println(format!("    {} {}", ui.icon_ok(), account.name));
            } else {
                ui.println(format!(
                    "    {} {} (credential file missing: {})",
                    ui.icon_err(),
                    account.name,
                    account.path.display()
                ));
                all_valid = false;
            }
        }
        all_valid
    });

    // 5. Live credentials and backup slot
    check_step(ui, "Live Credentials", || {
        describe_file(ui, "Live file", &paths.live_credentials);
        describe_file(ui, "Backup slot", &paths.live_backup);
        true
    });
}

/// Report on the registry file, including entries load would drop.
/// Returns the loaded registry when readable.
fn check_registry(paths: &Paths, ui: &Ui) -> Option<Registry> {
    let mut result = None;

    check_step(ui, "Registry", || {
        if !paths.registry_file.exists() {
            ui.println(format!(
                "  {} Registry file missing (fresh install?)",
                ui.icon_warn()
            ));
            return true;
        }

        match Registry::load(&paths.registry_file) {
            Ok(registry) => {
                ui.println(format!("  {} Registry file readable", ui.icon_ok()));

                // Compare raw entry count against what survived the load.
                let raw_len = fs::read_to_string(&paths.registry_file)
                    .ok()
                    .and_then(|c| serde_json::from_str::<serde_json::Value>(&c).ok())
                    .and_then(|v| v.as_array().map(Vec::len));
                if let Some(raw) = raw_len
                    && raw > registry.len()
                {
                    ui.println(format!(
                        "  {} {} malformed entr{} will be dropped on load",
                        ui.icon_warn(),
                        raw - registry.len(),
                        if raw - registry.len() == 1 { "y" } else { "ies" }
                    ));
                }

                result = Some(registry);
                true
            }
            Err(e) => {
                ui.println(format!("  {} Registry corrupt: {}", ui.icon_err(), e));
                false
            }
        }
    });

    result
}

fn describe_file(ui: &Ui, label: &str, path: &Path) {
    match fs::metadata(path) {
        Ok(meta) if meta.is_file() => {
            let modified = meta
                .modified()
                .ok()
                .map(|t| {
                    let dt: DateTime<Utc> = t.into();
                    dt.format("%Y-%m-%d %H:%M:%S").to_string()
                })
                .unwrap_or_else(|| "?".to_string());
            ui.println(format!(
                "  {} {}: {} (modified {})",
                ui.icon_ok(),
                label,
                path.display(),
                modified
            ));
        }
        Ok(_) => {
            ui.println(format!(
                "  {} {}: {} is not a regular file",
                ui.icon_err(),
                label,
                path.display()
            ));
        }
        Err(_) => {
            ui.println(format!(
                "  {} {}: {} (absent)",
                ui.icon_info(),
                label,
                path.display()
            ));
        }
    }
}

fn check_step<F>(ui: &Ui, name: &str, check_fn: F)
where
    F: FnOnce() -> bool,
{
    ui.println(ui.bold(format!("Checking {}...", name)));
    let success = check_fn();
    if !success {
        ui.println(ui.colored("  Issues detected!", AnsiColor::Red));
    }
    ui.newline();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::setup_test_paths;
    use crate::ui::ColorMode;
    use tempfile::TempDir;

    #[test]
    fn test_doctor_fresh_state_does_not_panic() {
        let temp = TempDir::new().unwrap();
        let paths = setup_test_paths(&temp);
        let ui = Ui::new(ColorMode::Never, false);
        run_doctor(&paths, &ui);
    }

    #[test]
    fn test_doctor_with_stale_pointer_and_corrupt_registry() {
        let temp = TempDir::new().unwrap();
        let paths = setup_test_paths(&temp);
        let ui = Ui::new(ColorMode::Never, false);

        paths.ensure_dirs().unwrap();
        fs::write(&paths.registry_file, "{not json").unwrap();
        active::write(&paths.active_file, "ghost").unwrap();

        // Diagnostics report, they never fail.
        run_doctor(&paths, &ui);
    }
}
