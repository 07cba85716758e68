//! High-level command orchestration for the CLI.
//!
//! Each function here corresponds to a subcommand in `main.rs`. The pattern
//! is the same throughout: ensure the state directory and registry file
//! exist, take the advisory state lock for mutating commands, load the
//! registry as a value, operate, persist. Success goes to stdout via
//! `crate::ui`; failures bubble up as errors for `main` to report.

use anstyle::AnsiColor;
use anyhow::{Context, Result, bail};
use std::fs;
use std::path::Path;

use crate::active;
use crate::doctor::run_doctor;
use crate::error::Error;
use crate::fs_utils::StateLock;
use crate::paths::Paths;
use crate::registry::{Registry, validate_account_name};
use crate::snapshot::save_snapshot;
use crate::switch::apply_account;
use crate::ui::Ui;

fn load_registry(paths: &Paths) -> Result<Registry> {
    paths.ensure_dirs()?;
    Registry::ensure_exists(&paths.registry_file)?;
    Registry::load(&paths.registry_file)
}

/// Set the active pointer to `name` if nothing is active yet. Pointer only;
/// the live credential file is not touched.
fn activate_if_unset(paths: &Paths, name: &str, ui: &Ui) -> Result<()> {
    if active::read(&paths.active_file)?.is_none() {
        active::write(&paths.active_file, name)?;
        ui.info(format!("'{}' is now the active account", name));
    }
    Ok(())
}

/// Register an existing credential file under a name.
pub fn register(paths: &Paths, name: &str, path: &Path, ui: &Ui) -> Result<()> {
    validate_account_name(name)?;

    let resolved = fs::canonicalize(path)
        .with_context(|| format!("Invalid credential path: {:?}", path))?;
    if !resolved.is_file() {
        bail!("Credential path is not a regular file: {}", resolved.display());
    }

    let _lock = StateLock::acquire(&paths.base_dir)?;
    let mut registry = load_registry(paths)?;
    registry.upsert(name, resolved.clone());
    registry.persist(&paths.registry_file)?;

    ui.ok(format!("Registered '{}' -> {}", name, resolved.display()));
    activate_if_unset(paths, name, ui)
}

/// Snapshot the live credentials and register them under a name.
pub fn save(paths: &Paths, name: &str, ui: &Ui) -> Result<()> {
    validate_account_name(name)?;

    let _lock = StateLock::acquire(&paths.base_dir)?;
    let mut registry = load_registry(paths)?;

    let snapshot = save_snapshot(paths, name)?;
    registry.upsert(name, snapshot.clone());
    registry.persist(&paths.registry_file)?;

    ui.ok(format!(
        "Saved current credentials as '{}' ({})",
        name,
        snapshot.display()
    ));
    activate_if_unset(paths, name, ui)
}

/// Switch to a named account.
pub fn use_account(paths: &Paths, name: &str, ui: &Ui) -> Result<()> {
    let _lock = StateLock::acquire(&paths.base_dir)?;
    let registry = load_registry(paths)?;

    let spinner = ui.spinner(format!("Switching to account '{}'...", name));
    match apply_account(paths, &registry, name) {
        Ok(()) => {
            ui.spinner_finish_ok(&spinner, format!("Active account: {}", name));
            Ok(())
        }
        Err(e) => {
            ui.spinner_finish_err(&spinner, format!("Failed to switch: {}", e));
            Err(e)
        }
    }
}

/// Rotate to the next account in registry order, wrapping around.
pub fn switch_next(paths: &Paths, ui: &Ui) -> Result<()> {
    let _lock = StateLock::acquire(&paths.base_dir)?;
    let registry = load_registry(paths)?;
    let current = active::read(&paths.active_file)?;

    let next = registry.next_after(current.as_deref())?.name.clone();

    let spinner = ui.spinner(format!("Switching to account '{}'...", next));
    match apply_account(paths, &registry, &next) {
        Ok(()) => {
            ui.spinner_finish_ok(&spinner, format!("Active account: {}", next));
            Ok(())
        }
        Err(e) => {
            ui.spinner_finish_err(&spinner, format!("Failed to switch: {}", e));
            Err(e)
        }
    }
}

/// Print the active account name.
pub fn current(paths: &Paths, ui: &Ui) -> Result<()> {
    let Some(name) = active::read(&paths.active_file)? else {
        bail!("No active account set.\nHint: Use 'ccauth use <name>' to activate one.");
    };

    ui.println(&name);

    // The pointer may legitimately be stale (renamed or removed out of
    // band); report it but do not fail.
    if paths.registry_file.exists()
        && let Ok(registry) = Registry::load(&paths.registry_file)
        && registry.find(&name).is_none()
    {
        ui.warn(format!("'{}' is not in the account registry", name));
    }

    Ok(())
}

/// List all registered accounts, marking the active one.
pub fn list(paths: &Paths, ui: &Ui) -> Result<()> {
    let registry = load_registry(paths)?;

    if registry.is_empty() {
        ui.warn("No accounts registered.");
        ui.newline();
        ui.println("Save the credentials you are logged in with:");
        ui.println(format!("  {} save <name>", ui.bold("ccauth")));
        return Ok(());
    }

    let current = active::read(&paths.active_file)?;
    let current = current.as_deref();

    let mut table = ui.simple_table();
    table.set_header(vec![
        ui.header_cell(""),
        ui.header_cell("Account"),
        ui.header_cell("Credentials"),
        ui.header_cell("Status"),
    ]);

    for account in registry.accounts() {
        let is_active = Some(account.name.as_str()) == current;
        let icon = if is_active { ui.icon_ok() } else { " " };
        let status_cell = if is_active {
            ui.colored_cell("active", AnsiColor::Green)
        } else if !account.path.is_file() {
            ui.colored_cell("missing file", AnsiColor::Red)
        } else {
            ui.cell("-")
        };

        table.add_row(vec![
            ui.cell(icon),
            ui.cell(&account.name),
            ui.cell(account.path.display().to_string()),
            status_cell,
        ]);
    }

    ui.section("Accounts");
    ui.println(table.to_string());

    if let Some(name) = current
        && registry.find(name).is_none()
    {
        ui.warn(format!("Active pointer names '{}', which is not registered", name));
    }

    Ok(())
}

/// Remove an account from the registry.
pub fn remove(paths: &Paths, name: &str, force: bool, ui: &Ui) -> Result<()> {
    let _lock = StateLock::acquire(&paths.base_dir)?;
    let mut registry = load_registry(paths)?;

    if registry.find(name).is_none() {
        return Err(Error::UnknownAccount(name.to_string()).into());
    }

    if active::read(&paths.active_file)?.as_deref() == Some(name) {
        bail!(
            "Cannot remove '{}' because it is the active account.\nHint: Switch to another account first with 'ccauth use <other>'.",
            name
        );
    }

    if !force {
        let confirm =
            inquire::Confirm::new(&format!("Are you sure you want to remove account '{}'?", name))
                .with_default(false)
                .with_help_message("This also deletes its saved credential snapshot")
                .prompt()
                .context("Confirmation cancelled")?;

        if !confirm {
            ui.warn("Removal cancelled.");
            return Ok(());
        }
    }

    let account = registry.remove(name)?;
    registry.persist(&paths.registry_file)?;

    // Only delete credential files ccauth owns; externally registered paths
    // stay where they are.
    if paths.owns_snapshot(&account.path) && account.path.exists() {
        fs::remove_file(&account.path)
            .with_context(|| format!("Failed to remove snapshot: {:?}", account.path))?;
    }

    ui.ok(format!("Removed account '{}'", name));
    Ok(())
}

/// Rename an account, keeping its registry position.
pub fn rename(paths: &Paths, old: &str, new: &str, ui: &Ui) -> Result<()> {
    validate_account_name(new)?;

    let _lock = StateLock::acquire(&paths.base_dir)?;
    let mut registry = load_registry(paths)?;

    let old_path = registry
        .find(old)
        .ok_or_else(|| Error::UnknownAccount(old.to_string()))?
        .path
        .clone();

    registry.rename(old, new)?;

    // An owned snapshot slot is keyed by name, so it moves with the rename.
    if old_path == paths.snapshot_path(old) && old_path.exists() {
        let new_path = paths.snapshot_path(new);
        fs::rename(&old_path, &new_path).with_context(|| {
            format!("Failed to rename snapshot: {:?} -> {:?}", old_path, new_path)
        })?;
        registry.upsert(new, new_path);
    }

    registry.persist(&paths.registry_file)?;

    if active::read(&paths.active_file)?.as_deref() == Some(old) {
        active::write(&paths.active_file, new)?;
    }

    ui.ok(format!("Renamed account '{}' to '{}'", old, new));
    Ok(())
}

/// Run diagnostics.
pub fn doctor(paths: &Paths, ui: &Ui) -> Result<()> {
    run_doctor(paths, ui);
    Ok(())
}
