//! The account registry: a durable, ordered list of named credential files.
//!
//! The registry is loaded and persisted as a whole value; callers mutate the
//! in-memory `Registry` and write it back, rather than touching the file
//! piecemeal. Order is insertion order and survives edits: re-registering an
//! existing name updates its path in place without moving it.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::Error;

/// A named reference to a credential file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    pub name: String,
    pub path: PathBuf,
}

/// Ordered sequence of accounts with unique names.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Registry {
    accounts: Vec<Account>,
}

impl Registry {
    /// Initialize the registry file to an empty array if it does not exist.
    pub fn ensure_exists(path: &Path) -> Result<()> {
        if path.exists() {
            return Ok(());
        }
        Registry::default().persist(path)
    }

    /// Load the registry from disk.
    ///
    /// The whole file must decode as a JSON array; anything else is corrupt
    /// state. Individual elements that are not `{name, path}` objects with a
    /// non-empty string name are dropped silently so that partial corruption
    /// does not take the rest of the registry down with it.
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read registry file: {:?}", path))?;

        let value: Value = serde_json::from_str(&content)
            .map_err(|_| Error::CorruptState(path.to_path_buf()))?;
        let entries = value
            .as_array()
            .ok_or_else(|| Error::CorruptState(path.to_path_buf()))?;

        let accounts = entries
            .iter()
            .filter_map(|entry| {
                let name = entry.get("name")?.as_str()?;
                let path = entry.get("path")?.as_str()?;
                if name.is_empty() {
                    return None;
                }
                Some(Account {
                    name: name.to_string(),
                    path: PathBuf::from(path),
                })
            })
            .collect();

        Ok(Self { accounts })
    }

    /// Persist the full registry, pretty-printed with a trailing newline.
    ///
    /// Writes to a temp file and renames over the target so a concurrent
    /// reader never sees a half-written array.
    pub fn persist(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create state directory: {:?}", parent))?;
        }

        let mut content = serde_json::to_string_pretty(&self.accounts)
            .context("Failed to serialize registry")?;
        content.push('\n');

        let temp_path = path.with_extension("json.tmp");
        fs::write(&temp_path, &content)
            .with_context(|| format!("Failed to write temp registry file: {:?}", temp_path))?;
        fs::rename(&temp_path, path).with_context(|| {
            format!("Failed to rename registry file: {:?} -> {:?}", temp_path, path)
        })
    }

    /// Insert or update an account. Existing names keep their position and
    /// get the new path; new names are appended at the end.
    pub fn upsert(&mut self, name: &str, path: PathBuf) {
        match self.accounts.iter_mut().find(|a| a.name == name) {
            Some(existing) => existing.path = path,
            None => self.accounts.push(Account {
                name: name.to_string(),
                path,
            }),
        }
    }

    /// Exact, case-sensitive lookup by name.
    pub fn find(&self, name: &str) -> Option<&Account> {
        self.accounts.iter().find(|a| a.name == name)
    }

    /// Remove an account by name. Untouched entries keep their order.
    pub fn remove(&mut self, name: &str) -> Result<Account> {
        let idx = self
            .accounts
            .iter()
            .position(|a| a.name == name)
            .ok_or_else(|| Error::UnknownAccount(name.to_string()))?;
        Ok(self.accounts.remove(idx))
    }

    /// Rename an account in place (position preserved).
    pub fn rename(&mut self, old: &str, new: &str) -> Result<()> {
        if self.find(new).is_some() {
            anyhow::bail!("Account '{}' already exists", new);
        }
        let account = self
            .accounts
            .iter_mut()
            .find(|a| a.name == old)
            .ok_or_else(|| Error::UnknownAccount(old.to_string()))?;
        account.name = new.to_string();
        Ok(())
    }

    /// Rotation selector: the account after `active` in registry order, with
    /// wraparound. An unset or unknown active name counts as "before the
    /// start", so the first entry is selected.
    pub fn next_after(&self, active: Option<&str>) -> Result<&Account> {
        if self.accounts.is_empty() {
            return Err(Error::NoAccountsConfigured.into());
        }
        let idx = active
            .and_then(|name| self.accounts.iter().position(|a| a.name == name))
            .map(|i| (i + 1) % self.accounts.len())
            .unwrap_or(0);
        Ok(&self.accounts[idx])
    }

    pub fn accounts(&self) -> &[Account] {
        &self.accounts
    }

    pub fn is_empty(&self) -> bool {
        self.accounts.is_empty()
    }

    pub fn len(&self) -> usize {
        self.accounts.len()
    }
}

/// Validate an account name.
///
/// Names become snapshot file names, so only alphanumerics, hyphens, and
/// underscores are allowed.
pub fn validate_account_name(name: &str) -> Result<()> {
    if name.is_empty() {
        anyhow::bail!("Account name cannot be empty");
    }

    if name.chars().count() > 64 {
        anyhow::bail!("Account name cannot be longer than 64 characters");
    }

    if !name
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
    {
        anyhow::bail!(
            "Invalid account name '{}'.\n\n Only alphanumeric characters, hyphens (-), and underscores (_) are allowed.",
            name
        );
    }

    Ok(())
}
