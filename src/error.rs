//! Error taxonomy for the account registry and switching core.
//!
//! Filesystem failures (create/read/write/copy) are propagated as plain
//! `anyhow` errors with context attached at the call site; the variants here
//! cover the failures that have meaning beyond "the OS said no".

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    /// The registry file exists but does not decode as a JSON array.
    /// Malformed individual entries are dropped during load instead.
    #[error("account registry at {0} is corrupt: expected a JSON array of accounts")]
    CorruptState(PathBuf),

    /// Name lookup failed during `use`, `remove`, or `rename`.
    #[error("no account named '{0}' is registered")]
    UnknownAccount(String),

    /// A registered credential path no longer exists when it is needed.
    #[error("credential file not found: {0}")]
    SourceMissing(PathBuf),

    /// Rotation attempted against an empty registry.
    #[error("no accounts configured")]
    NoAccountsConfigured,

    /// `save` attempted with no live credential file to snapshot.
    #[error("no live credentials found at {0} (log in with the claude CLI first)")]
    NoActiveCredentials(PathBuf),
}
