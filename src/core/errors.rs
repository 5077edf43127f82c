//! Centralized error taxonomy for bandvault (spec.md §4.11, §7).

use serde::Serialize;
use std::fmt;

/// Storage-specific failure kinds (spec.md §4.11).
#[derive(Debug, Clone, Serialize)]
pub enum StorageError {
    /// Per-band lock could not be acquired before the configured timeout.
    Lock(String),
    /// The atomic write protocol failed (tmp write, fsync, or rename).
    Write(String),
    /// Both the primary file and its `.bak` failed to parse.
    Corrupt(String),
}

impl fmt::Display for StorageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StorageError::Lock(msg) => write!(f, "lock error: {msg}"),
            StorageError::Write(msg) => write!(f, "write error: {msg}"),
            StorageError::Corrupt(msg) => write!(f, "corrupt metadata: {msg}"),
        }
    }
}

/// Schema migration failure kinds.
#[derive(Debug, Clone, Serialize)]
pub enum MigrationError {
    /// The on-disk record could not be brought forward to the current schema.
    Incompatible(String),
}

impl fmt::Display for MigrationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MigrationError::Incompatible(msg) => write!(f, "migration error: {msg}"),
        }
    }
}

/// Top-level error type returned by every core operation.
#[derive(Debug, Clone, Serialize)]
pub enum BandVaultError {
    /// A folder name could not be parsed (spec.md §4.1 — only on empty input).
    Parse(String),
    /// A scan of a band or the whole collection failed.
    Scan(String),
    /// Persistence-layer failure; see `StorageError` for the subkind.
    Storage(StorageError),
    /// A save operation failed schema or cross-field validation.
    Validation(String),
    /// Schema migration failed.
    Migration(MigrationError),
    /// An operation named a band that does not exist.
    NotFound(String),
    /// Configuration is missing or invalid.
    Config(String),
    /// Generic I/O failure outside the storage write protocol.
    Io(String),
    /// Anything else (wraps lower-level errors that don't map cleanly).
    Other(String),
}

impl BandVaultError {
    /// Machine-readable error code for the `{code, message, details?}` wire
    /// shape described in spec.md §7.
    pub fn code(&self) -> &'static str {
        match self {
            BandVaultError::Parse(_) => "PARSE_ERROR",
            BandVaultError::Scan(_) => "SCAN_ERROR",
            BandVaultError::Storage(StorageError::Lock(_)) => "LOCK_ERROR",
            BandVaultError::Storage(StorageError::Write(_)) => "WRITE_ERROR",
            BandVaultError::Storage(StorageError::Corrupt(_)) => "CORRUPT_ERROR",
            BandVaultError::Validation(_) => "VALIDATION_ERROR",
            BandVaultError::Migration(_) => "MIGRATION_ERROR",
            BandVaultError::NotFound(_) => "NOT_FOUND",
            BandVaultError::Config(_) => "CONFIG_ERROR",
            BandVaultError::Io(_) => "IO_ERROR",
            BandVaultError::Other(_) => "ERROR",
        }
    }
}

impl fmt::Display for BandVaultError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BandVaultError::Parse(msg) => write!(f, "parse error: {msg}"),
            BandVaultError::Scan(msg) => write!(f, "scan error: {msg}"),
            BandVaultError::Storage(e) => write!(f, "{e}"),
            BandVaultError::Validation(msg) => write!(f, "validation error: {msg}"),
            BandVaultError::Migration(e) => write!(f, "{e}"),
            BandVaultError::NotFound(msg) => write!(f, "not found: {msg}"),
            BandVaultError::Config(msg) => write!(f, "configuration error: {msg}"),
            BandVaultError::Io(msg) => write!(f, "I/O error: {msg}"),
            BandVaultError::Other(msg) => write!(f, "error: {msg}"),
        }
    }
}

impl std::error::Error for BandVaultError {}

impl From<std::io::Error> for BandVaultError {
    fn from(error: std::io::Error) -> Self {
        BandVaultError::Io(error.to_string())
    }
}

impl From<serde_json::Error> for BandVaultError {
    fn from(error: serde_json::Error) -> Self {
        BandVaultError::Storage(StorageError::Corrupt(error.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_are_stable() {
        assert_eq!(BandVaultError::NotFound("x".into()).code(), "NOT_FOUND");
        assert_eq!(
            BandVaultError::Storage(StorageError::Lock("x".into())).code(),
            "LOCK_ERROR"
        );
    }

    #[test]
    fn display_includes_message() {
        let e = BandVaultError::Validation("bad year".into());
        assert_eq!(e.to_string(), "validation error: bad year");
    }
}
