//! Session-terminal error conditions.
//!
//! Per-component extraction failures are deliberately NOT represented here:
//! they are collected in the extractor's report and never abort the session.

use std::path::PathBuf;

use thiserror::Error;

/// Conditions that end the session with exit status 1.
#[derive(Debug, Error)]
pub enum SessionError {
    /// Repository root, temp dir, or a required host tool is unusable.
    /// Raised before any prompt is shown.
    #[error("configuration error: {0}")]
    Config(String),

    /// The repository root contains no release directories.
    #[error("no release repositories found under {}", .0.display())]
    NoRepositories(PathBuf),

    /// The operator declined or escaped a prompt. Not an error condition;
    /// reported with a one-line notice only.
    #[error("cancelled by operator")]
    Cancelled,

    /// The destination (or its parent) is not writable by the invoking user.
    #[error("permission denied: {} is not writable", .0.display())]
    PermissionDenied(PathBuf),
}
