//! Session configuration.
//!
//! Built once by the binary from environment variables and flags, validated
//! up front, then threaded explicitly into every component entry point. No
//! ambient globals.

use std::path::{Path, PathBuf};

use crate::error::SessionError;

/// Default repository root, overridable via `MKJAIL_REPOS`.
pub const DEFAULT_REPO_ROOT: &str = "/usr/repos";
/// Default destination root used to seed the destination prompt,
/// overridable via `MKJAIL_DEST`.
pub const DEFAULT_DEST_ROOT: &str = "/usr/jail";
/// Default scratch directory for prompt exchanges, overridable via `TMPDIR`.
pub const DEFAULT_TMP_DIR: &str = "/tmp";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verbosity {
    Quiet,
    Verbose,
}

#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Root directory scanned for `<version>-RELEASE` style repositories.
    pub repo_root: PathBuf,
    /// Seed value for the destination prompt.
    pub dest_root: PathBuf,
    /// Directory for prompt scratch files.
    pub tmp_dir: PathBuf,
    pub verbosity: Verbosity,
}

impl SessionConfig {
    /// Build a configuration from the environment, falling back to the
    /// compiled-in defaults.
    pub fn from_env(verbosity: Verbosity) -> Self {
        Self {
            repo_root: env_path("MKJAIL_REPOS", DEFAULT_REPO_ROOT),
            dest_root: env_path("MKJAIL_DEST", DEFAULT_DEST_ROOT),
            tmp_dir: env_path("TMPDIR", DEFAULT_TMP_DIR),
            verbosity,
        }
    }

    /// Check that the directories the session depends on exist.
    ///
    /// Called before any prompt is shown; failures are fatal.
    pub fn validate(&self) -> Result<(), SessionError> {
        require_dir(&self.repo_root, "repository root")?;
        require_dir(&self.tmp_dir, "temporary directory")?;
        log::debug!(
            "configuration: repos={} dest={} tmp={} verbosity={:?}",
            self.repo_root.display(),
            self.dest_root.display(),
            self.tmp_dir.display(),
            self.verbosity
        );
        Ok(())
    }

    pub fn verbose(&self) -> bool {
        self.verbosity == Verbosity::Verbose
    }
}

fn env_path(var: &str, default: &str) -> PathBuf {
    match std::env::var_os(var) {
        Some(value) if !value.is_empty() => PathBuf::from(value),
        _ => PathBuf::from(default),
    }
}

fn require_dir(path: &Path, what: &str) -> Result<(), SessionError> {
    if !path.exists() {
        return Err(SessionError::Config(format!(
            "{} '{}' does not exist",
            what,
            path.display()
        )));
    }
    if !path.is_dir() {
        return Err(SessionError::Config(format!(
            "{} '{}' is not a directory",
            what,
            path.display()
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn config_with(repo_root: PathBuf, tmp_dir: PathBuf) -> SessionConfig {
        SessionConfig {
            repo_root,
            dest_root: PathBuf::from(DEFAULT_DEST_ROOT),
            tmp_dir,
            verbosity: Verbosity::Quiet,
        }
    }

    #[test]
    fn test_validate_accepts_existing_dirs() {
        let temp = TempDir::new().unwrap();
        let config = config_with(temp.path().to_path_buf(), temp.path().to_path_buf());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_missing_repo_root() {
        let temp = TempDir::new().unwrap();
        let config = config_with(temp.path().join("nope"), temp.path().to_path_buf());
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("does not exist"));
    }

    #[test]
    fn test_validate_rejects_file_repo_root() {
        let temp = TempDir::new().unwrap();
        let file = temp.path().join("repos");
        std::fs::write(&file, "not a dir").unwrap();
        let config = config_with(file, temp.path().to_path_buf());
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("not a directory"));
    }
}
