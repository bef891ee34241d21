//! Release repository discovery.
//!
//! Scans the repository root for directories named like `9.1-RELEASE`,
//! `8.2-STABLE`, or `10.0-CURRENT`, at most two levels deep (repositories
//! are commonly nested one level per architecture, e.g. `amd64/9.1-RELEASE`).

use std::path::{Path, PathBuf};

use anyhow::Result;
use walkdir::WalkDir;

use crate::error::SessionError;

const RELEASE_SUFFIXES: &[&str] = &["-RELEASE", "-STABLE", "-CURRENT"];

/// A candidate release repository directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReleaseRepository {
    /// Absolute path to the repository directory.
    pub path: PathBuf,
    /// The `<version>` portion of the directory name, e.g. `9.1` for
    /// `9.1-RELEASE`. Never empty.
    pub release_id: String,
}

impl ReleaseRepository {
    fn from_dir(path: &Path) -> Option<Self> {
        let name = path.file_name()?.to_str()?;
        for suffix in RELEASE_SUFFIXES {
            if let Some(version) = name.strip_suffix(suffix) {
                if version.is_empty() {
                    return None;
                }
                return Some(Self {
                    path: path.to_path_buf(),
                    release_id: version.to_string(),
                });
            }
        }
        None
    }
}

/// List the release repositories under `repo_root`, in lexicographic path
/// order.
///
/// Unreadable entries are skipped rather than failing the scan. An empty
/// result is terminal for the session and surfaces as
/// [`SessionError::NoRepositories`].
pub fn list(repo_root: &Path) -> Result<Vec<ReleaseRepository>> {
    let mut repos = Vec::new();

    for entry in WalkDir::new(repo_root)
        .min_depth(1)
        .max_depth(2)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|entry| entry.ok())
    {
        if !entry.file_type().is_dir() {
            continue;
        }
        if let Some(repo) = ReleaseRepository::from_dir(entry.path()) {
            log::debug!("found repository {} ({})", repo.path.display(), repo.release_id);
            repos.push(repo);
        }
    }

    if repos.is_empty() {
        return Err(SessionError::NoRepositories(repo_root.to_path_buf()).into());
    }
    Ok(repos)
}
