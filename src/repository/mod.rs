//! On-disk archive resolution.
//!
//! A planned distribution set may exist in the repository as a monolithic
//! `<name>.tgz` or as split shards `<name>.aa`, `<name>.ab`, ..., in either
//! the flat modern layout or the legacy CD-ROM layout under `dists/`. The
//! two layouts are tried as strategies in a fixed priority order (flat
//! wins), so further layouts can be added without touching the contract.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::planner::Component;

/// On-disk layout a set was found in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Layout {
    /// Archives directly under the repository root.
    Flat,
    /// Archives under the legacy `dists/` subdirectory.
    LegacyDists,
}

/// The archive form a set resolved to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Archive {
    /// A single `<name>.tgz`.
    Monolithic(PathBuf),
    /// Split shards `<stem>.aa`, `<stem>.ab`, ... inside `dir`.
    Split { dir: PathBuf, stem: String },
}

/// A planned set located on disk.
#[derive(Debug, Clone)]
pub struct ResolvedComponent {
    pub component: Component,
    pub layout: Layout,
    pub archive: Archive,
    /// `<name>.mtree` sibling of the archive, when present.
    pub manifest: Option<PathBuf>,
}

impl ResolvedComponent {
    /// Presence status for the review display.
    pub fn status(&self) -> &'static str {
        match (self.layout, &self.archive) {
            (Layout::LegacyDists, _) => "present-legacy-subdir",
            (Layout::Flat, Archive::Monolithic(_)) => "present-flat",
            (Layout::Flat, Archive::Split { .. }) => "present-split",
        }
    }
}

/// Stable partition of a plan into located and missing sets.
#[derive(Debug)]
pub struct Resolution {
    pub present: Vec<ResolvedComponent>,
    pub missing: Vec<Component>,
}

const LAYOUTS: &[(Layout, Option<&str>)] = &[
    (Layout::Flat, None),
    (Layout::LegacyDists, Some("dists")),
];

/// Resolve each planned set against `repo_path`, preserving planner order
/// within both partitions. No set appears in both.
pub fn resolve(components: &[Component], repo_path: &Path) -> Result<Resolution> {
    refresh_listing(repo_path)?;

    let mut present = Vec::new();
    let mut missing = Vec::new();
    for component in components {
        match locate(component, repo_path) {
            Some(resolved) => {
                log::debug!("{}: {}", component, resolved.status());
                present.push(resolved);
            }
            None => {
                log::debug!("{}: missing", component);
                missing.push(component.clone());
            }
        }
    }
    Ok(Resolution { present, missing })
}

/// Drain one directory listing of the repository before probing individual
/// files. On NFS mounts this refreshes the attribute cache, which otherwise
/// can report stale non-existence for freshly fetched archives.
fn refresh_listing(repo_path: &Path) -> Result<()> {
    let entries = fs::read_dir(repo_path)
        .with_context(|| format!("listing repository '{}'", repo_path.display()))?;
    for entry in entries {
        let _ = entry;
    }
    Ok(())
}

fn locate(component: &Component, repo_path: &Path) -> Option<ResolvedComponent> {
    for (layout, subdir) in LAYOUTS {
        let base = match subdir {
            Some(sub) => repo_path.join(sub),
            None => repo_path.to_path_buf(),
        };
        let stem = base.join(&component.name);

        let tgz = stem.with_extension("tgz");
        if tgz.is_file() {
            return Some(ResolvedComponent {
                component: component.clone(),
                layout: *layout,
                archive: Archive::Monolithic(tgz),
                manifest: manifest_for(&stem),
            });
        }

        // Split archives are keyed on the first shard specifically.
        if stem.with_extension("aa").is_file() {
            let dir = stem.parent()?.to_path_buf();
            let file_stem = stem.file_name()?.to_str()?.to_string();
            return Some(ResolvedComponent {
                component: component.clone(),
                layout: *layout,
                archive: Archive::Split { dir, stem: file_stem },
                manifest: manifest_for(&stem),
            });
        }
    }
    None
}

fn manifest_for(stem: &Path) -> Option<PathBuf> {
    let manifest = stem.with_extension("mtree");
    manifest.is_file().then_some(manifest)
}
