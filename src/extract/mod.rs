//! Jail extraction and manifest replay.
//!
//! Drives `tar` for each located distribution set (monolithic archives
//! directly, split archives as a shard-concatenated byte stream) and replays
//! accompanying mtree manifests. A set that fails to extract is recorded in
//! the report and the remaining sets still run; there is no rollback, and a
//! partially populated jail is accepted behavior.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use log::{info, warn};

use crate::config::SessionConfig;
use crate::process::Cmd;
use crate::repository::{Archive, ResolvedComponent};

/// Outcome of one set's extraction.
#[derive(Debug)]
pub struct ComponentOutcome {
    pub name: String,
    pub label: String,
    pub error: Option<String>,
}

impl ComponentOutcome {
    pub fn ok(&self) -> bool {
        self.error.is_none()
    }
}

/// Per-set outcomes for the whole run.
#[derive(Debug, Default)]
pub struct ExtractReport {
    pub outcomes: Vec<ComponentOutcome>,
}

impl ExtractReport {
    pub fn all_ok(&self) -> bool {
        self.outcomes.iter().all(ComponentOutcome::ok)
    }

    /// One line per set, for the closing summary screen.
    pub fn summary(&self) -> String {
        self.outcomes
            .iter()
            .map(|outcome| match &outcome.error {
                None => format!("{}: done", outcome.name),
                Some(err) => format!("{}: FAILED ({})", outcome.name, err),
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// The canonical base manifests replayed after all sets, in fixed order.
/// Each entry is (manifest under `etc/mtree/`, subtree it is rooted at).
const BASE_MANIFESTS: &[(&str, &str)] = &[
    ("BSD.root.dist", ""),
    ("BSD.var.dist", "var"),
    ("BSD.usr.dist", "usr"),
];

/// Extract every located set into `dest_dir`, then run the final
/// consistency pass over the base manifests.
///
/// Creates `dest_dir` recursively if absent. Sets are processed strictly in
/// order; most archives populate overlapping top-level directories, so they
/// must not run concurrently.
pub fn extract(
    present: &[ResolvedComponent],
    dest_dir: &Path,
    config: &SessionConfig,
) -> Result<ExtractReport> {
    fs::create_dir_all(dest_dir)
        .with_context(|| format!("creating destination '{}'", dest_dir.display()))?;

    let mut report = ExtractReport::default();
    for resolved in present {
        let name = resolved.component.name.clone();
        let label = resolved.component.label().to_string();
        info!("extracting {} ({})", label, resolved.status());

        let error = match extract_one(resolved, dest_dir, config) {
            Ok(()) => None,
            Err(err) => {
                warn!("extraction of {} failed: {:#}", name, err);
                Some(format!("{:#}", err))
            }
        };
        report.outcomes.push(ComponentOutcome { name, label, error });
    }

    apply_base_manifests(dest_dir, config)?;
    Ok(report)
}

fn extract_one(
    resolved: &ResolvedComponent,
    dest_dir: &Path,
    config: &SessionConfig,
) -> Result<()> {
    match &resolved.archive {
        Archive::Monolithic(archive) => untar_file(archive, dest_dir, config)?,
        Archive::Split { dir, stem } => {
            let shards = collect_shards(dir, stem)?;
            untar_stream(&shards, dest_dir, config)?;
        }
    }
    if let Some(manifest) = &resolved.manifest {
        replay_manifest(manifest, dest_dir, config)?;
    }
    Ok(())
}

// -p preserves permissions/ownership/special files; -U unlinks existing
// entries before writing, so a pre-existing symlink at the destination is
// replaced instead of traversed.
fn untar_file(archive: &Path, dest_dir: &Path, config: &SessionConfig) -> Result<()> {
    tar_cmd(config)
        .args(&["-xpU", "-f"])
        .arg_path(archive)
        .arg("-C")
        .arg_path(dest_dir)
        .run()?;
    Ok(())
}

fn untar_stream(shards: &[PathBuf], dest_dir: &Path, config: &SessionConfig) -> Result<()> {
    tar_cmd(config)
        .args(&["-xpzU", "-f", "-"])
        .arg("-C")
        .arg_path(dest_dir)
        .run_streamed(shards)?;
    Ok(())
}

fn tar_cmd(config: &SessionConfig) -> Cmd {
    let cmd = Cmd::new("tar").quiet(!config.verbose());
    if config.verbose() {
        cmd.arg("-v")
    } else {
        cmd
    }
}

/// Collect the shard files for a split archive, in ascending lexical
/// shard-suffix order (`.aa`, `.ab`, ...).
pub(crate) fn collect_shards(dir: &Path, stem: &str) -> Result<Vec<PathBuf>> {
    let prefix = format!("{}.", stem);
    let mut shards = Vec::new();

    let entries =
        fs::read_dir(dir).with_context(|| format!("listing shards in '{}'", dir.display()))?;
    for entry in entries {
        let entry = entry?;
        let name = entry.file_name();
        let Some(name) = name.to_str() else { continue };
        let Some(suffix) = name.strip_prefix(&prefix) else { continue };
        if suffix.len() == 2 && suffix.chars().all(|c| c.is_ascii_lowercase()) {
            shards.push(entry.path());
        }
    }

    if shards.is_empty() {
        bail!("no shard files for '{}' in '{}'", stem, dir.display());
    }
    shards.sort();
    Ok(shards)
}

// mtree -U creates missing entries and corrects ownership/permissions, -e
// ignores files the manifest does not mention, -d restricts noise to
// directories. Replaying an already-consistent tree is a no-op.
fn replay_manifest(manifest: &Path, root: &Path, config: &SessionConfig) -> Result<()> {
    info!("replaying manifest {}", manifest.display());
    Cmd::new("mtree")
        .args(&["-deU", "-f"])
        .arg_path(manifest)
        .arg("-p")
        .arg_path(root)
        .quiet(!config.verbose())
        .error_msg(&format!("mtree replay of '{}' failed", manifest.display()))
        .run()?;
    Ok(())
}

/// Final consistency pass: replay the root, var, and usr base manifests
/// shipped in the extracted tree, each rooted at its own subtree. Absent
/// manifests are skipped. Order is fixed for reproducibility only; the
/// replays are independent.
pub fn apply_base_manifests(dest_dir: &Path, config: &SessionConfig) -> Result<()> {
    for (file, subtree) in BASE_MANIFESTS {
        let manifest = dest_dir.join("etc/mtree").join(file);
        if !manifest.is_file() {
            continue;
        }
        let root = if subtree.is_empty() {
            dest_dir.to_path_buf()
        } else {
            dest_dir.join(subtree)
        };
        fs::create_dir_all(&root)
            .with_context(|| format!("creating '{}'", root.display()))?;
        replay_manifest(&manifest, &root, config)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Verbosity;
    use crate::process;
    use crate::repository::{resolve, Layout};
    use crate::Component;
    use std::fs::File;
    use std::io::Write;
    use tempfile::TempDir;

    fn quiet_config(temp: &TempDir) -> SessionConfig {
        SessionConfig {
            repo_root: temp.path().to_path_buf(),
            dest_root: temp.path().to_path_buf(),
            tmp_dir: temp.path().to_path_buf(),
            verbosity: Verbosity::Quiet,
        }
    }

    fn write_file(path: &Path, contents: &[u8]) {
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        let mut file = File::create(path).unwrap();
        file.write_all(contents).unwrap();
    }

    /// Build a small gzipped tarball with the host tar. Returns false when
    /// the tool is unavailable and the caller should skip.
    fn make_fixture_tgz(temp: &TempDir, archive: &Path) -> bool {
        if !process::exists("tar") {
            eprintln!("tar not available; skipping");
            return false;
        }
        let tree = temp.path().join("fixture-tree");
        write_file(&tree.join("etc/rc.conf"), b"hostname=\"test\"\n");
        write_file(&tree.join("bin/sh"), b"#!/bin/sh\n");
        fs::create_dir_all(archive.parent().unwrap()).unwrap();
        let status = Cmd::new("tar")
            .args(&["-czf"])
            .arg_path(archive)
            .arg("-C")
            .arg_path(&tree)
            .arg(".")
            .quiet(true)
            .run()
            .unwrap();
        assert!(status.success());
        true
    }

    #[test]
    fn test_collect_shards_sorted() {
        let temp = TempDir::new().unwrap();
        let dir = temp.path().join("bin");
        write_file(&dir.join("bin.ac"), b"3");
        write_file(&dir.join("bin.aa"), b"1");
        write_file(&dir.join("bin.ab"), b"2");
        // Non-shard siblings must be ignored.
        write_file(&dir.join("bin.mtree"), b"");
        write_file(&dir.join("bin.tgz"), b"");
        write_file(&dir.join("other.aa"), b"");

        let shards = collect_shards(&dir, "bin").unwrap();
        let names: Vec<_> = shards
            .iter()
            .map(|p| p.file_name().unwrap().to_str().unwrap().to_string())
            .collect();
        assert_eq!(names, vec!["bin.aa", "bin.ab", "bin.ac"]);
    }

    #[test]
    fn test_collect_shards_empty_is_error() {
        let temp = TempDir::new().unwrap();
        fs::create_dir_all(temp.path().join("bin")).unwrap();
        assert!(collect_shards(&temp.path().join("bin"), "bin").is_err());
    }

    #[test]
    fn test_apply_base_manifests_skips_when_absent() {
        let temp = TempDir::new().unwrap();
        let dest = temp.path().join("jail");
        fs::create_dir_all(&dest).unwrap();
        // No etc/mtree at all: the pass must be a clean no-op even without
        // the mtree tool installed.
        apply_base_manifests(&dest, &quiet_config(&temp)).unwrap();
    }

    #[test]
    fn test_apply_base_manifests_idempotent() {
        if !process::exists("mtree") {
            eprintln!("mtree not available; skipping");
            return;
        }
        let temp = TempDir::new().unwrap();
        let dest = temp.path().join("jail");
        write_file(
            &dest.join("etc/mtree/BSD.root.dist"),
            b"/set type=dir mode=0755\n.\n    spool\n    ..\n..\n",
        );
        // Not mentioned by any manifest; the pass must leave it alone.
        write_file(&dest.join("unrelated.txt"), b"keep me");

        let config = quiet_config(&temp);
        apply_base_manifests(&dest, &config).unwrap();
        assert!(dest.join("spool").is_dir());

        let before = list_tree(&dest);
        apply_base_manifests(&dest, &config).unwrap();
        assert_eq!(list_tree(&dest), before);
        assert_eq!(fs::read(dest.join("unrelated.txt")).unwrap(), b"keep me");
    }

    fn list_tree(root: &Path) -> Vec<PathBuf> {
        let mut entries: Vec<PathBuf> = walkdir::WalkDir::new(root)
            .into_iter()
            .map(|entry| entry.unwrap().path().to_path_buf())
            .collect();
        entries.sort();
        entries
    }

    #[test]
    fn test_extract_monolithic() {
        let temp = TempDir::new().unwrap();
        let repo = temp.path().join("repo");
        if !make_fixture_tgz(&temp, &repo.join("base/base.tgz")) {
            return;
        }

        let resolution = resolve(&[Component::new("base/base")], &repo).unwrap();
        let dest = temp.path().join("jail");
        let report = extract(&resolution.present, &dest, &quiet_config(&temp)).unwrap();

        assert!(report.all_ok());
        assert!(dest.join("etc/rc.conf").is_file());
        assert!(dest.join("bin/sh").is_file());
    }

    #[test]
    fn test_extract_split_archive() {
        let temp = TempDir::new().unwrap();
        let whole = temp.path().join("whole.tgz");
        if !make_fixture_tgz(&temp, &whole) {
            return;
        }

        // Shard the tarball byte-wise, the way split(1) produced them.
        let bytes = fs::read(&whole).unwrap();
        let mid = bytes.len() / 2;
        let repo = temp.path().join("repo");
        write_file(&repo.join("bin/bin.aa"), &bytes[..mid]);
        write_file(&repo.join("bin/bin.ab"), &bytes[mid..]);

        let resolution = resolve(&[Component::new("bin/bin")], &repo).unwrap();
        assert_eq!(resolution.present[0].status(), "present-split");

        let dest = temp.path().join("jail");
        let report = extract(&resolution.present, &dest, &quiet_config(&temp)).unwrap();
        assert!(report.all_ok(), "{}", report.summary());
        assert!(dest.join("etc/rc.conf").is_file());
    }

    #[test]
    fn test_extract_failure_does_not_abort_remaining() {
        let temp = TempDir::new().unwrap();
        let repo = temp.path().join("repo");
        if !make_fixture_tgz(&temp, &repo.join("doc/doc.tgz")) {
            return;
        }
        // Garbage archive first: it must fail without taking doc/doc down.
        write_file(&repo.join("base/base.tgz"), b"this is not a tarball");

        let resolution = resolve(
            &[Component::new("base/base"), Component::new("doc/doc")],
            &repo,
        )
        .unwrap();
        let dest = temp.path().join("jail");
        let report = extract(&resolution.present, &dest, &quiet_config(&temp)).unwrap();

        assert!(!report.all_ok());
        assert_eq!(report.outcomes.len(), 2);
        assert!(!report.outcomes[0].ok());
        assert!(report.outcomes[1].ok());
        assert!(dest.join("etc/rc.conf").is_file());
        assert!(report.summary().contains("FAILED"));
    }

    #[test]
    fn test_extract_creates_destination() {
        let temp = TempDir::new().unwrap();
        let dest = temp.path().join("deep/nested/jail");
        let report = extract(&[], &dest, &quiet_config(&temp)).unwrap();
        assert!(report.all_ok());
        assert!(dest.is_dir());
    }

    #[test]
    fn test_status_display_values() {
        let temp = TempDir::new().unwrap();
        let repo = temp.path().join("repo");
        write_file(&repo.join("dists/base/base.tgz"), b"x");
        let resolution = resolve(&[Component::new("base/base")], &repo).unwrap();
        assert_eq!(resolution.present[0].layout, Layout::LegacyDists);
        assert_eq!(resolution.present[0].status(), "present-legacy-subdir");
    }
}
