//! The operator session.
//!
//! A strictly forward pipeline: pick a release, enter a destination, resolve
//! the planned sets against the repository, review, confirm, extract. No
//! state is revisited; a declined or escaped prompt anywhere becomes
//! [`SessionError::Cancelled`] and the session exits with no side effects
//! beyond any directory the operator already consented to create.

use std::ffi::CString;
use std::fs;
use std::os::unix::ffi::OsStrExt;
use std::path::{Component as PathComponent, Path, PathBuf};

use anyhow::{bail, Context, Result};
use log::debug;

use crate::catalog::{self, ReleaseRepository};
use crate::config::SessionConfig;
use crate::error::SessionError;
use crate::extract;
use crate::planner;
use crate::prompt::{MenuOption, Prompter, TreeNode};
use crate::repository::{self, Resolution};

#[derive(Debug, Clone, Copy)]
enum Phase {
    SelectingRepository,
    EnteringDestination,
    ResolvingComponents,
    ReviewingPlan,
    ConfirmingExtraction,
    Extracting,
    Done,
}

fn enter(phase: Phase) {
    debug!("session phase: {:?}", phase);
}

/// Where the jail root is materialized.
#[derive(Debug, Clone)]
pub struct JailTarget {
    pub dest_dir: PathBuf,
    pub parent_dir: PathBuf,
}

impl JailTarget {
    pub fn new(dest_dir: PathBuf) -> Result<Self> {
        let parent_dir = match dest_dir.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => bail!(
                "destination '{}' has no usable parent directory",
                dest_dir.display()
            ),
        };
        Ok(Self { dest_dir, parent_dir })
    }
}

/// Run one full operator session.
///
/// Returns `Ok(())` on success, including runs where individual sets failed
/// to extract (those are surfaced in the closing summary only).
pub fn run(config: &SessionConfig, prompter: &mut dyn Prompter) -> Result<()> {
    enter(Phase::SelectingRepository);
    let repos = catalog::list(&config.repo_root)?;
    let repo = select_repository(prompter, config, &repos)?;

    enter(Phase::EnteringDestination);
    let target = enter_destination(prompter, config)?;

    enter(Phase::ResolvingComponents);
    let planned = planner::plan(&repo.release_id);
    let resolution = repository::resolve(&planned, &repo.path)?;

    enter(Phase::ReviewingPlan);
    review_plan(prompter, repo, &resolution)?;

    enter(Phase::ConfirmingExtraction);
    confirm_extraction(prompter, &resolution, &target)?;

    enter(Phase::Extracting);
    prompter.infobox(
        "Extracting",
        &format!(
            "Unpacking {} distribution sets into {}...",
            resolution.present.len(),
            target.dest_dir.display()
        ),
    )?;
    let report = extract::extract(&resolution.present, &target.dest_dir, config)?;

    enter(Phase::Done);
    let title = if report.all_ok() {
        "Jail created"
    } else {
        "Jail created with errors"
    };
    let mut summary = report.summary();
    if summary.is_empty() {
        summary = "No sets were extracted.".to_string();
    }
    prompter.infobox(title, &summary)?;
    Ok(())
}

fn cancelled<T>() -> Result<T> {
    Err(SessionError::Cancelled.into())
}

fn select_repository<'a>(
    prompter: &mut dyn Prompter,
    config: &SessionConfig,
    repos: &'a [ReleaseRepository],
) -> Result<&'a ReleaseRepository> {
    let options: Vec<MenuOption> = repos
        .iter()
        .enumerate()
        .map(|(index, repo)| {
            let shown = repo
                .path
                .strip_prefix(&config.repo_root)
                .unwrap_or(&repo.path);
            MenuOption::new((index + 1).to_string(), shown.display().to_string())
        })
        .collect();

    let Some(tag) = prompter.menu(
        "Source repository",
        "Select the release to build the jail from:",
        &options,
    )?
    else {
        return cancelled();
    };

    let index: usize = tag
        .parse()
        .with_context(|| format!("unexpected menu selection '{}'", tag))?;
    repos
        .get(index.wrapping_sub(1))
        .with_context(|| format!("menu selection '{}' out of range", tag))
}

fn enter_destination(
    prompter: &mut dyn Prompter,
    config: &SessionConfig,
) -> Result<JailTarget> {
    let seed = config.dest_root.display().to_string();
    let Some(text) = prompter.inputbox(
        "Jail destination",
        "Directory to materialize the jail root in:",
        &seed,
    )?
    else {
        return cancelled();
    };
    let text = text.trim();
    if text.is_empty() {
        return cancelled();
    }

    let dest_dir = normalize(Path::new(text))?;
    let target = JailTarget::new(dest_dir)?;

    if !target.parent_dir.exists() {
        let create = prompter.yesno(
            "Create directory",
            &format!(
                "{} does not exist.\nCreate it?",
                target.parent_dir.display()
            ),
        )?;
        if !create {
            return cancelled();
        }
        fs::create_dir_all(&target.parent_dir)
            .with_context(|| format!("creating '{}'", target.parent_dir.display()))?;
    }

    // The effective write target is the jail dir when it already exists,
    // its parent otherwise.
    let probe = if target.dest_dir.exists() {
        &target.dest_dir
    } else {
        &target.parent_dir
    };
    if !is_writable(probe) {
        return Err(SessionError::PermissionDenied(probe.clone()).into());
    }
    Ok(target)
}

fn review_plan(
    prompter: &mut dyn Prompter,
    repo: &ReleaseRepository,
    resolution: &Resolution,
) -> Result<()> {
    let mut nodes = Vec::new();
    if !resolution.missing.is_empty() {
        nodes.push(TreeNode::new(0, "Missing sets (will be skipped):"));
        for set in &resolution.missing {
            nodes.push(TreeNode::new(1, format!("{} [MISSING]", set.name)));
        }
    }
    nodes.push(TreeNode::new(0, "Present sets:"));
    if resolution.present.is_empty() {
        nodes.push(TreeNode::new(1, "(none)"));
    }
    for set in &resolution.present {
        nodes.push(TreeNode::new(1, format!("{} [{}]", set.component.name, set.status())));
    }

    let confirmed = prompter.tree(
        "Distribution sets",
        &format!("Sets planned for release {}:", repo.release_id),
        &nodes,
    )?;
    if !confirmed {
        return cancelled();
    }
    Ok(())
}

fn confirm_extraction(
    prompter: &mut dyn Prompter,
    resolution: &Resolution,
    target: &JailTarget,
) -> Result<()> {
    let message = format!(
        "Extract {} distribution sets into {}?",
        resolution.present.len(),
        target.dest_dir.display()
    );
    if !prompter.yesno("Proceed with extraction", &message)? {
        return cancelled();
    }
    Ok(())
}

/// Lexically absolute-ize and clean a path: resolve against the current
/// directory, drop `.` components, apply `..`. No filesystem access, since
/// the destination usually does not exist yet.
fn normalize(path: &Path) -> Result<PathBuf> {
    let absolute = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir()
            .context("resolving current directory")?
            .join(path)
    };

    let mut out = PathBuf::new();
    for component in absolute.components() {
        match component {
            PathComponent::CurDir => {}
            PathComponent::ParentDir => {
                out.pop();
            }
            other => out.push(other),
        }
    }
    Ok(out)
}

/// Writability of `path` for the invoking user, honoring effective
/// credentials rather than mode bits alone.
fn is_writable(path: &Path) -> bool {
    let Ok(cpath) = CString::new(path.as_os_str().as_bytes()) else {
        return false;
    };
    unsafe { libc::access(cpath.as_ptr(), libc::W_OK) == 0 }
}
