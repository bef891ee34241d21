//! Host tool validation.
//!
//! The whole session is a front end for `dialog`, `tar`, and `mtree`;
//! checking for them up front prevents cryptic failures halfway through an
//! extraction.

use anyhow::{bail, Result};

use crate::process;

/// Required host tools. Each tuple is (command, providing package).
pub const REQUIRED_TOOLS: &[(&str, &str)] = &[
    ("dialog", "dialog"),
    ("tar", "tar"),
    ("mtree", "mtree"),
];

/// Check that specific tools are available on PATH.
pub fn check_required_tools(tools: &[(&str, &str)]) -> Result<()> {
    let mut missing = Vec::new();

    for (tool, package) in tools {
        if !process::exists(tool) {
            missing.push((*tool, *package));
        }
    }

    if !missing.is_empty() {
        let msg = missing
            .iter()
            .map(|(t, p)| format!("  {} (install: {})", t, p))
            .collect::<Vec<_>>()
            .join("\n");
        bail!("missing required host tools:\n{}", msg);
    }

    Ok(())
}

/// Check for all tools the session invokes.
pub fn check_host_tools() -> Result<()> {
    check_required_tools(REQUIRED_TOOLS)
}
