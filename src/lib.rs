//! Interactive builder for FreeBSD jail root filesystems.
//!
//! mkjail walks an operator through turning a pre-fetched binary release
//! repository into a jail root: pick a release, pick a destination, review
//! which distribution sets are actually on disk, confirm, then unpack and
//! mtree-normalize the tree. The heavy lifting stays in the host tools
//! (`tar`, `mtree`, `dialog`); this crate supplies the planning and the
//! orchestration around them.
//!
//! # Architecture
//!
//! ```text
//! catalog     - find <version>-RELEASE/-STABLE/-CURRENT dirs under the repo root
//! planner     - release id -> ordered distribution-set list (pure rule table)
//! repository  - which planned sets exist on disk, and in which layout
//! extract     - drive tar/mtree per present set, then the final mtree pass
//! prompt      - Prompter trait + the dialog(1) implementation
//! session     - the forward-only operator pipeline tying it together
//! ```
//!
//! Everything fallible returns `anyhow::Result`; session-terminal conditions
//! (bad configuration, empty catalog, cancellation, unwritable destination)
//! are carried as [`SessionError`] so the binary can map them to exit codes.

pub mod catalog;
pub mod config;
pub mod error;
pub mod extract;
pub mod planner;
pub mod preflight;
pub mod process;
pub mod prompt;
pub mod repository;
pub mod session;

pub use config::{SessionConfig, Verbosity};
pub use error::SessionError;
pub use planner::{plan, Component};
