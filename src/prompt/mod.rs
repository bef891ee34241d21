//! Operator prompting.
//!
//! The session talks to the operator exclusively through the [`Prompter`]
//! trait; the production implementation drives `dialog(1)` (see
//! [`dialog::DialogPrompter`]). Every prompt is modal: the call blocks until
//! the operator answers. Cancellation is an ordinary return value
//! (`None`/`false`), not an error — the session maps it to
//! `SessionError::Cancelled`.

pub mod dialog;

use anyhow::Result;

/// One selectable menu entry.
#[derive(Debug, Clone)]
pub struct MenuOption {
    /// Stable identifier returned on selection.
    pub tag: String,
    /// Human-readable description.
    pub label: String,
}

impl MenuOption {
    pub fn new(tag: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            label: label.into(),
        }
    }
}

/// One line of a review listing, indented by `depth`.
#[derive(Debug, Clone)]
pub struct TreeNode {
    pub depth: usize,
    pub text: String,
}

impl TreeNode {
    pub fn new(depth: usize, text: impl Into<String>) -> Self {
        Self {
            depth,
            text: text.into(),
        }
    }
}

/// Modal operator prompts.
pub trait Prompter {
    /// Transient notice; does not wait for acknowledgement.
    fn infobox(&mut self, title: &str, message: &str) -> Result<()>;

    /// Single selection from an ordered list. `None` means cancelled.
    fn menu(
        &mut self,
        title: &str,
        hint: &str,
        options: &[MenuOption],
    ) -> Result<Option<String>>;

    /// Free-text entry seeded with `default`. `None` means cancelled.
    fn inputbox(&mut self, title: &str, prompt: &str, default: &str) -> Result<Option<String>>;

    /// Yes/no confirmation. `false` means declined.
    fn yesno(&mut self, title: &str, message: &str) -> Result<bool>;

    /// Review listing; `false` means cancelled.
    fn tree(&mut self, title: &str, hint: &str, nodes: &[TreeNode]) -> Result<bool>;
}
