//! `dialog(1)` implementation of [`Prompter`].
//!
//! dialog reports the operator's answer on stderr, so each exchange
//! redirects stderr into a scratch file under the configured temp dir. The
//! scratch file lives only for the duration of one exchange and is removed
//! as soon as it has been read, whatever the outcome.

use std::fs::{self, File};
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use anyhow::{bail, Context, Result};

use super::{MenuOption, Prompter, TreeNode};

// dialog exit statuses.
const DIALOG_OK: i32 = 0;
const DIALOG_CANCEL: i32 = 1;
const DIALOG_ESC: i32 = 255;

const MAX_WIDTH: usize = 76;
const MAX_HEIGHT: usize = 20;

enum Answer {
    Affirmative(String),
    Declined,
}

pub struct DialogPrompter {
    program: String,
    tmp_dir: PathBuf,
    exchange: u32,
}

impl DialogPrompter {
    pub fn new(tmp_dir: &Path) -> Self {
        Self::with_program("dialog", tmp_dir)
    }

    /// Use a different front-end binary with the same exit-status contract.
    fn with_program(program: &str, tmp_dir: &Path) -> Self {
        Self {
            program: program.to_string(),
            tmp_dir: tmp_dir.to_path_buf(),
            exchange: 0,
        }
    }

    fn scratch_path(&mut self) -> PathBuf {
        self.exchange += 1;
        self.tmp_dir
            .join(format!("mkjail-{}-{}", std::process::id(), self.exchange))
    }

    fn run_dialog(&mut self, args: &[String]) -> Result<Answer> {
        let scratch = self.scratch_path();
        let sink = File::create(&scratch)
            .with_context(|| format!("creating scratch file '{}'", scratch.display()))?;

        let status = Command::new(&self.program)
            .args(args)
            .stderr(Stdio::from(sink))
            .status()
            .with_context(|| format!("running '{}'", self.program));

        let text = fs::read_to_string(&scratch).unwrap_or_default();
        let _ = fs::remove_file(&scratch);
        let status = status?;

        match status.code() {
            Some(DIALOG_OK) => Ok(Answer::Affirmative(text.trim_end().to_string())),
            Some(DIALOG_CANCEL) | Some(DIALOG_ESC) => Ok(Answer::Declined),
            other => bail!("dialog exited with unexpected status {:?}", other),
        }
    }
}

impl Prompter for DialogPrompter {
    fn infobox(&mut self, title: &str, message: &str) -> Result<()> {
        let (height, width) = geometry(message);
        self.run_dialog(&args(
            title,
            "--infobox",
            &[message, &height.to_string(), &width.to_string()],
        ))?;
        Ok(())
    }

    fn menu(
        &mut self,
        title: &str,
        hint: &str,
        options: &[MenuOption],
    ) -> Result<Option<String>> {
        let (_, width) = geometry(hint);
        let menu_height = options.len().min(10);
        let height = menu_height + 8;
        let mut dialog_args = args(
            title,
            "--menu",
            &[
                hint,
                &height.to_string(),
                &width.to_string(),
                &menu_height.to_string(),
            ],
        );
        for option in options {
            dialog_args.push(option.tag.clone());
            dialog_args.push(option.label.clone());
        }
        match self.run_dialog(&dialog_args)? {
            Answer::Affirmative(tag) => Ok(Some(tag)),
            Answer::Declined => Ok(None),
        }
    }

    fn inputbox(&mut self, title: &str, prompt: &str, default: &str) -> Result<Option<String>> {
        let (height, width) = geometry(prompt);
        match self.run_dialog(&args(
            title,
            "--inputbox",
            &[prompt, &(height + 3).to_string(), &width.to_string(), default],
        ))? {
            Answer::Affirmative(text) => Ok(Some(text)),
            Answer::Declined => Ok(None),
        }
    }

    fn yesno(&mut self, title: &str, message: &str) -> Result<bool> {
        let (height, width) = geometry(message);
        match self.run_dialog(&args(
            title,
            "--yesno",
            &[message, &height.to_string(), &width.to_string()],
        ))? {
            Answer::Affirmative(_) => Ok(true),
            Answer::Declined => Ok(false),
        }
    }

    fn tree(&mut self, title: &str, hint: &str, nodes: &[TreeNode]) -> Result<bool> {
        let mut body = String::from(hint);
        body.push('\n');
        for node in nodes {
            body.push('\n');
            for _ in 0..node.depth {
                body.push_str("  ");
            }
            body.push_str(&node.text);
        }
        let (height, width) = geometry(&body);
        match self.run_dialog(&args(
            title,
            "--msgbox",
            &[&body, &height.to_string(), &width.to_string()],
        ))? {
            Answer::Affirmative(_) => Ok(true),
            Answer::Declined => Ok(false),
        }
    }
}

fn args(title: &str, widget: &str, rest: &[&str]) -> Vec<String> {
    let mut out = vec!["--title".to_string(), title.to_string(), widget.to_string()];
    out.extend(rest.iter().map(|s| s.to_string()));
    out
}

/// Fit a box to the message: lines + frame, longest line + frame, clamped.
fn geometry(message: &str) -> (usize, usize) {
    let lines = message.lines().count().max(1);
    let longest = message.lines().map(str::len).max().unwrap_or(0);
    let height = (lines + 4).min(MAX_HEIGHT);
    let width = (longest + 6).clamp(40, MAX_WIDTH);
    (height, width)
}
