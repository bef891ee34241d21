//! Thin builder over `std::process::Command` for driving host tools.
//!
//! Every external invocation in this crate goes through [`Cmd`], so argument
//! handling, output suppression, and failure reporting stay uniform. stderr
//! is always inherited so tool diagnostics reach the operator; stdout is
//! nulled when `quiet` is set.

use anyhow::{bail, Context, Result};
use std::ffi::OsString;
use std::fs::File;
use std::io;
use std::path::{Path, PathBuf};
use std::process::{Command, ExitStatus, Stdio};

/// Check whether a tool is available on PATH.
pub fn exists(tool: &str) -> bool {
    which::which(tool).is_ok()
}

/// Builder for a single external tool invocation.
///
/// Invocations are attempted exactly once; there is no retry logic.
///
/// # Example
///
/// ```rust,ignore
/// use mkjail::process::Cmd;
/// use std::path::Path;
///
/// Cmd::new("tar")
///     .args(&["-xpU", "-f"])
///     .arg_path(Path::new("base.tgz"))
///     .arg("-C")
///     .arg_path(Path::new("/usr/jail/test1"))
///     .run()?;
/// ```
pub struct Cmd {
    program: String,
    args: Vec<OsString>,
    quiet: bool,
    allow_fail: bool,
    error_msg: Option<String>,
}

impl Cmd {
    pub fn new(program: &str) -> Self {
        Self {
            program: program.to_string(),
            args: Vec::new(),
            quiet: false,
            allow_fail: false,
            error_msg: None,
        }
    }

    pub fn arg(mut self, arg: &str) -> Self {
        self.args.push(OsString::from(arg));
        self
    }

    pub fn args(mut self, args: &[&str]) -> Self {
        for arg in args {
            self.args.push(OsString::from(arg));
        }
        self
    }

    pub fn arg_path(mut self, path: &Path) -> Self {
        self.args.push(path.as_os_str().to_os_string());
        self
    }

    /// Discard the tool's stdout.
    pub fn quiet(mut self, quiet: bool) -> Self {
        self.quiet = quiet;
        self
    }

    /// Return the exit status instead of failing on non-zero exit.
    pub fn allow_fail(mut self) -> Self {
        self.allow_fail = true;
        self
    }

    /// Replace the default failure message.
    pub fn error_msg(mut self, msg: &str) -> Self {
        self.error_msg = Some(msg.to_string());
        self
    }

    /// Run to completion with inherited stdin.
    pub fn run(self) -> Result<ExitStatus> {
        let mut command = Command::new(&self.program);
        command.args(&self.args);
        if self.quiet {
            command.stdout(Stdio::null());
        }
        log::debug!("running: {}", self.render());
        let status = command
            .status()
            .with_context(|| format!("running '{}'", self.program))?;
        self.check(status)
    }

    /// Run with the concatenated contents of `inputs` streamed to stdin,
    /// in the order given.
    pub fn run_streamed(self, inputs: &[PathBuf]) -> Result<ExitStatus> {
        let mut command = Command::new(&self.program);
        command.args(&self.args).stdin(Stdio::piped());
        if self.quiet {
            command.stdout(Stdio::null());
        }
        log::debug!("running (streamed, {} inputs): {}", inputs.len(), self.render());
        let mut child = command
            .spawn()
            .with_context(|| format!("running '{}'", self.program))?;

        let mut stream_err = None;
        {
            let mut stdin = child
                .stdin
                .take()
                .with_context(|| format!("no stdin handle for '{}'", self.program))?;
            for input in inputs {
                let result = File::open(input)
                    .with_context(|| format!("opening '{}'", input.display()))
                    .and_then(|mut file| {
                        io::copy(&mut file, &mut stdin)
                            .with_context(|| format!("streaming '{}'", input.display()))
                    });
                if let Err(err) = result {
                    stream_err = Some(err);
                    break;
                }
            }
            // stdin drops here so the child sees EOF
        }

        let status = child
            .wait()
            .with_context(|| format!("waiting for '{}'", self.program))?;
        if let Some(err) = stream_err {
            // The child may have died first; its status is the better story.
            if !status.success() {
                return self.check(status);
            }
            return Err(err);
        }
        self.check(status)
    }

    fn check(self, status: ExitStatus) -> Result<ExitStatus> {
        if status.success() || self.allow_fail {
            return Ok(status);
        }
        match self.error_msg {
            Some(msg) => bail!("{} (exit status: {})", msg, status),
            None => bail!("'{}' failed with {}", self.program, status),
        }
    }

    fn render(&self) -> String {
        let mut out = self.program.clone();
        for arg in &self.args {
            out.push(' ');
            out.push_str(&arg.to_string_lossy());
        }
        out
    }
}
