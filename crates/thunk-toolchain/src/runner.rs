//! Shell-wrapped execution of toolchain commands
//!
//! Every toolchain invocation goes through `nix-shell -A <attr> --run`,
//! so the GHCJS cross compiler and ghcid come from the project's pinned
//! environment rather than the host PATH. The [`ToolRunner`] trait exists
//! so the batch pipeline can be exercised against canned outputs in tests.

use crate::error::ToolchainError;
use async_trait::async_trait;
use std::path::Path;
use std::process::{ExitStatus, Stdio};
use tokio::process::Command;

/// Captured output of a finished toolchain command.
#[derive(Debug, Clone)]
pub struct CommandOutput {
    pub status: ExitStatus,
    pub stdout: String,
    pub stderr: String,
}

/// Executes toolchain command lines in a project directory.
///
/// Spawn-level failure ("executable not found") is the only error either
/// method reports; a non-zero exit status is returned to the caller
/// untouched, because cabal's exit codes carry no signal the pipeline can
/// use (an up-to-date build and a failed one both surface through output).
#[async_trait]
pub trait ToolRunner: Send + Sync {
    /// Run a command to completion with stdio inherited from the host, so
    /// compiler progress streams straight to the user.
    async fn run_streaming(&self, command: &str, cwd: &Path)
        -> Result<ExitStatus, ToolchainError>;

    /// Run a command to completion, capturing stdout and stderr.
    async fn run_captured(&self, command: &str, cwd: &Path)
        -> Result<CommandOutput, ToolchainError>;
}

/// Runs commands inside a `nix-shell` attribute (e.g. `shells.ghcjs`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NixShell {
    attr: String,
}

impl NixShell {
    /// Create a runner for the given shell attribute.
    pub fn new(attr: impl Into<String>) -> Self {
        Self { attr: attr.into() }
    }

    /// The shell attribute this runner activates.
    pub fn attr(&self) -> &str {
        &self.attr
    }

    /// Prepared `nix-shell` invocation for `command` in `cwd`.
    ///
    /// Stdio is left at the tokio default (inherited); callers that need
    /// to parse output pipe it explicitly.
    pub fn command(&self, command: &str, cwd: &Path) -> Command {
        let mut cmd = Command::new("nix-shell");
        cmd.arg("-A")
            .arg(&self.attr)
            .arg("--run")
            .arg(command)
            .current_dir(cwd);
        cmd
    }
}

#[async_trait]
impl ToolRunner for NixShell {
    async fn run_streaming(
        &self,
        command: &str,
        cwd: &Path,
    ) -> Result<ExitStatus, ToolchainError> {
        self.command(command, cwd)
            .status()
            .await
            .map_err(ToolchainError::spawn_failed)
    }

    async fn run_captured(
        &self,
        command: &str,
        cwd: &Path,
    ) -> Result<CommandOutput, ToolchainError> {
        let output = self
            .command(command, cwd)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .await
            .map_err(ToolchainError::spawn_failed)?;

        Ok(CommandOutput {
            status: output.status,
            stdout: String::from_utf8(output.stdout).map_err(ToolchainError::non_utf8_output)?,
            stderr: String::from_utf8(output.stderr).map_err(ToolchainError::non_utf8_output)?,
        })
    }
}
