//! Error types for toolchain orchestration

use miette::Diagnostic;
use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while driving the GHCJS/cabal toolchain
#[derive(Error, Debug, Diagnostic)]
pub enum ToolchainError {
    /// An external command could not be launched at all
    #[error("Failed to spawn toolchain process: {source}")]
    #[diagnostic(
        code(thunk::toolchain::spawn_failed),
        help("Check that nix-shell is installed and available in your PATH")
    )]
    SpawnFailed {
        #[source]
        source: std::io::Error,
    },

    /// Captured command output was not valid UTF-8
    #[error("Toolchain output was not valid UTF-8: {source}")]
    #[diagnostic(code(thunk::toolchain::non_utf8_output))]
    NonUtf8Output {
        #[source]
        source: std::string::FromUtf8Error,
    },

    /// `cabal run` stderr ended before the expected diagnostic line
    #[error("cabal run produced no diagnostic output to parse")]
    #[diagnostic(
        code(thunk::toolchain::truncated_run_output),
        help("`cabal run` is expected to end stderr with a `createProcess` failure for the cross-compiled binary")
    )]
    TruncatedRunOutput,

    /// The diagnostic line did not contain the `createProcess` marker
    #[error("Expected a `: createProcess:` diagnostic, got {line:?}")]
    #[diagnostic(
        code(thunk::toolchain::missing_run_diagnostic),
        help("The toolchain's diagnostic wording may have changed; the output-directory parser keys on it")
    )]
    MissingRunDiagnostic { line: String },

    /// The linked bundle could not be read from the parsed output directory
    #[error("Failed to read compiled artifact {}: {}", path.display(), source)]
    #[diagnostic(code(thunk::toolchain::artifact_read))]
    ArtifactRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The bundle did not contain exactly one startup invocation
    #[error("Expected to find one h$main invocation in all.js, but found {found}")]
    #[diagnostic(
        code(thunk::toolchain::startup_patch_count),
        help("The GHCJS linker output format may have changed; the synchronous-start patch needs a single h$main call")
    )]
    StartupPatchCount { found: usize },
}

impl ToolchainError {
    pub fn spawn_failed(source: std::io::Error) -> Self {
        Self::SpawnFailed { source }
    }

    pub fn non_utf8_output(source: std::string::FromUtf8Error) -> Self {
        Self::NonUtf8Output { source }
    }

    pub fn missing_run_diagnostic(line: impl Into<String>) -> Self {
        Self::MissingRunDiagnostic { line: line.into() }
    }

    pub fn artifact_read(path: PathBuf, source: std::io::Error) -> Self {
        Self::ArtifactRead { path, source }
    }

    pub fn startup_patch_count(found: usize) -> Self {
        Self::StartupPatchCount { found }
    }
}
