//! Cabal project descriptors and the command lines derived from them

use std::borrow::Cow;
use std::path::{Path, PathBuf};

/// A Haskell project identified by its `.cabal` descriptor file.
///
/// The descriptor's parent directory is the project root; every toolchain
/// command runs there. Commands address the project by the descriptor's
/// file name, which cabal accepts as a target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CabalProject {
    cabal_file: PathBuf,
}

impl CabalProject {
    /// Create a project from the resolved path of its `.cabal` file.
    pub fn new(cabal_file: impl Into<PathBuf>) -> Self {
        Self {
            cabal_file: cabal_file.into(),
        }
    }

    /// Project root directory (the descriptor's parent).
    pub fn dir(&self) -> &Path {
        match self.cabal_file.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        }
    }

    /// The descriptor's file name, used as the cabal target.
    pub fn target(&self) -> Cow<'_, str> {
        self.cabal_file
            .file_name()
            .map(|name| name.to_string_lossy())
            .unwrap_or(Cow::Borrowed(""))
    }

    /// One-shot GHCJS cross build of the project.
    pub fn build_command(&self) -> String {
        format!("js-unknown-ghcjs-cabal build {}", self.target())
    }

    /// Run command used only to discover the output directory.
    ///
    /// The cross-compiled binary can never execute on the host, so the
    /// command carries `|| true` to keep the shell exit status quiet.
    /// `cabal list-bins` would be the clean way to get the path, but it
    /// only exists from cabal 3.4 on.
    pub fn run_command(&self) -> String {
        format!("js-unknown-ghcjs-cabal run {} || true", self.target())
    }

    /// Long-running ghcid watch that keeps a jsaddle server alive.
    pub fn watch_command(&self) -> String {
        format!("ghcid -r -W -c\"cabal repl {}\"", self.target())
    }
}
