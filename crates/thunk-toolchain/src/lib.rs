//! GHCJS/cabal toolchain orchestration for the thunk bundler plugin
//!
//! This crate wraps everything that talks to the external Haskell toolchain:
//!
//! - running `cabal` commands inside a `nix-shell` environment
//!   ([`NixShell`], [`ToolRunner`])
//! - discovering the output directory from `cabal run` diagnostics
//!   ([`artifact_dir_from_run_stderr`])
//! - rewriting the linked bundle's startup invocation from asynchronous to
//!   synchronous ([`patch_sync_startup`])
//! - supervising the long-running `ghcid` watch process ([`WatchProcess`])
//!
//! No bundler types appear here; the companion `thunk-plugin-cabal` crate
//! composes these primitives into Rolldown hook implementations. The text
//! parsing lives behind narrow functions on purpose: it is a fragile
//! contract with the toolchain's unstructured diagnostics and should be
//! swappable without touching orchestration code.

mod artifact;
mod error;
mod parse;
mod project;
mod runner;
mod watch;

pub use artifact::{patch_sync_startup, read_artifact, ARTIFACT_FILE_NAME};
pub use error::ToolchainError;
pub use parse::artifact_dir_from_run_stderr;
pub use project::CabalProject;
pub use runner::{CommandOutput, NixShell, ToolRunner};
pub use watch::{WatchExit, WatchProcess};
