//! Error types for the cabal plugin

use miette::Diagnostic;
use thiserror::Error;
use thunk_toolchain::ToolchainError;

/// Errors surfaced by a `load` invocation of the plugin
#[derive(Error, Debug, Diagnostic)]
pub enum LoaderError {
    /// Toolchain orchestration failed
    #[error(transparent)]
    #[diagnostic(transparent)]
    Toolchain(#[from] ToolchainError),

    /// The jsaddle dev server is reachable but answered non-200
    ///
    /// Unlike transport errors this is never retried: a server that is up
    /// and answering with an error is a configuration problem, not a
    /// startup race.
    #[error("jsaddle dev server answered with status {status}")]
    #[diagnostic(
        code(thunk::cabal::dev_server_status),
        help("The dev server is up but unhealthy; check the ghcid output")
    )]
    DevServerStatus { status: u16 },

    /// The probe budget ran out before the dev server came up
    ///
    /// Only reachable when a bounded `max_attempts` is configured; the
    /// production default probes forever.
    #[error("jsaddle dev server did not come up after {attempts} probes")]
    #[diagnostic(
        code(thunk::cabal::probe_attempts_exhausted),
        help("Is the ghcid watch process running and serving jsaddle?")
    )]
    ProbeAttemptsExhausted { attempts: u32 },
}
