//! Supervision of the long-running ghcid watch process
//!
//! In dev mode the server side of the build keeps a `ghcid` process alive
//! for the whole session; it recompiles on change and restarts the jsaddle
//! server. The process is expected to never terminate, so any exit is an
//! unrecoverable fault. Because the bundler hook has already reported
//! success by the time the process can die, the exit is published on a
//! watch channel that the host can subscribe to after the fact.

use crate::error::ToolchainError;
use tokio::process::Command;
use tokio::sync::watch;
use tracing::error;

/// Terminal state of a watch process.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WatchExit {
    /// Exit code, if the process exited normally; `None` for signals or
    /// wait failures.
    pub code: Option<i32>,
}

/// Handle to a spawned, supervised watch process.
///
/// Dropping the handle does not terminate the process; there is no
/// cancellation short of the host going away, matching the lifetime of a
/// build session.
#[derive(Debug)]
pub struct WatchProcess {
    exited: watch::Receiver<Option<WatchExit>>,
}

impl WatchProcess {
    /// Spawn `command` and start supervising it.
    ///
    /// Returns as soon as the spawn succeeds. There is no readiness
    /// signal: ghcid gives us nothing to synchronize on, so callers
    /// proceed immediately and the companion dev-server probe covers the
    /// gap on the client side.
    pub fn spawn(mut command: Command) -> Result<Self, ToolchainError> {
        let mut child = command.spawn().map_err(ToolchainError::spawn_failed)?;
        let (tx, rx) = watch::channel(None);

        tokio::spawn(async move {
            let exit = match child.wait().await {
                Ok(status) => {
                    error!(
                        code = ?status.code(),
                        "watch process stopped; live reload is gone for this session"
                    );
                    WatchExit {
                        code: status.code(),
                    }
                }
                Err(err) => {
                    error!(error = %err, "failed waiting on watch process");
                    WatchExit { code: None }
                }
            };
            let _ = tx.send(Some(exit));
        });

        Ok(Self { exited: rx })
    }

    /// Channel carrying the exit notification once the process dies.
    pub fn exited(&self) -> watch::Receiver<Option<WatchExit>> {
        self.exited.clone()
    }

    /// Whether the process has already terminated.
    pub fn has_exited(&self) -> bool {
        self.exited.borrow().is_some()
    }

    /// Wait for the process to terminate.
    pub async fn wait_exited(&self) -> WatchExit {
        let mut rx = self.exited.clone();
        loop {
            if let Some(exit) = *rx.borrow() {
                return exit;
            }
            if rx.changed().await.is_err() {
                // Supervisor task gone without publishing; treat as abnormal.
                return WatchExit { code: None };
            }
        }
    }
}
