//! Batch build pipeline
//!
//! The production path: compile the project with the GHCJS cross
//! toolchain, locate the linked bundle, rewrite its startup to run
//! synchronously, and wrap it in the adapter module the bundler graph
//! imports. Every step failure aborts the whole pipeline; no partial
//! module is ever returned.

use crate::emit;
use crate::error::LoaderError;
use thunk_toolchain::{
    artifact_dir_from_run_stderr, patch_sync_startup, read_artifact, CabalProject, ToolRunner,
};
use tracing::{debug, info};

/// Run the full batch pipeline and return the wrapper module.
///
/// Only spawn-level failures of the two cabal commands are fatal; their
/// exit codes are ignored (an up-to-date build prints nothing useful, and
/// the run command is expected to fail on the host anyway).
pub async fn build_wrapper_module(
    runner: &dyn ToolRunner,
    project: &CabalProject,
) -> Result<String, LoaderError> {
    // Compiler output streams straight to the user.
    let status = runner
        .run_streaming(&project.build_command(), project.dir())
        .await?;
    debug!(code = ?status.code(), "[thunk-cabal] ghcjs build finished");

    // Running the target is the only way to learn the output directory;
    // the diagnostic from the inevitable exec failure names it.
    let run = runner
        .run_captured(&project.run_command(), project.dir())
        .await?;
    let artifact_dir = artifact_dir_from_run_stderr(&run.stderr)?;

    let (artifact_path, artifact) = read_artifact(&artifact_dir).await?;
    let patched = patch_sync_startup(&artifact)?;

    info!(
        artifact = %artifact_path.display(),
        "[thunk-cabal] bundled GHCJS artifact"
    );
    Ok(emit::batch_module(&patched))
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use parking_lot::Mutex;
    use std::os::unix::process::ExitStatusExt;
    use std::path::Path;
    use std::process::ExitStatus;
    use thunk_toolchain::{CommandOutput, ToolchainError, ARTIFACT_FILE_NAME};

    /// Canned toolchain that records the commands it was asked to run.
    struct MockRunner {
        run_stderr: String,
        commands: Mutex<Vec<String>>,
    }

    impl MockRunner {
        fn new(run_stderr: impl Into<String>) -> Self {
            Self {
                run_stderr: run_stderr.into(),
                commands: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl ToolRunner for MockRunner {
        async fn run_streaming(
            &self,
            command: &str,
            _cwd: &Path,
        ) -> Result<ExitStatus, ToolchainError> {
            self.commands.lock().push(command.to_string());
            Ok(ExitStatus::from_raw(0))
        }

        async fn run_captured(
            &self,
            command: &str,
            _cwd: &Path,
        ) -> Result<CommandOutput, ToolchainError> {
            self.commands.lock().push(command.to_string());
            Ok(CommandOutput {
                status: ExitStatus::from_raw(256),
                stdout: String::new(),
                stderr: self.run_stderr.clone(),
            })
        }
    }

    /// Failing toolchain standing in for a missing nix-shell binary.
    struct UnspawnableRunner;

    #[async_trait]
    impl ToolRunner for UnspawnableRunner {
        async fn run_streaming(
            &self,
            _command: &str,
            _cwd: &Path,
        ) -> Result<ExitStatus, ToolchainError> {
            Err(ToolchainError::spawn_failed(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                "nix-shell not found",
            )))
        }

        async fn run_captured(
            &self,
            _command: &str,
            _cwd: &Path,
        ) -> Result<CommandOutput, ToolchainError> {
            Err(ToolchainError::spawn_failed(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                "nix-shell not found",
            )))
        }
    }

    fn fixture(bundle: &str) -> (tempfile::TempDir, MockRunner, CabalProject) {
        let dir = tempfile::tempdir().unwrap();
        let jsexe = dir.path().join("app.jsexe");
        std::fs::create_dir(&jsexe).unwrap();
        std::fs::write(jsexe.join(ARTIFACT_FILE_NAME), bundle).unwrap();

        let stderr = format!(
            "{}: createProcess: posix_spawnp: does not exist (No such file or directory)\n",
            dir.path().join("app").display()
        );
        let runner = MockRunner::new(stderr);
        let project = CabalProject::new(dir.path().join("app.cabal"));
        (dir, runner, project)
    }

    const BUNDLE: &str = "var h$x = 1;\nh$main(h$mainZCZCMainzimain);\n";

    #[tokio::test]
    async fn test_pipeline_produces_wrapper_module() {
        let (_dir, runner, project) = fixture(BUNDLE);

        let module = build_wrapper_module(&runner, &project).await.unwrap();
        assert!(module.starts_with("import * as react from 'react';"));
        assert!(module.contains("h$runSync(h$mainZCZCMainzimain, false);"));
        assert!(module.contains("h$startMainLoop();"));
        assert!(!module.contains("h$main(h$mainZCZCMainzimain);"));
        assert!(module.ends_with("export default result;"));
    }

    #[tokio::test]
    async fn test_pipeline_runs_build_then_run() {
        let (_dir, runner, project) = fixture(BUNDLE);

        build_wrapper_module(&runner, &project).await.unwrap();
        let commands = runner.commands.lock().clone();
        assert_eq!(
            commands,
            vec![
                "js-unknown-ghcjs-cabal build app.cabal".to_string(),
                "js-unknown-ghcjs-cabal run app.cabal || true".to_string(),
            ]
        );
    }

    #[tokio::test]
    async fn test_pipeline_is_idempotent() {
        let (_dir, runner, project) = fixture(BUNDLE);

        let first = build_wrapper_module(&runner, &project).await.unwrap();
        let second = build_wrapper_module(&runner, &project).await.unwrap();
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn test_missing_startup_invocation_fails() {
        let (_dir, runner, project) = fixture("var h$x = 1;\n");

        let err = build_wrapper_module(&runner, &project).await.unwrap_err();
        assert!(matches!(
            err,
            LoaderError::Toolchain(ToolchainError::StartupPatchCount { found: 0 })
        ));
    }

    #[tokio::test]
    async fn test_spawn_failure_aborts_pipeline() {
        let project = CabalProject::new("/work/app.cabal");
        let err = build_wrapper_module(&UnspawnableRunner, &project)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            LoaderError::Toolchain(ToolchainError::SpawnFailed { .. })
        ));
    }
}
