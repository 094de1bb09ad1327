//! Output-directory discovery from `cabal run` diagnostics
//!
//! `cabal build` prints only "Up to date" when there is nothing to do, so
//! the output path has to come from somewhere else. Running the target
//! makes cabal try to execute the cross-compiled binary, which fails on
//! the host with a line of the form
//!
//! ```text
//! /path/to/dist/build/app/app: createProcess: posix_spawnp: does not exist (No such file or directory)
//! ```
//!
//! as the second-to-last line of stderr (the output ends with a newline).
//! The text before the `: createProcess:` marker plus a `.jsexe` suffix is
//! the directory the linker wrote. This is a fragile contract with the
//! toolchain's unstructured diagnostics; it is kept in this one function so
//! a wording change breaks loudly in exactly one place.

use crate::error::ToolchainError;
use std::path::PathBuf;

/// Diagnostic marker cabal emits when the cross-compiled binary cannot run.
const CREATE_PROCESS_MARKER: &str = ": createProcess:";

/// Suffix the GHCJS linker appends to the output directory.
const ARTIFACT_DIR_SUFFIX: &str = ".jsexe";

/// Derive the `.jsexe` artifact directory from `cabal run` stderr.
pub fn artifact_dir_from_run_stderr(stderr: &str) -> Result<PathBuf, ToolchainError> {
    let lines: Vec<&str> = stderr.split('\n').collect();
    if lines.len() < 2 {
        return Err(ToolchainError::TruncatedRunOutput);
    }
    let line = lines[lines.len() - 2];

    let Some((dir, _)) = line.split_once(CREATE_PROCESS_MARKER) else {
        return Err(ToolchainError::missing_run_diagnostic(line));
    };

    Ok(PathBuf::from(format!("{dir}{ARTIFACT_DIR_SUFFIX}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    #[test]
    fn test_parses_directory_from_diagnostic_line() {
        let stderr =
            "/foo/bar: createProcess: posix_spawnp: does not exist (No such file or directory)\n";
        let dir = artifact_dir_from_run_stderr(stderr).unwrap();
        assert_eq!(dir, Path::new("/foo/bar.jsexe"));
    }

    #[test]
    fn test_only_second_to_last_line_is_consulted() {
        let stderr = "Resolving dependencies...\n\
                      Building executable 'app'...\n\
                      /out/app: createProcess: posix_spawnp: does not exist (No such file or directory)\n";
        let dir = artifact_dir_from_run_stderr(stderr).unwrap();
        assert_eq!(dir, Path::new("/out/app.jsexe"));
    }

    #[test]
    fn test_missing_marker_is_an_error() {
        let stderr = "something unexpected happened\n";
        let err = artifact_dir_from_run_stderr(stderr).unwrap_err();
        assert!(matches!(err, ToolchainError::MissingRunDiagnostic { .. }));
    }

    #[test]
    fn test_empty_output_is_an_error() {
        let err = artifact_dir_from_run_stderr("").unwrap_err();
        assert!(matches!(err, ToolchainError::TruncatedRunOutput));
    }
}
