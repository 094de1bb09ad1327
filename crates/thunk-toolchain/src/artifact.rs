//! Reading and patching the linked GHCJS bundle
//!
//! The linker writes a single self-contained `all.js` into the `.jsexe`
//! directory. Its last statement schedules `h$main(...)` asynchronously;
//! for bundling we rewrite that to a synchronous start so the exported
//! components exist by the time the importing module's evaluation
//! finishes.

use crate::error::ToolchainError;
use regex::Regex;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

/// Name of the linked JavaScript bundle inside the `.jsexe` directory.
pub const ARTIFACT_FILE_NAME: &str = "all.js";

/// The startup invocation: an `h$main(<closure>);` statement on its own line.
fn startup_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"(?m)^h\$main\((.*)\);$").expect("startup pattern is a valid regex")
    })
}

/// Read `all.js` from the artifact directory.
pub async fn read_artifact(artifact_dir: &Path) -> Result<(PathBuf, String), ToolchainError> {
    let path = artifact_dir.join(ARTIFACT_FILE_NAME);
    let text = tokio::fs::read_to_string(&path)
        .await
        .map_err(|source| ToolchainError::artifact_read(path.clone(), source))?;
    Ok((path, text))
}

/// Rewrite the bundle's startup from asynchronous to synchronous.
///
/// The bundle must contain exactly one startup invocation; anything else
/// means the linker output no longer looks like what this patch was
/// written against, and the build fails rather than guessing.
pub fn patch_sync_startup(artifact: &str) -> Result<String, ToolchainError> {
    let pattern = startup_pattern();
    let found = pattern.find_iter(artifact).count();
    if found != 1 {
        return Err(ToolchainError::startup_patch_count(found));
    }

    Ok(pattern
        .replace(artifact, "h$$runSync($1, false);\nh$$startMainLoop();")
        .into_owned())
}
