//! Rolldown plugin implementation for Haskell (GHCJS + jsaddle)
//!
//! This module provides a Rolldown plugin that bundles Haskell modules
//! into a JavaScript graph. It intercepts `.cabal` project descriptors via
//! the `load` hook and emits a wrapper module whose shape depends on the
//! `{dev, is_server}` option pair:
//!
//! | dev | is_server | behavior |
//! |-----|-----------|----------|
//! | false | true  | empty module (server graphs never embed the program) |
//! | false | false | batch GHCJS build, patched and wrapped |
//! | true  | true  | spawn and supervise a ghcid watch process |
//! | true  | false | wait for the jsaddle dev server, emit the bridge |
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use thunk_plugin_cabal::{CabalPluginOptions, ThunkCabalPlugin};
//! use std::sync::Arc;
//!
//! let options = CabalPluginOptions::new().with_dev(true);
//! let plugin = Arc::new(ThunkCabalPlugin::with_options(options));
//! ```

use anyhow::Context;
use parking_lot::Mutex;
use rolldown_common::ModuleType;
use rolldown_plugin::{
    HookLoadArgs, HookLoadOutput, HookLoadReturn, HookUsage, Plugin, PluginContext,
};
use std::borrow::Cow;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use thunk_toolchain::{CabalProject, NixShell, WatchExit, WatchProcess};
use tracing::debug;

mod batch;
mod config;
mod dev;
mod emit;
mod error;

pub use config::{
    CabalPluginOptions, DEFAULT_GHCJS_SHELL, DEFAULT_GHC_SHELL, DEFAULT_JSADDLE_ROOT,
    DEFAULT_POLL_INTERVAL_MS,
};
pub use dev::{wait_for_dev_server, ProbeConfig, DEFAULT_PROBE_INTERVAL};
pub use error::LoaderError;

/// Execution mode of one `load` invocation.
///
/// Selected from the option pair exactly once per invocation; the
/// selection itself has no failure mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Production server graph: the program never ships there.
    ServerNoop,
    /// Production client graph: one-shot GHCJS build.
    Batch,
    /// Dev server graph: keep the ghcid watch process alive.
    WatchServer,
    /// Dev client graph: attach to the jsaddle dev server.
    DevClient,
}

impl Mode {
    /// Select the handler for a `{dev, is_server}` pair.
    pub fn select(dev: bool, is_server: bool) -> Self {
        match (dev, is_server) {
            (false, true) => Mode::ServerNoop,
            (false, false) => Mode::Batch,
            (true, true) => Mode::WatchServer,
            (true, false) => Mode::DevClient,
        }
    }
}

/// Rolldown plugin that loads `.cabal` project descriptors.
///
/// The plugin itself is a thin orchestrator: the toolchain work lives in
/// `thunk-toolchain`, the emitted JavaScript in the emit helpers. State is
/// limited to the ghcid process handle, which must outlive the hook
/// invocation that spawned it.
#[derive(Debug, Clone)]
pub struct ThunkCabalPlugin {
    options: CabalPluginOptions,

    /// Probe client, reused across invocations.
    client: reqwest::Client,

    /// Keeps the ghcid watch process handle alive for the build session.
    watch: Arc<Mutex<Option<WatchProcess>>>,
}

impl ThunkCabalPlugin {
    /// Create a plugin with default options.
    pub fn new() -> Self {
        Self::with_options(CabalPluginOptions::default())
    }

    /// Create a plugin with custom options.
    pub fn with_options(options: CabalPluginOptions) -> Self {
        Self {
            options,
            client: reqwest::Client::new(),
            watch: Arc::new(Mutex::new(None)),
        }
    }

    /// The options this plugin was built with.
    pub fn options(&self) -> &CabalPluginOptions {
        &self.options
    }

    /// Exit notification for the ghcid watch process, if one was spawned.
    ///
    /// Resolves to the exit status once the process dies. The hook has
    /// long since reported success by then; this channel is the only
    /// place the fault can surface.
    pub fn watch_exit(&self) -> Option<tokio::sync::watch::Receiver<Option<WatchExit>>> {
        self.watch.lock().as_ref().map(WatchProcess::exited)
    }

    fn probe_config(&self) -> ProbeConfig {
        ProbeConfig::new(Duration::from_millis(self.options.poll_interval_ms))
    }

    /// Produce the wrapper module for one cabal descriptor.
    ///
    /// Exactly one of three things happens per invocation: a module is
    /// returned, an error is returned, or (dev client mode with no server
    /// ever appearing) the future pends until the caller drops it.
    pub async fn wrapper_module(&self, cabal_path: &Path) -> Result<String, LoaderError> {
        let project = CabalProject::new(cabal_path);

        match Mode::select(self.options.dev, self.options.is_server) {
            Mode::ServerNoop => Ok(emit::empty_module()),
            Mode::Batch => {
                let runner = NixShell::new(self.options.ghcjs_shell.clone());
                batch::build_wrapper_module(&runner, &project).await
            }
            Mode::WatchServer => {
                let shell = NixShell::new(self.options.ghc_shell.clone());
                let command = shell.command(&project.watch_command(), project.dir());
                let watch = WatchProcess::spawn(command)?;
                *self.watch.lock() = Some(watch);
                // Success is reported here, before the process can be seen
                // exiting; ghcid offers no readiness signal to wait for.
                Ok(emit::empty_module())
            }
            Mode::DevClient => {
                dev::wait_for_dev_server(
                    &self.client,
                    &self.options.jsaddle_root,
                    self.probe_config(),
                )
                .await?;
                Ok(emit::dev_client_module(&self.options.jsaddle_root))
            }
        }
    }
}

impl Default for ThunkCabalPlugin {
    fn default() -> Self {
        Self::new()
    }
}

impl Plugin for ThunkCabalPlugin {
    /// Returns the plugin name for debugging and logging
    fn name(&self) -> Cow<'static, str> {
        "thunk-cabal".into()
    }

    /// Declare which hooks this plugin uses
    fn register_hook_usage(&self) -> HookUsage {
        HookUsage::Load
    }

    /// Load hook - intercepts `.cabal` descriptors and emits the wrapper
    ///
    /// # Returns
    ///
    /// - `Ok(Some(output))` - Wrapper module for this descriptor
    /// - `Ok(None)` - Not a cabal descriptor, let Rolldown handle it
    /// - `Err(e)` - Toolchain or dev-server failure
    fn load(
        &self,
        _ctx: &PluginContext,
        args: &HookLoadArgs<'_>,
    ) -> impl std::future::Future<Output = HookLoadReturn> + Send {
        // Capture data needed for async block to avoid lifetime issues
        let id = args.id.to_string();
        let plugin = self.clone();

        async move {
            if !id.ends_with(".cabal") {
                return Ok(None);
            }

            debug!("[thunk-cabal] load hook called for {}", id);
            let module = plugin
                .wrapper_module(Path::new(&id))
                .await
                .with_context(|| format!("Failed to load Haskell module from: {}", id))?;

            Ok(Some(HookLoadOutput {
                code: module.into(),
                module_type: Some(ModuleType::Js),
                ..Default::default()
            }))
        }
    }
}
