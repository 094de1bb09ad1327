//! Configuration for the cabal plugin

use serde::{Deserialize, Serialize};

/// Default root URL of the jsaddle dev server.
pub const DEFAULT_JSADDLE_ROOT: &str = "http://localhost:3001";

/// Default delay between dev-server probes, in milliseconds.
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 2000;

/// Default nix-shell attribute for the GHCJS cross toolchain.
pub const DEFAULT_GHCJS_SHELL: &str = "shells.ghcjs";

/// Default nix-shell attribute for the native GHC toolchain (ghcid).
pub const DEFAULT_GHC_SHELL: &str = "shells.ghc";

/// Options for the cabal plugin, deserializable from the bundler's
/// options object.
///
/// `dev` and `is_server` select one of four execution paths; the
/// remaining fields have defaults matching the conventional
/// reflex/jsaddle project layout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CabalPluginOptions {
    /// Development mode: attach to a live jsaddle dev server instead of
    /// running a batch GHCJS build.
    pub dev: bool,

    /// Whether this invocation bundles the server-side graph.
    pub is_server: bool,

    /// Root URL of the jsaddle dev server (no trailing slash).
    pub jsaddle_root: String,

    /// Delay between dev-server probes, in milliseconds.
    pub poll_interval_ms: u64,

    /// nix-shell attribute providing the GHCJS cross toolchain.
    pub ghcjs_shell: String,

    /// nix-shell attribute providing the native GHC toolchain for ghcid.
    pub ghc_shell: String,
}

impl Default for CabalPluginOptions {
    fn default() -> Self {
        Self {
            dev: false,
            is_server: false,
            jsaddle_root: DEFAULT_JSADDLE_ROOT.to_string(),
            poll_interval_ms: DEFAULT_POLL_INTERVAL_MS,
            ghcjs_shell: DEFAULT_GHCJS_SHELL.to_string(),
            ghc_shell: DEFAULT_GHC_SHELL.to_string(),
        }
    }
}

impl CabalPluginOptions {
    /// Create options with all defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Enable or disable development mode.
    pub fn with_dev(mut self, dev: bool) -> Self {
        self.dev = dev;
        self
    }

    /// Mark this invocation as bundling the server-side graph.
    pub fn with_is_server(mut self, is_server: bool) -> Self {
        self.is_server = is_server;
        self
    }

    /// Override the jsaddle dev server root URL.
    pub fn with_jsaddle_root(mut self, jsaddle_root: impl Into<String>) -> Self {
        self.jsaddle_root = jsaddle_root.into();
        self
    }

    /// Override the probe interval in milliseconds.
    pub fn with_poll_interval_ms(mut self, poll_interval_ms: u64) -> Self {
        self.poll_interval_ms = poll_interval_ms;
        self
    }
}
