//! Wrapper-module synthesis
//!
//! The bundler never sees raw Haskell output. Every mode ends in one of
//! three generated JavaScript modules: an empty one, an adapter embedding
//! the patched GHCJS bundle, or a dev bridge that fetches the program from
//! the jsaddle server at page load. All three are pure string functions so
//! the same inputs always produce byte-identical modules.

/// Module for graphs that must not embed the Haskell program at all.
pub fn empty_module() -> String {
    String::new()
}

/// Adapter module embedding a synchronously-started GHCJS bundle.
///
/// The bundle runs inside `haskellEngine`, which gives it a
/// `getProgramArg` accessor for the host argument object and captures the
/// program's exported value through the `setVal` callback. The engine is
/// invoked immediately, so `result` is populated by the time the module
/// body finishes evaluating; the synchronous-start patch on the bundle is
/// what makes that guarantee hold.
pub fn batch_module(patched_artifact: &str) -> String {
    format!(
        "import * as react from 'react'; \
         function haskellEngine(arg, global) {{ \
         function getProgramArg() {{ return arg; }};\
         {patched_artifact}\
         }}; \
         var result; \
         haskellEngine({{ react, setVal: (v) => {{ result = v; }} }}, window); \
         export default result;"
    )
}

/// Dev bridge module fetching the program from the jsaddle server.
///
/// Runs in the browser, not during bundling: it fetches `/jsaddle.js`
/// with a synchronous XHR, evaluates it with the same engine argument
/// shape as the batch adapter, then spins until the evaluated script has
/// populated the result slot via its connection back to the dev server.
pub fn dev_client_module(jsaddle_root: &str) -> String {
    format!(
        "import * as react from 'react'; \
         console.log('retrieving jsaddle.js'); \
         const jsaddleRoot = '{jsaddle_root}'; \
         const xhr = new XMLHttpRequest(); \
         xhr.open('GET', jsaddleRoot + '/jsaddle.js', false); \
         xhr.send(); \
         var result; \
         eval('(function(JSADDLE_ROOT, arg, global) {{' + xhr.response + '}})')\
         (jsaddleRoot, {{ react, setVal: (v) => {{ result = v; }} }}, window); \
         while (result === undefined) {{ }} \
         export default result;"
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_module_is_empty() {
        assert_eq!(empty_module(), "");
    }

    #[test]
    fn test_batch_module_shape() {
        let module = batch_module("h$runSync(h$m, false);\nh$startMainLoop();");
        assert!(module.starts_with("import * as react from 'react';"));
        assert!(module.contains("function getProgramArg() { return arg; };"));
        assert!(module.contains("h$runSync(h$m, false);\nh$startMainLoop();"));
        assert!(module.contains("setVal: (v) => { result = v; }"));
        assert!(module.ends_with("export default result;"));
    }

    #[test]
    fn test_batch_module_is_deterministic() {
        let patched = "h$runSync(h$m, false);\nh$startMainLoop();";
        assert_eq!(batch_module(patched), batch_module(patched));
    }

    #[test]
    fn test_dev_client_module_fetches_synchronously() {
        let module = dev_client_module("http://localhost:3001");
        assert!(module.contains("const jsaddleRoot = 'http://localhost:3001';"));
        assert!(module.contains("xhr.open('GET', jsaddleRoot + '/jsaddle.js', false);"));
        assert!(module.contains("while (result === undefined) { }"));
        assert!(module.ends_with("export default result;"));
    }
}
