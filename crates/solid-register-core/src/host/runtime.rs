// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! The runtime: loader table, cache and `require()`

use crate::error::{RegisterError, Result};
use crate::host::cache::ModuleCache;
use crate::host::evaluator::{Evaluator, StaticEvaluator};
use crate::host::loader::{json_loader, legacy_js_loader};
use crate::host::module::{CompileFn, Module};
use crate::host::resolver::ModuleResolver;
use parking_lot::RwLock;
use serde_json::Value;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Weak};
use tracing::debug;

/// Per-extension loader: loads `filename` into `module`
pub type LoaderFn = Arc<dyn Fn(&Runtime, &Module, &Path) -> Result<()> + Send + Sync>;

/// Extension every unmatched filename falls back to
const FALLBACK_EXTENSION: &str = ".js";

/// CommonJS host runtime
pub struct Runtime {
    /// Extension loader table, in registration order
    extensions: RwLock<Vec<(String, LoaderFn)>>,
    /// Module cache
    cache: ModuleCache,
    /// Module resolver
    resolver: ModuleResolver,
    /// Evaluates compiled code
    evaluator: Arc<dyn Evaluator>,
    /// Handle given to compile entry points so they can re-enter `require`
    this: Weak<Runtime>,
}

impl Runtime {
    /// Create a runtime with the `.js` and `.json` loaders registered
    pub fn new(evaluator: Arc<dyn Evaluator>) -> Arc<Self> {
        let js: LoaderFn = Arc::new(legacy_js_loader);
        let json: LoaderFn = Arc::new(json_loader);

        Arc::new_cyclic(|this| Self {
            extensions: RwLock::new(vec![
                (".js".to_string(), js),
                (".json".to_string(), json),
            ]),
            cache: ModuleCache::new(),
            resolver: ModuleResolver::new(),
            evaluator,
            this: this.clone(),
        })
    }

    /// Create a runtime evaluating modules with [`StaticEvaluator`]
    pub fn with_default_evaluator() -> Arc<Self> {
        Self::new(Arc::new(StaticEvaluator::new()))
    }

    /// The loader currently registered for `extension`
    pub fn extension_loader(&self, extension: &str) -> Option<LoaderFn> {
        self.extensions
            .read()
            .iter()
            .find(|(ext, _)| ext == extension)
            .map(|(_, loader)| Arc::clone(loader))
    }

    /// Install `loader` for `extension`, returning the one it replaces
    pub fn set_extension_loader(
        &self,
        extension: impl Into<String>,
        loader: LoaderFn,
    ) -> Option<LoaderFn> {
        let extension = extension.into();
        let mut table = self.extensions.write();
        match table.iter_mut().find(|(ext, _)| *ext == extension) {
            Some((_, slot)) => Some(std::mem::replace(slot, loader)),
            None => {
                table.push((extension, loader));
                None
            }
        }
    }

    /// Registered extensions, in registration order
    pub fn extensions(&self) -> Vec<String> {
        self.extensions.read().iter().map(|(ext, _)| ext.clone()).collect()
    }

    /// The module cache
    pub fn cache(&self) -> &ModuleCache {
        &self.cache
    }

    /// `require(specifier)` from the module at `parent`
    pub fn require(&self, specifier: &str, parent: &Path) -> Result<Value> {
        let base_dir = parent.parent().unwrap_or(Path::new("."));
        let filename = self
            .resolver
            .resolve(specifier, base_dir, &self.extensions())?;
        self.load(&filename, Some(parent))
    }

    /// Resolve `specifier` against a directory, as the entry point of a run
    pub fn require_from_dir(&self, specifier: &str, dir: &Path) -> Result<Value> {
        let filename = self.resolver.resolve(specifier, dir, &self.extensions())?;
        self.load(&filename, None)
    }

    /// Resolve without loading
    pub fn resolve(&self, specifier: &str, parent: &Path) -> Result<PathBuf> {
        let base_dir = parent.parent().unwrap_or(Path::new("."));
        self.resolver.resolve(specifier, base_dir, &self.extensions())
    }

    /// Load an already-resolved file
    pub fn load(&self, filename: &Path, parent: Option<&Path>) -> Result<Value> {
        if let Some(cached) = self.cache.get(filename) {
            // A module still loading hands out its partial exports
            return Ok(cached.exports());
        }

        let module = Arc::new(Module::new(
            filename.to_path_buf(),
            parent.map(Path::to_path_buf),
            self.evaluating_compile(),
        ));
        self.cache.enter(Arc::clone(&module));

        let extension = self.find_extension(filename);
        let Some(loader) = self.extension_loader(&extension) else {
            self.cache.evict_failed(filename);
            return Err(RegisterError::NoLoader(extension));
        };

        debug!(file = %filename.display(), %extension, "loading module");
        if let Err(err) = loader(self, module.as_ref(), filename) {
            self.cache.evict_failed(filename);
            return Err(err);
        }

        module.mark_loaded();
        Ok(module.exports())
    }

    /// Longest registered extension matching the file name.
    ///
    /// `a.test.js` tries `.test.js` before `.js`; dotfiles never match on
    /// their leading dot. Unknown extensions fall back to `.js`.
    pub fn find_extension(&self, filename: &Path) -> String {
        let name = filename
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let table = self.extensions.read();

        let mut start = 0;
        while let Some(pos) = name[start..].find('.') {
            let dot = start + pos;
            start = dot + 1;
            if dot == 0 {
                continue;
            }
            let candidate = &name[dot..];
            if table.iter().any(|(ext, _)| ext == candidate) {
                return candidate.to_string();
            }
        }

        FALLBACK_EXTENSION.to_string()
    }

    /// The compile entry point every new module starts with
    fn evaluating_compile(&self) -> CompileFn {
        let runtime = self.this.clone();
        let evaluator = Arc::clone(&self.evaluator);
        Arc::new(move |module: &Module, code: &str, filename: &Path| {
            let runtime = runtime
                .upgrade()
                .ok_or_else(|| RegisterError::RuntimeDropped(filename.to_path_buf()))?;
            evaluator.evaluate(&runtime, module, code, filename)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::fs;

    #[test]
    fn test_default_extensions() {
        let runtime = Runtime::with_default_evaluator();
        assert_eq!(runtime.extensions(), vec![".js", ".json"]);
        assert!(runtime.extension_loader(".js").is_some());
        assert!(runtime.extension_loader(".cjs").is_none());
    }

    #[test]
    fn test_set_extension_loader_replaces() {
        let runtime = Runtime::with_default_evaluator();
        let noop: LoaderFn = Arc::new(|_: &Runtime, _: &Module, _: &Path| Ok(()));

        assert!(runtime.set_extension_loader(".sld", Arc::clone(&noop)).is_none());
        assert!(runtime.set_extension_loader(".sld", noop).is_some());
        assert_eq!(runtime.extensions(), vec![".js", ".json", ".sld"]);
    }

    #[test]
    fn test_find_extension() {
        let runtime = Runtime::with_default_evaluator();
        let noop: LoaderFn = Arc::new(|_: &Runtime, _: &Module, _: &Path| Ok(()));
        runtime.set_extension_loader(".test.js", noop);

        assert_eq!(runtime.find_extension(Path::new("/a.test.js")), ".test.js");
        assert_eq!(runtime.find_extension(Path::new("/a.json")), ".json");
        assert_eq!(runtime.find_extension(Path::new("/a.cjs")), ".js");
        assert_eq!(runtime.find_extension(Path::new("/.eslintrc")), ".js");
    }

    #[test]
    fn test_require_js_and_json() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("data.json"), r#"{"answer": 42}"#).unwrap();
        fs::write(
            dir.path().join("main.js"),
            "const data = require(\"./data.json\");\nexports.name = \"main\";\n",
        )
        .unwrap();
        let runtime = Runtime::with_default_evaluator();

        let exports = runtime.require_from_dir("./main", dir.path()).unwrap();
        assert_eq!(exports, json!({ "name": "main" }));
        assert_eq!(runtime.cache().len(), 2);
    }

    #[test]
    fn test_failed_load_is_evicted() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("a.mjs"), "export const x = 1;").unwrap();
        let runtime = Runtime::with_default_evaluator();

        let err = runtime.require_from_dir("./a.mjs", dir.path()).unwrap_err();
        assert!(err.is_require_esm());
        assert!(runtime.cache().is_empty());
    }
}
