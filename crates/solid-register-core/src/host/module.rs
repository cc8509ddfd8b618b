// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! Module handles

use crate::error::Result;
use parking_lot::RwLock;
use serde_json::{Map, Value};
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// Code-compile entry point of a module: evaluates `code` as the body of
/// `module`, using `filename` for relative requires.
pub type CompileFn = Arc<dyn Fn(&Module, &str, &Path) -> Result<()> + Send + Sync>;

/// A module being loaded or already loaded by the runtime
pub struct Module {
    /// Resolved filename the module is cached under
    filename: PathBuf,
    /// File that required this one
    parent: Option<PathBuf>,
    /// `module.exports`
    exports: RwLock<Value>,
    /// Last code handed to the evaluator
    source: RwLock<Option<String>>,
    /// Whether the loader finished
    loaded: AtomicBool,
    /// Code-compile entry point
    compile: RwLock<CompileFn>,
}

impl Module {
    /// Create a module with an empty exports object
    pub fn new(filename: PathBuf, parent: Option<PathBuf>, compile: CompileFn) -> Self {
        Self {
            filename,
            parent,
            exports: RwLock::new(Value::Object(Map::new())),
            source: RwLock::new(None),
            loaded: AtomicBool::new(false),
            compile: RwLock::new(compile),
        }
    }

    /// The module's filename
    pub fn filename(&self) -> &Path {
        &self.filename
    }

    /// The requiring module's filename
    pub fn parent(&self) -> Option<&Path> {
        self.parent.as_deref()
    }

    /// Snapshot of `module.exports`
    pub fn exports(&self) -> Value {
        self.exports.read().clone()
    }

    /// Replace `module.exports`
    pub fn set_exports(&self, exports: Value) {
        *self.exports.write() = exports;
    }

    /// Assign `module.exports[name]`.
    ///
    /// Non-object exports are replaced by an object first, matching what
    /// `exports.name = ...` does after `module.exports` was reassigned to a
    /// primitive.
    pub fn set_export(&self, name: &str, value: Value) {
        let mut exports = self.exports.write();
        if !exports.is_object() {
            *exports = Value::Object(Map::new());
        }
        if let Value::Object(map) = &mut *exports {
            map.insert(name.to_string(), value);
        }
    }

    /// The code most recently evaluated for this module
    pub fn source(&self) -> Option<String> {
        self.source.read().clone()
    }

    /// Record evaluated code
    pub fn set_source(&self, code: &str) {
        *self.source.write() = Some(code.to_string());
    }

    /// Whether loading finished
    pub fn is_loaded(&self) -> bool {
        self.loaded.load(Ordering::Acquire)
    }

    pub(crate) fn mark_loaded(&self) {
        self.loaded.store(true, Ordering::Release);
    }

    /// The current compile entry point
    pub fn compile_fn(&self) -> CompileFn {
        self.compile.read().clone()
    }

    /// Replace the compile entry point
    pub fn set_compile(&self, compile: CompileFn) {
        *self.compile.write() = compile;
    }

    /// Invoke the compile entry point.
    ///
    /// The lock is released before the call so the entry point may re-enter
    /// the runtime or reassign itself.
    pub fn compile(&self, code: &str, filename: &Path) -> Result<()> {
        let compile = self.compile_fn();
        compile(self, code, filename)
    }
}

impl fmt::Debug for Module {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Module")
            .field("filename", &self.filename)
            .field("parent", &self.parent)
            .field("loaded", &self.is_loaded())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn recording() -> CompileFn {
        Arc::new(|module: &Module, code: &str, _filename: &Path| {
            module.set_source(code);
            Ok(())
        })
    }

    #[test]
    fn test_exports() {
        let module = Module::new(PathBuf::from("/a.js"), None, recording());
        assert_eq!(module.exports(), json!({}));

        module.set_export("x", json!(1));
        assert_eq!(module.exports(), json!({ "x": 1 }));

        module.set_exports(json!("str"));
        module.set_export("y", json!(true));
        assert_eq!(module.exports(), json!({ "y": true }));
    }

    #[test]
    fn test_compile_entry_point_can_be_wrapped() {
        let module = Module::new(PathBuf::from("/a.js"), None, recording());
        let previous = module.compile_fn();
        module.set_compile(Arc::new(move |module: &Module, code: &str, filename: &Path| {
            previous(module, &code.to_uppercase(), filename)
        }));

        module.compile("abc", Path::new("/a.js")).unwrap();
        assert_eq!(module.source().as_deref(), Some("ABC"));
        assert!(!module.is_loaded());
    }
}
