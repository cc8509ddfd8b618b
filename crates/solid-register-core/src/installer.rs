// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! Loader hook installer
//!
//! [`SolidRegister`] is the context object embedders build once at startup:
//! compilers are registered on it, then [`SolidRegister::init`] replaces the
//! runtime's extension loaders with [`LoadOrchestrator`] hooks.

use crate::alias::AliasFn;
use crate::error::{RegisterError, Result};
use crate::fallback::fallback_aware_load;
use crate::host::{CompileFn, LoaderFn, Module, Runtime};
use crate::registry::{run_chain, Compiler, CompilerRegistry};
use std::path::Path;
use std::sync::{Arc, OnceLock};
use tracing::{debug, trace};

/// Extension hooked even without compilers, so it still gets alias rewriting
pub const DEFAULT_EXTENSION: &str = ".cjs";

/// Extension whose loader is the original, legacy loader
const ORIGINAL_EXTENSION: &str = ".js";

/// Compile-on-require context: compiler registry, alias function and the
/// runtime's original loader.
pub struct SolidRegister {
    registry: CompilerRegistry,
    alias: AliasFn,
    /// Captured on the first `init` so re-initialising never wraps a hook
    original: OnceLock<LoaderFn>,
}

impl SolidRegister {
    /// Create a context rewriting filenames with `alias`
    pub fn new(alias: AliasFn) -> Self {
        Self {
            registry: CompilerRegistry::new(),
            alias,
            original: OnceLock::new(),
        }
    }

    /// The compiler registry
    pub fn registry(&self) -> &CompilerRegistry {
        &self.registry
    }

    /// Append a compiler to the chain for `extension`.
    ///
    /// Hooks snapshot their chain when installed, so compilers registered
    /// after [`SolidRegister::init`] only apply after another `init`.
    pub fn register_compiler<F>(&self, extension: impl Into<String>, compiler: F)
    where
        F: Fn(&Module, &str, &Path) -> Result<String> + Send + Sync + 'static,
    {
        self.registry.register(extension, Arc::new(compiler));
    }

    /// Append an already shared compiler
    pub fn register_shared(&self, extension: impl Into<String>, compiler: Compiler) {
        self.registry.register(extension, compiler);
    }

    /// Install a hook for every registered extension plus [`DEFAULT_EXTENSION`].
    ///
    /// Returns the hooked extensions.
    pub fn init(&self, runtime: &Runtime) -> Result<Vec<String>> {
        let original = self.original_loader(runtime)?;

        let mut extensions = self.registry.extensions();
        if !extensions.iter().any(|ext| ext == DEFAULT_EXTENSION) {
            extensions.push(DEFAULT_EXTENSION.to_string());
        }

        for extension in &extensions {
            let orchestrator = LoadOrchestrator::new(
                extension.clone(),
                self.registry.chain(extension),
                Arc::clone(&self.alias),
                Arc::clone(&original),
            );
            let chain_len = orchestrator.chain.len();
            runtime.set_extension_loader(extension.clone(), orchestrator.into_loader());
            debug!(%extension, compilers = chain_len, "installed extension hook");
        }

        Ok(extensions)
    }

    fn original_loader(&self, runtime: &Runtime) -> Result<LoaderFn> {
        if let Some(original) = self.original.get() {
            return Ok(Arc::clone(original));
        }
        let loader = runtime
            .extension_loader(ORIGINAL_EXTENSION)
            .ok_or_else(|| RegisterError::NoLoader(ORIGINAL_EXTENSION.to_string()))?;
        Ok(Arc::clone(self.original.get_or_init(|| loader)))
    }
}

/// The hook installed for one extension.
///
/// Decides what gets compiled and under which filename; the original loader
/// still does the reading and triggers compilation.
pub struct LoadOrchestrator {
    extension: String,
    chain: Arc<[Compiler]>,
    alias: AliasFn,
    original: LoaderFn,
}

impl LoadOrchestrator {
    /// Create a hook for `extension` running `chain`
    pub fn new(extension: String, chain: Vec<Compiler>, alias: AliasFn, original: LoaderFn) -> Self {
        Self {
            extension,
            chain: chain.into(),
            alias,
            original,
        }
    }

    /// Load `filename` into `module`
    pub fn load(&self, runtime: &Runtime, module: &Module, filename: &Path) -> Result<()> {
        let resolved = (self.alias)(filename);
        if resolved != filename {
            debug!(from = %filename.display(), to = %resolved.display(), "aliased module");
        }

        if !self.chain.is_empty() {
            module.set_compile(self.compiling(module.compile_fn(), &resolved));
        }

        fallback_aware_load(&self.original, runtime, module, &resolved)
    }

    /// Wrap `previous` so it receives the chain's output instead of raw code
    fn compiling(&self, previous: CompileFn, resolved: &Path) -> CompileFn {
        let chain = Arc::clone(&self.chain);
        let extension = self.extension.clone();
        let resolved = resolved.to_path_buf();

        Arc::new(move |module: &Module, code: &str, filename: &Path| {
            trace!(%extension, file = %resolved.display(), compilers = chain.len(), "compiling");
            let compiled = run_chain(&chain, module, code, &resolved)?;
            previous(module, compiled.as_str(), filename)
        })
    }

    fn into_loader(self) -> LoaderFn {
        Arc::new(move |runtime: &Runtime, module: &Module, filename: &Path| {
            self.load(runtime, module, filename)
        })
    }
}
