// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! Compiler registry
//!
//! Maps file extensions to ordered chains of source-to-source compilers.

use crate::error::Result;
use crate::host::Module;
use parking_lot::RwLock;
use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;
use tracing::trace;

/// A source transform: `(module, code, resolved filename) -> code`
pub type Compiler = Arc<dyn Fn(&Module, &str, &Path) -> Result<String> + Send + Sync>;

/// Extension -> ordered compiler chain.
///
/// Chains only grow: registering never replaces an earlier compiler.
#[derive(Default)]
pub struct CompilerRegistry {
    chains: RwLock<BTreeMap<String, Vec<Compiler>>>,
}

impl CompilerRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `compiler` to the chain for `extension`
    pub fn register(&self, extension: impl Into<String>, compiler: Compiler) {
        let extension = extension.into();
        debug_assert!(!extension.is_empty(), "extension must not be empty");
        let mut chains = self.chains.write();
        let chain = chains.entry(extension).or_default();
        chain.push(compiler);
        trace!(position = chain.len(), "compiler registered");
    }

    /// Snapshot of the chain for `extension`, empty if none is registered
    pub fn chain(&self, extension: &str) -> Vec<Compiler> {
        self.chains.read().get(extension).cloned().unwrap_or_default()
    }

    /// Extensions with at least one compiler
    pub fn extensions(&self) -> Vec<String> {
        self.chains.read().keys().cloned().collect()
    }

    /// Whether `extension` has a chain
    pub fn contains(&self, extension: &str) -> bool {
        self.chains.read().contains_key(extension)
    }

    /// Number of registered extensions
    pub fn len(&self) -> usize {
        self.chains.read().len()
    }

    /// Whether nothing is registered
    pub fn is_empty(&self) -> bool {
        self.chains.read().is_empty()
    }
}

/// Thread `code` through `chain` left to right
pub fn run_chain(chain: &[Compiler], module: &Module, code: &str, filename: &Path) -> Result<String> {
    chain
        .iter()
        .try_fold(code.to_string(), |code, compiler| compiler(module, code.as_str(), filename))
}
