// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! Module cache for require()

use crate::host::module::Module;
use dashmap::DashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::debug;

/// Modules by resolved filename.
///
/// A module is entered before its loader runs, so a circular require sees
/// its partial exports. If the load fails it is evicted, and the next
/// require compiles the file from scratch.
pub struct ModuleCache {
    modules: DashMap<PathBuf, Arc<Module>>,
}

impl ModuleCache {
    /// Create a new empty cache
    pub fn new() -> Self {
        Self {
            modules: DashMap::new(),
        }
    }

    /// The module cached for `path`, loaded or still loading
    pub fn get(&self, path: &Path) -> Option<Arc<Module>> {
        self.modules.get(path).map(|entry| Arc::clone(entry.value()))
    }

    /// Enter a module under its own filename before loading it
    pub(crate) fn enter(&self, module: Arc<Module>) {
        self.modules.insert(module.filename().to_path_buf(), module);
    }

    /// Drop a module whose load failed, unless it already finished loading
    pub(crate) fn evict_failed(&self, path: &Path) {
        if self.modules.remove_if(path, |_, module| !module.is_loaded()).is_some() {
            debug!(file = %path.display(), "evicted module after failed load");
        }
    }

    /// Forget every module, so the next require recompiles from source
    pub fn clear(&self) {
        self.modules.clear();
    }

    /// Number of cached modules
    pub fn len(&self) -> usize {
        self.modules.len()
    }

    /// Whether nothing is cached
    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }
}

impl Default for ModuleCache {
    fn default() -> Self {
        Self::new()
    }
}
