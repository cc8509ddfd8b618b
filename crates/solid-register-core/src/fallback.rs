// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! Fallback-aware load
//!
//! The legacy loader cannot load ES modules. When it says so, the file is
//! read directly and handed to the module's compile entry point, so test
//! code may be written in either module format.

use crate::error::{RegisterError, Result};
use crate::host::{LoaderFn, Module, Runtime};
use std::path::Path;
use tracing::debug;

/// Load `filename` into `module` with `original`, recovering from
/// `ERR_REQUIRE_ESM`.
///
/// Only `ERR_REQUIRE_ESM` triggers the direct read. A recovery failure wins
/// over the original error unless it is [`RegisterError::Unspecified`]; any
/// other unspecified failure becomes [`RegisterError::Compile`].
pub fn fallback_aware_load(
    original: &LoaderFn,
    runtime: &Runtime,
    module: &Module,
    filename: &Path,
) -> Result<()> {
    match original(runtime, module, filename) {
        Ok(()) => Ok(()),
        Err(error) if error.is_require_esm() => {
            debug!(file = %filename.display(), "legacy loader rejected ES module, compiling directly");
            compile_from_disk(module, filename).map_err(|recovery| {
                if recovery.is_unspecified() {
                    error
                } else {
                    recovery
                }
            })
        }
        Err(RegisterError::Unspecified) => Err(RegisterError::Compile(filename.to_path_buf())),
        Err(error) => Err(error),
    }
}

fn compile_from_disk(module: &Module, filename: &Path) -> Result<()> {
    let bytes = std::fs::read(filename).map_err(|err| RegisterError::io(filename, err))?;
    module.compile(&String::from_utf8_lossy(&bytes), filename)
}
