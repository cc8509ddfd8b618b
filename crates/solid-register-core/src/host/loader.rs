// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! Built-in extension loaders

use crate::error::{RegisterError, Result};
use crate::host::module::Module;
use crate::host::resolver::PackageJson;
use crate::host::runtime::Runtime;
use std::path::Path;

/// The host's legacy CommonJS loader, registered for `.js`.
///
/// Reads the file and hands it to the module's compile entry point. Files
/// that are ES modules by their extension or package scope are rejected with
/// `ERR_REQUIRE_ESM` before anything is read.
pub fn legacy_js_loader(_runtime: &Runtime, module: &Module, filename: &Path) -> Result<()> {
    if is_esm_file(filename) {
        return Err(RegisterError::RequireEsm(filename.to_path_buf()));
    }

    let bytes = std::fs::read(filename).map_err(|err| RegisterError::io(filename, err))?;
    let code = String::from_utf8_lossy(&bytes);
    module.compile(&code, filename)
}

/// Loader for `.json` files: the parsed document becomes `module.exports`
pub fn json_loader(_runtime: &Runtime, module: &Module, filename: &Path) -> Result<()> {
    let content = std::fs::read_to_string(filename).map_err(|err| RegisterError::io(filename, err))?;
    let value = serde_json::from_str(&content).map_err(|source| RegisterError::Json {
        path: filename.to_path_buf(),
        source,
    })?;
    module.set_exports(value);
    Ok(())
}

/// Whether the legacy loader refuses `filename` as an ES module.
///
/// `.mjs` always is one; `.js` is one inside a `"type": "module"` package.
pub fn is_esm_file(filename: &Path) -> bool {
    match filename.extension().and_then(|e| e.to_str()) {
        Some("mjs") => true,
        Some("js") => package_type(filename).as_deref() == Some("module"),
        _ => false,
    }
}

/// The `type` field of the nearest package.json above `filename`
pub fn package_type(filename: &Path) -> Option<String> {
    filename
        .ancestors()
        .skip(1)
        .map(|dir| dir.join("package.json"))
        .find(|manifest| manifest.is_file())
        .and_then(|manifest| PackageJson::read(&manifest))
        .and_then(|pkg| pkg.module_type)
}
