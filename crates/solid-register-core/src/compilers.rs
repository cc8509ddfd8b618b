// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! Built-in compilers

use crate::error::{RegisterError, Result};
use crate::host::Module;
use crate::registry::Compiler;
use std::path::Path;
use std::sync::Arc;

/// Asset extensions whose modules export their own path
pub const DEFAULT_ASSET_EXTENSIONS: &[&str] = &[
    ".svg", ".png", ".jpg", ".jpeg", ".gif", ".webp", ".avif", ".ico", ".bmp", ".woff", ".woff2",
    ".ttf", ".otf", ".mp3", ".mp4", ".webm",
];

/// Replace an asset's content with `module.exports = "<filename>";`
pub fn asset_path() -> Compiler {
    Arc::new(asset_module)
}

fn asset_module(_module: &Module, _code: &str, filename: &Path) -> Result<String> {
    let path = filename.to_string_lossy();
    let literal = serde_json::to_string(path.as_ref()).map_err(|source| RegisterError::Json {
        path: filename.to_path_buf(),
        source,
    })?;
    Ok(format!("module.exports = {literal};"))
}
