// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! # solid-register-config
//!
//! Locates and merges the solid-register configuration of a project.
//!
//! Layers, later ones winning key by key at the top level:
//!
//! 1. built-in defaults (`dom: "jsdom"`, `aliases: { solid: "dev" }`)
//! 2. the `"solid-register"` key of the nearest `package.json`
//! 3. `solid-register-config.json` next to that `package.json`

#![warn(missing_docs)]
#![warn(clippy::all)]

mod config;
mod error;
mod loader;

pub use config::{
    AliasOptions, AssetOptions, CompileOptions, DomEngine, DomOption, SolidAliasMode,
    SolidCompile, SolidEngine, SolidRegisterConfig, DEFAULT_DOM_URL,
};
pub use error::{ConfigError, Result};
pub use loader::{discover, LoadedConfig, CONFIG_FILE, CONFIG_KEY, MANIFEST_FILE};
