// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! CommonJS host runtime
//!
//! A small `require()` implementation with the extension points the hooks
//! need:
//!
//! - a per-extension loader table that can be read and replaced
//! - a legacy `.js` loader that rejects ES modules with `ERR_REQUIRE_ESM`
//! - a per-module compile entry point that can be read, saved and reassigned
//! - a module cache keyed by resolved filename

mod cache;
mod evaluator;
mod loader;
mod module;
mod resolver;
mod runtime;

pub use cache::ModuleCache;
pub use evaluator::{Evaluator, StaticEvaluator};
pub use loader::{is_esm_file, json_loader, legacy_js_loader, package_type};
pub use module::{CompileFn, Module};
pub use resolver::ModuleResolver;
pub use runtime::{LoaderFn, Runtime};
