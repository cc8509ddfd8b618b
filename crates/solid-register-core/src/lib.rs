// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! # solid-register-core
//!
//! Compile-on-require hooks for a CommonJS host runtime.
//!
//! Source files (components, TypeScript, JSX, assets) are compiled at the
//! moment they are required instead of in a separate build step:
//!
//! - a [`CompilerRegistry`] maps file extensions to ordered compiler chains
//! - [`SolidRegister::init`] replaces the host's extension loaders with hooks
//!   that rewrite filenames through an alias function and thread the module
//!   source through the chain
//! - ES module files rejected by the legacy loader are read and compiled
//!   directly instead
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use solid_register_core::{Runtime, SolidRegister, alias};
//!
//! let runtime = Runtime::with_default_evaluator();
//! let register = SolidRegister::new(alias::identity());
//! register.register_compiler(".sld", |_module: &solid_register_core::Module, code: &str, _filename: &std::path::Path| {
//!     Ok(format!("{code}// compiled"))
//! });
//! register.init(&runtime)?;
//!
//! let exports = runtime.require("./a.sld", std::path::Path::new("/project/index.js"))?;
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod alias;
pub mod compilers;
pub mod error;
pub mod fallback;
pub mod host;
pub mod installer;
pub mod registry;

// Re-exports
pub use alias::{AliasFn, Aliases, SolidEnvironment};
pub use error::{RegisterError, Result};
pub use host::{CompileFn, Evaluator, LoaderFn, Module, ModuleCache, Runtime, StaticEvaluator};
pub use installer::{LoadOrchestrator, SolidRegister, DEFAULT_EXTENSION};
pub use registry::{Compiler, CompilerRegistry};

/// Version of solid-register-core
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
