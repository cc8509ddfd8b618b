// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! Error types for module loading and compilation

use std::path::{Path, PathBuf};
use thiserror::Error;

/// Result type for loading operations
pub type Result<T> = std::result::Result<T, RegisterError>;

/// Error code the host reports when its legacy loader is handed an ES module
pub const ERR_REQUIRE_ESM: &str = "ERR_REQUIRE_ESM";

/// Error code for unresolvable specifiers
pub const MODULE_NOT_FOUND: &str = "MODULE_NOT_FOUND";

/// Errors surfaced at the `require` call site
#[derive(Debug, Error)]
pub enum RegisterError {
    /// Module not found
    #[error("Cannot find module '{0}'")]
    ModuleNotFound(String),

    /// The legacy CommonJS loader cannot load an ES module
    #[error("require() of ES Module {} not supported", .0.display())]
    RequireEsm(PathBuf),

    /// No loader is registered for the extension
    #[error("No loader registered for extension '{0}'")]
    NoLoader(String),

    /// A loader failed without giving a reason
    #[error("loader failed without a reason")]
    Unspecified,

    /// Normalized replacement for [`RegisterError::Unspecified`]
    #[error("error when compiling {}", .0.display())]
    Compile(PathBuf),

    /// A registered compiler rejected its input
    #[error("{extension} compiler failed on {}: {reason}", .filename.display())]
    Compiler {
        /// Extension the compiler is registered for
        extension: String,
        /// File being compiled
        filename: PathBuf,
        /// Reason for failure
        reason: String,
    },

    /// The evaluator rejected compiled code
    #[error("Evaluation of {} failed: {reason}", .filename.display())]
    Evaluation {
        /// File being evaluated
        filename: PathBuf,
        /// Reason for failure
        reason: String,
    },

    /// Reading a module from disk failed
    #[error("Failed to read {}: {source}", .path.display())]
    Io {
        /// File that could not be read
        path: PathBuf,
        /// Underlying error
        source: std::io::Error,
    },

    /// JSON module or package.json could not be parsed
    #[error("Invalid JSON in {}: {source}", .path.display())]
    Json {
        /// Offending file
        path: PathBuf,
        /// Underlying error
        source: serde_json::Error,
    },

    /// An alias rule is not a valid regular expression
    #[error("Invalid alias pattern '{pattern}': {source}")]
    InvalidAlias {
        /// The rejected pattern
        pattern: String,
        /// Underlying error
        source: regex::Error,
    },

    /// The runtime owning a module was dropped while the module was loading
    #[error("Runtime dropped while loading {}", .0.display())]
    RuntimeDropped(PathBuf),
}

impl RegisterError {
    /// Node-style error code, if the error has one
    pub fn code(&self) -> Option<&'static str> {
        match self {
            Self::RequireEsm(_) => Some(ERR_REQUIRE_ESM),
            Self::ModuleNotFound(_) => Some(MODULE_NOT_FOUND),
            _ => None,
        }
    }

    /// Whether this is the legacy loader rejecting an ES module
    pub fn is_require_esm(&self) -> bool {
        self.code() == Some(ERR_REQUIRE_ESM)
    }

    /// Whether the error carries no information
    pub fn is_unspecified(&self) -> bool {
        matches!(self, Self::Unspecified)
    }

    /// Create an I/O error for `path`
    pub fn io(path: &Path, source: std::io::Error) -> Self {
        Self::Io {
            path: path.to_path_buf(),
            source,
        }
    }

    /// Create a compiler failure
    pub fn compiler(
        extension: impl Into<String>,
        filename: &Path,
        reason: impl Into<String>,
    ) -> Self {
        Self::Compiler {
            extension: extension.into(),
            filename: filename.to_path_buf(),
            reason: reason.into(),
        }
    }

    /// Create an evaluation failure
    pub fn evaluation(filename: &Path, reason: impl Into<String>) -> Self {
        Self::Evaluation {
            filename: filename.to_path_buf(),
            reason: reason.into(),
        }
    }
}
