// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! Configuration errors

use std::path::PathBuf;
use thiserror::Error;

/// Result type for configuration loading
pub type Result<T> = std::result::Result<T, ConfigError>;

/// Errors that abort startup
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The config file exists but could not be read
    #[error("Failed to read {}: {source}", .path.display())]
    Io {
        /// Config file
        path: PathBuf,
        /// Underlying error
        source: std::io::Error,
    },

    /// The config file is not valid JSON
    #[error("Invalid JSON in {}: {source}", .path.display())]
    Json {
        /// Config file
        path: PathBuf,
        /// Underlying error
        source: serde_json::Error,
    },

    /// A layer is not a JSON object
    #[error("Configuration in {} must be an object", .0.display())]
    NotAnObject(PathBuf),

    /// The merged configuration does not have the expected shape
    #[error("Invalid solid-register configuration: {0}")]
    Invalid(#[source] serde_json::Error),
}
