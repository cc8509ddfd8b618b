// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! Configuration discovery and merging

use crate::config::SolidRegisterConfig;
use crate::error::{ConfigError, Result};
use serde_json::{json, Map, Value};
use std::path::{Component, Path, PathBuf};
use tracing::{debug, warn};

/// Manifest marking a project root
pub const MANIFEST_FILE: &str = "package.json";

/// Manifest key holding the configuration
pub const CONFIG_KEY: &str = "solid-register";

/// Dedicated configuration file in the project root
pub const CONFIG_FILE: &str = "solid-register-config.json";

/// A merged configuration and where it came from
#[derive(Debug, Clone)]
pub struct LoadedConfig {
    /// The merged configuration
    pub config: SolidRegisterConfig,
    /// Directory of the manifest, `./` when none was found
    pub project_root: PathBuf,
    /// The manifest that was used
    pub manifest: Option<PathBuf>,
    /// The dedicated config file, if one was applied
    pub config_file: Option<PathBuf>,
}

/// Built-in defaults, the lowest layer
fn defaults() -> Map<String, Value> {
    match json!({ "dom": "jsdom", "aliases": { "solid": "dev" } }) {
        Value::Object(map) => map,
        _ => Map::new(),
    }
}

/// Discover the configuration for a process started in `start`.
///
/// Walks from `start` upwards to the first directory with a parsable
/// `package.json`. Without one a warning is logged and the defaults are
/// used. A missing config file is fine; an unreadable or invalid one is an
/// error. A relative `start` is taken from the current directory.
pub fn discover(start: &Path) -> Result<LoadedConfig> {
    let cwd = std::env::current_dir().map_err(|source| ConfigError::Io {
        path: start.to_path_buf(),
        source,
    })?;
    discover_from(start, &cwd)
}

pub(crate) fn discover_from(start: &Path, cwd: &Path) -> Result<LoadedConfig> {
    let mut merged = defaults();

    let Some((manifest_path, manifest)) = find_manifest(&absolute(start, cwd)) else {
        warn!("package.json could not be found; maybe you're not in a project?");
        return Ok(LoadedConfig {
            config: finish(merged)?,
            project_root: PathBuf::from("./"),
            manifest: None,
            config_file: None,
        });
    };
    let project_root = manifest_path
        .parent()
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from("./"));
    debug!(manifest = %manifest_path.display(), "found project manifest");

    if let Some(section) = manifest.get(CONFIG_KEY) {
        overlay(&mut merged, section.clone(), &manifest_path)?;
    }

    let config_path = project_root.join(CONFIG_FILE);
    let config_file = match std::fs::read_to_string(&config_path) {
        Ok(content) => {
            let layer = serde_json::from_str(&content).map_err(|source| ConfigError::Json {
                path: config_path.clone(),
                source,
            })?;
            overlay(&mut merged, layer, &config_path)?;
            debug!(file = %config_path.display(), "applied config file");
            Some(config_path)
        }
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => None,
        Err(source) => {
            return Err(ConfigError::Io {
                path: config_path,
                source,
            });
        }
    };

    Ok(LoadedConfig {
        config: finish(merged)?,
        project_root,
        manifest: Some(manifest_path),
        config_file,
    })
}

/// `start` joined onto `cwd` with `.` and `..` folded away, so the upward
/// walk also covers the parents of `cwd`
fn absolute(start: &Path, cwd: &Path) -> PathBuf {
    cwd.join(start)
        .components()
        .fold(PathBuf::new(), |mut path, component| {
            match component {
                Component::CurDir => {}
                Component::ParentDir => {
                    path.pop();
                }
                other => path.push(other),
            }
            path
        })
}

/// The nearest readable, parsable manifest at or above `start`
fn find_manifest(start: &Path) -> Option<(PathBuf, Value)> {
    start.ancestors().find_map(|dir| {
        let path = dir.join(MANIFEST_FILE);
        let content = std::fs::read_to_string(&path).ok()?;
        match serde_json::from_str(&content) {
            Ok(value) => Some((path, value)),
            Err(err) => {
                debug!(path = %path.display(), error = %err, "skipping unparsable manifest");
                None
            }
        }
    })
}

/// Shallow merge: every top-level key of `layer` replaces the one in `base`
fn overlay(base: &mut Map<String, Value>, layer: Value, source: &Path) -> Result<()> {
    match layer {
        Value::Object(entries) => {
            base.extend(entries);
            Ok(())
        }
        Value::Null => Ok(()),
        _ => Err(ConfigError::NotAnObject(source.to_path_buf())),
    }
}

fn finish(merged: Map<String, Value>) -> Result<SolidRegisterConfig> {
    serde_json::from_value(Value::Object(merged)).map_err(ConfigError::Invalid)
}
