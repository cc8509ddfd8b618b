// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! Module path resolution (Node.js algorithm)

use crate::error::{RegisterError, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Resolves require specifiers to files.
///
/// The extension list is supplied per call, since it is whatever the
/// runtime's loader table holds at that moment.
#[derive(Debug, Default)]
pub struct ModuleResolver;

impl ModuleResolver {
    /// Create a new module resolver
    pub fn new() -> Self {
        Self
    }

    /// Resolve `specifier` relative to `base_dir`
    pub fn resolve(
        &self,
        specifier: &str,
        base_dir: &Path,
        extensions: &[String],
    ) -> Result<PathBuf> {
        let is_path = specifier.starts_with("./")
            || specifier.starts_with("../")
            || specifier == "."
            || specifier == ".."
            || Path::new(specifier).is_absolute();

        let found = if is_path {
            let path = base_dir.join(specifier);
            self.resolve_file(&path, extensions)
                .or_else(|| self.resolve_directory(&path, extensions))
        } else {
            self.resolve_node_modules(specifier, base_dir, extensions)
        };

        found
            .map(|path| canonical(&path))
            .ok_or_else(|| RegisterError::ModuleNotFound(specifier.to_string()))
    }

    /// Try the exact path, then the path with each extension appended
    fn resolve_file(&self, path: &Path, extensions: &[String]) -> Option<PathBuf> {
        if path.is_file() {
            return Some(path.to_path_buf());
        }

        let name = path.file_name()?.to_string_lossy();
        extensions
            .iter()
            .map(|ext| path.with_file_name(format!("{name}{ext}")))
            .find(|candidate| candidate.is_file())
    }

    /// Resolve a directory through package.json `main` or an index file
    fn resolve_directory(&self, dir: &Path, extensions: &[String]) -> Option<PathBuf> {
        if !dir.is_dir() {
            return None;
        }

        if let Some(main) = PackageJson::read(&dir.join("package.json")).and_then(|pkg| pkg.main) {
            let main_path = dir.join(main);
            if let Some(found) = self
                .resolve_file(&main_path, extensions)
                .or_else(|| self.resolve_index(&main_path, extensions))
            {
                return Some(found);
            }
        }

        self.resolve_index(dir, extensions)
    }

    fn resolve_index(&self, dir: &Path, extensions: &[String]) -> Option<PathBuf> {
        extensions
            .iter()
            .map(|ext| dir.join(format!("index{ext}")))
            .find(|candidate| candidate.is_file())
    }

    /// Resolve a package from the nearest node_modules directories
    fn resolve_node_modules(
        &self,
        specifier: &str,
        base_dir: &Path,
        extensions: &[String],
    ) -> Option<PathBuf> {
        let (package_name, subpath) = parse_package_specifier(specifier);

        for dir in base_dir.ancestors() {
            if dir.file_name().is_some_and(|name| name == "node_modules") {
                continue;
            }
            let package_dir = dir.join("node_modules").join(package_name);
            if !package_dir.exists() {
                continue;
            }

            let found = match subpath {
                Some(sub) => {
                    let target = package_dir.join(sub);
                    self.resolve_file(&target, extensions)
                        .or_else(|| self.resolve_directory(&target, extensions))
                }
                None => self.resolve_directory(&package_dir, extensions),
            };
            if found.is_some() {
                return found;
            }
        }

        None
    }
}

/// Split a bare specifier into package name and optional subpath
fn parse_package_specifier(specifier: &str) -> (&str, Option<&str>) {
    let name_len = if specifier.starts_with('@') {
        // @scope/name[/subpath]
        match specifier.find('/') {
            Some(scope_end) => specifier[scope_end + 1..]
                .find('/')
                .map_or(specifier.len(), |pos| scope_end + 1 + pos),
            None => specifier.len(),
        }
    } else {
        specifier.find('/').unwrap_or(specifier.len())
    };

    if name_len < specifier.len() {
        (&specifier[..name_len], Some(&specifier[name_len + 1..]))
    } else {
        (specifier, None)
    }
}

fn canonical(path: &Path) -> PathBuf {
    path.canonicalize().unwrap_or_else(|_| path.to_path_buf())
}

/// The package.json fields loading cares about
#[derive(Debug, Default, Deserialize)]
pub(crate) struct PackageJson {
    pub(crate) main: Option<String>,
    #[serde(rename = "type")]
    pub(crate) module_type: Option<String>,
}

impl PackageJson {
    /// Read a package.json, treating unreadable or invalid files as absent
    pub(crate) fn read(path: &Path) -> Option<Self> {
        let content = std::fs::read_to_string(path).ok()?;
        match serde_json::from_str(&content) {
            Ok(pkg) => Some(pkg),
            Err(err) => {
                tracing::debug!(path = %path.display(), error = %err, "ignoring invalid package.json");
                None
            }
        }
    }
}
