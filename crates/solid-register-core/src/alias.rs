// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! Filename aliasing
//!
//! Rewrites a requested filename before it is loaded, e.g. to swap the
//! server build of a library for its dev or browser build, or a dependency
//! for a mock.

use crate::error::{RegisterError, Result};
use regex::Regex;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Filename rewrite applied once per load attempt
pub type AliasFn = Arc<dyn Fn(&Path) -> PathBuf + Send + Sync>;

/// An alias function that leaves every filename unchanged
pub fn identity() -> AliasFn {
    Arc::new(Path::to_path_buf)
}

/// Extensions aliases apply to unless configured otherwise
pub const DEFAULT_ALIAS_EXTENSIONS: &[&str] = &[".js", ".jsx", ".ts", ".tsx"];

/// Which solid-js build requires of the server build are redirected to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SolidEnvironment {
    /// Keep the server build
    Server,
    /// Development build (`dist/dev.js`)
    Dev,
    /// Browser build (`dist/solid.js`, `web/dist/web.js`, `store/dist/store.js`)
    Browser,
}

impl SolidEnvironment {
    /// Find/replace pairs redirecting the server build
    fn rules(self) -> &'static [(&'static str, &'static str)] {
        match self {
            Self::Server => &[],
            Self::Dev => &[(
                r"(solid-js[/\\](?:web[/\\]|store[/\\])?dist[/\\])server\.js$",
                "${1}dev.js",
            )],
            Self::Browser => &[
                (r"(solid-js[/\\]dist[/\\])server\.js$", "${1}solid.js"),
                (r"(solid-js[/\\]web[/\\]dist[/\\])server\.js$", "${1}web.js"),
                (r"(solid-js[/\\]store[/\\]dist[/\\])server\.js$", "${1}store.js"),
            ],
        }
    }
}

#[derive(Debug, Clone)]
struct AliasRule {
    find: Regex,
    replace: String,
}

/// Regex-based filename aliases
#[derive(Debug, Clone)]
pub struct Aliases {
    rules: Vec<AliasRule>,
    extensions: Vec<String>,
}

impl Aliases {
    /// No rules, default extensions
    pub fn new() -> Self {
        Self {
            rules: Vec::new(),
            extensions: DEFAULT_ALIAS_EXTENSIONS.iter().map(|e| e.to_string()).collect(),
        }
    }

    /// Restrict aliasing to files with these extensions
    pub fn with_extensions(mut self, extensions: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.extensions = extensions.into_iter().map(Into::into).collect();
        self
    }

    /// Add a rule; `replace` may reference capture groups as `$1`
    pub fn rule(mut self, find: &str, replace: impl Into<String>) -> Result<Self> {
        let regex = Regex::new(find).map_err(|source| RegisterError::InvalidAlias {
            pattern: find.to_string(),
            source,
        })?;
        self.rules.push(AliasRule {
            find: regex,
            replace: replace.into(),
        });
        Ok(self)
    }

    /// Add the rules for a solid-js environment
    pub fn solid(self, environment: SolidEnvironment) -> Result<Self> {
        environment
            .rules()
            .iter()
            .try_fold(self, |aliases, (find, replace)| aliases.rule(find, *replace))
    }

    /// Number of rules
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// Whether there are no rules
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Apply every rule in order to `filename`
    pub fn rewrite(&self, filename: &Path) -> PathBuf {
        if !self.applies_to(filename) {
            return filename.to_path_buf();
        }

        let rewritten = self
            .rules
            .iter()
            .fold(filename.to_string_lossy().into_owned(), |name, rule| {
                rule.find.replace_all(&name, rule.replace.as_str()).into_owned()
            });
        PathBuf::from(rewritten)
    }

    fn applies_to(&self, filename: &Path) -> bool {
        let name = filename.to_string_lossy();
        self.extensions.iter().any(|ext| name.ends_with(ext.as_str()))
    }

    /// Turn the rules into an [`AliasFn`]
    pub fn into_alias_fn(self) -> AliasFn {
        Arc::new(move |filename: &Path| self.rewrite(filename))
    }
}

impl Default for Aliases {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identity() {
        let alias = identity();
        assert_eq!(alias(Path::new("/a/b.ts")), PathBuf::from("/a/b.ts"));
    }

    #[test]
    fn test_user_rule_with_groups() {
        let aliases = Aliases::new().rule("my-dependency/(\\w+)", "my-dependency/mock/$1").unwrap();
        assert_eq!(
            aliases.rewrite(Path::new("/nm/my-dependency/index.js")),
            PathBuf::from("/nm/my-dependency/mock/index.js")
        );
    }

    #[test]
    fn test_extension_filter() {
        let aliases = Aliases::new().rule("foo", "bar").unwrap();
        assert_eq!(aliases.rewrite(Path::new("/foo.css")), PathBuf::from("/foo.css"));
        assert_eq!(aliases.rewrite(Path::new("/foo.tsx")), PathBuf::from("/bar.tsx"));

        let aliases = aliases.with_extensions([".css"]);
        assert_eq!(aliases.rewrite(Path::new("/foo.css")), PathBuf::from("/bar.css"));
    }

    #[test]
    fn test_solid_dev() {
        let aliases = Aliases::new().solid(SolidEnvironment::Dev).unwrap();
        assert_eq!(
            aliases.rewrite(Path::new("/p/node_modules/solid-js/dist/server.js")),
            PathBuf::from("/p/node_modules/solid-js/dist/dev.js")
        );
        assert_eq!(
            aliases.rewrite(Path::new("/p/node_modules/solid-js/web/dist/server.js")),
            PathBuf::from("/p/node_modules/solid-js/web/dist/dev.js")
        );
    }

    #[test]
    fn test_solid_browser() {
        let aliases = Aliases::new().solid(SolidEnvironment::Browser).unwrap();
        assert_eq!(aliases.len(), 3);
        assert_eq!(
            aliases.rewrite(Path::new("/nm/solid-js/dist/server.js")),
            PathBuf::from("/nm/solid-js/dist/solid.js")
        );
        assert_eq!(
            aliases.rewrite(Path::new("/nm/solid-js/store/dist/server.js")),
            PathBuf::from("/nm/solid-js/store/dist/store.js")
        );
    }

    #[test]
    fn test_solid_server_is_noop() {
        assert!(Aliases::new().solid(SolidEnvironment::Server).unwrap().is_empty());
    }

    #[test]
    fn test_invalid_rule() {
        let err = Aliases::new().rule("(", "x").unwrap_err();
        assert!(matches!(err, RegisterError::InvalidAlias { .. }));
    }
}
