// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! Turns a project configuration into a ready [`SolidRegister`]

use solid_register_config::{AliasOptions, SolidAliasMode, SolidRegisterConfig};
use solid_register_core::compilers::{asset_path, DEFAULT_ASSET_EXTENSIONS};
use solid_register_core::{Aliases, SolidEnvironment, SolidRegister};
use std::path::Path;
use tracing::debug;

/// Build the register for `config`: aliases plus the built-in compilers.
///
/// The framework and CSS compilers are not built in; an embedder registers
/// them on the returned value before calling `init`.
pub fn build_register(config: &SolidRegisterConfig) -> solid_register_core::Result<SolidRegister> {
    let register = SolidRegister::new(aliases(&config.aliases)?.into_alias_fn());

    if let Some(extensions) = config.compile.asset_extensions() {
        let extensions = if extensions.is_empty() {
            DEFAULT_ASSET_EXTENSIONS.iter().map(|e| e.to_string()).collect()
        } else {
            extensions
        };
        let compiler = asset_path();
        for extension in extensions {
            register.register_shared(extension, compiler.clone());
        }
    }

    if let Some(solid) = &config.compile.solid {
        debug!(?solid, "framework compiler is external, not registering");
    }
    if config.compile.css_enabled() {
        debug!("CSS modules compiler is external, not registering");
    }
    if let Some((engine, url)) = config.dom() {
        debug!(?engine, %url, "DOM environment is provided by the test runner");
    }

    Ok(register)
}

/// Alias rules from the `aliases` section
pub fn aliases(options: &AliasOptions) -> solid_register_core::Result<Aliases> {
    let mut aliases = Aliases::new();
    if let Some(extensions) = &options.extensions {
        aliases = aliases.with_extensions(extensions.iter().cloned());
    }
    for (find, replace) in &options.filenames {
        aliases = aliases.rule(find, replace.clone())?;
    }
    match options.solid {
        Some(mode) => aliases.solid(environment(mode)),
        None => Ok(aliases),
    }
}

fn environment(mode: SolidAliasMode) -> SolidEnvironment {
    match mode {
        SolidAliasMode::Server => SolidEnvironment::Server,
        SolidAliasMode::Dev => SolidEnvironment::Dev,
        SolidAliasMode::Browser => SolidEnvironment::Browser,
    }
}

/// A command-line path as a require specifier
pub fn specifier(path: &Path) -> String {
    let path = path.to_string_lossy();
    if path.starts_with('/') || path.starts_with("./") || path.starts_with("../") {
        path.into_owned()
    } else {
        format!("./{path}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use solid_register_core::Runtime;
    use std::fs;
    use std::path::PathBuf;

    fn config(value: serde_json::Value) -> SolidRegisterConfig {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_specifier() {
        assert_eq!(specifier(Path::new("a.test.tsx")), "./a.test.tsx");
        assert_eq!(specifier(Path::new("./a.js")), "./a.js");
        assert_eq!(specifier(Path::new("/abs/a.js")), "/abs/a.js");
    }

    #[test]
    fn test_aliases_from_config() {
        let aliases = aliases(&config(json!({
            "aliases": { "filenames": { "api\\.js$": "api-mock.js" }, "solid": "dev" }
        })).aliases)
        .unwrap();

        assert_eq!(aliases.len(), 2);
        assert_eq!(aliases.rewrite(Path::new("/src/api.js")), PathBuf::from("/src/api-mock.js"));
    }

    #[test]
    fn test_assets_registered_for_defaults() {
        let register = build_register(&config(json!({ "compile": { "assets": true } }))).unwrap();
        assert_eq!(register.registry().len(), DEFAULT_ASSET_EXTENSIONS.len());
        assert!(register.registry().contains(".svg"));
    }

    #[test]
    fn test_asset_module_exports_path() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("logo.svg"), "<svg/>").unwrap();
        let runtime = Runtime::with_default_evaluator();
        let register =
            build_register(&config(json!({ "compile": { "assets": { "extensions": [".svg"] } } })))
                .unwrap();
        register.init(&runtime).unwrap();

        let exports = runtime.require_from_dir("./logo.svg", dir.path()).unwrap();
        let expected = dir.path().join("logo.svg").canonicalize().unwrap();
        assert_eq!(exports, json!(expected.to_string_lossy()));
    }

    #[test]
    fn test_no_assets_by_default() {
        let register = build_register(&SolidRegisterConfig::default()).unwrap();
        assert!(register.registry().is_empty());
    }

    #[test]
    fn test_external_compilers_are_not_registered() {
        let register = build_register(&config(json!({
            "compile": { "solid": true, "css": true },
            "dom": "jsdom"
        })))
        .unwrap();
        assert!(register.registry().is_empty());
    }
}
