// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! Configuration model

use serde::de::{MapAccess, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// URL the DOM environment is created with unless configured
pub const DEFAULT_DOM_URL: &str = "https://localhost:3000";

/// Project configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SolidRegisterConfig {
    /// Which compilers to register
    pub compile: CompileOptions,
    /// DOM implementation and URL
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dom: Option<DomOption>,
    /// Filename aliasing
    pub aliases: AliasOptions,
    /// Files required before anything else
    pub setup_files: Vec<String>,
}

/// `compile` section
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CompileOptions {
    /// Framework compiler selection
    #[serde(skip_serializing_if = "Option::is_none")]
    pub solid: Option<SolidCompile>,
    /// CSS (modules) compilation, on unless `false`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub css: Option<bool>,
    /// Asset path modules
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assets: Option<AssetOptions>,
}

/// `compile.solid`: a switch or an engine selection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SolidCompile {
    /// Default engine on or off
    Enabled(bool),
    /// Explicit engine
    Engine(SolidEngine),
}

/// Framework compile engine
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "engine", rename_all = "kebab-case")]
pub enum SolidEngine {
    /// Solid's own transform
    Solid {
        /// Extensions to compile
        #[serde(default, skip_serializing_if = "Option::is_none")]
        extensions: Option<Vec<String>>,
    },
    /// ts-node
    TsNode,
    /// Babel with the given extensions
    Babel {
        /// Extensions to compile
        extensions: Vec<String>,
    },
}

/// `compile.assets`: a switch or an extension list
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AssetOptions {
    /// Default asset extensions on or off
    Enabled(bool),
    /// Explicit extensions, including the dot
    Extensions {
        /// e.g. `[".svg", ".csv"]`
        extensions: Vec<String>,
    },
}

impl CompileOptions {
    /// Asset extensions to register, `None` when assets are off.
    ///
    /// An empty list means the caller's defaults.
    pub fn asset_extensions(&self) -> Option<Vec<String>> {
        match &self.assets {
            None | Some(AssetOptions::Enabled(false)) => None,
            Some(AssetOptions::Enabled(true)) => Some(Vec::new()),
            Some(AssetOptions::Extensions { extensions }) => Some(extensions.clone()),
        }
    }

    /// Whether CSS compilation is wanted
    pub fn css_enabled(&self) -> bool {
        self.css.unwrap_or(true)
    }
}

/// DOM implementation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DomEngine {
    /// jsdom
    Jsdom,
    /// happy-dom
    HappyDom,
    /// linkedom
    Linkedom,
}

/// `dom`: an engine name, an engine with URL, or `false`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DomOption {
    /// `false` disables the DOM
    Enabled(bool),
    /// Engine name
    Engine(DomEngine),
    /// Engine and URL
    Detailed {
        /// Engine
        engine: DomEngine,
        /// URL, [`DEFAULT_DOM_URL`] if absent
        #[serde(default, skip_serializing_if = "Option::is_none")]
        url: Option<String>,
    },
}

impl SolidRegisterConfig {
    /// The DOM engine and URL to set up, if any
    pub fn dom(&self) -> Option<(DomEngine, String)> {
        match &self.dom {
            None | Some(DomOption::Enabled(false)) => None,
            Some(DomOption::Enabled(true)) => Some((DomEngine::Jsdom, DEFAULT_DOM_URL.to_string())),
            Some(DomOption::Engine(engine)) => Some((*engine, DEFAULT_DOM_URL.to_string())),
            Some(DomOption::Detailed { engine, url }) => Some((
                *engine,
                url.clone().unwrap_or_else(|| DEFAULT_DOM_URL.to_string()),
            )),
        }
    }
}

/// solid-js build selected through aliases
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SolidAliasMode {
    /// Server build
    Server,
    /// Development build
    Dev,
    /// Browser build
    Browser,
}

/// `aliases` section
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AliasOptions {
    /// Regex find -> replacement, applied in document order
    #[serde(
        deserialize_with = "ordered_pairs",
        serialize_with = "pairs_as_map",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub filenames: Vec<(String, String)>,
    /// Extensions aliases apply to, including the dot
    #[serde(skip_serializing_if = "Option::is_none")]
    pub extensions: Option<Vec<String>>,
    /// solid-js environment
    #[serde(skip_serializing_if = "Option::is_none")]
    pub solid: Option<SolidAliasMode>,
}

/// Deserialize a JSON object into its entries, keeping their order
fn ordered_pairs<'de, D>(deserializer: D) -> std::result::Result<Vec<(String, String)>, D::Error>
where
    D: Deserializer<'de>,
{
    struct PairsVisitor;

    impl<'de> Visitor<'de> for PairsVisitor {
        type Value = Vec<(String, String)>;

        fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str("an object of pattern/replacement strings")
        }

        fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> std::result::Result<Self::Value, A::Error> {
            let mut pairs = Vec::with_capacity(map.size_hint().unwrap_or(0));
            while let Some(entry) = map.next_entry::<String, String>()? {
                pairs.push(entry);
            }
            Ok(pairs)
        }
    }

    deserializer.deserialize_map(PairsVisitor)
}

fn pairs_as_map<S: Serializer>(pairs: &[(String, String)], serializer: S) -> std::result::Result<S::Ok, S::Error> {
    serializer.collect_map(pairs.iter().map(|(k, v)| (k, v)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_full_shape() {
        let config: SolidRegisterConfig = serde_json::from_value(json!({
            "compile": {
                "solid": { "engine": "babel", "extensions": [".jsx"] },
                "css": false,
                "assets": { "extensions": [".svg", ".csv"] }
            },
            "dom": { "engine": "happy-dom", "url": "http://test" },
            "aliases": {
                "filenames": { "z-dep": "z-mock", "a-dep": "a-mock" },
                "extensions": [".js"],
                "solid": "browser"
            },
            "setupFiles": ["./setup.js"]
        }))
        .unwrap();

        assert_eq!(
            config.compile.solid,
            Some(SolidCompile::Engine(SolidEngine::Babel { extensions: vec![".jsx".into()] }))
        );
        assert!(!config.compile.css_enabled());
        assert_eq!(
            config.compile.asset_extensions(),
            Some(vec![".svg".to_string(), ".csv".to_string()])
        );
        assert_eq!(config.dom(), Some((DomEngine::HappyDom, "http://test".to_string())));
        assert_eq!(
            config.aliases.filenames,
            vec![
                ("z-dep".to_string(), "z-mock".to_string()),
                ("a-dep".to_string(), "a-mock".to_string())
            ]
        );
        assert_eq!(config.aliases.solid, Some(SolidAliasMode::Browser));
        assert_eq!(config.setup_files, vec!["./setup.js"]);
    }

    #[test]
    fn test_switches() {
        let config: SolidRegisterConfig = serde_json::from_value(json!({
            "compile": { "solid": true, "assets": true },
            "dom": false
        }))
        .unwrap();

        assert_eq!(config.compile.solid, Some(SolidCompile::Enabled(true)));
        assert_eq!(config.compile.asset_extensions(), Some(vec![]));
        assert!(config.compile.css_enabled());
        assert_eq!(config.dom(), None);
    }

    #[test]
    fn test_engine_names() {
        let ts: SolidEngine = serde_json::from_value(json!({ "engine": "ts-node" })).unwrap();
        assert_eq!(ts, SolidEngine::TsNode);
        let dom: DomOption = serde_json::from_value(json!("linkedom")).unwrap();
        assert_eq!(dom, DomOption::Engine(DomEngine::Linkedom));
    }

    #[test]
    fn test_rejects_unknown_dom_engine() {
        let result: std::result::Result<SolidRegisterConfig, _> =
            serde_json::from_value(json!({ "dom": "servo" }));
        assert!(result.is_err());
    }
}
