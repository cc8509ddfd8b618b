// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! Evaluation of compiled module code

use crate::error::{RegisterError, Result};
use crate::host::module::Module;
use crate::host::runtime::Runtime;
use regex::Regex;
use serde_json::Value;
use std::path::Path;
use std::sync::LazyLock;
use tracing::trace;

/// Evaluates the final, compiled code of a module.
///
/// This is the bottom of every compile chain: whatever the hooks produce is
/// handed here. An embedder with a real engine implements this trait; it
/// receives the runtime so nested `require` calls go back through the hooks.
pub trait Evaluator: Send + Sync {
    /// Evaluate `code` as the body of `module`
    fn evaluate(&self, runtime: &Runtime, module: &Module, code: &str, filename: &Path)
    -> Result<()>;
}

static EXPORT_DECL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*export\s+(?:const|let|var)\s+([A-Za-z_\$][\w\$]*)\s*=\s*(.+?)\s*(?:;|$)")
        .expect("valid export declaration regex")
});
static EXPORT_ASSIGN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*(?:module\.)?exports\.([A-Za-z_\$][\w\$]*)\s*=\s*(.+?)\s*(?:;|$)")
        .expect("valid exports assignment regex")
});
static MODULE_ASSIGN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*module\.exports\s*=\s*(.+?)\s*(?:;|$)")
        .expect("valid module.exports regex")
});
static REQUIRE_CALL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"require\(\s*["']([^"']+)["']\s*\)"#).expect("valid require regex")
});
static IMPORT_DECL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"^\s*import\s+(?:.+?\s+from\s+)?["']([^"']+)["']"#).expect("valid import regex")
});

/// Line-based evaluator for literal modules.
///
/// Records the evaluated source on the module and understands:
///
/// - `export const|let|var name = <literal>`
/// - `exports.name = <literal>` and `module.exports.name = <literal>`
/// - `module.exports = <literal>`
/// - `require("<specifier>")` anywhere and `import ... from "<specifier>"`,
///   loaded through the runtime; a bare `require(...)` right-hand side of
///   one of the forms above yields the required exports
/// - a line starting with `throw` fails the evaluation
///
/// Literals are JSON values, single-quoted strings or `undefined`. Any other
/// right-hand side is skipped.
#[derive(Debug, Default)]
pub struct StaticEvaluator;

impl StaticEvaluator {
    /// Create the evaluator
    pub fn new() -> Self {
        Self
    }

    /// Evaluate a right-hand side
    fn value(&self, runtime: &Runtime, rhs: &str, filename: &Path) -> Result<Option<Value>> {
        if let Some(caps) = REQUIRE_CALL.captures(rhs) {
            if caps.get(0).is_some_and(|m| m.as_str() == rhs) {
                return runtime.require(&caps[1], filename).map(Some);
            }
        }
        Ok(literal(rhs))
    }

    fn bind(
        &self,
        runtime: &Runtime,
        module: &Module,
        name: &str,
        rhs: &str,
        filename: &Path,
    ) -> Result<()> {
        match self.value(runtime, rhs, filename)? {
            Some(value) => module.set_export(name, value),
            None => {
                self.require_all(runtime, rhs, filename)?;
                trace!(export = name, "skipping non-literal export");
            }
        }
        Ok(())
    }

    fn require_all(&self, runtime: &Runtime, line: &str, filename: &Path) -> Result<()> {
        for caps in REQUIRE_CALL.captures_iter(line) {
            runtime.require(&caps[1], filename)?;
        }
        Ok(())
    }
}

impl Evaluator for StaticEvaluator {
    fn evaluate(
        &self,
        runtime: &Runtime,
        module: &Module,
        code: &str,
        filename: &Path,
    ) -> Result<()> {
        module.set_source(code);

        for (number, line) in code.lines().enumerate() {
            if let Some(caps) = EXPORT_DECL.captures(line) {
                self.bind(runtime, module, &caps[1], &caps[2], filename)?;
            } else if let Some(caps) = EXPORT_ASSIGN.captures(line) {
                self.bind(runtime, module, &caps[1], &caps[2], filename)?;
            } else if let Some(caps) = MODULE_ASSIGN.captures(line) {
                match self.value(runtime, &caps[1], filename)? {
                    Some(value) => module.set_exports(value),
                    None => trace!(line = number + 1, "skipping non-literal module.exports"),
                }
            } else if let Some(caps) = IMPORT_DECL.captures(line) {
                runtime.require(&caps[1], filename)?;
            } else if line.trim_start().starts_with("throw ") {
                return Err(RegisterError::evaluation(filename, line.trim()));
            } else {
                self.require_all(runtime, line, filename)?;
            }
        }

        Ok(())
    }
}

/// Parse a literal right-hand side
fn literal(rhs: &str) -> Option<Value> {
    if rhs == "undefined" {
        return Some(Value::Null);
    }
    if let Ok(value) = serde_json::from_str(rhs) {
        return Some(value);
    }
    rhs.strip_prefix('\'')
        .and_then(|s| s.strip_suffix('\''))
        .filter(|s| !s.contains('\''))
        .map(|s| Value::String(s.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::module::CompileFn;
    use serde_json::json;

    fn noop() -> CompileFn {
        std::sync::Arc::new(|_: &Module, _: &str, _: &Path| Ok(()))
    }

    #[test]
    fn test_literal() {
        assert_eq!(literal("1"), Some(json!(1)));
        assert_eq!(literal("\"a\""), Some(json!("a")));
        assert_eq!(literal("'a'"), Some(json!("a")));
        assert_eq!(literal("[1, 2]"), Some(json!([1, 2])));
        assert_eq!(literal("undefined"), Some(Value::Null));
        assert_eq!(literal("foo()"), None);
    }

    #[test]
    fn test_export_forms() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("a.js");
        let runtime = Runtime::with_default_evaluator();
        let module = Module::new(file.clone(), None, noop());

        let code = "export const x = 1;// compiled\nexports.y = 'two';\nmodule.exports.z = true\nconst w = compute();";
        StaticEvaluator.evaluate(&runtime, &module, code, &file).unwrap();

        assert_eq!(module.exports(), json!({ "x": 1, "y": "two", "z": true }));
        assert_eq!(module.source().as_deref(), Some(code));
    }

    #[test]
    fn test_module_exports_assignment() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("a.js");
        let runtime = Runtime::with_default_evaluator();
        let module = Module::new(file.clone(), None, noop());

        StaticEvaluator::new()
            .evaluate(&runtime, &module, "module.exports = \"/assets/logo.svg\";", &file)
            .unwrap();
        assert_eq!(module.exports(), json!("/assets/logo.svg"));
    }

    #[test]
    fn test_throw_fails_evaluation() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("a.js");
        let runtime = Runtime::with_default_evaluator();
        let module = Module::new(file.clone(), None, noop());

        let err = StaticEvaluator::new()
            .evaluate(&runtime, &module, "throw new Error('boom');", &file)
            .unwrap_err();
        assert!(matches!(err, RegisterError::Evaluation { .. }));
    }
}
