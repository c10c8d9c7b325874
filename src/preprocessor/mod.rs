//! Preprocessor
//!
//! Everything that rewrites a compile unit's text before it reaches the GPU
//! boundary:
//!
//! - [`defines`]: the define registry and value coercion
//! - [`include`]: `#include` resolution against the module store
//! - [`middleware`]: ordered source transforms run after include resolution
//! - [`conditional`]: `#if` / `#ifdef` evaluation for the final source
//!
//! The [`Preprocessor`] owns the define registry. Orchestration of a full
//! `process` pass lives on [`ShaderLib::process`](crate::ShaderLib::process),
//! because include lookups recurse into the library's own compile path.

pub mod conditional;
pub mod defines;
pub mod include;
pub mod middleware;

use std::fmt::Write as _;

pub use defines::{DefineValue, ShaderDefines};
pub use middleware::{Middleware, MiddlewarePipeline};

/// Marker line left behind by glslify-style tooling.
pub(crate) const TOOLING_MARKER: &str = "#define GLSLIFY 1\n";

/// Per-call options threaded through [`ShaderLib::process`](crate::ShaderLib::process)
/// and handed to every middleware.
#[derive(Debug, Clone, Default)]
pub struct ProcessOptions {
    /// Call-local defines, layered over the registry for this call only.
    pub defines: ShaderDefines,
}

impl ProcessOptions {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_define(mut self, key: &str, value: impl Into<DefineValue>) -> Self {
        self.defines.define(key, value);
        self
    }
}

/// Owner of the define registry.
///
/// Defines persist across compile calls until overwritten or removed.
#[derive(Debug, Clone, Default)]
pub struct Preprocessor {
    defines: ShaderDefines,
}

impl Preprocessor {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a define after value coercion.
    pub fn define(&mut self, key: &str, value: impl Into<DefineValue>) -> &mut Self {
        self.defines.define(key, value);
        self
    }

    /// Registers every `(name, value)` pair.
    pub fn define_all<I, K, V>(&mut self, defines: I) -> &mut Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<DefineValue>,
    {
        for (key, value) in defines {
            self.defines.define(key.as_ref(), value);
        }
        self
    }

    /// Merges an already coerced define set.
    pub fn merge(&mut self, defines: &ShaderDefines) -> &mut Self {
        self.defines.merge(defines);
        self
    }

    /// Registers the entries of a JSON object; `null` values are skipped.
    pub fn define_json(&mut self, defines: &serde_json::Map<String, serde_json::Value>) -> &mut Self {
        for (key, value) in defines {
            if let Some(value) = DefineValue::from_json(value) {
                self.defines.define(key, value);
            }
        }
        self
    }

    /// Removes a define. Returns whether it was registered.
    pub fn undefine(&mut self, key: &str) -> bool {
        self.defines.remove(key)
    }

    #[inline]
    #[must_use]
    pub fn defines(&self) -> &ShaderDefines {
        &self.defines
    }

    /// Writes `#define NAME VALUE` lines for the registry plus `overrides`.
    ///
    /// The block goes right after the last `#version` / `#extension`
    /// directive if there is one, otherwise at the very top.
    #[must_use]
    pub fn inject_defines(&self, source: &str, overrides: &ShaderDefines) -> String {
        let merged = self.defines.merged_with(overrides);
        if merged.is_empty() {
            return source.to_string();
        }

        let mut block = String::new();
        for (key, value) in merged.iter_strings() {
            let _ = writeln!(block, "#define {key} {value}");
        }

        let mut insert_at = None;
        let mut offset = 0;
        for line in source.split_inclusive('\n') {
            offset += line.len();
            if matches!(directive_name(line), Some("version" | "extension")) {
                insert_at = Some(offset);
            }
        }

        match insert_at {
            Some(at) => {
                let (head, tail) = source.split_at(at);
                let separator = if head.ends_with('\n') { "" } else { "\n" };
                format!("{head}{separator}{block}{tail}")
            }
            None => format!("{block}{source}"),
        }
    }
}

/// Name of the directive on a `#...` line (`"# include <x>"` → `"include"`).
#[must_use]
pub fn directive_name(line: &str) -> Option<&str> {
    let rest = line.trim_start().strip_prefix('#')?;
    let rest = rest.trim_start_matches([' ', '\t']);
    let end = rest
        .find(|c: char| !c.is_ascii_alphabetic())
        .unwrap_or(rest.len());
    (end > 0).then(|| &rest[..end])
}

/// Text following the directive name, with surrounding blanks trimmed.
#[must_use]
pub fn directive_body<'a>(line: &'a str, name: &str) -> &'a str {
    let Some(rest) = line.trim_start().strip_prefix('#') else {
        return "";
    };
    rest.trim_start_matches([' ', '\t'])
        .strip_prefix(name)
        .unwrap_or_default()
        .trim()
}
