//! Module Store
//!
//! Maps normalized virtual paths to raw GLSL fragments. Registration is lazy:
//! a fragment's own includes are resolved only when something includes it
//! (see [`ShaderLib::get`](super::ShaderLib::get)).
//!
//! The built-in fragment library lives in `src/library/chunks/*.glsl` and is
//! embedded at build time. A chunk's store path is its file path relative to
//! that folder, without the extension.

use rust_embed::RustEmbed;
use rustc_hash::FxHashMap;
use serde_json::Value;

use crate::glsl::path;

#[derive(RustEmbed)]
#[folder = "src/library/chunks"]
struct BuiltinChunks;

#[derive(Debug, Clone, Default)]
pub struct ModuleStore {
    modules: FxHashMap<String, String>,
}

impl ModuleStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A store pre-populated with the built-in fragment library.
    #[must_use]
    pub fn with_builtins() -> Self {
        let mut store = Self::new();
        store.add_builtins();
        store
    }

    /// Registers (or overwrites) a fragment.
    pub fn add(&mut self, path: &str, source: &str) {
        self.modules.insert(path::normalize(path), source.to_string());
    }

    /// Flattens a nested mapping into slash-joined paths.
    ///
    /// String leaves are registered, nested objects are walked, anything else
    /// is ignored.
    pub fn add_tree(&mut self, tree: &Value) {
        let mut stack = Vec::new();
        self.walk(&mut stack, tree);
    }

    fn walk(&mut self, stack: &mut Vec<String>, scope: &Value) {
        let Value::Object(entries) = scope else {
            return;
        };

        for (key, value) in entries {
            stack.push(key.clone());
            match value {
                Value::Object(_) => self.walk(stack, value),
                Value::String(source) => self.add(&stack.join("/"), source),
                _ => {}
            }
            stack.pop();
        }
    }

    /// Registers every embedded chunk.
    pub fn add_builtins(&mut self) {
        for file in BuiltinChunks::iter() {
            let Some(chunk) = BuiltinChunks::get(&file) else {
                continue;
            };
            let source = String::from_utf8_lossy(&chunk.data);
            let key = path::strip_extension(&file).replace('\\', "/");
            self.add(&key, &source);
        }
        log::debug!("Registered {} built-in GLSL chunks", self.modules.len());
    }

    /// Raw, unresolved source of a fragment.
    #[must_use]
    pub fn source(&self, path: &str) -> Option<&str> {
        self.modules.get(path).map(String::as_str)
    }

    #[must_use]
    pub fn contains(&self, path: &str) -> bool {
        self.modules.contains_key(path)
    }

    pub fn remove(&mut self, path: &str) -> Option<String> {
        self.modules.remove(&path::normalize(path))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.modules.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }

    /// Registered paths in sorted order.
    #[must_use]
    pub fn paths(&self) -> Vec<&str> {
        let mut paths: Vec<&str> = self.modules.keys().map(String::as_str).collect();
        paths.sort_unstable();
        paths
    }
}
