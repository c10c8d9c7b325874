//! Shader Library
//!
//! [`ShaderLib`] ties the module store, the define registry, the middleware
//! pipeline and the compilation cache together behind one compile entry
//! point. A compile unit goes through:
//!
//! 1. cache lookup on the raw source hash (a hit returns immediately)
//! 2. removal of a trailing `SHADER_NAME` guard block
//! 3. define injection, include resolution and middleware ([`ShaderLib::process`])
//! 4. precision header injection
//! 5. blank line removal
//!
//! The final string is stored in the cache and shared with every caller that
//! submits the same raw source afterwards.

pub mod cache;
pub mod settings;
pub mod store;

use std::sync::{Arc, OnceLock};

use regex::Regex;
use serde_json::Value;

pub use cache::{CacheStats, CompilationCache};
pub use settings::{CacheKeyPolicy, DEFAULT_MAX_INCLUDE_DEPTH, DEFAULT_PRECISION, ShaderLibSettings};
pub use store::ModuleStore;

use crate::errors::{IncludeStack, Result};
use crate::glsl::{GlslVersion, path, tokens_to_string};
use crate::preprocessor::conditional::ConditionalPass;
use crate::preprocessor::include::IncludeResolver;
use crate::preprocessor::{
    DefineValue, Middleware, MiddlewarePipeline, Preprocessor, ProcessOptions, ShaderDefines,
    TOOLING_MARKER, directive_name,
};
use crate::utils::interner;

/// Name given to compile units submitted without one.
pub const ANONYMOUS_SHADER_NAME: &str = "<anonymous>";

fn shader_name_guard() -> &'static Regex {
    static GUARD: OnceLock<Regex> = OnceLock::new();
    GUARD.get_or_init(|| {
        Regex::new(r"\s?#ifndef SHADER_NAME\s?\n#define SHADER_NAME\s?.*\n#endif\n?$")
            .expect("shader name guard pattern is valid")
    })
}

fn precision_statement() -> &'static Regex {
    static PRECISION: OnceLock<Regex> = OnceLock::new();
    PRECISION.get_or_init(|| {
        Regex::new(r"[ \t]*\bprecision\s+[a-z]+\s+[a-zA-Z]+[ \t]*;[ \t\r]*")
            .expect("precision statement pattern is valid")
    })
}

#[derive(Debug)]
pub struct ShaderLib {
    precision: String,
    version: GlslVersion,
    max_include_depth: usize,
    cache_key: CacheKeyPolicy,

    store: ModuleStore,
    cache: CompilationCache,
    preprocessor: Preprocessor,
    middleware: MiddlewarePipeline,
}

impl Default for ShaderLib {
    fn default() -> Self {
        Self::new(ShaderLibSettings::default())
    }
}

impl ShaderLib {
    #[must_use]
    pub fn new(settings: ShaderLibSettings) -> Self {
        interner::preload_common_macros();

        let mut store = if settings.include_builtins {
            ModuleStore::with_builtins()
        } else {
            ModuleStore::new()
        };
        store.add_tree(&settings.glsl);

        let mut preprocessor = Preprocessor::new();
        preprocessor.define_json(&settings.defines);

        log::debug!(
            "ShaderLib created: {} modules, {} defines, precision '{}', GLSL {}",
            store.len(),
            preprocessor.defines().len(),
            settings.precision,
            settings.version
        );

        Self {
            precision: settings.precision,
            version: settings.version,
            max_include_depth: settings.max_include_depth,
            cache_key: settings.cache_key,
            store,
            cache: CompilationCache::new(),
            preprocessor,
            middleware: MiddlewarePipeline::new(),
        }
    }

    /// Builds a library from a JSON [`ShaderLibSettings`] document.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(Self::new(ShaderLibSettings::from_json(json)?))
    }

    // ========================================================================
    // Module Store
    // ========================================================================

    /// Registers (or overwrites) a fragment under `path`.
    pub fn add(&mut self, path: &str, source: &str) -> &mut Self {
        self.store.add(path, source);
        self
    }

    /// Registers every string leaf of a nested mapping.
    pub fn add_tree(&mut self, tree: &Value) -> &mut Self {
        self.store.add_tree(tree);
        self
    }

    /// Compiled (include-resolved) form of a stored fragment.
    ///
    /// Returns `Ok(None)` when nothing is registered under `path`.
    pub fn get(&mut self, path: &str) -> Result<Option<Arc<str>>> {
        let mut stack = IncludeStack::new();
        self.get_with_stack(path, &mut stack)
    }

    pub(crate) fn get_with_stack(
        &mut self,
        path: &str,
        stack: &mut IncludeStack,
    ) -> Result<Option<Arc<str>>> {
        let path = path::normalize(path);
        let Some(source) = self.store.source(&path).map(str::to_owned) else {
            return Ok(None);
        };
        self.compile_unit(Some(&path), &source, stack)
    }

    /// Resolves `path` against `root` into a store key.
    #[must_use]
    pub fn resolve(&self, path: &str, root: &str) -> String {
        path::resolve(path, root)
    }

    /// The raw fragment store.
    #[must_use]
    pub fn store(&self) -> &ModuleStore {
        &self.store
    }

    // ========================================================================
    // Defines & Middleware
    // ========================================================================

    /// Sets a registry define; it persists until [`ShaderLib::undefine`].
    pub fn define(&mut self, key: &str, value: impl Into<DefineValue>) -> &mut Self {
        self.preprocessor.define(key, value);
        self
    }

    /// Sets every `(name, value)` pair in `defines`.
    pub fn define_all<I, K, V>(&mut self, defines: I) -> &mut Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<DefineValue>,
    {
        self.preprocessor.define_all(defines);
        self
    }

    /// Removes a registry define. Returns whether it was set.
    pub fn undefine(&mut self, key: &str) -> bool {
        self.preprocessor.undefine(key)
    }

    /// Defines injected into every compile unit.
    #[must_use]
    pub fn defines(&self) -> &ShaderDefines {
        self.preprocessor.defines()
    }

    /// The define registry handed to middleware.
    #[must_use]
    pub fn preprocessor(&self) -> &Preprocessor {
        &self.preprocessor
    }

    pub fn preprocessor_mut(&mut self) -> &mut Preprocessor {
        &mut self.preprocessor
    }

    /// Appends a stage to the middleware pipeline.
    pub fn use_middleware(&mut self, middleware: impl Middleware + 'static) -> &mut Self {
        self.middleware.push(middleware);
        self
    }

    /// Appends a closure stage to the middleware pipeline.
    pub fn use_transform<F>(&mut self, transform: F) -> &mut Self
    where
        F: Fn(&ShaderLib, &Preprocessor, &str, &ProcessOptions) -> Option<String> + 'static,
    {
        self.middleware.push(transform);
        self
    }

    #[must_use]
    pub fn middleware_len(&self) -> usize {
        self.middleware.len()
    }

    // ========================================================================
    // Compilation
    // ========================================================================

    /// Compiles an anonymous unit. Its includes resolve against the store root.
    ///
    /// Returns `Ok(None)` for an empty source.
    pub fn compile(&mut self, source: &str) -> Result<Option<Arc<str>>> {
        self.compile_named(ANONYMOUS_SHADER_NAME, source)
    }

    /// Compiles a unit declared at virtual location `name`; quoted includes
    /// resolve against its directory.
    pub fn compile_named(&mut self, name: &str, source: &str) -> Result<Option<Arc<str>>> {
        let mut stack = IncludeStack::new();
        self.compile_unit(Some(name), source, &mut stack)
    }

    fn compile_unit(
        &mut self,
        name: Option<&str>,
        source: &str,
        stack: &mut IncludeStack,
    ) -> Result<Option<Arc<str>>> {
        if source.is_empty() {
            return Ok(None);
        }

        let key = CompilationCache::key(self.cache_key, source, self.preprocessor.defines());
        if let Some(hit) = self.cache.lookup(key) {
            log::debug!("Shader cache hit: {key:032x}");
            return Ok(Some(hit));
        }
        log::debug!(
            "Shader cache miss: {key:032x} ({})",
            name.unwrap_or(ANONYMOUS_SHADER_NAME)
        );

        let source = shader_name_guard().replace(source, "");
        let processed = self.process_unit(name, &source, &ProcessOptions::default(), stack)?;
        let with_precision = self.inject_precision(&processed);

        let mut compiled = finalize_lines(&with_precision);
        compiled.push('\n');
        Ok(Some(self.cache.insert(key, compiled)))
    }

    /// Injects defines, resolves includes, runs the middleware pipeline and
    /// strips the tooling marker. Not cached.
    ///
    /// `name` sets the root for quoted includes; `None` (or an empty name)
    /// means the store root.
    pub fn process(&mut self, name: Option<&str>, source: &str, options: &ProcessOptions) -> Result<String> {
        let mut stack = IncludeStack::new();
        self.process_unit(name, source, options, &mut stack)
    }

    fn process_unit(
        &mut self,
        name: Option<&str>,
        source: &str,
        options: &ProcessOptions,
        stack: &mut IncludeStack,
    ) -> Result<String> {
        let root = match name {
            Some(name) if !name.is_empty() && name != ANONYMOUS_SHADER_NAME => path::dirname(name),
            _ => "/",
        };

        let injected = self.preprocessor.inject_defines(source, &options.defines);
        let tokens = IncludeResolver::new(self, stack).resolve(&injected, root)?;
        let assembled = tokens_to_string(&tokens);

        let transformed = self.middleware.apply(self, &self.preprocessor, assembled, options);
        Ok(transformed.replacen(TOOLING_MARKER, "", 1))
    }

    /// Replaces every precision statement with the configured one, placed at
    /// the top (or right after a leading `#version`).
    fn inject_precision(&self, source: &str) -> String {
        let header = format!("precision {};", self.precision);
        let source = source.replacen(&header, "", 1);
        let source = precision_statement().replace_all(&source, "");

        let body = source.trim_start();
        if directive_name(body) == Some("version") {
            let (version, rest) = body.split_once('\n').unwrap_or((body, ""));
            format!("{version}\n{header}\n{rest}")
        } else {
            format!("{header}\n{source}")
        }
    }

    /// Evaluates conditional directives against the registered defines.
    pub fn preprocess(&self, source: &str) -> Result<String> {
        let mut pass = ConditionalPass::new(self.version);
        for (key, value) in self.preprocessor.defines().iter_strings() {
            pass.define(key, value);
        }
        pass.run(source)
    }

    // ========================================================================
    // Cache & Introspection
    // ========================================================================

    /// Content hash used for raw-source cache keys.
    #[must_use]
    pub fn hash(source: &str) -> u128 {
        CompilationCache::hash(source)
    }

    /// Whether `source` would be served from the cache right now.
    #[must_use]
    pub fn is_cached(&self, source: &str) -> bool {
        self.cache
            .contains(CompilationCache::key(self.cache_key, source, self.preprocessor.defines()))
    }

    #[must_use]
    pub fn cache_len(&self) -> usize {
        self.cache.len()
    }

    #[must_use]
    pub fn cache_stats(&self) -> CacheStats {
        self.cache.stats()
    }

    pub fn clear_cache(&mut self) {
        self.cache.clear();
    }

    #[must_use]
    pub fn precision(&self) -> &str {
        &self.precision
    }

    #[must_use]
    pub fn version(&self) -> GlslVersion {
        self.version
    }

    #[must_use]
    pub fn max_include_depth(&self) -> usize {
        self.max_include_depth
    }

    #[must_use]
    pub fn cache_key_policy(&self) -> CacheKeyPolicy {
        self.cache_key
    }
}

/// Drops blank lines; single-character lines get an extra newline.
fn finalize_lines(source: &str) -> String {
    source
        .lines()
        .filter(|line| !line.trim().is_empty())
        .map(|line| {
            if line.chars().count() == 1 {
                format!("{line}\n")
            } else {
                line.to_string()
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}
