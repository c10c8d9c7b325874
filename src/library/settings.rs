//! ShaderLib Configuration
//!
//! [`ShaderLibSettings`] collects everything a [`ShaderLib`] needs at
//! construction time. All fields have defaults, so a partial JSON document is
//! enough:
//!
//! ```rust,ignore
//! use myth_shaderlib::{ShaderLib, ShaderLibSettings};
//!
//! let lib = ShaderLib::from_json(r#"{
//!     "precision": "highp float",
//!     "version": "300 es",
//!     "defines": { "USE_FOG": true, "MAX_LIGHTS": 4 },
//!     "glsl": { "fog": { "linear": "float fog(float d) { return d; }" } }
//! }"#)?;
//! ```
//!
//! [`ShaderLib`]: super::ShaderLib

use serde::{Deserialize, Serialize};

use crate::glsl::GlslVersion;

pub const DEFAULT_PRECISION: &str = "mediump float";
pub const DEFAULT_MAX_INCLUDE_DEPTH: usize = 32;

/// What the compilation cache is keyed on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CacheKeyPolicy {
    /// Raw, pre-include source only.
    ///
    /// A define change does not invalidate a unit whose raw source was
    /// already compiled; the cached output reflects the defines active at
    /// its first compilation.
    #[default]
    Source,
    /// Raw source combined with a hash of the registered defines.
    SourceAndDefines,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShaderLibSettings {
    /// Precision qualifier written as `precision <precision>;` at the top of
    /// every compiled unit.
    pub precision: String,

    pub version: GlslVersion,

    /// Maximum nesting of `#include` directives before compilation fails
    /// with [`ShaderError::IncludeDepthExceeded`](crate::ShaderError::IncludeDepthExceeded).
    pub max_include_depth: usize,

    pub cache_key: CacheKeyPolicy,

    /// Register the built-in fragment library (`mesh/*`).
    pub include_builtins: bool,

    /// Initial defines. `null` entries are ignored.
    pub defines: serde_json::Map<String, serde_json::Value>,

    /// User fragments as a nested mapping; nested keys are joined with `/`.
    /// Registered after the built-ins, so they override them.
    pub glsl: serde_json::Value,
}

impl Default for ShaderLibSettings {
    fn default() -> Self {
        Self {
            precision: DEFAULT_PRECISION.to_string(),
            version: GlslVersion::default(),
            max_include_depth: DEFAULT_MAX_INCLUDE_DEPTH,
            cache_key: CacheKeyPolicy::default(),
            include_builtins: true,
            defines: serde_json::Map::new(),
            glsl: serde_json::Value::Null,
        }
    }
}

impl ShaderLibSettings {
    /// Parses settings from a JSON document.
    pub fn from_json(json: &str) -> crate::Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}
