//! Draw State
//!
//! Per-draw input to [`Shader::update`](super::Shader::update): shader
//! sources (literal or computed from the render context), shared uniform and
//! attribute sets, extra defines and the force-recompile flag.

use std::fmt;
use std::sync::Arc;

use super::binding::{Attributes, Uniforms};
use crate::preprocessor::{DefineValue, ShaderDefines};

/// Snapshot of the ambient render context, supplied by the caller each frame.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct RenderContext {
    pub tick: u64,
    pub time: f32,
    pub viewport_width: u32,
    pub viewport_height: u32,
    pub pixel_ratio: f32,
}

/// Source computed at draw time. Returning `None` means "nothing new".
pub type DynamicSource = Arc<dyn Fn(&RenderContext, &DrawState) -> Option<String>>;

#[derive(Clone)]
pub enum ShaderSource {
    Literal(String),
    Dynamic(DynamicSource),
}

impl ShaderSource {
    pub fn dynamic<F>(source: F) -> Self
    where
        F: Fn(&RenderContext, &DrawState) -> Option<String> + 'static,
    {
        Self::Dynamic(Arc::new(source))
    }

    /// The viable source text for this frame, if any.
    ///
    /// Empty strings are not viable.
    #[must_use]
    pub fn resolve(&self, ctx: &RenderContext, state: &DrawState) -> Option<String> {
        let source = match self {
            Self::Literal(source) => Some(source.clone()),
            Self::Dynamic(source) => source(ctx, state),
        };
        source.filter(|s| !s.is_empty())
    }
}

impl fmt::Debug for ShaderSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Literal(source) => f.debug_tuple("Literal").field(source).finish(),
            Self::Dynamic(_) => f.write_str("Dynamic(..)"),
        }
    }
}

impl From<&str> for ShaderSource {
    fn from(source: &str) -> Self {
        Self::Literal(source.to_string())
    }
}

impl From<String> for ShaderSource {
    fn from(source: String) -> Self {
        Self::Literal(source)
    }
}

#[derive(Debug, Clone, Default)]
pub struct DrawState {
    pub vertex_shader: Option<ShaderSource>,
    pub fragment_shader: Option<ShaderSource>,
    pub uniforms: Option<Arc<Uniforms>>,
    pub attributes: Option<Arc<Attributes>>,
    pub defines: ShaderDefines,
    pub force_compile: bool,
}

impl DrawState {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn vertex(mut self, source: impl Into<ShaderSource>) -> Self {
        self.vertex_shader = Some(source.into());
        self
    }

    #[must_use]
    pub fn fragment(mut self, source: impl Into<ShaderSource>) -> Self {
        self.fragment_shader = Some(source.into());
        self
    }

    #[must_use]
    pub fn uniforms(mut self, uniforms: Arc<Uniforms>) -> Self {
        self.uniforms = Some(uniforms);
        self
    }

    #[must_use]
    pub fn attributes(mut self, attributes: Arc<Attributes>) -> Self {
        self.attributes = Some(attributes);
        self
    }

    #[must_use]
    pub fn define(mut self, key: &str, value: impl Into<DefineValue>) -> Self {
        self.defines.define(key, value);
        self
    }

    #[must_use]
    pub fn force_compile(mut self, force: bool) -> Self {
        self.force_compile = force;
        self
    }
}
