//! Shader Binding
//!
//! A [`Shader`] is the per-drawable half of the pipeline. Every frame it
//! receives a [`DrawState`], decides which of its two slots need
//! recompilation, and rebuilds the backend program only when something it
//! depends on actually changed:
//!
//! - a slot recompiles when forced, when it has nothing compiled yet, or when
//!   its viable source differs (by value) from the cached raw source
//! - the program is rebuilt when there is none yet, a slot recompiled, a
//!   rebuild is forced, or the uniform / attribute handle changed identity
//!
//! Otherwise the existing program is reused as is.

pub mod binding;
pub mod state;

use std::fmt;
use std::sync::Arc;

pub use binding::{
    AttributeBinding, Attributes, ProgramBackend, ProgramDescriptor, UniformValue, Uniforms,
};
pub use state::{DrawState, DynamicSource, RenderContext, ShaderSource};

use crate::errors::Result;
use crate::library::ShaderLib;
use crate::preprocessor::ShaderDefines;

/// Lifecycle of a shader instance's program binding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BindingState {
    /// No program has been built.
    #[default]
    Idle,
    /// A slot compile is in progress, or the last one failed.
    PendingCompile,
    /// A program is bound and will be reused until something changes.
    Bound,
}

/// What the last [`Shader::update`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FrameOutcome {
    pub vertex_recompiled: bool,
    pub fragment_recompiled: bool,
    pub program_rebuilt: bool,
}

impl FrameOutcome {
    #[inline]
    #[must_use]
    pub fn recompiled(&self) -> bool {
        self.vertex_recompiled || self.fragment_recompiled
    }
}

/// Last raw source of a slot and its compiled form.
#[derive(Debug, Clone, Default)]
struct Slot {
    raw: Option<String>,
    compiled: Option<Arc<str>>,
}

impl Slot {
    /// The source to compile this frame, if the slot needs it.
    fn pending(&self, next: Option<String>, force: bool) -> Option<String> {
        let next = next?;
        let changed = self.raw.as_deref() != Some(next.as_str());
        (force || self.compiled.is_none() || changed).then_some(next)
    }
}

pub struct Shader<B: ProgramBackend> {
    name: Option<String>,
    defines: ShaderDefines,

    vertex: Slot,
    fragment: Slot,

    uniforms: Option<Arc<Uniforms>>,
    attributes: Option<Arc<Attributes>>,
    bound_uniforms: Option<Arc<Uniforms>>,
    bound_attributes: Option<Arc<Attributes>>,

    program: Option<B::Program>,
    state: BindingState,
    last_outcome: FrameOutcome,
}

impl<B: ProgramBackend> Default for Shader<B> {
    fn default() -> Self {
        Self {
            name: None,
            defines: ShaderDefines::new(),
            vertex: Slot::default(),
            fragment: Slot::default(),
            uniforms: None,
            attributes: None,
            bound_uniforms: None,
            bound_attributes: None,
            program: None,
            state: BindingState::Idle,
            last_outcome: FrameOutcome::default(),
        }
    }
}

impl<B: ProgramBackend> Shader<B> {
    /// An anonymous shader; its includes resolve against the store root.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A shader whose units are compiled at virtual location `name`.
    #[must_use]
    pub fn named(name: &str) -> Self {
        Self {
            name: Some(name.to_string()),
            ..Self::default()
        }
    }

    /// Initial defines, merged into the library on every update.
    #[must_use]
    pub fn with_defines(mut self, defines: ShaderDefines) -> Self {
        self.defines = defines;
        self
    }

    /// Applies `state`, recompiles and rebuilds as needed, then runs `block`
    /// with the current program.
    ///
    /// Compile and program creation errors abort the update before `block`
    /// runs. Nothing compiled during a failed update is kept, so the next
    /// update recompiles those slots and rebuilds the program.
    pub fn update<R>(
        &mut self,
        lib: &mut ShaderLib,
        backend: &mut B,
        ctx: &RenderContext,
        state: &DrawState,
        block: impl FnOnce(&RenderContext, Option<&B::Program>) -> R,
    ) -> Result<R> {
        self.defines.merge(&state.defines);
        if state.uniforms.is_some() {
            self.uniforms.clone_from(&state.uniforms);
        }
        if state.attributes.is_some() {
            self.attributes.clone_from(&state.attributes);
        }
        lib.preprocessor_mut().merge(&self.defines);

        let force = state.force_compile;
        let resolve = |source: Option<&ShaderSource>| source.and_then(|s| s.resolve(ctx, state));

        let mut outcome = FrameOutcome::default();
        self.last_outcome = outcome;

        let vertex = self.vertex.pending(resolve(state.vertex_shader.as_ref()), force);
        let fragment = self.fragment.pending(resolve(state.fragment_shader.as_ref()), force);
        if vertex.is_some() || fragment.is_some() {
            self.state = BindingState::PendingCompile;
        }

        // Slots are committed together with the program they were linked into,
        // so a failed frame leaves them pending for the next one.
        let vertex = vertex.map(|raw| self.compile_slot(lib, raw)).transpose()?;
        let fragment = fragment.map(|raw| self.compile_slot(lib, raw)).transpose()?;
        outcome.vertex_recompiled = vertex.is_some();
        outcome.fragment_recompiled = fragment.is_some();

        let vertex = vertex.unwrap_or_else(|| self.vertex.clone());
        let fragment = fragment.unwrap_or_else(|| self.fragment.clone());
        let known = vertex.compiled.is_some()
            || fragment.compiled.is_some()
            || self.uniforms.is_some()
            || self.attributes.is_some();

        if self.needs_rebuild(&outcome, force) && known {
            let program = {
                let descriptor = ProgramDescriptor {
                    label: self.name.as_deref(),
                    vertex: vertex.compiled.as_deref(),
                    fragment: fragment.compiled.as_deref(),
                    uniforms: self.uniforms.as_deref(),
                    attributes: self.attributes.as_deref(),
                };
                backend.create_program(&descriptor)?
            };
            log::debug!(
                "Rebuilt program for shader '{}' (vertex: {}, fragment: {})",
                self.label(),
                outcome.vertex_recompiled,
                outcome.fragment_recompiled
            );
            self.program = Some(program);
            self.bound_uniforms.clone_from(&self.uniforms);
            self.bound_attributes.clone_from(&self.attributes);
            outcome.program_rebuilt = true;
        }
        self.vertex = vertex;
        self.fragment = fragment;

        self.state = if self.program.is_some() {
            BindingState::Bound
        } else {
            BindingState::Idle
        };
        self.last_outcome = outcome;

        Ok(block(ctx, self.program.as_ref()))
    }

    /// Runs `block` with the current program, without a state update.
    pub fn draw<R>(&self, ctx: &RenderContext, block: impl FnOnce(&RenderContext, Option<&B::Program>) -> R) -> R {
        block(ctx, self.program.as_ref())
    }

    fn compile_slot(&self, lib: &mut ShaderLib, raw: String) -> Result<Slot> {
        let compiled = match &self.name {
            Some(name) => lib.compile_named(name, &raw)?,
            None => lib.compile(&raw)?,
        };
        let compiled = match compiled {
            Some(compiled) => Some(Arc::from(lib.preprocess(&compiled)?)),
            None => None,
        };
        Ok(Slot {
            raw: Some(raw),
            compiled,
        })
    }

    fn needs_rebuild(&self, outcome: &FrameOutcome, force: bool) -> bool {
        self.program.is_none()
            || outcome.recompiled()
            || force
            || !same_handle(self.uniforms.as_ref(), self.bound_uniforms.as_ref())
            || !same_handle(self.attributes.as_ref(), self.bound_attributes.as_ref())
    }

    fn label(&self) -> &str {
        self.name.as_deref().unwrap_or(crate::library::ANONYMOUS_SHADER_NAME)
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    #[must_use]
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Defines accumulated from every draw state so far.
    #[must_use]
    pub fn defines(&self) -> &ShaderDefines {
        &self.defines
    }

    #[must_use]
    pub fn vertex_source(&self) -> Option<&str> {
        self.vertex.raw.as_deref()
    }

    #[must_use]
    pub fn fragment_source(&self) -> Option<&str> {
        self.fragment.raw.as_deref()
    }

    #[must_use]
    pub fn compiled_vertex(&self) -> Option<&Arc<str>> {
        self.vertex.compiled.as_ref()
    }

    #[must_use]
    pub fn compiled_fragment(&self) -> Option<&Arc<str>> {
        self.fragment.compiled.as_ref()
    }

    #[must_use]
    pub fn uniforms(&self) -> Option<&Arc<Uniforms>> {
        self.uniforms.as_ref()
    }

    #[must_use]
    pub fn attributes(&self) -> Option<&Arc<Attributes>> {
        self.attributes.as_ref()
    }

    #[must_use]
    pub fn program(&self) -> Option<&B::Program> {
        self.program.as_ref()
    }

    #[must_use]
    pub fn state(&self) -> BindingState {
        self.state
    }

    #[must_use]
    pub fn last_outcome(&self) -> FrameOutcome {
        self.last_outcome
    }
}

impl<B: ProgramBackend> fmt::Debug for Shader<B> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Shader")
            .field("name", &self.name)
            .field("defines", &self.defines.len())
            .field("vertex", &self.vertex.raw.is_some())
            .field("fragment", &self.fragment.raw.is_some())
            .field("state", &self.state)
            .field("last_outcome", &self.last_outcome)
            .finish_non_exhaustive()
    }
}

fn same_handle<T>(a: Option<&Arc<T>>, b: Option<&Arc<T>>) -> bool {
    match (a, b) {
        (Some(a), Some(b)) => Arc::ptr_eq(a, b),
        (None, None) => true,
        _ => false,
    }
}
