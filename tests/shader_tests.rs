//! Shader Diff Engine Tests
//!
//! Tests for:
//! - Slot recompilation: first draw, unchanged source, changed source, forced
//! - Program rebuilds: partial rebuilds, reuse, uniform/attribute identity
//! - Dynamic (context-computed) sources
//! - Define propagation into the shared library and conditional evaluation
//! - Failure propagation from the compile path and the backend

use std::sync::Arc;

use glam::{Mat4, Vec4};

use myth_shaderlib::{
    AttributeBinding, Attributes, BindingState, DrawState, FrameOutcome, ProgramBackend,
    ProgramDescriptor, RenderContext, Result, Shader, ShaderError, ShaderLib, ShaderLibSettings,
    ShaderSource, UniformValue, Uniforms,
};

#[derive(Debug, Clone, PartialEq)]
struct MockProgram {
    id: usize,
    label: Option<String>,
    vertex: Option<String>,
    fragment: Option<String>,
    uniform_count: Option<usize>,
    attribute_count: Option<usize>,
}

#[derive(Default)]
struct MockBackend {
    created: Vec<MockProgram>,
    fail: bool,
}

impl ProgramBackend for MockBackend {
    type Program = MockProgram;

    fn create_program(&mut self, descriptor: &ProgramDescriptor<'_>) -> Result<MockProgram> {
        if self.fail {
            return Err(ShaderError::ProgramCreation("link failed".into()));
        }
        let program = MockProgram {
            id: self.created.len(),
            label: descriptor.label.map(String::from),
            vertex: descriptor.vertex.map(String::from),
            fragment: descriptor.fragment.map(String::from),
            uniform_count: descriptor.uniforms.map(Uniforms::len),
            attribute_count: descriptor.attributes.map(Attributes::len),
        };
        self.created.push(program.clone());
        Ok(program)
    }
}

struct Fixture {
    lib: ShaderLib,
    backend: MockBackend,
    shader: Shader<MockBackend>,
    ctx: RenderContext,
}

impl Fixture {
    fn new() -> Self {
        Self {
            lib: ShaderLib::new(ShaderLibSettings {
                include_builtins: false,
                ..ShaderLibSettings::default()
            }),
            backend: MockBackend::default(),
            shader: Shader::new(),
            ctx: RenderContext::default(),
        }
    }

    /// Runs an update and returns the id of the program handed to the block.
    fn frame(&mut self, state: &DrawState) -> Result<Option<usize>> {
        self.shader.update(&mut self.lib, &mut self.backend, &self.ctx, state, |_, program| {
            program.map(|p| p.id)
        })
    }

    fn outcome(&self) -> FrameOutcome {
        self.shader.last_outcome()
    }
}

fn shaders(vertex: &str, fragment: &str) -> DrawState {
    DrawState::new().vertex(vertex).fragment(fragment)
}

// ============================================================================
// Slot Recompilation Tests
// ============================================================================

#[test]
fn first_draw_compiles_both_slots() {
    let mut fx = Fixture::new();

    let program = fx.frame(&shaders("void main() { gl_Position = vec4(0.0); }", "void main() {}")).unwrap();

    assert_eq!(program, Some(0));
    assert_eq!(
        fx.outcome(),
        FrameOutcome {
            vertex_recompiled: true,
            fragment_recompiled: true,
            program_rebuilt: true,
        }
    );
    assert_eq!(fx.shader.state(), BindingState::Bound);
    assert_eq!(
        fx.shader.compiled_vertex().map(|s| &**s),
        Some("precision mediump float;\nvoid main() { gl_Position = vec4(0.0); }")
    );
    assert_eq!(fx.backend.created.len(), 1);
}

#[test]
fn same_literal_source_reuses_program() {
    let mut fx = Fixture::new();
    let state = shaders("A", "F");

    fx.frame(&state).unwrap();
    let program = fx.frame(&state).unwrap();

    assert_eq!(program, Some(0));
    assert_eq!(fx.outcome(), FrameOutcome::default());
    assert_eq!(fx.backend.created.len(), 1);
}

#[test]
fn changed_vertex_recompiles_vertex_slot_only() {
    let mut fx = Fixture::new();
    fx.frame(&shaders("A", "F")).unwrap();
    let fragment_before = Arc::clone(fx.shader.compiled_fragment().unwrap());

    let program = fx.frame(&shaders("B", "F")).unwrap();

    assert_eq!(program, Some(1));
    assert!(fx.outcome().vertex_recompiled);
    assert!(!fx.outcome().fragment_recompiled);
    assert!(fx.outcome().program_rebuilt);
    assert!(Arc::ptr_eq(&fragment_before, fx.shader.compiled_fragment().unwrap()));
    assert_eq!(fx.shader.vertex_source(), Some("B"));

    let rebuilt = &fx.backend.created[1];
    assert!(rebuilt.vertex.as_deref().is_some_and(|v| v.contains('B')));
    assert_eq!(rebuilt.fragment.as_deref(), Some(&*fragment_before));
}

#[test]
fn absent_slot_keeps_cached_source() {
    let mut fx = Fixture::new();
    fx.frame(&shaders("A", "F")).unwrap();
    let vertex_before = Arc::clone(fx.shader.compiled_vertex().unwrap());

    fx.frame(&DrawState::new().fragment("G")).unwrap();

    assert!(!fx.outcome().vertex_recompiled);
    assert!(fx.outcome().fragment_recompiled);
    assert!(Arc::ptr_eq(&vertex_before, fx.shader.compiled_vertex().unwrap()));
    assert_eq!(fx.shader.fragment_source(), Some("G"));
}

#[test]
fn fragment_only_first_draw_builds_partial_program() {
    let mut fx = Fixture::new();

    fx.frame(&DrawState::new().fragment("void main() {}")).unwrap();

    let program = &fx.backend.created[0];
    assert!(program.vertex.is_none());
    assert!(program.fragment.is_some());
}

#[test]
fn force_compile_recompiles_and_rebuilds() {
    let mut fx = Fixture::new();
    let state = shaders("A", "F");
    fx.frame(&state).unwrap();

    let program = fx.frame(&state.clone().force_compile(true)).unwrap();

    assert_eq!(program, Some(1));
    assert_eq!(
        fx.outcome(),
        FrameOutcome {
            vertex_recompiled: true,
            fragment_recompiled: true,
            program_rebuilt: true,
        }
    );
}

#[test]
fn no_known_inputs_draws_without_program() {
    let mut fx = Fixture::new();

    let program = fx.frame(&DrawState::new()).unwrap();

    assert_eq!(program, None);
    assert_eq!(fx.shader.state(), BindingState::Idle);
    assert!(fx.backend.created.is_empty());
}

// ============================================================================
// Dynamic Source Tests
// ============================================================================

#[test]
fn dynamic_source_is_compared_by_value() {
    let mut fx = Fixture::new();
    let state = DrawState::new().vertex(ShaderSource::dynamic(|ctx, _| {
        Some(format!("// variant\nvoid main() {{ float lod = {}.0; }}", ctx.tick / 10))
    }));

    fx.frame(&state).unwrap();
    fx.ctx.tick = 5;
    fx.frame(&state).unwrap();
    assert!(!fx.outcome().vertex_recompiled);

    fx.ctx.tick = 12;
    fx.frame(&state).unwrap();
    assert!(fx.outcome().vertex_recompiled);
    assert!(fx.shader.compiled_vertex().unwrap().contains("float lod = 1.0;"));
}

#[test]
fn dynamic_source_returning_none_keeps_slot() {
    let mut fx = Fixture::new();
    fx.frame(&shaders("A", "F")).unwrap();

    let state = DrawState::new().vertex(ShaderSource::dynamic(|_, _| None));
    fx.frame(&state).unwrap();

    assert_eq!(fx.outcome(), FrameOutcome::default());
    assert_eq!(fx.shader.vertex_source(), Some("A"));
}

// ============================================================================
// Uniform / Attribute Tests
// ============================================================================

fn uniforms() -> Arc<Uniforms> {
    let mut uniforms = Uniforms::new();
    uniforms.insert("model".into(), UniformValue::from(Mat4::IDENTITY));
    uniforms.insert("color".into(), UniformValue::from(Vec4::ONE));
    Arc::new(uniforms)
}

#[test]
fn uniforms_coalesce_with_previous_frame() {
    let mut fx = Fixture::new();
    let u = uniforms();

    fx.frame(&shaders("A", "F").uniforms(Arc::clone(&u))).unwrap();
    assert_eq!(fx.backend.created[0].uniform_count, Some(2));

    fx.frame(&shaders("A", "F")).unwrap();
    assert!(Arc::ptr_eq(fx.shader.uniforms().unwrap(), &u));
    assert!(!fx.outcome().program_rebuilt);
}

#[test]
fn same_uniform_handle_does_not_rebuild() {
    let mut fx = Fixture::new();
    let u = uniforms();

    fx.frame(&shaders("A", "F").uniforms(Arc::clone(&u))).unwrap();
    fx.frame(&shaders("A", "F").uniforms(Arc::clone(&u))).unwrap();

    assert!(!fx.outcome().program_rebuilt);
    assert_eq!(fx.backend.created.len(), 1);
}

#[test]
fn new_uniform_handle_rebuilds_without_recompiling() {
    let mut fx = Fixture::new();

    fx.frame(&shaders("A", "F").uniforms(uniforms())).unwrap();
    fx.frame(&shaders("A", "F").uniforms(uniforms())).unwrap();

    assert_eq!(
        fx.outcome(),
        FrameOutcome {
            vertex_recompiled: false,
            fragment_recompiled: false,
            program_rebuilt: true,
        }
    );
    assert_eq!(fx.backend.created.len(), 2);
}

#[test]
fn attributes_alone_build_a_program() {
    let mut fx = Fixture::new();
    let mut attributes = Attributes::new();
    attributes.insert("position".into(), AttributeBinding::new(0, 3).with_stride(12));

    fx.frame(&DrawState::new().attributes(Arc::new(attributes))).unwrap();

    assert_eq!(fx.backend.created.len(), 1);
    assert_eq!(fx.backend.created[0].attribute_count, Some(1));
    assert!(fx.backend.created[0].vertex.is_none());
}

// ============================================================================
// Define Tests
// ============================================================================

#[test]
fn draw_state_defines_reach_library() {
    let mut fx = Fixture::new();

    fx.frame(&shaders("void main() {}", "F").define("USE_FOG", true)).unwrap();

    assert_eq!(fx.lib.defines().get("USE_FOG"), Some("1"));
    assert!(fx.shader.compiled_vertex().unwrap().contains("#define USE_FOG 1"));
    assert_eq!(fx.shader.defines().get("USE_FOG"), Some("1"));
}

#[test]
fn shader_defines_accumulate_across_frames() {
    let mut fx = Fixture::new();

    fx.frame(&shaders("A", "F").define("ONE", 1)).unwrap();
    fx.frame(&shaders("A", "F").define("TWO", 2)).unwrap();

    assert!(fx.shader.defines().contains("ONE"));
    assert!(fx.shader.defines().contains("TWO"));
}

#[test]
fn conditional_directives_are_evaluated() {
    let mut fx = Fixture::new();
    let vertex = "#ifdef USE_FOG\nvarying float fog;\n#else\nvarying float nofog;\n#endif\nvoid main() {}";

    fx.frame(&shaders(vertex, "F").define("USE_FOG", true)).unwrap();

    let compiled = fx.shader.compiled_vertex().unwrap();
    assert!(compiled.contains("varying float fog;"));
    assert!(!compiled.contains("nofog"));
    assert!(!compiled.contains("#ifdef"));
}

#[test]
fn named_shader_resolves_quoted_includes_from_its_location() {
    let mut fx = Fixture::new();
    fx.lib.add("mesh/uniforms", "uniform mat4 model;");
    fx.shader = Shader::named("mesh/custom");

    fx.frame(&shaders("#include \"./uniforms\"\nvoid main() {}", "F")).unwrap();

    assert!(fx.shader.compiled_vertex().unwrap().contains("uniform mat4 model;"));
    assert_eq!(fx.backend.created[0].label.as_deref(), Some("mesh/custom"));
}

// ============================================================================
// Failure Tests
// ============================================================================

#[test]
fn compile_error_aborts_draw_and_recovers() {
    let mut fx = Fixture::new();
    let mut drawn = false;

    let result = fx.shader.update(
        &mut fx.lib,
        &mut fx.backend,
        &fx.ctx,
        &shaders("#include <missing>", "F"),
        |_, _| drawn = true,
    );

    assert!(matches!(result, Err(ShaderError::IncludeNotFound { .. })));
    assert!(!drawn);
    assert_eq!(fx.shader.state(), BindingState::PendingCompile);
    assert!(fx.backend.created.is_empty());

    fx.frame(&shaders("void main() {}", "F")).unwrap();
    assert_eq!(fx.shader.state(), BindingState::Bound);
}

#[test]
fn backend_failure_propagates() {
    let mut fx = Fixture::new();
    fx.backend.fail = true;

    let result = fx.frame(&shaders("A", "F"));
    assert!(matches!(result, Err(ShaderError::ProgramCreation(_))));
    assert!(fx.shader.program().is_none());
}

#[test]
fn failed_fragment_does_not_strand_recompiled_vertex() {
    let mut fx = Fixture::new();
    fx.frame(&shaders("void a() {}", "void f() {}")).unwrap();

    let result = fx.frame(&shaders("void b() {}", "#include <missing>"));
    assert!(matches!(result, Err(ShaderError::IncludeNotFound { .. })));
    assert_eq!(fx.shader.state(), BindingState::PendingCompile);
    assert_eq!(fx.shader.vertex_source(), Some("void a() {}"));

    let program = fx.frame(&shaders("void b() {}", "void f() {}")).unwrap();

    assert_eq!(program, Some(1));
    assert!(fx.outcome().vertex_recompiled);
    assert!(fx.outcome().program_rebuilt);
    assert_eq!(fx.shader.state(), BindingState::Bound);
    assert_eq!(
        fx.backend.created[1].vertex.as_deref(),
        Some("precision mediump float;\nvoid b() {}")
    );
    assert_eq!(
        fx.shader.program().and_then(|p| p.vertex.as_deref()),
        fx.shader.compiled_vertex().map(|s| &**s)
    );
}

#[test]
fn backend_failure_after_bind_rebuilds_on_retry() {
    let mut fx = Fixture::new();
    fx.frame(&shaders("void a() {}", "void f() {}")).unwrap();

    fx.backend.fail = true;
    let result = fx.frame(&shaders("void b() {}", "void f() {}"));
    assert!(matches!(result, Err(ShaderError::ProgramCreation(_))));
    assert_eq!(fx.shader.program().map(|p| p.id), Some(0));
    assert_eq!(fx.shader.vertex_source(), Some("void a() {}"));

    fx.backend.fail = false;
    let program = fx.frame(&shaders("void b() {}", "void f() {}")).unwrap();

    assert_eq!(program, Some(1));
    assert_eq!(
        fx.shader.program().and_then(|p| p.vertex.as_deref()),
        Some("precision mediump float;\nvoid b() {}")
    );
    assert_eq!(fx.shader.vertex_source(), Some("void b() {}"));
}

#[test]
fn plain_draw_uses_current_program() {
    let mut fx = Fixture::new();
    assert_eq!(fx.shader.draw(&fx.ctx, |_, p| p.map(|p| p.id)), None);

    fx.frame(&shaders("A", "F")).unwrap();

    assert_eq!(fx.shader.draw(&fx.ctx, |_, p| p.map(|p| p.id)), Some(0));
    assert_eq!(fx.backend.created.len(), 1);
}
