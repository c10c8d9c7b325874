//! Include Resolution Tests
//!
//! Tests for:
//! - `<path>` (store root) vs `"path"` (including unit's directory) resolution
//! - Splicing of compiled fragments, nested includes, lazy registration
//! - Syntax / reference errors and their include stacks
//! - Include depth limit for self-referential chains
//! - The built-in `mesh/*` fragment library

use std::sync::Arc;

use myth_shaderlib::{ShaderError, ShaderLib, ShaderLibSettings};

fn bare_lib() -> ShaderLib {
    ShaderLib::new(ShaderLibSettings {
        include_builtins: false,
        ..ShaderLibSettings::default()
    })
}

// ============================================================================
// Resolution Tests
// ============================================================================

#[test]
fn angle_include_is_spliced_in_place() {
    let mut lib = bare_lib();
    lib.add("mesh/uniforms", "uniform mat4 model;");

    let out = lib.compile("#include <mesh/uniforms>\nvoid main(){}").unwrap().unwrap();

    assert_eq!(&*out, "precision mediump float;\nuniform mat4 model;\nvoid main(){}\n");
    assert!(!out.contains("#include"));
}

#[test]
fn include_argument_whitespace_is_tolerated() {
    let mut lib = bare_lib();
    lib.add("mesh/uniforms", "uniform mat4 model;");

    let out = lib.compile("#include   <mesh/uniforms>   \nvoid main(){}").unwrap().unwrap();
    assert!(out.contains("uniform mat4 model;"));
}

#[test]
fn angle_include_ignores_unit_directory() {
    let mut lib = bare_lib();
    lib.add("fresnel", "float root_fresnel();");
    lib.add("pbr/fresnel", "float pbr_fresnel();");

    let out = lib.compile_named("pbr/main", "#include <fresnel>").unwrap().unwrap();
    assert!(out.contains("root_fresnel"));
    assert!(!out.contains("pbr_fresnel"));
}

#[test]
fn quoted_include_resolves_against_unit_directory() {
    let mut lib = bare_lib();
    lib.add("fresnel", "float root_fresnel();");
    lib.add("pbr/fresnel", "float pbr_fresnel();");

    let out = lib.compile_named("pbr/main", "#include \"fresnel\"").unwrap().unwrap();
    assert!(out.contains("pbr_fresnel"));
}

#[test]
fn quoted_parent_include_climbs_directories() {
    let mut lib = bare_lib();
    lib.add("common/math", "float saturate(float x) { return clamp(x, 0.0, 1.0); }");

    let out = lib
        .compile_named("lighting/phong", "#include \"../common/math\"\nvoid f() {}")
        .unwrap()
        .unwrap();
    assert!(out.contains("float saturate"));
}

#[test]
fn nested_fragment_includes_resolve_relative_to_fragment() {
    let mut lib = bare_lib();
    lib.add("pbr/brdf", "#include \"./fresnel\"\nfloat brdf();");
    lib.add("pbr/fresnel", "float fresnel();");

    let out = lib.compile("#include <pbr/brdf>\nvoid main(){}").unwrap().unwrap();

    assert_eq!(
        &*out,
        "precision mediump float;\nfloat fresnel();\nfloat brdf();\nvoid main(){}\n"
    );
}

#[test]
fn fragments_register_lazily() {
    let mut lib = bare_lib();
    lib.add("a", "#include <b>\nfloat a;");
    lib.add("b", "float b;");

    let out = lib.compile("#include <a>").unwrap().unwrap();
    assert!(out.contains("float b;\nfloat a;"));
}

#[test]
fn get_returns_cached_compiled_fragment() {
    let mut lib = bare_lib();
    lib.add("mesh//uniforms", "// transforms\nuniform mat4 model;");

    let first = lib.get("mesh/uniforms").unwrap().unwrap();
    let second = lib.get("mesh/uniforms").unwrap().unwrap();

    assert!(Arc::ptr_eq(&first, &second));
    assert_eq!(&*first, "precision mediump float;\nuniform mat4 model;\n");
}

#[test]
fn resolve_builds_store_keys() {
    let lib = bare_lib();

    assert_eq!(lib.resolve("./uniforms", "mesh"), "mesh/uniforms");
    assert_eq!(lib.resolve("../common/math.glsl", "lighting/pbr"), "lighting/common/math");
    assert_eq!(lib.resolve("./a", "/"), "a");
}

#[test]
fn valueless_define_in_fragment_defaults_to_one() {
    let mut lib = bare_lib();
    lib.add("flags", "#define USE_MAP\n#define LEVEL 2");

    let out = lib.compile("#include <flags>\nvoid main() {}").unwrap().unwrap();
    assert!(out.contains("#define USE_MAP 1\n"));
    assert!(out.contains("#define LEVEL 2\n"));
}

#[test]
fn other_directives_pass_through() {
    let mut lib = bare_lib();
    let out = lib
        .compile("#extension GL_OES_standard_derivatives : enable\n#ifdef X\nfloat x;\n#endif")
        .unwrap()
        .unwrap();

    assert!(out.contains("#extension GL_OES_standard_derivatives : enable\n"));
    assert!(out.contains("#ifdef X\n"));
    assert!(out.contains("#endif\n"));
}

// ============================================================================
// Error Tests
// ============================================================================

#[test]
fn include_without_delimiters_is_syntax_error() {
    let mut lib = bare_lib();
    lib.add("mesh/uniforms", "uniform mat4 model;");

    let err = lib.compile("#include mesh/uniforms").unwrap_err();
    match err {
        ShaderError::IncludeSyntax { found, .. } => assert_eq!(found, "m"),
        other => panic!("expected syntax error, got {other:?}"),
    }
}

#[test]
fn mismatched_delimiters_are_syntax_error() {
    let mut lib = bare_lib();

    let err = lib.compile("#include <mesh/uniforms\"").unwrap_err();
    match err {
        ShaderError::IncludeSyntax { found, expected, .. } => {
            assert_eq!(found, "\"");
            assert_eq!(expected, "'>'");
        }
        other => panic!("expected syntax error, got {other:?}"),
    }
}

#[test]
fn empty_include_is_syntax_error() {
    let mut lib = bare_lib();
    assert!(matches!(
        lib.compile("#include\nvoid main() {}"),
        Err(ShaderError::IncludeSyntax { .. })
    ));
}

#[test]
fn missing_include_is_reference_error() {
    let mut lib = bare_lib();

    let err = lib.compile("#include <missing/path>").unwrap_err();
    assert!(err.to_string().contains("missing/path"));
    match err {
        ShaderError::IncludeNotFound { path, directive, stack } => {
            assert_eq!(path, "missing/path");
            assert_eq!(directive, "<missing/path>");
            assert!(stack.is_empty());
        }
        other => panic!("expected reference error, got {other:?}"),
    }
}

#[test]
fn nested_error_carries_include_stack() {
    let mut lib = bare_lib();
    lib.add("a", "float a;\n#include <b>");

    let err = lib.compile("\n\n#include <a>").unwrap_err();

    assert_eq!(
        err.to_string(),
        "glsl lib <b> not found (resolved to 'b').\n\tat (glsl) a:3"
    );
}

#[test]
fn failed_compile_is_not_cached() {
    let mut lib = bare_lib();
    let source = "#include <late>";

    assert!(lib.compile(source).is_err());
    assert!(!lib.is_cached(source));

    lib.add("late", "float late;");
    assert!(lib.compile(source).unwrap().unwrap().contains("float late;"));
}

#[test]
fn self_include_hits_depth_limit() {
    let mut lib = ShaderLib::new(ShaderLibSettings {
        include_builtins: false,
        max_include_depth: 8,
        ..ShaderLibSettings::default()
    });
    lib.add("loop", "#include <loop>");

    match lib.compile("#include <loop>").unwrap_err() {
        ShaderError::IncludeDepthExceeded { path, limit, stack } => {
            assert_eq!(path, "loop");
            assert_eq!(limit, 8);
            assert_eq!(stack.depth(), 8);
        }
        other => panic!("expected depth error, got {other:?}"),
    }
}

#[test]
fn mutual_include_hits_default_depth_limit() {
    let mut lib = bare_lib();
    lib.add("ping", "#include <pong>");
    lib.add("pong", "#include <ping>");

    assert!(matches!(
        lib.compile("#include <ping>"),
        Err(ShaderError::IncludeDepthExceeded { limit: 32, .. })
    ));
}

// ============================================================================
// Built-in Library Tests
// ============================================================================

#[test]
fn builtin_mesh_vertex_compiles() {
    let mut lib = ShaderLib::default();

    let out = lib.compile("#include <mesh/vertex>").unwrap().unwrap();

    assert!(out.starts_with("precision mediump float;\n"));
    assert_eq!(out.matches("precision").count(), 1);
    assert!(out.contains("uniform mat4 model;"));
    assert!(out.contains("varying vec3 vnormal;"));
    assert!(out.contains("gl_Position"));
    assert!(!out.contains("#include"));
    assert!(!out.contains("//"));
}

#[test]
fn builtin_mesh_fragment_compiles() {
    let mut lib = ShaderLib::default();

    let out = lib.compile("#include <mesh/fragment>").unwrap().unwrap();
    assert!(out.contains("gl_FragColor"));
    assert!(out.contains("varying vec2 vuv;"));
}

#[test]
fn every_builtin_fragment_compiles() -> anyhow::Result<()> {
    let _ = env_logger::builder().is_test(true).try_init();

    let mut lib = ShaderLib::default();
    let paths: Vec<String> = lib.store().paths().into_iter().map(String::from).collect();

    assert!(!paths.is_empty());
    for path in paths {
        let compiled = lib.get(&path)?;
        assert!(compiled.is_some(), "{path}");
    }
    Ok(())
}
