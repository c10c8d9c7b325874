//! # Myth ShaderLib
//!
//! Composes GLSL programs from a library of path-addressed fragments.
//!
//! - [`ShaderLib`] owns the module store, the define registry, the middleware
//!   pipeline and the compilation cache, and compiles units with nested
//!   `#include` directives resolved.
//! - [`Shader`] binds a pair of vertex / fragment sources to a drawable and
//!   decides every frame whether anything needs recompiling.
//! - [`ProgramBackend`] is the boundary to whatever actually builds GPU
//!   programs.
//!
//! ```rust,ignore
//! use myth_shaderlib::ShaderLib;
//!
//! let mut lib = ShaderLib::default();
//! lib.add("lighting/phong", "vec3 phong(vec3 n) { return n; }");
//! lib.define("USE_FOG", true);
//!
//! let vertex = lib.compile("#include <mesh/vertex>")?;
//! ```

#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]

pub mod errors;
pub mod glsl;
pub mod library;
pub mod preprocessor;
pub mod shader;
pub mod utils;

pub use errors::{IncludeFrame, IncludeStack, Result, ShaderError};
pub use glsl::GlslVersion;
pub use library::{
    ANONYMOUS_SHADER_NAME, CacheKeyPolicy, CacheStats, ModuleStore, ShaderLib, ShaderLibSettings,
};
pub use preprocessor::{
    DefineValue, Middleware, Preprocessor, ProcessOptions, ShaderDefines,
};
pub use shader::{
    AttributeBinding, Attributes, BindingState, DrawState, FrameOutcome, ProgramBackend,
    ProgramDescriptor, RenderContext, Shader, ShaderSource, UniformValue, Uniforms,
};
pub use utils::interner;
