//! GPU Boundary
//!
//! The shader pipeline never talks to the GPU. It describes the program it
//! wants with a [`ProgramDescriptor`] and hands it to a [`ProgramBackend`],
//! which owns compilation, linking and the resulting handle.

use std::collections::BTreeMap;

use glam::{Mat3, Mat4, Vec2, Vec3, Vec4};

use crate::errors::Result;

/// CPU-side value of a uniform binding.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum UniformValue {
    Float(f32),
    Int(i32),
    Bool(bool),
    Vec2(Vec2),
    Vec3(Vec3),
    Vec4(Vec4),
    Mat3(Mat3),
    Mat4(Mat4),
    /// Texture unit index.
    Sampler(u32),
}

impl UniformValue {
    /// GLSL type name of the value.
    #[must_use]
    pub fn glsl_type(&self) -> &'static str {
        match self {
            Self::Float(_) => "float",
            Self::Int(_) => "int",
            Self::Bool(_) => "bool",
            Self::Vec2(_) => "vec2",
            Self::Vec3(_) => "vec3",
            Self::Vec4(_) => "vec4",
            Self::Mat3(_) => "mat3",
            Self::Mat4(_) => "mat4",
            Self::Sampler(_) => "sampler2D",
        }
    }
}

macro_rules! impl_uniform_from {
    ($($ty:ty => $variant:ident),* $(,)?) => {
        $(
            impl From<$ty> for UniformValue {
                fn from(value: $ty) -> Self {
                    Self::$variant(value)
                }
            }
        )*
    };
}

impl_uniform_from! {
    f32 => Float,
    i32 => Int,
    bool => Bool,
    Vec2 => Vec2,
    Vec3 => Vec3,
    Vec4 => Vec4,
    Mat3 => Mat3,
    Mat4 => Mat4,
}

/// Uniform set, keyed by GLSL name.
pub type Uniforms = BTreeMap<String, UniformValue>;

/// Layout of one vertex attribute inside a buffer owned by the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AttributeBinding {
    /// Backend buffer handle.
    pub buffer: u32,
    /// Components per vertex (1..=4).
    pub components: u8,
    pub normalized: bool,
    pub stride: u32,
    pub offset: u32,
}

impl AttributeBinding {
    #[must_use]
    pub fn new(buffer: u32, components: u8) -> Self {
        Self {
            buffer,
            components,
            normalized: false,
            stride: 0,
            offset: 0,
        }
    }

    #[must_use]
    pub fn with_stride(mut self, stride: u32) -> Self {
        self.stride = stride;
        self
    }

    #[must_use]
    pub fn with_offset(mut self, offset: u32) -> Self {
        self.offset = offset;
        self
    }

    #[must_use]
    pub fn normalized(mut self) -> Self {
        self.normalized = true;
        self
    }
}

/// Attribute set, keyed by GLSL name.
pub type Attributes = BTreeMap<String, AttributeBinding>;

/// Everything the backend needs to build a program.
///
/// Any subset may be present: a fragment-only rebuild leaves `vertex` as
/// whatever was compiled last (or `None`).
#[derive(Debug, Clone, Copy, Default)]
pub struct ProgramDescriptor<'a> {
    pub label: Option<&'a str>,
    pub vertex: Option<&'a str>,
    pub fragment: Option<&'a str>,
    pub uniforms: Option<&'a Uniforms>,
    pub attributes: Option<&'a Attributes>,
}

/// Compiles and links programs on behalf of [`Shader`](super::Shader).
pub trait ProgramBackend {
    type Program;

    /// Builds a program. Failures are reported as
    /// [`ShaderError::ProgramCreation`](crate::ShaderError::ProgramCreation).
    fn create_program(&mut self, descriptor: &ProgramDescriptor<'_>) -> Result<Self::Program>;
}
