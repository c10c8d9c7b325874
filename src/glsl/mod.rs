//! GLSL Source Handling
//!
//! Lexing and virtual path utilities shared by the include resolver and the
//! module store:
//!
//! - [`tokenizer`]: superficial GLSL lexer producing classified tokens
//! - [`keywords`]: per-version keyword / builtin tables
//! - [`path`]: store path normalization and `./` / `../` resolution

pub mod keywords;
pub mod path;
pub mod tokenizer;

use std::fmt;

use serde::{Deserialize, Serialize};

pub use tokenizer::{Token, TokenKind, tokenize, tokens_to_string};

/// GLSL ES dialect the tokenizer and conditional evaluator target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum GlslVersion {
    /// GLSL ES 1.00 (WebGL 1).
    #[default]
    #[serde(rename = "100")]
    Es100,
    /// GLSL ES 3.00 (WebGL 2).
    #[serde(rename = "300 es")]
    Es300,
}

impl GlslVersion {
    #[inline]
    #[must_use]
    pub fn is_es3(self) -> bool {
        matches!(self, Self::Es300)
    }

    /// Value of the `__VERSION__` macro.
    #[must_use]
    pub fn number(self) -> u32 {
        match self {
            Self::Es100 => 100,
            Self::Es300 => 300,
        }
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Es100 => "100",
            Self::Es300 => "300 es",
        }
    }
}

impl fmt::Display for GlslVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
