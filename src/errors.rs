//! Error Types
//!
//! This module defines the error types used throughout the shader pipeline.
//!
//! # Overview
//!
//! The main error type [`ShaderError`] covers every failure mode of the
//! compile path:
//! - Malformed `#include` directives
//! - Unresolved include targets
//! - Runaway (cyclic) include chains
//! - Malformed conditional directives and `#if` expressions
//! - Program creation failures reported by the GPU boundary
//!
//! None of these are retried. They propagate to the caller of the compile
//! entry point, which is expected to abort the affected draw.
//!
//! # Usage
//!
//! All fallible APIs return [`Result<T>`] which is an alias for
//! `std::result::Result<T, ShaderError>`.
//!
//! ```rust,ignore
//! use myth_shaderlib::errors::{Result, ShaderError};
//!
//! fn build(lib: &mut ShaderLib) -> Result<()> {
//!     lib.compile("#include <mesh/uniforms>\nvoid main() {}")?;
//!     Ok(())
//! }
//! ```

use std::fmt;

use smallvec::SmallVec;
use thiserror::Error;

/// One in-progress include resolution: the directive's target and the line
/// of the including unit it appeared on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IncludeFrame {
    pub path: String,
    pub line: u32,
}

/// Ordered list of in-progress include resolutions, outermost first.
///
/// Rendered as one `\n\tat (glsl) <path>:<line>` entry per frame so that the
/// error message reads like a stack trace.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IncludeStack {
    frames: SmallVec<[IncludeFrame; 8]>,
}

impl IncludeStack {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, path: impl Into<String>, line: u32) {
        self.frames.push(IncludeFrame {
            path: path.into(),
            line,
        });
    }

    pub fn pop(&mut self) -> Option<IncludeFrame> {
        self.frames.pop()
    }

    #[inline]
    #[must_use]
    pub fn depth(&self) -> usize {
        self.frames.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    #[must_use]
    pub fn frames(&self) -> &[IncludeFrame] {
        &self.frames
    }
}

impl fmt::Display for IncludeStack {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for frame in &self.frames {
            write!(f, "\n\tat (glsl) {}:{}", frame.path, frame.line)?;
        }
        Ok(())
    }
}

/// The main error type for the shader pipeline.
#[derive(Error, Debug)]
pub enum ShaderError {
    // ========================================================================
    // Include Resolution Errors
    // ========================================================================
    /// An `#include` argument is not wrapped in `<...>` or `"..."`.
    #[error("Unexpected token '{found}'. Expecting {expected}.{stack}")]
    IncludeSyntax {
        /// The offending delimiter (empty when the argument is missing)
        found: String,
        /// Human readable description of the accepted delimiters
        expected: String,
        /// Include stack at the point of failure
        stack: IncludeStack,
    },

    /// The resolved include target is not registered in the module store.
    #[error("glsl lib {directive} not found (resolved to '{path}').{stack}")]
    IncludeNotFound {
        /// Resolved store path
        path: String,
        /// The directive argument as written, delimiters included
        directive: String,
        /// Include stack at the point of failure
        stack: IncludeStack,
    },

    /// The include chain grew past the configured depth limit.
    ///
    /// Almost always a fragment that (transitively) includes itself.
    #[error("include depth limit of {limit} exceeded while including '{path}'.{stack}")]
    IncludeDepthExceeded {
        /// Path whose inclusion crossed the limit
        path: String,
        /// Configured limit
        limit: usize,
        /// Include stack at the point of failure
        stack: IncludeStack,
    },

    // ========================================================================
    // Conditional Preprocessing Errors
    // ========================================================================
    /// Unbalanced or misplaced conditional directive.
    #[error("Directive error at line {line}: {message}")]
    Directive {
        /// 1-based source line
        line: usize,
        /// What went wrong
        message: String,
    },

    /// An `#if` / `#elif` expression could not be evaluated.
    #[error("Expression error at line {line}: {message}")]
    Expression {
        /// 1-based source line
        line: usize,
        /// What went wrong
        message: String,
    },

    // ========================================================================
    // GPU Boundary Errors
    // ========================================================================
    /// The program backend refused to build a program.
    #[error("Program creation failed: {0}")]
    ProgramCreation(String),

    // ========================================================================
    // Configuration Errors
    // ========================================================================
    /// Settings JSON could not be parsed.
    #[error("Settings parse error: {0}")]
    Settings(#[from] serde_json::Error),
}

/// Alias for `Result<T, ShaderError>`.
pub type Result<T> = std::result::Result<T, ShaderError>;
