//! Middleware Pipeline
//!
//! Source transforms applied, in registration order, to the include-resolved
//! source of every compile unit. A stage returning `None` passes the source
//! through unchanged.
//!
//! Any `Fn(&ShaderLib, &Preprocessor, &str, &ProcessOptions) -> Option<String>`
//! is a [`Middleware`]:
//!
//! ```rust,ignore
//! lib.use_transform(|_, _, source, _| {
//!     source.contains("gl_FragColor").then(|| source.replace("gl_FragColor", "outColor"))
//! });
//! ```

use std::fmt;

use super::{Preprocessor, ProcessOptions};
use crate::library::ShaderLib;

pub trait Middleware {
    /// Returns the rewritten source, or `None` to leave it unchanged.
    fn transform(
        &self,
        lib: &ShaderLib,
        preprocessor: &Preprocessor,
        source: &str,
        options: &ProcessOptions,
    ) -> Option<String>;
}

impl<F> Middleware for F
where
    F: Fn(&ShaderLib, &Preprocessor, &str, &ProcessOptions) -> Option<String>,
{
    fn transform(
        &self,
        lib: &ShaderLib,
        preprocessor: &Preprocessor,
        source: &str,
        options: &ProcessOptions,
    ) -> Option<String> {
        self(lib, preprocessor, source, options)
    }
}

#[derive(Default)]
pub struct MiddlewarePipeline {
    stages: Vec<Box<dyn Middleware>>,
}

impl MiddlewarePipeline {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, stage: impl Middleware + 'static) {
        self.stages.push(Box::new(stage));
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.stages.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }

    /// Threads `source` through every stage.
    pub fn apply(
        &self,
        lib: &ShaderLib,
        preprocessor: &Preprocessor,
        source: String,
        options: &ProcessOptions,
    ) -> String {
        self.stages
            .iter()
            .enumerate()
            .fold(source, |current, (index, stage)| {
                match stage.transform(lib, preprocessor, &current, options) {
                    Some(next) => {
                        log::trace!("Middleware #{index} rewrote source ({} bytes)", next.len());
                        if next.trim().is_empty() {
                            log::warn!("Middleware #{index} produced an empty source");
                        }
                        next
                    }
                    None => current,
                }
            })
    }
}

impl fmt::Debug for MiddlewarePipeline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MiddlewarePipeline")
            .field("stages", &self.stages.len())
            .finish()
    }
}
