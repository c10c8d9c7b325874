//! Global String Interner
//!
//! Turns define names and values into integer [`Symbol`]s so that define sets
//! can be compared and hashed without touching string data. Backed by a
//! process-wide `lasso` rodeo.

use std::sync::LazyLock;

use lasso::{Spur, ThreadedRodeo};

static INTERNER: LazyLock<ThreadedRodeo> = LazyLock::new(ThreadedRodeo::new);

/// Compact integer handle for an interned string.
pub type Symbol = Spur;

/// Interns a string, returning the existing symbol if it was seen before.
#[inline]
pub fn intern(s: &str) -> Symbol {
    INTERNER.get_or_intern(s)
}

/// Looks up the symbol of an already interned string without allocating.
#[inline]
#[must_use]
pub fn get(s: &str) -> Option<Symbol> {
    INTERNER.get(s)
}

/// Resolves a symbol back to its string.
#[inline]
#[must_use]
pub fn resolve(sym: Symbol) -> &'static str {
    INTERNER.resolve(&sym)
}

/// Pre-interns the macro names every compile unit sees, keeping the first
/// frame's define merge off the allocation path.
pub fn preload_common_macros() {
    let common = [
        "GL_ES",
        "__VERSION__",
        "SHADER_NAME",
        "0",
        "1",
    ];

    for name in common {
        intern(name);
    }
}
