//! Utility Module
//!
//! - [`interner`]: String interning for define names and values
//!
//! # String Interning
//!
//! Define keys and values are interned once and compared as [`Symbol`]s,
//! which keeps define-set hashing and merging cheap on the per-frame path.
//!
//! ```rust,ignore
//! use myth_shaderlib::utils::interner;
//!
//! let sym1 = interner::intern("USE_FOG");
//! let sym2 = interner::intern("USE_FOG");
//! assert_eq!(sym1, sym2);
//! ```

pub mod interner;

pub use interner::Symbol;
