//! Shader Macro Definitions
//!
//! Keyed store of macro name → string value, injected as `#define NAME VALUE`
//! lines ahead of every compile unit.
//!
//! # Architecture
//!
//! Keys and values are interned [`Symbol`]s kept in a `Vec` sorted by symbol,
//! so that identical define sets always iterate (and hash) identically.
//!
//! # Value coercion
//!
//! Values enter through [`DefineValue`]:
//!
//! | Input            | Stored as         |
//! |------------------|-------------------|
//! | `true` / `false` | `"1"` / `"0"`     |
//! | integers         | decimal string    |
//! | floats           | shortest form (`1.0` → `"1"`, `0.5` → `"0.5"`) |
//! | strings          | unchanged         |
//!
//! ```rust,ignore
//! let mut defines = ShaderDefines::new();
//! defines.define("USE_FOG", true);
//! defines.define("MAX_LIGHTS", 8);
//! assert_eq!(defines.get("USE_FOG").as_deref(), Some("1"));
//! ```

use std::hash::{Hash, Hasher};

use crate::utils::interner::{self, Symbol};

/// A value accepted by [`ShaderDefines::define`], before string coercion.
#[derive(Debug, Clone, PartialEq)]
pub enum DefineValue {
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
}

impl DefineValue {
    /// Coerces the value to the string written after the macro name.
    #[must_use]
    pub fn to_define_string(&self) -> String {
        match self {
            Self::Bool(true) => "1".to_string(),
            Self::Bool(false) => "0".to_string(),
            Self::Int(v) => v.to_string(),
            Self::Float(v) => v.to_string(),
            Self::Text(v) => v.clone(),
        }
    }

    /// Converts a JSON scalar. `null` yields `None` and is skipped by callers;
    /// arrays and objects are stringified as JSON.
    #[must_use]
    pub fn from_json(value: &serde_json::Value) -> Option<Self> {
        use serde_json::Value;

        match value {
            Value::Null => None,
            Value::Bool(b) => Some(Self::Bool(*b)),
            Value::Number(n) => Some(match n.as_i64() {
                Some(i) => Self::Int(i),
                None => Self::Float(n.as_f64().unwrap_or_default()),
            }),
            Value::String(s) => Some(Self::Text(s.clone())),
            other => Some(Self::Text(other.to_string())),
        }
    }
}

impl From<bool> for DefineValue {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

macro_rules! impl_define_value_int {
    ($($t:ty),*) => {
        $(
            impl From<$t> for DefineValue {
                fn from(v: $t) -> Self {
                    Self::Int(i64::from(v))
                }
            }
        )*
    };
}

impl_define_value_int!(i8, i16, i32, i64, u8, u16, u32);

impl From<usize> for DefineValue {
    fn from(v: usize) -> Self {
        i64::try_from(v).map_or_else(|_| Self::Text(v.to_string()), Self::Int)
    }
}

impl From<f32> for DefineValue {
    fn from(v: f32) -> Self {
        Self::Float(f64::from(v))
    }
}

impl From<f64> for DefineValue {
    fn from(v: f64) -> Self {
        Self::Float(v)
    }
}

impl From<&str> for DefineValue {
    fn from(v: &str) -> Self {
        Self::Text(v.to_string())
    }
}

impl From<String> for DefineValue {
    fn from(v: String) -> Self {
        Self::Text(v)
    }
}

impl From<&String> for DefineValue {
    fn from(v: &String) -> Self {
        Self::Text(v.clone())
    }
}

/// A collection of shader macro definitions.
///
/// # Performance
///
/// - Insertion/lookup: O(log n) binary search over symbols
/// - Comparison: symbol-wise, no string compares
#[derive(Debug, Clone, Default)]
pub struct ShaderDefines {
    defines: Vec<(Symbol, Symbol)>,
}

impl ShaderDefines {
    /// An empty define set.
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self {
            defines: Vec::new(),
        }
    }

    /// Sets a raw string value, overwriting any previous one.
    pub fn set(&mut self, key: &str, value: &str) {
        self.set_symbol(interner::intern(key), interner::intern(value));
    }

    /// Sets a value after [`DefineValue`] coercion.
    pub fn define(&mut self, key: &str, value: impl Into<DefineValue>) {
        let value = value.into().to_define_string();
        self.set(key, &value);
    }

    #[inline]
    fn set_symbol(&mut self, key: Symbol, value: Symbol) {
        match self.position(key) {
            Ok(idx) => self.defines[idx].1 = value,
            Err(idx) => self.defines.insert(idx, (key, value)),
        }
    }

    #[inline]
    fn position(&self, key: Symbol) -> Result<usize, usize> {
        self.defines.binary_search_by_key(&key, |&(k, _)| k)
    }

    /// Removes a define. Returns whether it was present.
    pub fn remove(&mut self, key: &str) -> bool {
        match interner::get(key).map(|key| self.position(key)) {
            Some(Ok(idx)) => {
                self.defines.remove(idx);
                true
            }
            _ => false,
        }
    }

    /// Whether `key` is defined.
    #[must_use]
    pub fn contains(&self, key: &str) -> bool {
        interner::get(key).is_some_and(|key| self.position(key).is_ok())
    }

    /// Value of `key`, if defined.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&'static str> {
        let idx = self.position(interner::get(key)?).ok()?;
        Some(interner::resolve(self.defines[idx].1))
    }

    /// Number of defines.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.defines.len()
    }

    /// Whether the set has no defines.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.defines.is_empty()
    }

    /// Iterates `(name, value)` pairs as strings.
    pub fn iter_strings(&self) -> impl Iterator<Item = (&'static str, &'static str)> + '_ {
        self.defines
            .iter()
            .map(|&(k, v)| (interner::resolve(k), interner::resolve(v)))
    }

    /// Merges `other` into `self`; on conflict `other` wins.
    pub fn merge(&mut self, other: &ShaderDefines) {
        for &(key, value) in &other.defines {
            self.set_symbol(key, value);
        }
    }

    /// A copy of `self` with `other` merged over it.
    #[must_use]
    pub fn merged_with(&self, other: &ShaderDefines) -> ShaderDefines {
        let mut result = self.clone();
        result.merge(other);
        result
    }

    /// Content hash of the define set.
    #[must_use]
    pub fn compute_hash(&self) -> u64 {
        use std::hash::BuildHasher;

        rustc_hash::FxBuildHasher.hash_one(self)
    }
}

impl Hash for ShaderDefines {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.defines.hash(state);
    }
}

impl PartialEq for ShaderDefines {
    fn eq(&self, other: &Self) -> bool {
        self.defines == other.defines
    }
}

impl Eq for ShaderDefines {}

impl<K, V> FromIterator<(K, V)> for ShaderDefines
where
    K: AsRef<str>,
    V: Into<DefineValue>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut result = Self::new();
        for (k, v) in iter {
            result.define(k.as_ref(), v);
        }
        result
    }
}
