//! Host-side value representations.
//!
//! [`RData`] is the universal union a host hands to the construction cascade;
//! [`RDataNode`] is the typed tree that conversion produces and that
//! construction accepts when the host wants an exact foreign type. The two
//! deliberately overlap: a conversion result can be fed straight back into
//! construction.

use crate::robj::RObject;

/// A complex scalar.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Complex {
    /// Real part.
    pub re: f64,
    /// Imaginary part.
    pub im: f64,
}

impl Complex {
    /// Build a complex scalar.
    pub fn new(re: f64, im: f64) -> Self {
        Complex { re, im }
    }
}

/// Universal host value accepted by the construction cascade.
#[derive(Debug, Clone)]
pub enum RData {
    /// The host's no-value, mapped to the foreign absence object.
    Null,
    /// An explicit missing scalar.
    Na,
    /// A boolean scalar.
    Bool(bool),
    /// A 32-bit integer scalar.
    Int(i32),
    /// A double scalar.
    Double(f64),
    /// A string scalar.
    Str(String),
    /// A complex scalar.
    Complex(Complex),
    /// A binary buffer, mapped to a raw vector.
    Bytes(Vec<u8>),
    /// An ordered sequence, fed to the array-inference cascade.
    Array(Vec<RData>),
    /// An ordered key/value record, mapped to a named list.
    Record(Vec<(String, RData)>),
    /// An already-wrapped object; construction passes it through.
    Object(RObject),
    /// An explicit typed node; construction builds exactly this type.
    Node(RDataNode),
}

/// Typed conversion tree. `names`, when present, is parallel to `values`.
#[derive(Debug, Clone)]
pub enum RDataNode {
    /// The absence object.
    Null,
    /// A single character cell; `None` is the missing string.
    String(Option<String>),
    /// A symbol, by print name.
    Symbol(String),
    /// A logical vector.
    Logical {
        /// Element names, parallel to `values`.
        names: Option<Vec<Option<String>>>,
        /// Elements; `None` is missing.
        values: Vec<Option<bool>>,
    },
    /// An integer vector.
    Integer {
        /// Element names, parallel to `values`.
        names: Option<Vec<Option<String>>>,
        /// Elements; `None` is missing.
        values: Vec<Option<i32>>,
    },
    /// A double vector.
    Double {
        /// Element names, parallel to `values`.
        names: Option<Vec<Option<String>>>,
        /// Elements; `None` is missing.
        values: Vec<Option<f64>>,
    },
    /// A complex vector.
    Complex {
        /// Element names, parallel to `values`.
        names: Option<Vec<Option<String>>>,
        /// Elements; `None` is missing.
        values: Vec<Option<Complex>>,
    },
    /// A character vector.
    Character {
        /// Element names, parallel to `values`.
        names: Option<Vec<Option<String>>>,
        /// Elements; `None` is missing.
        values: Vec<Option<String>>,
    },
    /// A raw byte vector (no missing encoding).
    Raw {
        /// Element names, parallel to `values`.
        names: Option<Vec<Option<String>>>,
        /// Elements.
        values: Vec<u8>,
    },
    /// A generic list.
    List {
        /// Element names, parallel to `values`.
        names: Option<Vec<Option<String>>>,
        /// Elements, possibly still-wrapped objects.
        values: Vec<RData>,
    },
    /// A pairlist chain.
    Pairlist {
        /// Cell names, parallel to `values`.
        names: Option<Vec<Option<String>>>,
        /// Cell values, possibly still-wrapped objects.
        values: Vec<RData>,
    },
    /// An environment frame.
    Environment {
        /// Binding names.
        names: Vec<String>,
        /// Bound values, possibly still-wrapped objects.
        values: Vec<RData>,
    },
}

/// A 1-based position or element name.
#[derive(Debug, Clone, PartialEq)]
pub enum Index {
    /// 1-based position.
    Pos(i32),
    /// Element name.
    Name(String),
}

impl From<i32> for Index {
    fn from(pos: i32) -> Self {
        Index::Pos(pos)
    }
}

impl From<&str> for Index {
    fn from(name: &str) -> Self {
        Index::Name(name.to_string())
    }
}

impl From<String> for Index {
    fn from(name: String) -> Self {
        Index::Name(name)
    }
}

/// Options for object-to-host conversion.
#[derive(Debug, Clone, Copy)]
pub struct ConvertOptions {
    /// Nesting bound. Zero converts without bound; children at a nesting
    /// level at or past a positive bound stay wrapped; a negative bound
    /// keeps every child wrapped.
    pub depth: i32,
}

impl Default for ConvertOptions {
    fn default() -> Self {
        ConvertOptions { depth: 0 }
    }
}

/// Options for conversion to a keyed record.
#[derive(Debug, Clone, Copy)]
pub struct ObjectOptions {
    /// Tolerate duplicate keys; the later occurrence wins.
    pub allow_duplicate_key: bool,
    /// Tolerate empty or missing keys.
    pub allow_empty_key: bool,
    /// Nesting bound for the converted values, as in [`ConvertOptions`].
    pub depth: i32,
}

impl Default for ObjectOptions {
    fn default() -> Self {
        ObjectOptions {
            allow_duplicate_key: true,
            allow_empty_key: false,
            depth: -1,
        }
    }
}

/// Split a value into construction names and values: records keep their
/// keys, arrays spread, and anything else is a single unnamed value.
pub(crate) fn named_parts(data: RData) -> (Option<Vec<String>>, Vec<RData>) {
    match data {
        RData::Record(entries) => {
            let (names, values) = entries.into_iter().unzip();
            (Some(names), values)
        }
        RData::Array(items) => (None, items),
        other => (None, vec![other]),
    }
}

impl From<bool> for RData {
    fn from(b: bool) -> Self {
        RData::Bool(b)
    }
}

impl From<i32> for RData {
    fn from(x: i32) -> Self {
        RData::Int(x)
    }
}

impl From<f64> for RData {
    fn from(x: f64) -> Self {
        RData::Double(x)
    }
}

impl From<&str> for RData {
    fn from(s: &str) -> Self {
        RData::Str(s.to_string())
    }
}

impl From<String> for RData {
    fn from(s: String) -> Self {
        RData::Str(s)
    }
}

impl From<Complex> for RData {
    fn from(z: Complex) -> Self {
        RData::Complex(z)
    }
}

impl From<Vec<u8>> for RData {
    fn from(bytes: Vec<u8>) -> Self {
        RData::Bytes(bytes)
    }
}

impl From<RObject> for RData {
    fn from(obj: RObject) -> Self {
        RData::Object(obj)
    }
}

impl<T: Into<RData>> From<Option<T>> for RData {
    fn from(value: Option<T>) -> Self {
        match value {
            Some(v) => v.into(),
            None => RData::Na,
        }
    }
}

impl RData {
    /// Whether this value is a scalar (or missing scalar) at the top level.
    pub fn is_scalar(&self) -> bool {
        matches!(
            self,
            RData::Na
                | RData::Bool(_)
                | RData::Int(_)
                | RData::Double(_)
                | RData::Str(_)
                | RData::Complex(_)
        )
    }
}
