//! Runtime type tags.
//!
//! Every heap node carries exactly one tag from this closed enumeration. The
//! bridge core re-derives tags through [`Engine::type_of`](crate::Engine) on
//! each use rather than caching them, since evaluation can replace a node's
//! representation.

use std::fmt;

/// The runtime's type discriminant for a heap node.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum Tag {
    /// The absence object.
    Null,
    /// An interned symbol.
    Symbol,
    /// A linked cell chain.
    Pairlist,
    /// A call expression (a pairlist headed by an operator).
    Call,
    /// A user-defined function.
    Closure,
    /// A special form (arguments not evaluated).
    Special,
    /// A built-in function.
    Builtin,
    /// An environment frame with a parent.
    Environment,
    /// A single character cell (an element of a character vector).
    String,
    /// Boolean vector.
    Logical,
    /// 32-bit integer vector.
    Integer,
    /// Double-precision vector.
    Double,
    /// Complex vector.
    Complex,
    /// String vector (of character cells).
    Character,
    /// Raw byte vector.
    Raw,
    /// Generic vector of objects.
    List,
}

impl Tag {
    /// Lowercase tag name, as reported in errors and conversion nodes.
    pub fn name(self) -> &'static str {
        match self {
            Tag::Null => "null",
            Tag::Symbol => "symbol",
            Tag::Pairlist => "pairlist",
            Tag::Call => "call",
            Tag::Closure => "closure",
            Tag::Special => "special",
            Tag::Builtin => "builtin",
            Tag::Environment => "environment",
            Tag::String => "string",
            Tag::Logical => "logical",
            Tag::Integer => "integer",
            Tag::Double => "double",
            Tag::Complex => "complex",
            Tag::Character => "character",
            Tag::Raw => "raw",
            Tag::List => "list",
        }
    }

    /// True for the atomic vector kinds.
    pub fn is_atomic(self) -> bool {
        matches!(
            self,
            Tag::Logical | Tag::Integer | Tag::Double | Tag::Complex | Tag::Character | Tag::Raw
        )
    }

    /// True for function kinds (closure, builtin, special).
    pub fn is_function(self) -> bool {
        matches!(self, Tag::Closure | Tag::Builtin | Tag::Special)
    }
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
