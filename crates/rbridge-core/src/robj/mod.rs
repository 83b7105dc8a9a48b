//! Typed wrappers over engine handles.
//!
//! Wrappers are `Copy` views: they own no storage and do not root anything.
//! Lifetime is the caller's problem, handled through [`crate::protect`] and
//! [`crate::shelter`]. Every accessor re-queries the heap, so a wrapper can
//! never disagree with the object behind it.
//!
//! [`RObject`] carries the two cascades: `from_data` (host value to foreign
//! object) and `to_data` (foreign object to host value, depth-bounded).

mod atomic;
mod env;
mod lang;
mod list;

pub use atomic::{RCharacter, RComplex, RDouble, RInteger, RLogical, RRaw};
pub use env::REnvironment;
pub use lang::{RCall, RFunction, RString, RSymbol};
pub use list::{RDataFrame, RList, RPairlist};

use rbridge_engine::engine::{self, Engine};
use rbridge_engine::{EngineResult, Handle, Tag};
use rustc_hash::FxHashMap;

use crate::data::{ConvertOptions, Index, ObjectOptions, RData, RDataNode};
use crate::error::{BridgeError, BridgeResult};
use crate::protect::{ProtectScope, ProtectSlot};

/// Declare a typed wrapper: a `Copy` newtype over [`RAny`] whose `wrap`
/// validates the heap tag.
macro_rules! wrapper {
    ($(#[$meta:meta])* $name:ident, $expected:literal, $($tag:pat_param)|+) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq)]
        pub struct $name(pub(crate) crate::robj::RAny);

        impl $name {
            /// Wrap `h`, validating the heap type.
            pub fn wrap(h: rbridge_engine::Handle) -> crate::error::BridgeResult<Self> {
                let tag = rbridge_engine::engine::with(|rt| rt.type_of(h))?;
                match tag {
                    $($tag)|+ => Ok($name(crate::robj::RAny::from_handle(h))),
                    other => Err(crate::error::BridgeError::UnexpectedType {
                        expected: $expected,
                        actual: other.name().to_string(),
                    }),
                }
            }

            /// The wrapped handle.
            pub fn handle(&self) -> rbridge_engine::Handle {
                self.0.handle()
            }
        }

        impl std::ops::Deref for $name {
            type Target = crate::robj::RAny;
            fn deref(&self) -> &crate::robj::RAny {
                &self.0
            }
        }

        impl From<$name> for crate::robj::RAny {
            fn from(obj: $name) -> crate::robj::RAny {
                obj.0
            }
        }
    };
}
pub(crate) use wrapper;

/// Untyped wrapper: any handle, with the accessors every object shares.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RAny {
    handle: Handle,
}

/// Build the engine-side index vector for an access call.
pub(crate) fn index_handle(rt: &mut Engine, idx: &Index) -> EngineResult<Handle> {
    match idx {
        Index::Pos(p) => {
            let v = rt.alloc_vector(Tag::Integer, 1)?;
            rt.fill_int(v, &[*p])?;
            Ok(v)
        }
        Index::Name(name) => {
            let v = rt.alloc_vector(Tag::Character, 1)?;
            rt.fill_character(v, &[Some(name.clone())])?;
            Ok(v)
        }
    }
}

/// Missingness mask for a vector, via a single `is.na` evaluation.
pub(crate) fn detect_missing(h: Handle) -> BridgeResult<Vec<bool>> {
    let mask = engine::with(|rt| -> EngineResult<Vec<i32>> {
        let op = rt.install("is.na");
        let call = rt.lang2(op, h)?;
        rt.protect(call);
        let result = rt.eval(call, rt.base_env());
        rt.unprotect(1)?;
        rt.logical_values(result?)
    })?;
    Ok(mask.into_iter().map(|x| x != 0).collect())
}

/// Collapse name/value entries into a keyed record per the conversion
/// options: empty keys are rejected unless allowed, duplicates are rejected
/// unless allowed, and an allowed duplicate is won by the later occurrence.
pub(crate) fn object_from_entries(
    entries: Vec<(Option<String>, RData)>,
    opts: &ObjectOptions,
) -> BridgeResult<Vec<(String, RData)>> {
    let mut positions: FxHashMap<String, usize> = FxHashMap::default();
    let mut out: Vec<(String, RData)> = Vec::with_capacity(entries.len());
    for (name, value) in entries {
        let key = match name {
            Some(name) if !name.is_empty() => name,
            _ if opts.allow_empty_key => String::new(),
            _ => return Err(BridgeError::EmptyKey),
        };
        match positions.get(&key) {
            Some(&i) => {
                if !opts.allow_duplicate_key {
                    return Err(BridgeError::DuplicateKey(key));
                }
                out[i].1 = value;
            }
            None => {
                positions.insert(key.clone(), out.len());
                out.push((key, value));
            }
        }
    }
    Ok(out)
}

enum AccessOp {
    Subset,
    Element,
}

impl RAny {
    /// Wrap a handle without type validation.
    pub fn from_handle(handle: Handle) -> Self {
        RAny { handle }
    }

    /// The wrapped handle.
    pub fn handle(&self) -> Handle {
        self.handle
    }

    /// The heap's current type tag, re-queried on every call.
    pub fn type_tag(&self) -> BridgeResult<Tag> {
        Ok(engine::with(|rt| rt.type_of(self.handle))?)
    }

    /// Number of elements.
    pub fn len(&self) -> BridgeResult<usize> {
        Ok(engine::with(|rt| rt.length(self.handle))?)
    }

    /// Whether the object has no elements.
    pub fn is_empty(&self) -> BridgeResult<bool> {
        Ok(self.len()? == 0)
    }

    /// Whether this is the absence object.
    pub fn is_null(&self) -> BridgeResult<bool> {
        Ok(self.type_tag()? == Tag::Null)
    }

    /// Whether this is the unbound-value sentinel.
    pub fn is_unbound(&self) -> BridgeResult<bool> {
        Ok(engine::with(|rt| rt.unbound_value()) == self.handle)
    }

    /// Whether the first element is missing, decided by the foreign runtime
    /// through a synthesized `is.na` call.
    pub fn is_na(&self) -> BridgeResult<bool> {
        Ok(detect_missing(self.handle)?.first().copied().unwrap_or(false))
    }

    /// The attribute pairlist, if any attributes are set.
    pub fn attrs(&self) -> BridgeResult<Option<RPairlist>> {
        let attrib = engine::with(|rt| rt.attributes(self.handle))?;
        if attrib == Handle::NULL {
            Ok(None)
        } else {
            Ok(Some(RPairlist::wrap(attrib)?))
        }
    }

    /// The object's class vector, via a synthesized `class` call.
    pub fn class(&self) -> BridgeResult<RCharacter> {
        let handle = self.handle;
        let out = engine::with(|rt| -> EngineResult<Handle> {
            let op = rt.install("class");
            let call = rt.lang2(op, handle)?;
            rt.protect(call);
            let result = rt.eval(call, rt.base_env());
            rt.unprotect(1)?;
            result
        })?;
        RCharacter::wrap(out)
    }

    /// Element names from the `names` attribute.
    pub fn names(&self) -> BridgeResult<Option<Vec<Option<String>>>> {
        let handle = self.handle;
        Ok(engine::with(|rt| -> EngineResult<Option<Vec<Option<String>>>> {
            let names = rt.get_attrib(handle, rt.names_symbol())?;
            if names == Handle::NULL {
                Ok(None)
            } else {
                Ok(Some(rt.char_vec(names)?))
            }
        })?)
    }

    /// Set or (with `None`) remove the `names` attribute.
    pub fn set_names(&self, names: Option<&[Option<String>]>) -> BridgeResult<()> {
        let handle = self.handle;
        match names {
            None => {
                engine::with(|rt| -> EngineResult<()> {
                    let sym = rt.names_symbol();
                    rt.set_attrib(handle, sym, Handle::NULL)
                })?;
            }
            Some(names) => {
                if names.len() != self.len()? {
                    return Err(BridgeError::BadNamesLength);
                }
                engine::with(|rt| -> EngineResult<()> {
                    let v = rt.alloc_vector(Tag::Character, names.len())?;
                    rt.protect(v);
                    rt.fill_character(v, names)?;
                    let sym = rt.names_symbol();
                    rt.set_attrib(handle, sym, v)?;
                    rt.unprotect(1)
                })?;
            }
        }
        Ok(())
    }

    /// Whether `name` appears among the element names.
    pub fn includes(&self, name: &str) -> BridgeResult<bool> {
        Ok(self
            .names()?
            .map_or(false, |names| names.iter().any(|n| n.as_deref() == Some(name))))
    }

    fn access(&self, op: AccessOp, idx: &Index) -> BridgeResult<RObject> {
        let handle = self.handle;
        let out = engine::with(|rt| -> EngineResult<Handle> {
            let selector = match op {
                AccessOp::Subset => rt.bracket_symbol(),
                AccessOp::Element => rt.bracket2_symbol(),
            };
            let idx_h = index_handle(rt, idx)?;
            rt.protect(idx_h);
            let call = rt.lang3(selector, handle, idx_h)?;
            rt.protect(call);
            let result = rt.eval(call, rt.base_env());
            rt.unprotect(2)?;
            result
        })?;
        RObject::wrap(out)
    }

    /// Single-bracket subset (`[`): same container kind, out-of-range slots
    /// become missing.
    pub fn subset(&self, idx: impl Into<Index>) -> BridgeResult<RObject> {
        self.access(AccessOp::Subset, &idx.into())
    }

    /// Double-bracket element access (`[[`).
    pub fn get(&self, idx: impl Into<Index>) -> BridgeResult<RObject> {
        self.access(AccessOp::Element, &idx.into())
    }

    /// Member access (`$`): the absence object when the member is missing.
    pub fn get_dollar(&self, name: &str) -> BridgeResult<RObject> {
        let handle = self.handle;
        let out = engine::with(|rt| -> EngineResult<Handle> {
            let sel = rt.install(name);
            let call = rt.lang3(rt.dollar_symbol(), handle, sel)?;
            rt.protect(call);
            let result = rt.eval(call, rt.base_env());
            rt.unprotect(1)?;
            result
        })?;
        RObject::wrap(out)
    }

    /// Walk a path of element accesses, re-rooting the accumulator in one
    /// stable protection slot per step. `Ok(None)` when the terminal value is
    /// the absence object.
    pub fn pluck(&self, path: &[Index]) -> BridgeResult<Option<RObject>> {
        let slot = ProtectSlot::new(Handle::NULL);
        let mut current = *self;
        for idx in path {
            let next = current.get(idx.clone())?;
            slot.reprotect(next.handle())?;
            current = RAny::from_handle(next.handle());
        }
        if current.is_null()? {
            Ok(None)
        } else {
            Ok(Some(RObject::wrap(current.handle)?))
        }
    }

    /// Element assignment (`[[<-`): returns the modified copy (or, for
    /// environments, the same environment with the binding defined).
    pub fn set(&self, idx: impl Into<Index>, value: RAny) -> BridgeResult<RObject> {
        let handle = self.handle;
        let value_handle = value.handle;
        let idx = idx.into();
        let out = engine::with(|rt| -> EngineResult<Handle> {
            let op = rt.install("[[<-");
            let idx_h = index_handle(rt, &idx)?;
            rt.protect(idx_h);
            let call = rt.lang4(op, handle, idx_h, value_handle)?;
            rt.protect(call);
            let result = rt.eval(call, rt.base_env());
            rt.unprotect(2)?;
            result
        })?;
        RObject::wrap(out)
    }
}

wrapper!(
    /// The absence object.
    RNull,
    "null",
    Tag::Null
);

impl RNull {
    /// The shared null wrapper.
    pub fn new() -> Self {
        RNull(RAny::from_handle(Handle::NULL))
    }
}

impl Default for RNull {
    fn default() -> Self {
        RNull::new()
    }
}

/// Closed sum over the wrapper types, produced by [`RObject::wrap`].
#[derive(Debug, Clone, Copy)]
pub enum RObject {
    /// The absence object.
    Null(RNull),
    /// An interned symbol.
    Symbol(RSymbol),
    /// A pairlist chain.
    Pairlist(RPairlist),
    /// A call expression.
    Call(RCall),
    /// A function (closure, builtin or special).
    Function(RFunction),
    /// An environment.
    Environment(REnvironment),
    /// A single character cell.
    String(RString),
    /// A logical vector.
    Logical(RLogical),
    /// An integer vector.
    Integer(RInteger),
    /// A double vector.
    Double(RDouble),
    /// A complex vector.
    Complex(RComplex),
    /// A character vector.
    Character(RCharacter),
    /// A raw byte vector.
    Raw(RRaw),
    /// A generic list.
    List(RList),
    /// A list classed as a data frame.
    DataFrame(RDataFrame),
    /// Any other object kind, untyped.
    Other(RAny),
}

impl RObject {
    /// Wrap `h` as its most specific type: the heap tag picks the variant,
    /// and a list refines to a frame when its class says so.
    pub fn wrap(h: Handle) -> BridgeResult<RObject> {
        let tag = engine::with(|rt| rt.type_of(h))?;
        Ok(match tag {
            Tag::Null => RObject::Null(RNull::new()),
            Tag::Symbol => RObject::Symbol(RSymbol::wrap(h)?),
            Tag::Pairlist => RObject::Pairlist(RPairlist::wrap(h)?),
            Tag::Call => RObject::Call(RCall::wrap(h)?),
            Tag::Closure | Tag::Builtin | Tag::Special => RObject::Function(RFunction::wrap(h)?),
            Tag::Environment => RObject::Environment(REnvironment::wrap(h)?),
            Tag::String => RObject::String(RString::wrap(h)?),
            Tag::Logical => RObject::Logical(RLogical::wrap(h)?),
            Tag::Integer => RObject::Integer(RInteger::wrap(h)?),
            Tag::Double => RObject::Double(RDouble::wrap(h)?),
            Tag::Complex => RObject::Complex(RComplex::wrap(h)?),
            Tag::Character => RObject::Character(RCharacter::wrap(h)?),
            Tag::Raw => RObject::Raw(RRaw::wrap(h)?),
            Tag::List => match RDataFrame::wrap(h) {
                Ok(frame) => RObject::DataFrame(frame),
                Err(_) => RObject::List(RList::wrap(h)?),
            },
        })
    }

    /// The wrapped handle.
    pub fn handle(&self) -> Handle {
        self.any().handle()
    }

    /// The untyped view.
    pub fn any(&self) -> RAny {
        match self {
            RObject::Null(o) => o.0,
            RObject::Symbol(o) => o.0,
            RObject::Pairlist(o) => o.0,
            RObject::Call(o) => o.0,
            RObject::Function(o) => o.0,
            RObject::Environment(o) => o.0,
            RObject::String(o) => o.0,
            RObject::Logical(o) => o.0,
            RObject::Integer(o) => o.0,
            RObject::Double(o) => o.0,
            RObject::Complex(o) => o.0,
            RObject::Character(o) => o.0,
            RObject::Raw(o) => o.0,
            RObject::List(o) => o.0,
            RObject::DataFrame(o) => o.any(),
            RObject::Other(o) => *o,
        }
    }

    /// Construct a foreign object from a host value.
    ///
    /// The cascade, in order: explicit typed nodes, already-wrapped objects,
    /// absence, scalars, binary buffers, sequences (array inference). A bare
    /// keyed record is reserved for frame construction and fails when its
    /// shape is not frame-eligible; build through [`RList::from_record`] to
    /// get a plain named list instead.
    pub fn from_data(data: RData) -> BridgeResult<RObject> {
        Ok(match data {
            RData::Node(node) => Self::from_node(node)?,
            RData::Object(obj) => obj,
            RData::Null => RObject::Null(RNull::new()),
            RData::Na => RObject::Logical(RLogical::new(&[None])?),
            RData::Bool(b) => RObject::Logical(RLogical::new(&[Some(b)])?),
            RData::Int(x) => RObject::Integer(RInteger::new(&[Some(x)])?),
            RData::Double(x) => RObject::Double(RDouble::new(&[Some(x)])?),
            RData::Str(s) => RObject::Character(RCharacter::new(&[Some(s)])?),
            RData::Complex(z) => RObject::Complex(RComplex::new(&[Some(z)])?),
            RData::Bytes(bytes) => RObject::Raw(RRaw::new(&bytes)?),
            RData::Array(items) => Self::from_array(items)?,
            RData::Record(entries) => RObject::DataFrame(RDataFrame::from_record(entries)?),
        })
    }

    /// Construct exactly the type an explicit node names.
    pub fn from_node(node: RDataNode) -> BridgeResult<RObject> {
        fn with_names<T: Copy + Into<RAny>>(
            obj: T,
            names: Option<Vec<Option<String>>>,
        ) -> BridgeResult<T> {
            if let Some(names) = names {
                let any: RAny = obj.into();
                any.set_names(Some(&names))?;
            }
            Ok(obj)
        }

        Ok(match node {
            RDataNode::Null => RObject::Null(RNull::new()),
            RDataNode::String(text) => RObject::String(RString::from_text(text.as_deref())),
            RDataNode::Symbol(name) => RObject::Symbol(RSymbol::new(&name)),
            RDataNode::Logical { names, values } => {
                RObject::Logical(with_names(RLogical::new(&values)?, names)?)
            }
            RDataNode::Integer { names, values } => {
                RObject::Integer(with_names(RInteger::new(&values)?, names)?)
            }
            RDataNode::Double { names, values } => {
                RObject::Double(with_names(RDouble::new(&values)?, names)?)
            }
            RDataNode::Complex { names, values } => {
                RObject::Complex(with_names(RComplex::new(&values)?, names)?)
            }
            RDataNode::Character { names, values } => {
                RObject::Character(with_names(RCharacter::new(&values)?, names)?)
            }
            RDataNode::Raw { names, values } => {
                RObject::Raw(with_names(RRaw::new(&values)?, names)?)
            }
            RDataNode::List { names, values } => {
                let names = names.map(|names| {
                    names
                        .into_iter()
                        .map(|n| n.unwrap_or_default())
                        .collect::<Vec<String>>()
                });
                RObject::List(RList::new(values, names)?)
            }
            RDataNode::Pairlist { names, values } => {
                let entries: Vec<(Option<String>, RData)> = match names {
                    Some(names) => names.into_iter().zip(values).collect(),
                    None => values.into_iter().map(|v| (None, v)).collect(),
                };
                RObject::Pairlist(RPairlist::new(entries)?)
            }
            RDataNode::Environment { names, values } => {
                let entries: Vec<(String, RData)> = names.into_iter().zip(values).collect();
                RObject::Environment(REnvironment::new(&entries)?)
            }
        })
    }

    /// Array inference: decide the foreign shape of a host sequence.
    ///
    /// In order: consistent records of scalars become a frame (key order
    /// within a record does not matter); homogeneous scalar sequences take
    /// an atomic fast path (an empty sequence is an empty logical vector);
    /// everything else concatenates through an evaluated `c(...)` call so
    /// the foreign runtime decides. Bare records that reach the fallback go
    /// through frame construction element by element, so an all-record
    /// sequence that cannot transpose to columns is an eligibility error,
    /// not a quiet list.
    pub fn from_array(items: Vec<RData>) -> BridgeResult<RObject> {
        if let Some(rows) = list::frame_rows(&items) {
            return Ok(RObject::DataFrame(RDataFrame::from_records(&rows)?));
        }

        let all = |pred: fn(&RData) -> bool| items.iter().all(pred);
        if items.is_empty() || all(|i| matches!(i, RData::Bool(_) | RData::Na)) {
            let values: Vec<Option<bool>> = items
                .iter()
                .map(|i| match i {
                    RData::Bool(b) => Some(*b),
                    _ => None,
                })
                .collect();
            return Ok(RObject::Logical(RLogical::new(&values)?));
        }
        if all(|i| matches!(i, RData::Int(_) | RData::Na)) {
            let values: Vec<Option<i32>> = items
                .iter()
                .map(|i| match i {
                    RData::Int(x) => Some(*x),
                    _ => None,
                })
                .collect();
            return Ok(RObject::Integer(RInteger::new(&values)?));
        }
        if all(|i| matches!(i, RData::Int(_) | RData::Double(_) | RData::Na)) {
            let values: Vec<Option<f64>> = items
                .iter()
                .map(|i| match i {
                    RData::Int(x) => Some(*x as f64),
                    RData::Double(x) => Some(*x),
                    _ => None,
                })
                .collect();
            return Ok(RObject::Double(RDouble::new(&values)?));
        }
        if all(|i| matches!(i, RData::Str(_) | RData::Na)) {
            let values: Vec<Option<String>> = items
                .iter()
                .map(|i| match i {
                    RData::Str(s) => Some(s.clone()),
                    _ => None,
                })
                .collect();
            return Ok(RObject::Character(RCharacter::new(&values)?));
        }

        Self::concat_fallback(items)
    }

    fn concat_fallback(items: Vec<RData>) -> BridgeResult<RObject> {
        let mut scope = ProtectScope::new();
        let mut handles = Vec::with_capacity(items.len());
        for item in items {
            let obj = RObject::from_data(item)?;
            handles.push(scope.add(obj.handle()));
        }
        let out = engine::with(|rt| -> EngineResult<Handle> {
            let op = rt.install("c");
            let call = rt.alloc_lang(handles.len() + 1);
            rt.protect(call);
            rt.set_car(call, op)?;
            let mut cur = rt.cdr(call)?;
            for &h in &handles {
                rt.set_car(cur, h)?;
                cur = rt.cdr(cur)?;
            }
            let result = rt.eval(call, rt.base_env());
            rt.unprotect(1)?;
            result
        })?;
        RObject::wrap(out)
    }

    /// Convert to a host value, bounded by `opts.depth`.
    pub fn to_data(&self, opts: &ConvertOptions) -> BridgeResult<RData> {
        self.to_data_at(0, opts)
    }

    pub(crate) fn to_data_at(&self, level: i32, opts: &ConvertOptions) -> BridgeResult<RData> {
        Ok(RData::Node(match self {
            RObject::Null(_) => RDataNode::Null,
            RObject::Symbol(sym) => RDataNode::Symbol(sym.to_name_string()?),
            RObject::String(s) => RDataNode::String(s.text()?),
            RObject::Logical(v) => v.node()?,
            RObject::Integer(v) => v.node()?,
            RObject::Double(v) => v.node()?,
            RObject::Complex(v) => v.node()?,
            RObject::Character(v) => v.node()?,
            RObject::Raw(v) => v.node()?,
            RObject::List(v) => v.node(level, opts)?,
            RObject::DataFrame(v) => v.list().node(level, opts)?,
            RObject::Pairlist(v) => v.node(level, opts)?,
            RObject::Environment(v) => v.node(level, opts)?,
            RObject::Call(_) | RObject::Function(_) | RObject::Other(_) => {
                let tag = self.any().type_tag()?;
                return Err(BridgeError::NotRepresentable(tag.name().to_string()));
            }
        }))
    }
}

/// Whether a child at `level` should stay wrapped instead of converting.
pub(crate) fn child_data(
    child: RObject,
    level: i32,
    opts: &ConvertOptions,
) -> BridgeResult<RData> {
    if opts.depth != 0 && level >= opts.depth {
        Ok(RData::Object(child))
    } else {
        child.to_data_at(level, opts)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::Complex;

    #[test]
    fn test_wrap_picks_variant_by_tag() {
        let v = RDouble::new(&[Some(1.0)]).unwrap();
        assert!(matches!(RObject::wrap(v.handle()).unwrap(), RObject::Double(_)));
        assert!(matches!(
            RObject::wrap(Handle::NULL).unwrap(),
            RObject::Null(_)
        ));
    }

    #[test]
    fn test_from_data_scalars() {
        assert!(matches!(
            RObject::from_data(RData::Bool(true)).unwrap(),
            RObject::Logical(_)
        ));
        assert!(matches!(
            RObject::from_data(RData::Int(7)).unwrap(),
            RObject::Integer(_)
        ));
        assert!(matches!(
            RObject::from_data(RData::Str("x".into())).unwrap(),
            RObject::Character(_)
        ));
        assert!(matches!(
            RObject::from_data(RData::Complex(Complex::new(1.0, 2.0))).unwrap(),
            RObject::Complex(_)
        ));
        assert!(matches!(
            RObject::from_data(RData::Null).unwrap(),
            RObject::Null(_)
        ));
    }

    #[test]
    fn test_from_array_fast_paths() {
        let obj = RObject::from_array(vec![RData::Bool(true), RData::Na]).unwrap();
        assert!(matches!(obj, RObject::Logical(_)));

        let obj = RObject::from_array(vec![RData::Int(1), RData::Double(2.5)]).unwrap();
        assert!(matches!(obj, RObject::Double(_)));

        let obj = RObject::from_array(vec![RData::Str("a".into()), RData::Na]).unwrap();
        assert!(matches!(obj, RObject::Character(_)));

        // An empty sequence has no element type to infer.
        let obj = RObject::from_array(Vec::new()).unwrap();
        match obj {
            RObject::Logical(v) => assert_eq!(v.len().unwrap(), 0),
            other => panic!("expected an empty logical vector, got {:?}", other),
        }
    }

    #[test]
    fn test_from_array_mixed_falls_back_to_concat() {
        let obj =
            RObject::from_array(vec![RData::Bool(true), RData::Str("x".into())]).unwrap();
        match obj {
            RObject::Character(v) => {
                assert_eq!(
                    v.to_array().unwrap(),
                    vec![Some("TRUE".to_string()), Some("x".to_string())]
                );
            }
            other => panic!("expected promotion to character, got {:?}", other),
        }
    }

    #[test]
    fn test_fast_path_agrees_with_concat_fallback() {
        let items = vec![RData::Double(1.5), RData::Na, RData::Double(3.0)];
        let fast = match RObject::from_array(items.clone()).unwrap() {
            RObject::Double(v) => v.to_array().unwrap(),
            other => panic!("unexpected: {:?}", other),
        };
        let concat = match RObject::concat_fallback(items).unwrap() {
            RObject::Double(v) => v.to_array().unwrap(),
            other => panic!("unexpected: {:?}", other),
        };
        assert_eq!(fast, concat);
    }

    #[test]
    fn test_subset_get_and_dollar() {
        let list = RList::from_record(vec![
            ("a".to_string(), RData::Int(1)),
            ("b".to_string(), RData::Str("two".into())),
        ])
        .unwrap();

        match list.get("b").unwrap() {
            RObject::Character(v) => assert_eq!(v.to_scalar().unwrap(), "two"),
            other => panic!("unexpected: {:?}", other),
        }
        match list.get_dollar("a").unwrap() {
            RObject::Integer(v) => assert_eq!(v.to_scalar().unwrap(), 1),
            other => panic!("unexpected: {:?}", other),
        }
        // Absent member comes back as the absence object.
        assert!(matches!(
            list.get_dollar("missing").unwrap(),
            RObject::Null(_)
        ));
        match list.subset(1).unwrap() {
            RObject::List(sub) => assert_eq!(sub.len().unwrap(), 1),
            other => panic!("unexpected: {:?}", other),
        }
    }

    #[test]
    fn test_pluck_walks_and_reports_absence() {
        let inner = RData::Record(vec![("x".to_string(), RData::Int(42))]);
        let outer = RList::from_record(vec![("inner".to_string(), inner)]).unwrap();

        let found = outer
            .pluck(&[Index::from("inner"), Index::from("x")])
            .unwrap();
        match found {
            Some(RObject::Integer(v)) => assert_eq!(v.to_scalar().unwrap(), 42),
            other => panic!("unexpected: {:?}", other),
        }

        let missing = outer
            .pluck(&[Index::from("inner"), Index::from("nope")])
            .unwrap();
        assert!(missing.is_none());

        let base = crate::protect::depth();
        let _ = outer.pluck(&[Index::from("inner")]).unwrap();
        assert_eq!(crate::protect::depth(), base);
    }

    #[test]
    fn test_set_returns_modified_copy() {
        let list = RList::from_record(vec![("a".to_string(), RData::Int(1))]).unwrap();
        let value = RObject::from_data(RData::Int(2)).unwrap();
        let updated = list.set("b", value.any()).unwrap();
        match updated {
            RObject::List(updated) => {
                assert_eq!(updated.len().unwrap(), 2);
                assert_eq!(list.len().unwrap(), 1);
            }
            other => panic!("unexpected: {:?}", other),
        }
    }

    #[test]
    fn test_names_roundtrip_and_length_check() {
        let v = RDouble::new(&[Some(1.0), Some(2.0)]).unwrap();
        v.set_names(Some(&[Some("a".to_string()), Some("b".to_string())]))
            .unwrap();
        assert_eq!(
            v.names().unwrap(),
            Some(vec![Some("a".to_string()), Some("b".to_string())])
        );
        assert!(v.includes("a").unwrap());
        assert!(!v.includes("c").unwrap());

        assert!(matches!(
            v.set_names(Some(&[Some("a".to_string())])),
            Err(BridgeError::BadNamesLength)
        ));

        v.set_names(None).unwrap();
        assert!(v.names().unwrap().is_none());
    }

    #[test]
    fn test_object_from_entries_key_rules() {
        let entries = vec![
            (Some("a".to_string()), RData::Int(1)),
            (Some("a".to_string()), RData::Int(2)),
        ];
        let out = object_from_entries(entries.clone(), &ObjectOptions::default()).unwrap();
        assert_eq!(out.len(), 1);
        assert!(matches!(out[0].1, RData::Int(2)));

        let strict = ObjectOptions {
            allow_duplicate_key: false,
            ..ObjectOptions::default()
        };
        assert!(matches!(
            object_from_entries(entries, &strict),
            Err(BridgeError::DuplicateKey(_))
        ));

        let unnamed = vec![(None, RData::Int(1))];
        assert!(matches!(
            object_from_entries(unnamed.clone(), &ObjectOptions::default()),
            Err(BridgeError::EmptyKey)
        ));
        let relaxed = ObjectOptions {
            allow_empty_key: true,
            ..ObjectOptions::default()
        };
        assert!(object_from_entries(unnamed, &relaxed).is_ok());
    }
}
