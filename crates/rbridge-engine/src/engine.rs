//! Engine assembly and the primitive heap API.
//!
//! The [`Engine`] owns the heap, the symbol table, the protection stack and
//! the precious list. All bridge-side code reaches it through [`with`], a
//! thread-local accessor: the bridge executes on a single worker-side control
//! thread, so the engine needs no internal synchronization.

use std::cell::RefCell;

use rustc_hash::FxHashMap;

use crate::builtins::Builtin;
use crate::gc::{self, GcStats};
use crate::handle::Handle;
use crate::heap::{Heap, Node, Payload, NA_INTEGER};
use crate::protect::{ProtectIndex, ProtectStack};
use crate::tag::Tag;
use crate::{EngineError, EngineResult};

/// Well-known singletons, fixed at bootstrap.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Globals {
    pub r_true: Handle,
    pub r_false: Handle,
    pub na_logical: Handle,
    pub na_string: Handle,
    pub unbound: Handle,
    pub empty_env: Handle,
    pub base_env: Handle,
    pub global_env: Handle,
    pub sym_names: Handle,
    pub sym_bracket: Handle,
    pub sym_bracket2: Handle,
    pub sym_dollar: Handle,
    pub sym_class: Handle,
    pub sym_row_names: Handle,
}

/// The tagged-object runtime consumed by the bridge core.
pub struct Engine {
    heap: Heap,
    symbols: FxHashMap<String, Handle>,
    protect: ProtectStack,
    precious: Vec<Handle>,
    globals: Globals,
    stats: GcStats,
}

thread_local! {
    static ENGINE: RefCell<Engine> = RefCell::new(Engine::boot());
}

/// Run `f` against the thread's engine, bootstrapping it on first use.
///
/// Calls must not nest: the engine is borrowed for the duration of `f`.
pub fn with<T>(f: impl FnOnce(&mut Engine) -> T) -> T {
    ENGINE.with(|engine| f(&mut engine.borrow_mut()))
}

fn intern(heap: &mut Heap, symbols: &mut FxHashMap<String, Handle>, name: &str, unbound: Handle) -> Handle {
    if let Some(&h) = symbols.get(name) {
        return h;
    }
    let printname = heap.alloc(Node::new(Tag::String, Payload::Char(Some(name.to_string()))));
    let sym = heap.alloc(Node::new(
        Tag::Symbol,
        Payload::Symbol {
            printname,
            value: unbound,
        },
    ));
    symbols.insert(name.to_string(), sym);
    sym
}

impl Engine {
    /// Start the runtime: allocate the singletons, intern the selector
    /// symbols and bind the builtin table into the base environment.
    pub fn boot() -> Self {
        let mut heap = Heap::new();
        let mut symbols = FxHashMap::default();

        let na_string = heap.alloc(Node::new(Tag::String, Payload::Char(None)));
        let unbound = heap.alloc(Node::new(Tag::Symbol, Payload::Unbound));
        let r_true = heap.alloc(Node::new(Tag::Logical, Payload::Logical(vec![1])));
        let r_false = heap.alloc(Node::new(Tag::Logical, Payload::Logical(vec![0])));
        let na_logical = heap.alloc(Node::new(Tag::Logical, Payload::Logical(vec![NA_INTEGER])));

        let empty_env = heap.alloc(Node::new(
            Tag::Environment,
            Payload::Env {
                parent: Handle::NULL,
                frame: Vec::new(),
            },
        ));
        let base_env = heap.alloc(Node::new(
            Tag::Environment,
            Payload::Env {
                parent: empty_env,
                frame: Vec::new(),
            },
        ));
        let global_env = heap.alloc(Node::new(
            Tag::Environment,
            Payload::Env {
                parent: base_env,
                frame: Vec::new(),
            },
        ));

        for &(name, builtin) in Builtin::TABLE {
            let sym = intern(&mut heap, &mut symbols, name, unbound);
            let f = heap.alloc(Node::new(Tag::Builtin, Payload::Builtin(builtin)));
            if let Ok(node) = heap.get_mut(base_env) {
                if let Payload::Env { frame, .. } = &mut node.payload {
                    frame.push((sym, f));
                }
            }
        }

        let globals = Globals {
            r_true,
            r_false,
            na_logical,
            na_string,
            unbound,
            empty_env,
            base_env,
            global_env,
            sym_names: intern(&mut heap, &mut symbols, "names", unbound),
            sym_bracket: intern(&mut heap, &mut symbols, "[", unbound),
            sym_bracket2: intern(&mut heap, &mut symbols, "[[", unbound),
            sym_dollar: intern(&mut heap, &mut symbols, "$", unbound),
            sym_class: intern(&mut heap, &mut symbols, "class", unbound),
            sym_row_names: intern(&mut heap, &mut symbols, "row.names", unbound),
        };

        Engine {
            heap,
            symbols,
            protect: ProtectStack::new(),
            precious: Vec::new(),
            globals,
            stats: GcStats::default(),
        }
    }

    pub(crate) fn node(&self, h: Handle) -> EngineResult<&Node> {
        self.heap.get(h)
    }

    pub(crate) fn node_mut(&mut self, h: Handle) -> EngineResult<&mut Node> {
        self.heap.get_mut(h)
    }

    pub(crate) fn alloc_node(&mut self, tag: Tag, payload: Payload) -> Handle {
        self.heap.alloc(Node::new(tag, payload))
    }

    pub(crate) fn globals(&self) -> &Globals {
        &self.globals
    }

    // --- well-known singletons -------------------------------------------

    /// The null object.
    pub fn null(&self) -> Handle {
        Handle::NULL
    }

    /// The shared `TRUE` scalar.
    pub fn r_true(&self) -> Handle {
        self.globals.r_true
    }

    /// The shared `FALSE` scalar.
    pub fn r_false(&self) -> Handle {
        self.globals.r_false
    }

    /// The shared logical missing-value scalar.
    pub fn na_logical(&self) -> Handle {
        self.globals.na_logical
    }

    /// The missing-string character cell.
    pub fn na_string(&self) -> Handle {
        self.globals.na_string
    }

    /// The unbound-value sentinel.
    pub fn unbound_value(&self) -> Handle {
        self.globals.unbound
    }

    /// The empty environment at the root of the parent chain.
    pub fn empty_env(&self) -> Handle {
        self.globals.empty_env
    }

    /// The base environment holding the builtin table.
    pub fn base_env(&self) -> Handle {
        self.globals.base_env
    }

    /// The global environment.
    pub fn global_env(&self) -> Handle {
        self.globals.global_env
    }

    /// The interned `names` attribute symbol.
    pub fn names_symbol(&self) -> Handle {
        self.globals.sym_names
    }

    /// The interned single-bracket selector symbol.
    pub fn bracket_symbol(&self) -> Handle {
        self.globals.sym_bracket
    }

    /// The interned double-bracket selector symbol.
    pub fn bracket2_symbol(&self) -> Handle {
        self.globals.sym_bracket2
    }

    /// The interned member-access selector symbol.
    pub fn dollar_symbol(&self) -> Handle {
        self.globals.sym_dollar
    }

    /// The interned `class` attribute symbol.
    pub fn class_symbol(&self) -> Handle {
        self.globals.sym_class
    }

    // --- type and shape ---------------------------------------------------

    /// Query the heap's type tag for `h`.
    pub fn type_of(&self, h: Handle) -> EngineResult<Tag> {
        Ok(self.node(h)?.tag)
    }

    /// Number of elements: vector length, cell-chain length, binding count
    /// for environments, zero for null and one for everything else.
    pub fn length(&self, h: Handle) -> EngineResult<usize> {
        let node = self.node(h)?;
        Ok(match &node.payload {
            Payload::Null => 0,
            Payload::Logical(v) | Payload::Int(v) => v.len(),
            Payload::Real(v) => v.len(),
            Payload::Cplx(v) => v.len(),
            Payload::Str(v) | Payload::List(v) => v.len(),
            Payload::Raw(v) => v.len(),
            Payload::Cons { .. } => {
                let mut n = 0;
                let mut cur = h;
                while self.node(cur)?.tag != Tag::Null {
                    n += 1;
                    cur = self.cdr(cur)?;
                }
                n
            }
            Payload::Env { frame, .. } => frame.len(),
            _ => 1,
        })
    }

    // --- allocation -------------------------------------------------------

    /// Allocate a vector of the given atomic or list kind.
    pub fn alloc_vector(&mut self, tag: Tag, len: usize) -> EngineResult<Handle> {
        let payload = match tag {
            Tag::Logical => Payload::Logical(vec![0; len]),
            Tag::Integer => Payload::Int(vec![0; len]),
            Tag::Double => Payload::Real(vec![0.0; len]),
            Tag::Complex => Payload::Cplx(vec![(0.0, 0.0); len]),
            Tag::Character => Payload::Str(vec![self.globals.na_string; len]),
            Tag::Raw => Payload::Raw(vec![0; len]),
            Tag::List => Payload::List(vec![Handle::NULL; len]),
            _ => return Err(EngineError::InvalidType { expected: "vector kind" }),
        };
        Ok(self.heap.alloc(Node::new(tag, payload)))
    }

    /// Allocate a pairlist chain of `n` cells (null when `n` is zero).
    pub fn alloc_list(&mut self, n: usize) -> Handle {
        let mut cur = Handle::NULL;
        for _ in 0..n {
            cur = self.heap.alloc(Node::new(
                Tag::Pairlist,
                Payload::Cons {
                    car: Handle::NULL,
                    cdr: cur,
                    tag: Handle::NULL,
                },
            ));
        }
        cur
    }

    /// Allocate a call-expression chain of `n` cells: a call head followed by
    /// pairlist argument cells.
    pub fn alloc_lang(&mut self, n: usize) -> Handle {
        if n == 0 {
            return Handle::NULL;
        }
        let tail = self.alloc_list(n - 1);
        self.heap.alloc(Node::new(
            Tag::Call,
            Payload::Cons {
                car: Handle::NULL,
                cdr: tail,
                tag: Handle::NULL,
            },
        ))
    }

    fn lang_from(&mut self, items: &[Handle]) -> EngineResult<Handle> {
        let call = self.alloc_lang(items.len());
        let mut cur = call;
        for &item in items {
            self.set_car(cur, item)?;
            cur = self.cdr(cur)?;
        }
        Ok(call)
    }

    /// Build a two-element call expression `op(arg)`.
    pub fn lang2(&mut self, op: Handle, arg: Handle) -> EngineResult<Handle> {
        self.lang_from(&[op, arg])
    }

    /// Build a three-element call expression `op(a, b)`.
    pub fn lang3(&mut self, op: Handle, a: Handle, b: Handle) -> EngineResult<Handle> {
        self.lang_from(&[op, a, b])
    }

    /// Build a four-element call expression `op(a, b, c)`.
    pub fn lang4(&mut self, op: Handle, a: Handle, b: Handle, c: Handle) -> EngineResult<Handle> {
        self.lang_from(&[op, a, b, c])
    }

    // --- cell chains -------------------------------------------------------

    fn cons_parts(&self, h: Handle) -> EngineResult<(Handle, Handle, Handle)> {
        match &self.node(h)?.payload {
            Payload::Cons { car, cdr, tag } => Ok((*car, *cdr, *tag)),
            _ => Err(EngineError::InvalidType { expected: "pairlist" }),
        }
    }

    /// First element of a cell.
    pub fn car(&self, h: Handle) -> EngineResult<Handle> {
        Ok(self.cons_parts(h)?.0)
    }

    /// Rest of a cell chain.
    pub fn cdr(&self, h: Handle) -> EngineResult<Handle> {
        Ok(self.cons_parts(h)?.1)
    }

    /// Name tag of a cell (a symbol, or null).
    pub fn tag_of(&self, h: Handle) -> EngineResult<Handle> {
        Ok(self.cons_parts(h)?.2)
    }

    /// Replace the first element of a cell.
    pub fn set_car(&mut self, h: Handle, v: Handle) -> EngineResult<()> {
        match &mut self.node_mut(h)?.payload {
            Payload::Cons { car, .. } => {
                *car = v;
                Ok(())
            }
            _ => Err(EngineError::InvalidType { expected: "pairlist" }),
        }
    }

    /// Replace the name tag of a cell.
    pub fn set_tag(&mut self, h: Handle, v: Handle) -> EngineResult<()> {
        match &mut self.node_mut(h)?.payload {
            Payload::Cons { tag, .. } => {
                *tag = v;
                Ok(())
            }
            _ => Err(EngineError::InvalidType { expected: "pairlist" }),
        }
    }

    // --- atomic vector access ----------------------------------------------

    /// Raw logical elements (missing values encoded as [`NA_INTEGER`]).
    pub fn logical_values(&self, h: Handle) -> EngineResult<Vec<i32>> {
        match &self.node(h)?.payload {
            Payload::Logical(v) => Ok(v.clone()),
            _ => Err(EngineError::InvalidType { expected: "logical vector" }),
        }
    }

    /// Raw integer elements (missing values encoded as [`NA_INTEGER`]).
    pub fn int_values(&self, h: Handle) -> EngineResult<Vec<i32>> {
        match &self.node(h)?.payload {
            Payload::Int(v) => Ok(v.clone()),
            _ => Err(EngineError::InvalidType { expected: "integer vector" }),
        }
    }

    /// Raw double elements.
    pub fn real_values(&self, h: Handle) -> EngineResult<Vec<f64>> {
        match &self.node(h)?.payload {
            Payload::Real(v) => Ok(v.clone()),
            _ => Err(EngineError::InvalidType { expected: "double vector" }),
        }
    }

    /// Raw complex elements as `(re, im)` pairs.
    pub fn cplx_values(&self, h: Handle) -> EngineResult<Vec<(f64, f64)>> {
        match &self.node(h)?.payload {
            Payload::Cplx(v) => Ok(v.clone()),
            _ => Err(EngineError::InvalidType { expected: "complex vector" }),
        }
    }

    /// Raw byte elements.
    pub fn raw_values(&self, h: Handle) -> EngineResult<Vec<u8>> {
        match &self.node(h)?.payload {
            Payload::Raw(v) => Ok(v.clone()),
            _ => Err(EngineError::InvalidType { expected: "raw vector" }),
        }
    }

    /// Replace the contents of a logical vector.
    pub fn fill_logical(&mut self, h: Handle, values: &[i32]) -> EngineResult<()> {
        match &mut self.node_mut(h)?.payload {
            Payload::Logical(v) => {
                *v = values.to_vec();
                Ok(())
            }
            _ => Err(EngineError::InvalidType { expected: "logical vector" }),
        }
    }

    /// Replace the contents of an integer vector.
    pub fn fill_int(&mut self, h: Handle, values: &[i32]) -> EngineResult<()> {
        match &mut self.node_mut(h)?.payload {
            Payload::Int(v) => {
                *v = values.to_vec();
                Ok(())
            }
            _ => Err(EngineError::InvalidType { expected: "integer vector" }),
        }
    }

    /// Replace the contents of a double vector.
    pub fn fill_real(&mut self, h: Handle, values: &[f64]) -> EngineResult<()> {
        match &mut self.node_mut(h)?.payload {
            Payload::Real(v) => {
                *v = values.to_vec();
                Ok(())
            }
            _ => Err(EngineError::InvalidType { expected: "double vector" }),
        }
    }

    /// Replace the contents of a complex vector.
    pub fn fill_cplx(&mut self, h: Handle, values: &[(f64, f64)]) -> EngineResult<()> {
        match &mut self.node_mut(h)?.payload {
            Payload::Cplx(v) => {
                *v = values.to_vec();
                Ok(())
            }
            _ => Err(EngineError::InvalidType { expected: "complex vector" }),
        }
    }

    /// Replace the contents of a raw vector.
    pub fn fill_raw(&mut self, h: Handle, values: &[u8]) -> EngineResult<()> {
        match &mut self.node_mut(h)?.payload {
            Payload::Raw(v) => {
                *v = values.to_vec();
                Ok(())
            }
            _ => Err(EngineError::InvalidType { expected: "raw vector" }),
        }
    }

    /// Replace the contents of a character vector, allocating a character
    /// cell per present element and the missing-string cell for `None`.
    pub fn fill_character(&mut self, h: Handle, values: &[Option<String>]) -> EngineResult<()> {
        let cells: Vec<Handle> = values
            .iter()
            .map(|v| match v {
                Some(s) => self.mk_char(s),
                None => self.globals.na_string,
            })
            .collect::<Vec<_>>();
        match &mut self.node_mut(h)?.payload {
            Payload::Str(v) => {
                *v = cells;
                Ok(())
            }
            _ => Err(EngineError::InvalidType { expected: "character vector" }),
        }
    }

    /// Character cell at `i` (zero-based).
    pub fn string_elt(&self, h: Handle, i: usize) -> EngineResult<Handle> {
        match &self.node(h)?.payload {
            Payload::Str(v) => v.get(i).copied().ok_or(EngineError::Eval(
                "subscript out of bounds".to_string(),
            )),
            _ => Err(EngineError::InvalidType { expected: "character vector" }),
        }
    }

    /// Store a character cell at `i` (zero-based).
    pub fn set_string_elt(&mut self, h: Handle, i: usize, cell: Handle) -> EngineResult<()> {
        match &mut self.node_mut(h)?.payload {
            Payload::Str(v) if i < v.len() => {
                v[i] = cell;
                Ok(())
            }
            Payload::Str(_) => Err(EngineError::Eval("subscript out of bounds".to_string())),
            _ => Err(EngineError::InvalidType { expected: "character vector" }),
        }
    }

    /// List element at `i` (zero-based).
    pub fn list_elt(&self, h: Handle, i: usize) -> EngineResult<Handle> {
        match &self.node(h)?.payload {
            Payload::List(v) => v.get(i).copied().ok_or(EngineError::Eval(
                "subscript out of bounds".to_string(),
            )),
            _ => Err(EngineError::InvalidType { expected: "list" }),
        }
    }

    /// Store a list element at `i` (zero-based).
    pub fn set_list_elt(&mut self, h: Handle, i: usize, v: Handle) -> EngineResult<()> {
        match &mut self.node_mut(h)?.payload {
            Payload::List(elements) if i < elements.len() => {
                elements[i] = v;
                Ok(())
            }
            Payload::List(_) => Err(EngineError::Eval("subscript out of bounds".to_string())),
            _ => Err(EngineError::InvalidType { expected: "list" }),
        }
    }

    // --- character cells and symbols ----------------------------------------

    /// Allocate a character cell. Character cells are never interned, so the
    /// caller must root intermediates.
    pub fn mk_char(&mut self, s: &str) -> Handle {
        self.heap
            .alloc(Node::new(Tag::String, Payload::Char(Some(s.to_string()))))
    }

    /// Translate a character cell to host text; `None` for the missing
    /// string.
    pub fn char_text(&self, h: Handle) -> EngineResult<Option<String>> {
        match &self.node(h)?.payload {
            Payload::Char(text) => Ok(text.clone()),
            _ => Err(EngineError::InvalidType { expected: "string" }),
        }
    }

    /// Intern a symbol by name. Symbols are permanent roots and are never
    /// collected, so interning volatile generated names leaks.
    pub fn install(&mut self, name: &str) -> Handle {
        let unbound = self.globals.unbound;
        intern(&mut self.heap, &mut self.symbols, name, unbound)
    }

    /// Print name of a symbol; empty for the unbound sentinel.
    pub fn symbol_name(&self, sym: Handle) -> EngineResult<String> {
        match &self.node(sym)?.payload {
            Payload::Symbol { printname, .. } => {
                Ok(self.char_text(*printname)?.unwrap_or_default())
            }
            Payload::Unbound => Ok(String::new()),
            _ => Err(EngineError::InvalidType { expected: "symbol" }),
        }
    }

    /// Print-name character cell of a symbol.
    pub fn symbol_printname(&self, sym: Handle) -> EngineResult<Handle> {
        match &self.node(sym)?.payload {
            Payload::Symbol { printname, .. } => Ok(*printname),
            _ => Err(EngineError::InvalidType { expected: "symbol" }),
        }
    }

    /// Bound value of a symbol (the unbound sentinel when none).
    pub fn symbol_value(&self, sym: Handle) -> EngineResult<Handle> {
        match &self.node(sym)?.payload {
            Payload::Symbol { value, .. } => Ok(*value),
            Payload::Unbound => Ok(self.globals.unbound),
            _ => Err(EngineError::InvalidType { expected: "symbol" }),
        }
    }

    // --- attributes ----------------------------------------------------------

    /// The attribute pairlist of `h` (null when none).
    pub fn attributes(&self, h: Handle) -> EngineResult<Handle> {
        Ok(self.node(h)?.attrib)
    }

    /// Attribute value keyed by the interned symbol `sym` (null when absent).
    pub fn get_attrib(&self, h: Handle, sym: Handle) -> EngineResult<Handle> {
        let mut cur = self.node(h)?.attrib;
        while cur != Handle::NULL {
            let (car, cdr, tag) = self.cons_parts(cur)?;
            if tag == sym {
                return Ok(car);
            }
            cur = cdr;
        }
        Ok(Handle::NULL)
    }

    /// Set, replace or (with a null value) remove an attribute.
    pub fn set_attrib(&mut self, h: Handle, sym: Handle, value: Handle) -> EngineResult<()> {
        let mut pairs: Vec<(Handle, Handle)> = Vec::new();
        let mut cur = self.node(h)?.attrib;
        while cur != Handle::NULL {
            let (car, cdr, tag) = self.cons_parts(cur)?;
            pairs.push((tag, car));
            cur = cdr;
        }

        if let Some(entry) = pairs.iter_mut().find(|(tag, _)| *tag == sym) {
            entry.1 = value;
        } else if value != Handle::NULL {
            pairs.push((sym, value));
        }
        pairs.retain(|&(tag, car)| !(tag == sym && car == Handle::NULL) || value != Handle::NULL);
        if value == Handle::NULL {
            pairs.retain(|&(tag, _)| tag != sym);
        }

        let mut chain = Handle::NULL;
        for &(tag, car) in pairs.iter().rev() {
            chain = self.heap.alloc(Node::new(
                Tag::Pairlist,
                Payload::Cons {
                    car,
                    cdr: chain,
                    tag,
                },
            ));
        }
        self.node_mut(h)?.attrib = chain;
        Ok(())
    }

    /// Copy every attribute of `src` onto `dst`.
    pub(crate) fn copy_attributes(&mut self, src: Handle, dst: Handle) -> EngineResult<()> {
        let mut pairs: Vec<(Handle, Handle)> = Vec::new();
        let mut cur = self.node(src)?.attrib;
        while cur != Handle::NULL {
            let (car, cdr, tag) = self.cons_parts(cur)?;
            pairs.push((tag, car));
            cur = cdr;
        }
        for (tag, car) in pairs {
            self.set_attrib(dst, tag, car)?;
        }
        Ok(())
    }

    // --- environments ----------------------------------------------------------

    /// Allocate a fresh environment with the given parent.
    pub fn new_env(&mut self, parent: Handle) -> Handle {
        self.heap.alloc(Node::new(
            Tag::Environment,
            Payload::Env {
                parent,
                frame: Vec::new(),
            },
        ))
    }

    /// Bind `sym` to `value` in `env`, replacing any existing binding.
    pub fn env_poke(&mut self, env: Handle, sym: Handle, value: Handle) -> EngineResult<()> {
        match &mut self.node_mut(env)?.payload {
            Payload::Env { frame, .. } => {
                if let Some(entry) = frame.iter_mut().find(|(s, _)| *s == sym) {
                    entry.1 = value;
                } else {
                    frame.push((sym, value));
                }
                Ok(())
            }
            _ => Err(EngineError::InvalidType { expected: "environment" }),
        }
    }

    /// Look `sym` up in `env` only (no parent search).
    pub fn env_get_local(&self, env: Handle, sym: Handle) -> EngineResult<Option<Handle>> {
        match &self.node(env)?.payload {
            Payload::Env { frame, .. } => {
                Ok(frame.iter().find(|(s, _)| *s == sym).map(|&(_, v)| v))
            }
            _ => Err(EngineError::InvalidType { expected: "environment" }),
        }
    }

    /// Look `sym` up through the parent chain.
    pub fn env_lookup(&self, env: Handle, sym: Handle) -> EngineResult<Option<Handle>> {
        let mut cur = env;
        while cur != Handle::NULL {
            if let Some(v) = self.env_get_local(cur, sym)? {
                return Ok(Some(v));
            }
            cur = match &self.node(cur)?.payload {
                Payload::Env { parent, .. } => *parent,
                _ => return Err(EngineError::InvalidType { expected: "environment" }),
            };
        }
        Ok(None)
    }

    /// Binding names of `env`, optionally including dot-names and sorted.
    pub fn env_ls(&self, env: Handle, all: bool, sorted: bool) -> EngineResult<Vec<String>> {
        let frame = match &self.node(env)?.payload {
            Payload::Env { frame, .. } => frame.clone(),
            _ => return Err(EngineError::InvalidType { expected: "environment" }),
        };
        let mut names: Vec<String> = Vec::with_capacity(frame.len());
        for (sym, _) in frame {
            let name = self.symbol_name(sym)?;
            if all || !name.starts_with('.') {
                names.push(name);
            }
        }
        if sorted {
            names.sort();
        }
        Ok(names)
    }

    // --- long-lived preservation -------------------------------------------------

    /// Add `h` to the precious list. Repeated calls stack: each `preserve`
    /// needs a matching [`release`](Self::release).
    pub fn preserve(&mut self, h: Handle) {
        self.precious.push(h);
    }

    /// Remove one precious-list entry for `h`.
    pub fn release(&mut self, h: Handle) -> EngineResult<()> {
        match self.precious.iter().rposition(|&p| p == h) {
            Some(pos) => {
                self.precious.remove(pos);
                Ok(())
            }
            None => Err(EngineError::NotPreserved),
        }
    }

    /// Number of entries on the precious list.
    pub fn preserved_count(&self) -> usize {
        self.precious.len()
    }

    // --- protection stack ----------------------------------------------------------

    /// Root `h` at the top of the protection stack, returning it unchanged.
    pub fn protect(&mut self, h: Handle) -> Handle {
        self.protect.protect(h);
        h
    }

    /// Root `h` and return its stable slot index.
    pub fn protect_with_index(&mut self, h: Handle) -> ProtectIndex {
        self.protect.protect(h)
    }

    /// Swap the occupant of `idx` for `h` without changing the stack shape.
    pub fn reprotect(&mut self, h: Handle, idx: ProtectIndex) -> EngineResult<()> {
        self.protect.reprotect(h, idx)
    }

    /// Pop the top `n` protection entries.
    pub fn unprotect(&mut self, n: usize) -> EngineResult<()> {
        self.protect.unprotect(n)
    }

    /// Release the slot `idx`, wherever it sits in the stack.
    pub fn unprotect_index(&mut self, idx: ProtectIndex) -> EngineResult<()> {
        self.protect.release_index(idx)
    }

    /// Current protection stack depth.
    pub fn protect_depth(&self) -> usize {
        self.protect.depth()
    }

    // --- collection ----------------------------------------------------------------

    /// Run a mark-sweep collection and return the number of freed objects.
    pub fn collect(&mut self) -> usize {
        let mut roots: Vec<Handle> = vec![
            self.globals.r_true,
            self.globals.r_false,
            self.globals.na_logical,
            self.globals.na_string,
            self.globals.unbound,
            self.globals.empty_env,
            self.globals.base_env,
            self.globals.global_env,
        ];
        roots.extend(self.symbols.values().copied());
        roots.extend(self.protect.roots());
        roots.extend(self.precious.iter().copied());

        let freed = gc::collect(&mut self.heap, &roots);
        self.stats.collections += 1;
        self.stats.objects_freed += freed;
        self.stats.last_freed = freed;
        self.stats.live_after = self.heap.live_count();
        self.stats.heap_slots = self.heap.slot_count();
        freed
    }

    /// Whether the heap slot behind `h` is currently occupied. Mostly a
    /// test hook: a reclaimed slot may be reused by later allocation.
    pub fn is_live(&self, h: Handle) -> bool {
        self.heap.is_live(h)
    }

    /// Collector statistics.
    pub fn gc_stats(&self) -> GcStats {
        self.stats
    }
}
