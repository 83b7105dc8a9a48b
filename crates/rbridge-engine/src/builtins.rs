//! Evaluation of synthesized call expressions.
//!
//! The bridge never parses source text; it builds call expressions cell by
//! cell and hands them to [`Engine::eval`]. The callable surface is therefore
//! a closed builtin table. `quote` and `$` are special forms: `quote` returns
//! its argument unevaluated and `$` leaves its selector unevaluated.

use crate::engine::Engine;
use crate::handle::Handle;
use crate::heap::{is_na_real, na_real, Payload, NA_INTEGER};
use crate::tag::Tag;
use crate::{EngineError, EngineResult};

/// The closed builtin table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Builtin {
    Concat,
    IsNa,
    Class,
    Subset,
    Element,
    Member,
    ElementAssign,
    AsDataFrame,
    Quote,
    Deparse1,
}

impl Builtin {
    /// Name-to-builtin bindings installed into the base environment.
    pub const TABLE: &'static [(&'static str, Builtin)] = &[
        ("c", Builtin::Concat),
        ("is.na", Builtin::IsNa),
        ("class", Builtin::Class),
        ("[", Builtin::Subset),
        ("[[", Builtin::Element),
        ("$", Builtin::Member),
        ("[[<-", Builtin::ElementAssign),
        ("as.data.frame", Builtin::AsDataFrame),
        ("quote", Builtin::Quote),
        ("deparse1", Builtin::Deparse1),
    ];
}

/// A single atomic element, decoded out of its vector representation.
#[derive(Debug, Clone)]
enum Atom {
    Na,
    Log(bool),
    Int(i32),
    Real(f64),
    Cplx(f64, f64),
    Str(String),
    Byte(u8),
}

/// Coercion rank: `raw < logical < integer < double < complex < character`,
/// with generic lists above everything.
fn tag_rank(tag: Tag) -> Option<u8> {
    match tag {
        Tag::Raw => Some(0),
        Tag::Logical => Some(1),
        Tag::Integer => Some(2),
        Tag::Double => Some(3),
        Tag::Complex => Some(4),
        Tag::Character => Some(5),
        _ => None,
    }
}

fn rank_tag(rank: u8) -> Tag {
    match rank {
        0 => Tag::Raw,
        1 => Tag::Logical,
        2 => Tag::Integer,
        3 => Tag::Double,
        4 => Tag::Complex,
        _ => Tag::Character,
    }
}

fn format_real(x: f64) -> String {
    if x.is_nan() {
        "NaN".to_string()
    } else if x.is_infinite() {
        if x > 0.0 { "Inf".to_string() } else { "-Inf".to_string() }
    } else if x == x.trunc() && x.abs() < 1e15 {
        format!("{}", x as i64)
    } else {
        format!("{}", x)
    }
}

fn format_cplx(re: f64, im: f64) -> String {
    if im < 0.0 || (im == 0.0 && im.is_sign_negative()) {
        format!("{}-{}i", format_real(re), format_real(-im))
    } else {
        format!("{}+{}i", format_real(re), format_real(im))
    }
}

fn quote_string(s: &str) -> String {
    format!("\"{}\"", s.replace('\\', "\\\\").replace('"', "\\\""))
}

impl Atom {
    fn to_logical(&self) -> EngineResult<i32> {
        match self {
            Atom::Na => Ok(NA_INTEGER),
            Atom::Log(b) => Ok(*b as i32),
            Atom::Byte(b) => Ok((*b != 0) as i32),
            _ => Err(EngineError::InvalidType { expected: "logical-coercible element" }),
        }
    }

    fn to_int(&self) -> EngineResult<i32> {
        match self {
            Atom::Na => Ok(NA_INTEGER),
            Atom::Log(b) => Ok(*b as i32),
            Atom::Int(x) => Ok(*x),
            Atom::Byte(b) => Ok(*b as i32),
            _ => Err(EngineError::InvalidType { expected: "integer-coercible element" }),
        }
    }

    fn to_real(&self) -> EngineResult<f64> {
        match self {
            Atom::Na => Ok(na_real()),
            Atom::Log(b) => Ok(*b as i32 as f64),
            Atom::Int(x) => Ok(*x as f64),
            Atom::Real(x) => Ok(*x),
            Atom::Byte(b) => Ok(*b as f64),
            _ => Err(EngineError::InvalidType { expected: "double-coercible element" }),
        }
    }

    fn to_cplx(&self) -> EngineResult<(f64, f64)> {
        match self {
            Atom::Na => Ok((na_real(), na_real())),
            Atom::Cplx(re, im) => Ok((*re, *im)),
            other => Ok((other.to_real()?, 0.0)),
        }
    }

    fn to_text(&self) -> Option<String> {
        match self {
            Atom::Na => None,
            Atom::Log(b) => Some(if *b { "TRUE" } else { "FALSE" }.to_string()),
            Atom::Int(x) => Some(x.to_string()),
            Atom::Real(x) => Some(format_real(*x)),
            Atom::Cplx(re, im) => Some(format_cplx(*re, *im)),
            Atom::Str(s) => Some(s.clone()),
            Atom::Byte(b) => Some(format!("{:02x}", b)),
        }
    }

    fn is_na(&self) -> bool {
        matches!(self, Atom::Na)
    }
}

/// An index argument: 1-based positions or element names.
enum IndexArg {
    Positions(Vec<i32>),
    Names(Vec<Option<String>>),
}

impl Engine {
    /// Evaluate `expr` in `env`. Symbols are looked up through the parent
    /// chain; calls dispatch into the builtin table; everything else is
    /// self-evaluating.
    pub fn eval(&mut self, expr: Handle, env: Handle) -> EngineResult<Handle> {
        match self.type_of(expr)? {
            Tag::Symbol => {
                match self.env_lookup(env, expr)? {
                    Some(v) => Ok(v),
                    None => {
                        let name = self.symbol_name(expr)?;
                        Err(EngineError::Eval(format!("object '{}' not found", name)))
                    }
                }
            }
            Tag::Call => self.eval_call(expr, env),
            _ => Ok(expr),
        }
    }

    fn eval_call(&mut self, call: Handle, env: Handle) -> EngineResult<Handle> {
        let op_expr = self.car(call)?;
        let op = self.eval(op_expr, env)?;
        let builtin = match &self.node(op)?.payload {
            Payload::Builtin(b) => *b,
            _ => return Err(EngineError::Eval("attempt to apply non-function".to_string())),
        };

        let mut raw_args: Vec<(Option<String>, Handle)> = Vec::new();
        let mut cur = self.cdr(call)?;
        while self.type_of(cur)? != Tag::Null {
            let tag = self.tag_of(cur)?;
            let name = if tag == Handle::NULL {
                None
            } else {
                Some(self.symbol_name(tag)?)
            };
            raw_args.push((name, self.car(cur)?));
            cur = self.cdr(cur)?;
        }

        match builtin {
            Builtin::Quote => {
                return raw_args
                    .first()
                    .map(|&(_, h)| h)
                    .ok_or_else(|| EngineError::Eval("argument to quote is missing".to_string()));
            }
            Builtin::Member => {
                let &(_, x_expr) = raw_args
                    .first()
                    .ok_or_else(|| EngineError::Eval("$ requires an object".to_string()))?;
                let &(_, sel) = raw_args
                    .get(1)
                    .ok_or_else(|| EngineError::Eval("$ requires a selector".to_string()))?;
                let x = self.eval(x_expr, env)?;
                let name = self.selector_name(sel)?;
                return self.member(x, &name);
            }
            _ => {}
        }

        let mut args: Vec<(Option<String>, Handle)> = Vec::with_capacity(raw_args.len());
        for (name, expr) in raw_args {
            args.push((name, self.eval(expr, env)?));
        }

        match builtin {
            Builtin::Concat => self.concat(&args),
            Builtin::IsNa => {
                let x = first_arg(&args, "is.na")?;
                self.is_na_mask(x)
            }
            Builtin::Class => {
                let x = first_arg(&args, "class")?;
                self.class_of(x)
            }
            Builtin::Subset => {
                let x = first_arg(&args, "[")?;
                let idx = second_arg(&args, "[")?;
                self.subset(x, idx)
            }
            Builtin::Element => {
                let x = first_arg(&args, "[[")?;
                let idx = second_arg(&args, "[[")?;
                self.element(x, idx)
            }
            Builtin::ElementAssign => {
                let x = first_arg(&args, "[[<-")?;
                let idx = second_arg(&args, "[[<-")?;
                let value = args
                    .get(2)
                    .map(|&(_, h)| h)
                    .ok_or_else(|| EngineError::Eval("[[<- requires a value".to_string()))?;
                self.element_assign(x, idx, value)
            }
            Builtin::AsDataFrame => {
                let x = first_arg(&args, "as.data.frame")?;
                self.as_data_frame(x)
            }
            Builtin::Deparse1 => {
                let x = first_arg(&args, "deparse1")?;
                let text = self.deparse(x)?;
                Ok(self.alloc_char_vec(&[Some(text)]))
            }
            Builtin::Quote | Builtin::Member => unreachable!("handled before evaluation"),
        }
    }

    /// Resolve a `$` selector: a symbol or a length-one string.
    fn selector_name(&self, sel: Handle) -> EngineResult<String> {
        match self.type_of(sel)? {
            Tag::Symbol => self.symbol_name(sel),
            Tag::Character => {
                let texts = self.char_vec(sel)?;
                match texts.as_slice() {
                    [Some(name)] => Ok(name.clone()),
                    _ => Err(EngineError::Eval("invalid selector".to_string())),
                }
            }
            _ => Err(EngineError::Eval("invalid selector".to_string())),
        }
    }

    // --- shared decoding helpers -------------------------------------------

    /// Translate every cell of a character vector.
    pub fn char_vec(&self, h: Handle) -> EngineResult<Vec<Option<String>>> {
        let cells = match &self.node(h)?.payload {
            Payload::Str(cells) => cells.clone(),
            _ => return Err(EngineError::InvalidType { expected: "character vector" }),
        };
        cells.iter().map(|&c| self.char_text(c)).collect()
    }

    /// Names attribute of `h`, translated to host text.
    fn names_of(&self, h: Handle) -> EngineResult<Option<Vec<Option<String>>>> {
        let names = self.get_attrib(h, self.globals().sym_names)?;
        if names == Handle::NULL {
            return Ok(None);
        }
        Ok(Some(self.char_vec(names)?))
    }

    fn alloc_char_vec(&mut self, values: &[Option<String>]) -> Handle {
        let na = self.globals().na_string;
        let cells: Vec<Handle> = values
            .iter()
            .map(|v| match v {
                Some(s) => self.mk_char(s),
                None => na,
            })
            .collect();
        self.alloc_node(Tag::Character, Payload::Str(cells))
    }

    fn set_names_attr(&mut self, h: Handle, names: &[Option<String>]) -> EngineResult<()> {
        let vec = self.alloc_char_vec(names);
        let sym = self.globals().sym_names;
        self.set_attrib(h, sym, vec)
    }

    /// Decode an atomic vector into per-element atoms, mapping each kind's
    /// missing-value encoding to [`Atom::Na`].
    fn atoms(&self, h: Handle) -> EngineResult<Vec<Atom>> {
        match &self.node(h)?.payload {
            Payload::Logical(v) => Ok(v
                .iter()
                .map(|&x| if x == NA_INTEGER { Atom::Na } else { Atom::Log(x != 0) })
                .collect()),
            Payload::Int(v) => Ok(v
                .iter()
                .map(|&x| if x == NA_INTEGER { Atom::Na } else { Atom::Int(x) })
                .collect()),
            Payload::Real(v) => Ok(v
                .iter()
                .map(|&x| if is_na_real(x) { Atom::Na } else { Atom::Real(x) })
                .collect()),
            Payload::Cplx(v) => Ok(v
                .iter()
                .map(|&(re, im)| {
                    if is_na_real(re) || is_na_real(im) {
                        Atom::Na
                    } else {
                        Atom::Cplx(re, im)
                    }
                })
                .collect()),
            Payload::Raw(v) => Ok(v.iter().map(|&b| Atom::Byte(b)).collect()),
            Payload::Str(_) => Ok(self
                .char_vec(h)?
                .into_iter()
                .map(|t| match t {
                    Some(s) => Atom::Str(s),
                    None => Atom::Na,
                })
                .collect()),
            _ => Err(EngineError::InvalidType { expected: "atomic vector" }),
        }
    }

    /// Build an atomic vector of `tag`, coercing each atom upward.
    fn vector_from_atoms(&mut self, tag: Tag, atoms: &[Atom]) -> EngineResult<Handle> {
        let payload = match tag {
            Tag::Raw => Payload::Raw(
                atoms
                    .iter()
                    .map(|a| match a {
                        Atom::Byte(b) => Ok(*b),
                        // A raw vector has no missing encoding; zero-fill.
                        Atom::Na => Ok(0),
                        _ => Err(EngineError::InvalidType { expected: "raw element" }),
                    })
                    .collect::<EngineResult<Vec<u8>>>()?,
            ),
            Tag::Logical => Payload::Logical(
                atoms.iter().map(Atom::to_logical).collect::<EngineResult<Vec<i32>>>()?,
            ),
            Tag::Integer => Payload::Int(
                atoms.iter().map(Atom::to_int).collect::<EngineResult<Vec<i32>>>()?,
            ),
            Tag::Double => Payload::Real(
                atoms.iter().map(Atom::to_real).collect::<EngineResult<Vec<f64>>>()?,
            ),
            Tag::Complex => Payload::Cplx(
                atoms.iter().map(Atom::to_cplx).collect::<EngineResult<Vec<(f64, f64)>>>()?,
            ),
            Tag::Character => {
                let texts: Vec<Option<String>> = atoms.iter().map(Atom::to_text).collect();
                return Ok(self.alloc_char_vec(&texts));
            }
            _ => return Err(EngineError::InvalidType { expected: "atomic kind" }),
        };
        Ok(self.alloc_node(tag, payload))
    }

    fn index_arg(&self, idx: Handle) -> EngineResult<IndexArg> {
        match self.type_of(idx)? {
            Tag::Integer | Tag::Logical => Ok(IndexArg::Positions(self.atoms(idx)?
                .iter()
                .map(Atom::to_int)
                .collect::<EngineResult<Vec<i32>>>()?)),
            Tag::Double => Ok(IndexArg::Positions(
                self.real_values(idx)?.iter().map(|&x| x as i32).collect(),
            )),
            Tag::Character => Ok(IndexArg::Names(self.char_vec(idx)?)),
            _ => Err(EngineError::Eval("invalid subscript type".to_string())),
        }
    }

    fn pairlist_cells(&self, h: Handle) -> EngineResult<Vec<(Handle, Handle)>> {
        let mut cells = Vec::new();
        let mut cur = h;
        while self.type_of(cur)? != Tag::Null {
            cells.push((self.tag_of(cur)?, self.car(cur)?));
            cur = self.cdr(cur)?;
        }
        Ok(cells)
    }

    // --- c(...) -------------------------------------------------------------

    fn concat(&mut self, args: &[(Option<String>, Handle)]) -> EngineResult<Handle> {
        let mut target: Option<u8> = None;
        let mut any_list = false;
        for &(_, h) in args {
            let tag = self.type_of(h)?;
            if tag == Tag::Null {
                continue;
            }
            match tag_rank(tag) {
                Some(rank) => {
                    target = Some(target.map_or(rank, |t| t.max(rank)));
                }
                None => any_list = true,
            }
        }

        if any_list {
            return self.concat_as_list(args);
        }
        let target = match target {
            Some(rank) => rank_tag(rank),
            // c() with no (or only null) arguments.
            None => return Ok(Handle::NULL),
        };

        let mut atoms: Vec<Atom> = Vec::new();
        for &(_, h) in args {
            if self.type_of(h)? == Tag::Null {
                continue;
            }
            atoms.extend(self.atoms(h)?);
        }
        self.vector_from_atoms(target, &atoms)
    }

    /// List-target concatenation: lists splice, atomic vectors split into
    /// length-one elements of their own kind, other objects pass through.
    fn concat_as_list(&mut self, args: &[(Option<String>, Handle)]) -> EngineResult<Handle> {
        let mut elements: Vec<Handle> = Vec::new();
        for &(_, h) in args {
            let tag = self.type_of(h)?;
            match tag {
                Tag::Null => {}
                Tag::List => elements.extend(match &self.node(h)?.payload {
                    Payload::List(v) => v.clone(),
                    _ => Vec::new(),
                }),
                t if t.is_atomic() => {
                    let atoms = self.atoms(h)?;
                    for atom in &atoms {
                        let scalar = self.vector_from_atoms(t, std::slice::from_ref(atom))?;
                        elements.push(scalar);
                    }
                }
                _ => elements.push(h),
            }
        }
        Ok(self.alloc_node(Tag::List, Payload::List(elements)))
    }

    // --- is.na ----------------------------------------------------------------

    fn is_na_mask(&mut self, x: Handle) -> EngineResult<Handle> {
        let tag = self.type_of(x)?;
        let mask: Vec<i32> = if tag == Tag::Null {
            Vec::new()
        } else if tag.is_atomic() {
            self.atoms(x)?.iter().map(|a| a.is_na() as i32).collect()
        } else if tag == Tag::List {
            let n = self.length(x)?;
            let mut mask = Vec::with_capacity(n);
            for i in 0..n {
                let elt = self.list_elt(x, i)?;
                let elt_tag = self.type_of(elt)?;
                let missing = elt_tag.is_atomic()
                    && self.length(elt)? == 1
                    && self.atoms(elt)?[0].is_na();
                mask.push(missing as i32);
            }
            mask
        } else {
            vec![0]
        };
        Ok(self.alloc_node(Tag::Logical, Payload::Logical(mask)))
    }

    // --- class ------------------------------------------------------------------

    fn class_of(&mut self, x: Handle) -> EngineResult<Handle> {
        let explicit = self.get_attrib(x, self.globals().sym_class)?;
        if explicit != Handle::NULL {
            return Ok(explicit);
        }
        let tag = self.type_of(x)?;
        let name = match tag {
            Tag::Null => "NULL",
            Tag::Double => "numeric",
            Tag::Symbol => "name",
            Tag::Closure | Tag::Builtin | Tag::Special => "function",
            Tag::String => "character",
            t => t.name(),
        };
        Ok(self.alloc_char_vec(&[Some(name.to_string())]))
    }

    // --- `[` subset ----------------------------------------------------------------

    fn subset(&mut self, x: Handle, idx: Handle) -> EngineResult<Handle> {
        let tag = self.type_of(x)?;
        if tag != Tag::List && !tag.is_atomic() {
            return Err(EngineError::Eval(format!(
                "object of type '{}' is not subsettable with [",
                tag
            )));
        }
        let len = self.length(x)?;
        let names = self.names_of(x)?;

        let selected: Vec<Option<usize>> = match self.index_arg(idx)? {
            IndexArg::Positions(positions) => {
                if positions.iter().any(|&p| p < 0) {
                    return Err(EngineError::Eval(
                        "negative subscripts are not supported".to_string(),
                    ));
                }
                positions
                    .iter()
                    .map(|&p| {
                        if p >= 1 && (p as usize) <= len {
                            Some(p as usize - 1)
                        } else {
                            None
                        }
                    })
                    .collect()
            }
            IndexArg::Names(lookups) => lookups
                .iter()
                .map(|lookup| match (lookup, &names) {
                    (Some(name), Some(names)) => names
                        .iter()
                        .position(|n| n.as_deref() == Some(name.as_str())),
                    _ => None,
                })
                .collect(),
        };

        let result = if tag == Tag::List {
            let mut elements = Vec::with_capacity(selected.len());
            for sel in &selected {
                elements.push(match sel {
                    Some(i) => self.list_elt(x, *i)?,
                    None => Handle::NULL,
                });
            }
            self.alloc_node(Tag::List, Payload::List(elements))
        } else {
            let atoms = self.atoms(x)?;
            let picked: Vec<Atom> = selected
                .iter()
                .map(|sel| match sel {
                    Some(i) => atoms[*i].clone(),
                    None => Atom::Na,
                })
                .collect();
            self.vector_from_atoms(tag, &picked)?
        };

        if let Some(names) = names {
            let picked: Vec<Option<String>> = selected
                .iter()
                .map(|sel| sel.and_then(|i| names[i].clone()))
                .collect();
            self.set_names_attr(result, &picked)?;
        }
        Ok(result)
    }

    // --- `[[` element access ----------------------------------------------------------

    fn element(&mut self, x: Handle, idx: Handle) -> EngineResult<Handle> {
        let tag = self.type_of(x)?;
        let index = self.index_arg(idx)?;

        match tag {
            Tag::Null => match index {
                IndexArg::Names(_) => Ok(Handle::NULL),
                IndexArg::Positions(_) => {
                    Err(EngineError::Eval("subscript out of bounds".to_string()))
                }
            },
            Tag::Environment => match index {
                IndexArg::Names(lookups) => {
                    let name = single_name(&lookups)?;
                    let sym = self.install(&name);
                    Ok(self.env_get_local(x, sym)?.unwrap_or(Handle::NULL))
                }
                IndexArg::Positions(_) => Err(EngineError::Eval(
                    "wrong arguments for subsetting an environment".to_string(),
                )),
            },
            Tag::List => {
                let len = self.length(x)?;
                match index {
                    IndexArg::Positions(positions) => {
                        let i = single_position(&positions, len)?;
                        self.list_elt(x, i)
                    }
                    IndexArg::Names(lookups) => {
                        let name = single_name(&lookups)?;
                        match self.position_of_name(x, &name)? {
                            Some(i) => self.list_elt(x, i),
                            None => Ok(Handle::NULL),
                        }
                    }
                }
            }
            Tag::Pairlist => {
                let cells = self.pairlist_cells(x)?;
                match index {
                    IndexArg::Positions(positions) => {
                        let i = single_position(&positions, cells.len())?;
                        Ok(cells[i].1)
                    }
                    IndexArg::Names(lookups) => {
                        let name = single_name(&lookups)?;
                        for (cell_tag, car) in cells {
                            if cell_tag != Handle::NULL && self.symbol_name(cell_tag)? == name {
                                return Ok(car);
                            }
                        }
                        Ok(Handle::NULL)
                    }
                }
            }
            t if t.is_atomic() => {
                let atoms = self.atoms(x)?;
                let i = match index {
                    IndexArg::Positions(positions) => single_position(&positions, atoms.len())?,
                    IndexArg::Names(lookups) => {
                        let name = single_name(&lookups)?;
                        self.position_of_name(x, &name)?.ok_or_else(|| {
                            EngineError::Eval("subscript out of bounds".to_string())
                        })?
                    }
                };
                // Element access drops names.
                self.vector_from_atoms(t, std::slice::from_ref(&atoms[i]))
            }
            t => Err(EngineError::Eval(format!(
                "object of type '{}' is not subsettable with [[",
                t
            ))),
        }
    }

    fn position_of_name(&self, x: Handle, name: &str) -> EngineResult<Option<usize>> {
        Ok(self.names_of(x)?.and_then(|names| {
            names.iter().position(|n| n.as_deref() == Some(name))
        }))
    }

    // --- `$` member access -------------------------------------------------------------

    fn member(&mut self, x: Handle, name: &str) -> EngineResult<Handle> {
        let tag = self.type_of(x)?;
        match tag {
            Tag::Null => Ok(Handle::NULL),
            Tag::List => match self.position_of_name(x, name)? {
                Some(i) => self.list_elt(x, i),
                None => Ok(Handle::NULL),
            },
            Tag::Pairlist => {
                for (cell_tag, car) in self.pairlist_cells(x)? {
                    if cell_tag != Handle::NULL && self.symbol_name(cell_tag)? == name {
                        return Ok(car);
                    }
                }
                Ok(Handle::NULL)
            }
            Tag::Environment => {
                let sym = self.install(name);
                Ok(self.env_get_local(x, sym)?.unwrap_or(Handle::NULL))
            }
            t if t.is_atomic() => Err(EngineError::Eval(
                "$ operator is invalid for atomic vectors".to_string(),
            )),
            t => Err(EngineError::Eval(format!(
                "$ operator is not applicable to type '{}'",
                t
            ))),
        }
    }

    // --- `[[<-` element assignment -------------------------------------------------------

    fn element_assign(&mut self, x: Handle, idx: Handle, value: Handle) -> EngineResult<Handle> {
        let tag = self.type_of(x)?;
        match tag {
            Tag::Null | Tag::List => self.list_assign(x, idx, value),
            Tag::Environment => {
                let name = match self.index_arg(idx)? {
                    IndexArg::Names(lookups) => single_name(&lookups)?,
                    IndexArg::Positions(_) => {
                        return Err(EngineError::Eval(
                            "wrong arguments for subsetting an environment".to_string(),
                        ))
                    }
                };
                let sym = self.install(&name);
                self.env_poke(x, sym, value)?;
                Ok(x)
            }
            t if t.is_atomic() => self.atomic_assign(x, idx, value),
            t => Err(EngineError::Eval(format!(
                "object of type '{}' is not subsettable with [[<-",
                t
            ))),
        }
    }

    fn list_assign(&mut self, x: Handle, idx: Handle, value: Handle) -> EngineResult<Handle> {
        let is_null_source = self.type_of(x)? == Tag::Null;
        let mut elements: Vec<Handle> = if is_null_source {
            Vec::new()
        } else {
            match &self.node(x)?.payload {
                Payload::List(v) => v.clone(),
                _ => return Err(EngineError::InvalidType { expected: "list" }),
            }
        };
        let mut names: Option<Vec<Option<String>>> = if is_null_source {
            None
        } else {
            self.names_of(x)?
        };
        let deleting = self.type_of(value)? == Tag::Null;

        match self.index_arg(idx)? {
            IndexArg::Positions(positions) => {
                let p = single_raw_position(&positions)?;
                if p <= elements.len() {
                    if deleting {
                        elements.remove(p - 1);
                        if let Some(names) = &mut names {
                            names.remove(p - 1);
                        }
                    } else {
                        elements[p - 1] = value;
                    }
                } else if !deleting {
                    // Writing past the end extends with nulls.
                    elements.resize(p, Handle::NULL);
                    elements[p - 1] = value;
                    if let Some(names) = &mut names {
                        names.resize(p, Some(String::new()));
                    }
                }
            }
            IndexArg::Names(lookups) => {
                let name = single_name(&lookups)?;
                let existing = names.as_ref().and_then(|names| {
                    names.iter().position(|n| n.as_deref() == Some(name.as_str()))
                });
                match existing {
                    Some(i) if deleting => {
                        elements.remove(i);
                        if let Some(names) = &mut names {
                            names.remove(i);
                        }
                    }
                    Some(i) => elements[i] = value,
                    None if deleting => {}
                    None => {
                        elements.push(value);
                        let mut name_list =
                            names.unwrap_or_else(|| vec![Some(String::new()); elements.len() - 1]);
                        name_list.push(Some(name));
                        names = Some(name_list);
                    }
                }
            }
        }

        let result = self.alloc_node(Tag::List, Payload::List(elements));
        if !is_null_source {
            self.copy_attributes(x, result)?;
        }
        let sym = self.globals().sym_names;
        match names {
            Some(names) if !names.is_empty() => self.set_names_attr(result, &names)?,
            _ => self.set_attrib(result, sym, Handle::NULL)?,
        }
        Ok(result)
    }

    fn atomic_assign(&mut self, x: Handle, idx: Handle, value: Handle) -> EngineResult<Handle> {
        let x_tag = self.type_of(x)?;
        let value_tag = self.type_of(value)?;
        if !value_tag.is_atomic() || self.length(value)? != 1 {
            return Err(EngineError::Eval(
                "replacement value must be a length-one atomic vector".to_string(),
            ));
        }

        // The vector is promoted when the replacement kind is wider.
        let target = rank_tag(
            tag_rank(x_tag)
                .unwrap_or(5)
                .max(tag_rank(value_tag).unwrap_or(5)),
        );
        let mut atoms = self.atoms(x)?;
        let new_atom = self.atoms(value)?.remove(0);
        let mut names = self.names_of(x)?;

        match self.index_arg(idx)? {
            IndexArg::Positions(positions) => {
                let p = single_raw_position(&positions)?;
                if p > atoms.len() {
                    atoms.resize(p, Atom::Na);
                    if let Some(names) = &mut names {
                        names.resize(p, Some(String::new()));
                    }
                }
                atoms[p - 1] = new_atom;
            }
            IndexArg::Names(lookups) => {
                let name = single_name(&lookups)?;
                let existing = names.as_ref().and_then(|names| {
                    names.iter().position(|n| n.as_deref() == Some(name.as_str()))
                });
                match existing {
                    Some(i) => atoms[i] = new_atom,
                    None => {
                        atoms.push(new_atom);
                        let mut name_list =
                            names.unwrap_or_else(|| vec![Some(String::new()); atoms.len() - 1]);
                        name_list.push(Some(name));
                        names = Some(name_list);
                    }
                }
            }
        }

        let result = self.vector_from_atoms(target, &atoms)?;
        self.copy_attributes(x, result)?;
        if let Some(names) = names {
            self.set_names_attr(result, &names)?;
        }
        Ok(result)
    }

    // --- as.data.frame ---------------------------------------------------------------------

    fn as_data_frame(&mut self, x: Handle) -> EngineResult<Handle> {
        if self.type_of(x)? != Tag::List {
            return Err(EngineError::Eval(
                "cannot coerce to a data frame: not a list".to_string(),
            ));
        }
        let n = self.length(x)?;
        if n == 0 {
            return Err(EngineError::Eval(
                "cannot coerce an empty list to a data frame".to_string(),
            ));
        }
        let names = self.names_of(x)?.ok_or_else(|| {
            EngineError::Eval("cannot coerce to a data frame: columns must be named".to_string())
        })?;
        if names.iter().any(|n| n.as_deref().map_or(true, str::is_empty)) {
            return Err(EngineError::Eval(
                "cannot coerce to a data frame: columns must be named".to_string(),
            ));
        }

        let mut rows: Option<usize> = None;
        let mut columns = Vec::with_capacity(n);
        for i in 0..n {
            let column = self.list_elt(x, i)?;
            if !self.type_of(column)?.is_atomic() {
                return Err(EngineError::Eval(
                    "cannot coerce to a data frame: columns must be atomic vectors".to_string(),
                ));
            }
            let len = self.length(column)?;
            match rows {
                Some(rows) if rows != len => {
                    return Err(EngineError::Eval(
                        "cannot coerce to a data frame: columns differ in length".to_string(),
                    ))
                }
                _ => rows = Some(len),
            }
            columns.push(column);
        }
        let rows = rows.unwrap_or(0);

        let frame = self.alloc_node(Tag::List, Payload::List(columns));
        self.set_names_attr(frame, &names)?;
        let class = self.alloc_char_vec(&[Some("data.frame".to_string())]);
        let class_sym = self.globals().sym_class;
        self.set_attrib(frame, class_sym, class)?;
        let row_names =
            self.alloc_node(Tag::Integer, Payload::Int((1..=rows as i32).collect()));
        let row_names_sym = self.globals().sym_row_names;
        self.set_attrib(frame, row_names_sym, row_names)?;
        Ok(frame)
    }

    // --- deparse1 ------------------------------------------------------------------------------

    /// Compact single-line rendering of an expression.
    pub fn deparse(&self, h: Handle) -> EngineResult<String> {
        let tag = self.type_of(h)?;
        match tag {
            Tag::Null => Ok("NULL".to_string()),
            Tag::Symbol => self.symbol_name(h),
            Tag::String => Ok(match self.char_text(h)? {
                Some(s) => quote_string(&s),
                None => "NA_character_".to_string(),
            }),
            Tag::Environment => Ok("<environment>".to_string()),
            Tag::Closure | Tag::Builtin | Tag::Special => Ok("<function>".to_string()),
            Tag::Call => self.deparse_call(h),
            Tag::Pairlist => {
                let parts = self
                    .pairlist_cells(h)?
                    .into_iter()
                    .map(|(tag, car)| self.deparse_cell(tag, car))
                    .collect::<EngineResult<Vec<String>>>()?;
                Ok(format!("pairlist({})", parts.join(", ")))
            }
            Tag::List => {
                let n = self.length(h)?;
                let names = self.names_of(h)?;
                let mut parts = Vec::with_capacity(n);
                for i in 0..n {
                    let elt = self.deparse(self.list_elt(h, i)?)?;
                    match names.as_ref().and_then(|names| names[i].clone()) {
                        Some(name) if !name.is_empty() => parts.push(format!("{} = {}", name, elt)),
                        _ => parts.push(elt),
                    }
                }
                Ok(format!("list({})", parts.join(", ")))
            }
            t if t.is_atomic() => {
                let literals: Vec<String> = self
                    .atoms(h)?
                    .iter()
                    .map(|a| atom_literal(t, a))
                    .collect();
                if literals.len() == 1 {
                    Ok(literals.into_iter().next().unwrap_or_default())
                } else {
                    Ok(format!("c({})", literals.join(", ")))
                }
            }
            t => Ok(format!("<{}>", t)),
        }
    }

    fn deparse_cell(&self, tag: Handle, car: Handle) -> EngineResult<String> {
        let rendered = self.deparse(car)?;
        if tag == Handle::NULL {
            return Ok(rendered);
        }
        let name = self.symbol_name(tag)?;
        if name.is_empty() {
            Ok(rendered)
        } else {
            Ok(format!("{} = {}", name, rendered))
        }
    }

    fn deparse_call(&self, call: Handle) -> EngineResult<String> {
        let op = self.car(call)?;
        let op_text = self.deparse(op)?;
        let cells = self.pairlist_cells(self.cdr(call)?)?;

        // Selector operators render infix.
        match (op_text.as_str(), cells.as_slice()) {
            ("[", [(_, x), rest @ ..]) if !rest.is_empty() => {
                let indices = rest
                    .iter()
                    .map(|&(tag, car)| self.deparse_cell(tag, car))
                    .collect::<EngineResult<Vec<String>>>()?;
                return Ok(format!("{}[{}]", self.deparse(*x)?, indices.join(", ")));
            }
            ("[[", [(_, x), (_, i)]) => {
                return Ok(format!("{}[[{}]]", self.deparse(*x)?, self.deparse(*i)?));
            }
            ("$", [(_, x), (_, sel)]) => {
                let name = match self.type_of(*sel)? {
                    Tag::Symbol => self.symbol_name(*sel)?,
                    _ => self.deparse(*sel)?,
                };
                return Ok(format!("{}${}", self.deparse(*x)?, name));
            }
            _ => {}
        }

        let args = cells
            .into_iter()
            .map(|(tag, car)| self.deparse_cell(tag, car))
            .collect::<EngineResult<Vec<String>>>()?;
        Ok(format!("{}({})", op_text, args.join(", ")))
    }
}

fn atom_literal(tag: Tag, atom: &Atom) -> String {
    match atom {
        Atom::Na => match tag {
            Tag::Integer => "NA_integer_".to_string(),
            Tag::Double => "NA_real_".to_string(),
            Tag::Character => "NA_character_".to_string(),
            _ => "NA".to_string(),
        },
        Atom::Log(b) => if *b { "TRUE" } else { "FALSE" }.to_string(),
        Atom::Int(x) => format!("{}L", x),
        Atom::Real(x) => format_real(*x),
        Atom::Cplx(re, im) => format_cplx(*re, *im),
        Atom::Str(s) => quote_string(s),
        Atom::Byte(b) => format!("as.raw(0x{:02x})", b),
    }
}

fn first_arg(args: &[(Option<String>, Handle)], op: &str) -> EngineResult<Handle> {
    args.first()
        .map(|&(_, h)| h)
        .ok_or_else(|| EngineError::Eval(format!("{} requires an argument", op)))
}

fn second_arg(args: &[(Option<String>, Handle)], op: &str) -> EngineResult<Handle> {
    args.get(1)
        .map(|&(_, h)| h)
        .ok_or_else(|| EngineError::Eval(format!("{} requires a subscript", op)))
}

/// A `[[` subscript must be a single in-range 1-based position.
fn single_position(positions: &[i32], len: usize) -> EngineResult<usize> {
    let p = single_raw_position(positions)?;
    if p <= len {
        Ok(p - 1)
    } else {
        Err(EngineError::Eval("subscript out of bounds".to_string()))
    }
}

fn single_raw_position(positions: &[i32]) -> EngineResult<usize> {
    match positions {
        [p] if *p >= 1 => Ok(*p as usize),
        _ => Err(EngineError::Eval("invalid subscript".to_string())),
    }
}

fn single_name(lookups: &[Option<String>]) -> EngineResult<String> {
    match lookups {
        [Some(name)] => Ok(name.clone()),
        _ => Err(EngineError::Eval("invalid subscript".to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::Engine;

    fn chr(engine: &mut Engine, values: &[&str]) -> Handle {
        let values: Vec<Option<String>> = values.iter().map(|s| Some(s.to_string())).collect();
        engine.alloc_char_vec(&values)
    }

    fn dbl(engine: &mut Engine, values: &[f64]) -> Handle {
        engine.alloc_node(Tag::Double, Payload::Real(values.to_vec()))
    }

    fn int(engine: &mut Engine, values: &[i32]) -> Handle {
        engine.alloc_node(Tag::Integer, Payload::Int(values.to_vec()))
    }

    fn named_list(engine: &mut Engine, entries: &[(&str, Handle)]) -> Handle {
        let elements: Vec<Handle> = entries.iter().map(|&(_, h)| h).collect();
        let list = engine.alloc_node(Tag::List, Payload::List(elements));
        let names: Vec<Option<String>> =
            entries.iter().map(|&(n, _)| Some(n.to_string())).collect();
        engine.set_names_attr(list, &names).unwrap();
        list
    }

    fn call_builtin(engine: &mut Engine, name: &str, args: &[Handle]) -> EngineResult<Handle> {
        let op = engine.install(name);
        let mut items = vec![op];
        items.extend_from_slice(args);
        let call = engine.alloc_lang(items.len());
        let mut cur = call;
        for &item in &items {
            engine.set_car(cur, item).unwrap();
            cur = engine.cdr(cur).unwrap();
        }
        let env = engine.base_env();
        engine.eval(call, env)
    }

    #[test]
    fn test_concat_promotes_to_double() {
        let mut engine = Engine::boot();
        let a = int(&mut engine, &[1, 2]);
        let b = dbl(&mut engine, &[2.5]);
        let out = call_builtin(&mut engine, "c", &[a, b]).unwrap();
        assert_eq!(engine.type_of(out).unwrap(), Tag::Double);
        assert_eq!(engine.real_values(out).unwrap(), vec![1.0, 2.0, 2.5]);
    }

    #[test]
    fn test_concat_promotes_to_character_and_drops_null() {
        let mut engine = Engine::boot();
        let a = engine.r_true();
        let b = chr(&mut engine, &["x"]);
        let null = Handle::NULL;
        let out = call_builtin(&mut engine, "c", &[a, null, b]).unwrap();
        assert_eq!(engine.type_of(out).unwrap(), Tag::Character);
        assert_eq!(
            engine.char_vec(out).unwrap(),
            vec![Some("TRUE".to_string()), Some("x".to_string())]
        );
    }

    #[test]
    fn test_concat_propagates_na() {
        let mut engine = Engine::boot();
        let na = engine.na_logical();
        let b = dbl(&mut engine, &[1.5]);
        let out = call_builtin(&mut engine, "c", &[na, b]).unwrap();
        let values = engine.real_values(out).unwrap();
        assert!(is_na_real(values[0]));
        assert_eq!(values[1], 1.5);
    }

    #[test]
    fn test_concat_of_nothing_is_null() {
        let mut engine = Engine::boot();
        let out = call_builtin(&mut engine, "c", &[]).unwrap();
        assert_eq!(out, Handle::NULL);
    }

    #[test]
    fn test_concat_with_environment_builds_list() {
        let mut engine = Engine::boot();
        let global = engine.global_env();
        let env = engine.new_env(global);
        let v = dbl(&mut engine, &[1.0, 2.0]);
        let out = call_builtin(&mut engine, "c", &[v, env]).unwrap();
        assert_eq!(engine.type_of(out).unwrap(), Tag::List);
        // Atomic arguments split into length-one elements.
        assert_eq!(engine.length(out).unwrap(), 3);
        assert_eq!(engine.list_elt(out, 2).unwrap(), env);
    }

    #[test]
    fn test_is_na_masks() {
        let mut engine = Engine::boot();
        let v = dbl(&mut engine, &[1.0, na_real(), 3.0]);
        let out = call_builtin(&mut engine, "is.na", &[v]).unwrap();
        assert_eq!(engine.logical_values(out).unwrap(), vec![0, 1, 0]);

        let out = call_builtin(&mut engine, "is.na", &[Handle::NULL]).unwrap();
        assert_eq!(engine.length(out).unwrap(), 0);
    }

    #[test]
    fn test_class_implicit_and_explicit() {
        let mut engine = Engine::boot();
        let v = dbl(&mut engine, &[1.0]);
        let out = call_builtin(&mut engine, "class", &[v]).unwrap();
        assert_eq!(engine.char_vec(out).unwrap(), vec![Some("numeric".to_string())]);

        let cls = chr(&mut engine, &["myclass"]);
        let sym = engine.class_symbol();
        engine.set_attrib(v, sym, cls).unwrap();
        let out = call_builtin(&mut engine, "class", &[v]).unwrap();
        assert_eq!(engine.char_vec(out).unwrap(), vec![Some("myclass".to_string())]);
    }

    #[test]
    fn test_subset_by_position_with_names() {
        let mut engine = Engine::boot();
        let v = dbl(&mut engine, &[10.0, 20.0, 30.0]);
        engine
            .set_names_attr(v, &[Some("a".into()), Some("b".into()), Some("c".into())])
            .unwrap();
        let idx = int(&mut engine, &[3, 1, 5]);
        let out = call_builtin(&mut engine, "[", &[v, idx]).unwrap();

        let values = engine.real_values(out).unwrap();
        assert_eq!(values[0], 30.0);
        assert_eq!(values[1], 10.0);
        assert!(is_na_real(values[2]));

        let names_sym = engine.names_symbol();
        let names = engine.get_attrib(out, names_sym).unwrap();
        assert_eq!(
            engine.char_vec(names).unwrap(),
            vec![Some("c".to_string()), Some("a".to_string()), None]
        );
    }

    #[test]
    fn test_subset_by_name() {
        let mut engine = Engine::boot();
        let v = int(&mut engine, &[1, 2]);
        engine
            .set_names_attr(v, &[Some("x".into()), Some("y".into())])
            .unwrap();
        let idx = chr(&mut engine, &["y"]);
        let out = call_builtin(&mut engine, "[", &[v, idx]).unwrap();
        assert_eq!(engine.int_values(out).unwrap(), vec![2]);
    }

    #[test]
    fn test_element_by_position_and_bounds() {
        let mut engine = Engine::boot();
        let a = dbl(&mut engine, &[1.0]);
        let list = named_list(&mut engine, &[("a", a)]);

        let one = int(&mut engine, &[1]);
        let out = call_builtin(&mut engine, "[[", &[list, one]).unwrap();
        assert_eq!(out, a);

        let two = int(&mut engine, &[2]);
        let err = call_builtin(&mut engine, "[[", &[list, two]).unwrap_err();
        assert!(matches!(err, EngineError::Eval(msg) if msg.contains("out of bounds")));
    }

    #[test]
    fn test_element_by_missing_name_is_null() {
        let mut engine = Engine::boot();
        let a = dbl(&mut engine, &[1.0]);
        let list = named_list(&mut engine, &[("a", a)]);
        let idx = chr(&mut engine, &["b"]);
        let out = call_builtin(&mut engine, "[[", &[list, idx]).unwrap();
        assert_eq!(out, Handle::NULL);
    }

    #[test]
    fn test_element_on_atomic_drops_names() {
        let mut engine = Engine::boot();
        let v = dbl(&mut engine, &[1.0, 2.0]);
        engine
            .set_names_attr(v, &[Some("a".into()), Some("b".into())])
            .unwrap();
        let idx = int(&mut engine, &[2]);
        let out = call_builtin(&mut engine, "[[", &[v, idx]).unwrap();
        assert_eq!(engine.real_values(out).unwrap(), vec![2.0]);
        let names_sym = engine.names_symbol();
        assert_eq!(engine.get_attrib(out, names_sym).unwrap(), Handle::NULL);
    }

    #[test]
    fn test_member_access() {
        let mut engine = Engine::boot();
        let a = dbl(&mut engine, &[7.0]);
        let list = named_list(&mut engine, &[("field", a)]);
        let sel = engine.install("field");
        let out = call_builtin(&mut engine, "$", &[list, sel]).unwrap();
        assert_eq!(out, a);

        let missing = engine.install("nope");
        let out = call_builtin(&mut engine, "$", &[list, missing]).unwrap();
        assert_eq!(out, Handle::NULL);
    }

    #[test]
    fn test_member_on_atomic_fails() {
        let mut engine = Engine::boot();
        let v = dbl(&mut engine, &[1.0]);
        let sel = engine.install("x");
        let err = call_builtin(&mut engine, "$", &[v, sel]).unwrap_err();
        assert!(matches!(err, EngineError::Eval(msg) if msg.contains("atomic vectors")));
    }

    #[test]
    fn test_element_assign_copies_list() {
        let mut engine = Engine::boot();
        let a = dbl(&mut engine, &[1.0]);
        let list = named_list(&mut engine, &[("a", a)]);
        let b = dbl(&mut engine, &[2.0]);
        let idx = chr(&mut engine, &["b"]);

        let out = call_builtin(&mut engine, "[[<-", &[list, idx, b]).unwrap();
        assert_ne!(out, list);
        assert_eq!(engine.length(list).unwrap(), 1);
        assert_eq!(engine.length(out).unwrap(), 2);
        assert_eq!(engine.list_elt(out, 1).unwrap(), b);
    }

    #[test]
    fn test_element_assign_null_deletes() {
        let mut engine = Engine::boot();
        let a = dbl(&mut engine, &[1.0]);
        let b = dbl(&mut engine, &[2.0]);
        let list = named_list(&mut engine, &[("a", a), ("b", b)]);
        let idx = chr(&mut engine, &["a"]);

        let out = call_builtin(&mut engine, "[[<-", &[list, idx, Handle::NULL]).unwrap();
        assert_eq!(engine.length(out).unwrap(), 1);
        assert_eq!(engine.list_elt(out, 0).unwrap(), b);
    }

    #[test]
    fn test_element_assign_promotes_atomic() {
        let mut engine = Engine::boot();
        let v = int(&mut engine, &[1, 2]);
        let s = chr(&mut engine, &["x"]);
        let idx = int(&mut engine, &[1]);
        let out = call_builtin(&mut engine, "[[<-", &[v, idx, s]).unwrap();
        assert_eq!(engine.type_of(out).unwrap(), Tag::Character);
        assert_eq!(
            engine.char_vec(out).unwrap(),
            vec![Some("x".to_string()), Some("2".to_string())]
        );
    }

    #[test]
    fn test_element_assign_defines_env_binding() {
        let mut engine = Engine::boot();
        let global = engine.global_env();
        let env = engine.new_env(global);
        let idx = chr(&mut engine, &["answer"]);
        let v = int(&mut engine, &[42]);
        let out = call_builtin(&mut engine, "[[<-", &[env, idx, v]).unwrap();
        assert_eq!(out, env);
        let sym = engine.install("answer");
        assert_eq!(engine.env_get_local(env, sym).unwrap(), Some(v));
    }

    #[test]
    fn test_as_data_frame_builds_frame() {
        let mut engine = Engine::boot();
        let a = dbl(&mut engine, &[1.0, 2.0]);
        let b = chr(&mut engine, &["x", "y"]);
        let list = named_list(&mut engine, &[("a", a), ("b", b)]);

        let frame = call_builtin(&mut engine, "as.data.frame", &[list]).unwrap();
        let class_sym = engine.class_symbol();
        let class = engine.get_attrib(frame, class_sym).unwrap();
        assert_eq!(
            engine.char_vec(class).unwrap(),
            vec![Some("data.frame".to_string())]
        );
        let row_names_sym = engine.install("row.names");
        let row_names = engine.get_attrib(frame, row_names_sym).unwrap();
        assert_eq!(engine.int_values(row_names).unwrap(), vec![1, 2]);
    }

    #[test]
    fn test_as_data_frame_rejects_ragged_columns() {
        let mut engine = Engine::boot();
        let a = dbl(&mut engine, &[1.0, 2.0]);
        let b = chr(&mut engine, &["x"]);
        let list = named_list(&mut engine, &[("a", a), ("b", b)]);
        let err = call_builtin(&mut engine, "as.data.frame", &[list]).unwrap_err();
        assert!(matches!(err, EngineError::Eval(msg) if msg.contains("differ in length")));
    }

    #[test]
    fn test_as_data_frame_rejects_unnamed_list() {
        let mut engine = Engine::boot();
        let a = dbl(&mut engine, &[1.0]);
        let list = engine.alloc_node(Tag::List, Payload::List(vec![a]));
        let err = call_builtin(&mut engine, "as.data.frame", &[list]).unwrap_err();
        assert!(matches!(err, EngineError::Eval(msg) if msg.contains("named")));
    }

    #[test]
    fn test_quote_returns_unevaluated() {
        let mut engine = Engine::boot();
        let sym = engine.install("undefined_binding");
        let out = call_builtin(&mut engine, "quote", &[sym]).unwrap();
        assert_eq!(out, sym);
    }

    #[test]
    fn test_eval_unknown_symbol_fails() {
        let mut engine = Engine::boot();
        let sym = engine.install("no_such_object");
        let env = engine.global_env();
        let err = engine.eval(sym, env).unwrap_err();
        assert!(matches!(err, EngineError::Eval(msg) if msg.contains("no_such_object")));
    }

    #[test]
    fn test_deparse_selector_calls_render_infix() {
        let mut engine = Engine::boot();
        let x = engine.install("x");
        let dollar = engine.dollar_symbol();
        let field = engine.install("field");
        let call = engine.lang3(dollar, x, field).unwrap();
        assert_eq!(engine.deparse(call).unwrap(), "x$field");

        let bracket2 = engine.bracket2_symbol();
        let idx = int(&mut engine, &[2]);
        let call = engine.lang3(bracket2, x, idx).unwrap();
        assert_eq!(engine.deparse(call).unwrap(), "x[[2L]]");
    }

    #[test]
    fn test_deparse_call_renders_arguments() {
        let mut engine = Engine::boot();
        let op = engine.install("c");
        let a = dbl(&mut engine, &[1.0]);
        let b = chr(&mut engine, &["two"]);
        let call = engine.lang3(op, a, b).unwrap();
        assert_eq!(engine.deparse(call).unwrap(), "c(1, \"two\")");
    }
}
