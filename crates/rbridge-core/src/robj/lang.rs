//! Language objects: symbols, character cells, calls and functions.
//!
//! Symbols are interned by the engine and live as long as the runtime, so
//! they are never independently rooted. Character cells are the opposite:
//! never interned, so an intermediate [`RString`] must be rooted by its user
//! like any other fresh object.

use rbridge_engine::engine;
use rbridge_engine::{EngineResult, Handle, Tag};

use crate::error::BridgeResult;
use crate::robj::{wrapper, RAny, RObject};

wrapper!(
    /// An interned symbol.
    RSymbol,
    "symbol",
    Tag::Symbol
);

impl RSymbol {
    /// Intern a symbol by name.
    pub fn new(name: &str) -> Self {
        RSymbol(RAny::from_handle(engine::with(|rt| rt.install(name))))
    }

    /// The symbol's print-name cell.
    pub fn printname(&self) -> BridgeResult<RString> {
        let h = engine::with(|rt| rt.symbol_printname(self.handle()))?;
        RString::wrap(h)
    }

    /// The symbol's bound value (the unbound sentinel when none).
    pub fn symvalue(&self) -> BridgeResult<RObject> {
        let h = engine::with(|rt| rt.symbol_value(self.handle()))?;
        RObject::wrap(h)
    }

    /// The symbol's name as host text.
    pub fn to_name_string(&self) -> BridgeResult<String> {
        Ok(engine::with(|rt| rt.symbol_name(self.handle()))?)
    }
}

wrapper!(
    /// A single character cell, the element type of character vectors.
    RString,
    "string",
    Tag::String
);

impl RString {
    /// Allocate a character cell.
    pub fn new(text: &str) -> Self {
        RString(RAny::from_handle(engine::with(|rt| rt.mk_char(text))))
    }

    /// Allocate a character cell, or take the missing-string singleton for
    /// `None`.
    pub fn from_text(text: Option<&str>) -> Self {
        match text {
            Some(text) => RString::new(text),
            None => RString(RAny::from_handle(engine::with(|rt| rt.na_string()))),
        }
    }

    /// Host text; `None` for the missing string.
    pub fn text(&self) -> BridgeResult<Option<String>> {
        Ok(engine::with(|rt| rt.char_text(self.handle()))?)
    }
}

wrapper!(
    /// A call expression.
    RCall,
    "call",
    Tag::Call
);

impl RCall {
    /// Build a call from an operator and its operands, threading one cell
    /// per operand.
    pub fn new(op: RAny, args: &[RAny]) -> BridgeResult<Self> {
        let op_h = op.handle();
        let arg_hs: Vec<Handle> = args.iter().map(RAny::handle).collect();
        let call = engine::with(|rt| -> EngineResult<Handle> {
            let call = rt.alloc_lang(arg_hs.len() + 1);
            rt.set_car(call, op_h)?;
            let mut cur = rt.cdr(call)?;
            for &arg in &arg_hs {
                rt.set_car(cur, arg)?;
                cur = rt.cdr(cur)?;
            }
            Ok(call)
        })?;
        Ok(RCall(RAny::from_handle(call)))
    }

    /// The call's operator.
    pub fn op(&self) -> BridgeResult<RObject> {
        let h = engine::with(|rt| rt.car(self.handle()))?;
        RObject::wrap(h)
    }

    /// Evaluate in the base environment, rooting the expression for the
    /// duration.
    pub fn eval(&self) -> BridgeResult<RObject> {
        let h = self.handle();
        let out = engine::with(|rt| -> EngineResult<Handle> {
            rt.protect(h);
            let result = rt.eval(h, rt.base_env());
            rt.unprotect(1)?;
            result
        })?;
        RObject::wrap(out)
    }

    /// Compact single-line rendering.
    pub fn deparse(&self) -> BridgeResult<String> {
        Ok(engine::with(|rt| rt.deparse(self.handle()))?)
    }
}

wrapper!(
    /// A function: closure, builtin or special.
    RFunction,
    "function",
    Tag::Closure | Tag::Builtin | Tag::Special
);

impl RFunction {
    /// Call the function with the given arguments.
    pub fn exec(&self, args: &[RAny]) -> BridgeResult<RObject> {
        RCall::new(RAny::from_handle(self.handle()), args)?.eval()
    }
}
