//! Persistent objects: typed wrappers over the runtime singletons.
//!
//! The singletons are engine globals and are rooted by the engine itself, so
//! the wrappers here never need protection. They are gathered once per
//! thread and then handed out as a `Copy` bundle.

use once_cell::unsync::OnceCell;
use rbridge_engine::engine;
use rbridge_engine::Handle;

use crate::robj::{RAny, REnvironment, RLogical, RNull, RString, RSymbol};

/// The always-live runtime objects, each behind its typed wrapper.
#[derive(Debug, Clone, Copy)]
pub struct PersistentObjects {
    /// The absence object.
    pub null: RNull,
    /// Scalar `TRUE`.
    pub r_true: RLogical,
    /// Scalar `FALSE`.
    pub r_false: RLogical,
    /// The missing logical scalar.
    pub na: RLogical,
    /// The missing character cell.
    pub na_string: RString,
    /// The unbound-value sentinel.
    pub unbound_value: RAny,
    /// The empty environment at the root of every parent chain.
    pub empty_env: REnvironment,
    /// The environment holding the builtin bindings.
    pub base_env: REnvironment,
    /// The user-facing top-level environment.
    pub global_env: REnvironment,
    /// The `names` symbol.
    pub names_symbol: RSymbol,
    /// The `[` symbol.
    pub bracket_symbol: RSymbol,
    /// The `[[` symbol.
    pub bracket2_symbol: RSymbol,
    /// The `$` symbol.
    pub dollar_symbol: RSymbol,
}

thread_local! {
    static OBJS: OnceCell<PersistentObjects> = OnceCell::new();
}

struct Singletons {
    r_true: Handle,
    r_false: Handle,
    na: Handle,
    na_string: Handle,
    unbound_value: Handle,
    empty_env: Handle,
    base_env: Handle,
    global_env: Handle,
    names_symbol: Handle,
    bracket_symbol: Handle,
    bracket2_symbol: Handle,
    dollar_symbol: Handle,
}

fn build() -> PersistentObjects {
    let s = engine::with(|rt| Singletons {
        r_true: rt.r_true(),
        r_false: rt.r_false(),
        na: rt.na_logical(),
        na_string: rt.na_string(),
        unbound_value: rt.unbound_value(),
        empty_env: rt.empty_env(),
        base_env: rt.base_env(),
        global_env: rt.global_env(),
        names_symbol: rt.names_symbol(),
        bracket_symbol: rt.bracket_symbol(),
        bracket2_symbol: rt.bracket2_symbol(),
        dollar_symbol: rt.dollar_symbol(),
    });
    PersistentObjects {
        null: RNull::new(),
        r_true: RLogical(RAny::from_handle(s.r_true)),
        r_false: RLogical(RAny::from_handle(s.r_false)),
        na: RLogical(RAny::from_handle(s.na)),
        na_string: RString(RAny::from_handle(s.na_string)),
        unbound_value: RAny::from_handle(s.unbound_value),
        empty_env: REnvironment(RAny::from_handle(s.empty_env)),
        base_env: REnvironment(RAny::from_handle(s.base_env)),
        global_env: REnvironment(RAny::from_handle(s.global_env)),
        names_symbol: RSymbol(RAny::from_handle(s.names_symbol)),
        bracket_symbol: RSymbol(RAny::from_handle(s.bracket_symbol)),
        bracket2_symbol: RSymbol(RAny::from_handle(s.bracket2_symbol)),
        dollar_symbol: RSymbol(RAny::from_handle(s.dollar_symbol)),
    }
}

/// Force the bundle to be gathered now instead of on first use.
pub fn init() {
    let _ = objs();
}

/// The persistent-object bundle for this thread.
pub fn objs() -> PersistentObjects {
    OBJS.with(|cell| *cell.get_or_init(build))
}
