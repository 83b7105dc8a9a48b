//! Foreign runtime engine for the rbridge bridge layer.
//!
//! This crate provides the collaborator side of the bridge:
//! - A slab heap of tagged nodes (vectors, pairlists, symbols, environments)
//! - A mark-sweep garbage collector that treats the protection stack and the
//!   precious list as roots
//! - Symbol interning, attribute pairlists and environment frames
//! - An evaluator for synthesized call expressions over a closed builtin
//!   table (`c`, `is.na`, `class`, `[`, `[[`, `$`, `[[<-`, `as.data.frame`,
//!   `quote`, `deparse1`)
//!
//! The bridge core (`rbridge-core`) only ever talks to this crate through
//! [`Handle`]s and the primitive API on [`Engine`]; it never owns heap
//! storage itself.

#![warn(missing_docs)]
#![warn(rust_2018_idioms)]

mod builtins;
pub mod engine;
pub mod gc;
pub mod handle;
pub mod heap;
pub mod protect;
pub mod tag;

pub use engine::{with, Engine};
pub use gc::GcStats;
pub use handle::Handle;
pub use protect::ProtectIndex;
pub use tag::Tag;

/// Errors raised by the runtime engine.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// An evaluation-level error, carrying the runtime's own message.
    #[error("evaluation error: {0}")]
    Eval(String),

    /// `unprotect(n)` was asked to pop more entries than the stack holds.
    #[error("protection stack imbalance")]
    StackImbalance,

    /// A protection index did not refer to an occupied slot.
    #[error("invalid protection stack index")]
    BadProtectIndex,

    /// `release` was called on a handle that is not on the precious list.
    #[error("attempt to release an object that was not preserved")]
    NotPreserved,

    /// The handle's heap slot has been reclaimed or never existed.
    #[error("invalid handle: object has been reclaimed")]
    DeadHandle,

    /// A primitive was applied to a node of the wrong kind.
    #[error("invalid argument: expected {expected}")]
    InvalidType {
        /// The kind of node the primitive operates on.
        expected: &'static str,
    },
}

/// Engine operation result.
pub type EngineResult<T> = Result<T, EngineError>;
