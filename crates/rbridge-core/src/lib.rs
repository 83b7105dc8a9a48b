//! Bridge between host values and the engine's tagged-object heap.
//!
//! The engine owns every object and reclaims anything its collector cannot
//! reach, so this crate is organized around the rooting discipline first and
//! the conversion machinery second:
//!
//! - [`protect`]: the LIFO protection stack with scoped guards
//!   ([`protect::ProtectScope`], [`protect::ProtectSlot`])
//! - [`shelter`]: named root sets for batch lifetime management
//! - [`persistent`]: the store of always-live wrapped singletons
//! - [`data`]: the host-side universal value union ([`data::RData`]) and the
//!   typed conversion tree ([`data::RDataNode`])
//! - [`robj`]: typed wrappers over engine handles and the construction /
//!   conversion cascades ([`robj::RObject`])
//!
//! All operations run on a single control thread; the engine instance,
//! shelter registry and persistent store are thread-local.

#![warn(missing_docs)]
#![warn(rust_2018_idioms)]

pub mod data;
pub mod error;
pub mod persistent;
pub mod protect;
pub mod robj;
pub mod shelter;

pub use data::{Complex, ConvertOptions, Index, ObjectOptions, RData, RDataNode};
pub use error::{BridgeError, BridgeResult};
pub use persistent::{objs, PersistentObjects};
pub use robj::{
    RAny, RCall, RCharacter, RComplex, RDataFrame, RDouble, REnvironment, RFunction, RInteger,
    RList, RLogical, RNull, RObject, RPairlist, RRaw, RString, RSymbol,
};
pub use shelter::ShelterId;
