//! Opaque handles into the engine heap.

use std::fmt;

/// Opaque address of an object on the engine heap.
///
/// Handles are identity-comparable and hashable but carry no ordering and no
/// liveness guarantee of their own: a handle stays valid only while it is
/// reachable from a collector root (the protection stack, the precious list,
/// an interned symbol, or a live container).
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Handle(pub(crate) u32);

impl Handle {
    /// The null object. Slot zero is permanently occupied by it.
    pub const NULL: Handle = Handle(0);

    /// Raw slot index, for diagnostics only.
    pub fn raw(self) -> u32 {
        self.0
    }

    pub(crate) fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Debug for Handle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Handle({})", self.0)
    }
}

impl fmt::Display for Handle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[object@{}]", self.0)
    }
}
