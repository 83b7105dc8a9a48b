//! Slab heap of tagged nodes.
//!
//! The heap owns the storage of every object; the bridge core only observes
//! or mutates nodes through the primitive API on
//! [`Engine`](crate::engine::Engine). Freed slots are recycled through a free
//! list, so a stale [`Handle`] is detected as long as its slot has not been
//! reallocated.

use crate::handle::Handle;
use crate::tag::Tag;
use crate::{EngineError, EngineResult};

/// Missing-value encoding for logical and integer elements.
pub const NA_INTEGER: i32 = i32::MIN;

/// Missing-value encoding for double elements: a quiet NaN with the payload
/// bits set to 1954, matching the historical encoding of the runtime this
/// engine interoperates with.
pub fn na_real() -> f64 {
    f64::from_bits(0x7FF0_0000_0000_07A2)
}

/// True when `x` carries the missing-value NaN payload.
pub fn is_na_real(x: f64) -> bool {
    x.to_bits() == 0x7FF0_0000_0000_07A2
}

/// Node payload, one variant per stored representation.
///
/// `Char(None)` is the missing-string cell; the bootstrapped singleton is the
/// only such node, so identity comparison against it is also valid.
#[derive(Debug, Clone)]
pub(crate) enum Payload {
    Null,
    Symbol {
        printname: Handle,
        value: Handle,
    },
    /// The unbound-value sentinel (reported with tag `Symbol`).
    Unbound,
    Cons {
        car: Handle,
        cdr: Handle,
        tag: Handle,
    },
    Char(Option<String>),
    Logical(Vec<i32>),
    Int(Vec<i32>),
    Real(Vec<f64>),
    Cplx(Vec<(f64, f64)>),
    Str(Vec<Handle>),
    Raw(Vec<u8>),
    List(Vec<Handle>),
    Env {
        parent: Handle,
        /// Bindings in insertion order, keyed by interned symbol.
        frame: Vec<(Handle, Handle)>,
    },
    Builtin(crate::builtins::Builtin),
}

/// A heap node: tag, payload, attribute pairlist and the collector mark bit.
#[derive(Debug, Clone)]
pub(crate) struct Node {
    pub tag: Tag,
    pub payload: Payload,
    pub attrib: Handle,
    pub mark: bool,
}

impl Node {
    pub fn new(tag: Tag, payload: Payload) -> Self {
        Node {
            tag,
            payload,
            attrib: Handle::NULL,
            mark: false,
        }
    }
}

enum Slot {
    Free,
    Used(Node),
}

/// Slab allocator for heap nodes.
pub(crate) struct Heap {
    slots: Vec<Slot>,
    free: Vec<u32>,
    live: usize,
}

impl Heap {
    /// Create a heap with slot zero permanently holding the null object.
    pub fn new() -> Self {
        Heap {
            slots: vec![Slot::Used(Node::new(Tag::Null, Payload::Null))],
            free: Vec::new(),
            live: 1,
        }
    }

    pub fn alloc(&mut self, node: Node) -> Handle {
        self.live += 1;
        if let Some(idx) = self.free.pop() {
            self.slots[idx as usize] = Slot::Used(node);
            Handle(idx)
        } else {
            self.slots.push(Slot::Used(node));
            Handle((self.slots.len() - 1) as u32)
        }
    }

    pub fn get(&self, h: Handle) -> EngineResult<&Node> {
        match self.slots.get(h.index()) {
            Some(Slot::Used(node)) => Ok(node),
            _ => Err(EngineError::DeadHandle),
        }
    }

    pub fn get_mut(&mut self, h: Handle) -> EngineResult<&mut Node> {
        match self.slots.get_mut(h.index()) {
            Some(Slot::Used(node)) => Ok(node),
            _ => Err(EngineError::DeadHandle),
        }
    }

    pub fn is_live(&self, h: Handle) -> bool {
        matches!(self.slots.get(h.index()), Some(Slot::Used(_)))
    }

    /// Free a slot during sweep. Slot zero is never freed.
    pub fn free_slot(&mut self, idx: u32) {
        debug_assert!(idx != 0, "the null slot is never swept");
        if let Some(slot) = self.slots.get_mut(idx as usize) {
            if matches!(slot, Slot::Used(_)) {
                *slot = Slot::Free;
                self.free.push(idx);
                self.live -= 1;
            }
        }
    }

    pub fn live_count(&self) -> usize {
        self.live
    }

    pub fn slot_count(&self) -> usize {
        self.slots.len()
    }

    /// Visit every live slot index together with its mark bit.
    pub fn for_each_live<F: FnMut(u32, bool)>(&self, mut f: F) {
        for (idx, slot) in self.slots.iter().enumerate() {
            if let Slot::Used(node) = slot {
                f(idx as u32, node.mark);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_heap_slot_zero_is_null() {
        let heap = Heap::new();
        assert!(heap.is_live(Handle::NULL));
        assert_eq!(heap.get(Handle::NULL).unwrap().tag, Tag::Null);
    }

    #[test]
    fn test_heap_alloc_and_free_recycles_slots() {
        let mut heap = Heap::new();
        let a = heap.alloc(Node::new(Tag::Logical, Payload::Logical(vec![1])));
        let b = heap.alloc(Node::new(Tag::Double, Payload::Real(vec![1.0])));
        assert_eq!(heap.live_count(), 3);

        heap.free_slot(a.raw());
        assert!(!heap.is_live(a));
        assert!(heap.is_live(b));
        assert!(heap.get(a).is_err());

        // The freed slot is reused before the slab grows.
        let c = heap.alloc(Node::new(Tag::Raw, Payload::Raw(vec![0])));
        assert_eq!(c.raw(), a.raw());
        assert_eq!(heap.slot_count(), 3);
    }

    #[test]
    fn test_na_real_roundtrip() {
        assert!(na_real().is_nan());
        assert!(is_na_real(na_real()));
        assert!(!is_na_real(f64::NAN));
        assert!(!is_na_real(1.0));
    }
}
