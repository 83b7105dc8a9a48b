//! Mark-sweep collection over the engine heap.
//!
//! Roots are gathered by the [`Engine`](crate::engine::Engine): the global
//! singletons, every interned symbol, the protection stack and the precious
//! list. Collection only runs when explicitly requested; there is no
//! allocation-triggered collection, so primitive sequences never observe a
//! half-built object being reclaimed.

use crate::handle::Handle;
use crate::heap::{Heap, Payload};

/// Collector statistics.
#[derive(Debug, Clone, Copy, Default)]
pub struct GcStats {
    /// Total number of collections run.
    pub collections: usize,

    /// Total objects freed across all collections.
    pub objects_freed: usize,

    /// Objects freed by the most recent collection.
    pub last_freed: usize,

    /// Live objects remaining after the most recent collection.
    pub live_after: usize,

    /// Heap slots in total, live plus recycled, after the most recent
    /// collection.
    pub heap_slots: usize,
}

/// Mark every node reachable from `roots`, then sweep the rest.
/// Returns the number of freed nodes.
pub(crate) fn collect(heap: &mut Heap, roots: &[Handle]) -> usize {
    mark(heap, roots);

    let mut dead: Vec<u32> = Vec::new();
    heap.for_each_live(|idx, marked| {
        if !marked && idx != 0 {
            dead.push(idx);
        }
    });
    for idx in &dead {
        heap.free_slot(*idx);
    }

    // Clear mark bits for the next cycle.
    let mut live: Vec<u32> = Vec::new();
    heap.for_each_live(|idx, _| live.push(idx));
    for idx in live {
        if let Ok(node) = heap.get_mut(Handle(idx)) {
            node.mark = false;
        }
    }

    dead.len()
}

fn mark(heap: &mut Heap, roots: &[Handle]) {
    let mut work: Vec<Handle> = roots.to_vec();

    while let Some(h) = work.pop() {
        let node = match heap.get_mut(h) {
            Ok(node) => node,
            // A root may be stale when collection races nothing; skip it.
            Err(_) => continue,
        };
        if node.mark {
            continue;
        }
        node.mark = true;

        let attrib = node.attrib;
        if attrib != Handle::NULL {
            work.push(attrib);
        }
        match &node.payload {
            Payload::Symbol { printname, value } => {
                work.push(*printname);
                work.push(*value);
            }
            Payload::Cons { car, cdr, tag } => {
                work.push(*car);
                work.push(*cdr);
                work.push(*tag);
            }
            Payload::Str(elements) => work.extend(elements.iter().copied()),
            Payload::List(elements) => work.extend(elements.iter().copied()),
            Payload::Env { parent, frame } => {
                work.push(*parent);
                for (sym, value) in frame {
                    work.push(*sym);
                    work.push(*value);
                }
            }
            Payload::Null
            | Payload::Unbound
            | Payload::Char(_)
            | Payload::Logical(_)
            | Payload::Int(_)
            | Payload::Real(_)
            | Payload::Cplx(_)
            | Payload::Raw(_)
            | Payload::Builtin(_) => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::heap::Node;
    use crate::tag::Tag;

    #[test]
    fn test_collect_frees_unreachable_nodes() {
        let mut heap = Heap::new();
        let kept = heap.alloc(Node::new(Tag::Double, Payload::Real(vec![1.0])));
        let dropped = heap.alloc(Node::new(Tag::Double, Payload::Real(vec![2.0])));

        let freed = collect(&mut heap, &[kept]);
        assert_eq!(freed, 1);
        assert!(heap.is_live(kept));
        assert!(!heap.is_live(dropped));
    }

    #[test]
    fn test_collect_traces_containers() {
        let mut heap = Heap::new();
        let elt = heap.alloc(Node::new(Tag::Logical, Payload::Logical(vec![1])));
        let list = heap.alloc(Node::new(Tag::List, Payload::List(vec![elt])));

        collect(&mut heap, &[list]);
        assert!(heap.is_live(elt));
        assert!(heap.is_live(list));
    }

    #[test]
    fn test_collect_traces_cons_cells_and_attributes() {
        let mut heap = Heap::new();
        let value = heap.alloc(Node::new(Tag::Integer, Payload::Int(vec![42])));
        let cell = heap.alloc(Node::new(
            Tag::Pairlist,
            Payload::Cons {
                car: value,
                cdr: Handle::NULL,
                tag: Handle::NULL,
            },
        ));
        let names = heap.alloc(Node::new(Tag::Character, Payload::Str(vec![])));
        heap.get_mut(cell).unwrap().attrib = names;

        collect(&mut heap, &[cell]);
        assert!(heap.is_live(value));
        assert!(heap.is_live(names));
    }

    #[test]
    fn test_null_slot_survives_with_no_roots() {
        let mut heap = Heap::new();
        heap.alloc(Node::new(Tag::Double, Payload::Real(vec![1.0])));
        collect(&mut heap, &[]);
        assert!(heap.is_live(Handle::NULL));
        assert_eq!(heap.live_count(), 1);
    }
}
