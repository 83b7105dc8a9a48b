//! Protection stack: the LIFO root set for in-flight handles.
//!
//! Implemented as an arena with stable integer slots plus an order stack, so
//! that a slot's occupant can be swapped by index (`reprotect`) without
//! disturbing neighboring entries. Plain `protect`/`unprotect` operate on the
//! order stack in LIFO fashion.

use crate::handle::Handle;
use crate::{EngineError, EngineResult};

/// Stable identifier of an occupied protection slot.
///
/// The slot stays valid across further pushes above it, which is what allows
/// an accumulator to be re-rooted in place while a caller holds a constant
/// stack depth.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct ProtectIndex(pub(crate) u32);

/// Arena-backed protection stack.
#[derive(Debug, Default)]
pub(crate) struct ProtectStack {
    slots: Vec<Option<Handle>>,
    free: Vec<u32>,
    /// Slot ids in push order; the top of the stack is the last element.
    order: Vec<u32>,
}

impl ProtectStack {
    pub fn new() -> Self {
        Self::default()
    }

    /// Root `h` at the top of the stack and return its stable slot.
    pub fn protect(&mut self, h: Handle) -> ProtectIndex {
        let idx = if let Some(idx) = self.free.pop() {
            self.slots[idx as usize] = Some(h);
            idx
        } else {
            self.slots.push(Some(h));
            (self.slots.len() - 1) as u32
        };
        self.order.push(idx);
        ProtectIndex(idx)
    }

    /// Pop the top `n` entries. Fails without popping anything when `n`
    /// exceeds the current depth.
    pub fn unprotect(&mut self, n: usize) -> EngineResult<()> {
        if n > self.order.len() {
            return Err(EngineError::StackImbalance);
        }
        for _ in 0..n {
            let idx = self.order.pop().expect("depth checked above");
            self.slots[idx as usize] = None;
            self.free.push(idx);
        }
        Ok(())
    }

    /// Replace the occupant of `idx` without changing the stack shape.
    pub fn reprotect(&mut self, h: Handle, idx: ProtectIndex) -> EngineResult<()> {
        match self.slots.get_mut(idx.0 as usize) {
            Some(slot @ Some(_)) => {
                *slot = Some(h);
                Ok(())
            }
            _ => Err(EngineError::BadProtectIndex),
        }
    }

    /// Release the slot `idx`, wherever it sits in the stack.
    pub fn release_index(&mut self, idx: ProtectIndex) -> EngineResult<()> {
        let pos = self
            .order
            .iter()
            .rposition(|&i| i == idx.0)
            .ok_or(EngineError::BadProtectIndex)?;
        self.order.remove(pos);
        self.slots[idx.0 as usize] = None;
        self.free.push(idx.0);
        Ok(())
    }

    pub fn depth(&self) -> usize {
        self.order.len()
    }

    /// Currently rooted handles, for the collector.
    pub fn roots(&self) -> impl Iterator<Item = Handle> + '_ {
        self.order
            .iter()
            .filter_map(|&idx| self.slots[idx as usize])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_protect_unprotect_lifo() {
        let mut stack = ProtectStack::new();
        stack.protect(Handle(1));
        stack.protect(Handle(2));
        assert_eq!(stack.depth(), 2);

        stack.unprotect(1).unwrap();
        assert_eq!(stack.depth(), 1);
        assert_eq!(stack.roots().collect::<Vec<_>>(), vec![Handle(1)]);

        stack.unprotect(1).unwrap();
        assert_eq!(stack.depth(), 0);
    }

    #[test]
    fn test_unprotect_past_depth_fails() {
        let mut stack = ProtectStack::new();
        stack.protect(Handle(1));
        assert!(matches!(
            stack.unprotect(2),
            Err(EngineError::StackImbalance)
        ));
        // The failed call must not have popped anything.
        assert_eq!(stack.depth(), 1);
    }

    #[test]
    fn test_reprotect_keeps_stack_shape() {
        let mut stack = ProtectStack::new();
        let idx = stack.protect(Handle(1));
        stack.protect(Handle(2));

        stack.reprotect(Handle(9), idx).unwrap();
        stack.reprotect(Handle(10), idx).unwrap();
        assert_eq!(stack.depth(), 2);
        assert_eq!(
            stack.roots().collect::<Vec<_>>(),
            vec![Handle(10), Handle(2)]
        );
    }

    #[test]
    fn test_release_index_out_of_order() {
        let mut stack = ProtectStack::new();
        let a = stack.protect(Handle(1));
        stack.protect(Handle(2));

        stack.release_index(a).unwrap();
        assert_eq!(stack.depth(), 1);
        assert_eq!(stack.roots().collect::<Vec<_>>(), vec![Handle(2)]);

        assert!(matches!(
            stack.release_index(a),
            Err(EngineError::BadProtectIndex)
        ));
    }

    #[test]
    fn test_reprotect_released_slot_fails() {
        let mut stack = ProtectStack::new();
        let idx = stack.protect(Handle(1));
        stack.unprotect(1).unwrap();
        assert!(matches!(
            stack.reprotect(Handle(2), idx),
            Err(EngineError::BadProtectIndex)
        ));
    }
}
