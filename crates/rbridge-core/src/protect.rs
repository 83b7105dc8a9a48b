//! Rooting discipline over the engine's protection stack.
//!
//! The free functions mirror the engine primitives one-to-one. The guards
//! exist because conversion code has many early returns: a dropped
//! [`ProtectScope`] unprotects exactly the handles it added, and a dropped
//! [`ProtectSlot`] releases its stable slot, on every exit path.

use rbridge_engine::{engine, Handle, ProtectIndex};

use crate::error::BridgeResult;

/// Root `h` at the top of the protection stack, returning it unchanged.
pub fn protect(h: Handle) -> Handle {
    engine::with(|rt| rt.protect(h))
}

/// Pop the top `n` entries of the protection stack.
///
/// Popping more than the current depth is an error and pops nothing.
pub fn unprotect(n: usize) -> BridgeResult<()> {
    engine::with(|rt| rt.unprotect(n))?;
    Ok(())
}

/// Root `h` and return a stable slot index for later re-rooting.
pub fn protect_with_index(h: Handle) -> ProtectIndex {
    engine::with(|rt| rt.protect_with_index(h))
}

/// Swap the occupant of `idx` for `h`, leaving the stack shape untouched.
pub fn reprotect(h: Handle, idx: ProtectIndex) -> BridgeResult<()> {
    engine::with(|rt| rt.reprotect(h, idx))?;
    Ok(())
}

/// Release the slot `idx`, wherever it sits in the stack.
pub fn unprotect_index(idx: ProtectIndex) -> BridgeResult<()> {
    engine::with(|rt| rt.unprotect_index(idx))?;
    Ok(())
}

/// Current protection stack depth.
pub fn depth() -> usize {
    engine::with(|rt| rt.protect_depth())
}

/// Scoped LIFO rooting: counts the handles it protects and unprotects that
/// exact count when dropped.
#[derive(Debug, Default)]
pub struct ProtectScope {
    count: usize,
}

impl ProtectScope {
    /// Open an empty scope.
    pub fn new() -> Self {
        Self::default()
    }

    /// Protect `h` within this scope and return it unchanged.
    pub fn add(&mut self, h: Handle) -> Handle {
        self.count += 1;
        protect(h)
    }

    /// Number of handles this scope currently roots.
    pub fn len(&self) -> usize {
        self.count
    }

    /// Whether the scope roots nothing.
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }
}

impl Drop for ProtectScope {
    fn drop(&mut self) {
        if self.count > 0 {
            // The scope only pops what it pushed, so this cannot underflow.
            let _ = engine::with(|rt| rt.unprotect(self.count));
        }
    }
}

/// A single re-rootable protection slot, released on drop.
///
/// Used where one accumulator is replaced step by step, such as `pluck`,
/// without growing the stack per step.
#[derive(Debug)]
pub struct ProtectSlot {
    idx: ProtectIndex,
}

impl ProtectSlot {
    /// Root `h` in a fresh stable slot.
    pub fn new(h: Handle) -> Self {
        ProtectSlot {
            idx: protect_with_index(h),
        }
    }

    /// Replace the slot's occupant with `h`.
    pub fn reprotect(&self, h: Handle) -> BridgeResult<()> {
        reprotect(h, self.idx)
    }
}

impl Drop for ProtectSlot {
    fn drop(&mut self) {
        let _ = engine::with(|rt| rt.unprotect_index(self.idx));
    }
}
