//! Shelters: named root sets for batch lifetime management.
//!
//! A shelter records every handle kept under its id so the whole set can be
//! torn down with one [`purge`] when the host-side context that owned them
//! disappears. Keeping is unconditional at the heap level: the handle goes on
//! the engine's precious list first, and only then is it recorded, so a
//! registry failure never leaves an unrooted object behind.

use std::cell::RefCell;

use rbridge_engine::{engine, Handle};
use rustc_hash::FxHashMap;

use crate::error::{BridgeError, BridgeResult};

/// Opaque shelter token, minted by the host layer.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ShelterId(String);

impl ShelterId {
    /// Wrap a host-minted token.
    pub fn new(id: impl Into<String>) -> Self {
        ShelterId(id.into())
    }

    /// The token text.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for ShelterId {
    fn from(id: &str) -> Self {
        ShelterId::new(id)
    }
}

thread_local! {
    static SHELTERS: RefCell<FxHashMap<String, Vec<Handle>>> =
        RefCell::new(FxHashMap::default());
}

/// Register an empty shelter. Re-registering an existing id keeps its
/// current contents.
pub fn register(id: &ShelterId) {
    SHELTERS.with(|shelters| {
        shelters
            .borrow_mut()
            .entry(id.0.clone())
            .or_default();
    });
}

/// Preserve `h` against collection, recording it in `shelter` when one is
/// given.
///
/// Preservation happens before the registry lookup, so an unknown shelter id
/// leaves the object kept (but untracked) and returns an error.
pub fn keep(shelter: Option<&ShelterId>, h: Handle) -> BridgeResult<Handle> {
    engine::with(|rt| rt.preserve(h));
    if let Some(id) = shelter {
        SHELTERS.with(|shelters| {
            match shelters.borrow_mut().get_mut(&id.0) {
                Some(kept) => {
                    kept.push(h);
                    Ok(())
                }
                None => Err(BridgeError::UnknownShelter(id.0.clone())),
            }
        })?;
    }
    Ok(h)
}

/// Release `h` and remove it from `shelter`.
///
/// The handle must be recorded in the shelter; destroying twice fails.
pub fn destroy(shelter: &ShelterId, h: Handle) -> BridgeResult<()> {
    SHELTERS.with(|shelters| {
        let mut shelters = shelters.borrow_mut();
        let kept = shelters
            .get_mut(&shelter.0)
            .ok_or_else(|| BridgeError::UnknownShelter(shelter.0.clone()))?;
        let pos = kept
            .iter()
            .rposition(|&kept_h| kept_h == h)
            .ok_or(BridgeError::NotInShelter)?;
        kept.remove(pos);
        Ok::<(), BridgeError>(())
    })?;
    engine::with(|rt| rt.release(h))?;
    Ok(())
}

/// Release everything in `shelter`, best effort.
///
/// Individual release failures are reported and skipped; the shelter is
/// always left registered and empty.
pub fn purge(shelter: &ShelterId) -> BridgeResult<()> {
    let kept = SHELTERS.with(|shelters| {
        shelters
            .borrow_mut()
            .get_mut(&shelter.0)
            .map(std::mem::take)
            .ok_or_else(|| BridgeError::UnknownShelter(shelter.0.clone()))
    })?;
    for h in kept {
        if let Err(err) = engine::with(|rt| rt.release(h)) {
            eprintln!("Failed to release object from shelter '{}': {}", shelter.0, err);
        }
    }
    Ok(())
}

/// Number of handles currently recorded in `shelter`.
pub fn size(shelter: &ShelterId) -> BridgeResult<usize> {
    SHELTERS.with(|shelters| {
        shelters
            .borrow()
            .get(&shelter.0)
            .map(Vec::len)
            .ok_or_else(|| BridgeError::UnknownShelter(shelter.0.clone()))
    })
}
