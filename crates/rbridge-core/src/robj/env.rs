//! Environment wrapper.
//!
//! Environments are reference objects: binding through an existing wrapper
//! mutates the environment in place rather than producing a copy. Fresh
//! environments parent the global environment so lookups fall through to the
//! runtime's own bindings.

use rbridge_engine::engine;
use rbridge_engine::{EngineResult, Handle, Tag};

use crate::data::{ConvertOptions, ObjectOptions, RData, RDataNode};
use crate::error::{BridgeError, BridgeResult};
use crate::protect::ProtectScope;
use crate::robj::{child_data, object_from_entries, wrapper, RAny, RObject};

wrapper!(
    /// An environment.
    REnvironment,
    "environment",
    Tag::Environment
);

impl REnvironment {
    /// Create an environment parented on the global environment, with one
    /// binding per entry.
    pub fn new(entries: &[(String, RData)]) -> BridgeResult<Self> {
        if entries.iter().any(|(name, _)| name.is_empty()) {
            return Err(BridgeError::EmptyBindingName);
        }

        let mut scope = ProtectScope::new();
        let mut bindings = Vec::with_capacity(entries.len());
        for (name, value) in entries {
            let obj = RObject::from_data(value.clone())?;
            bindings.push((name.as_str(), scope.add(obj.handle())));
        }

        let env = engine::with(|rt| -> EngineResult<Handle> {
            let env = rt.new_env(rt.global_env());
            rt.protect(env);
            for &(name, h) in &bindings {
                let sym = rt.install(name);
                rt.env_poke(env, sym, h)?;
            }
            rt.unprotect(1)?;
            Ok(env)
        })?;
        Ok(REnvironment(RAny::from_handle(env)))
    }

    /// Binding names. Dot-prefixed names are hidden unless `all`; `sorted`
    /// orders lexicographically instead of by binding age.
    pub fn ls(&self, all: bool, sorted: bool) -> BridgeResult<Vec<String>> {
        let env = self.handle();
        Ok(engine::with(|rt| rt.env_ls(env, all, sorted))?)
    }

    /// Define or overwrite a binding in place.
    pub fn bind(&self, name: &str, value: RAny) -> BridgeResult<()> {
        if name.is_empty() {
            return Err(BridgeError::EmptyBindingName);
        }
        let env = self.handle();
        let value = value.handle();
        engine::with(|rt| {
            let sym = rt.install(name);
            rt.env_poke(env, sym, value)
        })?;
        Ok(())
    }

    /// Local binding by name; the absence object when the binding is
    /// missing.
    pub fn get(&self, name: &str) -> BridgeResult<RObject> {
        self.0.get_dollar(name)
    }

    fn binding_handles(&self, names: &[String]) -> BridgeResult<Vec<Handle>> {
        let env = self.handle();
        Ok(engine::with(|rt| -> EngineResult<Vec<Handle>> {
            let mut out = Vec::with_capacity(names.len());
            for name in names {
                let sym = rt.install(name);
                out.push(rt.env_get_local(env, sym)?.unwrap_or(Handle::NULL));
            }
            Ok(out)
        })?)
    }

    pub(crate) fn node(&self, level: i32, opts: &ConvertOptions) -> BridgeResult<RDataNode> {
        let names = self.ls(true, true)?;
        let handles = self.binding_handles(&names)?;
        let mut values = Vec::with_capacity(handles.len());
        for h in handles {
            values.push(child_data(RObject::wrap(h)?, level + 1, opts)?);
        }
        Ok(RDataNode::Environment { names, values })
    }

    /// Collapse every binding, hidden ones included, to a keyed record.
    pub fn to_object(&self, opts: &ObjectOptions) -> BridgeResult<Vec<(String, RData)>> {
        let conv = ConvertOptions { depth: opts.depth };
        let names = self.ls(true, true)?;
        let handles = self.binding_handles(&names)?;
        let mut entries = Vec::with_capacity(handles.len());
        for (name, h) in names.into_iter().zip(handles) {
            entries.push((Some(name), child_data(RObject::wrap(h)?, 1, &conv)?));
        }
        object_from_entries(entries, opts)
    }
}
