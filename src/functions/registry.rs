use std::collections::HashMap;

use serde_json::Value;
use tracing::{debug, warn};

use super::{FunctionCatalog, FunctionHandle};
use crate::core::{ContextError, CustomFunctionDescriptor, Result};

/// Live mapping from alias-or-name to handle, plus the keys whose call sites
/// pass their arguments as a single array.
///
/// Mutations take `&mut self`; callers sharing a registry across evaluations
/// must serialize writes themselves. `generation` increases on every change.
#[derive(Debug, Clone, Default)]
pub struct CustomFunctionRegistry {
    entries: HashMap<String, FunctionHandle>,
    // Always a subset of `entries` keys, kept in insertion order.
    variadic: Vec<String>,
    generation: u64,
}

impl CustomFunctionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolve `descriptor` against `catalog` and bind it under its key.
    ///
    /// An existing entry with the same key is overwritten and its variadic mark
    /// re-evaluated. On resolution failure the registry is left untouched.
    pub fn register(
        &mut self,
        descriptor: &CustomFunctionDescriptor,
        catalog: &FunctionCatalog,
    ) -> Result<()> {
        let handle = catalog.resolve(
            descriptor.assembly_name(),
            descriptor.namespace_name(),
            &descriptor.method,
        )?;
        self.insert(descriptor.key(), handle, descriptor.variable_parameters);
        Ok(())
    }

    /// Bind an already resolved handle.
    pub fn insert(&mut self, key: &str, handle: FunctionHandle, variable_parameters: bool) {
        match self.entries.insert(key.to_string(), handle) {
            Some(previous) => warn!(
                "Custom function '{key}' re-registered, replacing {}",
                previous.qualified_name()
            ),
            None => debug!("Registered custom function '{key}'"),
        }
        self.variadic.retain(|k| k != key);
        if variable_parameters {
            self.variadic.push(key.to_string());
        }
        self.generation += 1;
    }

    /// Remove `key`; absent keys are ignored.
    pub fn unregister(&mut self, key: &str) {
        if self.entries.remove(key).is_some() {
            self.variadic.retain(|k| k != key);
            self.generation += 1;
            debug!("Unregistered custom function '{key}'");
        }
    }

    pub fn clear(&mut self) {
        debug!("Clearing {} custom function registrations", self.entries.len());
        self.entries.clear();
        self.variadic.clear();
        self.generation += 1;
    }

    pub fn lookup(&self, key: &str) -> Result<&FunctionHandle> {
        self.entries
            .get(key)
            .ok_or_else(|| ContextError::UnregisteredFunction(key.to_string()))
    }

    pub fn is_registered(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    pub fn is_variadic(&self, key: &str) -> bool {
        self.variadic.iter().any(|k| k == key)
    }

    /// Keys marked variadic, in the order they were registered.
    pub fn variadic_functions(&self) -> &[String] {
        &self.variadic
    }

    /// Registered keys, sorted.
    pub fn keys(&self) -> Vec<&str> {
        let mut keys: Vec<&str> = self.entries.keys().map(String::as_str).collect();
        keys.sort_unstable();
        keys
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &FunctionHandle)> {
        self.entries.iter().map(|(k, h)| (k.as_str(), h))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// What an evaluator needs at a call site: the handle and how to pass arguments.
    pub fn call_site(&self, key: &str) -> Result<CallSite> {
        let handle = self.lookup(key)?.clone();
        Ok(CallSite {
            key: key.to_string(),
            handle,
            variadic: self.is_variadic(key),
        })
    }
}

/// A resolved custom-function call site.
#[derive(Debug, Clone)]
pub struct CallSite {
    pub key: String,
    pub handle: FunctionHandle,
    /// When set, evaluated arguments are packed into one array argument.
    pub variadic: bool,
}

impl CallSite {
    pub fn marshal(&self, args: Vec<Value>) -> Vec<Value> {
        if self.variadic {
            vec![Value::Array(args)]
        } else {
            args
        }
    }

    pub fn invoke(&self, args: Vec<Value>) -> Result<Value> {
        let marshalled = self.marshal(args);
        self.handle
            .invoke(&marshalled)
            .map_err(|source| ContextError::Invocation {
                key: self.key.clone(),
                source,
            })
    }
}
