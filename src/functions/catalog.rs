use serde_json::Value;
use tracing::{debug, trace};

use super::{FunctionHandle, stdlib};
use crate::core::{ContextError, FunctionError, Result};

#[derive(Debug, Clone)]
struct Declared {
    namespace: String,
    method: String,
    handle: FunctionHandle,
}

/// A named table of native functions grouped by namespace.
///
/// Functions keep their declaration order, which is the resolver's tie-break
/// when the namespace is omitted.
#[derive(Debug, Clone)]
pub struct CodeUnit {
    name: String,
    functions: Vec<Declared>,
}

impl CodeUnit {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            functions: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Declare `namespace.method`. A second declaration of the same pair is rejected.
    pub fn function<F>(mut self, namespace: &str, method: &str, func: F) -> Result<Self>
    where
        F: Fn(&[Value]) -> std::result::Result<Value, FunctionError> + Send + Sync + 'static,
    {
        if self
            .functions
            .iter()
            .any(|d| d.namespace == namespace && d.method == method)
        {
            return Err(ContextError::DuplicateMethod {
                unit: self.name.clone(),
                namespace: namespace.to_string(),
                method: method.to_string(),
            });
        }
        let qualified = format!("{}::{namespace}.{method}", self.name);
        self.functions.push(Declared {
            namespace: namespace.to_string(),
            method: method.to_string(),
            handle: FunctionHandle::new(qualified, func),
        });
        Ok(self)
    }

    pub fn namespaces(&self) -> Vec<&str> {
        let mut out: Vec<&str> = Vec::new();
        for d in &self.functions {
            if !out.contains(&d.namespace.as_str()) {
                out.push(&d.namespace);
            }
        }
        out
    }

    pub fn len(&self) -> usize {
        self.functions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.functions.is_empty()
    }

    fn find(&self, namespace: Option<&str>, method: &str) -> Option<&FunctionHandle> {
        self.functions
            .iter()
            .find(|d| d.method == method && namespace.is_none_or(|ns| d.namespace == ns))
            .map(|d| &d.handle)
    }
}

/// The set of code units a resolver may search, in load order.
#[derive(Debug, Clone, Default)]
pub struct FunctionCatalog {
    units: Vec<CodeUnit>,
}

impl FunctionCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Catalog with the standard code unit loaded.
    pub fn with_std() -> Self {
        let mut catalog = Self::new();
        catalog.load(stdlib::code_unit());
        catalog
    }

    /// Load a unit, replacing any loaded unit with the same name in place.
    pub fn load(&mut self, unit: CodeUnit) {
        if let Some(existing) = self.units.iter_mut().find(|u| u.name == unit.name) {
            debug!("Reloading code unit '{}' ({} functions)", unit.name, unit.len());
            *existing = unit;
        } else {
            debug!("Loading code unit '{}' ({} functions)", unit.name, unit.len());
            self.units.push(unit);
        }
    }

    pub fn unit(&self, name: &str) -> Option<&CodeUnit> {
        self.units.iter().find(|u| u.name == name)
    }

    pub fn unit_names(&self) -> Vec<&str> {
        self.units.iter().map(|u| u.name.as_str()).collect()
    }

    /// Locate `method`, optionally restricted to one code unit and/or namespace.
    ///
    /// Empty strings are treated the same as `None`. The first declared match wins.
    pub fn resolve(
        &self,
        assembly: Option<&str>,
        namespace: Option<&str>,
        method: &str,
    ) -> Result<FunctionHandle> {
        let assembly = assembly.filter(|s| !s.is_empty());
        let namespace = namespace.filter(|s| !s.is_empty());

        let found = match assembly {
            Some(name) => self
                .unit(name)
                .ok_or_else(|| ContextError::CodeUnitNotFound(name.to_string()))?
                .find(namespace, method),
            None => self.units.iter().find_map(|u| u.find(namespace, method)),
        };

        match found {
            Some(handle) => {
                trace!("Resolved '{method}' to {}", handle.qualified_name());
                Ok(handle.clone())
            }
            None => Err(ContextError::FunctionNotFound {
                namespace: namespace.map(str::to_string),
                method: method.to_string(),
            }),
        }
    }
}
