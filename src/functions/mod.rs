//! Custom functions: executable handles, the catalog of loaded code units the
//! resolver searches, the per-context registry, and the standard code unit.

pub mod catalog;
pub mod registry;
pub mod stdlib;

use std::fmt;
use std::sync::Arc;

use serde_json::Value;

use crate::core::FunctionError;

pub use catalog::{CodeUnit, FunctionCatalog};
pub use registry::{CallSite, CustomFunctionRegistry};

/// Signature every native custom function implements.
pub type NativeFunction = dyn Fn(&[Value]) -> Result<Value, FunctionError> + Send + Sync;

/// Invokable reference to a located function.
///
/// Cloning shares the underlying function; handles are never mutated after resolution.
#[derive(Clone)]
pub struct FunctionHandle {
    qualified_name: Arc<str>,
    func: Arc<NativeFunction>,
}

impl FunctionHandle {
    pub fn new<F>(qualified_name: impl Into<Arc<str>>, func: F) -> Self
    where
        F: Fn(&[Value]) -> Result<Value, FunctionError> + Send + Sync + 'static,
    {
        Self {
            qualified_name: qualified_name.into(),
            func: Arc::new(func),
        }
    }

    /// `unit::namespace.method` of the function this handle was resolved from.
    pub fn qualified_name(&self) -> &str {
        &self.qualified_name
    }

    pub fn invoke(&self, args: &[Value]) -> Result<Value, FunctionError> {
        (self.func)(args)
    }

    /// True when both handles point at the same native function.
    pub fn same_function(&self, other: &FunctionHandle) -> bool {
        Arc::ptr_eq(&self.func, &other.func)
    }
}

impl fmt::Debug for FunctionHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FunctionHandle")
            .field("qualified_name", &self.qualified_name)
            .finish_non_exhaustive()
    }
}
