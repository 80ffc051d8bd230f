//! JMESPath runtime wiring
//!
//! Registered custom functions are exposed to JMESPath expressions under their
//! registry keys. A thread-local runtime carries the builtins plus the standard
//! code unit for adapters that are not tied to a context.

mod functions;
mod runtime;

pub use functions::{register_custom_functions, register_handle};
pub use runtime::{STD_JMES_FUNCTIONS, std_registry, with_runtime};

use crate::functions::CustomFunctionRegistry;

/// Create a new `Runtime` with built-in functions and every function in `registry`.
pub fn new_runtime(registry: &CustomFunctionRegistry) -> jmespath::Runtime {
    let mut rt = jmespath::Runtime::new();
    rt.register_builtin_functions();
    register_custom_functions(&mut rt, registry);
    rt
}
