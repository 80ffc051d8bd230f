use std::cell::RefCell;

use jmespath::Runtime;
use tracing::warn;

use super::register_custom_functions;
use crate::core::CustomFunctionDescriptor;
use crate::functions::stdlib::STD_UNIT;
use crate::functions::{CustomFunctionRegistry, FunctionCatalog};

/// (JMESPath name, standard method, variadic) exposed by the thread-local runtime.
pub const STD_JMES_FUNCTIONS: [(&str, &str, bool); 5] = [
    ("upper", "ToUpper", false),
    ("lower", "ToLower", false),
    ("format", "Format", false),
    ("keyvalue_to_object", "KeyValueToObject", false),
    ("concat", "Concat", true),
];

/// Registry holding the standard functions under their JMESPath names.
pub fn std_registry() -> CustomFunctionRegistry {
    let catalog = FunctionCatalog::with_std();
    let mut registry = CustomFunctionRegistry::new();
    for (name, method, variadic) in STD_JMES_FUNCTIONS {
        let descriptor =
            CustomFunctionDescriptor::new(Some(STD_UNIT), None, method, Some(name), variadic);
        if let Err(e) = registry.register(&descriptor, &catalog) {
            warn!("Standard JMESPath function '{name}' unavailable: {e}");
        }
    }
    registry
}

thread_local! {
    static RUNTIME: RefCell<Runtime> = RefCell::new({
        let mut rt = Runtime::new();
        rt.register_builtin_functions();
        register_custom_functions(&mut rt, &std_registry());
        rt
    });
}

/// Execute a closure with a thread-local Runtime instance.
pub fn with_runtime<R>(f: impl FnOnce(&mut Runtime) -> R) -> R {
    RUNTIME.with(|cell| {
        let mut rt = cell.borrow_mut();
        f(&mut rt)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_std_registry_complete() {
        let registry = std_registry();
        assert_eq!(registry.len(), STD_JMES_FUNCTIONS.len());
        assert_eq!(registry.variadic_functions(), ["concat".to_string()]);
        assert!(registry.is_registered("keyvalue_to_object"));
        assert!(!registry.is_registered("KeyValueToObject"));
    }

    #[test]
    fn test_thread_local_runtime_has_std_functions() {
        let names: Vec<bool> = with_runtime(|rt| {
            STD_JMES_FUNCTIONS
                .iter()
                .map(|(name, _, _)| rt.get_function(name).is_some())
                .collect()
        });
        assert!(names.into_iter().all(|present| present));
    }
}
