use jmespath::functions::{ArgumentType, CustomFunction, Signature};
use jmespath::{Context, ErrorReason, JmespathError, Rcvar, Runtime, Variable};
use serde_json::Value;

use crate::functions::{CustomFunctionRegistry, FunctionHandle};

/// Register every function in `registry` on `runtime` under its registry key.
pub fn register_custom_functions(runtime: &mut Runtime, registry: &CustomFunctionRegistry) {
    for (key, handle) in registry.iter() {
        register_handle(runtime, key, handle.clone(), registry.is_variadic(key));
    }
}

/// Expose one handle as a JMESPath function accepting any number of arguments.
///
/// Variadic handles receive their arguments packed into a single array, the same
/// marshalling a transformation call site applies.
pub fn register_handle(runtime: &mut Runtime, key: &str, handle: FunctionHandle, variadic: bool) {
    let name = key.to_string();
    runtime.register_function(
        key,
        Box::new(CustomFunction::new(
            Signature::new(vec![], Some(ArgumentType::Any)),
            Box::new(move |args: &[Rcvar], ctx: &mut Context| {
                let mut values = Vec::with_capacity(args.len());
                for arg in args {
                    let value = serde_json::to_value(&**arg)
                        .map_err(|e| runtime_error(ctx, format!("{name}: {e}")))?;
                    values.push(value);
                }
                let values = if variadic {
                    vec![Value::Array(values)]
                } else {
                    values
                };

                let result = handle.invoke(&values).map_err(|e| {
                    runtime_error(ctx, format!("invocation of custom function {name} failed: {e}"))
                })?;
                let var = Variable::try_from(result)?;
                Ok(Rcvar::new(var))
            }),
        )),
    );
}

// jmespath's RuntimeError variants only describe builtin argument checks, so host
// failures ride on ErrorReason::Parse. The message says it is an invocation failure.
fn runtime_error(ctx: &Context, message: String) -> JmespathError {
    JmespathError::new(ctx.expression, ctx.offset, ErrorReason::Parse(message))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::CustomFunctionDescriptor;
    use crate::functions::FunctionCatalog;
    use serde_json::json;

    fn search(rt: &Runtime, expr: &str, data: &Value) -> Result<Value, JmespathError> {
        let expr = rt.compile(expr)?;
        let var = Variable::try_from(data.clone())?;
        let result = expr.search(&var)?;
        Ok(serde_json::to_value(&*result).unwrap())
    }

    #[test]
    fn test_registered_functions_callable() {
        let catalog = FunctionCatalog::with_std();
        let mut registry = CustomFunctionRegistry::new();
        registry
            .register(&CustomFunctionDescriptor::method("ToUpper").with_alias("shout"), &catalog)
            .unwrap();
        registry
            .register(
                &CustomFunctionDescriptor::method("Concat")
                    .with_alias("cat")
                    .variadic(true),
                &catalog,
            )
            .unwrap();

        let mut rt = Runtime::new();
        rt.register_builtin_functions();
        register_custom_functions(&mut rt, &registry);

        let data = json!({"first": "ada", "last": "lovelace"});
        assert_eq!(search(&rt, "shout(first)", &data).unwrap(), json!("ADA"));
        assert_eq!(
            search(&rt, "cat(first, ' ', last)", &data).unwrap(),
            json!("ada lovelace")
        );
    }

    #[test]
    fn test_function_failure_surfaces_as_error() {
        let catalog = FunctionCatalog::with_std();
        let mut registry = CustomFunctionRegistry::new();
        registry
            .register(&CustomFunctionDescriptor::method("Count"), &catalog)
            .unwrap();
        let mut rt = Runtime::new();
        register_custom_functions(&mut rt, &registry);

        let err = search(&rt, "Count(name)", &json!({"name": "x"})).unwrap_err();
        let message = err.to_string();
        assert!(message.contains("Count"));
        assert!(message.contains("invocation of custom function"));
    }
}
