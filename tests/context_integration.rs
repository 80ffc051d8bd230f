//! End-to-end behavior of a transformation context built from descriptors

use std::sync::Arc;

use jsonxform::{
    AdapterKind, CodeUnit, ContextConfig, ContextError, CustomFunctionDescriptor, EvaluationMode,
    FunctionCatalog, FunctionError, JsonPointerToken, SelectableToken, TokenFactory,
    TransformContext,
};
use pretty_assertions::assert_eq;
use serde_json::{Value, json};

fn acme_catalog() -> Arc<FunctionCatalog> {
    let mut catalog = FunctionCatalog::with_std();
    let unit = CodeUnit::new("Acme")
        .function("Acme.Util", "Greet", |args: &[Value]| match args {
            [Value::String(name)] => Ok(json!(format!("hello {name}"))),
            _ => Err(FunctionError::Argument("Greet takes one string".to_string())),
        })
        .unwrap()
        .function("Acme.Util", "Sum", |args: &[Value]| {
            let items = match args {
                [Value::Array(items)] => items.as_slice(),
                _ => args,
            };
            Ok(json!(items.iter().filter_map(Value::as_f64).sum::<f64>()))
        })
        .unwrap();
    catalog.load(unit);
    Arc::new(catalog)
}

#[test]
fn upper_alias_scenario() {
    let descriptors = vec![CustomFunctionDescriptor::method("ToUpper").with_alias("upper")];
    let ctx = TransformContext::with_functions(acme_catalog(), &descriptors).unwrap();

    let handle = ctx.resolve_function("upper").unwrap();
    assert_eq!(handle.invoke(&[json!("abc")]).unwrap(), json!("ABC"));

    // Only the alias is bound when one is supplied.
    assert!(ctx.is_custom_function("upper"));
    assert!(!ctx.is_custom_function("ToUpper"));
}

#[test]
fn registered_handle_matches_direct_invocation() {
    let catalog = acme_catalog();
    let mut ctx = TransformContext::new(catalog.clone());
    ctx.register_custom_function(&CustomFunctionDescriptor::new(
        Some("Acme"),
        Some("Acme.Util"),
        "Greet",
        None,
        false,
    ))
    .unwrap();

    let direct = catalog.resolve(Some("Acme"), Some("Acme.Util"), "Greet").unwrap();
    let registered = ctx.resolve_function("Greet").unwrap();
    for input in [json!("ann"), json!(5)] {
        assert_eq!(
            registered.invoke(&[input.clone()]),
            direct.invoke(&[input])
        );
    }
}

#[test]
fn register_then_unregister_same_key() {
    let mut ctx = TransformContext::new(acme_catalog());
    let descriptor = CustomFunctionDescriptor::method("Sum").with_alias("total").variadic(true);
    ctx.register_custom_function(&descriptor).unwrap();
    ctx.unregister_custom_function(descriptor.key());

    assert!(!ctx.is_custom_function("total"));
    assert_eq!(
        ctx.resolve_function("total").unwrap_err(),
        ContextError::UnregisteredFunction("total".to_string())
    );
    assert!(ctx.variadic_functions().is_empty());
}

#[test]
fn clear_forgets_everything() {
    let mut ctx = TransformContext::new(acme_catalog());
    let descriptors = [
        CustomFunctionDescriptor::method("Sum").variadic(true),
        CustomFunctionDescriptor::method("Greet"),
        CustomFunctionDescriptor::method("Concat").with_alias("cat").variadic(true),
    ];
    ctx.register_custom_functions(&descriptors).unwrap();
    assert_eq!(ctx.variadic_functions().len(), 2);

    ctx.clear_custom_function_registrations();
    for d in &descriptors {
        assert!(!ctx.is_custom_function(d.key()));
    }
    assert!(ctx.variadic_functions().is_empty());
}

#[test]
fn same_alias_last_write_wins() {
    let mut ctx = TransformContext::new(acme_catalog());
    let sum = CustomFunctionDescriptor::method("Sum").with_alias("f").variadic(true);
    ctx.register_custom_function(&sum).unwrap();
    assert_eq!(ctx.variadic_functions(), ["f".to_string()]);

    ctx.register_custom_function(&CustomFunctionDescriptor::method("Greet").with_alias("f"))
        .unwrap();
    assert!(ctx.variadic_functions().is_empty());

    let site = ctx.call_site("f").unwrap();
    assert!(!site.variadic);
    assert_eq!(site.invoke(vec![json!("bo")]).unwrap(), json!("hello bo"));
}

#[test]
fn variadic_call_site_packs_arguments() {
    let mut ctx = TransformContext::new(acme_catalog());
    ctx.register_custom_function(&CustomFunctionDescriptor::method("Sum").variadic(true))
        .unwrap();
    let site = ctx.call_site("Sum").unwrap();
    assert_eq!(
        site.marshal(vec![json!(1), json!(2)]),
        vec![json!([1, 2])]
    );
    assert_eq!(
        site.invoke(vec![json!(1), json!(2), json!(3)]).unwrap().as_f64(),
        Some(6.0)
    );
}

#[test]
fn resolution_failures() {
    let mut ctx = TransformContext::new(acme_catalog());

    let missing_method =
        CustomFunctionDescriptor::new(None, Some("Acme.Util"), "DoesNotExist", None, false);
    assert_eq!(
        ctx.register_custom_function(&missing_method).unwrap_err(),
        ContextError::FunctionNotFound {
            namespace: Some("Acme.Util".to_string()),
            method: "DoesNotExist".to_string(),
        }
    );

    let missing_unit = CustomFunctionDescriptor::new(Some("Nope"), None, "Greet", None, false);
    assert_eq!(
        ctx.register_custom_function(&missing_unit).unwrap_err(),
        ContextError::CodeUnitNotFound("Nope".to_string())
    );
    assert!(ctx.registry().is_empty());
}

#[test]
fn decimal_places_contract() {
    let mut ctx = TransformContext::default();
    for n in 0..=28 {
        assert!(ctx.set_decimal_places(n).is_ok());
    }
    for n in [-1, 29] {
        assert!(matches!(
            ctx.set_decimal_places(n),
            Err(ContextError::InvalidConfiguration(_))
        ));
    }
}

#[test]
fn config_drives_context() {
    let config = ContextConfig::from_json5(
        r#"{
            decimal_places: 2,
            evaluation_mode: ["strict"],
            custom_functions: [
                {
                    assembly: "Acme",
                    namespace: "Acme.Util",
                    method: "Sum",
                    alias: "sum",
                    variable_parameters: true,
                },
                { method: "ToLower", alias: "lower" },
            ],
        }"#,
    )
    .unwrap();
    let ctx = TransformContext::from_config(&config, acme_catalog()).unwrap();

    assert_eq!(ctx.decimal_places(), 2);
    assert_eq!(ctx.evaluation_mode(), EvaluationMode::STRICT);
    assert_eq!(ctx.registry().keys(), vec!["lower", "sum"]);
    assert_eq!(ctx.variadic_functions(), ["sum".to_string()]);
    assert_eq!(ctx.round(1.005_1), 1.01);

    let bad = ContextConfig {
        decimal_places: 40,
        ..ContextConfig::default()
    };
    assert!(matches!(
        TransformContext::from_config(&bad, acme_catalog()),
        Err(ContextError::InvalidConfiguration(_))
    ));
}

#[test]
fn tokens_over_input_document() {
    let doc = json!({
        "customer": {"name": "Ann", "orders": [{"total": 10}, {"total": 32}]}
    });
    let mut ctx = TransformContext::new(acme_catalog()).with_input(&doc);
    let sum = CustomFunctionDescriptor::method("Sum").with_alias("sum").variadic(true);
    ctx.register_custom_function(&sum).unwrap();

    let pointer = ctx.wrap_input(AdapterKind::Pointer).unwrap();
    assert_eq!(pointer.select("/customer/name").unwrap(), json!("Ann"));

    let rt = ctx.jmes_runtime();
    let jmes: jsonxform::JmesPathToken = TokenFactory::wrap(ctx.input().unwrap());
    assert_eq!(
        jmes.select_with(&rt, "sum(customer.orders[0].total, customer.orders[1].total)")
            .unwrap()
            .as_f64(),
        Some(42.0)
    );

    let orders: JsonPointerToken = ctx.resolve_token(&doc["customer"]["orders"]);
    assert_eq!(orders.select("/1/total").unwrap(), json!(32));

    assert!(matches!(
        TokenFactory::wrap_named("xpath", &doc),
        Err(ContextError::UnsupportedAdapter(_))
    ));
}
