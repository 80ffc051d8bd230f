//! The transformation context handed to the evaluator.
//!
//! A context owns its custom-function registry and mode settings, and borrows
//! the root input document for the duration of a run.

use std::sync::Arc;

use serde_json::Value;
use tracing::{debug, info};

use crate::config::ContextConfig;
use crate::core::{
    ContextError, CustomFunctionDescriptor, DecimalPlaces, EvaluationMode, Result,
};
use crate::functions::{CallSite, CustomFunctionRegistry, FunctionCatalog, FunctionHandle};
use crate::selectable::{AdapterKind, SelectableToken, TokenFactory};

#[derive(Debug, Clone)]
pub struct TransformContext<'doc> {
    catalog: Arc<FunctionCatalog>,
    registry: CustomFunctionRegistry,
    decimal_places: DecimalPlaces,
    evaluation_mode: EvaluationMode,
    input: Option<&'doc Value>,
}

impl Default for TransformContext<'_> {
    fn default() -> Self {
        Self::new(Arc::new(FunctionCatalog::with_std()))
    }
}

impl<'doc> TransformContext<'doc> {
    /// Empty context resolving custom functions against `catalog`.
    pub fn new(catalog: Arc<FunctionCatalog>) -> Self {
        Self {
            catalog,
            registry: CustomFunctionRegistry::new(),
            decimal_places: DecimalPlaces::default(),
            evaluation_mode: EvaluationMode::default(),
            input: None,
        }
    }

    /// Context seeded with `descriptors`, registered in order.
    ///
    /// Every descriptor is resolved before any is inserted: if one fails, the
    /// error is returned and nothing from the batch is registered.
    pub fn with_functions<'d, I>(catalog: Arc<FunctionCatalog>, descriptors: I) -> Result<Self>
    where
        I: IntoIterator<Item = &'d CustomFunctionDescriptor>,
    {
        let mut context = Self::new(catalog);
        context.register_custom_functions(descriptors)?;
        Ok(context)
    }

    pub fn from_config(config: &ContextConfig, catalog: Arc<FunctionCatalog>) -> Result<Self> {
        let mut context = Self::with_functions(catalog, &config.custom_functions)?;
        context.set_decimal_places(config.decimal_places)?;
        context.set_evaluation_mode(config.evaluation_mode());
        info!(
            "Context configured: {} custom functions, decimal_places={}, mode={:?}",
            context.registry.len(),
            context.decimal_places,
            context.evaluation_mode
        );
        Ok(context)
    }

    pub fn with_input(mut self, input: &'doc Value) -> Self {
        self.input = Some(input);
        self
    }

    pub fn set_input(&mut self, input: Option<&'doc Value>) {
        self.input = input;
    }

    pub fn input(&self) -> Option<&'doc Value> {
        self.input
    }

    pub fn catalog(&self) -> &FunctionCatalog {
        &self.catalog
    }

    pub fn registry(&self) -> &CustomFunctionRegistry {
        &self.registry
    }

    // Configuration

    pub fn decimal_places(&self) -> u8 {
        self.decimal_places.get()
    }

    /// Accepts `0..=28`; anything else fails with `InvalidConfiguration`.
    pub fn set_decimal_places(&mut self, places: i64) -> Result<()> {
        self.decimal_places = DecimalPlaces::new(places)?;
        Ok(())
    }

    /// Round `value` to the configured number of decimal places.
    pub fn round(&self, value: f64) -> f64 {
        self.decimal_places.round(value)
    }

    pub fn evaluation_mode(&self) -> EvaluationMode {
        self.evaluation_mode
    }

    pub fn set_evaluation_mode(&mut self, mode: EvaluationMode) {
        self.evaluation_mode = mode;
    }

    pub fn is_fallback_to_default(&self) -> bool {
        self.evaluation_mode.has_fallback_to_default()
    }

    pub fn is_add_or_replace_properties(&self) -> bool {
        self.evaluation_mode.has_add_or_replace_properties()
    }

    pub fn is_strict(&self) -> bool {
        self.evaluation_mode.has_strict()
    }

    // Registry

    pub fn register_custom_function(
        &mut self,
        descriptor: &CustomFunctionDescriptor,
    ) -> Result<()> {
        self.registry.register(descriptor, &self.catalog)
    }

    /// Register a batch all-or-nothing, in order.
    pub fn register_custom_functions<'d, I>(&mut self, descriptors: I) -> Result<()>
    where
        I: IntoIterator<Item = &'d CustomFunctionDescriptor>,
    {
        let mut resolved: Vec<(&CustomFunctionDescriptor, FunctionHandle)> = Vec::new();
        for descriptor in descriptors {
            let handle = self.catalog.resolve(
                descriptor.assembly_name(),
                descriptor.namespace_name(),
                &descriptor.method,
            )?;
            resolved.push((descriptor, handle));
        }
        debug!("Registering batch of {} custom functions", resolved.len());
        for (descriptor, handle) in resolved {
            self.registry
                .insert(descriptor.key(), handle, descriptor.variable_parameters);
        }
        Ok(())
    }

    pub fn unregister_custom_function(&mut self, key: &str) {
        self.registry.unregister(key);
    }

    pub fn clear_custom_function_registrations(&mut self) {
        self.registry.clear();
    }

    pub fn resolve_function(&self, key: &str) -> Result<&FunctionHandle> {
        self.registry.lookup(key)
    }

    pub fn is_custom_function(&self, key: &str) -> bool {
        self.registry.is_registered(key)
    }

    pub fn variadic_functions(&self) -> &[String] {
        self.registry.variadic_functions()
    }

    /// Handle plus argument-marshalling mode for a custom-function call site.
    pub fn call_site(&self, key: &str) -> Result<CallSite> {
        self.registry.call_site(key)
    }

    /// JMESPath runtime exposing the builtins and this context's custom functions.
    pub fn jmes_runtime(&self) -> jmespath::Runtime {
        crate::jmes::new_runtime(&self.registry)
    }

    // Tokens

    /// Wrap `node` in adapter `T`.
    pub fn resolve_token<'a, T: SelectableToken<'a>>(&self, node: &'a Value) -> T {
        TokenFactory::wrap(node)
    }

    /// Wrap the root input document for whole-document lookups.
    pub fn wrap_input(&self, kind: AdapterKind) -> Result<Box<dyn SelectableToken<'doc> + 'doc>> {
        let input = self.input.ok_or(ContextError::NoInput)?;
        Ok(TokenFactory::wrap_kind(kind, input))
    }
}
