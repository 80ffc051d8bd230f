#![allow(clippy::collapsible_if)]

pub mod config;
pub mod context;
pub mod core;
pub mod functions;
pub mod jmes;
pub mod logging;
pub mod selectable;

// Re-export commonly used types
pub use config::ContextConfig;
pub use context::TransformContext;
pub use core::{
    ContextError, CustomFunctionDescriptor, DecimalPlaces, EvaluationFacet, EvaluationMode,
    FunctionError,
};
pub use functions::{CallSite, CodeUnit, CustomFunctionRegistry, FunctionCatalog, FunctionHandle};
pub use selectable::{AdapterKind, JmesPathToken, JsonPointerToken, SelectableToken, TokenFactory};
