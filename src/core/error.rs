use thiserror::Error;

/// Errors raised by native custom functions when invoked.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum FunctionError {
    #[error("Argument error: {0}")]
    Argument(String),

    #[error("Type error: {0}")]
    Type(String),

    #[error("Runtime error: {0}")]
    Runtime(String),
}

/// Errors surfaced by the transformation context and its registry.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ContextError {
    #[error("Unable to find method '{method}'{}", in_namespace(.namespace))]
    FunctionNotFound {
        namespace: Option<String>,
        method: String,
    },

    #[error("Code unit '{0}' is not loaded")]
    CodeUnitNotFound(String),

    #[error("Custom function {0} is not registered")]
    UnregisteredFunction(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    #[error("Unsupported token adapter: {0}")]
    UnsupportedAdapter(String),

    #[error("Method '{method}' is declared twice in namespace '{namespace}' of code unit '{unit}'")]
    DuplicateMethod {
        unit: String,
        namespace: String,
        method: String,
    },

    #[error("Selection of '{path}' failed: {reason}")]
    Selection { path: String, reason: String },

    #[error("Custom function {key} failed: {source}")]
    Invocation {
        key: String,
        #[source]
        source: FunctionError,
    },

    #[error("Context has no input document")]
    NoInput,
}

fn in_namespace(namespace: &Option<String>) -> String {
    match namespace {
        Some(ns) => format!(" in namespace '{ns}'"),
        None => String::new(),
    }
}

pub type Result<T, E = ContextError> = std::result::Result<T, E>;
