pub mod error;
pub mod types;

pub use error::{ContextError, FunctionError, Result};
pub use types::*;
