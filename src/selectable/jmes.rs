use jmespath::{Runtime, Variable};
use serde_json::Value;

use super::{AdapterKind, SelectableToken};
use crate::core::{ContextError, Result};

/// JMESPath selection over the bound node.
///
/// `select` uses the thread-local runtime (builtins plus the standard functions);
/// `select_with` evaluates against a caller-supplied runtime, e.g. one carrying a
/// context's registered custom functions.
#[derive(Debug, Clone, Copy)]
pub struct JmesPathToken<'a> {
    token: &'a Value,
}

impl<'a> JmesPathToken<'a> {
    pub fn select_with(&self, runtime: &Runtime, path: &str) -> Result<Value> {
        let selection_error = |reason: String| ContextError::Selection {
            path: path.to_string(),
            reason,
        };
        let expr = runtime
            .compile(path)
            .map_err(|e| selection_error(format!("JMESPath compile error: {e}")))?;
        let var = Variable::try_from(self.token.clone())
            .map_err(|e| selection_error(format!("JMESPath conversion error: {e}")))?;
        let result = expr
            .search(&var)
            .map_err(|e| selection_error(format!("JMESPath search error: {e}")))?;
        serde_json::to_value(&*result).map_err(|e| selection_error(e.to_string()))
    }
}

impl<'a> SelectableToken<'a> for JmesPathToken<'a> {
    fn bind(token: &'a Value) -> Self {
        Self { token }
    }

    fn token(&self) -> &'a Value {
        self.token
    }

    fn kind(&self) -> AdapterKind {
        AdapterKind::JmesPath
    }

    fn select(&self, path: &str) -> Result<Value> {
        crate::jmes::with_runtime(|rt| self.select_with(rt, path))
    }
}
