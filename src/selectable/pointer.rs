use serde_json::Value;

use super::{AdapterKind, SelectableToken};
use crate::core::{ContextError, Result};

/// RFC 6901 JSON Pointer selection (`/a/0/b`, `""` for the whole node).
#[derive(Debug, Clone, Copy)]
pub struct JsonPointerToken<'a> {
    token: &'a Value,
}

impl<'a> JsonPointerToken<'a> {
    /// Like `select`, but borrows the selected node instead of cloning it.
    pub fn select_ref(&self, path: &str) -> Result<Option<&'a Value>> {
        if !path.is_empty() && !path.starts_with('/') {
            return Err(ContextError::Selection {
                path: path.to_string(),
                reason: "JSON pointer must be empty or start with '/'".to_string(),
            });
        }
        Ok(self.token.pointer(path))
    }
}

impl<'a> SelectableToken<'a> for JsonPointerToken<'a> {
    fn bind(token: &'a Value) -> Self {
        Self { token }
    }

    fn token(&self) -> &'a Value {
        self.token
    }

    fn kind(&self) -> AdapterKind {
        AdapterKind::Pointer
    }

    fn select(&self, path: &str) -> Result<Value> {
        Ok(self.select_ref(path)?.cloned().unwrap_or(Value::Null))
    }
}
