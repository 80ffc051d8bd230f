//! Selectable tokens: typed views over a JSON sub-tree that answer path selections.
//!
//! The set of adapters is closed. `TokenFactory` builds one either statically
//! (`wrap::<T>`) or from an `AdapterKind` chosen at run time.

mod jmes;
mod pointer;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::str::FromStr;

use crate::core::{ContextError, Result};

pub use jmes::JmesPathToken;
pub use pointer::JsonPointerToken;

/// Names of the adapters the factory can build.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
    strum::EnumIter,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum AdapterKind {
    #[strum(to_string = "jmespath", serialize = "jmes")]
    JmesPath,
    #[strum(to_string = "pointer", serialize = "jsonpointer")]
    Pointer,
}

/// A view over a borrowed JSON node offering one path-selection capability.
pub trait SelectableToken<'a> {
    /// Bind a new adapter to `token`. The adapter borrows; it never copies the node.
    fn bind(token: &'a Value) -> Self
    where
        Self: Sized;

    fn token(&self) -> &'a Value;

    fn kind(&self) -> AdapterKind;

    /// Evaluate `path` against the bound node. Missing paths select `null`.
    fn select(&self, path: &str) -> Result<Value>;
}

impl AdapterKind {
    /// Parse an adapter name, failing with `UnsupportedAdapter` for unknown names.
    pub fn parse(name: &str) -> Result<Self> {
        Self::from_str(name).map_err(|_| ContextError::UnsupportedAdapter(name.to_string()))
    }
}

pub struct TokenFactory;

impl TokenFactory {
    pub fn wrap<'a, T: SelectableToken<'a>>(node: &'a Value) -> T {
        T::bind(node)
    }

    pub fn wrap_kind<'a>(kind: AdapterKind, node: &'a Value) -> Box<dyn SelectableToken<'a> + 'a> {
        match kind {
            AdapterKind::JmesPath => Box::new(JmesPathToken::bind(node)),
            AdapterKind::Pointer => Box::new(JsonPointerToken::bind(node)),
        }
    }

    /// Build the adapter named `name`, failing for names outside the known set.
    pub fn wrap_named<'a>(
        name: &str,
        node: &'a Value,
    ) -> Result<Box<dyn SelectableToken<'a> + 'a>> {
        Ok(Self::wrap_kind(AdapterKind::parse(name)?, node))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use strum::IntoEnumIterator;

    #[test]
    fn test_adapter_kind_names() {
        assert_eq!(AdapterKind::from_str("JMESPath").unwrap(), AdapterKind::JmesPath);
        assert_eq!(AdapterKind::from_str("jmes").unwrap(), AdapterKind::JmesPath);
        assert_eq!(AdapterKind::from_str("pointer").unwrap(), AdapterKind::Pointer);
        assert_eq!(AdapterKind::JmesPath.to_string(), "jmespath");
        assert_eq!(AdapterKind::iter().count(), 2);
    }

    #[test]
    fn test_wrap_binds_without_copying() {
        let doc = json!({"a": {"b": 1}});
        let token: JsonPointerToken = TokenFactory::wrap(&doc);
        assert!(std::ptr::eq(token.token(), &doc));
        assert_eq!(token.kind(), AdapterKind::Pointer);
    }

    #[test]
    fn test_wrap_kind_dispatch() {
        let doc = json!({"a": {"b": 1}});
        for kind in AdapterKind::iter() {
            let token = TokenFactory::wrap_kind(kind, &doc);
            assert_eq!(token.kind(), kind);
            assert!(std::ptr::eq(token.token(), &doc));
        }
    }

    #[test]
    fn test_wrap_named_unsupported() {
        let doc = json!({});
        match TokenFactory::wrap_named("jsonpath", &doc) {
            Err(ContextError::UnsupportedAdapter(name)) => assert_eq!(name, "jsonpath"),
            Err(other) => panic!("unexpected error: {other}"),
            Ok(_) => panic!("jsonpath adapter should not be constructible"),
        }
        let token = TokenFactory::wrap_named("jmespath", &doc).unwrap();
        assert_eq!(token.kind(), AdapterKind::JmesPath);
    }
}
