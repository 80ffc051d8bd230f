use bitflags::bitflags;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::error::ContextError;

/// Describes which native function to bind and under what key.
///
/// An absent or empty `assembly` searches every loaded code unit; an absent
/// `namespace` searches every namespace of the selected unit(s).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomFunctionDescriptor {
    #[serde(default)]
    pub assembly: Option<String>,
    #[serde(default)]
    pub namespace: Option<String>,
    pub method: String,
    #[serde(default)]
    pub alias: Option<String>,
    #[serde(default)]
    pub variable_parameters: bool,
}

impl CustomFunctionDescriptor {
    pub fn new(
        assembly: Option<&str>,
        namespace: Option<&str>,
        method: &str,
        alias: Option<&str>,
        variable_parameters: bool,
    ) -> Self {
        Self {
            assembly: assembly.map(str::to_string),
            namespace: namespace.map(str::to_string),
            method: method.to_string(),
            alias: alias.map(str::to_string),
            variable_parameters,
        }
    }

    /// Shorthand for a method searched across all code units and namespaces.
    pub fn method(method: &str) -> Self {
        Self::new(None, None, method, None, false)
    }

    pub fn with_alias(mut self, alias: &str) -> Self {
        self.alias = Some(alias.to_string());
        self
    }

    pub fn variadic(mut self, variable_parameters: bool) -> Self {
        self.variable_parameters = variable_parameters;
        self
    }

    /// Registry key: the alias when given and non-empty, else the method name.
    pub fn key(&self) -> &str {
        self.alias
            .as_deref()
            .filter(|s| !s.is_empty())
            .unwrap_or(&self.method)
    }

    /// Code unit to search, with empty strings treated as "all units".
    pub fn assembly_name(&self) -> Option<&str> {
        self.assembly.as_deref().filter(|s| !s.is_empty())
    }

    pub fn namespace_name(&self) -> Option<&str> {
        self.namespace.as_deref().filter(|s| !s.is_empty())
    }
}

bitflags! {
    /// Flags the evaluator consults when a path is missing, when an output
    /// property already exists, or when input is malformed.
    ///
    /// Facets are independent; any combination, including empty, is valid.
    /// Precedence between `STRICT` and `FALLBACK_TO_DEFAULT` is the evaluator's call.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
    pub struct EvaluationMode: u16 {
        const FALLBACK_TO_DEFAULT = 1;
        const ADD_OR_REPLACE_PROPERTIES = 2;
        const STRICT = 4;
    }
}

impl EvaluationMode {
    pub fn has_fallback_to_default(&self) -> bool {
        self.contains(Self::FALLBACK_TO_DEFAULT)
    }

    pub fn has_add_or_replace_properties(&self) -> bool {
        self.contains(Self::ADD_OR_REPLACE_PROPERTIES)
    }

    pub fn has_strict(&self) -> bool {
        self.contains(Self::STRICT)
    }

    pub fn from_facets(facets: &[EvaluationFacet]) -> Self {
        facets
            .iter()
            .fold(Self::empty(), |mode, facet| mode | facet.flag())
    }

    pub fn facets(&self) -> Vec<EvaluationFacet> {
        EvaluationFacet::ALL
            .into_iter()
            .filter(|facet| self.contains(facet.flag()))
            .collect()
    }
}

impl Default for EvaluationMode {
    fn default() -> Self {
        Self::FALLBACK_TO_DEFAULT
    }
}

/// A single named evaluation-mode facet, as written in configuration files.
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
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum EvaluationFacet {
    FallbackToDefault,
    AddOrReplaceProperties,
    Strict,
}

impl EvaluationFacet {
    pub const ALL: [EvaluationFacet; 3] = [
        Self::FallbackToDefault,
        Self::AddOrReplaceProperties,
        Self::Strict,
    ];

    pub fn flag(&self) -> EvaluationMode {
        match self {
            Self::FallbackToDefault => EvaluationMode::FALLBACK_TO_DEFAULT,
            Self::AddOrReplaceProperties => EvaluationMode::ADD_OR_REPLACE_PROPERTIES,
            Self::Strict => EvaluationMode::STRICT,
        }
    }
}

const MAX_EXACT_INTEGER: f64 = 4_503_599_627_370_496.0;

/// Number of decimal places used when rounding numeric results, in `0..=28`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "i64")]
pub struct DecimalPlaces(u8);

impl DecimalPlaces {
    pub const MAX: u8 = 28;

    pub fn new(places: i64) -> Result<Self, ContextError> {
        if !(0..=i64::from(Self::MAX)).contains(&places) {
            return Err(ContextError::InvalidConfiguration(format!(
                "decimal places must be between 0 and {}, got {places}",
                Self::MAX
            )));
        }
        Ok(Self(places as u8))
    }

    pub fn get(&self) -> u8 {
        self.0
    }

    /// Round half away from zero to this many places.
    ///
    /// f64 carries about 15-17 significant digits, so large place counts are a no-op.
    pub fn round(&self, value: f64) -> f64 {
        if !value.is_finite() || self.0 > 15 {
            return value;
        }
        let factor = 10f64.powi(i32::from(self.0));
        // Past 2^52 an f64 has no fractional bits left at this scale.
        if value.abs() >= MAX_EXACT_INTEGER / factor {
            return value;
        }
        (value * factor).round() / factor
    }
}

impl Default for DecimalPlaces {
    fn default() -> Self {
        Self(Self::MAX)
    }
}

impl TryFrom<i64> for DecimalPlaces {
    type Error = ContextError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<DecimalPlaces> for i64 {
    fn from(value: DecimalPlaces) -> Self {
        i64::from(value.0)
    }
}

impl fmt::Display for DecimalPlaces {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for DecimalPlaces {
    type Err = ContextError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let places = s.trim().parse::<i64>().map_err(|e| {
            ContextError::InvalidConfiguration(format!("invalid decimal places '{s}': {e}"))
        })?;
        Self::new(places)
    }
}
