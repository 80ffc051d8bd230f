use std::{env, path::PathBuf};

use directories::BaseDirs;
use lazy_static::lazy_static;
use serde::{Deserialize, Serialize};

use crate::core::{CustomFunctionDescriptor, EvaluationFacet, EvaluationMode};

const CONFIG: &str = include_str!("../.config/config.json5");

lazy_static! {
    pub static ref PROJECT_NAME: String = env!("CARGO_CRATE_NAME").to_uppercase().to_string();
    pub static ref CONFIG_FILE: Option<PathBuf> =
        env::var(format!("{}_CONFIG", PROJECT_NAME.clone()))
            .ok()
            .map(PathBuf::from);
}

/// Settings a `TransformContext` is built from.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ContextConfig {
    #[serde(default = "default_decimal_places")]
    pub decimal_places: i64,
    #[serde(default = "default_evaluation_mode")]
    pub evaluation_mode: Vec<EvaluationFacet>,
    #[serde(default)]
    pub custom_functions: Vec<CustomFunctionDescriptor>,
}

fn default_decimal_places() -> i64 {
    28
}

fn default_evaluation_mode() -> Vec<EvaluationFacet> {
    vec![EvaluationFacet::FallbackToDefault]
}

impl Default for ContextConfig {
    fn default() -> Self {
        Self {
            decimal_places: default_decimal_places(),
            evaluation_mode: default_evaluation_mode(),
            custom_functions: Vec::new(),
        }
    }
}

impl ContextConfig {
    /// Layer the embedded defaults, a config file, then `JSONXFORM_*` variables.
    ///
    /// The file is `config_path` when given, else `$JSONXFORM_CONFIG`, else
    /// `~/.jsonxform.json5` if it exists.
    pub fn from_path(config_path: Option<&PathBuf>) -> Result<Self, config::ConfigError> {
        let mut builder = config::Config::builder()
            .add_source(config::File::from_str(CONFIG, config::FileFormat::Json5));

        let selected_path = match config_path.or(CONFIG_FILE.as_ref()) {
            Some(p) => Some(expand_tilde(p)),
            None => Some(default_home_config_path()).filter(|p| p.exists()),
        };
        if let Some(path) = selected_path {
            builder = builder.add_source(
                config::File::from(path).format(config::FileFormat::Json5).required(true),
            );
        }

        builder = builder.add_source(
            config::Environment::with_prefix(&PROJECT_NAME)
                .try_parsing(true)
                .list_separator(",")
                .with_list_parse_key("evaluation_mode"),
        );

        builder.build()?.try_deserialize()
    }

    /// Parse a JSON5 document directly, without file or environment layering.
    pub fn from_json5(text: &str) -> Result<Self, json5::Error> {
        json5::from_str(text)
    }

    pub fn evaluation_mode(&self) -> EvaluationMode {
        EvaluationMode::from_facets(&self.evaluation_mode)
    }

    /// Serialize to JSON5 in the same shape the loader reads.
    pub fn to_json5(&self) -> Result<String, json5::Error> {
        json5::to_string(self)
    }
}

fn expand_tilde(path: &PathBuf) -> PathBuf {
    if let Some(s) = path.to_str() {
        if s.starts_with('~') {
            if let Some(base) = BaseDirs::new() {
                return PathBuf::from(s.replacen('~', base.home_dir().to_str().unwrap_or(""), 1));
            }
        }
    }
    path.clone()
}

fn default_home_config_path() -> PathBuf {
    if let Some(base) = BaseDirs::new() {
        return base.home_dir().join(".jsonxform.json5");
    }
    PathBuf::from(".jsonxform.json5")
}
