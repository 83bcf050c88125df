//! Environment configuration and the optional field configuration file.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use serde_json::Value;
use tracing::debug;

use crate::error::ConfigError;
use crate::projection::FieldSpec;

pub const ENV_USERNAME: &str = "DATAFORSEO_USERNAME";
pub const ENV_PASSWORD: &str = "DATAFORSEO_PASSWORD";
pub const ENV_FULL_RESPONSE: &str = "DATAFORSEO_FULL_RESPONSE";
pub const ENV_SIMPLE_FILTER: &str = "DATAFORSEO_SIMPLE_FILTER";
pub const ENV_DEBUG: &str = "DEBUG";
pub const ENV_FIELD_CONFIG_PATH: &str = "FIELD_CONFIG_PATH";

/// Settings read from the process environment.
#[derive(Debug, Clone)]
pub struct Config {
    pub username: String,
    pub password: String,
    pub full_response: bool,
    pub simple_filter: bool,
    pub debug: bool,
    pub field_config_path: Option<PathBuf>,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build a config from an arbitrary variable source. Empty credentials
    /// count as missing.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let username = lookup(ENV_USERNAME).unwrap_or_default();
        let password = lookup(ENV_PASSWORD).unwrap_or_default();
        if username.is_empty() || password.is_empty() {
            return Err(ConfigError::MissingCredentials);
        }
        let flag = |name: &str| lookup(name).as_deref().map(parse_flag).unwrap_or(false);
        Ok(Self {
            username,
            password,
            full_response: flag(ENV_FULL_RESPONSE),
            simple_filter: flag(ENV_SIMPLE_FILTER),
            debug: flag(ENV_DEBUG),
            field_config_path: lookup(ENV_FIELD_CONFIG_PATH)
                .filter(|path| !path.is_empty())
                .map(PathBuf::from),
        })
    }
}

/// `true`/`1` (any case) enable a flag; everything else leaves it off.
pub fn parse_flag(value: &str) -> bool {
    value.eq_ignore_ascii_case("true") || value == "1"
}

/// Per-tool field presets loaded from a JSON file.
///
/// ```json
/// { "supported_fields": { "serp_organic_live_advanced": ["items.*.url"] } }
/// ```
///
/// Only `supported_fields` must be a mapping. Each tool entry is checked
/// when queried, so one bad entry does not hide the others.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FieldConfig {
    supported_fields: HashMap<String, Value>,
}

impl FieldConfig {
    /// Load a field configuration. A missing or malformed file yields `None`.
    pub fn load(path: &Path) -> Option<Self> {
        let raw = match fs::read_to_string(path) {
            Ok(raw) => raw,
            Err(err) => {
                debug!(path = %path.display(), %err, "field config not readable");
                return None;
            }
        };
        match serde_json::from_str(&raw) {
            Ok(config) => Some(config),
            Err(err) => {
                debug!(path = %path.display(), %err, "invalid field config format");
                None
            }
        }
    }

    /// The string entries configured for `tool`. `None` when the tool is
    /// absent or its entry is not a list.
    pub fn fields_for(&self, tool: &str) -> Option<Vec<&str>> {
        match self.supported_fields.get(tool)? {
            Value::Array(fields) => Some(fields.iter().filter_map(Value::as_str).collect()),
            other => {
                debug!(tool, entry = %other, "field config entry is not a list");
                None
            }
        }
    }

    pub fn field_spec_for(&self, tool: &str) -> Option<FieldSpec> {
        self.fields_for(tool).map(FieldSpec::from_paths)
    }
}
