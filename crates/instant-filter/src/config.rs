//! Configuration of the two tunable tables: operator aliases and candidate
//! identity fields.
//!
//! Both are plain data and can be loaded from JSON or YAML:
//!
//! ```yaml
//! operators:
//!   eq: eq
//!   is: eq
//!   like: icontains
//! identity_fields: [id, slug]
//! reserved_prefix: "__"
//! ```
//!
//! Missing sections fall back to the built-in tables.

use std::fs;
use std::path::Path;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::error::{FilterError, Result};
use crate::identity::{IdentityFields, DEFAULT_IDENTITY_FIELDS};
use crate::params::RESERVED_PREFIX;
use crate::query::QueryCompiler;
use crate::registry::{OperatorRegistry, DEFAULT_ALIASES};

/// Serializable compiler configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FilterConfig {
    /// Operator token → canonical operator token.
    pub operators: IndexMap<String, String>,
    /// Candidate identity fields, in match order.
    pub identity_fields: Vec<String>,
    /// Prefix of keys skipped as reserved.
    pub reserved_prefix: String,
}

impl Default for FilterConfig {
    fn default() -> Self {
        FilterConfig {
            operators: DEFAULT_ALIASES
                .iter()
                .map(|(token, op)| (token.to_string(), op.as_str().to_string()))
                .collect(),
            identity_fields: DEFAULT_IDENTITY_FIELDS.iter().map(|f| f.to_string()).collect(),
            reserved_prefix: RESERVED_PREFIX.to_string(),
        }
    }
}

impl FilterConfig {
    /// Parses a JSON configuration.
    pub fn from_json_str(text: &str) -> Result<Self> {
        serde_json::from_str(text)
            .map_err(|e| FilterError::config(format!("invalid JSON configuration: {}", e)))
    }

    /// Parses a YAML configuration.
    pub fn from_yaml_str(text: &str) -> Result<Self> {
        serde_yaml::from_str(text)
            .map_err(|e| FilterError::config(format!("invalid YAML configuration: {}", e)))
    }

    /// Reads a configuration file; `.json` is parsed as JSON, anything else
    /// as YAML.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|e| {
            FilterError::config(format!("cannot read {}: {}", path.display(), e))
        })?;

        let is_json = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));

        if is_json {
            FilterConfig::from_json_str(&text)
        } else {
            FilterConfig::from_yaml_str(&text)
        }
    }

    /// Validates the tables and builds a compiler from them.
    pub fn build(&self) -> Result<QueryCompiler> {
        let registry = OperatorRegistry::from_table(&self.operators)?;
        let identity = IdentityFields::new(self.identity_fields.iter().cloned())?;

        Ok(QueryCompiler::new()
            .with_registry(registry)
            .with_identity_fields(identity)
            .with_reserved_prefix(self.reserved_prefix.clone()))
    }
}
