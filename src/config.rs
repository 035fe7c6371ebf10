//! Deployment-level configuration, independent of anything carried on the wire
//! per-message.

use serde::Deserialize;
use std::path::Path;

use crate::error::{CrudError, CrudResult};

fn default_allow_offset() -> bool {
    true
}

/// Knobs a deployment needs beyond what a CRUD message itself carries.
#[derive(Debug, Clone, Deserialize)]
pub struct CrudConfig {
    /// Schema used to resolve an unqualified function name in `Expr::FuncCall`
    /// when the message doesn't qualify it itself.
    pub default_schema: Option<String>,

    /// Whether `Update`/`Find` messages may carry a `LIMIT ... OFFSET ...`.
    #[serde(default = "default_allow_offset")]
    pub allow_offset_without_limit: bool,
}

impl Default for CrudConfig {
    fn default() -> Self {
        Self { default_schema: None, allow_offset_without_limit: true }
    }
}

impl CrudConfig {
    pub fn builder() -> CrudConfigBuilder {
        CrudConfigBuilder::default()
    }

    pub fn from_toml_str(s: &str) -> CrudResult<Self> {
        toml::from_str(s).map_err(|e| CrudError::Config(e.to_string()))
    }

    pub fn from_file(path: impl AsRef<Path>) -> CrudResult<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_toml_str(&text)
    }
}

/// Fluent builder mirroring the construction style used elsewhere in this
/// crate's ecosystem for config structs assembled programmatically rather
/// than loaded from a file.
#[derive(Default)]
pub struct CrudConfigBuilder {
    default_schema: Option<String>,
    allow_offset_without_limit: Option<bool>,
}

impl CrudConfigBuilder {
    pub fn default_schema(mut self, schema: impl Into<String>) -> Self {
        self.default_schema = Some(schema.into());
        self
    }

    pub fn allow_offset_without_limit(mut self, allow: bool) -> Self {
        self.allow_offset_without_limit = Some(allow);
        self
    }

    pub fn build(self) -> CrudConfig {
        CrudConfig {
            default_schema: self.default_schema,
            allow_offset_without_limit: self.allow_offset_without_limit.unwrap_or(true),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let cfg = CrudConfig::default();
        assert_eq!(cfg.default_schema, None);
        assert!(cfg.allow_offset_without_limit);
    }

    #[test]
    fn test_builder() {
        let cfg = CrudConfig::builder().default_schema("db").allow_offset_without_limit(false).build();
        assert_eq!(cfg.default_schema.as_deref(), Some("db"));
        assert!(!cfg.allow_offset_without_limit);
    }

    #[test]
    fn test_from_toml_str() {
        let cfg = CrudConfig::from_toml_str("default_schema = \"db\"\n").unwrap();
        assert_eq!(cfg.default_schema.as_deref(), Some("db"));
        assert!(cfg.allow_offset_without_limit);
    }
}
