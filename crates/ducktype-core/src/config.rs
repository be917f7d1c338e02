//! Inference configuration

use crate::error::{DucktypeError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Name of the Python constructor method
pub const DEFAULT_INITIALIZER: &str = "__init__";

/// Options controlling class inference.
///
/// Loaded from TOML, e.g.
///
/// ```toml
/// initializer = "__init__"
/// suppress_none_assignments = true
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct InferenceConfig {
    /// Method whose parameters become the constructor signature
    pub initializer: String,
    /// When set, `self.attr = None` contributes nothing to the instance shape
    pub suppress_none_assignments: bool,
}

impl Default for InferenceConfig {
    fn default() -> Self {
        Self {
            initializer: DEFAULT_INITIALIZER.to_string(),
            suppress_none_assignments: false,
        }
    }
}

impl InferenceConfig {
    pub fn from_toml_str(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|source| DucktypeError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&content)
    }

    pub fn with_none_suppression(mut self, enabled: bool) -> Self {
        self.suppress_none_assignments = enabled;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_config() {
        let config = InferenceConfig::default();
        assert_eq!(config.initializer, "__init__");
        assert!(!config.suppress_none_assignments);
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = InferenceConfig::from_toml_str("suppress_none_assignments = true").unwrap();
        assert_eq!(config.initializer, "__init__");
        assert!(config.suppress_none_assignments);
    }

    #[test]
    fn test_unknown_field_is_rejected() {
        let result = InferenceConfig::from_toml_str("colour = \"blue\"");
        assert!(matches!(result, Err(DucktypeError::Config(_))));
    }

    #[test]
    fn test_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "initializer = \"setup\"").unwrap();
        let config = InferenceConfig::from_file(file.path()).unwrap();
        assert_eq!(config.initializer, "setup");
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let result = InferenceConfig::from_file(Path::new("/nonexistent/ducktype.toml"));
        assert!(matches!(result, Err(DucktypeError::Io { .. })));
    }
}
