//! Validator configuration loaded from YAML or JSON.
//!
//! Every field has a default, so an empty document yields the standard
//! setup: threshold 0.8, lowercase, collapsed whitespace, `.,!?;:` stripped,
//! first-inserted KB question wins.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

/// Default similarity threshold for accepting an answer.
pub const DEFAULT_THRESHOLD: f64 = 0.8;

/// Default punctuation removed during normalization.
pub const DEFAULT_PUNCTUATION: &str = ".,!?;:";

/// Errors that can occur when loading or checking configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Failed to parse YAML: {0}")]
    YamlError(#[from] serde_yaml::Error),

    #[error("Failed to parse JSON: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("Similarity threshold must be within [0, 1], got {0}")]
    InvalidThreshold(f64),

    #[error("Invalid punctuation set {0:?}: {1}")]
    InvalidPunctuation(String, String),
}

/// Text canonicalization rules applied before comparison.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct NormalizationRules {
    pub lowercase: bool,

    /// Collapse whitespace runs to one space and trim the ends
    pub collapse_whitespace: bool,

    /// Characters removed from the text
    pub punctuation: String,
}

impl Default for NormalizationRules {
    fn default() -> Self {
        Self {
            lowercase: true,
            collapse_whitespace: true,
            punctuation: DEFAULT_PUNCTUATION.to_string(),
        }
    }
}

/// What to do when two KB questions normalize to the same key.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum DuplicatePolicy {
    /// Keep the first entry, skip later ones with a warning
    #[default]
    FirstWins,

    /// Refuse to build the index
    Reject,
}

/// Configuration for a validation run.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ValidatorConfig {
    /// Minimum similarity for a response to match its KB answer
    pub similarity_threshold: f64,

    pub normalization: NormalizationRules,

    pub duplicate_policy: DuplicatePolicy,
}

impl Default for ValidatorConfig {
    fn default() -> Self {
        Self {
            similarity_threshold: DEFAULT_THRESHOLD,
            normalization: NormalizationRules::default(),
            duplicate_policy: DuplicatePolicy::default(),
        }
    }
}

impl ValidatorConfig {
    /// Parse a config from YAML string.
    pub fn from_yaml(yaml: &str) -> Result<Self, ConfigError> {
        let config: ValidatorConfig = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Parse a config from JSON string.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: ValidatorConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Load a config file, picking the format from the extension.
    ///
    /// `.json` is parsed as JSON, anything else as YAML.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path)?;
        match path.extension().and_then(|e| e.to_str()) {
            Some("json") => Self::from_json(&contents),
            _ => Self::from_yaml(&contents),
        }
    }

    /// Replace the threshold, keeping the config valid.
    pub fn with_threshold(mut self, threshold: f64) -> Result<Self, ConfigError> {
        self.similarity_threshold = threshold;
        self.validate()?;
        Ok(self)
    }

    /// Check value ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        check_threshold(self.similarity_threshold)
    }
}

/// A threshold must be a finite value within `[0, 1]`.
pub fn check_threshold(threshold: f64) -> Result<(), ConfigError> {
    if !threshold.is_finite() || !(0.0..=1.0).contains(&threshold) {
        return Err(ConfigError::InvalidThreshold(threshold));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_yaml_uses_defaults() {
        let config = ValidatorConfig::from_yaml("{}").unwrap();
        assert_eq!(config, ValidatorConfig::default());
        assert_eq!(config.similarity_threshold, 0.8);
        assert_eq!(config.normalization.punctuation, ".,!?;:");
        assert_eq!(config.duplicate_policy, DuplicatePolicy::FirstWins);
    }

    #[test]
    fn test_partial_yaml() {
        let yaml = r#"
similarity_threshold: 0.65
normalization:
  punctuation: ".,!?;:'\""
duplicate_policy: reject
"#;
        let config = ValidatorConfig::from_yaml(yaml).unwrap();
        assert_eq!(config.similarity_threshold, 0.65);
        assert!(config.normalization.lowercase);
        assert_eq!(config.normalization.punctuation, ".,!?;:'\"");
        assert_eq!(config.duplicate_policy, DuplicatePolicy::Reject);
    }

    #[test]
    fn test_json_config() {
        let config =
            ValidatorConfig::from_json(r#"{"normalization": {"lowercase": false}}"#).unwrap();
        assert!(!config.normalization.lowercase);
        assert!(config.normalization.collapse_whitespace);
    }

    #[test]
    fn test_threshold_out_of_range() {
        let result = ValidatorConfig::from_yaml("similarity_threshold: 1.5");
        assert!(matches!(result, Err(ConfigError::InvalidThreshold(_))));

        let result = ValidatorConfig::default().with_threshold(-0.1);
        assert!(matches!(result, Err(ConfigError::InvalidThreshold(_))));

        let result = ValidatorConfig::default().with_threshold(f64::NAN);
        assert!(matches!(result, Err(ConfigError::InvalidThreshold(_))));
    }

    #[test]
    fn test_threshold_bounds_are_inclusive() {
        assert!(ValidatorConfig::default().with_threshold(0.0).is_ok());
        assert!(ValidatorConfig::default().with_threshold(1.0).is_ok());
    }
}
