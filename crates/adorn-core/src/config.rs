//! Composer configuration

use crate::errors::ConfigError;
use crate::signature::{is_identifier_char, DEFAULT_KEY_PREFIX};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Disambiguation marker prepended to colliding keys unless configured otherwise
pub const DEFAULT_DISAMBIGUATION_MARKER: &str = "_";

/// Probe budget for collision resolution unless configured otherwise
pub const DEFAULT_MAX_COLLISION_PROBES: usize = 64;

/// Settings for one declaring type's composition phase
///
/// ```toml
/// key_prefix = "decorating$"
/// disambiguation_marker = "_"
/// max_collision_probes = 64
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ComposerConfig {
    /// Prefix of every signature key
    pub key_prefix: String,
    /// Marker prepended to a key that collides with another method's slot
    pub disambiguation_marker: String,
    /// Upper bound on disambiguation attempts for a single lookup
    pub max_collision_probes: usize,
}

impl Default for ComposerConfig {
    fn default() -> Self {
        Self {
            key_prefix: DEFAULT_KEY_PREFIX.to_string(),
            disambiguation_marker: DEFAULT_DISAMBIGUATION_MARKER.to_string(),
            max_collision_probes: DEFAULT_MAX_COLLISION_PROBES,
        }
    }
}

impl ComposerConfig {
    /// Parse and validate a TOML document; missing fields take their defaults
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a TOML configuration file
    pub fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_toml_str(&text)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_identifier("key_prefix", &self.key_prefix)?;
        validate_identifier("disambiguation_marker", &self.disambiguation_marker)?;
        if self.max_collision_probes == 0 {
            return Err(ConfigError::invalid(
                "max_collision_probes",
                "must allow at least one probe",
            ));
        }
        Ok(())
    }
}

fn validate_identifier(field: &str, value: &str) -> Result<(), ConfigError> {
    if value.is_empty() {
        return Err(ConfigError::invalid(field, "must not be empty"));
    }
    if let Some(c) = value.chars().find(|c| !is_identifier_char(*c)) {
        return Err(ConfigError::invalid(
            field,
            format!("'{c}' is not an identifier character"),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn test_defaults_are_valid() {
        let config = ComposerConfig::default();
        assert_eq!(config.key_prefix, "decorating$");
        assert_eq!(config.disambiguation_marker, "_");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = ComposerConfig::from_toml_str("key_prefix = \"deco$\"").unwrap();
        assert_eq!(config.key_prefix, "deco$");
        assert_eq!(config.max_collision_probes, DEFAULT_MAX_COLLISION_PROBES);
    }

    #[test]
    fn test_rejects_empty_marker() {
        let err = ComposerConfig::from_toml_str("disambiguation_marker = \"\"").unwrap_err();
        assert_matches!(err, ConfigError::Invalid { ref field, .. } if field == "disambiguation_marker");
    }

    #[test]
    fn test_rejects_non_identifier_prefix() {
        let err = ComposerConfig::from_toml_str("key_prefix = \"deco-\"").unwrap_err();
        assert_eq!(err.to_string(), "Field 'key_prefix': '-' is not an identifier character");
    }

    #[test]
    fn test_rejects_zero_probes() {
        let config = ComposerConfig {
            max_collision_probes: 0,
            ..ComposerConfig::default()
        };
        assert_matches!(config.validate(), Err(ConfigError::Invalid { .. }));
    }

    #[test]
    fn test_malformed_toml() {
        let err = ComposerConfig::from_toml_str("key_prefix = ").unwrap_err();
        assert_matches!(err, ConfigError::Parse { .. });
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("adorn.toml");
        std::fs::write(&path, "max_collision_probes = 8\n").unwrap();

        let config = ComposerConfig::load_from_file(&path).unwrap();
        assert_eq!(config.max_collision_probes, 8);

        let missing = ComposerConfig::load_from_file(&dir.path().join("absent.toml"));
        assert_matches!(missing, Err(ConfigError::Io(_)));
    }
}
