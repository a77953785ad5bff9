//! TOML-based engine configuration.
//!
//! ```toml
//! stack_level_cap = 12
//! default_daily_rate = 400
//! share_daily_capacity = true
//!
//! [view_mode]
//! mode = "hour"
//! slots_per_day = 8
//! ```
//!
//! Every key is optional; missing keys take their defaults.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::ConfigError;
use crate::stacking::{DEFAULT_STACK_LEVEL_CAP, MAX_STACK_LEVELS};
use crate::timeline::ViewMode;

/// Tunables for the planning board and its engine components.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Soft cap on the number of stack lanes searched per resource.
    #[serde(default = "default_stack_level_cap")]
    pub stack_level_cap: usize,
    /// Flat daily rate used when a task has no usable learning curve
    /// and its resource has no ceiling.
    #[serde(default)]
    pub default_daily_rate: Option<i64>,
    /// Whether tasks on the same resource draw from one shared daily bucket.
    #[serde(default = "default_true")]
    pub share_daily_capacity: bool,
    /// Timeline granularity used for stacking.
    #[serde(default)]
    pub view_mode: ViewMode,
}

fn default_stack_level_cap() -> usize {
    DEFAULT_STACK_LEVEL_CAP
}
fn default_true() -> bool {
    true
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            stack_level_cap: default_stack_level_cap(),
            default_daily_rate: None,
            share_daily_capacity: true,
            view_mode: ViewMode::default(),
        }
    }
}

impl EngineConfig {
    /// Parses and validates a TOML document.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Loads a configuration file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&content)
    }

    /// Rejects values the engine cannot work with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.stack_level_cap == 0 || self.stack_level_cap > MAX_STACK_LEVELS {
            return Err(ConfigError::InvalidValue {
                key: "stack_level_cap".into(),
                message: format!("must be within 1..={MAX_STACK_LEVELS}"),
            });
        }
        if matches!(self.default_daily_rate, Some(rate) if rate <= 0) {
            return Err(ConfigError::InvalidValue {
                key: "default_daily_rate".into(),
                message: "must be positive".into(),
            });
        }
        if let ViewMode::Hour { slots_per_day } = self.view_mode {
            if slots_per_day == 0 {
                return Err(ConfigError::InvalidValue {
                    key: "view_mode.slots_per_day".into(),
                    message: "must be positive".into(),
                });
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_document_uses_defaults() {
        let config = EngineConfig::from_toml_str("").unwrap();
        assert_eq!(config, EngineConfig::default());
        assert_eq!(config.stack_level_cap, 12);
        assert!(config.share_daily_capacity);
        assert_eq!(config.view_mode, ViewMode::Day);
    }

    #[test]
    fn test_full_document() {
        let config = EngineConfig::from_toml_str(
            r#"
            stack_level_cap = 16
            default_daily_rate = 400
            share_daily_capacity = false

            [view_mode]
            mode = "hour"
            slots_per_day = 8
            "#,
        )
        .unwrap();

        assert_eq!(config.stack_level_cap, 16);
        assert_eq!(config.default_daily_rate, Some(400));
        assert!(!config.share_daily_capacity);
        assert_eq!(config.view_mode, ViewMode::Hour { slots_per_day: 8 });
    }

    #[test]
    fn test_invalid_cap_rejected() {
        let err = EngineConfig::from_toml_str("stack_level_cap = 0").unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { ref key, .. } if key == "stack_level_cap"));

        let err = EngineConfig::from_toml_str("stack_level_cap = 65").unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { .. }));
    }

    #[test]
    fn test_negative_rate_rejected() {
        let err = EngineConfig::from_toml_str("default_daily_rate = -5").unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { ref key, .. } if key == "default_daily_rate"));
    }

    #[test]
    fn test_parse_error() {
        let err = EngineConfig::from_toml_str("stack_level_cap = \"many\"").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_missing_file() {
        let err = EngineConfig::load("/nonexistent/u-capacity.toml").unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }
}
