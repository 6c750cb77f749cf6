// SPDX-License-Identifier: MIT OR Apache-2.0

//! # Stage Configuration
//!
//! Declarative description of a CEP stage: name, detection mode, parallelism,
//! grouping and window policy. Loaded from TOML or YAML, or resolved from a
//! layered [`FlatConfig`].
//!
//! ```toml
//! name = "temperature-alerts"
//! mode = "break_on_first_match"
//! partitions = 4
//! grouping = "fields"
//!
//! [window]
//! type = "sliding_count"
//! length = 20
//! slide = 5
//! ```
//!
//! The initial state and the pattern matcher are code, not configuration;
//! they are supplied to [`crate::CepStageBuilder`].

use super::flat_config::{FlatConfig, PropertySource};
use crate::core::exception::{PatternFluxError, PatternFluxResult};
use crate::core::query::processor::cep::DetectionMode;
use crate::core::window::WindowConfig;
use serde::{Deserialize, Serialize};
use std::path::Path;

pub const KEY_NAME: &str = "name";
pub const KEY_MODE: &str = "mode";
pub const KEY_PARTITIONS: &str = "partitions";
pub const KEY_GROUPING: &str = "grouping";
pub const KEY_WINDOW_TYPE: &str = "window.type";
pub const KEY_WINDOW_LENGTH: &str = "window.length";
pub const KEY_WINDOW_SLIDE: &str = "window.slide";

/// Routing policy named in configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GroupingKind {
    #[default]
    Shuffle,
    Fields,
    Global,
}

impl GroupingKind {
    pub fn from_str(s: &str) -> PatternFluxResult<Self> {
        match s.to_lowercase().as_str() {
            "shuffle" => Ok(GroupingKind::Shuffle),
            "fields" => Ok(GroupingKind::Fields),
            "global" => Ok(GroupingKind::Global),
            _ => Err(PatternFluxError::invalid_parameter_with_details(
                format!("Invalid grouping '{}'", s),
                KEY_GROUPING,
                "'shuffle', 'fields' or 'global'",
            )),
        }
    }

    #[inline]
    pub const fn as_str(&self) -> &'static str {
        match self {
            GroupingKind::Shuffle => "shuffle",
            GroupingKind::Fields => "fields",
            GroupingKind::Global => "global",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CepStageConfig {
    pub name: String,
    pub mode: DetectionMode,
    pub partitions: usize,
    pub grouping: GroupingKind,
    pub window: WindowConfig,
}

impl Default for CepStageConfig {
    fn default() -> Self {
        Self {
            name: "cep".to_string(),
            mode: DetectionMode::default(),
            partitions: 1,
            grouping: GroupingKind::default(),
            window: WindowConfig::default(),
        }
    }
}

impl CepStageConfig {
    pub fn from_toml_str(content: &str) -> PatternFluxResult<Self> {
        let config: Self = toml::from_str(content).map_err(|e| {
            PatternFluxError::configuration(format!("Invalid TOML stage configuration: {}", e))
        })?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_yaml_str(content: &str) -> PatternFluxResult<Self> {
        let config: Self = serde_yaml::from_str(content).map_err(|e| {
            PatternFluxError::configuration(format!("Invalid YAML stage configuration: {}", e))
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Load from a `.toml`, `.yaml` or `.yml` file
    pub fn from_file(path: impl AsRef<Path>) -> PatternFluxResult<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)?;
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("toml") => Self::from_toml_str(&content),
            Some("yaml") | Some("yml") => Self::from_yaml_str(&content),
            _ => Err(PatternFluxError::configuration(format!(
                "Unsupported configuration file '{}': expected .toml, .yaml or .yml",
                path.display()
            ))),
        }
    }

    /// Resolve a configuration from layered properties; missing keys keep
    /// their defaults.
    pub fn from_flat_config(flat: &FlatConfig) -> PatternFluxResult<Self> {
        let mut config = Self::default();

        if let Some(name) = flat.get(KEY_NAME) {
            config.name = name.clone();
        }
        if let Some(mode) = flat.get(KEY_MODE) {
            config.mode = DetectionMode::from_str(mode)?;
        }
        if let Some(partitions) = flat.get(KEY_PARTITIONS) {
            config.partitions = parse_number(KEY_PARTITIONS, partitions)?;
        }
        if let Some(grouping) = flat.get(KEY_GROUPING) {
            config.grouping = GroupingKind::from_str(grouping)?;
        }

        let window_keys = [KEY_WINDOW_TYPE, KEY_WINDOW_LENGTH, KEY_WINDOW_SLIDE];
        if window_keys.iter().any(|key| flat.contains(key)) {
            let window_type = flat
                .get(KEY_WINDOW_TYPE)
                .ok_or_else(|| PatternFluxError::missing_parameter(KEY_WINDOW_TYPE))?;
            let length = flat
                .get(KEY_WINDOW_LENGTH)
                .ok_or_else(|| PatternFluxError::missing_parameter(KEY_WINDOW_LENGTH))
                .and_then(|value| parse_number(KEY_WINDOW_LENGTH, value))?;
            let slide = flat
                .get(KEY_WINDOW_SLIDE)
                .map(|value| parse_number(KEY_WINDOW_SLIDE, value))
                .transpose()?;
            config.window = WindowConfig::from_parts(window_type, length, slide)?;
        }

        config.validate()?;
        Ok(config)
    }

    /// Flatten into properties attributed to `source`
    pub fn to_flat_config(&self, source: PropertySource) -> FlatConfig {
        let mut flat = FlatConfig::new();
        flat.set(KEY_NAME, self.name.clone(), source);
        flat.set(KEY_MODE, self.mode.as_str(), source);
        flat.set(KEY_PARTITIONS, self.partitions.to_string(), source);
        flat.set(KEY_GROUPING, self.grouping.as_str(), source);
        flat.set(KEY_WINDOW_TYPE, self.window.window_type(), source);
        match self.window {
            WindowConfig::TumblingCount { length } | WindowConfig::TumblingTime { length } => {
                flat.set(KEY_WINDOW_LENGTH, length.to_string(), source);
            }
            WindowConfig::SlidingCount { length, slide }
            | WindowConfig::SlidingTime { length, slide } => {
                flat.set(KEY_WINDOW_LENGTH, length.to_string(), source);
                flat.set(KEY_WINDOW_SLIDE, slide.to_string(), source);
            }
        }
        flat
    }

    pub fn validate(&self) -> PatternFluxResult<()> {
        if self.name.trim().is_empty() {
            return Err(PatternFluxError::validation_failed(
                "stage name must not be empty",
                KEY_NAME,
            ));
        }
        if self.partitions == 0 {
            return Err(PatternFluxError::invalid_parameter_with_details(
                "stage needs at least one partition",
                KEY_PARTITIONS,
                ">= 1",
            ));
        }
        self.window.validate()
    }
}

fn parse_number<T: std::str::FromStr>(key: &str, value: &str) -> PatternFluxResult<T> {
    value.trim().parse().map_err(|_| {
        PatternFluxError::invalid_parameter_with_details(
            format!("'{}' is not a valid number", value),
            key,
            "a non-negative integer",
        )
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = CepStageConfig::default();
        assert_eq!(config.partitions, 1);
        assert_eq!(config.grouping, GroupingKind::Shuffle);
        assert_eq!(config.mode, DetectionMode::BreakOnFirstMatch);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_from_toml() {
        let config = CepStageConfig::from_toml_str(
            r#"
            name = "temperature-alerts"
            mode = "evaluate_all"
            partitions = 4
            grouping = "fields"

            [window]
            type = "sliding_count"
            length = 20
            slide = 5
            "#,
        )
        .unwrap();

        assert_eq!(config.name, "temperature-alerts");
        assert_eq!(config.mode, DetectionMode::EvaluateAll);
        assert_eq!(config.partitions, 4);
        assert_eq!(config.grouping, GroupingKind::Fields);
        assert_eq!(config.window, WindowConfig::SlidingCount { length: 20, slide: 5 });
    }

    #[test]
    fn test_from_yaml_with_defaults() {
        let config = CepStageConfig::from_yaml_str(
            "name: login-failures\nwindow:\n  type: tumbling_time\n  length: 500\n",
        )
        .unwrap();
        assert_eq!(config.name, "login-failures");
        assert_eq!(config.partitions, 1);
        assert_eq!(config.window, WindowConfig::TumblingTime { length: 500 });
    }

    #[test]
    fn test_malformed_window_rejected() {
        let err = CepStageConfig::from_toml_str(
            "[window]\ntype = \"sliding_count\"\nlength = 2\nslide = 3\n",
        )
        .unwrap_err();
        assert!(err.is_configuration_error());

        assert!(CepStageConfig::from_toml_str("partitions = 0\n").is_err());
        assert!(CepStageConfig::from_toml_str("colour = \"blue\"\n").is_err());
    }

    #[test]
    fn test_flat_config_layers() {
        let mut flat = CepStageConfig::default().to_flat_config(PropertySource::RustDefault);
        flat.set(KEY_PARTITIONS, "3", PropertySource::ConfigFile);
        flat.set(KEY_WINDOW_TYPE, "sliding_time", PropertySource::ConfigFile);
        flat.set(KEY_WINDOW_LENGTH, "1000", PropertySource::ConfigFile);
        flat.set(KEY_WINDOW_SLIDE, "250", PropertySource::ConfigFile);
        flat.set(KEY_MODE, "evaluate_all", PropertySource::Override);

        let config = CepStageConfig::from_flat_config(&flat).unwrap();
        assert_eq!(config.partitions, 3);
        assert_eq!(config.mode, DetectionMode::EvaluateAll);
        assert_eq!(
            config.window,
            WindowConfig::SlidingTime {
                length: 1000,
                slide: 250
            }
        );
    }

    #[test]
    fn test_flat_config_round_trip_of_defaults() {
        let config = CepStageConfig::default();
        let flat = config.to_flat_config(PropertySource::RustDefault);
        assert_eq!(CepStageConfig::from_flat_config(&flat).unwrap(), config);
    }

    #[test]
    fn test_flat_config_rejects_bad_values() {
        let mut flat = FlatConfig::new();
        flat.set(KEY_PARTITIONS, "many", PropertySource::Override);
        assert!(matches!(
            CepStageConfig::from_flat_config(&flat),
            Err(PatternFluxError::InvalidParameter { .. })
        ));

        let mut flat = FlatConfig::new();
        flat.set(KEY_WINDOW_LENGTH, "5", PropertySource::Override);
        assert!(matches!(
            CepStageConfig::from_flat_config(&flat),
            Err(PatternFluxError::MissingParameter { .. })
        ));
    }
}
