// SPDX-License-Identifier: MIT OR Apache-2.0

//! # Layered Configuration
//!
//! Flat key-value properties with source tracking. Settings can come from
//! several layers and are merged by precedence.
//!
//! ## Configuration Sources (Priority: Low to High)
//!
//! 1. **RustDefault** - Built-in defaults
//! 2. **ConfigFile** - TOML or YAML stage file
//! 3. **Override** - Values set programmatically, e.g. from command line flags
//!
//! ## Example Usage
//!
//! ```rust
//! use patternflux::{FlatConfig, PropertySource};
//!
//! let mut config = FlatConfig::new();
//! config.set("partitions", "1", PropertySource::RustDefault);
//! config.set("partitions", "4", PropertySource::ConfigFile);
//! config.set("partitions", "2", PropertySource::RustDefault);
//!
//! assert_eq!(config.get("partitions").map(String::as_str), Some("4"));
//! ```

use std::collections::HashMap;

/// Property source identifier with priority ordering
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PropertySource {
    /// Rust code defaults (priority: 0)
    RustDefault,
    /// Stage configuration file (priority: 1)
    ConfigFile,
    /// Programmatic override (priority: 2)
    Override,
}

impl PropertySource {
    /// Get numeric priority for comparison (higher = more important)
    #[inline]
    pub const fn priority(&self) -> u8 {
        match self {
            PropertySource::RustDefault => 0,
            PropertySource::ConfigFile => 1,
            PropertySource::Override => 2,
        }
    }

    #[inline]
    pub const fn description(&self) -> &'static str {
        match self {
            PropertySource::RustDefault => "Rust default",
            PropertySource::ConfigFile => "configuration file",
            PropertySource::Override => "override",
        }
    }
}

/// Flat key-value configuration with source tracking
///
/// A value only replaces an existing one when its source has equal or higher
/// priority.
#[derive(Debug, Clone, Default)]
pub struct FlatConfig {
    properties: HashMap<String, String>,
    sources: HashMap<String, PropertySource>,
}

impl FlatConfig {
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a property with source tracking and priority-based override
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>, source: PropertySource) {
        let key = key.into();

        if let Some(existing_source) = self.sources.get(&key) {
            if existing_source.priority() > source.priority() {
                return;
            }
        }

        self.properties.insert(key.clone(), value.into());
        self.sources.insert(key, source);
    }

    #[inline]
    pub fn get(&self, key: &str) -> Option<&String> {
        self.properties.get(key)
    }

    /// Get a property value with its source
    #[inline]
    pub fn get_with_source(&self, key: &str) -> Option<(&String, PropertySource)> {
        self.properties
            .get(key)
            .and_then(|value| self.sources.get(key).map(|source| (value, *source)))
    }

    #[inline]
    pub fn contains(&self, key: &str) -> bool {
        self.properties.contains_key(key)
    }

    #[inline]
    pub fn keys(&self) -> impl Iterator<Item = &String> {
        self.properties.keys()
    }

    /// Merge another configuration into this one (respects priorities)
    pub fn merge(&mut self, other: &FlatConfig) {
        for (key, value) in &other.properties {
            if let Some(source) = other.sources.get(key) {
                self.set(key.clone(), value.clone(), *source);
            }
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.properties.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.properties.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_property_source_priority_ordering() {
        assert!(PropertySource::Override.priority() > PropertySource::ConfigFile.priority());
        assert!(PropertySource::ConfigFile.priority() > PropertySource::RustDefault.priority());
        assert_eq!(PropertySource::ConfigFile.description(), "configuration file");
    }

    #[test]
    fn test_flat_config_priority_override() {
        let mut config = FlatConfig::new();
        config.set("partitions", "1", PropertySource::RustDefault);
        config.set("partitions", "4", PropertySource::Override);
        config.set("partitions", "8", PropertySource::ConfigFile);

        assert_eq!(
            config.get_with_source("partitions"),
            Some((&"4".to_string(), PropertySource::Override))
        );
    }

    #[test]
    fn test_same_priority_replaces() {
        let mut config = FlatConfig::new();
        config.set("mode", "evaluate_all", PropertySource::ConfigFile);
        config.set("mode", "break_on_first_match", PropertySource::ConfigFile);
        assert_eq!(config.get("mode").map(String::as_str), Some("break_on_first_match"));
    }

    #[test]
    fn test_merge_respects_priorities() {
        let mut base = FlatConfig::new();
        base.set("name", "alerts", PropertySource::Override);
        base.set("partitions", "1", PropertySource::RustDefault);

        let mut file = FlatConfig::new();
        file.set("name", "from-file", PropertySource::ConfigFile);
        file.set("partitions", "3", PropertySource::ConfigFile);

        base.merge(&file);
        assert_eq!(base.get("name").map(String::as_str), Some("alerts"));
        assert_eq!(base.get("partitions").map(String::as_str), Some("3"));
        assert_eq!(base.len(), 2);
        assert!(base.contains("partitions"));
        assert_eq!(base.keys().count(), 2);
    }
}
