//! Extraction configuration.
//!
//! A plain value owned by the caller and handed to `PrescriptionExtractor`.
//! Defaults reproduce the behaviour of `extract()`; environment overrides
//! (`RXSCAN_*`) are read only when the caller asks for them.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::env_key;

/// Instructions assigned to candidates whose prescription carried none.
pub const DEFAULT_INSTRUCTIONS: &str = "As prescribed";

#[derive(Error, Debug, PartialEq)]
pub enum ConfigError {
    #[error("Invalid value for {key}: {value:?} (expected {expected})")]
    InvalidValue {
        key: String,
        value: String,
        expected: &'static str,
    },
}

// ═══════════════════════════════════════════════════════════
// Types
// ═══════════════════════════════════════════════════════════

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractionConfig {
    /// Text given to candidates without an instruction line.
    pub default_instructions: String,
    /// Run OCR drug-name correction between building and resolving.
    pub correct_drug_names: bool,
    /// Allow a bare name line to pair with a dosage on the following line.
    pub merge_split_names: bool,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            default_instructions: DEFAULT_INSTRUCTIONS.to_string(),
            correct_drug_names: false,
            merge_split_names: true,
        }
    }
}

impl ExtractionConfig {
    /// Defaults overridden by `RXSCAN_*` environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as `from_env` but reads through `lookup`, so callers can feed
    /// values from any source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        let key = env_key("DEFAULT_INSTRUCTIONS");
        if let Some(value) = lookup(&key) {
            let value = value.trim();
            if !value.is_empty() {
                config.default_instructions = value.to_string();
            }
        }

        let key = env_key("CORRECT_NAMES");
        if let Some(value) = lookup(&key) {
            config.correct_drug_names = parse_flag(&key, &value)?;
        }

        let key = env_key("MERGE_SPLIT_NAMES");
        if let Some(value) = lookup(&key) {
            config.merge_split_names = parse_flag(&key, &value)?;
        }

        Ok(config)
    }

    pub fn with_default_instructions(mut self, text: impl Into<String>) -> Self {
        self.default_instructions = text.into();
        self
    }

    pub fn with_name_correction(mut self, enabled: bool) -> Self {
        self.correct_drug_names = enabled;
        self
    }

    pub fn with_split_name_merging(mut self, enabled: bool) -> Self {
        self.merge_split_names = enabled;
        self
    }
}

fn parse_flag(key: &str, value: &str) -> Result<bool, ConfigError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::InvalidValue {
            key: key.to_string(),
            value: value.to_string(),
            expected: "a boolean (true/false/1/0)",
        }),
    }
}

// ═══════════════════════════════════════════════════════════
// Tests
// ═══════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults() {
        let config = ExtractionConfig::default();
        assert_eq!(config.default_instructions, "As prescribed");
        assert!(!config.correct_drug_names);
        assert!(config.merge_split_names);
    }

    #[test]
    fn empty_lookup_yields_defaults() {
        let config = ExtractionConfig::from_lookup(|_| None).unwrap();
        assert_eq!(config, ExtractionConfig::default());
    }

    #[test]
    fn overrides_are_applied() {
        let config = ExtractionConfig::from_lookup(lookup_from(&[
            ("RXSCAN_DEFAULT_INSTRUCTIONS", "  Ask your pharmacist "),
            ("RXSCAN_CORRECT_NAMES", "yes"),
            ("RXSCAN_MERGE_SPLIT_NAMES", "0"),
        ]))
        .unwrap();
        assert_eq!(config.default_instructions, "Ask your pharmacist");
        assert!(config.correct_drug_names);
        assert!(!config.merge_split_names);
    }

    #[test]
    fn blank_instructions_override_is_ignored() {
        let config =
            ExtractionConfig::from_lookup(lookup_from(&[("RXSCAN_DEFAULT_INSTRUCTIONS", "   ")]))
                .unwrap();
        assert_eq!(config.default_instructions, DEFAULT_INSTRUCTIONS);
    }

    #[test]
    fn invalid_flag_is_rejected() {
        let err = ExtractionConfig::from_lookup(lookup_from(&[("RXSCAN_CORRECT_NAMES", "maybe")]))
            .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { ref key, .. } if key == "RXSCAN_CORRECT_NAMES"));
        assert!(err.to_string().contains("maybe"));
    }

    #[test]
    fn builder_setters() {
        let config = ExtractionConfig::default()
            .with_default_instructions("See label")
            .with_name_correction(true)
            .with_split_name_merging(false);
        assert_eq!(config.default_instructions, "See label");
        assert!(config.correct_drug_names);
        assert!(!config.merge_split_names);
    }

    #[test]
    fn deserializes_partial_json() {
        let config: ExtractionConfig =
            serde_json::from_str(r#"{"correct_drug_names": true}"#).unwrap();
        assert!(config.correct_drug_names);
        assert_eq!(config.default_instructions, DEFAULT_INSTRUCTIONS);
    }
}
