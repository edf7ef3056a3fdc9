use serde::de::Deserializer;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use thiserror::Error;

use crate::catalog::CatalogColumns;

pub const DEFAULT_THRESHOLD: f64 = 0.40;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to parse TOML: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Threshold must be within 0.0..=1.0, got {0}")]
    InvalidThreshold(f64),
}

/// Predicates for OCR lines that are table furniture rather than items.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NoiseFilter {
    /// A line is a header when, for every group, it contains one of the
    /// group's synonyms.
    pub header_groups: Vec<Vec<String>>,
    /// A line containing any of these is dropped.
    pub markers: Vec<String>,
}

impl Default for NoiseFilter {
    fn default() -> Self {
        let group = |words: &[&str]| words.iter().map(|w| w.to_string()).collect::<Vec<_>>();
        Self {
            header_groups: vec![
                group(&["명칭", "name"]),
                group(&["재료", "재질", "material"]),
                group(&["수량", "qty", "quantity"]),
                group(&["규격", "spec"]),
            ],
            markers: group(&["p.no", "비고", "remarks"]),
        }
    }
}

/// What part of an item and a catalog row is compared.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchScope {
    /// Name, material and spec against name, material, spec and part number.
    #[default]
    Full,
    /// Item name against the catalog name column only; rows without a
    /// name are skipped.
    NameOnly,
}

pub fn default_substitutions() -> BTreeMap<String, String> {
    [
        ("HEX SOCKET HEAD BOLT", "HEX BOLT"),
        ("SW", "SW (SPRING WASHER)"),
        ("PW", "PW (PLAIN WASHER)"),
        ("NUT", "NUT"),
    ]
    .into_iter()
    .map(|(k, v)| (k.to_string(), v.to_string()))
    .collect()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReconcileConfig {
    /// Minimum similarity in `[0, 1]` for a row to count as a match.
    pub threshold: f64,
    pub scope: MatchScope,
    pub columns: CatalogColumns,
    pub noise: NoiseFilter,
    /// Uppercase name → canonical name. Entries from a config file are
    /// layered over the built-in table.
    #[serde(deserialize_with = "merge_substitutions")]
    pub substitutions: BTreeMap<String, String>,
}

impl Default for ReconcileConfig {
    fn default() -> Self {
        Self {
            threshold: DEFAULT_THRESHOLD,
            scope: MatchScope::Full,
            columns: CatalogColumns::default(),
            noise: NoiseFilter::default(),
            substitutions: default_substitutions(),
        }
    }
}

fn merge_substitutions<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<BTreeMap<String, String>, D::Error> {
    let user = BTreeMap::<String, String>::deserialize(deserializer)?;
    let mut merged = default_substitutions();
    merged.extend(user.into_iter().map(|(k, v)| (k.trim().to_uppercase(), v)));
    Ok(merged)
}

impl ReconcileConfig {
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    /// Defaults when no file is given.
    pub fn load_or_default(path: Option<&Path>) -> Result<Self, ConfigError> {
        match path {
            Some(p) => Self::load(p),
            None => Ok(Self::default()),
        }
    }

    pub fn with_threshold(mut self, threshold: f64) -> Result<Self, ConfigError> {
        self.threshold = threshold;
        self.validate()?;
        Ok(self)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.threshold.is_finite() || !(0.0..=1.0).contains(&self.threshold) {
            return Err(ConfigError::InvalidThreshold(self.threshold));
        }
        Ok(())
    }
}
