use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::score::ScoreParams;

/// Engine tunables. Every field has a default, so a config file only needs
/// the keys it changes.
///
/// ```toml
/// ml_confidence_threshold = 0.75
///
/// [risk_category_weights]
/// data_sharing = 30
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EngineConfig {
    /// Minimum cosine similarity for a semantic match.
    pub ml_confidence_threshold: f32,
    pub max_representative_matches: usize,
    /// Overrides for risk category weights, by category id.
    pub risk_category_weights: BTreeMap<String, u32>,
    pub dark_pattern_penalty: u32,
    pub positive_boost_per_indicator: u32,
    pub positive_boost_cap: u32,
    pub risk_transparency_factor: f64,
    pub embed_batch_size: usize,
    pub key_concern_limit: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        let score = ScoreParams::default();
        Self {
            ml_confidence_threshold: 0.70,
            max_representative_matches: 5,
            risk_category_weights: BTreeMap::new(),
            dark_pattern_penalty: score.dark_pattern_penalty,
            positive_boost_per_indicator: score.positive_boost_per_indicator,
            positive_boost_cap: score.positive_boost_cap,
            risk_transparency_factor: score.risk_transparency_factor,
            embed_batch_size: 32,
            key_concern_limit: 3,
        }
    }
}

impl EngineConfig {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let data = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&data)
    }

    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        let cfg: EngineConfig = toml::from_str(s)?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Range checks. Category names in `risk_category_weights` are checked
    /// against the rule book when the analyzer is built.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(0.0..=1.0).contains(&self.ml_confidence_threshold) {
            return Err(ConfigError::Invalid(format!(
                "ml_confidence_threshold must be in [0, 1], got {}",
                self.ml_confidence_threshold
            )));
        }
        if self.max_representative_matches == 0 {
            return Err(ConfigError::Invalid(
                "max_representative_matches must be at least 1".into(),
            ));
        }
        if self.embed_batch_size == 0 {
            return Err(ConfigError::Invalid("embed_batch_size must be at least 1".into()));
        }
        if !self.risk_transparency_factor.is_finite() || self.risk_transparency_factor < 0.0 {
            return Err(ConfigError::Invalid(format!(
                "risk_transparency_factor must be a non-negative number, got {}",
                self.risk_transparency_factor
            )));
        }
        Ok(())
    }

    pub fn score_params(&self) -> ScoreParams {
        ScoreParams {
            dark_pattern_penalty: self.dark_pattern_penalty,
            positive_boost_per_indicator: self.positive_boost_per_indicator,
            positive_boost_cap: self.positive_boost_cap,
            risk_transparency_factor: self.risk_transparency_factor,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_gives_defaults() {
        assert_eq!(EngineConfig::from_toml_str("").unwrap(), EngineConfig::default());
    }

    #[test]
    fn partial_override() {
        let cfg = EngineConfig::from_toml_str(
            r#"
            ml_confidence_threshold = 0.8
            key_concern_limit = 5

            [risk_category_weights]
            data_sharing = 30
            "#,
        )
        .unwrap();
        assert_eq!(cfg.ml_confidence_threshold, 0.8);
        assert_eq!(cfg.key_concern_limit, 5);
        assert_eq!(cfg.risk_category_weights["data_sharing"], 30);
        assert_eq!(cfg.dark_pattern_penalty, 8);
    }

    #[test]
    fn unknown_key_is_a_parse_error() {
        let err = EngineConfig::from_toml_str("threshold = 0.5").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn out_of_range_values_are_rejected() {
        for bad in [
            "ml_confidence_threshold = 1.5",
            "max_representative_matches = 0",
            "embed_batch_size = 0",
            "risk_transparency_factor = -1.0",
        ] {
            let err = EngineConfig::from_toml_str(bad).unwrap_err();
            assert!(matches!(err, ConfigError::Invalid(_)), "{bad}");
        }
    }

    #[test]
    fn missing_file_reports_path() {
        let err = EngineConfig::load(Path::new("/nonexistent/termscope.toml")).unwrap_err();
        match err {
            ConfigError::Read { path, .. } => assert!(path.ends_with("termscope.toml")),
            other => panic!("expected Read, got {other:?}"),
        }
    }

    #[test]
    fn score_params_follow_config() {
        let cfg = EngineConfig {
            dark_pattern_penalty: 10,
            ..EngineConfig::default()
        };
        assert_eq!(cfg.score_params().dark_pattern_penalty, 10);
    }
}
