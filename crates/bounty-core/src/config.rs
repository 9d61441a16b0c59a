//! Analyzer configuration.
//!
//! Every field has a default so an empty file (or no file) is valid. The
//! binary loads this from TOML and lets command-line flags override it.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::bounty::BucketUnit;
use crate::error::ConfigError;
use crate::knockout::HeroMatcher;
use crate::rollup::Precedence;

/// Default configuration file name, looked up in the working directory.
pub const DEFAULT_CONFIG_FILE: &str = "bounty.toml";

/// Player count assumed when a summary does not state one.
pub const DEFAULT_PLAYER_COUNT: u32 = 9;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AnalyzerConfig {
    /// Display name of the tracked player.
    pub hero: String,
    /// Match the hero name exactly (default) or ignoring case.
    pub hero_case_sensitive: bool,
    /// Unit each bucket multiplier applies to.
    pub bucket_unit: BucketUnit,
    /// Summaries with a worse finish are reported as skipped.
    pub max_finish_place: Option<u32>,
    pub default_player_count: u32,
    /// Tie-break when documents of one tournament disagree.
    pub precedence: Precedence,
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            hero: "Hero".to_string(),
            hero_case_sensitive: true,
            bucket_unit: BucketUnit::BuyIn,
            max_finish_place: None,
            default_player_count: DEFAULT_PLAYER_COUNT,
            precedence: Precedence::First,
        }
    }
}

impl AnalyzerConfig {
    pub fn from_toml(text: &str) -> Result<Self, ConfigError> {
        let config: AnalyzerConfig = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_toml(&text)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.hero.trim().is_empty() {
            return Err(ConfigError::Invalid("hero name cannot be empty".to_string()));
        }
        if let BucketUnit::Fixed(unit) = self.bucket_unit
            && !(unit.is_finite() && unit > 0.0)
        {
            return Err(ConfigError::Invalid(format!("bucket unit must be positive, got {unit}")));
        }
        if self.default_player_count == 0 {
            return Err(ConfigError::Invalid("default player count must be at least 1".to_string()));
        }
        if self.max_finish_place == Some(0) {
            return Err(ConfigError::Invalid("max finish place must be at least 1".to_string()));
        }
        Ok(())
    }

    pub fn hero_matcher(&self) -> HeroMatcher {
        HeroMatcher::new(&self.hero, self.hero_case_sensitive)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_config_uses_defaults() {
        let config = AnalyzerConfig::from_toml("").unwrap();
        assert_eq!(config, AnalyzerConfig::default());
        assert!(config.hero_matcher().is_case_sensitive());
    }

    #[test]
    fn parses_every_field() {
        let config = AnalyzerConfig::from_toml(
            r#"
            hero = "Villain42"
            hero_case_sensitive = false
            bucket_unit = { fixed = 1.0 }
            max_finish_place = 9
            default_player_count = 18
            precedence = "max"
            "#,
        )
        .unwrap();
        assert_eq!(config.hero, "Villain42");
        assert!(!config.hero_case_sensitive);
        assert_eq!(config.bucket_unit, BucketUnit::Fixed(1.0));
        assert_eq!(config.max_finish_place, Some(9));
        assert_eq!(config.default_player_count, 18);
        assert_eq!(config.precedence, Precedence::Max);

        let config = AnalyzerConfig::from_toml(r#"bucket_unit = "buy-in""#).unwrap();
        assert_eq!(config.bucket_unit, BucketUnit::BuyIn);
    }

    #[test]
    fn rejects_bad_values() {
        assert!(AnalyzerConfig::from_toml(r#"hero = "  ""#).is_err());
        assert!(AnalyzerConfig::from_toml("bucket_unit = { fixed = 0.0 }").is_err());
        assert!(AnalyzerConfig::from_toml("default_player_count = 0").is_err());
        assert!(AnalyzerConfig::from_toml("max_finish_place = 0").is_err());
        assert!(matches!(
            AnalyzerConfig::from_toml("unknown_key = 1"),
            Err(ConfigError::Toml(_))
        ));
    }
}
