//! Application configuration.
//!
//! All tunable policy values live in `config/base.toml` and are
//! deserialized into plain structs at startup. Components receive the
//! relevant section by value; nothing reads configuration through a
//! global.

use anyhow::Result;
use serde::Deserialize;
use std::fs;
use std::path::Path;

use crate::error::EngineError;

#[derive(Debug, Deserialize, Clone, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub data: DataConfig,
    #[serde(default)]
    pub policy: PolicyConfig,
    #[serde(default)]
    pub advisor: AdvisorConfig,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct DataConfig {
    /// Directory holding the per-entity-type weekly CSV files.
    pub dir: String,
    /// When set, the run appends the rolled-over next-week rows back
    /// to the CSV files instead of only reporting them.
    pub commit_next_week: bool,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self { dir: "data".into(), commit_next_week: false }
    }
}

/// Thresholds and floors for the deterministic decision engine.
#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct PolicyConfig {
    pub top_percentile: f64,
    pub bottom_percentile: f64,
    pub activate_percentile: f64,
    pub suppress_percentile: f64,
    pub momentum_override_pct: f64,
    pub hold_momentum_band_pct: f64,
    pub hold_distance_frac: f64,
    pub min_budget: f64,
    pub min_bid: f64,
    pub min_per_side: usize,
    pub max_per_side: usize,
    pub tiers: TierConfig,
}

impl Default for PolicyConfig {
    fn default() -> Self {
        Self {
            top_percentile: 0.30,
            bottom_percentile: 0.30,
            activate_percentile: 0.30,
            suppress_percentile: 0.30,
            momentum_override_pct: 15.0,
            hold_momentum_band_pct: 5.0,
            hold_distance_frac: 0.10,
            min_budget: 100.0,
            min_bid: 0.5,
            min_per_side: 2,
            max_per_side: 5,
            tiers: TierConfig::default(),
        }
    }
}

/// Percentage change applied per magnitude tier.
#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct TierConfig {
    pub high_pct: f64,
    pub moderate_pct: f64,
    pub low_pct: f64,
}

impl Default for TierConfig {
    fn default() -> Self {
        Self { high_pct: 20.0, moderate_pct: 10.0, low_pct: 5.0 }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct AdvisorConfig {
    pub enabled: bool,
    pub url: String,
    pub temperature: f32,
    pub top_p: f32,
    pub max_tokens: usize,
}

impl Default for AdvisorConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            url: "http://127.0.0.1:8099".into(),
            temperature: 0.0,
            top_p: 0.9,
            max_tokens: 2048,
        }
    }
}

pub fn load_base() -> Result<AppConfig> {
    load_from("config/base.toml")
}

pub fn load_from(path: impl AsRef<Path>) -> Result<AppConfig> {
    let path = path.as_ref();
    let s = fs::read_to_string(path)
        .map_err(|err| EngineError::Config(format!("reading {}: {err}", path.display())))?;
    let cfg: AppConfig = toml::from_str(&s)
        .map_err(|err| EngineError::Config(format!("parsing {}: {err}", path.display())))?;
    Ok(cfg)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_policy_documented_values() {
        let p = PolicyConfig::default();
        assert_eq!(p.top_percentile, 0.30);
        assert_eq!(p.tiers.high_pct, 20.0);
        assert_eq!(p.min_per_side, 2);
        assert_eq!(p.max_per_side, 5);
    }

    #[test]
    fn parses_partial_toml_with_defaults() {
        let cfg: AppConfig = toml::from_str(
            r#"
            [policy]
            momentum_override_pct = 12.5
            "#,
        )
        .unwrap();
        assert_eq!(cfg.policy.momentum_override_pct, 12.5);
        assert_eq!(cfg.policy.hold_momentum_band_pct, 5.0);
        assert!(!cfg.advisor.enabled);
    }

    #[test]
    fn missing_file_is_a_config_error() {
        let err = load_from("/definitely/not/here/base.toml").unwrap_err();
        assert!(matches!(err.downcast_ref::<EngineError>(), Some(EngineError::Config(_))));
    }
}
