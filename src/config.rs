// src/config.rs
//! Engine configuration: keyword sets, major-outlet names, clustering threshold,
//! scoring weights/caps and hotness cutoffs.
//!
//! TOML shape (every section and key optional; omitted values use the built-in seed):
//! ```toml
//! [clustering]
//! similarity_threshold = 0.80
//!
//! [scoring]
//! major_source_points = 20
//! normalizer = 140
//!
//! [hotness]
//! hot = 70
//! medium = 40
//!
//! [keywords]
//! high = ["war", "election"]
//! medium = ["market", "gdp"]
//!
//! [sources]
//! major = ["reuters", "bbc"]
//! ```
//!
//! Resolution: `$NEWSMAP_CONFIG_PATH` (must exist) → `config/engine.toml` (if present)
//! → built-in seed. `$NEWSMAP_SIMILARITY_THRESHOLD` overrides the threshold last.

use anyhow::{anyhow, bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

pub const DEFAULT_CONFIG_PATH: &str = "config/engine.toml";
pub const DEFAULT_SIMILARITY_THRESHOLD: f64 = 0.80;

pub const ENV_CONFIG_PATH: &str = "NEWSMAP_CONFIG_PATH";
pub const ENV_SIMILARITY_THRESHOLD: &str = "NEWSMAP_SIMILARITY_THRESHOLD";

/// Upper bound for every recency/sustain window, in hours.
pub const MAX_WINDOW_HOURS: i64 = 10_000;
/// Bound on the magnitude of any single point weight.
pub const MAX_POINTS: i32 = 10_000;

/// Immutable configuration handed to the cluster assigner, scorer and classifier.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub clustering: ClusteringConfig,
    pub scoring: ScoringWeights,
    pub hotness: HotnessThresholds,
    pub keywords: KeywordSets,
    pub sources: SourceTiers,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClusteringConfig {
    /// Jaccard similarity at or above which an article joins an existing cluster.
    pub similarity_threshold: f64,
}

impl Default for ClusteringConfig {
    fn default() -> Self {
        Self {
            similarity_threshold: DEFAULT_SIMILARITY_THRESHOLD,
        }
    }
}

/// Points per scoring signal. Raw points are summed, then scaled by `normalizer`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringWeights {
    pub major_source_points: i32,
    pub other_source_points: i32,
    pub high_keyword_points: i32,
    pub medium_keyword_points: i32,

    /// age < fresh_within_hours
    pub fresh_points: i32,
    pub fresh_within_hours: i64,
    /// fresh_within_hours <= age < recent_within_hours
    pub recent_points: i32,
    pub recent_within_hours: i64,
    /// age > stale_after_hours
    pub stale_points: i32,
    pub stale_after_hours: i64,

    pub corroboration_per_source: i32,
    pub corroboration_cap: i32,

    pub sustained_after_minutes: i64,
    pub sustained_points: i32,

    /// Raw points that map to a score of 100.
    pub normalizer: i32,
}

impl Default for ScoringWeights {
    fn default() -> Self {
        Self {
            major_source_points: 20,
            other_source_points: 10,
            high_keyword_points: 20,
            medium_keyword_points: 10,
            fresh_points: 30,
            fresh_within_hours: 3,
            recent_points: 15,
            recent_within_hours: 12,
            stale_points: -10,
            stale_after_hours: 24,
            corroboration_per_source: 15,
            corroboration_cap: 50,
            sustained_after_minutes: 30,
            sustained_points: 10,
            normalizer: 140,
        }
    }
}

/// Score cutoffs for the hotness label (inclusive lower bounds).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HotnessThresholds {
    pub hot: u8,
    pub medium: u8,
}

impl Default for HotnessThresholds {
    fn default() -> Self {
        Self { hot: 70, medium: 40 }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct KeywordSets {
    pub high: Vec<String>,
    pub medium: Vec<String>,
}

impl Default for KeywordSets {
    fn default() -> Self {
        Self {
            high: to_strings(&[
                "war", "crisis", "scandal", "ban", "protest", "violence", "terror", "attack",
                "modi", "bjp", "congress", "election", "supreme court", "parliament",
                "policy", "inflation", "recession", "merger", "acquisition", "default",
                "collapse", "isro", "satellite", "rocket", "launch", "breakthrough",
                "discovery", "world cup", "ipl", "record", "victory", "defeat",
            ]),
            medium: to_strings(&[
                "million", "billion", "rupee", "gdp", "sensex", "nifty", "rbi", "startup",
                "unicorn", "investment", "funding", "crypto", "stock", "gold", "market",
                "oil", "ai", "quantum", "drone", "5g", "cyber", "innovation", "covid",
                "vaccine", "pollution", "flood", "drought", "cyclone", "earthquake",
                "china", "pakistan", "usa", "trade", "summit", "sanction", "alliance",
            ]),
        }
    }
}

/// Names of major outlets; a source earns the top tier if it contains any of them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SourceTiers {
    pub major: Vec<String>,
}

impl Default for SourceTiers {
    fn default() -> Self {
        Self {
            major: to_strings(&[
                "reuters",
                "bbc",
                "times of india",
                "cnn",
                "the hindu",
                "ndtv",
                "indian express",
                "hindustan times",
            ]),
        }
    }
}

impl SourceTiers {
    /// Case-insensitive substring match against the major-outlet list.
    pub fn is_major(&self, source: &str) -> bool {
        let s = source.to_lowercase();
        self.major
            .iter()
            .map(|m| m.trim().to_lowercase())
            .any(|m| !m.is_empty() && s.contains(&m))
    }
}

fn to_strings(xs: &[&str]) -> Vec<String> {
    xs.iter().map(|s| s.to_string()).collect()
}

impl EngineConfig {
    /// Resolve from env + default path, then apply env overrides.
    pub fn from_env() -> Result<Self> {
        let mut cfg = match std::env::var(ENV_CONFIG_PATH) {
            Ok(p) => {
                let pb = PathBuf::from(p);
                if !pb.exists() {
                    return Err(anyhow!(
                        "{} points to non-existent path {}",
                        ENV_CONFIG_PATH,
                        pb.display()
                    ));
                }
                Self::load_from(&pb)?
            }
            Err(_) => {
                let default_p = PathBuf::from(DEFAULT_CONFIG_PATH);
                if default_p.exists() {
                    Self::load_from(&default_p)?
                } else {
                    tracing::debug!(target: "config", "no engine config file; using built-in seed");
                    Self::default()
                }
            }
        };

        if let Some(t) = parse_threshold_env(std::env::var(ENV_SIMILARITY_THRESHOLD).ok()) {
            cfg.clustering.similarity_threshold = t;
        }

        cfg.validate()?;
        Ok(cfg)
    }

    /// Load from an explicit TOML file.
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("reading engine config from {}", path.display()))?;
        let cfg = Self::from_toml_str(&content)
            .with_context(|| format!("parsing engine config at {}", path.display()))?;
        tracing::info!(
            target: "config",
            path = %path.display(),
            threshold = cfg.clustering.similarity_threshold,
            high_keywords = cfg.keywords.high.len(),
            medium_keywords = cfg.keywords.medium.len(),
            major_sources = cfg.sources.major.len(),
            "engine config loaded"
        );
        Ok(cfg)
    }

    /// Parse + validate a TOML string.
    pub fn from_toml_str(s: &str) -> Result<Self> {
        let cfg: EngineConfig = toml::from_str(s)?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn validate(&self) -> Result<()> {
        let t = self.clustering.similarity_threshold;
        if !t.is_finite() || !(0.0..=1.0).contains(&t) {
            bail!("clustering.similarity_threshold must be within [0, 1], got {t}");
        }
        if self.scoring.normalizer <= 0 {
            bail!(
                "scoring.normalizer must be positive, got {}",
                self.scoring.normalizer
            );
        }
        let w = &self.scoring;
        for (name, hours) in [
            ("fresh_within_hours", w.fresh_within_hours),
            ("recent_within_hours", w.recent_within_hours),
            ("stale_after_hours", w.stale_after_hours),
        ] {
            if !(0..=MAX_WINDOW_HOURS).contains(&hours) {
                bail!("scoring.{name} must be within [0, {MAX_WINDOW_HOURS}], got {hours}");
            }
        }
        if !(0..=MAX_WINDOW_HOURS * 60).contains(&w.sustained_after_minutes) {
            bail!(
                "scoring.sustained_after_minutes must be within [0, {}], got {}",
                MAX_WINDOW_HOURS * 60,
                w.sustained_after_minutes
            );
        }
        for (name, points) in [
            ("major_source_points", w.major_source_points),
            ("other_source_points", w.other_source_points),
            ("high_keyword_points", w.high_keyword_points),
            ("medium_keyword_points", w.medium_keyword_points),
            ("fresh_points", w.fresh_points),
            ("recent_points", w.recent_points),
            ("stale_points", w.stale_points),
            ("corroboration_per_source", w.corroboration_per_source),
            ("corroboration_cap", w.corroboration_cap),
            ("sustained_points", w.sustained_points),
            ("normalizer", w.normalizer),
        ] {
            if !(-MAX_POINTS..=MAX_POINTS).contains(&points) {
                bail!("scoring.{name} must be within [-{MAX_POINTS}, {MAX_POINTS}], got {points}");
            }
        }
        if self.hotness.hot < self.hotness.medium {
            bail!(
                "hotness.hot ({}) must not be below hotness.medium ({})",
                self.hotness.hot,
                self.hotness.medium
            );
        }
        Ok(())
    }
}

// parse optional float env and clamp to <0.0..=1.0>
fn parse_threshold_env(raw: Option<String>) -> Option<f64> {
    raw.and_then(|s| s.trim().parse::<f64>().ok())
        .filter(|v| v.is_finite())
        .map(|v| v.clamp(0.0, 1.0))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::{env, fs};

    #[test]
    fn seed_matches_documented_defaults() {
        let c = EngineConfig::default();
        assert_eq!(c.clustering.similarity_threshold, 0.80);
        assert_eq!(c.scoring.normalizer, 140);
        assert_eq!(c.hotness, HotnessThresholds { hot: 70, medium: 40 });
        assert!(c.keywords.high.iter().any(|k| k == "supreme court"));
        assert!(c.keywords.medium.iter().any(|k| k == "5g"));
        assert!(c.validate().is_ok());
    }

    #[test]
    fn partial_toml_keeps_other_defaults() {
        let toml = r#"
[clustering]
similarity_threshold = 0.65

[sources]
major = ["Al Jazeera"]
"#;
        let c = EngineConfig::from_toml_str(toml).unwrap();
        assert!((c.clustering.similarity_threshold - 0.65).abs() < 1e-12);
        assert_eq!(c.sources.major, vec!["Al Jazeera".to_string()]);
        assert_eq!(c.scoring, ScoringWeights::default());
        assert_eq!(c.keywords, KeywordSets::default());
    }

    #[test]
    fn invalid_values_are_rejected() {
        assert!(EngineConfig::from_toml_str("[clustering]\nsimilarity_threshold = 1.5").is_err());
        assert!(EngineConfig::from_toml_str("[scoring]\nnormalizer = 0").is_err());
        assert!(EngineConfig::from_toml_str("[hotness]\nhot = 30\nmedium = 40").is_err());
    }

    #[test]
    fn out_of_range_windows_and_points_are_rejected() {
        for toml in [
            "[scoring]\nfresh_within_hours = 9223372036854775807",
            "[scoring]\nrecent_within_hours = -1",
            "[scoring]\nstale_after_hours = 10001",
            "[scoring]\nsustained_after_minutes = 9223372036854775807",
            "[scoring]\nfresh_points = 2147483647",
            "[scoring]\nstale_points = -2147483648",
            "[scoring]\nnormalizer = 2000000000",
        ] {
            assert!(EngineConfig::from_toml_str(toml).is_err(), "accepted: {toml}");
        }
        let edge = EngineConfig::from_toml_str(
            "[scoring]\nstale_after_hours = 10000\nsustained_after_minutes = 0\nstale_points = -10000",
        )
        .unwrap();
        assert_eq!(edge.scoring.stale_after_hours, MAX_WINDOW_HOURS);
    }

    #[test]
    fn source_tier_is_case_insensitive_substring() {
        let t = SourceTiers::default();
        assert!(t.is_major("Reuters World"));
        assert!(t.is_major("BBC News"));
        assert!(t.is_major("The Times of India"));
        assert!(!t.is_major("Local Gazette"));
        assert!(!t.is_major(""));
    }

    #[test]
    fn threshold_env_parsing_clamps() {
        assert_eq!(parse_threshold_env(Some(" 0.7 ".into())), Some(0.7));
        assert_eq!(parse_threshold_env(Some("3".into())), Some(1.0));
        assert_eq!(parse_threshold_env(Some("-1".into())), Some(0.0));
        assert_eq!(parse_threshold_env(Some("nope".into())), None);
        assert_eq!(parse_threshold_env(None), None);
    }

    #[serial_test::serial]
    #[test]
    fn from_env_prefers_env_path_then_default() {
        let old = env::current_dir().unwrap();
        let tmp = tempfile::tempdir().unwrap();
        env::set_current_dir(tmp.path()).unwrap();
        env::remove_var(ENV_CONFIG_PATH);
        env::remove_var(ENV_SIMILARITY_THRESHOLD);

        // No files in temp CWD → built-in seed
        let c = EngineConfig::from_env().unwrap();
        assert_eq!(c, EngineConfig::default());

        // Env path wins
        let p = tmp.path().join("custom.toml");
        fs::write(&p, "[hotness]\nhot = 80\nmedium = 50\n").unwrap();
        env::set_var(ENV_CONFIG_PATH, p.display().to_string());
        let c2 = EngineConfig::from_env().unwrap();
        assert_eq!(c2.hotness, HotnessThresholds { hot: 80, medium: 50 });

        // Threshold override applies on top
        env::set_var(ENV_SIMILARITY_THRESHOLD, "0.5");
        let c3 = EngineConfig::from_env().unwrap();
        assert!((c3.clustering.similarity_threshold - 0.5).abs() < 1e-12);

        // Env path to a missing file is an error
        env::set_var(ENV_CONFIG_PATH, tmp.path().join("missing.toml").display().to_string());
        assert!(EngineConfig::from_env().is_err());

        env::remove_var(ENV_CONFIG_PATH);
        env::remove_var(ENV_SIMILARITY_THRESHOLD);
        env::set_current_dir(&old).unwrap();
    }
}
