// src/scoring.rs
//! Hotness scoring.
//!
//! Six independent terms are summed into a raw value, then scaled:
//! `score = clamp(floor(raw * 100 / normalizer), 0, 100)`.
//!
//! | term            | rule (defaults)                                               |
//! |-----------------|---------------------------------------------------------------|
//! | source tier     | +20 if the source contains a major-outlet name, else +10      |
//! | high keywords   | +20 if any high-salience term occurs in the normalized text   |
//! | medium keywords | +10 if any medium-salience term occurs (additive with high)   |
//! | recency         | <3h +30, <12h +15, >24h −10, otherwise 0                      |
//! | corroboration   | min((sources − 1) × 15, 50)                                   |
//! | duration        | +10 if the cluster spans ≥ 30 minutes                         |
//!
//! Recency and duration depend on timestamps. A missing or malformed timestamp
//! zeroes only its own term; scoring itself never fails.

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use tracing::debug;

use crate::cluster::StoryCluster;
use crate::config::{EngineConfig, KeywordSets, ScoringWeights, SourceTiers};
use crate::fingerprint::core_text;
use crate::ingest::Article;
use crate::text::normalize_text;
use crate::timestamp::{parse_timestamp, TimestampError};

/// Per-term contributions, kept for explainability.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ScoreBreakdown {
    pub source_tier: i32,
    pub high_keywords: i32,
    pub medium_keywords: i32,
    pub recency: i32,
    pub corroboration: i32,
    pub duration: i32,
    pub raw: i32,
    pub score: u8,
}

/// Scorer with keyword sets and outlet names normalized once at construction.
#[derive(Debug, Clone)]
pub struct Scorer {
    weights: ScoringWeights,
    sources: SourceTiers,
    high: Vec<String>,
    medium: Vec<String>,
}

impl Scorer {
    pub fn new(weights: ScoringWeights, keywords: &KeywordSets, sources: SourceTiers) -> Self {
        Self {
            weights,
            sources,
            high: normalize_terms(&keywords.high),
            medium: normalize_terms(&keywords.medium),
        }
    }

    pub fn from_config(cfg: &EngineConfig) -> Self {
        Self::new(cfg.scoring, &cfg.keywords, cfg.sources.clone())
    }

    pub fn weights(&self) -> &ScoringWeights {
        &self.weights
    }

    /// Score `article` against `cluster` as it stands right now.
    pub fn score(&self, article: &Article, cluster: &StoryCluster, now: DateTime<Utc>) -> ScoreBreakdown {
        let w = &self.weights;
        let text = normalize_text(&core_text(&article.title, &article.description));

        let source_tier = if self.sources.is_major(&article.source) {
            w.major_source_points
        } else {
            w.other_source_points
        };
        let high_keywords = if contains_any(&text, &self.high) {
            w.high_keyword_points
        } else {
            0
        };
        let medium_keywords = if contains_any(&text, &self.medium) {
            w.medium_keyword_points
        } else {
            0
        };

        let recency = self.recency_points(&article.published_at, now).unwrap_or_else(|e| {
            debug!(target: "scoring", error = %e, "recency term zeroed");
            0
        });
        let corroboration = self.corroboration_points(cluster.sources.len());
        let duration = self
            .duration_points(&cluster.first_seen, &cluster.last_seen)
            .unwrap_or_else(|e| {
                debug!(target: "scoring", error = %e, fingerprint = %cluster.fingerprint, "duration term zeroed");
                0
            });

        let raw = [high_keywords, medium_keywords, recency, corroboration, duration]
            .into_iter()
            .fold(source_tier, i32::saturating_add);
        ScoreBreakdown {
            source_tier,
            high_keywords,
            medium_keywords,
            recency,
            corroboration,
            duration,
            raw,
            score: self.normalize(raw),
        }
    }

    /// Recency bucket for `published_at` relative to `now`.
    /// Future timestamps count as fresh.
    pub fn recency_points(&self, published_at: &str, now: DateTime<Utc>) -> Result<i32, TimestampError> {
        let w = &self.weights;
        let published = parse_timestamp(published_at)?;
        let age = now.signed_duration_since(published);
        // A window chrono cannot represent never matches.
        let younger = |h: i64| Duration::try_hours(h).is_some_and(|d| age < d);
        let older = |h: i64| Duration::try_hours(h).is_some_and(|d| age > d);
        let points = if younger(w.fresh_within_hours) {
            w.fresh_points
        } else if younger(w.recent_within_hours) {
            w.recent_points
        } else if older(w.stale_after_hours) {
            w.stale_points
        } else {
            0
        };
        Ok(points)
    }

    /// Bonus for independent sources; monotonic in `num_sources`, capped.
    pub fn corroboration_points(&self, num_sources: usize) -> i32 {
        let w = &self.weights;
        if num_sources <= 1 {
            return 0;
        }
        let extra = i32::try_from(num_sources - 1).unwrap_or(i32::MAX);
        extra.saturating_mul(w.corroboration_per_source).min(w.corroboration_cap)
    }

    /// Bonus when a cluster has been seen over a sustained window.
    pub fn duration_points(&self, first_seen: &str, last_seen: &str) -> Result<i32, TimestampError> {
        let w = &self.weights;
        let first = parse_timestamp(first_seen)?;
        let last = parse_timestamp(last_seen)?;
        let sustained = Duration::try_minutes(w.sustained_after_minutes)
            .is_some_and(|d| last.signed_duration_since(first) >= d);
        if sustained {
            Ok(w.sustained_points)
        } else {
            Ok(0)
        }
    }

    /// Scale raw points to 0..=100 (floor).
    pub fn normalize(&self, raw: i32) -> u8 {
        let scaled = i64::from(raw.max(0)) * 100 / i64::from(self.weights.normalizer.max(1));
        scaled.min(100) as u8
    }
}

fn normalize_terms(terms: &[String]) -> Vec<String> {
    terms
        .iter()
        .map(|t| normalize_text(t))
        .filter(|t| !t.is_empty())
        .collect()
}

/// Substring match, as in "contains any term": "launch" also hits "launches".
fn contains_any(text: &str, terms: &[String]) -> bool {
    terms.iter().any(|t| text.contains(t.as_str()))
}
