// src/batch.rs
//! One batch: reconcile → identity key → cluster → score → classify → enrich.
//!
//! Runs synchronously on one thread. Cluster assignment mutates state that later
//! articles match against, and first-match-wins follows creation order. The whole
//! `BatchOutput` is returned at once or not at all.

use chrono::{DateTime, Utc};
use metrics::{counter, describe_counter, describe_histogram, histogram};
use once_cell::sync::OnceCell;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeMap;
use std::time::Instant;
use tracing::{debug, info};

use crate::cluster::{ClusterSet, ClusterSummary};
use crate::config::{EngineConfig, HotnessThresholds};
use crate::error::EngineError;
use crate::fingerprint::identity_key;
use crate::hotness::Hotness;
use crate::ingest::{Article, BatchInput};
use crate::scoring::{ScoreBreakdown, Scorer};

/// Keys the engine writes onto every article; same-named input keys are overwritten.
const DERIVED_KEYS: &[&str] = &[
    "article_id",
    "score",
    "hotness",
    "popularity_score",
    "score_breakdown",
];

/// One-time metrics registration (so series show up on /metrics).
fn ensure_metrics_described() {
    static ONCE: OnceCell<()> = OnceCell::new();
    ONCE.get_or_init(|| {
        describe_counter!("batch_runs_total", "Batches processed.");
        describe_counter!("batch_articles_total", "Articles enriched across all batches.");
        describe_counter!(
            "batch_clusters_created_total",
            "Story clusters created across all batches."
        );
        describe_counter!(
            "batch_hotness_total",
            "Articles per hotness label (label: level)."
        );
        describe_histogram!("batch_process_ms", "Batch processing time in milliseconds.");
    });
}

/// Source of the placeholder `popularity_score`.
///
/// This stands in for a future engagement signal. It is attached to the output
/// only and never feeds the score.
pub trait PopularityHook {
    fn popularity(&mut self, article: &Article) -> u8;
}

/// Uniform 1..=10 from the thread RNG.
#[derive(Debug, Default, Clone, Copy)]
pub struct RandomPopularity;

impl PopularityHook for RandomPopularity {
    fn popularity(&mut self, _article: &Article) -> u8 {
        rand::rng().random_range(1..=10)
    }
}

/// Uniform 1..=10 from a seeded RNG; reproducible across runs.
#[derive(Debug, Clone)]
pub struct SeededPopularity {
    rng: StdRng,
}

impl SeededPopularity {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl PopularityHook for SeededPopularity {
    fn popularity(&mut self, _article: &Article) -> u8 {
        self.rng.random_range(1..=10)
    }
}

/// Constant value.
#[derive(Debug, Clone, Copy)]
pub struct FixedPopularity(pub u8);

impl PopularityHook for FixedPopularity {
    fn popularity(&mut self, _article: &Article) -> u8 {
        self.0
    }
}

/// An article plus everything the engine derived for it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EnrichedArticle {
    #[serde(flatten)]
    pub article: Article,
    pub article_id: String,
    pub score: u8,
    pub hotness: Hotness,
    pub popularity_score: u8,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub score_breakdown: Option<ScoreBreakdown>,
}

/// Enriched articles in input order, and cluster summaries keyed by fingerprint.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BatchOutput {
    pub articles: Vec<EnrichedArticle>,
    pub clusters: BTreeMap<String, ClusterSummary>,
}

pub struct BatchProcessor {
    threshold: f64,
    scorer: Scorer,
    hotness: HotnessThresholds,
    popularity: Box<dyn PopularityHook + Send>,
    explain: bool,
}

impl BatchProcessor {
    /// Processor with the production popularity source.
    pub fn new(cfg: &EngineConfig) -> Self {
        Self::with_popularity(cfg, Box::new(RandomPopularity))
    }

    pub fn with_popularity(cfg: &EngineConfig, popularity: Box<dyn PopularityHook + Send>) -> Self {
        Self {
            threshold: cfg.clustering.similarity_threshold,
            scorer: Scorer::from_config(cfg),
            hotness: cfg.hotness,
            popularity,
            explain: false,
        }
    }

    /// Attach per-article score breakdowns to the output.
    pub fn explain(mut self, on: bool) -> Self {
        self.explain = on;
        self
    }

    /// Validate the JSON shape, then process.
    pub fn process_value(&mut self, input: Value, now: DateTime<Utc>) -> Result<BatchOutput, EngineError> {
        let input = BatchInput::from_value(input)?;
        Ok(self.process(input, now))
    }

    pub fn process(&mut self, input: BatchInput, now: DateTime<Utc>) -> BatchOutput {
        ensure_metrics_described();
        let started = Instant::now();

        let articles = input.into_articles();
        let mut clusters = ClusterSet::new(self.threshold);
        let mut enriched = Vec::with_capacity(articles.len());
        let mut created = 0usize;
        let mut by_level: BTreeMap<&'static str, u64> = BTreeMap::new();

        for mut article in articles {
            let article_id = identity_key(&article);
            let placed = clusters.assign(&article, &article_id);
            if placed.created {
                created += 1;
            }
            let cluster = clusters.cluster(placed.index);

            let breakdown = self.scorer.score(&article, cluster, now);
            let hotness = self.hotness.classify(breakdown.score);
            let popularity_score = self.popularity.popularity(&article);
            *by_level.entry(hotness.as_str()).or_default() += 1;

            debug!(
                target: "batch",
                id = %article_id,
                cluster = placed.index,
                created = placed.created,
                sources = cluster.sources.len(),
                raw = breakdown.raw,
                score = breakdown.score,
                hotness = %hotness,
                "article scored"
            );

            for key in DERIVED_KEYS {
                article.extra.shift_remove(*key);
            }
            enriched.push(EnrichedArticle {
                article,
                article_id,
                score: breakdown.score,
                hotness,
                popularity_score,
                score_breakdown: self.explain.then_some(breakdown),
            });
        }

        let summaries: BTreeMap<String, ClusterSummary> = clusters
            .iter()
            .map(|c| (c.fingerprint.clone(), c.summary()))
            .collect();

        let elapsed_ms = started.elapsed().as_secs_f64() * 1000.0;
        counter!("batch_runs_total").increment(1);
        counter!("batch_articles_total").increment(enriched.len() as u64);
        counter!("batch_clusters_created_total").increment(created as u64);
        for (level, n) in &by_level {
            counter!("batch_hotness_total", "level" => *level).increment(*n);
        }
        histogram!("batch_process_ms").record(elapsed_ms);

        info!(
            target: "batch",
            articles = enriched.len(),
            clusters = summaries.len(),
            hot = by_level.get("Hot").copied().unwrap_or(0),
            medium = by_level.get("Medium").copied().unwrap_or(0),
            low = by_level.get("Low").copied().unwrap_or(0),
            elapsed_ms,
            "batch processed"
        );

        BatchOutput {
            articles: enriched,
            clusters: summaries,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 9, 1, 12, 0, 0).unwrap()
    }

    fn processor() -> BatchProcessor {
        BatchProcessor::with_popularity(&EngineConfig::default(), Box::new(FixedPopularity(5)))
    }

    #[test]
    fn seeded_popularity_is_reproducible_and_in_range() {
        let a = Article::default();
        let mut p1 = SeededPopularity::new(42);
        let mut p2 = SeededPopularity::new(42);
        let v1: Vec<u8> = (0..20).map(|_| p1.popularity(&a)).collect();
        let v2: Vec<u8> = (0..20).map(|_| p2.popularity(&a)).collect();
        assert_eq!(v1, v2);
        assert!(v1.iter().all(|v| (1..=10).contains(v)));
        let r = RandomPopularity.popularity(&a);
        assert!((1..=10).contains(&r));
    }

    #[test]
    fn output_keeps_input_order_and_counts() {
        let out = processor()
            .process_value(
                json!([
                    {"title": "Rocket launch succeeds", "source": "BBC"},
                    {"title": "Unrelated cricket story", "source": "NDTV"},
                    {"title": "rocket launch succeeds!", "source": "CNN"}
                ]),
                now(),
            )
            .unwrap();
        let titles: Vec<&str> = out.articles.iter().map(|a| a.article.title.as_str()).collect();
        assert_eq!(
            titles,
            vec!["Rocket launch succeeds", "Unrelated cricket story", "rocket launch succeeds!"]
        );
        assert_eq!(out.clusters.len(), 2);
        let total: usize = out.clusters.values().map(|c| c.count).sum();
        assert_eq!(total, 3);
        assert!(out.articles.iter().all(|a| a.popularity_score == 5));
    }

    #[test]
    fn derived_keys_overwrite_input_keys() {
        let out = processor()
            .process_value(json!([{"title": "x", "score": 999, "hotness": "Nuclear"}]), now())
            .unwrap();
        let v = serde_json::to_value(&out.articles[0]).unwrap();
        assert_ne!(v["score"], json!(999));
        assert_eq!(v["hotness"], json!("Low"));
    }

    #[test]
    fn input_score_breakdown_is_replaced_not_duplicated() {
        let input = json!([{"title": "x", "score_breakdown": {"raw": 1}}]);
        let explained = processor().explain(true).process_value(input.clone(), now()).unwrap();
        let text = serde_json::to_string(&explained.articles[0]).unwrap();
        assert_eq!(text.matches("\"score_breakdown\"").count(), 1);
        let v: Value = serde_json::from_str(&text).unwrap();
        assert_eq!(v["score_breakdown"]["score"], json!(explained.articles[0].score));

        let plain = processor().process_value(input, now()).unwrap();
        let v = serde_json::to_value(&plain.articles[0]).unwrap();
        assert!(v.get("score_breakdown").is_none());
    }

    #[test]
    fn raw_canonical_values_survive_enrichment() {
        let out = processor()
            .process_value(json!([{"title": "x", "url": 42, "description": null}]), now())
            .unwrap();
        assert_eq!(out.articles.len(), 1);
        let v = serde_json::to_value(&out.articles[0]).unwrap();
        assert_eq!(v["url"], json!(42));
        assert_eq!(v["description"], json!(null));
        assert_eq!(v["title"], json!("x"));
        assert_eq!(out.articles[0].article.url, "");
    }

    #[test]
    fn explain_attaches_breakdown() {
        let out = processor()
            .explain(true)
            .process_value(json!([{"title": "x"}]), now())
            .unwrap();
        let b = out.articles[0].score_breakdown.expect("breakdown");
        assert_eq!(b.score, out.articles[0].score);

        let plain = processor().process_value(json!([{"title": "x"}]), now()).unwrap();
        let v = serde_json::to_value(&plain.articles[0]).unwrap();
        assert!(v.get("score_breakdown").is_none());
    }

    #[test]
    fn malformed_input_is_rejected() {
        let err = processor().process_value(json!(17), now()).unwrap_err();
        assert_eq!(err, EngineError::InputShape { found: "number" });
    }
}
