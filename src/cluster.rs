// src/cluster.rs
//! Greedy online story clustering for one batch.
//!
//! Clusters live in a `Vec` and are scanned in creation order; an article joins the
//! *first* cluster whose fingerprint equals its own or whose representative text is
//! at least `threshold`-similar. Permuting the input can therefore change the
//! partition. That order dependence is part of the contract: callers that need
//! reproducible clusters must feed articles in a reproducible order.
//!
//! O(n·m) per batch (n articles, m clusters so far).

use serde::Serialize;
use std::cmp::Ordering;
use tracing::trace;

use crate::fingerprint::{core_text, strict_fingerprint};
use crate::ingest::Article;
use crate::similarity::jaccard_similarity;
use crate::timestamp::compare_timestamps;

/// One story within a batch.
#[derive(Debug, Clone, PartialEq)]
pub struct StoryCluster {
    pub fingerprint: String,
    /// Core text of the article that created the cluster; never rewritten.
    pub representative_text: String,
    /// Distinct sources in first-seen order.
    pub sources: Vec<String>,
    pub article_ids: Vec<String>,
    pub first_seen: String,
    pub last_seen: String,
}

impl StoryCluster {
    fn new(fingerprint: String, representative_text: String, article: &Article, id: String) -> Self {
        Self {
            fingerprint,
            representative_text,
            sources: vec![article.source.clone()],
            article_ids: vec![id],
            first_seen: article.fetched_at.clone(),
            last_seen: article.fetched_at.clone(),
        }
    }

    fn absorb(&mut self, article: &Article, id: String) {
        if !self.sources.iter().any(|s| s == &article.source) {
            self.sources.push(article.source.clone());
        }
        self.article_ids.push(id);

        let seen = &article.fetched_at;
        if seen.is_empty() {
            return;
        }
        if self.last_seen.is_empty() || compare_timestamps(seen, &self.last_seen) == Ordering::Greater {
            self.last_seen = seen.clone();
        }
        if self.first_seen.is_empty() || compare_timestamps(seen, &self.first_seen) == Ordering::Less {
            self.first_seen = seen.clone();
        }
    }

    pub fn count(&self) -> usize {
        self.article_ids.len()
    }

    pub fn summary(&self) -> ClusterSummary {
        ClusterSummary {
            fingerprint: self.fingerprint.clone(),
            representative_text: self.representative_text.clone(),
            sources: self.sources.clone(),
            article_ids: self.article_ids.clone(),
            first_seen: self.first_seen.clone(),
            last_seen: self.last_seen.clone(),
            count: self.count(),
        }
    }
}

/// Output shape of a cluster, as consumed by persistence (upsert on `fingerprint`).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClusterSummary {
    pub fingerprint: String,
    pub representative_text: String,
    pub sources: Vec<String>,
    pub article_ids: Vec<String>,
    pub first_seen: String,
    pub last_seen: String,
    pub count: usize,
}

/// Result of placing one article.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Assignment {
    /// Position in creation order.
    pub index: usize,
    pub created: bool,
}

/// Insertion-ordered cluster collection plus the matching threshold.
#[derive(Debug, Clone)]
pub struct ClusterSet {
    threshold: f64,
    clusters: Vec<StoryCluster>,
}

impl ClusterSet {
    pub fn new(threshold: f64) -> Self {
        Self {
            threshold: threshold.clamp(0.0, 1.0),
            clusters: Vec::new(),
        }
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    /// Find-or-create the cluster for `article` and record `article_id` in it.
    pub fn assign(&mut self, article: &Article, article_id: &str) -> Assignment {
        let text = core_text(&article.title, &article.description);
        let fp = strict_fingerprint(&article.title, &article.description);

        let hit = self.clusters.iter().position(|c| {
            c.fingerprint == fp || jaccard_similarity(&text, &c.representative_text) >= self.threshold
        });

        match hit {
            Some(index) => {
                self.clusters[index].absorb(article, article_id.to_string());
                trace!(target: "cluster", index, fingerprint = %self.clusters[index].fingerprint, "joined cluster");
                Assignment {
                    index,
                    created: false,
                }
            }
            None => {
                let index = self.clusters.len();
                trace!(target: "cluster", index, fingerprint = %fp, "new cluster");
                self.clusters
                    .push(StoryCluster::new(fp, text, article, article_id.to_string()));
                Assignment {
                    index,
                    created: true,
                }
            }
        }
    }

    pub fn get(&self, index: usize) -> Option<&StoryCluster> {
        self.clusters.get(index)
    }

    /// The cluster an [`Assignment`] points at.
    ///
    /// Panics if `index` did not come from [`ClusterSet::assign`] on this set.
    pub fn cluster(&self, index: usize) -> &StoryCluster {
        &self.clusters[index]
    }

    pub fn len(&self) -> usize {
        self.clusters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.clusters.is_empty()
    }

    /// Clusters in creation order.
    pub fn iter(&self) -> impl Iterator<Item = &StoryCluster> {
        self.clusters.iter()
    }

    pub fn into_clusters(self) -> Vec<StoryCluster> {
        self.clusters
    }
}
