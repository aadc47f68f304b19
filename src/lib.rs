// src/lib.rs
// Public library surface for the service binary, the batch CLI and integration tests.

pub mod api;
pub mod config;
pub mod error;
pub mod metrics;

// Dedup + scoring core
pub mod batch;
pub mod cluster;
pub mod fingerprint;
pub mod hotness;
pub mod ingest;
pub mod scoring;
pub mod similarity;
pub mod text;
pub mod timestamp;

// ---- Re-exports for stable public API ----
pub use crate::api::create_router as router;
pub use crate::batch::{
    BatchOutput, BatchProcessor, EnrichedArticle, FixedPopularity, PopularityHook,
    RandomPopularity, SeededPopularity,
};
pub use crate::cluster::{Assignment, ClusterSet, ClusterSummary, StoryCluster};
pub use crate::config::EngineConfig;
pub use crate::error::EngineError;
pub use crate::hotness::{classify, Hotness};
pub use crate::ingest::{combine, Article, BatchInput};
pub use crate::scoring::{ScoreBreakdown, Scorer};
