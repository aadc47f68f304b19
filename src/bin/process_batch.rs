//! File-based batch runner: reads one or more fetch dumps (category-grouped or flat
//! JSON), combines them in argument order, and writes
//! `updated_<name>.json` (enriched articles) and `news_map_<name>.json` (clusters).

use anyhow::{anyhow, Context, Result};
use chrono::{DateTime, Utc};
use clap::Parser;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

use newsmap_engine::batch::{BatchProcessor, SeededPopularity};
use newsmap_engine::config::EngineConfig;
use newsmap_engine::ingest::{combine, BatchInput};

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Input JSON files; several are combined into one batch
    #[arg(required = true)]
    inputs: Vec<PathBuf>,

    /// Output directory
    #[arg(short, long, default_value = "updated_data")]
    out_dir: PathBuf,

    /// Clock override (RFC 3339); defaults to now
    #[arg(long)]
    now: Option<String>,

    /// Seed for deterministic popularity values
    #[arg(long)]
    seed: Option<u64>,

    /// Similarity threshold override in [0, 1]
    #[arg(long)]
    threshold: Option<f64>,

    /// Engine config file (overrides NEWSMAP_CONFIG_PATH)
    #[arg(short, long)]
    config: Option<PathBuf>,
}

fn read_input(path: &Path) -> Result<BatchInput> {
    let raw = fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    let value: serde_json::Value =
        serde_json::from_str(&raw).with_context(|| format!("parsing {}", path.display()))?;
    BatchInput::from_value(value).with_context(|| format!("validating {}", path.display()))
}

fn write_json<T: serde::Serialize>(path: &Path, value: &T) -> Result<()> {
    let body = serde_json::to_string_pretty(value)?;
    fs::write(path, body).with_context(|| format!("writing {}", path.display()))
}

fn main() -> Result<()> {
    let _ = dotenvy::dotenv();
    tracing_subscriber::fmt()
        .with_target(false)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();

    let mut cfg = match &args.config {
        Some(p) => EngineConfig::load_from(p)?,
        None => EngineConfig::from_env()?,
    };
    if let Some(t) = args.threshold {
        cfg.clustering.similarity_threshold = t;
        cfg.validate()?;
    }

    let now = match &args.now {
        Some(s) => DateTime::parse_from_rfc3339(s)
            .map(|dt| dt.with_timezone(&Utc))
            .map_err(|e| anyhow!("invalid --now {s:?}: {e}"))?,
        None => Utc::now(),
    };

    let inputs = args
        .inputs
        .iter()
        .map(|p| read_input(p))
        .collect::<Result<Vec<_>>>()?;
    let batch = combine(inputs);

    let mut processor = match args.seed {
        Some(seed) => BatchProcessor::with_popularity(&cfg, Box::new(SeededPopularity::new(seed))),
        None => BatchProcessor::new(&cfg),
    };
    let out = processor.process(batch, now);

    let stem = args.inputs[0]
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("batch");
    fs::create_dir_all(&args.out_dir)
        .with_context(|| format!("creating {}", args.out_dir.display()))?;
    let updated = args.out_dir.join(format!("updated_{stem}.json"));
    let news_map = args.out_dir.join(format!("news_map_{stem}.json"));
    write_json(&updated, &out.articles)?;
    write_json(&news_map, &out.clusters)?;

    info!(
        articles = out.articles.len(),
        clusters = out.clusters.len(),
        updated = %updated.display(),
        news_map = %news_map.display(),
        "batch written"
    );
    Ok(())
}
