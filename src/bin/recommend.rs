//! Top-k crop recommendations from the persisted model
//!
//! Usage:
//!   recommend [N P K temperature humidity ph rainfall] [--k K]
//!
//! Without feature values a reference reading is used
//! (N 90, P 42, K 43, 24.5 °C, 68 % humidity, pH 6.7, 120 mm rainfall).

use anyhow::{anyhow, bail, Context};
use crop_recommender::inference::{enrich, InMemoryMetadataStore};
use crop_recommender::utils::init_tracing;
use crop_recommender::{InferenceService, PipelineConfig, FeatureVector, NUM_FEATURES};

const DEFAULT_READING: FeatureVector = [90.0, 42.0, 43.0, 24.5, 68.0, 6.7, 120.0];
const DEFAULT_K: usize = 3;

struct CliOptions {
    features: Vec<f64>,
    k: usize,
}

fn parse_args(args: Vec<String>) -> anyhow::Result<CliOptions> {
    let mut features = Vec::new();
    let mut k = DEFAULT_K;

    let mut idx = 0;
    while idx < args.len() {
        match args[idx].as_str() {
            "-h" | "--help" => bail!("usage: recommend [N P K temperature humidity ph rainfall] [--k K]"),
            "--k" => {
                idx += 1;
                let value = args.get(idx).ok_or_else(|| anyhow!("--k requires a value"))?;
                k = value.parse().with_context(|| format!("invalid --k value: {}", value))?;
            }
            value => {
                let v: f64 = value
                    .parse()
                    .with_context(|| format!("invalid feature value: {}", value))?;
                features.push(v);
            }
        }
        idx += 1;
    }

    if features.is_empty() {
        features = DEFAULT_READING.to_vec();
    }
    Ok(CliOptions { features, k })
}

fn main() -> anyhow::Result<()> {
    init_tracing();

    let options = parse_args(std::env::args().skip(1).collect())?;
    let config = PipelineConfig::resolve().context("invalid pipeline configuration")?;

    let service = InferenceService::global(&config.artifacts).with_context(|| {
        format!(
            "loading model from {} (run train_model first)",
            config.artifacts.dir.display()
        )
    })?;

    let result = service.predict_top_k(&options.features, options.k)?;
    let enriched = enrich(&result, &InMemoryMetadataStore::with_defaults());

    println!("\n{}", "=".repeat(80));
    println!("CROP RECOMMENDATIONS (top {})", result.len());
    println!("{}", "=".repeat(80));
    println!("\nInput ({} features): {:?}", NUM_FEATURES, options.features);
    if result.clamped {
        println!("Note: k={} exceeds {} known crops", result.requested_k, service.available_crops().len());
    }
    println!();

    for (rank, item) in enriched.iter().enumerate() {
        let rec = &item.recommendation;
        let (season, expected_yield) = match &item.metadata {
            Some(m) => (
                m.season.as_deref().unwrap_or("-"),
                m.expected_yield.as_deref().unwrap_or("-"),
            ),
            None => ("-", "-"),
        };
        println!(
            "  {}. {:<16} {:>6.2}%   season: {:<14} yield: {}",
            rank + 1,
            rec.crop_name,
            rec.confidence_percent,
            season,
            expected_yield
        );
    }

    Ok(())
}
