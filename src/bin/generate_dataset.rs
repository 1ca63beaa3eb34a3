//! Generate the synthetic crop dataset
//!
//! Writes `data.raw_csv` (default `data/crop_data.csv`) from the crop
//! catalogue: `rows_per_crop` rows per crop, shuffled once with the seed.
//!
//! Config: `CROP_CONFIG` (JSON), `CROP_SEED`.

use anyhow::Context;
use crop_recommender::dataset::{write_csv, DatasetGenerator};
use crop_recommender::utils::init_tracing;
use crop_recommender::PipelineConfig;
use std::time::Instant;

fn main() -> anyhow::Result<()> {
    init_tracing();

    println!("\n{}", "=".repeat(80));
    println!("SYNTHETIC CROP DATASET GENERATION");
    println!("{}", "=".repeat(80));

    let config = PipelineConfig::resolve().context("invalid pipeline configuration")?;
    let start = Instant::now();

    let generator = DatasetGenerator::from_config(&config.generator, config.seed)?;
    let dataset = generator.generate();
    write_csv(&dataset, &config.data.raw_csv)
        .with_context(|| format!("writing {}", config.data.raw_csv.display()))?;

    println!("\nCrops:         {}", generator.profiles().len());
    println!("Rows per crop: {}", generator.rows_per_crop());
    println!("Total rows:    {}", dataset.len());
    println!("Seed:          {}", config.seed);
    println!("\n✓ Saved: {}", config.data.raw_csv.display());
    println!("Elapsed: {:.2}s", start.elapsed().as_secs_f64());

    println!("\nFirst rows:");
    for sample in dataset.iter().take(5) {
        println!("  {:?} -> {}", sample.features, sample.label);
    }

    Ok(())
}
