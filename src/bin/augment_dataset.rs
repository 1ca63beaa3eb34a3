//! Augment the raw dataset: multiplicative noise, then label merging
//!
//! Reads `data.raw_csv`, writes `data.augmented_csv`. The raw file is left
//! untouched.

use anyhow::Context;
use crop_recommender::dataset::{augment, read_csv, write_csv};
use crop_recommender::utils::init_tracing;
use crop_recommender::PipelineConfig;

fn main() -> anyhow::Result<()> {
    init_tracing();

    println!("\n{}", "=".repeat(80));
    println!("DATASET AUGMENTATION");
    println!("{}", "=".repeat(80));

    let config = PipelineConfig::resolve().context("invalid pipeline configuration")?;

    let raw = read_csv(&config.data.raw_csv).with_context(|| {
        format!(
            "reading {} (run generate_dataset first)",
            config.data.raw_csv.display()
        )
    })?;
    let augmented = augment(&raw, &config.augment, config.seed)?;
    write_csv(&augmented, &config.data.augmented_csv)
        .with_context(|| format!("writing {}", config.data.augmented_csv.display()))?;

    println!("\nNoise std:       {}", config.augment.noise_std);
    println!("Rows:            {}", augmented.len());
    println!("Classes before:  {}", raw.distinct_labels().len());
    println!("Classes after:   {}", augmented.distinct_labels().len());

    println!("\nLabel merges:");
    for (from, to) in config.augment.label_map().entries_sorted() {
        println!("  {:<14} -> {}", from, to);
    }

    println!("\nClass counts:");
    for (label, count) in augmented.class_counts() {
        println!("  {:<16} {}", label, count);
    }

    println!("\n✓ Saved: {}", config.data.augmented_csv.display());
    Ok(())
}
