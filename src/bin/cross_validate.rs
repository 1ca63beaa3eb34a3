//! Stratified k-fold accuracy on the raw dataset, and on the augmented one
//! when it exists, so the cost of augmentation is visible per fold

use anyhow::Context;
use crop_recommender::dataset::read_csv;
use crop_recommender::training::CrossValidationReport;
use crop_recommender::utils::init_tracing;
use crop_recommender::{PipelineConfig, TrainingPipeline};
use std::time::Instant;

fn print_folds(title: &str, report: &CrossValidationReport) {
    println!("\n{}", title);
    for (i, acc) in report.fold_accuracies.iter().enumerate() {
        println!("  Fold {}: {:.4}", i + 1, acc);
    }
    println!("  Mean accuracy: {:.4} ± {:.4}", report.mean, report.std);
}

fn main() -> anyhow::Result<()> {
    init_tracing();

    let config = PipelineConfig::resolve().context("invalid pipeline configuration")?;

    println!("\n{}", "=".repeat(80));
    println!("STRATIFIED {}-FOLD CROSS-VALIDATION", config.train.k_folds);
    println!("{}", "=".repeat(80));

    let raw = read_csv(&config.data.raw_csv).with_context(|| {
        format!(
            "reading {} (run generate_dataset first)",
            config.data.raw_csv.display()
        )
    })?;

    let start = Instant::now();
    let pipeline = TrainingPipeline::new(config.train.clone(), config.seed)?;
    let raw_report = pipeline.cross_validate(&raw)?;
    print_folds(&format!("Raw dataset ({} rows)", raw.len()), &raw_report);

    if config.data.augmented_csv.exists() {
        let augmented = read_csv(&config.data.augmented_csv)
            .with_context(|| format!("reading {}", config.data.augmented_csv.display()))?;
        let augmented_report = pipeline.cross_validate(&augmented)?;
        print_folds(&format!("Augmented dataset ({} rows)", augmented.len()), &augmented_report);
        println!("\nMean accuracy change: {:+.4}", augmented_report.mean - raw_report.mean);
    } else {
        println!(
            "\n{} not found; run augment_dataset to compare",
            config.data.augmented_csv.display()
        );
    }

    println!("\nElapsed: {:.1}s", start.elapsed().as_secs_f64());

    Ok(())
}
