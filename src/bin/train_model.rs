//! Train, evaluate and persist the crop classifier
//!
//! Two-Stage Run:
//!   Stage 1: baseline forest (200 trees) on the RAW generated dataset
//!   Stage 2: final forest (`train.forest.n_trees`, default 300) on the AUGMENTED dataset
//!
//! Both stages use a stratified 80/20 split. The accuracy change between the
//! two is reported as the cost of noise and label merging. The final
//! (forest, encoder) pair is written to the artifact directory
//! (`CROP_MODEL_DIR`, default `models/`).

use anyhow::Context;
use crop_recommender::dataset::{read_csv, Dataset};
use crop_recommender::evaluation::metrics::EvaluationReport;
use crop_recommender::evaluation::{holdout_evaluation, DatasetComparison};
use crop_recommender::model::ForestParams;
use crop_recommender::utils::init_tracing;
use crop_recommender::{PipelineConfig, TrainingPipeline};
use std::path::Path;
use std::time::Instant;

fn load(path: &Path, producer: &str) -> anyhow::Result<Dataset> {
    let dataset = read_csv(path)
        .with_context(|| format!("reading {} (run {} first)", path.display(), producer))?;
    println!(
        "Loaded {}: {} rows, {} classes",
        path.display(),
        dataset.len(),
        dataset.distinct_labels().len()
    );
    Ok(dataset)
}

fn main() -> anyhow::Result<()> {
    init_tracing();

    println!("\n{}", "=".repeat(80));
    println!("CROP CLASSIFIER TRAINING");
    println!("{}", "=".repeat(80));

    let config = PipelineConfig::resolve().context("invalid pipeline configuration")?;
    println!();
    let raw = load(&config.data.raw_csv, "generate_dataset")?;
    let augmented = load(&config.data.augmented_csv, "augment_dataset")?;

    let pipeline = TrainingPipeline::new(config.train.clone(), config.seed)?;

    // STAGE 1: BASELINE
    println!("\n{}", "=".repeat(80));
    println!("STAGE 1: BASELINE ON RAW DATA ({} trees)", ForestParams::baseline().n_trees);
    println!("{}", "=".repeat(80));

    let stage1_start = Instant::now();
    let baseline = pipeline.with_forest(ForestParams::baseline())?;
    let (outcome, raw_report) = holdout_evaluation(&baseline, &raw)?;
    println!("\nTrain rows: {}  Test rows: {}", outcome.split.train.len(), outcome.split.test.len());
    println!("Baseline accuracy: {:.4}", raw_report.accuracy);
    println!("Elapsed: {:.1}s", stage1_start.elapsed().as_secs_f64());

    // STAGE 2: FINAL MODEL
    println!("\n{}", "=".repeat(80));
    println!("STAGE 2: FINAL MODEL ON AUGMENTED DATA ({} trees)", config.train.forest.n_trees);
    println!("{}", "=".repeat(80));

    let stage2_start = Instant::now();
    let (outcome, augmented_report) = holdout_evaluation(&pipeline, &augmented)?;
    print_report(&augmented_report);
    println!("Elapsed: {:.1}s", stage2_start.elapsed().as_secs_f64());

    let comparison = DatasetComparison::new(raw_report, augmented_report);
    println!("\n{}", "=".repeat(80));
    println!("AUGMENTATION IMPACT");
    println!("{}", "=".repeat(80));
    println!("\n  Raw accuracy:       {:.4} ({} classes)", comparison.raw.accuracy, comparison.raw.confusion.labels.len());
    println!("  Augmented accuracy: {:.4} ({} classes)", comparison.augmented.accuracy, comparison.augmented.confusion.labels.len());
    println!("  Change:             {:+.4} ({} classes merged)", comparison.accuracy_delta(), comparison.merged_classes());

    outcome
        .bundle
        .save(&config.artifacts)
        .with_context(|| format!("saving artifacts to {}", config.artifacts.dir.display()))?;
    println!("\n✓ Saved: {}", config.artifacts.model_path().display());
    println!("✓ Saved: {}", config.artifacts.encoder_path().display());

    Ok(())
}

fn print_report(report: &EvaluationReport) {
    println!("\nAccuracy: {:.4}\n", report.accuracy);
    println!("{}", report);

    println!("Feature importances:");
    for fi in &report.importances {
        println!("  {:<12} {:.4}", fi.feature.to_string(), fi.importance);
    }

    let confusions = report.confusion.top_confusions(10);
    if !confusions.is_empty() {
        println!("\nMost frequent confusions (true -> predicted):");
        for (actual, predicted, count) in confusions {
            println!("  {:<16} -> {:<16} {}", actual, predicted, count);
        }
    }
}
