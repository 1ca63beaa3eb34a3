//! Top-k prediction latency over a forest trained on the full augmented catalogue

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use crop_recommender::dataset::{augment, AugmentConfig, DatasetGenerator};
use crop_recommender::dataset::default_crop_profiles;
use crop_recommender::model::ForestParams;
use crop_recommender::training::TrainConfig;
use crop_recommender::{CropPredictor, TrainingPipeline};

fn build_predictor() -> CropPredictor {
    let raw = DatasetGenerator::new(default_crop_profiles(), 50, 42)
        .expect("valid catalogue")
        .generate();
    let augmented = augment(&raw, &AugmentConfig::default(), 42).expect("augmentation");
    let config = TrainConfig {
        forest: ForestParams { n_trees: 100, ..ForestParams::default() },
        ..TrainConfig::default()
    };
    let bundle = TrainingPipeline::new(config, 42)
        .expect("valid config")
        .fit_full(&augmented)
        .expect("training");
    CropPredictor::new(bundle)
}

fn bench_predict(c: &mut Criterion) {
    let predictor = build_predictor();
    let query = [90.0, 42.0, 43.0, 24.5, 68.0, 6.7, 120.0];

    c.bench_function("predict_top_k_3", |b| {
        b.iter(|| predictor.predict_top_k(black_box(&query), black_box(3)))
    });

    c.bench_function("probabilities_full", |b| {
        b.iter(|| predictor.probabilities(black_box(&query)))
    });
}

criterion_group!(benches, bench_predict);
criterion_main!(benches);
