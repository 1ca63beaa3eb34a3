//! Inference service lifecycle: load once, cached reads, atomic reload

use std::collections::HashSet;
use std::sync::Arc;
use std::thread;

use crop_recommender::dataset::{default_crop_profiles, DatasetGenerator};
use crop_recommender::model::ForestParams;
use crop_recommender::training::TrainConfig;
use crop_recommender::{ArtifactPaths, CropError, InferenceService, ModelBundle, TrainingPipeline};

const QUERY: [f64; 7] = [90.0, 42.0, 43.0, 24.5, 68.0, 6.7, 120.0];
const FIRST_MODEL: [&str; 4] = ["rice", "chickpea", "apple", "cotton"];
const SECOND_MODEL: [&str; 3] = ["banana", "coffee", "jute"];

fn train(crops: &[&str]) -> ModelBundle {
    let profiles = default_crop_profiles()
        .into_iter()
        .filter(|p| crops.contains(&p.name.as_str()))
        .collect();
    let dataset = DatasetGenerator::new(profiles, 30, 42).unwrap().generate();
    let config = TrainConfig {
        forest: ForestParams { n_trees: 10, ..ForestParams::default() },
        ..TrainConfig::default()
    };
    TrainingPipeline::new(config, 42).unwrap().fit_full(&dataset).unwrap()
}

fn names(crops: &[&str]) -> HashSet<String> {
    crops.iter().map(|s| s.to_string()).collect()
}

#[test]
fn test_reload_picks_up_new_artifacts_without_touching_in_flight_requests() {
    let dir = tempfile::tempdir().unwrap();
    let paths = ArtifactPaths::new(dir.path());
    train(&FIRST_MODEL).save(&paths).unwrap();

    let service = InferenceService::load(paths.clone()).unwrap();
    let first = names(&FIRST_MODEL);
    let before = service.predict_top_k(&QUERY, 3).unwrap();
    assert!(before.recommendations.iter().all(|r| first.contains(&r.crop_name)));

    // A request that started before the swap holds the old predictor
    let in_flight = service.current();

    train(&SECOND_MODEL).save(&paths).unwrap();
    // Nothing changes until reload is called
    assert_eq!(service.available_crops().len(), FIRST_MODEL.len());

    service.reload().unwrap();
    assert_eq!(service.load_count(), 2);

    let second = names(&SECOND_MODEL);
    let after = service.predict_top_k(&QUERY, 3).unwrap();
    assert!(after.recommendations.iter().all(|r| second.contains(&r.crop_name)));

    let old = in_flight.predict_top_k(&QUERY, 3).unwrap();
    assert_eq!(old, before);
}

#[test]
fn test_concurrent_reads_never_see_a_torn_pair() {
    let dir = tempfile::tempdir().unwrap();
    let paths = ArtifactPaths::new(dir.path());
    let first_bundle = train(&FIRST_MODEL);
    let second_bundle = train(&SECOND_MODEL);
    first_bundle.save(&paths).unwrap();

    let service = Arc::new(InferenceService::load(paths.clone()).unwrap());
    let first = names(&FIRST_MODEL);
    let second = names(&SECOND_MODEL);

    thread::scope(|scope| {
        for _ in 0..4 {
            let service = Arc::clone(&service);
            let (first, second) = (&first, &second);
            scope.spawn(move || {
                for _ in 0..50 {
                    let result = service.predict_top_k(&QUERY, 3).unwrap();
                    let crops: HashSet<String> =
                        result.recommendations.iter().map(|r| r.crop_name.clone()).collect();
                    assert!(crops.is_subset(first) || crops.is_subset(second));
                }
            });
        }

        let service = Arc::clone(&service);
        scope.spawn(move || {
            second_bundle.save(&paths).unwrap();
            service.reload().unwrap();
        });
    });

    assert_eq!(service.available_crops().len(), SECOND_MODEL.len());
}

#[test]
fn test_per_request_errors() {
    let dir = tempfile::tempdir().unwrap();
    let paths = ArtifactPaths::new(dir.path());
    train(&FIRST_MODEL).save(&paths).unwrap();
    let service = InferenceService::load(paths).unwrap();

    assert!(matches!(
        service.predict_top_k(&QUERY[..6], 3),
        Err(CropError::ShapeMismatch { .. })
    ));
    assert!(matches!(
        service.predict_top_k(&QUERY, 0),
        Err(CropError::InvalidK { .. })
    ));

    let clamped = service.predict_top_k(&QUERY, 50).unwrap();
    assert!(clamped.clamped);
    assert_eq!(clamped.len(), FIRST_MODEL.len());

    // The service keeps working after rejected requests
    assert_eq!(service.predict_top_k(&QUERY, 2).unwrap().len(), 2);
}

#[test]
fn test_global_instance_loads_once() {
    let dir = tempfile::tempdir().unwrap();
    let paths = ArtifactPaths::new(dir.path().join("missing"));

    // A failed first load caches nothing
    assert!(matches!(
        InferenceService::global(&paths),
        Err(CropError::ArtifactNotFound { .. })
    ));
    assert!(InferenceService::try_global().is_none());

    train(&FIRST_MODEL).save(&paths).unwrap();
    let handles: Vec<_> = (0..4)
        .map(|_| {
            let paths = paths.clone();
            thread::spawn(move || InferenceService::global(&paths).unwrap() as *const InferenceService as usize)
        })
        .collect();
    let addresses: HashSet<usize> = handles.into_iter().map(|h| h.join().unwrap()).collect();
    assert_eq!(addresses.len(), 1);

    let service = InferenceService::try_global().unwrap();
    assert_eq!(service.load_count(), 1);
    assert_eq!(service.predict_top_k(&QUERY, 3).unwrap().len(), 3);
}
