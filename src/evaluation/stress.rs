//! Stress battery
//!
//! Hand-authored readings for five distinct agro-climatic regimes. Each case
//! reports the single predicted label; a surprising label is something to
//! look into, not a score to average.

use serde::Serialize;

use crate::error::{CropError, Result};
use crate::features::SoilSample;
use crate::model::artifacts::ModelBundle;
use crate::model::forest::argmax;
use crate::utils::round_to;

/// One named regime
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StressCase {
    pub name: &'static str,
    pub sample: SoilSample,
}

const fn case(name: &'static str, v: [f64; 7]) -> StressCase {
    StressCase {
        name,
        sample: SoilSample {
            n: v[0],
            p: v[1],
            k: v[2],
            temperature: v[3],
            humidity: v[4],
            ph: v[5],
            rainfall: v[6],
        },
    }
}

/// The fixed battery
pub const STRESS_CASES: [StressCase; 5] = [
    case("dry/cool", [90.0, 40.0, 40.0, 18.0, 45.0, 6.8, 45.0]),
    case("wet/hot", [80.0, 30.0, 40.0, 28.0, 90.0, 6.5, 280.0]),
    case("acidic/high-rain", [30.0, 20.0, 25.0, 26.0, 85.0, 5.2, 200.0]),
    case("nutrient-rich/dry", [130.0, 70.0, 90.0, 30.0, 35.0, 7.5, 40.0]),
    case("cool/high-K", [25.0, 30.0, 180.0, 17.0, 75.0, 6.2, 110.0]),
];

/// Prediction for one case
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StressOutcome {
    pub case: &'static str,
    pub predicted: String,
    /// Probability of the predicted label, in percent (2 decimals)
    pub confidence_percent: f64,
}

pub fn run_stress_tests(bundle: &ModelBundle, cases: &[StressCase]) -> Result<Vec<StressOutcome>> {
    cases
        .iter()
        .map(|case| -> Result<StressOutcome> {
            let proba = bundle.forest.predict_proba(&case.sample.to_vector());
            let code = argmax(&proba);
            let predicted = bundle.encoder.decode(code).ok_or_else(|| {
                CropError::ArtifactMismatch(format!("class code {} has no encoder entry", code))
            })?;
            tracing::debug!(case = case.name, predicted, "stress case");
            Ok(StressOutcome {
                case: case.name,
                predicted: predicted.to_string(),
                confidence_percent: round_to(proba[code] * 100.0, 2),
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::encoder::LabelEncoder;
    use crate::model::forest::{ForestParams, RandomForest};

    #[test]
    fn test_battery_shape() {
        assert_eq!(STRESS_CASES.len(), 5);
        assert_eq!(STRESS_CASES[4].sample.k, 180.0);
        assert_eq!(STRESS_CASES[2].sample.ph, 5.2);
    }

    #[test]
    fn test_one_label_per_case() {
        let encoder = LabelEncoder::fit(["dryland", "wetland"]).unwrap();
        // Rainfall alone separates the two toy classes
        let x = vec![
            [90.0, 40.0, 40.0, 20.0, 50.0, 6.5, 40.0],
            [90.0, 40.0, 40.0, 20.0, 50.0, 6.5, 60.0],
            [90.0, 40.0, 40.0, 20.0, 50.0, 6.5, 250.0],
            [90.0, 40.0, 40.0, 20.0, 50.0, 6.5, 300.0],
        ];
        let y = vec![0, 0, 1, 1];
        let params = ForestParams { n_trees: 5, bootstrap: false, ..ForestParams::default() };
        let forest = RandomForest::fit(&x, &y, 2, &params, 42).unwrap();
        let bundle = ModelBundle::new(forest, encoder).unwrap();

        let outcomes = run_stress_tests(&bundle, &STRESS_CASES).unwrap();
        assert_eq!(outcomes.len(), 5);
        assert_eq!(outcomes[0].predicted, "dryland");
        assert_eq!(outcomes[1].predicted, "wetland");
        assert!(outcomes.iter().all(|o| (0.0..=100.0).contains(&o.confidence_percent)));
    }
}
