use heart_risk_service::models::classifier::{Classifier, RandomForest, Voting};
use heart_risk_service::models::scaler::Scaler;
use heart_risk_service::models::tree::{SplitRule, Tree};
use heart_risk_service::{
    ArtifactBundle, FeatureSchema, FillPolicy, InferenceEngine, PredictError, RawInput,
    FRAMINGHAM_FEATURES,
};
use std::path::Path;

fn framingham_bundle() -> ArtifactBundle {
    ArtifactBundle::load(Path::new(env!("CARGO_MANIFEST_DIR")).join("model"))
}

fn sample_record() -> RawInput {
    RawInput::from_pairs([
        ("male", 1.0),
        ("age", 60.0),
        ("education", 2.0),
        ("currentSmoker", 1.0),
        ("cigsPerDay", 20.0),
        ("BPMeds", 0.0),
        ("prevalentStroke", 0.0),
        ("prevalentHyp", 1.0),
        ("diabetes", 0.0),
        ("totChol", 250.0),
        ("sysBP", 140.0),
        ("diaBP", 90.0),
        ("BMI", 28.5),
        ("heartRate", 75.0),
        ("glucose", 110.0),
    ])
}

#[test]
fn sample_record_yields_label_and_probability() {
    let bundle = framingham_bundle();
    let result = InferenceEngine::default()
        .predict(&bundle, &sample_record())
        .expect("prediction");

    assert!(result.prediction <= 1);
    assert!((0.0..=1.0).contains(&result.probability));
    assert_eq!(result.features_used, FRAMINGHAM_FEATURES.map(String::from).to_vec());
}

#[test]
fn form_style_string_values_match_numeric_values() {
    let bundle = framingham_bundle();
    let engine = InferenceEngine::default();
    let as_text: RawInput = sample_record()
        .iter()
        .map(|(k, v)| match v {
            heart_risk_service::RawValue::Number(n) => (k.to_string(), format!("{n:.1}")),
            other => panic!("unexpected value {other:?}"),
        })
        .collect();

    assert_eq!(
        engine.predict(&bundle, &sample_record()).unwrap(),
        engine.predict(&bundle, &as_text).unwrap()
    );
}

#[test]
fn key_order_does_not_matter() {
    let bundle = framingham_bundle();
    let engine = InferenceEngine::default();
    let reversed: RawInput = sample_record()
        .iter()
        .map(|(k, v)| (k.to_string(), v.clone()))
        .collect::<Vec<_>>()
        .into_iter()
        .rev()
        .collect();

    let a = engine.predict(&bundle, &sample_record()).unwrap();
    let b = engine.predict(&bundle, &reversed).unwrap();
    assert_eq!(a, b);
}

#[test]
fn repeated_predictions_are_identical() {
    let bundle = framingham_bundle();
    let engine = InferenceEngine::default();
    let first = engine.predict(&bundle, &sample_record()).unwrap();
    let second = engine.predict(&bundle, &sample_record()).unwrap();
    assert_eq!(first, second);
}

#[test]
fn empty_input_predicts_with_zero_fill() {
    let bundle = framingham_bundle();
    let result = InferenceEngine::with_policy(FillPolicy::Zero, 0.5)
        .predict(&bundle, &RawInput::new())
        .expect("prediction");
    assert!(result.prediction <= 1);
    assert!((0.0..=1.0).contains(&result.probability));
    assert_eq!(result.features_used.len(), 15);
}

#[test]
fn empty_input_predicts_with_nan_fill() {
    let bundle = framingham_bundle();
    let result = InferenceEngine::with_policy(FillPolicy::Nan, 0.5)
        .predict(&bundle, &RawInput::new())
        .expect("prediction");
    assert!((0.0..=1.0).contains(&result.probability));
}

#[test]
fn unexpected_fields_are_ignored() {
    let bundle = framingham_bundle();
    let engine = InferenceEngine::default();
    let mut noisy = sample_record();
    noisy.insert("patientName", "Jane Doe");
    noisy.insert("TenYearCHD", 1.0);

    assert_eq!(
        engine.predict(&bundle, &sample_record()).unwrap(),
        engine.predict(&bundle, &noisy).unwrap()
    );
}

#[test]
fn malformed_values_are_treated_as_missing() {
    let bundle = framingham_bundle();
    let engine = InferenceEngine::with_policy(FillPolicy::Zero, 0.5);

    let mut garbled = sample_record();
    garbled.insert("glucose", "high");
    let mut zeroed = sample_record();
    zeroed.insert("glucose", 0.0);

    assert_eq!(
        engine.predict(&bundle, &garbled).unwrap(),
        engine.predict(&bundle, &zeroed).unwrap()
    );
}

#[test]
fn empty_model_slot_is_unavailable() {
    let mut bundle = framingham_bundle();
    bundle.model = None;
    let err = InferenceEngine::default()
        .predict(&bundle, &sample_record())
        .unwrap_err();
    assert_eq!(err, PredictError::ModelUnavailable);
}

#[test]
fn hard_voting_falls_back_to_label() {
    let leaf = |value: f64| Tree {
        left_children: vec![-1],
        right_children: vec![-1],
        split_indices: vec![0],
        split_conditions: vec![0.0],
        default_left: Vec::new(),
        leaf_values: vec![value],
    };
    let bundle = ArtifactBundle::new(
        Some(Classifier::RandomForest(RandomForest {
            num_features: 1,
            voting: Voting::Hard,
            split_rule: SplitRule::LessEqual,
            trees: vec![leaf(0.9), leaf(0.8), leaf(0.1)],
        })),
        Some(Scaler::Standard {
            mean: vec![0.0],
            scale: vec![1.0],
        }),
        Some(FeatureSchema::new(["age"])),
    );

    let result = InferenceEngine::default()
        .predict(&bundle, &RawInput::from_pairs([("age", "50")]))
        .unwrap();
    assert_eq!(result.prediction, 1);
    assert_eq!(result.probability, 1.0);
}
