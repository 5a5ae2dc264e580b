use heart_risk_service::config::ArtifactsConfig;
use heart_risk_service::error::ArtifactError;
use heart_risk_service::models::loader::{load_classifier, load_feature_schema, load_scaler};
use heart_risk_service::{ArtifactBundle, ArtifactLoader, FRAMINGHAM_FEATURES};
use std::path::{Path, PathBuf};

fn bundled_model_dir() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("model")
}

fn write(dir: &Path, name: &str, contents: &str) {
    std::fs::write(dir.join(name), contents).expect("write artifact");
}

#[test]
fn loads_bundled_framingham_artifacts() {
    let bundle = ArtifactBundle::load(bundled_model_dir());
    assert!(bundle.is_ready());
    assert_eq!(bundle.feature_count(), 15);
    let schema = bundle.features.expect("schema");
    assert_eq!(schema.names(), &FRAMINGHAM_FEATURES.map(String::from)[..]);
}

#[test]
fn feature_order_accepts_plain_list() {
    let tmp = tempfile::tempdir().expect("tmpdir");
    write(tmp.path(), "feature_order.json", r#"["age", "sysBP", "BMI"]"#);
    let schema = load_feature_schema(tmp.path().join("feature_order.json")).expect("load");
    assert_eq!(schema.names(), ["age", "sysBP", "BMI"]);
}

#[test]
fn feature_order_object_without_features_is_empty() {
    let tmp = tempfile::tempdir().expect("tmpdir");
    write(tmp.path(), "feature_order.json", r#"{"version": 2}"#);
    let schema = load_feature_schema(tmp.path().join("feature_order.json")).expect("load");
    assert!(schema.is_empty());
}

#[test]
fn duplicate_feature_names_are_rejected() {
    let tmp = tempfile::tempdir().expect("tmpdir");
    write(tmp.path(), "feature_order.json", r#"["age", "age"]"#);
    let err = load_feature_schema(tmp.path().join("feature_order.json")).unwrap_err();
    assert!(matches!(err, ArtifactError::Invalid { .. }));
}

#[test]
fn each_slot_fails_independently() {
    let tmp = tempfile::tempdir().expect("tmpdir");
    write(tmp.path(), "model.json", "{ this is not json");
    write(
        tmp.path(),
        "scaler.json",
        r#"{"type": "standard", "mean": [0.0, 1.0], "scale": [1.0, 2.0]}"#,
    );

    let bundle = ArtifactBundle::load(tmp.path());
    assert!(bundle.model.is_none());
    assert!(bundle.scaler.is_some());
    assert!(bundle.features.is_none());
    assert!(!bundle.is_ready());
}

#[test]
fn corrupt_model_reports_parse_error() {
    let tmp = tempfile::tempdir().expect("tmpdir");
    write(tmp.path(), "model.json", r#"{"type": "neural_net"}"#);
    let err = load_classifier(tmp.path().join("model.json")).unwrap_err();
    assert!(matches!(err, ArtifactError::Parse { .. }));
}

#[test]
fn inconsistent_scaler_is_invalid() {
    let tmp = tempfile::tempdir().expect("tmpdir");
    write(
        tmp.path(),
        "scaler.json",
        r#"{"type": "standard", "mean": [0.0, 1.0], "scale": [1.0]}"#,
    );
    let err = load_scaler(tmp.path().join("scaler.json")).unwrap_err();
    assert!(matches!(err, ArtifactError::Invalid { .. }));
}

#[test]
fn tree_referencing_unknown_feature_is_invalid() {
    let tmp = tempfile::tempdir().expect("tmpdir");
    write(
        tmp.path(),
        "model.json",
        r#"{
            "type": "gradient_boosting",
            "num_features": 2,
            "trees": [{
                "left_children": [1, -1, -1],
                "right_children": [2, -1, -1],
                "split_indices": [5, 0, 0],
                "split_conditions": [0.0, 0.0, 0.0],
                "leaf_values": [0.0, -1.0, 1.0]
            }]
        }"#,
    );
    let err = load_classifier(tmp.path().join("model.json")).unwrap_err();
    assert!(matches!(err, ArtifactError::Invalid { .. }));
}

#[test]
fn loader_honours_configured_file_names() {
    let tmp = tempfile::tempdir().expect("tmpdir");
    write(
        tmp.path(),
        "clf.json",
        r#"{"type": "logistic_regression", "coefficients": [0.5], "intercept": 0.0}"#,
    );
    write(
        tmp.path(),
        "norm.json",
        r#"{"type": "min_max", "min": [0.0], "scale": [0.1]}"#,
    );
    write(tmp.path(), "cols.json", r#"{"features": ["age"]}"#);

    let config = ArtifactsConfig {
        model_dir: tmp.path().display().to_string(),
        model_file: "clf.json".to_string(),
        scaler_file: "norm.json".to_string(),
        features_file: "cols.json".to_string(),
    };
    let bundle = ArtifactLoader::from_config(&config).load(&config.model_dir);
    assert!(bundle.is_ready());
    assert_eq!(bundle.feature_count(), 1);

    // default names find nothing here
    assert!(!ArtifactBundle::load(tmp.path()).is_ready());
}
