//! Trained artifact loader
//!
//! Reads the classifier, the scaler and the feature ordering from a model
//! directory. Each artifact loads independently; a failure leaves that slot
//! empty and is only reported when a prediction is attempted.

use crate::config::ArtifactsConfig;
use crate::error::ArtifactError;
use crate::models::classifier::{BinaryClassifier, Classifier};
use crate::models::scaler::Scaler;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Ordered feature names fixed at training time
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FeatureSchema(Vec<String>);

impl FeatureSchema {
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self(names.into_iter().map(Into::into).collect())
    }

    pub fn names(&self) -> &[String] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// On-disk layouts accepted for the feature-order file
#[derive(Deserialize)]
#[serde(untagged)]
enum FeatureOrderFile {
    List(Vec<String>),
    Object {
        #[serde(default)]
        features: Vec<String>,
    },
}

/// The three trained artifacts. Immutable once loaded.
#[derive(Debug, Clone, Default)]
pub struct ArtifactBundle {
    pub model: Option<Classifier>,
    pub scaler: Option<Scaler>,
    pub features: Option<FeatureSchema>,
}

impl ArtifactBundle {
    pub fn new(
        model: Option<Classifier>,
        scaler: Option<Scaler>,
        features: Option<FeatureSchema>,
    ) -> Self {
        Self {
            model,
            scaler,
            features,
        }
    }

    /// Load from `model_dir` using the default file names
    pub fn load<P: AsRef<Path>>(model_dir: P) -> Self {
        ArtifactLoader::default().load(model_dir)
    }

    /// Whether model and scaler are both present
    pub fn is_ready(&self) -> bool {
        self.model.is_some() && self.scaler.is_some()
    }

    /// Loaded schema length, 0 when absent
    pub fn feature_count(&self) -> usize {
        self.features.as_ref().map_or(0, FeatureSchema::len)
    }
}

/// Loader for the artifact directory
#[derive(Debug, Clone)]
pub struct ArtifactLoader {
    model_file: String,
    scaler_file: String,
    features_file: String,
}

impl ArtifactLoader {
    /// Create a loader with the configured file names
    pub fn from_config(config: &ArtifactsConfig) -> Self {
        Self {
            model_file: config.model_file.clone(),
            scaler_file: config.scaler_file.clone(),
            features_file: config.features_file.clone(),
        }
    }

    /// Load all three artifacts; never fails
    pub fn load<P: AsRef<Path>>(&self, model_dir: P) -> ArtifactBundle {
        let model_dir = model_dir.as_ref();
        info!(dir = %model_dir.display(), "Loading artifacts");

        let model = settle("model", load_classifier(model_dir.join(&self.model_file)));
        let scaler = settle("scaler", load_scaler(model_dir.join(&self.scaler_file)));
        let features = settle(
            "features",
            load_feature_schema(model_dir.join(&self.features_file)),
        );

        let bundle = ArtifactBundle::new(model, scaler, features);
        check_widths(&bundle);

        info!(
            ready = bundle.is_ready(),
            model = bundle.model.as_ref().map_or("none", Classifier::kind),
            features = bundle.feature_count(),
            "Artifacts loaded"
        );
        bundle
    }
}

impl Default for ArtifactLoader {
    fn default() -> Self {
        Self::from_config(&ArtifactsConfig::default())
    }
}

fn settle<T>(slot: &str, result: Result<T, ArtifactError>) -> Option<T> {
    match result {
        Ok(value) => Some(value),
        Err(e) => {
            warn!(artifact = slot, error = %e, "Artifact unavailable");
            None
        }
    }
}

/// Width disagreements are logged here; requests fail on them later
fn check_widths(bundle: &ArtifactBundle) {
    let scaler_width = bundle.scaler.as_ref().map(Scaler::num_features);
    let model_width = bundle.model.as_ref().map(|m| m.num_features());
    let schema_width = bundle
        .features
        .as_ref()
        .filter(|f| !f.is_empty())
        .map(FeatureSchema::len);

    let widths = [
        ("scaler", scaler_width),
        ("model", model_width),
        ("features", schema_width),
    ];
    let known: Vec<(&str, usize)> = widths
        .iter()
        .filter_map(|(name, w)| w.map(|w| (*name, w)))
        .collect();
    if known.windows(2).any(|pair| pair[0].1 != pair[1].1) {
        warn!(widths = ?known, "Artifact feature widths disagree");
    }
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T, ArtifactError> {
    let bytes = std::fs::read(path).map_err(|source| ArtifactError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_slice(&bytes).map_err(|source| ArtifactError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

fn invalid(path: &Path, reason: String) -> ArtifactError {
    ArtifactError::Invalid {
        path: path.to_path_buf(),
        reason,
    }
}

/// Load and validate a classifier artifact
pub fn load_classifier<P: Into<PathBuf>>(path: P) -> Result<Classifier, ArtifactError> {
    let path = path.into();
    let model: Classifier = read_json(&path)?;
    model.validate().map_err(|reason| invalid(&path, reason))?;
    info!(
        path = %path.display(),
        kind = model.kind(),
        num_features = model.num_features(),
        "Model loaded"
    );
    Ok(model)
}

/// Load and validate a scaler artifact
pub fn load_scaler<P: Into<PathBuf>>(path: P) -> Result<Scaler, ArtifactError> {
    let path = path.into();
    let scaler: Scaler = read_json(&path)?;
    scaler.validate().map_err(|reason| invalid(&path, reason))?;
    info!(path = %path.display(), num_features = scaler.num_features(), "Scaler loaded");
    Ok(scaler)
}

/// Load a feature order, either a bare list or `{"features": [...]}`
pub fn load_feature_schema<P: Into<PathBuf>>(path: P) -> Result<FeatureSchema, ArtifactError> {
    let path = path.into();
    let names = match read_json::<FeatureOrderFile>(&path)? {
        FeatureOrderFile::List(names) => names,
        FeatureOrderFile::Object { features } => features,
    };

    if let Some(dup) = first_duplicate(&names) {
        return Err(invalid(&path, format!("duplicate feature name {dup:?}")));
    }

    info!(path = %path.display(), count = names.len(), "Feature order loaded");
    Ok(FeatureSchema(names))
}

fn first_duplicate(names: &[String]) -> Option<&String> {
    let mut seen = HashSet::with_capacity(names.len());
    names.iter().find(|n| !seen.insert(n.as_str()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_dir_yields_empty_bundle() {
        let bundle = ArtifactBundle::load("/nonexistent/model/dir");
        assert!(bundle.model.is_none());
        assert!(bundle.scaler.is_none());
        assert!(bundle.features.is_none());
        assert!(!bundle.is_ready());
        assert_eq!(bundle.feature_count(), 0);
    }

    #[test]
    fn test_first_duplicate() {
        let names: Vec<String> = ["age", "BMI", "age", "BMI"].map(String::from).to_vec();
        assert_eq!(first_duplicate(&names).map(String::as_str), Some("age"));
        assert_eq!(first_duplicate(&names[..2]), None);
    }

    #[test]
    fn test_schema_helpers() {
        let schema = FeatureSchema::new(["age", "sysBP"]);
        assert_eq!(schema.len(), 2);
        assert!(!schema.is_empty());
        assert_eq!(schema.names(), ["age", "sysBP"]);
    }

    #[test]
    fn test_io_error_names_path() {
        let err = load_scaler("/nonexistent/scaler.json").unwrap_err();
        assert!(matches!(err, ArtifactError::Io { .. }));
        assert!(err.to_string().contains("/nonexistent/scaler.json"));
    }
}
