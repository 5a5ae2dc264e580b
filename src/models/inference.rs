//! Prediction over a loaded artifact bundle

use crate::config::{AppConfig, FillPolicy};
use crate::error::{PredictError, PredictResult};
use crate::feature_extractor::FeatureExtractor;
use crate::models::classifier::BinaryClassifier;
use crate::models::loader::ArtifactBundle;
use crate::types::input::RawInput;
use crate::types::prediction::PredictionResult;
use tracing::debug;

/// Stateless prediction engine.
///
/// Holds only the per-process policy; artifacts are passed in by reference so
/// one immutable bundle can be shared by every request.
#[derive(Debug, Clone, Copy)]
pub struct InferenceEngine {
    extractor: FeatureExtractor,
    threshold: f64,
}

impl InferenceEngine {
    /// Create an engine from configuration
    pub fn new(config: &AppConfig) -> Self {
        Self::with_policy(config.inference.fill_policy, config.inference.threshold)
    }

    pub fn with_policy(fill_policy: FillPolicy, threshold: f64) -> Self {
        Self {
            extractor: FeatureExtractor::new(fill_policy),
            threshold,
        }
    }

    pub fn fill_policy(&self) -> FillPolicy {
        self.extractor.fill_policy()
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    /// Align, scale and classify one input
    pub fn predict(&self, bundle: &ArtifactBundle, raw: &RawInput) -> PredictResult<PredictionResult> {
        let (model, scaler) = match (&bundle.model, &bundle.scaler) {
            (Some(model), Some(scaler)) => (model, scaler),
            _ => return Err(PredictError::ModelUnavailable),
        };

        let mode = self.extractor.schema_mode(bundle.features.as_ref(), raw);
        let names = mode.names();
        if names.is_empty() {
            return Err(PredictError::invalid("no features supplied"));
        }

        let row = self.extractor.extract(names, raw);
        let scaled = scaler.transform(&row)?;

        if scaled.len() != model.num_features() {
            return Err(PredictError::invalid(format!(
                "model expects {} features, got {}",
                model.num_features(),
                scaled.len()
            )));
        }

        let (prediction, probability) = match model.predict_proba(&scaled) {
            Some(p) if p.is_nan() => {
                return Err(PredictError::invalid("model produced no probability for this input"));
            }
            Some(p) => {
                let p = p.clamp(0.0, 1.0);
                (u8::from(p >= self.threshold), p)
            }
            None => {
                let label = model.predict_label(&scaled);
                (label, f64::from(label))
            }
        };

        debug!(
            schema = if mode.is_fixed() { "fixed" } else { "inferred" },
            features = names.len(),
            prediction,
            probability,
            "Prediction complete"
        );

        Ok(PredictionResult {
            prediction,
            probability,
            features_used: names.to_vec(),
        })
    }

    /// Run predictions for several inputs against the same bundle
    pub fn predict_batch(
        &self,
        bundle: &ArtifactBundle,
        inputs: &[RawInput],
    ) -> Vec<PredictResult<PredictionResult>> {
        inputs.iter().map(|raw| self.predict(bundle, raw)).collect()
    }
}

impl Default for InferenceEngine {
    fn default() -> Self {
        Self::with_policy(FillPolicy::default(), 0.5)
    }
}
