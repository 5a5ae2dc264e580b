//! Heart Disease Risk Prediction Service
//!
//! Loads a trained classifier, its fitted scaler and the training-time
//! feature order, aligns arbitrary client input against that schema and
//! serves binary risk predictions over HTTP.

pub mod config;
pub mod error;
pub mod feature_extractor;
pub mod metrics;
pub mod models;
pub mod server;
pub mod types;

pub use config::{AppConfig, FillPolicy};
pub use error::{ArtifactError, PredictError};
pub use feature_extractor::{FeatureExtractor, SchemaMode, FRAMINGHAM_FEATURES};
pub use models::{ArtifactBundle, ArtifactLoader, FeatureSchema, InferenceEngine};
pub use types::{PredictionResult, RawInput, RawValue};
