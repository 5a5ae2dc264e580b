//! Trained artifacts and inference

pub mod classifier;
pub mod inference;
pub mod loader;
pub mod scaler;
pub mod tree;

pub use classifier::{BinaryClassifier, Classifier};
pub use inference::InferenceEngine;
pub use loader::{ArtifactBundle, ArtifactLoader, FeatureSchema};
pub use scaler::Scaler;
