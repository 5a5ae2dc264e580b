//! Type definitions for the risk prediction service

pub mod input;
pub mod prediction;

pub use input::{Coerced, RawInput, RawValue};
pub use prediction::{ErrorResponse, PredictionResponse, PredictionResult};
