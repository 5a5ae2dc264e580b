//! Frozen feature scaling transforms
//!
//! Parameters are learned at training time and only applied here; there
//! is no `fit`.

use crate::error::{PredictError, PredictResult};
use serde::{Deserialize, Serialize};

/// A fitted per-feature scaling transform
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Scaler {
    /// `(x - mean) / scale`
    Standard { mean: Vec<f64>, scale: Vec<f64> },
    /// `x * scale + min`
    MinMax { min: Vec<f64>, scale: Vec<f64> },
}

impl Scaler {
    /// Number of input features the transform was fitted on
    pub fn num_features(&self) -> usize {
        match self {
            Scaler::Standard { mean, .. } => mean.len(),
            Scaler::MinMax { min, .. } => min.len(),
        }
    }

    /// Check internal consistency after deserialization
    pub fn validate(&self) -> Result<(), String> {
        let (offsets, scale) = match self {
            Scaler::Standard { mean, scale } => (mean, scale),
            Scaler::MinMax { min, scale } => (min, scale),
        };
        if offsets.is_empty() {
            return Err("scaler has no features".to_string());
        }
        if offsets.len() != scale.len() {
            return Err(format!(
                "scaler parameter lengths differ: {} offsets vs {} scales",
                offsets.len(),
                scale.len()
            ));
        }
        if offsets.iter().chain(scale.iter()).any(|v| !v.is_finite()) {
            return Err("scaler parameters must be finite".to_string());
        }
        Ok(())
    }

    /// Apply the transform to one row. NaN inputs stay NaN.
    pub fn transform(&self, row: &[f64]) -> PredictResult<Vec<f64>> {
        let expected = self.num_features();
        if row.len() != expected {
            return Err(PredictError::invalid(format!(
                "scaler expects {} features, got {}",
                expected,
                row.len()
            )));
        }

        let scaled = match self {
            Scaler::Standard { mean, scale } => row
                .iter()
                .zip(mean.iter().zip(scale))
                .map(|(&x, (&m, &s))| {
                    // Constant columns were fitted with scale 0; treated as 1
                    let s = if s == 0.0 { 1.0 } else { s };
                    (x - m) / s
                })
                .collect(),
            Scaler::MinMax { min, scale } => row
                .iter()
                .zip(min.iter().zip(scale))
                .map(|(&x, (&lo, &s))| x * s + lo)
                .collect(),
        };
        Ok(scaled)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_standard_transform() {
        let scaler = Scaler::Standard {
            mean: vec![50.0, 120.0],
            scale: vec![10.0, 20.0],
        };
        assert_eq!(scaler.transform(&[60.0, 100.0]).unwrap(), vec![1.0, -1.0]);
    }

    #[test]
    fn test_zero_scale_treated_as_one() {
        let scaler = Scaler::Standard {
            mean: vec![1.0],
            scale: vec![0.0],
        };
        assert_eq!(scaler.transform(&[3.0]).unwrap(), vec![2.0]);
    }

    #[test]
    fn test_min_max_transform() {
        let scaler = Scaler::MinMax {
            min: vec![-0.5],
            scale: vec![0.01],
        };
        let out = scaler.transform(&[100.0]).unwrap();
        assert!((out[0] - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_nan_passes_through() {
        let scaler = Scaler::Standard {
            mean: vec![0.0, 0.0],
            scale: vec![1.0, 1.0],
        };
        let out = scaler.transform(&[f64::NAN, 2.0]).unwrap();
        assert!(out[0].is_nan());
        assert_eq!(out[1], 2.0);
    }

    #[test]
    fn test_dimension_mismatch_is_invalid_input() {
        let scaler = Scaler::Standard {
            mean: vec![0.0; 3],
            scale: vec![1.0; 3],
        };
        let err = scaler.transform(&[1.0, 2.0]).unwrap_err();
        assert!(matches!(err, PredictError::InvalidInput(_)));
    }

    #[test]
    fn test_deserialize_and_validate() {
        let scaler: Scaler =
            serde_json::from_str(r#"{"type": "standard", "mean": [1.0, 2.0], "scale": [1.0]}"#)
                .unwrap();
        assert!(scaler.validate().is_err());

        let scaler: Scaler =
            serde_json::from_str(r#"{"type": "min_max", "min": [0.0], "scale": [0.5]}"#).unwrap();
        assert!(scaler.validate().is_ok());
        assert_eq!(scaler.num_features(), 1);
    }
}
