//! Prediction results and their wire representation

use serde::{Deserialize, Serialize};

/// Outcome of a single prediction
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PredictionResult {
    /// Predicted label, 0 or 1
    pub prediction: u8,
    /// Positive-class probability in [0, 1]
    pub probability: f64,
    /// Feature names the vector was aligned against, in vector order
    pub features_used: Vec<String>,
}

impl PredictionResult {
    /// Probability as a percentage with two decimals, e.g. `"37.21%"`
    pub fn probability_percent(&self) -> String {
        format!("{:.2}%", self.probability * 100.0)
    }

    pub fn to_response(&self) -> PredictionResponse {
        PredictionResponse {
            prediction: self.prediction,
            probability: self.probability_percent(),
        }
    }
}

/// JSON body returned by the prediction endpoint
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionResponse {
    pub prediction: u8,
    pub probability: String,
}

/// JSON body returned on any request failure
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_percent_formatting() {
        let result = PredictionResult {
            prediction: 0,
            probability: 0.372_149,
            features_used: vec!["age".to_string()],
        };
        assert_eq!(result.probability_percent(), "37.21%");

        let response = result.to_response();
        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["prediction"], 0);
        assert_eq!(json["probability"], "37.21%");
    }

    #[test]
    fn test_certain_prediction_formatting() {
        let result = PredictionResult {
            prediction: 1,
            probability: 1.0,
            features_used: Vec::new(),
        };
        assert_eq!(result.probability_percent(), "100.00%");
    }
}
