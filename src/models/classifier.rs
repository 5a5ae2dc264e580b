//! Fitted binary classifiers

use crate::models::tree::{SplitRule, Tree};
use serde::{Deserialize, Serialize};

/// Common interface over the supported model families
pub trait BinaryClassifier {
    /// Width of the (scaled) input row the model was fitted on
    fn num_features(&self) -> usize;

    /// Positive-class probability, or `None` when the model has no
    /// probability output
    fn predict_proba(&self, row: &[f64]) -> Option<f64>;

    /// The model's own label for the row
    fn predict_label(&self, row: &[f64]) -> u8;
}

#[inline]
fn sigmoid(x: f64) -> f64 {
    1.0 / (1.0 + (-x).exp())
}

/// Boosted tree ensemble with a logistic link
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GradientBoosting {
    pub num_features: usize,
    /// Initial margin added before the tree outputs (log-odds)
    #[serde(default)]
    pub base_margin: f64,
    #[serde(default)]
    pub split_rule: SplitRule,
    pub trees: Vec<Tree>,
}

impl GradientBoosting {
    /// Raw log-odds before the sigmoid
    pub fn margin(&self, row: &[f64]) -> f64 {
        self.base_margin
            + self
                .trees
                .iter()
                .map(|tree| tree.predict(row, self.split_rule))
                .sum::<f64>()
    }
}

impl BinaryClassifier for GradientBoosting {
    fn num_features(&self) -> usize {
        self.num_features
    }

    fn predict_proba(&self, row: &[f64]) -> Option<f64> {
        Some(sigmoid(self.margin(row)))
    }

    fn predict_label(&self, row: &[f64]) -> u8 {
        u8::from(self.margin(row) >= 0.0)
    }
}

/// How a random forest combines its trees
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Voting {
    /// Average leaf probabilities
    #[default]
    Soft,
    /// Majority of per-tree labels; no probability output
    Hard,
}

/// Bagged tree ensemble whose leaves hold positive-class probabilities
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RandomForest {
    pub num_features: usize,
    #[serde(default)]
    pub voting: Voting,
    #[serde(default = "forest_split_rule")]
    pub split_rule: SplitRule,
    pub trees: Vec<Tree>,
}

fn forest_split_rule() -> SplitRule {
    SplitRule::LessEqual
}

impl RandomForest {
    fn mean_leaf(&self, row: &[f64]) -> f64 {
        let sum: f64 = self
            .trees
            .iter()
            .map(|tree| tree.predict(row, self.split_rule))
            .sum();
        sum / self.trees.len() as f64
    }
}

impl BinaryClassifier for RandomForest {
    fn num_features(&self) -> usize {
        self.num_features
    }

    fn predict_proba(&self, row: &[f64]) -> Option<f64> {
        match self.voting {
            Voting::Soft => Some(self.mean_leaf(row)),
            Voting::Hard => None,
        }
    }

    fn predict_label(&self, row: &[f64]) -> u8 {
        match self.voting {
            Voting::Soft => u8::from(self.mean_leaf(row) >= 0.5),
            Voting::Hard => {
                let positive = self
                    .trees
                    .iter()
                    .filter(|tree| tree.predict(row, self.split_rule) >= 0.5)
                    .count();
                // ties go to class 0
                u8::from(positive * 2 > self.trees.len())
            }
        }
    }
}

/// `sigmoid(intercept + coefficients . x)`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogisticRegression {
    pub coefficients: Vec<f64>,
    #[serde(default)]
    pub intercept: f64,
}

impl LogisticRegression {
    /// NaN features contribute nothing to the decision function
    pub fn decision(&self, row: &[f64]) -> f64 {
        self.intercept
            + self
                .coefficients
                .iter()
                .zip(row)
                .filter(|(_, x)| !x.is_nan())
                .map(|(w, x)| w * x)
                .sum::<f64>()
    }
}

impl BinaryClassifier for LogisticRegression {
    fn num_features(&self) -> usize {
        self.coefficients.len()
    }

    fn predict_proba(&self, row: &[f64]) -> Option<f64> {
        Some(sigmoid(self.decision(row)))
    }

    fn predict_label(&self, row: &[f64]) -> u8 {
        u8::from(self.decision(row) >= 0.0)
    }
}

/// Any supported model, as stored in the model artifact
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Classifier {
    GradientBoosting(GradientBoosting),
    RandomForest(RandomForest),
    LogisticRegression(LogisticRegression),
}

impl Classifier {
    /// Short model family name for logs
    pub fn kind(&self) -> &'static str {
        match self {
            Classifier::GradientBoosting(_) => "gradient_boosting",
            Classifier::RandomForest(_) => "random_forest",
            Classifier::LogisticRegression(_) => "logistic_regression",
        }
    }

    /// Check internal consistency after deserialization
    pub fn validate(&self) -> Result<(), String> {
        let (num_features, trees) = match self {
            Classifier::GradientBoosting(m) => (m.num_features, &m.trees),
            Classifier::RandomForest(m) => (m.num_features, &m.trees),
            Classifier::LogisticRegression(m) => {
                if m.coefficients.is_empty() {
                    return Err("logistic regression has no coefficients".to_string());
                }
                if m.coefficients.iter().any(|w| !w.is_finite()) || !m.intercept.is_finite() {
                    return Err("logistic regression parameters must be finite".to_string());
                }
                return Ok(());
            }
        };
        if num_features == 0 {
            return Err("num_features must be positive".to_string());
        }
        if trees.is_empty() {
            return Err(format!("{} has no trees", self.kind()));
        }
        for (i, tree) in trees.iter().enumerate() {
            tree.validate(num_features)
                .map_err(|reason| format!("tree {i}: {reason}"))?;
        }
        Ok(())
    }

    fn inner(&self) -> &dyn BinaryClassifier {
        match self {
            Classifier::GradientBoosting(m) => m,
            Classifier::RandomForest(m) => m,
            Classifier::LogisticRegression(m) => m,
        }
    }
}

impl BinaryClassifier for Classifier {
    fn num_features(&self) -> usize {
        self.inner().num_features()
    }

    fn predict_proba(&self, row: &[f64]) -> Option<f64> {
        self.inner().predict_proba(row)
    }

    fn predict_label(&self, row: &[f64]) -> u8 {
        self.inner().predict_label(row)
    }
}
