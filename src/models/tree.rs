//! Decision tree storage and traversal.
//!
//! Trees are stored as flat parallel arrays in the same layout XGBoost uses
//! for its JSON dumps: node `i` has children `left_children[i]` and
//! `right_children[i]`, splits on feature `split_indices[i]` at
//! `split_conditions[i]`, and a child index of `-1` marks a leaf whose output
//! is `leaf_values[i]`.

use serde::{Deserialize, Deserializer, Serialize};

/// Comparison used at split nodes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SplitRule {
    /// `x < threshold` goes left (XGBoost, LightGBM)
    #[default]
    Less,
    /// `x <= threshold` goes left (scikit-learn)
    LessEqual,
}

/// A single regression/probability tree
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tree {
    pub left_children: Vec<i32>,
    pub right_children: Vec<i32>,
    pub split_indices: Vec<u32>,
    pub split_conditions: Vec<f64>,
    /// Direction taken by a NaN feature value. Empty means always left.
    #[serde(default, deserialize_with = "deserialize_flags")]
    pub default_left: Vec<bool>,
    pub leaf_values: Vec<f64>,
}

/// Accepts `true`/`false`, `0`/`1`, or `"0"`/`"1"` per element
fn deserialize_flags<'de, D>(deserializer: D) -> Result<Vec<bool>, D::Error>
where
    D: Deserializer<'de>,
{
    use serde::de::Error as SerdeError;
    use serde_json::Value;

    let values = Vec::<Value>::deserialize(deserializer)?;
    values
        .into_iter()
        .map(|value| match value {
            Value::Bool(b) => Ok(b),
            Value::Number(n) => n
                .as_f64()
                .map(|f| f != 0.0)
                .ok_or_else(|| SerdeError::custom("invalid number for flag")),
            Value::String(s) => match s.trim() {
                "1" | "true" => Ok(true),
                "0" | "false" => Ok(false),
                other => Err(SerdeError::custom(format!("cannot parse flag: {other}"))),
            },
            _ => Err(SerdeError::custom("unsupported type for flag")),
        })
        .collect()
}

impl Tree {
    pub fn num_nodes(&self) -> usize {
        self.left_children.len()
    }

    #[inline]
    fn is_leaf(&self, idx: usize) -> bool {
        self.left_children[idx] < 0
    }

    #[inline]
    fn default_left(&self, idx: usize) -> bool {
        self.default_left.get(idx).copied().unwrap_or(true)
    }

    /// Check array shapes and child links.
    ///
    /// Children must come after their parent, which rules out cycles and
    /// bounds traversal by the node count.
    pub fn validate(&self, num_features: usize) -> Result<(), String> {
        let n = self.num_nodes();
        if n == 0 {
            return Err("tree has no nodes".to_string());
        }
        let lengths = [
            self.right_children.len(),
            self.split_indices.len(),
            self.split_conditions.len(),
            self.leaf_values.len(),
        ];
        if lengths.iter().any(|&len| len != n) {
            return Err(format!("tree arrays must all have {n} entries"));
        }
        if !self.default_left.is_empty() && self.default_left.len() != n {
            return Err(format!("default_left must be empty or have {n} entries"));
        }

        for idx in 0..n {
            let (left, right) = (self.left_children[idx], self.right_children[idx]);
            if left < 0 || right < 0 {
                if left != right {
                    return Err(format!("node {idx} has exactly one child"));
                }
                continue;
            }
            for child in [left, right] {
                let child = child as usize;
                if child <= idx || child >= n {
                    return Err(format!("node {idx} links to invalid child {child}"));
                }
            }
            if self.split_indices[idx] as usize >= num_features {
                return Err(format!(
                    "node {idx} splits on feature {} but the model has {num_features}",
                    self.split_indices[idx]
                ));
            }
        }
        Ok(())
    }

    /// Walk from the root to a leaf and return its value
    pub fn predict(&self, features: &[f64], rule: SplitRule) -> f64 {
        let mut idx = 0usize;

        while !self.is_leaf(idx) {
            let fvalue = features
                .get(self.split_indices[idx] as usize)
                .copied()
                .unwrap_or(f64::NAN);
            let threshold = self.split_conditions[idx];

            let go_left = if fvalue.is_nan() {
                self.default_left(idx)
            } else {
                match rule {
                    SplitRule::Less => fvalue < threshold,
                    SplitRule::LessEqual => fvalue <= threshold,
                }
            };

            idx = if go_left {
                self.left_children[idx] as usize
            } else {
                self.right_children[idx] as usize
            };
        }

        self.leaf_values[idx]
    }
}
