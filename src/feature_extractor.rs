//! Feature alignment for model inference.
//!
//! Turns an arbitrary field mapping into the ordered numeric row the scaler
//! and classifier were fitted on: schema selection, categorical one-hot
//! expansion, numeric coercion and the missing-value fill policy.

use crate::config::FillPolicy;
use crate::models::loader::FeatureSchema;
use crate::types::input::{Coerced, RawInput, RawValue};
use std::collections::HashMap;
use tracing::debug;

/// Framingham heart study feature order used by the fixed-schema model
pub const FRAMINGHAM_FEATURES: [&str; 15] = [
    "male",
    "age",
    "education",
    "currentSmoker",
    "cigsPerDay",
    "BPMeds",
    "prevalentStroke",
    "prevalentHyp",
    "diabetes",
    "totChol",
    "sysBP",
    "diaBP",
    "BMI",
    "heartRate",
    "glucose",
];

/// Where the authoritative feature list comes from
#[derive(Debug, Clone, PartialEq)]
pub enum SchemaMode<'a> {
    /// Loaded with the model; never reordered
    Fixed(&'a FeatureSchema),
    /// No schema loaded: the request's own keys, in payload order
    Inferred(Vec<String>),
}

impl SchemaMode<'_> {
    pub fn names(&self) -> &[String] {
        match self {
            SchemaMode::Fixed(schema) => schema.names(),
            SchemaMode::Inferred(names) => names,
        }
    }

    pub fn is_fixed(&self) -> bool {
        matches!(self, SchemaMode::Fixed(_))
    }
}

/// Aligns raw input against a feature schema
#[derive(Debug, Clone, Copy, Default)]
pub struct FeatureExtractor {
    fill_policy: FillPolicy,
}

impl FeatureExtractor {
    pub fn new(fill_policy: FillPolicy) -> Self {
        Self { fill_policy }
    }

    pub fn fill_policy(&self) -> FillPolicy {
        self.fill_policy
    }

    /// `Fixed` when a non-empty schema is loaded, `Inferred` otherwise
    pub fn schema_mode<'a>(
        &self,
        schema: Option<&'a FeatureSchema>,
        raw: &RawInput,
    ) -> SchemaMode<'a> {
        match schema {
            Some(schema) if !schema.is_empty() => SchemaMode::Fixed(schema),
            _ => SchemaMode::Inferred(raw.keys().map(str::to_string).collect()),
        }
    }

    /// Build the row for `names`. Always returns exactly `names.len()` values.
    ///
    /// Fields not named by the schema are ignored unless they are the source
    /// of one-hot columns.
    pub fn extract(&self, names: &[String], raw: &RawInput) -> Vec<f64> {
        let indicators = one_hot_indicators(names, raw);
        let fill = self.fill_policy.fill_value();

        names
            .iter()
            .map(|name| match raw.get(name) {
                Some(value) => match value.coerce() {
                    Coerced::Number(n) => n,
                    Coerced::Missing => {
                        if let RawValue::Text(text) = value {
                            if !text.trim().is_empty() {
                                debug!(feature = %name, value = %text, "Non-numeric value treated as missing");
                            }
                        }
                        indicators.get(name.as_str()).copied().unwrap_or(fill)
                    }
                },
                None => indicators.get(name.as_str()).copied().unwrap_or(fill),
            })
            .collect()
    }
}

/// One-hot columns implied by categorical raw fields.
///
/// A raw key that is not itself a schema column, but prefixes schema columns
/// as `<key>_<category>`, owns those columns: the matching category is set to
/// 1 and the rest to 0. With first-category-dropped encoding the dropped
/// category matches nothing, leaving every indicator at 0.
///
/// A numeric value only owns columns with a numeric category suffix, so an
/// extra `resting: 120` never claims `resting_bp`. Null and empty values own
/// nothing.
fn one_hot_indicators<'a>(names: &'a [String], raw: &RawInput) -> HashMap<&'a str, f64> {
    let mut indicators = HashMap::new();

    for (key, value) in raw.iter() {
        if names.iter().any(|n| n == key) {
            continue;
        }
        let labels = value.category_labels();
        if labels.is_empty() {
            continue;
        }
        let numeric = matches!(value.coerce(), Coerced::Number(_));
        let prefix = format!("{key}_");
        let columns: Vec<&'a String> = names
            .iter()
            .filter(|n| match n.strip_prefix(&prefix) {
                Some(category) => !numeric || is_numeric_category(category, &labels),
                None => false,
            })
            .collect();
        if columns.is_empty() {
            continue;
        }

        for &column in &columns {
            indicators.entry(column.as_str()).or_insert(0.0);
        }

        let hit = labels
            .iter()
            .map(|label| format!("{prefix}{label}"))
            .find_map(|candidate| columns.iter().find(|c| **c == &candidate).copied());

        match hit {
            Some(column) => {
                indicators.insert(column.as_str(), 1.0);
            }
            None => {
                debug!(field = %key, "Category has no indicator column (dropped or unseen)");
            }
        }
    }

    indicators
}

fn is_numeric_category(category: &str, labels: &[String]) -> bool {
    category.parse::<f64>().is_ok() || labels.iter().any(|l| l == category)
}
