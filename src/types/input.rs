//! Raw prediction input as supplied by a client

use serde::de::{Deserializer, MapAccess, Visitor};
use serde::Deserialize;
use std::fmt;

/// A single field value from a request payload
#[derive(Debug, Clone, PartialEq)]
pub enum RawValue {
    Number(f64),
    Text(String),
    Bool(bool),
    Null,
    /// Arrays and objects; never numeric
    Other,
}

/// Result of coercing a [`RawValue`] to a number
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Coerced {
    Number(f64),
    Missing,
}

impl RawValue {
    /// Coerce to a number. Empty, null and non-numeric values are `Missing`.
    pub fn coerce(&self) -> Coerced {
        match self {
            RawValue::Number(n) if n.is_finite() => Coerced::Number(*n),
            RawValue::Bool(b) => Coerced::Number(if *b { 1.0 } else { 0.0 }),
            RawValue::Text(s) => match s.trim() {
                "" => Coerced::Missing,
                t => t
                    .parse::<f64>()
                    .ok()
                    .filter(|n| n.is_finite())
                    .map_or(Coerced::Missing, Coerced::Number),
            },
            _ => Coerced::Missing,
        }
    }

    /// Category label used for one-hot column lookup, if the value has one
    pub fn category_labels(&self) -> Vec<String> {
        match self {
            RawValue::Text(s) if !s.trim().is_empty() => {
                let t = s.trim();
                let mut labels = vec![t.to_string()];
                if let Ok(n) = t.parse::<f64>() {
                    labels.extend(numeric_labels(n));
                }
                let mut unique: Vec<String> = Vec::with_capacity(labels.len());
                for label in labels {
                    if !unique.contains(&label) {
                        unique.push(label);
                    }
                }
                unique
            }
            RawValue::Number(n) => numeric_labels(*n),
            RawValue::Bool(b) => vec![b.to_string(), if *b { "1" } else { "0" }.to_string()],
            _ => Vec::new(),
        }
    }
}

/// `2.0` may have been encoded as `x_2` or `x_2.0` at training time
fn numeric_labels(n: f64) -> Vec<String> {
    if !n.is_finite() {
        return Vec::new();
    }
    let mut labels = Vec::with_capacity(2);
    if n.fract() == 0.0 {
        labels.push(format!("{}", n as i64));
        labels.push(format!("{:.1}", n));
    } else {
        labels.push(n.to_string());
    }
    labels
}

impl From<serde_json::Value> for RawValue {
    fn from(value: serde_json::Value) -> Self {
        match value {
            serde_json::Value::Null => RawValue::Null,
            serde_json::Value::Bool(b) => RawValue::Bool(b),
            serde_json::Value::Number(n) => n.as_f64().map_or(RawValue::Other, RawValue::Number),
            serde_json::Value::String(s) => RawValue::Text(s),
            serde_json::Value::Array(_) | serde_json::Value::Object(_) => RawValue::Other,
        }
    }
}

impl From<&str> for RawValue {
    fn from(value: &str) -> Self {
        RawValue::Text(value.to_string())
    }
}

impl From<String> for RawValue {
    fn from(value: String) -> Self {
        RawValue::Text(value)
    }
}

impl From<f64> for RawValue {
    fn from(value: f64) -> Self {
        RawValue::Number(value)
    }
}

/// Unordered-by-contract field mapping that remembers payload order.
///
/// Payload order only matters when no feature schema is loaded and the
/// input keys themselves become the schema. Duplicate keys keep the last value.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawInput {
    fields: Vec<(String, RawValue)>,
}

impl RawInput {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a field, keeping its first position
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<RawValue>) {
        let key = key.into();
        let value = value.into();
        match self.fields.iter_mut().find(|(k, _)| *k == key) {
            Some(slot) => slot.1 = value,
            None => self.fields.push((key, value)),
        }
    }

    pub fn get(&self, key: &str) -> Option<&RawValue> {
        self.fields.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    /// Field names in payload order
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|(k, _)| k.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &RawValue)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Build from decoded form pairs (`application/x-www-form-urlencoded`)
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<RawValue>,
    {
        let mut input = Self::new();
        for (k, v) in pairs {
            input.insert(k, v);
        }
        input
    }
}

impl<K: Into<String>, V: Into<RawValue>> FromIterator<(K, V)> for RawInput {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        Self::from_pairs(iter)
    }
}

impl<'de> Deserialize<'de> for RawInput {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct RawInputVisitor;

        impl<'de> Visitor<'de> for RawInputVisitor {
            type Value = RawInput;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a JSON object of field names to values")
            }

            fn visit_map<A>(self, mut map: A) -> Result<Self::Value, A::Error>
            where
                A: MapAccess<'de>,
            {
                let mut input = RawInput::new();
                while let Some((key, value)) = map.next_entry::<String, serde_json::Value>()? {
                    input.insert(key, RawValue::from(value));
                }
                Ok(input)
            }
        }

        deserializer.deserialize_map(RawInputVisitor)
    }
}
