//! Raw input as received from the UI / API boundary.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// One raw field value, before validation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawValue {
    Flag(bool),
    Number(f64),
    Text(String),
    /// null, arrays and objects; rejected per field during validation
    Other(serde_json::Value),
}

impl std::fmt::Display for RawValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RawValue::Flag(b) => write!(f, "{}", b),
            RawValue::Number(x) => write!(f, "{}", x),
            RawValue::Text(s) => write!(f, "{}", s),
            RawValue::Other(v) => write!(f, "{}", v),
        }
    }
}

impl From<f64> for RawValue {
    fn from(value: f64) -> Self {
        RawValue::Number(value)
    }
}

impl From<i32> for RawValue {
    fn from(value: i32) -> Self {
        RawValue::Number(value as f64)
    }
}

impl From<bool> for RawValue {
    fn from(value: bool) -> Self {
        RawValue::Flag(value)
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

/// Field name → raw value mapping
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RawInput(BTreeMap<String, RawValue>);

impl RawInput {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert
    pub fn with(mut self, name: &str, value: impl Into<RawValue>) -> Self {
        self.insert(name, value);
        self
    }

    pub fn insert(&mut self, name: &str, value: impl Into<RawValue>) -> Option<RawValue> {
        self.0.insert(name.to_string(), value.into())
    }

    pub fn remove(&mut self, name: &str) -> Option<RawValue> {
        self.0.remove(name)
    }

    pub fn get(&self, name: &str) -> Option<&RawValue> {
        self.0.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.0.contains_key(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<K: Into<String>, V: Into<RawValue>> FromIterator<(K, V)> for RawInput {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_mixed_values() {
        let input: RawInput = serde_json::from_str(
            r#"{"age": 30, "income_level": "medium", "night_shift": false}"#,
        )
        .unwrap();

        assert_eq!(input.get("age"), Some(&RawValue::Number(30.0)));
        assert_eq!(input.get("income_level"), Some(&RawValue::Text("medium".into())));
        assert_eq!(input.get("night_shift"), Some(&RawValue::Flag(false)));
        assert_eq!(input.len(), 3);
    }

    #[test]
    fn test_deserialize_keeps_unsupported_values() {
        let input: RawInput = serde_json::from_str(r#"{"age": null, "work_years": [1, 2]}"#).unwrap();

        assert_eq!(input.get("age"), Some(&RawValue::Other(serde_json::Value::Null)));
        assert!(matches!(input.get("work_years"), Some(RawValue::Other(serde_json::Value::Array(_)))));
        assert!(serde_json::from_str::<RawInput>("[1, 2]").is_err());
    }

    #[test]
    fn test_builder() {
        let input = RawInput::new().with("age", 30).with("income_level", "low");
        assert!(input.contains("age"));
        assert_eq!(input.names().collect::<Vec<_>>(), vec!["age", "income_level"]);
    }
}
