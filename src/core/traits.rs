//! Field values and the records that carry them.
//!
//! A record is a flat snapshot of a pipeline entity (proposal, job, invoice,
//! appointment) assembled by the caller. Filters read fields out of it through
//! the [`FieldSource`] trait.

use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::error::CrmError;

/// A value stored in a record field.
///
/// Deserializing never fails on shape: nested objects read as null and
/// scalar list items are kept as label text.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum FieldValue {
    /// Explicit null.
    Null,
    /// Boolean value.
    Bool(bool),
    /// Numeric value.
    Number(f64),
    /// Text value.
    Text(String),
    /// Set of labels (tags).
    Labels(Vec<String>),
}

impl FieldValue {
    /// Check if this value is empty: null, blank text, or no labels.
    #[must_use]
    pub fn is_blank(&self) -> bool {
        match self {
            Self::Null => true,
            Self::Text(s) => s.trim().is_empty(),
            Self::Labels(list) => list.is_empty(),
            Self::Bool(_) | Self::Number(_) => false,
        }
    }

    /// Render the value as text.
    ///
    /// Labels are joined with commas; null becomes the empty string.
    #[must_use]
    pub fn to_text(&self) -> String {
        match self {
            Self::Null => String::new(),
            Self::Bool(b) => b.to_string(),
            Self::Number(n) => format_number(*n),
            Self::Text(s) => s.clone(),
            Self::Labels(list) => list.join(","),
        }
    }

    /// Coerce the value to a number.
    ///
    /// Text must parse in full; anything else yields `None`.
    #[must_use]
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Self::Number(n) if n.is_finite() => Some(*n),
            Self::Text(s) => parse_number(s),
            _ => None,
        }
    }

    /// Check if this value is numeric (not merely numeric-looking text).
    #[must_use]
    pub const fn is_number(&self) -> bool {
        matches!(self, Self::Number(_))
    }

    /// View the value as a set of labels.
    ///
    /// Comma-separated text is split into its parts.
    #[must_use]
    pub fn labels(&self) -> Vec<String> {
        match self {
            Self::Null => Vec::new(),
            Self::Labels(list) => list.clone(),
            Self::Text(s) => s
                .split(',')
                .map(str::trim)
                .filter(|part| !part.is_empty())
                .map(ToString::to_string)
                .collect(),
            Self::Bool(_) | Self::Number(_) => vec![self.to_text()],
        }
    }

    /// Check if this value contains a substring (case-insensitive).
    #[must_use]
    pub fn contains_str(&self, needle: &str) -> bool {
        if self.is_blank() {
            return false;
        }
        self.to_text()
            .to_lowercase()
            .contains(&needle.to_lowercase())
    }

    /// Check if a label set contains a label (case-insensitive).
    #[must_use]
    pub fn has_label(&self, label: &str) -> bool {
        let wanted = label.trim().to_lowercase();
        if wanted.is_empty() {
            return false;
        }
        self.labels().iter().any(|l| l.trim().to_lowercase() == wanted)
    }
}

impl From<Value> for FieldValue {
    fn from(value: Value) -> Self {
        match value {
            Value::Null | Value::Object(_) => Self::Null,
            Value::Bool(b) => Self::Bool(b),
            Value::Number(n) => n.as_f64().map_or(Self::Null, Self::Number),
            Value::String(s) => Self::Text(s),
            Value::Array(items) => Self::Labels(items.into_iter().filter_map(label_text).collect()),
        }
    }
}

fn label_text(item: Value) -> Option<String> {
    match item {
        Value::String(s) => Some(s),
        Value::Bool(b) => Some(b.to_string()),
        Value::Number(n) => n.as_f64().map(format_number),
        Value::Null | Value::Array(_) | Value::Object(_) => None,
    }
}

impl<'de> Deserialize<'de> for FieldValue {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        Value::deserialize(deserializer).map(Self::from)
    }
}

impl From<&str> for FieldValue {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}

impl From<f64> for FieldValue {
    fn from(n: f64) -> Self {
        Self::Number(n)
    }
}

impl From<i64> for FieldValue {
    #[allow(clippy::cast_precision_loss)]
    fn from(n: i64) -> Self {
        Self::Number(n as f64)
    }
}

impl From<bool> for FieldValue {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

impl From<Vec<String>> for FieldValue {
    fn from(v: Vec<String>) -> Self {
        Self::Labels(v)
    }
}

impl From<Vec<&str>> for FieldValue {
    fn from(v: Vec<&str>) -> Self {
        Self::Labels(v.into_iter().map(ToString::to_string).collect())
    }
}

/// Parse a number strictly: the whole trimmed string must be a finite float.
#[must_use]
pub fn parse_number(s: &str) -> Option<f64> {
    let trimmed = s.trim();
    if trimmed.is_empty() {
        return None;
    }
    trimmed.parse::<f64>().ok().filter(|n| n.is_finite())
}

/// Format a number without a trailing `.0` for whole values.
#[must_use]
pub fn format_number(n: f64) -> String {
    if n.fract() == 0.0 && n.abs() < 1e15 {
        #[allow(clippy::cast_possible_truncation)]
        let whole = n as i64;
        whole.to_string()
    } else {
        n.to_string()
    }
}

/// Anything filters can read named fields from.
pub trait FieldSource {
    /// Get the value of a named field.
    ///
    /// Returns `None` if the field doesn't exist.
    fn field_value(&self, field: &str) -> Option<FieldValue>;
}

impl FieldSource for HashMap<String, FieldValue> {
    fn field_value(&self, field: &str) -> Option<FieldValue> {
        self.get(field).cloned()
    }
}

impl FieldSource for BTreeMap<String, FieldValue> {
    fn field_value(&self, field: &str) -> Option<FieldValue> {
        self.get(field).cloned()
    }
}

/// A flat snapshot of one pipeline entity.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Record {
    fields: BTreeMap<String, FieldValue>,
}

impl Record {
    /// Create an empty record.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a field.
    #[must_use]
    pub fn with(mut self, field: impl Into<String>, value: impl Into<FieldValue>) -> Self {
        self.fields.insert(field.into(), value.into());
        self
    }

    /// Set a field, replacing any previous value.
    pub fn insert(&mut self, field: impl Into<String>, value: impl Into<FieldValue>) {
        self.fields.insert(field.into(), value.into());
    }

    /// Get a field.
    #[must_use]
    pub fn get(&self, field: &str) -> Option<&FieldValue> {
        self.fields.get(field)
    }

    /// Iterate over fields in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&String, &FieldValue)> {
        self.fields.iter()
    }

    /// Number of fields.
    #[must_use]
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Check if the record has no fields.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Parse a record from a JSON object.
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON is not an object.
    pub fn from_json(json: &str) -> Result<Self, CrmError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Build a substitution context from the record's non-null fields.
    #[must_use]
    pub fn to_context(&self) -> HashMap<String, String> {
        self.fields
            .iter()
            .filter(|(_, v)| !matches!(v, FieldValue::Null))
            .map(|(k, v)| (k.clone(), v.to_text()))
            .collect()
    }
}

impl FieldSource for Record {
    fn field_value(&self, field: &str) -> Option<FieldValue> {
        self.fields.get(field).cloned()
    }
}

impl FromIterator<(String, FieldValue)> for Record {
    fn from_iter<I: IntoIterator<Item = (String, FieldValue)>>(iter: I) -> Self {
        Self {
            fields: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_field_value_contains_str() {
        let value = FieldValue::Text("Hello World".to_string());
        assert!(value.contains_str("hello"));
        assert!(value.contains_str("WORLD"));
        assert!(!value.contains_str("foo"));
    }

    #[test]
    fn test_blank_values_contain_nothing() {
        assert!(!FieldValue::Null.contains_str(""));
        assert!(!FieldValue::Text("   ".to_string()).contains_str(""));
    }

    #[test]
    fn test_is_blank() {
        assert!(FieldValue::Null.is_blank());
        assert!(FieldValue::Text(String::new()).is_blank());
        assert!(FieldValue::Text("  ".to_string()).is_blank());
        assert!(FieldValue::Labels(vec![]).is_blank());
        assert!(!FieldValue::Number(0.0).is_blank());
        assert!(!FieldValue::Text("x".to_string()).is_blank());
    }

    #[test]
    fn test_parse_number_is_strict() {
        assert_eq!(parse_number("12"), Some(12.0));
        assert_eq!(parse_number(" 1.5 "), Some(1.5));
        assert_eq!(parse_number("-3"), Some(-3.0));
        assert_eq!(parse_number("12abc"), None);
        assert_eq!(parse_number(""), None);
        assert_eq!(parse_number("NaN"), None);
        assert_eq!(parse_number("inf"), None);
    }

    #[test]
    fn test_format_number() {
        assert_eq!(format_number(1500.0), "1500");
        assert_eq!(format_number(2.5), "2.5");
        assert_eq!(format_number(-4.0), "-4");
    }

    #[test]
    fn test_labels_from_text_and_list() {
        let list = FieldValue::from(vec!["VIP", "Follow Up"]);
        assert!(list.has_label("vip"));
        assert!(list.has_label("follow up"));
        assert!(!list.has_label("cold"));

        let text = FieldValue::Text("VIP, Repeat".to_string());
        assert!(text.has_label("repeat"));
        assert!(!FieldValue::Null.has_label("vip"));
    }

    #[test]
    fn test_record_from_json() {
        let record = Record::from_json(
            r#"{"status": "open", "value": 1500, "tags": ["VIP"], "notes": null, "paid": false}"#,
        )
        .unwrap();

        assert_eq!(record.get("status"), Some(&FieldValue::Text("open".to_string())));
        assert_eq!(record.get("value"), Some(&FieldValue::Number(1500.0)));
        assert_eq!(
            record.get("tags"),
            Some(&FieldValue::Labels(vec!["VIP".to_string()]))
        );
        assert_eq!(record.get("notes"), Some(&FieldValue::Null));
        assert_eq!(record.get("paid"), Some(&FieldValue::Bool(false)));
    }

    #[test]
    fn test_record_from_json_degrades_odd_shapes() {
        let record = Record::from_json(r#"{"tags": [1, "a", null, {"x": 1}], "c": {"x": 1}}"#).unwrap();

        assert_eq!(
            record.get("tags"),
            Some(&FieldValue::Labels(vec!["1".to_string(), "a".to_string()]))
        );
        assert_eq!(record.get("c"), Some(&FieldValue::Null));
        assert!(record.get("c").is_some_and(FieldValue::is_blank));
        assert!(Record::from_json("[1, 2]").is_err());
    }

    #[test]
    fn test_record_to_context_skips_nulls() {
        let record = Record::new()
            .with("customer_name", "Jane Doe")
            .with("value", 2500_i64)
            .with("notes", FieldValue::Null);

        let ctx = record.to_context();
        assert_eq!(ctx.get("customer_name").map(String::as_str), Some("Jane Doe"));
        assert_eq!(ctx.get("value").map(String::as_str), Some("2500"));
        assert!(!ctx.contains_key("notes"));
    }
}
