//! Filter evaluation for automation triggers.
//!
//! A filter is an ordered list of conditions. Each condition after the first
//! carries a joiner (`AND`/`OR`) that combines its result with everything
//! evaluated before it. There is no grouping and no precedence: the list is
//! folded strictly left to right.
//!
//! ```text
//! ((c0 JOIN1 c1) JOIN2 c2) JOIN3 c3 ...
//! ```
//!
//! Evaluation never fails. Missing fields read as empty, numeric comparisons
//! that cannot coerce both sides evaluate to `false`, and an operator that
//! does not suit the field type simply degrades through those rules.
//!
//! # Query syntax
//!
//! [`parse_conditions`] accepts a flat textual form used by the CLI:
//!
//! ```text
//! priority equals high AND status = open
//! value > 1000 OR tags has_label 'VIP'
//! notes is_empty
//! ```

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::core::traits::{parse_number, FieldSource, FieldValue};
use crate::core::format_number;
use crate::error::CrmError;

/// Comparison operators for filter conditions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FilterOperator {
    /// Case-insensitive substring match.
    Contains,
    /// Negation of `contains`.
    DoesNotContain,
    /// Case-insensitive text equality, exact numeric equality.
    ///
    /// Numbers are compared numerically only when the field or the condition
    /// value is a number. Two numeric-looking strings compare as text, so
    /// `"1500"` does not equal `"1500.0"`.
    Equals,
    /// Negation of `equals`.
    DoesNotEqual,
    /// Field is absent, null, or blank.
    IsEmpty,
    /// Negation of `is_empty`.
    IsNotEmpty,
    /// Numeric `>`.
    GreaterThan,
    /// Numeric `<`.
    LessThan,
    /// Numeric `>=`.
    GreaterThanOrEqual,
    /// Numeric `<=`.
    LessThanOrEqual,
    /// Label set membership (case-insensitive).
    HasLabel,
    /// Negation of `has_label`.
    DoesNotHaveLabel,
}

impl FilterOperator {
    /// Every operator, in authoring order.
    pub const ALL: [Self; 12] = [
        Self::Contains,
        Self::DoesNotContain,
        Self::Equals,
        Self::DoesNotEqual,
        Self::IsEmpty,
        Self::IsNotEmpty,
        Self::GreaterThan,
        Self::LessThan,
        Self::GreaterThanOrEqual,
        Self::LessThanOrEqual,
        Self::HasLabel,
        Self::DoesNotHaveLabel,
    ];

    /// The wire name of the operator.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Contains => "contains",
            Self::DoesNotContain => "does_not_contain",
            Self::Equals => "equals",
            Self::DoesNotEqual => "does_not_equal",
            Self::IsEmpty => "is_empty",
            Self::IsNotEmpty => "is_not_empty",
            Self::GreaterThan => "greater_than",
            Self::LessThan => "less_than",
            Self::GreaterThanOrEqual => "greater_than_or_equal",
            Self::LessThanOrEqual => "less_than_or_equal",
            Self::HasLabel => "has_label",
            Self::DoesNotHaveLabel => "does_not_have_label",
        }
    }

    /// Human-readable label.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Contains => "Contains",
            Self::DoesNotContain => "Does not contain",
            Self::Equals => "Equals",
            Self::DoesNotEqual => "Does not equal",
            Self::IsEmpty => "Is empty",
            Self::IsNotEmpty => "Is not empty",
            Self::GreaterThan => "Greater than",
            Self::LessThan => "Less than",
            Self::GreaterThanOrEqual => "Greater than or equal",
            Self::LessThanOrEqual => "Less than or equal",
            Self::HasLabel => "Has label",
            Self::DoesNotHaveLabel => "Does not have label",
        }
    }

    /// Whether the operator reads the condition's value.
    #[must_use]
    pub const fn requires_value(self) -> bool {
        !matches!(self, Self::IsEmpty | Self::IsNotEmpty)
    }
}

impl fmt::Display for FilterOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FilterOperator {
    type Err = CrmError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.trim().to_lowercase();
        let op = match lower.as_str() {
            "=" | "==" => Self::Equals,
            "!=" | "<>" => Self::DoesNotEqual,
            ">" => Self::GreaterThan,
            "<" => Self::LessThan,
            ">=" => Self::GreaterThanOrEqual,
            "<=" => Self::LessThanOrEqual,
            name => Self::ALL
                .into_iter()
                .find(|op| op.as_str() == name)
                .ok_or_else(|| CrmError::Filter(format!("Unknown operator: {s}")))?,
        };
        Ok(op)
    }
}

/// How a condition combines with the result accumulated before it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum LogicalOperator {
    /// Both sides must hold.
    #[default]
    And,
    /// Either side may hold.
    Or,
}

impl LogicalOperator {
    /// Combine an accumulated result with the next condition's result.
    #[must_use]
    pub const fn combine(self, acc: bool, next: bool) -> bool {
        match self {
            Self::And => acc && next,
            Self::Or => acc || next,
        }
    }
}

impl fmt::Display for LogicalOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::And => f.write_str("AND"),
            Self::Or => f.write_str("OR"),
        }
    }
}

/// The comparison value of a condition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ConditionValue {
    /// Numeric value.
    Number(f64),
    /// Text value.
    Text(String),
}

impl ConditionValue {
    /// Render as text.
    #[must_use]
    pub fn to_text(&self) -> String {
        match self {
            Self::Number(n) => format_number(*n),
            Self::Text(s) => s.clone(),
        }
    }

    /// Coerce to a number (strict parse for text).
    #[must_use]
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Self::Number(n) if n.is_finite() => Some(*n),
            Self::Number(_) => None,
            Self::Text(s) => parse_number(s),
        }
    }
}

impl From<&str> for ConditionValue {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

impl From<String> for ConditionValue {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}

impl From<f64> for ConditionValue {
    fn from(n: f64) -> Self {
        Self::Number(n)
    }
}

impl From<i64> for ConditionValue {
    #[allow(clippy::cast_precision_loss)]
    fn from(n: i64) -> Self {
        Self::Number(n as f64)
    }
}

/// A single filter condition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterCondition {
    /// Opaque identifier.
    #[serde(default)]
    pub id: String,
    /// Record field to read.
    pub field: String,
    /// Comparison operator.
    pub operator: FilterOperator,
    /// Value to compare against; absent for `is_empty`/`is_not_empty`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<ConditionValue>,
    /// Joiner with the preceding result; ignored on the first condition.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub logical_operator: Option<LogicalOperator>,
}

impl FilterCondition {
    /// Create a condition with a value.
    #[must_use]
    pub fn new(
        field: impl Into<String>,
        operator: FilterOperator,
        value: impl Into<ConditionValue>,
    ) -> Self {
        Self {
            id: String::new(),
            field: field.into(),
            operator,
            value: Some(value.into()),
            logical_operator: None,
        }
    }

    /// Create a condition that reads no value (`is_empty`, `is_not_empty`).
    #[must_use]
    pub fn without_value(field: impl Into<String>, operator: FilterOperator) -> Self {
        Self {
            id: String::new(),
            field: field.into(),
            operator,
            value: None,
            logical_operator: None,
        }
    }

    /// Set the identifier.
    #[must_use]
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = id.into();
        self
    }

    /// Set the joiner with the preceding result.
    #[must_use]
    pub const fn joined(mut self, op: LogicalOperator) -> Self {
        self.logical_operator = Some(op);
        self
    }

    /// The effective joiner (`AND` when unset).
    #[must_use]
    pub fn joiner(&self) -> LogicalOperator {
        self.logical_operator.unwrap_or_default()
    }

    /// Evaluate this condition against a record.
    pub fn matches<S: FieldSource + ?Sized>(&self, record: &S) -> bool {
        evaluate_condition(record, self)
    }
}

impl fmt::Display for FilterCondition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.field, self.operator)?;
        if let Some(value) = &self.value {
            match value {
                ConditionValue::Number(n) => write!(f, " {}", format_number(*n))?,
                ConditionValue::Text(s) => write!(f, " '{s}'")?,
            }
        }
        Ok(())
    }
}

/// Evaluate an ordered condition list against a record.
///
/// An empty list is unconditionally satisfied. Otherwise the first condition
/// seeds the result and every later condition is folded in with its own
/// joiner.
pub fn evaluate<S: FieldSource + ?Sized>(record: &S, conditions: &[FilterCondition]) -> bool {
    let Some((first, rest)) = conditions.split_first() else {
        return true;
    };

    rest.iter().fold(evaluate_condition(record, first), |acc, condition| {
        condition
            .joiner()
            .combine(acc, evaluate_condition(record, condition))
    })
}

/// Evaluate a single condition against a record.
pub fn evaluate_condition<S: FieldSource + ?Sized>(record: &S, condition: &FilterCondition) -> bool {
    let field_value = record
        .field_value(&condition.field)
        .unwrap_or(FieldValue::Null);
    let value = condition.value.as_ref();

    match condition.operator {
        FilterOperator::Contains => match_contains(&field_value, value),
        FilterOperator::DoesNotContain => !match_contains(&field_value, value),
        FilterOperator::Equals => match_equal(&field_value, value),
        FilterOperator::DoesNotEqual => !match_equal(&field_value, value),
        FilterOperator::IsEmpty => field_value.is_blank(),
        FilterOperator::IsNotEmpty => !field_value.is_blank(),
        FilterOperator::GreaterThan => match_compare(&field_value, value, |a, b| a > b),
        FilterOperator::LessThan => match_compare(&field_value, value, |a, b| a < b),
        FilterOperator::GreaterThanOrEqual => match_compare(&field_value, value, |a, b| a >= b),
        FilterOperator::LessThanOrEqual => match_compare(&field_value, value, |a, b| a <= b),
        FilterOperator::HasLabel => match_label(&field_value, value),
        FilterOperator::DoesNotHaveLabel => !match_label(&field_value, value),
    }
}

/// Match CONTAINS (substring); a condition without a value never matches.
fn match_contains(field_value: &FieldValue, value: Option<&ConditionValue>) -> bool {
    value.is_some_and(|v| field_value.contains_str(&v.to_text()))
}

/// Match equality.
#[allow(clippy::float_cmp)]
fn match_equal(field_value: &FieldValue, value: Option<&ConditionValue>) -> bool {
    let numeric = field_value.is_number() || matches!(value, Some(ConditionValue::Number(_)));
    if numeric {
        if let (Some(a), Some(b)) = (
            field_value.as_number(),
            value.and_then(ConditionValue::as_number),
        ) {
            return a == b;
        }
    }

    let expected = value
        .map(ConditionValue::to_text)
        .unwrap_or_default()
        .to_lowercase();

    match field_value {
        FieldValue::Labels(list) => list.iter().any(|l| l.to_lowercase() == expected),
        _ => field_value.to_text().to_lowercase() == expected,
    }
}

/// Match with a numeric comparison; fails closed when either side is not a number.
fn match_compare<F>(field_value: &FieldValue, value: Option<&ConditionValue>, cmp: F) -> bool
where
    F: Fn(f64, f64) -> bool,
{
    match (
        field_value.as_number(),
        value.and_then(ConditionValue::as_number),
    ) {
        (Some(a), Some(b)) => cmp(a, b),
        _ => false,
    }
}

/// Match label membership.
fn match_label(field_value: &FieldValue, value: Option<&ConditionValue>) -> bool {
    value.is_some_and(|v| field_value.has_label(&v.to_text()))
}

/// Append a condition the way the filter builder does: the first condition
/// carries no joiner, later ones default to `AND` unless already set.
pub fn push_condition(conditions: &mut Vec<FilterCondition>, mut condition: FilterCondition) {
    if conditions.is_empty() {
        condition.logical_operator = None;
    } else if condition.logical_operator.is_none() {
        condition.logical_operator = Some(LogicalOperator::And);
    }
    if condition.id.is_empty() {
        condition.id = format!("filter-{}", conditions.len() + 1);
    }
    conditions.push(condition);
}

/// Apply a condition list to a collection of records.
pub fn filter_records<'a, S: FieldSource>(
    records: &'a [S],
    conditions: &[FilterCondition],
) -> Vec<&'a S> {
    records
        .iter()
        .filter(|record| evaluate(*record, conditions))
        .collect()
}

/// Parse a flat filter query into an ordered condition list.
///
/// # Errors
///
/// Returns an error if the query is empty, uses parentheses, has an
/// unterminated quote, or contains a malformed condition.
///
/// # Examples
///
/// ```
/// use fieldcrm::core::filter::parse_conditions;
///
/// let conditions = parse_conditions("priority equals high AND status = open").unwrap();
/// assert_eq!(conditions.len(), 2);
/// ```
pub fn parse_conditions(query: &str) -> Result<Vec<FilterCondition>, CrmError> {
    let query = query.trim();

    if query.is_empty() {
        return Err(CrmError::Filter("Empty filter query".to_string()));
    }

    split_by_logical_ops(query)?
        .into_iter()
        .enumerate()
        .map(|(i, (joiner, text))| {
            parse_condition(text).map(|mut condition| {
                condition.id = format!("filter-{}", i + 1);
                condition.logical_operator = joiner;
                condition
            })
        })
        .collect()
}

/// Split a query on top-level `AND` / `OR` joiners, respecting quotes.
fn split_by_logical_ops(query: &str) -> Result<Vec<(Option<LogicalOperator>, &str)>, CrmError> {
    // ASCII uppercasing keeps byte offsets aligned with `query`.
    let upper = query.to_ascii_uppercase();
    let mut parts = Vec::new();
    let mut quote: Option<char> = None;
    let mut pending: Option<LogicalOperator> = None;
    let mut start = 0;
    let mut skip_until = 0;
    let mut prev = ' ';

    for (i, c) in query.char_indices() {
        if i < skip_until {
            prev = c;
            continue;
        }

        if let Some(q) = quote {
            if c == q {
                quote = None;
            }
            prev = c;
            continue;
        }

        match c {
            '\'' | '"' if prev.is_whitespace() => quote = Some(c),
            '(' | ')' => {
                return Err(CrmError::Filter(
                    "Grouping with parentheses is not supported; conditions combine left to right"
                        .to_string(),
                ));
            },
            _ => {
                if let Some((op, end)) = joiner_at(&upper, i) {
                    parts.push((pending, &query[start..i]));
                    pending = Some(op);
                    start = end;
                    skip_until = end;
                }
            },
        }
        prev = c;
    }

    if quote.is_some() {
        return Err(CrmError::Filter("Unterminated quote in filter".to_string()));
    }

    parts.push((pending, &query[start..]));
    Ok(parts)
}

/// Detect a joiner starting at byte `i`: whitespace, `AND`/`OR`, whitespace,
/// then more query text. Returns the operator and the offset just past the
/// trailing whitespace.
fn joiner_at(upper: &str, i: usize) -> Option<(LogicalOperator, usize)> {
    let rest = &upper[i..];
    let word = rest.trim_start_matches(char::is_whitespace);
    if word.len() == rest.len() {
        return None;
    }

    let (op, after) = if let Some(after) = word.strip_prefix("AND") {
        (LogicalOperator::And, after)
    } else if let Some(after) = word.strip_prefix("OR") {
        (LogicalOperator::Or, after)
    } else {
        return None;
    };

    let tail = after.trim_start_matches(char::is_whitespace);
    if tail.len() == after.len() || tail.is_empty() {
        return None;
    }
    Some((op, upper.len() - tail.len()))
}

/// Parse a single condition (field operator [value]).
fn parse_condition(s: &str) -> Result<FilterCondition, CrmError> {
    let s = s.trim();
    let invalid = || CrmError::Filter(format!("Invalid filter condition: '{s}'"));

    let (field, rest) = s.split_once(char::is_whitespace).ok_or_else(invalid)?;
    let rest = rest.trim_start();
    let (op_str, value_str) = rest
        .split_once(char::is_whitespace)
        .unwrap_or((rest, ""));

    let operator: FilterOperator = op_str.parse().map_err(|_| invalid())?;
    let value = parse_value(value_str);

    match (operator.requires_value(), &value) {
        (true, None) => Err(CrmError::Filter(format!(
            "Operator '{operator}' requires a value: '{s}'"
        ))),
        (false, Some(_)) => Err(CrmError::Filter(format!(
            "Operator '{operator}' takes no value: '{s}'"
        ))),
        _ => Ok(FilterCondition {
            id: String::new(),
            field: field.to_string(),
            operator,
            value,
            logical_operator: None,
        }),
    }
}

/// Parse a value: quoted text, a number, or bare text.
fn parse_value(s: &str) -> Option<ConditionValue> {
    let trimmed = s.trim();
    if trimmed.is_empty() {
        return None;
    }

    if trimmed.len() >= 2
        && ((trimmed.starts_with('\'') && trimmed.ends_with('\''))
            || (trimmed.starts_with('"') && trimmed.ends_with('"')))
    {
        return Some(ConditionValue::Text(trimmed[1..trimmed.len() - 1].to_string()));
    }

    Some(parse_number(trimmed).map_or_else(
        || ConditionValue::Text(trimmed.to_string()),
        ConditionValue::Number,
    ))
}
