//! JSON output formatting for fieldcrm.

use serde::Serialize;
use serde_json::json;

use crate::core::{FilterCondition, Record};
use crate::error::CrmError;
use crate::features::automation::ConditionIssue;
use crate::features::templates::{KeywordGroup, Template, TermsEntry};

/// Format a titled list as JSON
///
/// # Errors
///
/// Returns `CrmError::Parse` if JSON serialization fails.
pub fn format_list_json<T: Serialize>(name: &str, items: &[T]) -> Result<String, CrmError> {
    let output = json!({
        "list": name,
        "count": items.len(),
        "items": items
    });
    Ok(serde_json::to_string_pretty(&output)?)
}

/// Format templates as JSON
///
/// # Errors
///
/// Returns `CrmError::Parse` if JSON serialization fails.
pub fn format_templates_json(templates: &[&Template], title: &str) -> Result<String, CrmError> {
    format_list_json(title, templates)
}

/// Format keyword groups as JSON
///
/// # Errors
///
/// Returns `CrmError::Parse` if JSON serialization fails.
pub fn format_keyword_groups_json(groups: &[KeywordGroup]) -> Result<String, CrmError> {
    let count: usize = groups.iter().map(|g| g.keywords.len()).sum();
    let output = json!({
        "count": count,
        "groups": groups
    });
    Ok(serde_json::to_string_pretty(&output)?)
}

/// Format Terms & Conditions variations as JSON
///
/// # Errors
///
/// Returns `CrmError::Parse` if JSON serialization fails.
pub fn format_terms_json(entries: &[TermsEntry<'_>]) -> Result<String, CrmError> {
    let output = json!({
        "count": entries.len(),
        "items": entries
    });
    Ok(serde_json::to_string_pretty(&output)?)
}

/// Format a filter evaluation as JSON
///
/// # Errors
///
/// Returns `CrmError::Parse` if JSON serialization fails.
pub fn format_filter_json(
    record: &Record,
    conditions: &[FilterCondition],
    outcomes: &[bool],
    matched: bool,
    issues: &[ConditionIssue],
) -> Result<String, CrmError> {
    let items: Vec<_> = conditions
        .iter()
        .zip(outcomes)
        .map(|(condition, passed)| {
            json!({
                "condition": condition,
                "text": condition.to_string(),
                "passed": passed
            })
        })
        .collect();

    let output = json!({
        "matched": matched,
        "fields": record.len(),
        "conditions": items,
        "issues": issues
    });
    Ok(serde_json::to_string_pretty(&output)?)
}

/// Generic JSON formatter for any serializable type
///
/// # Errors
///
/// Returns `CrmError::Parse` if JSON serialization fails.
pub fn to_json<T: Serialize>(value: &T) -> Result<String, CrmError> {
    Ok(serde_json::to_string_pretty(value)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::FilterOperator;
    use crate::features::templates::{keyword_picker_groups, TemplateLibrary, TemplateType};

    #[test]
    fn test_format_list_json() {
        let json = format_list_json("Pipelines", &["jobs", "invoices"]).unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&json).unwrap();

        assert_eq!(parsed["list"], "Pipelines");
        assert_eq!(parsed["count"], 2);
        assert_eq!(parsed["items"][1], "invoices");
    }

    #[test]
    fn test_format_templates_json() {
        let library = TemplateLibrary::with_defaults();
        let template = library.get_by_type(TemplateType::InvoiceSms).unwrap();
        let json = format_templates_json(&[template], "Templates").unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&json).unwrap();

        assert_eq!(parsed["count"], 1);
        assert_eq!(parsed["items"][0]["type"], "invoice_sms");
        assert_eq!(parsed["items"][0]["isActive"], true);
    }

    #[test]
    fn test_format_keyword_groups_json_counts_keywords() {
        let groups = keyword_picker_groups(Some(TemplateType::InvoiceSms), "");
        let expected: usize = groups.iter().map(|g| g.keywords.len()).sum();
        let json = format_keyword_groups_json(&groups).unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&json).unwrap();

        assert_eq!(parsed["count"], expected);
        assert!(parsed["groups"].is_array());
    }

    #[test]
    fn test_format_terms_json_marks_default() {
        let library = TemplateLibrary::with_defaults();
        let entries = library.terms().list();
        let json = format_terms_json(&entries).unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&json).unwrap();

        assert_eq!(parsed["count"], 1);
        assert_eq!(parsed["items"][0]["isDefault"], true);
        assert_eq!(parsed["items"][0]["variationName"], "Standard");
    }

    #[test]
    fn test_format_filter_json() {
        let record = Record::new().with("status", "open");
        let conditions = vec![FilterCondition::new("status", FilterOperator::Equals, "open")];
        let json = format_filter_json(&record, &conditions, &[true], true, &[]).unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&json).unwrap();

        assert_eq!(parsed["matched"], true);
        assert_eq!(parsed["conditions"][0]["passed"], true);
        assert_eq!(parsed["conditions"][0]["text"], "status equals 'open'");
        assert_eq!(parsed["issues"].as_array().unwrap().len(), 0);
    }
}
