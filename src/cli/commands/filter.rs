//! Filter command implementation.
//!
//! Evaluates a textual query against a single JSON record.

use tracing::debug;

use crate::cli::args::{FilterArgs, OutputFormat};
use crate::cli::commands::read_input;
use crate::core::{evaluate, evaluate_condition, parse_conditions, Record};
use crate::error::CrmError;
use crate::features::automation::validate_conditions;
use crate::output::{format_condition_issues_pretty, format_filter_json, format_filter_pretty};

/// Execute the filter command.
///
/// A record that does not match is a normal result, not an error.
///
/// # Errors
///
/// Returns an error if the record cannot be read or the query cannot be parsed.
pub fn filter(args: &FilterArgs, format: OutputFormat) -> Result<String, CrmError> {
    let record = Record::from_json(&read_input(&args.record)?)?;
    let conditions = parse_conditions(&args.query)?;
    debug!(
        fields = record.len(),
        conditions = conditions.len(),
        "evaluating filter"
    );

    let outcomes: Vec<bool> = conditions
        .iter()
        .map(|condition| evaluate_condition(&record, condition))
        .collect();
    let matched = evaluate(&record, &conditions);

    let issues = args
        .pipeline
        .map(|pipeline| validate_conditions(pipeline, &conditions))
        .unwrap_or_default();

    match format {
        OutputFormat::Json => format_filter_json(&record, &conditions, &outcomes, matched, &issues),
        OutputFormat::Pretty => {
            let mut output = format_filter_pretty(&conditions, &outcomes, matched);
            if !issues.is_empty() {
                output.push_str("\n\nWarnings:\n");
                output.push_str(&format_condition_issues_pretty(&issues));
            }
            Ok(output)
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::automation::Pipeline;
    use std::fs;
    use std::path::PathBuf;
    use tempfile::TempDir;

    fn write_record(dir: &TempDir, json: &str) -> PathBuf {
        let path = dir.path().join("record.json");
        fs::write(&path, json).unwrap();
        path
    }

    fn args(record: PathBuf, query: &str, pipeline: Option<Pipeline>) -> FilterArgs {
        FilterArgs {
            record,
            query: query.to_string(),
            pipeline,
        }
    }

    #[test]
    fn test_filter_match_json() {
        let dir = TempDir::new().unwrap();
        let path = write_record(&dir, r#"{"status": "Open", "amount": 1250}"#);

        let output = filter(
            &args(path, "status = open AND amount > 1000", None),
            OutputFormat::Json,
        )
        .unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&output).unwrap();

        assert_eq!(parsed["matched"], true);
        assert_eq!(parsed["conditions"].as_array().unwrap().len(), 2);
    }

    #[test]
    fn test_filter_miss_is_not_an_error() {
        let dir = TempDir::new().unwrap();
        let path = write_record(&dir, r#"{"status": "closed"}"#);

        let output = filter(&args(path, "status = open", None), OutputFormat::Json).unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&output).unwrap();

        assert_eq!(parsed["matched"], false);
        assert_eq!(parsed["conditions"][0]["passed"], false);
    }

    #[test]
    fn test_filter_reports_catalog_issues() {
        let dir = TempDir::new().unwrap();
        let path = write_record(&dir, r#"{"colour": "red"}"#);

        let output = filter(
            &args(path, "colour = red", Some(Pipeline::Jobs)),
            OutputFormat::Json,
        )
        .unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&output).unwrap();

        assert_eq!(parsed["matched"], true);
        assert!(!parsed["issues"].as_array().unwrap().is_empty());
    }

    #[test]
    fn test_filter_bad_query() {
        let dir = TempDir::new().unwrap();
        let path = write_record(&dir, "{}");

        let err = filter(&args(path, "", None), OutputFormat::Pretty).unwrap_err();
        assert!(matches!(err, CrmError::Filter(_)));
    }
}
