//! Output formatting for fieldcrm.
//!
//! This module provides formatters for displaying templates, keywords and
//! filter results in various formats.

mod json;
mod pretty;

use crate::cli::args::OutputFormat;
use crate::error::CrmError;
use crate::features::templates::{KeywordGroup, Template, TermsEntry};

pub use json::*;
pub use pretty::*;

/// Format templates based on output format
///
/// # Errors
///
/// Returns `CrmError::Parse` if JSON serialization fails.
pub fn format_templates(
    templates: &[&Template],
    title: &str,
    format: OutputFormat,
) -> Result<String, CrmError> {
    match format {
        OutputFormat::Pretty => Ok(format_templates_pretty(templates, title)),
        OutputFormat::Json => format_templates_json(templates, title),
    }
}

/// Format a single template based on output format
///
/// # Errors
///
/// Returns `CrmError::Parse` if JSON serialization fails.
pub fn format_template(template: &Template, format: OutputFormat) -> Result<String, CrmError> {
    match format {
        OutputFormat::Pretty => Ok(format_template_pretty(template)),
        OutputFormat::Json => to_json(template),
    }
}

/// Format keyword groups based on output format
///
/// # Errors
///
/// Returns `CrmError::Parse` if JSON serialization fails.
pub fn format_keyword_groups(
    groups: &[KeywordGroup],
    title: &str,
    format: OutputFormat,
) -> Result<String, CrmError> {
    match format {
        OutputFormat::Pretty => Ok(format_keyword_groups_pretty(groups, title)),
        OutputFormat::Json => format_keyword_groups_json(groups),
    }
}

/// Format Terms & Conditions variations based on output format
///
/// # Errors
///
/// Returns `CrmError::Parse` if JSON serialization fails.
pub fn format_terms(entries: &[TermsEntry<'_>], format: OutputFormat) -> Result<String, CrmError> {
    match format {
        OutputFormat::Pretty => Ok(format_terms_pretty(entries)),
        OutputFormat::Json => format_terms_json(entries),
    }
}
