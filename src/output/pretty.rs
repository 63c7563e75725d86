use colored::Colorize;

use crate::core::FilterCondition;
use crate::features::automation::{ConditionIssue, Pipeline};
use crate::features::templates::{KeywordGroup, Template, TermsEntry};

/// Format a list of templates as a pretty table
pub fn format_templates_pretty(templates: &[&Template], title: &str) -> String {
    if templates.is_empty() {
        return format!("{title} (0 templates)\n  No templates");
    }

    let mut output = format!("{} ({} templates)\n", title, templates.len());
    output.push_str(&"─".repeat(60));
    output.push('\n');

    for template in templates {
        let status_icon = if template.is_active {
            "✓".green()
        } else {
            "○".dimmed()
        };

        let mut line = format!("{} {}", status_icon, template.name.bold());
        line.push_str(&format!("  {}", template.template_type.as_str().dimmed()));
        line.push_str(&format!("  {}", template.channel().to_string().cyan()));

        output.push_str(&line);
        output.push('\n');
    }

    output
}

/// Format a single template with full details
pub fn format_template_pretty(template: &Template) -> String {
    let mut output = String::new();

    output.push_str(&format!("{}\n", template.name.bold()));
    output.push_str(&format!("  {}: {}\n", "Type".dimmed(), template.template_type));
    output.push_str(&format!("  {}: {}\n", "Category".dimmed(), template.category));
    output.push_str(&format!("  {}: {}\n", "Channel".dimmed(), template.channel()));
    output.push_str(&format!(
        "  {}: {}\n",
        "Active".dimmed(),
        if template.is_active { "yes" } else { "no" }
    ));

    if let Some(subject) = &template.subject {
        output.push_str(&format!("  {}: {}\n", "Subject".dimmed(), subject));
    }

    if !template.available_keywords.is_empty() {
        output.push_str(&format!(
            "  {}: {}\n",
            "Keywords".dimmed(),
            template.available_keywords.join(", ")
        ));
    }

    output.push('\n');
    output.push_str(&"─".repeat(60));
    output.push('\n');
    output.push_str(&template.content);
    output.push('\n');

    output
}

/// Format keyword groups under their category headings
pub fn format_keyword_groups_pretty(groups: &[KeywordGroup], title: &str) -> String {
    let count: usize = groups.iter().map(|g| g.keywords.len()).sum();
    if count == 0 {
        return format!("{title} (0 keywords)\n  No keywords");
    }

    let mut output = format!("{title} ({count} keywords)\n");
    output.push_str(&"─".repeat(60));
    output.push('\n');

    for group in groups {
        output.push_str(&format!("{}\n", group.label.bold()));
        for keyword in &group.keywords {
            let mut line = format!("  {{{{{}}}}}", keyword.key.cyan());
            line.push_str(&format!("  {}", keyword.label));
            if !keyword.example.is_empty() {
                line.push_str(&format!("  {}", format!("e.g. {}", keyword.example).dimmed()));
            }
            output.push_str(&line);
            output.push('\n');
        }
    }

    output
}

/// Format Terms & Conditions variations, default first
pub fn format_terms_pretty(entries: &[TermsEntry<'_>]) -> String {
    if entries.is_empty() {
        return "Terms & Conditions (0)\n  No variations".to_string();
    }

    let mut output = format!("Terms & Conditions ({})\n", entries.len());
    output.push_str(&"─".repeat(40));
    output.push('\n');

    for entry in entries {
        let mut line = format!("  {}", entry.terms.variation_name.bold());
        if entry.is_default {
            line.push_str(&format!("  {}", "default".green()));
        }
        if !entry.terms.template.is_active {
            line.push_str(&format!("  {}", "inactive".dimmed()));
        }
        line.push_str(&format!("  {}", entry.terms.template.id.dimmed()));
        output.push_str(&line);
        output.push('\n');
    }

    output
}

/// Format per-condition outcomes of a filter evaluation
pub fn format_filter_pretty(conditions: &[FilterCondition], outcomes: &[bool], matched: bool) -> String {
    let mut lines = Vec::new();

    for (index, (condition, passed)) in conditions.iter().zip(outcomes).enumerate() {
        let mark = if *passed { "✓".green() } else { "✗".red() };
        let joiner = if index == 0 {
            "   ".to_string()
        } else {
            format!("{:<3}", condition.joiner().to_string())
        };
        lines.push(format!("  {} {} {}", joiner.dimmed(), mark, condition));
    }

    lines.push("─".repeat(50));
    if matched {
        lines.push(format!("{} record matches", "✓".green()));
    } else {
        lines.push(format!("{} record does not match", "✗".red()));
    }

    lines.join("\n")
}

/// Format the field catalog of a pipeline
pub fn format_fields_pretty(pipeline: Pipeline) -> String {
    let mut output = format!("{} fields\n", pipeline.title().bold());
    output.push_str(&"─".repeat(60));
    output.push('\n');

    for field in pipeline.fields() {
        let operators: Vec<&str> = field
            .field_type
            .operators()
            .iter()
            .map(|op| op.as_str())
            .collect();
        output.push_str(&format!(
            "  {} {:<8} {}\n",
            format!("{:<20}", field.key).cyan(),
            field.field_type.as_str(),
            operators.join(", ").dimmed()
        ));
    }

    let stages: Vec<&str> = pipeline.stages().iter().map(|(key, _)| *key).collect();
    if !stages.is_empty() {
        output.push_str(&format!("\n  {}: {}\n", "Stages".dimmed(), stages.join(", ")));
    }

    output
}

/// Format problems found while checking conditions against a catalog
pub fn format_condition_issues_pretty(issues: &[ConditionIssue]) -> String {
    issues
        .iter()
        .map(|issue| {
            format!(
                "  {} condition {}: {}",
                "!".yellow(),
                issue.index + 1,
                issue.message
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{FilterOperator, LogicalOperator};
    use crate::features::templates::{keyword_picker_groups, TemplateLibrary, TemplateType};

    fn plain() {
        colored::control::set_override(false);
    }

    #[test]
    fn test_format_templates_empty() {
        let output = format_templates_pretty(&[], "Templates");
        assert!(output.contains("Templates (0 templates)"));
        assert!(output.contains("No templates"));
    }

    #[test]
    fn test_format_templates_lists_names() {
        plain();
        let library = TemplateLibrary::with_defaults();
        let templates = library.list();
        let output = format_templates_pretty(&templates, "Templates");

        assert!(output.contains(&format!("Templates ({} templates)", templates.len())));
        assert!(output.contains("invoice_sms"));
        assert!(output.contains("sms"));
    }

    #[test]
    fn test_format_template_details() {
        plain();
        let library = TemplateLibrary::with_defaults();
        let template = library.get_by_type(TemplateType::InvoiceEmail).unwrap();
        let output = format_template_pretty(template);

        assert!(output.contains("Subject:"));
        assert!(output.contains("Channel: email"));
        assert!(output.contains(&template.content));
    }

    #[test]
    fn test_format_keyword_groups() {
        plain();
        let groups = keyword_picker_groups(Some(TemplateType::InvoiceSms), "total");
        let output = format_keyword_groups_pretty(&groups, "Keywords");

        assert!(output.contains("{{invoice.total}}"));
        assert!(!output.contains("{{proposal.number}}"));
    }

    #[test]
    fn test_format_keyword_groups_empty() {
        let groups = keyword_picker_groups(None, "zzz-no-such-keyword");
        let output = format_keyword_groups_pretty(&groups, "Keywords");
        assert!(output.contains("No keywords"));
    }

    #[test]
    fn test_format_terms() {
        plain();
        let library = TemplateLibrary::with_defaults();
        let output = format_terms_pretty(&library.terms().list());

        assert!(output.contains("Terms & Conditions (1)"));
        assert!(output.contains("Standard"));
        assert!(output.contains("default"));
    }

    #[test]
    fn test_format_filter() {
        plain();
        let conditions = vec![
            FilterCondition::new("status", FilterOperator::Equals, "open"),
            FilterCondition::new("amount", FilterOperator::GreaterThan, 500_i64)
                .joined(LogicalOperator::Or),
        ];
        let output = format_filter_pretty(&conditions, &[false, true], true);

        assert!(output.contains("✗ status equals 'open'"));
        assert!(output.contains("OR"));
        assert!(output.contains("record matches"));
    }

    #[test]
    fn test_format_fields() {
        plain();
        let output = format_fields_pretty(Pipeline::Jobs);
        assert!(output.contains("fields"));
        assert!(output.contains("Stages:"));
    }

    #[test]
    fn test_format_condition_issues() {
        plain();
        let issues = vec![ConditionIssue {
            index: 0,
            condition_id: String::new(),
            message: "unknown field 'colour'".to_string(),
        }];
        let output = format_condition_issues_pretty(&issues);
        assert!(output.contains("condition 1: unknown field 'colour'"));
    }
}
