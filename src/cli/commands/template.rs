//! Template CLI command implementation.
//!
//! This module implements the `fieldcrm template` command for browsing the
//! built-in message templates and rendering template bodies.

use std::collections::HashMap;

use colored::Colorize;
use serde_json::json;
use tracing::debug;

use crate::cli::args::{parse_key_value, OutputFormat, RenderArgs, TemplateCommands};
use crate::cli::commands::read_input;
use crate::config::Config;
use crate::core::Record;
use crate::error::CrmError;
use crate::features::templates::{
    default_content, extract_keywords, find_keyword, keyword_picker_groups, preview_document,
    render, render_full, unknown_keywords, validate_template_keywords, ActionKeyword, Channel,
    RenderOptions, StaticLinks, Template, TemplateCategory, TemplateLibrary, TemplateType,
    DEMO_DATA,
};
use crate::output::{format_keyword_groups, format_template, format_templates, to_json};

/// Execute the template command.
///
/// # Errors
///
/// Returns an error if the template operation fails.
pub fn template(
    cmd: &TemplateCommands,
    format: OutputFormat,
    config: &Config,
) -> Result<String, CrmError> {
    let library = TemplateLibrary::with_defaults();

    match cmd {
        TemplateCommands::List { category, search } => {
            list_templates(&library, *category, search.as_deref(), format)
        },
        TemplateCommands::Show {
            template_type,
            preview,
        } => show_template(&library, *template_type, *preview, format, config),
        TemplateCommands::Keywords {
            template_type,
            search,
        } => {
            let groups = keyword_picker_groups(*template_type, search.as_deref().unwrap_or(""));
            let title = template_type.map_or_else(
                || "Keywords".to_string(),
                |t| format!("Keywords for {}", t.label()),
            );
            format_keyword_groups(&groups, &title, format)
        },
        TemplateCommands::Extract { file } => extract(&read_input(file)?, format),
        TemplateCommands::Validate {
            file,
            template_type,
            required,
        } => validate(&read_input(file)?, *template_type, required, format),
        TemplateCommands::Render(args) => {
            let rendered = render_body(args, config)?;
            match format {
                OutputFormat::Json => to_json(&json!({ "rendered": rendered })),
                OutputFormat::Pretty => Ok(rendered),
            }
        },
    }
}

/// List templates, narrowed by category and search.
fn list_templates(
    library: &TemplateLibrary,
    category: Option<TemplateCategory>,
    search: Option<&str>,
    format: OutputFormat,
) -> Result<String, CrmError> {
    let templates: Vec<&Template> = search
        .map_or_else(|| library.list(), |q| library.search(q))
        .into_iter()
        .filter(|t| category.map_or(true, |c| t.category == c))
        .collect();

    let title = category.map_or_else(|| "Templates".to_string(), |c| c.label().to_string());
    format_templates(&templates, &title, format)
}

/// Built-in template for a type; Terms resolve to the default variation.
fn find_template(library: &TemplateLibrary, template_type: TemplateType) -> Result<&Template, CrmError> {
    let found = if template_type == TemplateType::TermsAndConditions {
        library.terms().get_default().map(|tc| &tc.template)
    } else {
        library.get_by_type(template_type)
    };

    found.ok_or_else(|| CrmError::NotFound(format!("Template of type '{template_type}'")))
}

fn show_template(
    library: &TemplateLibrary,
    template_type: TemplateType,
    preview: bool,
    format: OutputFormat,
    config: &Config,
) -> Result<String, CrmError> {
    let template = find_template(library, template_type)?;

    if !preview {
        return format_template(template, format);
    }

    let options = RenderOptions::for_channel(template.channel()).with_style(config.preview.style());
    let mut previewed = template.clone();
    previewed.content = render_full(&template.content, &DEMO_DATA, &config.preview.links(), &options);
    previewed.subject = template.subject.as_deref().map(|s| render(s, &DEMO_DATA));

    format_template(&previewed, format)
}

/// List keywords referenced in a body.
fn extract(content: &str, format: OutputFormat) -> Result<String, CrmError> {
    let keys = extract_keywords(content);

    match format {
        OutputFormat::Json => {
            let items: Vec<_> = keys
                .iter()
                .map(|key| {
                    let keyword = find_keyword(key);
                    json!({
                        "key": key,
                        "known": keyword.is_some(),
                        "label": keyword.map(|k| k.label),
                        "category": keyword.map(|k| k.category),
                    })
                })
                .collect();
            to_json(&json!({ "count": items.len(), "items": items }))
        },
        OutputFormat::Pretty => {
            if keys.is_empty() {
                return Ok("Keywords (0)\n  No keywords".to_string());
            }

            let mut lines = Vec::new();
            lines.push(format!("Keywords ({})", keys.len()));
            lines.push("─".repeat(40));
            for key in &keys {
                match find_keyword(key) {
                    Some(keyword) => lines.push(format!(
                        "  {}  {}",
                        format!("{{{{{key}}}}}").cyan(),
                        keyword.label.dimmed()
                    )),
                    None => lines.push(format!(
                        "  {}  {}",
                        format!("{{{{{key}}}}}").yellow(),
                        "unknown".dimmed()
                    )),
                }
            }
            Ok(lines.join("\n"))
        },
    }
}

/// Check a body against a template type and required keywords.
fn validate(
    content: &str,
    template_type: TemplateType,
    required: &[String],
    format: OutputFormat,
) -> Result<String, CrmError> {
    let validation = validate_template_keywords(content, required);
    let unknown = unknown_keywords(content, template_type);
    let valid = validation.valid && unknown.is_empty();

    match format {
        OutputFormat::Json => to_json(&json!({
            "type": template_type,
            "valid": valid,
            "missing": validation.missing,
            "unknown": unknown,
        })),
        OutputFormat::Pretty => {
            let mut lines = Vec::new();
            lines.push(format!("Template check: {}", template_type.label()).bold().to_string());
            lines.push("─".repeat(50));

            for key in &validation.missing {
                lines.push(format!("{} missing {}", "✗".red(), format!("{{{{{key}}}}}").bold()));
            }
            for key in &unknown {
                lines.push(format!(
                    "{} {} is not offered for {}",
                    "✗".red(),
                    format!("{{{{{key}}}}}").bold(),
                    template_type
                ));
            }

            if valid {
                lines.push(format!("{} all keywords valid", "✓".green()));
            }
            Ok(lines.join("\n"))
        },
    }
}

/// Collect substitution values: context file, then --var, then demo data.
fn build_context(args: &RenderArgs) -> Result<HashMap<String, String>, CrmError> {
    let mut context = match &args.context {
        Some(path) => Record::from_json(&read_input(path)?)?.to_context(),
        None => HashMap::new(),
    };

    for var in &args.vars {
        let (key, value) = parse_key_value(var)?;
        context.insert(key, value);
    }

    if args.demo {
        for (key, value) in DEMO_DATA.iter() {
            context.entry(key.clone()).or_insert_with(|| value.clone());
        }
    }

    Ok(context)
}

/// Action links: the preview placeholder for every action, then --link.
fn build_links(args: &RenderArgs, config: &Config) -> Result<StaticLinks, CrmError> {
    let mut links = StaticLinks::new();

    if args.preview {
        for action in ActionKeyword::ALL {
            links.insert(action, config.preview.action_href.as_str());
        }
    }

    for link in &args.links {
        let (key, url) = parse_key_value(link)?;
        let action = ActionKeyword::from_key(&key)
            .ok_or_else(|| CrmError::InvalidArgument(format!("Unknown action keyword '{key}'")))?;
        links.insert(action, url);
    }

    Ok(links)
}

/// Render a body file or a built-in body.
fn render_body(args: &RenderArgs, config: &Config) -> Result<String, CrmError> {
    let (body, type_channel) = match (&args.file, args.template_type) {
        (_, Some(template_type)) => (default_content(template_type), Some(template_type.channel())),
        (Some(path), None) => (read_input(path)?, None),
        (None, None) => {
            return Err(CrmError::InvalidArgument(
                "Provide a template file or --type".to_string(),
            ))
        },
    };

    let channel = args.channel.or(type_channel).unwrap_or_default();
    let context = build_context(args)?;
    let links = build_links(args, config)?;
    debug!(%channel, values = context.len(), "rendering template");

    let options = RenderOptions::for_channel(channel).with_style(config.preview.style());
    let rendered = render_full(&body, &context, &links, &options);

    if args.document && channel.is_html() {
        Ok(preview_document(&rendered))
    } else {
        Ok(rendered)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::path::PathBuf;
    use tempfile::TempDir;

    fn render_args() -> RenderArgs {
        RenderArgs {
            file: None,
            template_type: None,
            vars: Vec::new(),
            context: None,
            demo: false,
            preview: false,
            links: Vec::new(),
            channel: None,
            document: false,
        }
    }

    fn body_file(dir: &TempDir, contents: &str) -> PathBuf {
        let path = dir.path().join("body.txt");
        fs::write(&path, contents).unwrap();
        path
    }

    #[test]
    fn test_list_templates_by_category() {
        let library = TemplateLibrary::with_defaults();
        let output = list_templates(
            &library,
            Some(TemplateCategory::Invoices),
            None,
            OutputFormat::Json,
        )
        .unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&output).unwrap();

        let items = parsed["items"].as_array().unwrap();
        assert!(!items.is_empty());
        assert!(items.iter().all(|t| t["category"] == "invoices"));
    }

    #[test]
    fn test_show_terms_uses_default_variation() {
        let library = TemplateLibrary::with_defaults();
        let template = find_template(&library, TemplateType::TermsAndConditions).unwrap();
        assert_eq!(template.template_type, TemplateType::TermsAndConditions);
    }

    #[test]
    fn test_show_preview_substitutes_demo_values() {
        let library = TemplateLibrary::with_defaults();
        let output = show_template(
            &library,
            TemplateType::InvoiceSms,
            true,
            OutputFormat::Json,
            &Config::default(),
        )
        .unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&output).unwrap();

        let content = parsed["content"].as_str().unwrap();
        assert!(!content.contains("{{contact.firstName}}"));
        assert!(!content.contains("{{invoice.total}}"));
    }

    #[test]
    fn test_extract_marks_unknown_keys() {
        let output = extract("Hi {{contact.firstName}}, {{made.up}}", OutputFormat::Json).unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&output).unwrap();

        assert_eq!(parsed["count"], 2);
        assert_eq!(parsed["items"][0]["key"], "contact.firstName");
        assert_eq!(parsed["items"][0]["known"], true);
        assert_eq!(parsed["items"][1]["known"], false);
    }

    #[test]
    fn test_validate_reports_missing_and_unknown() {
        let output = validate(
            "Hi {{contact.firstName}}, see {{proposal.number}}",
            TemplateType::InvoiceSms,
            &["invoice.total".to_string()],
            OutputFormat::Json,
        )
        .unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&output).unwrap();

        assert_eq!(parsed["valid"], false);
        assert_eq!(parsed["missing"][0], "invoice.total");
        assert_eq!(parsed["unknown"][0], "proposal.number");
    }

    #[test]
    fn test_render_file_with_vars() {
        let dir = TempDir::new().unwrap();
        let mut args = render_args();
        args.file = Some(body_file(&dir, "Hi {{contact.firstName}}, {{company.name}}"));
        args.vars = vec!["contact.firstName=Ana".to_string()];

        let output = render_body(&args, &Config::default()).unwrap();
        assert_eq!(output, "Hi Ana, {{company.name}}");
    }

    #[test]
    fn test_render_context_file_then_vars() {
        let dir = TempDir::new().unwrap();
        let context = dir.path().join("ctx.json");
        fs::write(&context, r#"{"contact.firstName": "Ana", "invoice.total": "$10"}"#).unwrap();

        let mut args = render_args();
        args.file = Some(body_file(&dir, "{{contact.firstName}} owes {{invoice.total}}"));
        args.context = Some(context);
        args.vars = vec!["invoice.total=$12".to_string()];

        let output = render_body(&args, &Config::default()).unwrap();
        assert_eq!(output, "Ana owes $12");
    }

    #[test]
    fn test_render_sms_link() {
        let dir = TempDir::new().unwrap();
        let mut args = render_args();
        args.file = Some(body_file(&dir, "Pay here: {{pay-invoice}}"));
        args.channel = Some(Channel::Sms);
        args.links = vec!["pay-invoice=https://pay.test/1".to_string()];

        let output = render_body(&args, &Config::default()).unwrap();
        assert_eq!(output, "Pay here: https://pay.test/1");
    }

    #[test]
    fn test_render_unknown_link_action() {
        let dir = TempDir::new().unwrap();
        let mut args = render_args();
        args.file = Some(body_file(&dir, "x"));
        args.links = vec!["teleport=https://x".to_string()];

        assert!(render_body(&args, &Config::default()).is_err());
    }

    #[test]
    fn test_render_builtin_type_with_demo_and_preview() {
        let mut args = render_args();
        args.template_type = Some(TemplateType::InvoiceSms);
        args.demo = true;
        args.preview = true;

        let output = render_body(&args, &Config::default()).unwrap();
        assert!(!output.contains("{{"));
    }

    #[test]
    fn test_render_document_wraps_html_only() {
        let dir = TempDir::new().unwrap();
        let mut args = render_args();
        args.file = Some(body_file(&dir, "<p>Hello</p>"));
        args.document = true;

        let html = render_body(&args, &Config::default()).unwrap();
        assert!(html.starts_with("<!DOCTYPE html>"));

        args.channel = Some(Channel::Sms);
        let sms = render_body(&args, &Config::default()).unwrap();
        assert_eq!(sms, "<p>Hello</p>");
    }
}
