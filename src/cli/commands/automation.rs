//! Automation command implementation.
//!
//! Dry-runs workflow definitions against record snapshots. Rules are read
//! from a file on every call; nothing is stored and nothing is executed.

use colored::Colorize;
use serde_json::json;
use tracing::warn;

use crate::cli::args::{AutomationCommands, CheckArgs, OutputFormat};
use crate::cli::commands::read_input;
use crate::config::Config;
use crate::core::Record;
use crate::error::CrmError;
use crate::features::automation::{
    format_engine_result, AutomationEngine, Pipeline, RuleSet, TriggerEvent,
    AUTOMATION_VARIABLES,
};
use crate::output::{format_fields_pretty, format_list_json, to_json};

/// Execute automation subcommands.
///
/// # Errors
///
/// Returns an error if a rules or record file cannot be read or parsed.
pub fn automation(
    cmd: &AutomationCommands,
    format: OutputFormat,
    config: &Config,
) -> Result<String, CrmError> {
    match cmd {
        AutomationCommands::Fields { pipeline } => list_fields(*pipeline, format),
        AutomationCommands::Check(args) => check_rules(args, format, config),
        AutomationCommands::Validate { rules } => validate_rules(&RuleSet::load(rules)?, format),
        AutomationCommands::Variables => list_variables(format),
    }
}

/// List filter fields for one pipeline, or for all of them.
fn list_fields(pipeline: Option<Pipeline>, format: OutputFormat) -> Result<String, CrmError> {
    let pipelines: Vec<Pipeline> = pipeline.map_or_else(|| Pipeline::ALL.to_vec(), |p| vec![p]);

    match format {
        OutputFormat::Json => {
            let items: Vec<_> = pipelines
                .iter()
                .map(|p| {
                    let fields: Vec<_> = p
                        .fields()
                        .iter()
                        .map(|f| {
                            json!({
                                "key": f.key,
                                "label": f.label,
                                "type": f.field_type,
                                "operators": f.field_type.operators(),
                            })
                        })
                        .collect();
                    let stages: Vec<_> = p
                        .stages()
                        .iter()
                        .map(|(key, label)| json!({ "key": key, "label": label }))
                        .collect();
                    json!({
                        "pipeline": p,
                        "title": p.title(),
                        "fields": fields,
                        "stages": stages,
                    })
                })
                .collect();
            to_json(&items)
        },
        OutputFormat::Pretty => Ok(pipelines
            .iter()
            .map(|p| format_fields_pretty(*p))
            .collect::<Vec<_>>()
            .join("\n")),
    }
}

/// Build the trigger event described on the command line.
fn trigger_event(args: &CheckArgs) -> TriggerEvent {
    let mut event = TriggerEvent::new(args.trigger)
        .with_transition(args.from_stage.as_deref(), args.to_stage.as_deref())
        .with_labels(args.labels.clone());

    if let Some(pipeline) = args.pipeline {
        event = event.in_pipeline(pipeline);
    }
    if let Some(status) = &args.status {
        event = event.with_status(status.as_str());
    }
    if let Some(stage) = &args.stage {
        event = event.at_stage(stage.as_str());
    }
    event.from_pipeline = args.from_pipeline;
    event.to_pipeline = args.to_pipeline;

    event
}

/// Report which workflows would fire.
fn check_rules(args: &CheckArgs, format: OutputFormat, config: &Config) -> Result<String, CrmError> {
    let (rules, skipped) = RuleSet::load(&args.rules)?;
    for problem in &skipped {
        warn!("{problem}");
    }

    let record = Record::from_json(&read_input(&args.record)?)?;
    let event = trigger_event(args);
    let engine = AutomationEngine::with_config(rules.workflows, config.automation.engine_config());
    let result = engine.run(&event, &record);

    match format {
        OutputFormat::Json => to_json(&json!({
            "event": event,
            "result": result,
            "skipped": skipped,
        })),
        OutputFormat::Pretty => {
            let mut output = format_engine_result(&result);
            if !skipped.is_empty() {
                output.push_str(&format!("\n\n{} {} skipped", "!".yellow(), skipped.len()));
            }
            Ok(output)
        },
    }
}

/// Report problems in every workflow of a rule document.
fn validate_rules(loaded: &(RuleSet, Vec<String>), format: OutputFormat) -> Result<String, CrmError> {
    let (rules, skipped) = loaded;

    let reports: Vec<(&str, Vec<String>)> = rules
        .workflows
        .iter()
        .map(|w| (w.name.as_str(), w.issues()))
        .collect();
    let problems: usize = skipped.len() + reports.iter().map(|(_, i)| i.len()).sum::<usize>();

    match format {
        OutputFormat::Json => {
            let workflows: Vec<_> = reports
                .iter()
                .map(|(name, issues)| json!({ "name": name, "issues": issues }))
                .collect();
            to_json(&json!({
                "valid": problems == 0,
                "workflows": workflows,
                "skipped": skipped,
            }))
        },
        OutputFormat::Pretty => {
            let mut lines = Vec::new();

            lines.push("Workflow Validation".bold().to_string());
            lines.push("═".repeat(60));

            if reports.is_empty() && skipped.is_empty() {
                lines.push("  No workflows defined".dimmed().to_string());
                return Ok(lines.join("\n"));
            }

            for (name, issues) in &reports {
                if issues.is_empty() {
                    lines.push(format!("{} {}", "✓".green(), name));
                    continue;
                }
                lines.push(format!("{} {}", "✗".red(), name.bold()));
                for issue in issues {
                    lines.push(format!("    {}", issue.yellow()));
                }
            }

            for problem in skipped {
                lines.push(format!("{} {}", "✗".red(), problem));
            }

            lines.push(String::new());
            if problems == 0 {
                lines.push(format!("{} {} workflows valid", "✓".green(), reports.len()));
            } else {
                lines.push(format!("{} {problems} problems found", "✗".red()));
            }

            Ok(lines.join("\n"))
        },
    }
}

/// List variables usable in action text.
fn list_variables(format: OutputFormat) -> Result<String, CrmError> {
    match format {
        OutputFormat::Json => format_list_json("Automation Variables", AUTOMATION_VARIABLES),
        OutputFormat::Pretty => {
            let mut lines = Vec::new();
            lines.push("Automation Variables".bold().to_string());
            lines.push("─".repeat(50));
            for variable in AUTOMATION_VARIABLES {
                lines.push(format!(
                    "  {} {}",
                    format!("{{{{{}}}}}", variable.key).cyan(),
                    variable.description.dimmed()
                ));
            }
            Ok(lines.join("\n"))
        },
    }
}
