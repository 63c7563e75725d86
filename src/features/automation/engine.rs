//! Eligibility checks for automation workflows.
//!
//! The engine answers one question per workflow: given this trigger event and
//! this record snapshot, would the workflow fire? Eligible workflows get their
//! actions previewed; nothing is executed.

use colored::Colorize;
use serde::Serialize;
use tracing::debug;

use super::rule::{ActionPreview, AutomationWorkflow, TriggerEvent, WorkflowStatus};
use crate::core::{evaluate, Record};

/// Configuration for the automation engine.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Maximum actions previewed per workflow
    pub max_actions: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self { max_actions: 10 }
    }
}

/// Why a workflow would or would not fire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Eligibility {
    /// Active, trigger matched, filters passed.
    Eligible,
    /// Not active.
    Inactive,
    /// Trigger did not match the event.
    TriggerMismatch,
    /// Filters evaluated to false.
    FiltersFailed,
}

impl Eligibility {
    /// Whether the workflow would fire.
    #[must_use]
    pub const fn is_eligible(self) -> bool {
        matches!(self, Self::Eligible)
    }

    /// Short explanation.
    #[must_use]
    pub const fn reason(self) -> &'static str {
        match self {
            Self::Eligible => "eligible",
            Self::Inactive => "workflow is not active",
            Self::TriggerMismatch => "trigger does not match event",
            Self::FiltersFailed => "filters not satisfied",
        }
    }
}

/// Result of checking one workflow.
#[derive(Debug, Clone, Serialize)]
pub struct WorkflowResult {
    /// Workflow ID
    pub workflow_id: String,
    /// Workflow name
    pub workflow_name: String,
    /// Workflow status
    pub status: WorkflowStatus,
    /// Outcome
    pub eligibility: Eligibility,
    /// Action previews (empty unless eligible)
    pub actions: Vec<ActionPreview>,
}

/// Result of checking a set of workflows.
#[derive(Debug, Clone, Default, Serialize)]
pub struct EngineResult {
    /// Workflows evaluated
    pub workflows_evaluated: usize,
    /// Workflows that would fire
    pub workflows_eligible: usize,
    /// Per-workflow outcomes
    pub results: Vec<WorkflowResult>,
}

impl EngineResult {
    /// Create an empty result.
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// Outcomes of the workflows that would fire.
    pub fn eligible(&self) -> impl Iterator<Item = &WorkflowResult> {
        self.results.iter().filter(|r| r.eligibility.is_eligible())
    }
}

/// The automation engine.
#[derive(Debug, Clone, Default)]
pub struct AutomationEngine {
    workflows: Vec<AutomationWorkflow>,
    config: EngineConfig,
}

impl AutomationEngine {
    /// Create an engine over a set of workflows.
    #[must_use]
    pub fn new(workflows: Vec<AutomationWorkflow>) -> Self {
        Self {
            workflows,
            config: EngineConfig::default(),
        }
    }

    /// Create an engine with custom config.
    #[must_use]
    pub const fn with_config(workflows: Vec<AutomationWorkflow>, config: EngineConfig) -> Self {
        Self { workflows, config }
    }

    /// The workflows this engine checks.
    #[must_use]
    pub fn workflows(&self) -> &[AutomationWorkflow] {
        &self.workflows
    }

    /// Decide whether one workflow would fire.
    #[must_use]
    pub fn check(workflow: &AutomationWorkflow, event: &TriggerEvent, record: &Record) -> Eligibility {
        let eligibility = if !workflow.is_active() {
            Eligibility::Inactive
        } else if !workflow.trigger.matches(event) {
            Eligibility::TriggerMismatch
        } else if !evaluate(record, &workflow.filters) {
            Eligibility::FiltersFailed
        } else {
            Eligibility::Eligible
        };

        debug!(
            workflow = %workflow.name,
            outcome = eligibility.reason(),
            "checked workflow"
        );

        eligibility
    }

    /// Check every workflow against an event and a record.
    #[must_use]
    pub fn run(&self, event: &TriggerEvent, record: &Record) -> EngineResult {
        let context = record.to_context();
        let mut result = EngineResult::empty();

        for workflow in &self.workflows {
            result.workflows_evaluated += 1;

            let eligibility = Self::check(workflow, event, record);
            let actions = if eligibility.is_eligible() {
                result.workflows_eligible += 1;
                workflow
                    .ordered_actions()
                    .into_iter()
                    .take(self.config.max_actions)
                    .map(|action| action.preview(&context))
                    .collect()
            } else {
                Vec::new()
            };

            result.results.push(WorkflowResult {
                workflow_id: workflow.id.clone(),
                workflow_name: workflow.name.clone(),
                status: workflow.status,
                eligibility,
                actions,
            });
        }

        result
    }
}

/// Format engine result for display.
#[must_use]
pub fn format_engine_result(result: &EngineResult) -> String {
    let mut lines = Vec::new();

    lines.push(format!(
        "Automation check: {}/{} workflows eligible",
        result.workflows_eligible, result.workflows_evaluated
    ));
    lines.push("─".repeat(50));

    if result.workflows_evaluated == 0 {
        lines.push("  No workflows defined".dimmed().to_string());
        return lines.join("\n");
    }

    for workflow in &result.results {
        if !workflow.eligibility.is_eligible() {
            lines.push(format!(
                "{} {} {}",
                "✗".red(),
                workflow.workflow_name,
                format!("({})", workflow.eligibility.reason()).dimmed()
            ));
            continue;
        }

        lines.push(format!("{} {}", "✓".green(), workflow.workflow_name.bold()));

        for action in &workflow.actions {
            let mut header = format!("    {}. {}", action.order, action.label);
            if action.delay_minutes > 0 {
                header.push_str(&format!(" after {} min", action.delay_minutes));
            }
            if !action.active {
                header.push_str(" (disabled)");
            }
            lines.push(header);

            for (name, value) in &action.fields {
                lines.push(format!("       {}: {}", name.dimmed(), value));
            }
        }
    }

    lines.join("\n")
}
