//! Automation workflow definitions.
//!
//! A workflow pairs a trigger with a filter list and an ordered set of
//! declarative actions. Actions are described, never executed: the most this
//! crate does with them is preview their text against a record.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::pipeline::{validate_conditions, Pipeline};
use crate::core::{push_condition, FilterCondition};
use crate::error::CrmError;
use crate::features::templates::render;

/// Lifecycle status of a workflow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkflowStatus {
    /// Eligible to fire.
    Active,
    /// Temporarily disabled.
    Paused,
    /// Still being authored.
    #[default]
    Draft,
}

impl WorkflowStatus {
    /// Get display name.
    #[must_use]
    pub const fn display_name(self) -> &'static str {
        match self {
            Self::Active => "Active",
            Self::Paused => "Paused",
            Self::Draft => "Draft",
        }
    }
}

/// An automation workflow.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AutomationWorkflow {
    /// Unique workflow ID
    #[serde(default)]
    pub id: String,
    /// Workflow name
    pub name: String,
    /// Workflow description
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Lifecycle status
    #[serde(default)]
    pub status: WorkflowStatus,
    /// Trigger that activates this workflow
    pub trigger: AutomationTrigger,
    /// Conditions folded left to right
    #[serde(default)]
    pub filters: Vec<FilterCondition>,
    /// Actions, run in `order`
    #[serde(default)]
    pub actions: Vec<AutomationAction>,
    /// Number of times executed
    #[serde(default)]
    pub total_executions: u64,
    /// Last time the workflow was executed
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_executed: Option<DateTime<Utc>>,
    /// Creation time
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    /// Last modification time
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl AutomationWorkflow {
    /// Create a new draft workflow.
    #[must_use]
    pub fn new(name: impl Into<String>, trigger: AutomationTrigger) -> Self {
        let now = Utc::now();
        Self {
            id: String::new(),
            name: name.into(),
            description: None,
            status: WorkflowStatus::Draft,
            trigger,
            filters: Vec::new(),
            actions: Vec::new(),
            total_executions: 0,
            last_executed: None,
            created_at: Some(now),
            updated_at: Some(now),
        }
    }

    /// Set the ID.
    #[must_use]
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = id.into();
        self
    }

    /// Set the description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Set the status.
    #[must_use]
    pub const fn with_status(mut self, status: WorkflowStatus) -> Self {
        self.status = status;
        self
    }

    /// Append a filter condition (first carries no joiner, later default to AND).
    #[must_use]
    pub fn with_filter(mut self, condition: FilterCondition) -> Self {
        push_condition(&mut self.filters, condition);
        self
    }

    /// Append an action, numbering it after the existing ones.
    #[must_use]
    pub fn with_action(mut self, mut action: AutomationAction) -> Self {
        action.order = u32::try_from(self.actions.len() + 1).unwrap_or(u32::MAX);
        self.actions.push(action);
        self
    }

    /// Whether the workflow is active.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.status == WorkflowStatus::Active
    }

    /// Actions sorted by their `order`.
    #[must_use]
    pub fn ordered_actions(&self) -> Vec<&AutomationAction> {
        let mut actions: Vec<_> = self.actions.iter().collect();
        actions.sort_by_key(|a| a.order);
        actions
    }

    /// Advisory problems with this workflow's definition.
    ///
    /// Filters are checked against the trigger's pipeline when one is set;
    /// actions are checked for the fields their forms require.
    #[must_use]
    pub fn issues(&self) -> Vec<String> {
        let mut issues = Vec::new();

        if self.name.trim().is_empty() {
            issues.push("Workflow name is required".to_string());
        }

        if let Some(pipeline) = self.trigger.pipeline {
            issues.extend(
                validate_conditions(pipeline, &self.filters)
                    .into_iter()
                    .map(|i| format!("Filter {}: {}", i.index + 1, i.message)),
            );
        }

        for action in self.ordered_actions() {
            if let Some(missing) = action.missing_required() {
                issues.push(format!(
                    "Action {} ({}): {missing}",
                    action.order,
                    action.action_type.display_name()
                ));
            }
        }

        issues
    }
}

/// Types of triggers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TriggerType {
    /// A proposal changed status
    ProposalStatus,
    /// A record moved between pipelines
    PipelineChange,
    /// A record moved between stages
    StageChange,
    /// An invoice changed status
    InvoiceStatus,
    /// A job changed status
    JobStatus,
    /// An appointment changed status
    AppointmentStatus,
}

impl TriggerType {
    /// Every trigger type.
    pub const ALL: [Self; 6] = [
        Self::ProposalStatus,
        Self::PipelineChange,
        Self::StageChange,
        Self::InvoiceStatus,
        Self::JobStatus,
        Self::AppointmentStatus,
    ];

    /// The wire name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::ProposalStatus => "proposal_status",
            Self::PipelineChange => "pipeline_change",
            Self::StageChange => "stage_change",
            Self::InvoiceStatus => "invoice_status",
            Self::JobStatus => "job_status",
            Self::AppointmentStatus => "appointment_status",
        }
    }

    /// Get display name.
    #[must_use]
    pub const fn display_name(self) -> &'static str {
        match self {
            Self::ProposalStatus => "Proposal Status",
            Self::PipelineChange => "Pipeline Change",
            Self::StageChange => "Stage Change",
            Self::InvoiceStatus => "Invoice Status",
            Self::JobStatus => "Job Status",
            Self::AppointmentStatus => "Appointment Status",
        }
    }
}

impl fmt::Display for TriggerType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TriggerType {
    type Err = CrmError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.trim().to_lowercase().replace('-', "_");
        Self::ALL
            .into_iter()
            .find(|t| t.as_str() == lower)
            .ok_or_else(|| CrmError::InvalidArgument(format!("Unknown trigger type: {s}")))
    }
}

/// What activates a workflow.
///
/// Every optional field that is set narrows the trigger; unset fields match
/// anything.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AutomationTrigger {
    /// Trigger type
    #[serde(rename = "type")]
    pub trigger_type: TriggerType,
    /// Pipeline the event must come from
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pipeline: Option<Pipeline>,
    /// Stage the record must be in
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stage: Option<String>,
    /// Status the record must have
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    /// Stage the record left
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from_stage: Option<String>,
    /// Stage the record entered
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub to_stage: Option<String>,
    /// Pipeline the record left
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from_pipeline: Option<Pipeline>,
    /// Pipeline the record entered
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub to_pipeline: Option<Pipeline>,
    /// Labels the record must carry
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub labels: Vec<String>,
}

impl AutomationTrigger {
    /// Create a trigger of the given type with no narrowing.
    #[must_use]
    pub const fn new(trigger_type: TriggerType) -> Self {
        Self {
            trigger_type,
            pipeline: None,
            stage: None,
            status: None,
            from_stage: None,
            to_stage: None,
            from_pipeline: None,
            to_pipeline: None,
            labels: Vec::new(),
        }
    }

    /// Restrict to a pipeline.
    #[must_use]
    pub const fn in_pipeline(mut self, pipeline: Pipeline) -> Self {
        self.pipeline = Some(pipeline);
        self
    }

    /// Restrict to a status.
    #[must_use]
    pub fn with_status(mut self, status: impl Into<String>) -> Self {
        self.status = Some(status.into());
        self
    }

    /// Restrict to a stage transition.
    #[must_use]
    pub fn with_transition(mut self, from: Option<&str>, to: Option<&str>) -> Self {
        self.from_stage = from.map(ToString::to_string);
        self.to_stage = to.map(ToString::to_string);
        self
    }

    /// Require a label.
    #[must_use]
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.labels.push(label.into());
        self
    }

    /// Check if the trigger fires for an event.
    #[must_use]
    pub fn matches(&self, event: &TriggerEvent) -> bool {
        self.trigger_type == event.trigger_type
            && narrow(self.pipeline.as_ref(), event.pipeline.as_ref())
            && narrow(self.stage.as_ref(), event.stage.as_ref())
            && narrow(self.status.as_ref(), event.status.as_ref())
            && narrow(self.from_stage.as_ref(), event.from_stage.as_ref())
            && narrow(self.to_stage.as_ref(), event.to_stage.as_ref())
            && narrow(self.from_pipeline.as_ref(), event.from_pipeline.as_ref())
            && narrow(self.to_pipeline.as_ref(), event.to_pipeline.as_ref())
            && self.labels.iter().all(|want| {
                event
                    .labels
                    .iter()
                    .any(|have| have.eq_ignore_ascii_case(want))
            })
    }

    /// One-line description, e.g. `Stage Change in jobs (pending_schedule → in_progress)`.
    #[must_use]
    pub fn describe(&self) -> String {
        let mut text = self.trigger_type.display_name().to_string();
        if let Some(pipeline) = self.pipeline {
            text.push_str(&format!(" in {pipeline}"));
        }
        if let Some(status) = &self.status {
            text.push_str(&format!(" = {status}"));
        }
        if let Some(stage) = &self.stage {
            text.push_str(&format!(" at {stage}"));
        }
        if self.from_stage.is_some() || self.to_stage.is_some() {
            text.push_str(&format!(
                " ({} → {})",
                self.from_stage.as_deref().unwrap_or("*"),
                self.to_stage.as_deref().unwrap_or("*")
            ));
        }
        if !self.labels.is_empty() {
            text.push_str(&format!(" [{}]", self.labels.join(", ")));
        }
        text
    }
}

/// An unset narrowing field matches anything; a set one must be equal.
fn narrow<T: PartialEq>(want: Option<&T>, got: Option<&T>) -> bool {
    want.map_or(true, |w| got == Some(w))
}

/// Something that happened to a record, checked against triggers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TriggerEvent {
    /// Event type
    #[serde(rename = "type")]
    pub trigger_type: TriggerType,
    /// Pipeline the record belongs to
    #[serde(default)]
    pub pipeline: Option<Pipeline>,
    /// Current stage
    #[serde(default)]
    pub stage: Option<String>,
    /// Current status
    #[serde(default)]
    pub status: Option<String>,
    /// Previous stage
    #[serde(default)]
    pub from_stage: Option<String>,
    /// New stage
    #[serde(default)]
    pub to_stage: Option<String>,
    /// Previous pipeline
    #[serde(default)]
    pub from_pipeline: Option<Pipeline>,
    /// New pipeline
    #[serde(default)]
    pub to_pipeline: Option<Pipeline>,
    /// Labels on the record
    #[serde(default)]
    pub labels: Vec<String>,
}

impl TriggerEvent {
    /// Create an event of the given type.
    #[must_use]
    pub const fn new(trigger_type: TriggerType) -> Self {
        Self {
            trigger_type,
            pipeline: None,
            stage: None,
            status: None,
            from_stage: None,
            to_stage: None,
            from_pipeline: None,
            to_pipeline: None,
            labels: Vec::new(),
        }
    }

    /// Set the pipeline.
    #[must_use]
    pub const fn in_pipeline(mut self, pipeline: Pipeline) -> Self {
        self.pipeline = Some(pipeline);
        self
    }

    /// Set the status.
    #[must_use]
    pub fn with_status(mut self, status: impl Into<String>) -> Self {
        self.status = Some(status.into());
        self
    }

    /// Set the current stage.
    #[must_use]
    pub fn at_stage(mut self, stage: impl Into<String>) -> Self {
        self.stage = Some(stage.into());
        self
    }

    /// Set the stage transition.
    #[must_use]
    pub fn with_transition(mut self, from: Option<&str>, to: Option<&str>) -> Self {
        self.from_stage = from.map(ToString::to_string);
        self.to_stage = to.map(ToString::to_string);
        self
    }

    /// Set the labels.
    #[must_use]
    pub fn with_labels(mut self, labels: Vec<String>) -> Self {
        self.labels = labels;
        self
    }
}

/// Types of actions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionType {
    /// Create a team chat channel
    CreateTeamChatChannel,
    /// Post to a team chat channel
    SendTeamChatMessage,
    /// Create a task
    CreateTask,
    /// Send an SMS
    SendTextMessage,
    /// Wait before the next action
    Delay,
    /// Look up an existing channel
    FindTeamChatChannel,
    /// Send an email
    SendEmail,
    /// Add a note to the record
    AddNote,
    /// Move the record to another stage
    UpdateStage,
    /// Assign a user
    AssignUser,
}

impl ActionType {
    /// Get display name.
    #[must_use]
    pub const fn display_name(self) -> &'static str {
        match self {
            Self::CreateTeamChatChannel => "Create Team Chat Channel",
            Self::SendTeamChatMessage => "Send Team Chat Message",
            Self::CreateTask => "Create Task",
            Self::SendTextMessage => "Send Text Message",
            Self::Delay => "Delay",
            Self::FindTeamChatChannel => "Find Team Chat Channel",
            Self::SendEmail => "Send Email",
            Self::AddNote => "Add Note",
            Self::UpdateStage => "Update Stage",
            Self::AssignUser => "Assign User",
        }
    }
}

/// Action parameters. Which fields apply depends on the action type.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ActionConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub channel_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub channel_description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub channel_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub task_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub task_description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assigned_user_role: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub priority: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recipient_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text_message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email_subject: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email_content: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email_recipient: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub delay_minutes: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub delay_hours: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub delay_days: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub search_by: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub search_value: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note_content: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub new_stage: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub new_pipeline: Option<Pipeline>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assign_to_role: Option<String>,
}

impl ActionConfig {
    /// Text-bearing fields as `(name, value)` pairs, in display order.
    fn text_fields(&self) -> Vec<(&'static str, &str)> {
        [
            ("channelName", self.channel_name.as_deref()),
            ("channelDescription", self.channel_description.as_deref()),
            ("channelId", self.channel_id.as_deref()),
            ("message", self.message.as_deref()),
            ("taskName", self.task_name.as_deref()),
            ("taskDescription", self.task_description.as_deref()),
            ("assignedUserRole", self.assigned_user_role.as_deref()),
            ("priority", self.priority.as_deref()),
            ("recipientType", self.recipient_type.as_deref()),
            ("textMessage", self.text_message.as_deref()),
            ("emailRecipient", self.email_recipient.as_deref()),
            ("emailSubject", self.email_subject.as_deref()),
            ("emailContent", self.email_content.as_deref()),
            ("searchBy", self.search_by.as_deref()),
            ("searchValue", self.search_value.as_deref()),
            ("noteContent", self.note_content.as_deref()),
            ("newStage", self.new_stage.as_deref()),
            ("assignToRole", self.assign_to_role.as_deref()),
        ]
        .into_iter()
        .filter_map(|(name, value)| value.map(|v| (name, v)))
        .collect()
    }

    /// Total configured delay in minutes.
    #[must_use]
    pub fn total_delay_minutes(&self) -> u64 {
        u64::from(self.delay_minutes.unwrap_or(0))
            + u64::from(self.delay_hours.unwrap_or(0)) * 60
            + u64::from(self.delay_days.unwrap_or(0)) * 60 * 24
    }
}

/// A declarative workflow step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AutomationAction {
    /// Unique action ID
    #[serde(default)]
    pub id: String,
    /// Action type
    #[serde(rename = "type")]
    pub action_type: ActionType,
    /// Position within the workflow (1-based)
    #[serde(default)]
    pub order: u32,
    /// Delay before this step, in minutes
    #[serde(default)]
    pub delay: u32,
    /// Whether the step is enabled
    #[serde(default = "default_true")]
    pub is_active: bool,
    /// Type-specific parameters
    #[serde(default)]
    pub config: ActionConfig,
}

const fn default_true() -> bool {
    true
}

impl AutomationAction {
    /// Create an action with empty config.
    #[must_use]
    pub fn new(action_type: ActionType) -> Self {
        Self {
            id: String::new(),
            action_type,
            order: 0,
            delay: 0,
            is_active: true,
            config: ActionConfig::default(),
        }
    }

    /// Set the config.
    #[must_use]
    pub fn with_config(mut self, config: ActionConfig) -> Self {
        self.config = config;
        self
    }

    /// Name of the required config field that is missing, if any.
    #[must_use]
    pub fn missing_required(&self) -> Option<&'static str> {
        let blank = |v: &Option<String>| v.as_deref().map_or(true, |s| s.trim().is_empty());
        match self.action_type {
            ActionType::CreateTeamChatChannel if blank(&self.config.channel_name) => {
                Some("channel name is required")
            },
            ActionType::SendTeamChatMessage if blank(&self.config.message) => {
                Some("message is required")
            },
            ActionType::CreateTask if blank(&self.config.task_name) => {
                Some("task name is required")
            },
            ActionType::SendTextMessage if blank(&self.config.text_message) => {
                Some("text message is required")
            },
            ActionType::SendEmail if blank(&self.config.email_content) => {
                Some("email content is required")
            },
            ActionType::UpdateStage if blank(&self.config.new_stage) => {
                Some("new stage is required")
            },
            _ => None,
        }
    }

    /// Render the action's text fields against a substitution context.
    ///
    /// Nothing is executed; unresolved `{{variable}}` tokens stay visible.
    #[must_use]
    pub fn preview(&self, context: &HashMap<String, String>) -> ActionPreview {
        ActionPreview {
            order: self.order,
            action_type: self.action_type,
            label: self.action_type.display_name(),
            delay_minutes: u64::from(self.delay) + self.config.total_delay_minutes(),
            active: self.is_active,
            fields: self
                .config
                .text_fields()
                .into_iter()
                .map(|(name, value)| (name.to_string(), render(value, context)))
                .collect(),
        }
    }
}

/// A rendered, never-executed view of an action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ActionPreview {
    /// Position within the workflow
    pub order: u32,
    /// Action type
    pub action_type: ActionType,
    /// Display label of the type
    pub label: &'static str,
    /// Delay before the step, in minutes
    pub delay_minutes: u64,
    /// Whether the step is enabled
    pub active: bool,
    /// Rendered text fields
    pub fields: Vec<(String, String)>,
}

/// A variable offered to action text fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct AutomationVariable {
    /// Token key, used as `{{key}}`.
    pub key: &'static str,
    /// Display label.
    pub label: &'static str,
    /// Description.
    pub description: &'static str,
}

/// Variables offered to action text fields.
pub const AUTOMATION_VARIABLES: &[AutomationVariable] = &[
    AutomationVariable {
        key: "salesperson",
        label: "Salesperson",
        description: "Deal salesperson name",
    },
    AutomationVariable {
        key: "project_manager",
        label: "Project Manager",
        description: "Assigned project manager",
    },
    AutomationVariable {
        key: "customer_name",
        label: "Customer Name",
        description: "Customer name",
    },
    AutomationVariable {
        key: "job_address",
        label: "Job Address",
        description: "Job address",
    },
    AutomationVariable {
        key: "proposal_id",
        label: "Proposal ID",
        description: "Proposal ID",
    },
    AutomationVariable {
        key: "job_number",
        label: "Job Number",
        description: "Job number",
    },
    AutomationVariable {
        key: "deal_value",
        label: "Deal Value",
        description: "Deal value",
    },
    AutomationVariable {
        key: "company_name",
        label: "Company Name",
        description: "Company name",
    },
];
