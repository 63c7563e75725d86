//! Automation workflows.
//!
//! This module decides whether automation workflows would fire for a record.
//!
//! Features:
//! - Pipeline stage and field catalogs
//! - Workflow definitions with triggers, filters and declarative actions
//! - Eligibility checks with action previews
//! - YAML import/export of workflow sets

pub mod engine;
pub mod pipeline;
pub mod rule;
pub mod storage;

pub use engine::{format_engine_result, AutomationEngine, Eligibility, EngineConfig, EngineResult};
pub use pipeline::{validate_conditions, ConditionIssue, FieldType, FilterField, Pipeline};
pub use rule::{
    ActionConfig, ActionPreview, ActionType, AutomationAction, AutomationTrigger,
    AutomationVariable, AutomationWorkflow, TriggerEvent, TriggerType, WorkflowStatus,
    AUTOMATION_VARIABLES,
};
pub use storage::RuleSet;
