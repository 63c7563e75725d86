//! Pipelines, their stages, and the fields filters may reference.
//!
//! Field/operator compatibility is advisory: [`validate_conditions`] reports
//! issues for an authoring surface, while the evaluator accepts anything.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::core::{FilterCondition, FilterOperator};
use crate::error::CrmError;

/// A business-process pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Pipeline {
    /// Incoming leads.
    Leads,
    /// Qualified opportunities.
    Opportunities,
    /// Proposals sent to customers.
    Proposals,
    /// Scheduled and running jobs.
    Jobs,
    /// Invoices.
    Invoices,
    /// Appointments.
    Appointments,
}

/// Field data type, which decides the operators offered for it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldType {
    /// Free text.
    Text,
    /// Numeric value.
    Number,
    /// Calendar date.
    Date,
    /// Set of labels.
    Labels,
}

/// A filterable field of a pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FilterField {
    /// Record key.
    pub key: &'static str,
    /// Display label.
    pub label: &'static str,
    /// Data type.
    #[serde(rename = "type")]
    pub field_type: FieldType,
}

const fn field(key: &'static str, label: &'static str, field_type: FieldType) -> FilterField {
    FilterField {
        key,
        label,
        field_type,
    }
}

const LEAD_FIELDS: &[FilterField] = &[
    field("name", "Lead Name", FieldType::Text),
    field("company", "Company", FieldType::Text),
    field("email", "Email", FieldType::Text),
    field("phone", "Phone", FieldType::Text),
    field("source", "Source", FieldType::Text),
    field("value", "Deal Value", FieldType::Number),
    field("labels", "Labels", FieldType::Labels),
];

const OPPORTUNITY_FIELDS: &[FilterField] = &[
    field("name", "Opportunity Name", FieldType::Text),
    field("company", "Company", FieldType::Text),
    field("value", "Deal Value", FieldType::Number),
    field("probability", "Probability", FieldType::Number),
    field("close_date", "Close Date", FieldType::Date),
    field("labels", "Labels", FieldType::Labels),
];

const PROPOSAL_FIELDS: &[FilterField] = &[
    field("title", "Proposal Title", FieldType::Text),
    field("customer_name", "Customer Name", FieldType::Text),
    field("value", "Proposal Value", FieldType::Number),
    field("job_type", "Job Type", FieldType::Text),
    field("job_address", "Job Address", FieldType::Text),
    field("labels", "Labels", FieldType::Labels),
];

const JOB_FIELDS: &[FilterField] = &[
    field("job_number", "Job Number", FieldType::Text),
    field("customer_name", "Customer Name", FieldType::Text),
    field("job_address", "Job Address", FieldType::Text),
    field("job_type", "Job Type", FieldType::Text),
    field("value", "Job Value", FieldType::Number),
    field("labels", "Labels", FieldType::Labels),
];

const INVOICE_FIELDS: &[FilterField] = &[
    field("invoice_number", "Invoice Number", FieldType::Text),
    field("customer_name", "Customer Name", FieldType::Text),
    field("amount", "Amount", FieldType::Number),
    field("due_date", "Due Date", FieldType::Date),
    field("payment_terms", "Payment Terms", FieldType::Text),
    field("labels", "Labels", FieldType::Labels),
];

const APPOINTMENT_FIELDS: &[FilterField] = &[
    field("title", "Appointment Title", FieldType::Text),
    field("customer_name", "Customer Name", FieldType::Text),
    field("appointment_type", "Appointment Type", FieldType::Text),
    field("location", "Location", FieldType::Text),
    field("duration", "Duration (minutes)", FieldType::Number),
    field("labels", "Labels", FieldType::Labels),
];

impl Pipeline {
    /// Every pipeline, in display order.
    pub const ALL: [Self; 6] = [
        Self::Leads,
        Self::Opportunities,
        Self::Proposals,
        Self::Jobs,
        Self::Invoices,
        Self::Appointments,
    ];

    /// The wire name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Leads => "leads",
            Self::Opportunities => "opportunities",
            Self::Proposals => "proposals",
            Self::Jobs => "jobs",
            Self::Invoices => "invoices",
            Self::Appointments => "appointments",
        }
    }

    /// Display title.
    #[must_use]
    pub const fn title(self) -> &'static str {
        match self {
            Self::Leads => "Lead Pipeline",
            Self::Opportunities => "Opportunities",
            Self::Proposals => "Proposals",
            Self::Jobs => "Jobs",
            Self::Invoices => "Invoices",
            Self::Appointments => "Appointments",
        }
    }

    /// Stages as `(key, label)` pairs, in pipeline order.
    #[must_use]
    pub const fn stages(self) -> &'static [(&'static str, &'static str)] {
        match self {
            Self::Leads => &[
                ("new_leads", "New Leads"),
                ("cold_leads", "Cold Leads"),
                ("on_hold", "On Hold"),
                ("warm_leads", "Warm Leads"),
                ("not_a_fit", "Not a Fit"),
                ("qualified", "Qualified"),
            ],
            Self::Opportunities => &[
                ("estimate_requested", "Estimate Requested"),
                ("virtual_estimate", "Virtual Estimate"),
                ("estimate_scheduled", "Estimate Scheduled"),
                ("estimate_cancelled", "Estimate Cancelled"),
                ("not_a_fit", "Not a Fit"),
                ("qualified", "Qualified"),
            ],
            Self::Proposals => &[
                ("in_draft", "In Draft"),
                ("proposal_sent", "Proposal Sent"),
                ("on_hold", "On Hold"),
                ("proposal_rejected", "Proposal Rejected"),
                ("proposal_approved", "Proposal Approved"),
            ],
            Self::Jobs => &[
                ("pending_schedule", "Pending Schedule"),
                ("in_progress", "In Progress"),
                ("project_scheduled", "Project Scheduled"),
                ("project_complete", "Project Complete"),
            ],
            Self::Invoices => &[
                ("draft", "Draft"),
                ("sent", "Sent"),
                ("viewed", "Viewed"),
                ("paid", "Paid"),
                ("overdue", "Overdue"),
                ("cancelled", "Cancelled"),
            ],
            Self::Appointments => &[
                ("scheduled", "Scheduled"),
                ("confirmed", "Confirmed"),
                ("in_progress", "In Progress"),
                ("completed", "Completed"),
                ("cancelled", "Cancelled"),
                ("no_show", "No Show"),
            ],
        }
    }

    /// Look up the display label of a stage.
    #[must_use]
    pub fn stage_label(self, stage: &str) -> Option<&'static str> {
        self.stages()
            .iter()
            .find(|(key, _)| *key == stage)
            .map(|(_, label)| *label)
    }

    /// Filterable fields of this pipeline.
    #[must_use]
    pub const fn fields(self) -> &'static [FilterField] {
        match self {
            Self::Leads => LEAD_FIELDS,
            Self::Opportunities => OPPORTUNITY_FIELDS,
            Self::Proposals => PROPOSAL_FIELDS,
            Self::Jobs => JOB_FIELDS,
            Self::Invoices => INVOICE_FIELDS,
            Self::Appointments => APPOINTMENT_FIELDS,
        }
    }

    /// Find a field by key.
    #[must_use]
    pub fn field(self, key: &str) -> Option<&'static FilterField> {
        self.fields().iter().find(|f| f.key == key)
    }

    /// The type of a field; unknown keys are treated as text.
    #[must_use]
    pub fn field_type(self, key: &str) -> FieldType {
        self.field(key).map_or(FieldType::Text, |f| f.field_type)
    }
}

impl fmt::Display for Pipeline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Pipeline {
    type Err = CrmError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.trim().to_lowercase();
        Self::ALL
            .into_iter()
            .find(|p| p.as_str() == lower)
            .ok_or_else(|| CrmError::InvalidArgument(format!("Unknown pipeline: {s}")))
    }
}

impl FieldType {
    /// Operators offered for this field type.
    #[must_use]
    pub const fn operators(self) -> &'static [FilterOperator] {
        match self {
            Self::Text => &[
                FilterOperator::Contains,
                FilterOperator::DoesNotContain,
                FilterOperator::Equals,
                FilterOperator::DoesNotEqual,
                FilterOperator::IsEmpty,
                FilterOperator::IsNotEmpty,
            ],
            Self::Number => &[
                FilterOperator::Equals,
                FilterOperator::DoesNotEqual,
                FilterOperator::GreaterThan,
                FilterOperator::LessThan,
                FilterOperator::GreaterThanOrEqual,
                FilterOperator::LessThanOrEqual,
            ],
            Self::Labels => &[FilterOperator::HasLabel, FilterOperator::DoesNotHaveLabel],
            Self::Date => &[FilterOperator::Contains, FilterOperator::Equals],
        }
    }

    /// Whether an operator is offered for this type.
    #[must_use]
    pub fn allows(self, op: FilterOperator) -> bool {
        self.operators().contains(&op)
    }

    /// The wire name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Number => "number",
            Self::Date => "date",
            Self::Labels => "labels",
        }
    }
}

/// An advisory problem with one condition of a filter list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConditionIssue {
    /// Position in the list.
    pub index: usize,
    /// Condition id.
    pub condition_id: String,
    /// What is wrong.
    pub message: String,
}

/// Check a condition list against a pipeline's field catalog.
///
/// The result never affects evaluation; it mirrors what an authoring form
/// would refuse to offer.
#[must_use]
pub fn validate_conditions(pipeline: Pipeline, conditions: &[FilterCondition]) -> Vec<ConditionIssue> {
    let mut issues = Vec::new();

    for (index, condition) in conditions.iter().enumerate() {
        let mut report = |message: String| {
            issues.push(ConditionIssue {
                index,
                condition_id: condition.id.clone(),
                message,
            });
        };

        let field_type = match pipeline.field(&condition.field) {
            Some(f) => f.field_type,
            None => {
                report(format!(
                    "Unknown field '{}' for pipeline {pipeline}",
                    condition.field
                ));
                FieldType::Text
            },
        };

        if !field_type.allows(condition.operator) {
            report(format!(
                "Operator '{}' is not offered for {} field '{}'",
                condition.operator,
                field_type.as_str(),
                condition.field
            ));
        }

        let has_value = condition
            .value
            .as_ref()
            .is_some_and(|v| !v.to_text().trim().is_empty());

        if condition.operator.requires_value() && !has_value {
            report(format!("Operator '{}' requires a value", condition.operator));
        }
        if !condition.operator.requires_value() && condition.value.is_some() {
            report(format!("Operator '{}' takes no value", condition.operator));
        }
        if index == 0 && condition.logical_operator.is_some() {
            report("The first condition's joiner is ignored".to_string());
        }
    }

    issues
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::LogicalOperator;

    #[test]
    fn test_pipeline_from_str() {
        assert_eq!("jobs".parse::<Pipeline>().unwrap(), Pipeline::Jobs);
        assert_eq!("Invoices".parse::<Pipeline>().unwrap(), Pipeline::Invoices);
        assert!("widgets".parse::<Pipeline>().is_err());
    }

    #[test]
    fn test_stage_labels() {
        assert_eq!(Pipeline::Leads.stage_label("not_a_fit"), Some("Not a Fit"));
        assert_eq!(Pipeline::Jobs.stages().len(), 4);
        assert_eq!(Pipeline::Jobs.stage_label("nope"), None);
    }

    #[test]
    fn test_field_types() {
        assert_eq!(Pipeline::Invoices.field_type("amount"), FieldType::Number);
        assert_eq!(Pipeline::Invoices.field_type("due_date"), FieldType::Date);
        assert_eq!(Pipeline::Jobs.field_type("labels"), FieldType::Labels);
        assert_eq!(Pipeline::Jobs.field_type("unknown"), FieldType::Text);
    }

    #[test]
    fn test_operators_by_type() {
        assert_eq!(FieldType::Text.operators().len(), 6);
        assert!(FieldType::Number.allows(FilterOperator::GreaterThan));
        assert!(!FieldType::Text.allows(FilterOperator::GreaterThan));
        assert_eq!(
            FieldType::Labels.operators(),
            &[FilterOperator::HasLabel, FilterOperator::DoesNotHaveLabel]
        );
        assert_eq!(
            FieldType::Date.operators(),
            &[FilterOperator::Contains, FilterOperator::Equals]
        );
    }

    #[test]
    fn test_validate_clean_conditions() {
        let conditions = vec![
            FilterCondition::new("customer_name", FilterOperator::Contains, "Doe"),
            FilterCondition::new("value", FilterOperator::GreaterThan, 1000_i64)
                .joined(LogicalOperator::And),
            FilterCondition::without_value("job_type", FilterOperator::IsNotEmpty)
                .joined(LogicalOperator::Or),
        ];
        assert!(validate_conditions(Pipeline::Jobs, &conditions).is_empty());
    }

    #[test]
    fn test_validate_reports_issues() {
        let conditions = vec![
            FilterCondition::new("color", FilterOperator::Equals, "red")
                .with_id("a")
                .joined(LogicalOperator::Or),
            FilterCondition::new("value", FilterOperator::HasLabel, "").with_id("b"),
        ];
        let issues = validate_conditions(Pipeline::Proposals, &conditions);

        assert!(issues
            .iter()
            .any(|i| i.index == 0 && i.message.contains("Unknown field")));
        assert!(issues
            .iter()
            .any(|i| i.index == 0 && i.message.contains("joiner")));
        assert!(issues
            .iter()
            .any(|i| i.condition_id == "b" && i.message.contains("not offered")));
        assert!(issues
            .iter()
            .any(|i| i.condition_id == "b" && i.message.contains("requires a value")));
    }
}
