//! YAML import and export of workflow definitions.
//!
//! Rule documents are supplied by the caller; nothing is persisted here.
//! A document is either a mapping with a `workflows` list or a bare list.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::warn;

use super::rule::AutomationWorkflow;
use crate::error::CrmError;

/// Workflow set for serialization.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RuleSet {
    /// Workflows in this set
    pub workflows: Vec<AutomationWorkflow>,
}

impl RuleSet {
    /// Create an empty rule set.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            workflows: Vec::new(),
        }
    }

    /// Add a workflow.
    pub fn add(&mut self, workflow: AutomationWorkflow) {
        self.workflows.push(workflow);
    }

    /// Find a workflow by ID or name.
    #[must_use]
    pub fn find(&self, key: &str) -> Option<&AutomationWorkflow> {
        self.workflows
            .iter()
            .find(|w| w.id == key || w.name.eq_ignore_ascii_case(key))
    }

    /// Export to YAML.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_yaml(&self) -> Result<String, CrmError> {
        serde_yaml::to_string(self)
            .map_err(|e| CrmError::Config(format!("Failed to serialize workflows: {e}")))
    }

    /// Import from YAML, failing on the first malformed workflow.
    ///
    /// # Errors
    ///
    /// Returns an error if the document or any workflow fails to parse.
    pub fn from_yaml(yaml: &str) -> Result<Self, CrmError> {
        let workflows = Self::entries(yaml)?
            .into_iter()
            .map(serde_yaml::from_value)
            .collect::<Result<Vec<AutomationWorkflow>, _>>()
            .map_err(|e| CrmError::Config(format!("Failed to parse workflow: {e}")))?;

        Ok(Self { workflows })
    }

    /// Import from YAML, skipping workflows that fail to parse.
    ///
    /// Returns the set and one message per skipped entry.
    ///
    /// # Errors
    ///
    /// Returns an error if the document itself is not valid YAML of the
    /// expected shape.
    pub fn from_yaml_lenient(yaml: &str) -> Result<(Self, Vec<String>), CrmError> {
        let mut set = Self::new();
        let mut skipped = Vec::new();

        for (i, entry) in Self::entries(yaml)?.into_iter().enumerate() {
            match serde_yaml::from_value::<AutomationWorkflow>(entry) {
                Ok(workflow) => set.add(workflow),
                Err(e) => {
                    // Keep going; one bad entry should not hide the rest
                    warn!(index = i, error = %e, "skipping malformed workflow");
                    skipped.push(format!("workflow #{}: {e}", i + 1));
                },
            }
        }

        Ok((set, skipped))
    }

    /// Read a rule document from disk (lenient).
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or is not a rule document.
    pub fn load(path: &Path) -> Result<(Self, Vec<String>), CrmError> {
        let yaml = fs::read_to_string(path).map_err(|e| {
            CrmError::Config(format!("Failed to read rules file {}: {e}", path.display()))
        })?;
        Self::from_yaml_lenient(&yaml)
    }

    /// Split a document into raw workflow entries.
    fn entries(yaml: &str) -> Result<Vec<serde_yaml::Value>, CrmError> {
        let doc: serde_yaml::Value = serde_yaml::from_str(yaml)
            .map_err(|e| CrmError::Config(format!("Failed to parse rules: {e}")))?;

        match doc {
            serde_yaml::Value::Null => Ok(Vec::new()),
            serde_yaml::Value::Sequence(items) => Ok(items),
            serde_yaml::Value::Mapping(mut map) => {
                match map.remove("workflows") {
                    Some(serde_yaml::Value::Sequence(items)) => Ok(items),
                    Some(serde_yaml::Value::Null) | None => Ok(Vec::new()),
                    Some(_) => Err(CrmError::Config(
                        "'workflows' must be a list".to_string(),
                    )),
                }
            },
            _ => Err(CrmError::Config(
                "Rules document must be a list or a mapping with 'workflows'".to_string(),
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::automation::rule::{AutomationTrigger, TriggerType};
    use tempfile::TempDir;

    const RULES: &str = r"
workflows:
  - id: wf-1
    name: Kickoff
    status: active
    trigger:
      type: stage_change
      pipeline: jobs
      toStage: in_progress
  - name: Broken
    trigger:
      type: not_a_trigger
  - name: Paid
    trigger:
      type: invoice_status
      status: paid
";

    #[test]
    fn test_rule_set_round_trip() {
        let mut set = RuleSet::new();
        set.add(AutomationWorkflow::new(
            "Rule 1",
            AutomationTrigger::new(TriggerType::JobStatus),
        ));
        set.add(AutomationWorkflow::new(
            "Rule 2",
            AutomationTrigger::new(TriggerType::ProposalStatus),
        ));

        let yaml = set.to_yaml().unwrap();
        assert!(yaml.contains("Rule 1"));
        assert!(yaml.contains("proposal_status"));

        let parsed = RuleSet::from_yaml(&yaml).unwrap();
        assert_eq!(parsed.workflows.len(), 2);
    }

    #[test]
    fn test_strict_import_rejects_bad_entry() {
        assert!(RuleSet::from_yaml(RULES).is_err());
    }

    #[test]
    fn test_lenient_import_skips_bad_entry() {
        let (set, skipped) = RuleSet::from_yaml_lenient(RULES).unwrap();
        assert_eq!(set.workflows.len(), 2);
        assert_eq!(skipped.len(), 1);
        assert!(skipped[0].starts_with("workflow #2"));
        assert_eq!(set.find("wf-1").map(|w| w.name.as_str()), Some("Kickoff"));
        assert!(set.find("paid").is_some());
    }

    #[test]
    fn test_bare_list_and_empty_documents() {
        let (set, _) = RuleSet::from_yaml_lenient(
            "- name: Only\n  trigger:\n    type: job_status\n",
        )
        .unwrap();
        assert_eq!(set.workflows.len(), 1);

        assert!(RuleSet::from_yaml("").unwrap().workflows.is_empty());
        assert!(RuleSet::from_yaml("workflows: 3").is_err());
        assert!(RuleSet::from_yaml("just a string").is_err());
    }

    #[test]
    fn test_load_from_file() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("rules.yaml");
        fs::write(&path, RULES).unwrap();

        let (set, skipped) = RuleSet::load(&path).unwrap();
        assert_eq!(set.workflows.len(), 2);
        assert_eq!(skipped.len(), 1);

        assert!(RuleSet::load(&temp.path().join("missing.yaml")).is_err());
    }
}
