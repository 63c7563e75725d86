use std::path::PathBuf;

use clap::{ArgAction, Args, Parser, Subcommand, ValueEnum};
use clap_complete::Shell;
use serde::{Deserialize, Serialize};

use crate::features::automation::{Pipeline, TriggerType};
use crate::features::templates::{Channel, TemplateCategory, TemplateType};

#[derive(Parser)]
#[command(name = "fieldcrm")]
#[command(about = "Dry-run CRM automation filters and preview message templates")]
#[command(long_about = "fieldcrm - automation filters and message templates for a field-service CRM

Evaluate automation filter conditions against record snapshots, check which
workflows would fire for an event, and preview email/SMS templates with
keyword substitution. Nothing is sent and nothing is executed.

QUICK START:
  fieldcrm filter job.json --where \"status = open AND amount > 500\"
  fieldcrm automation check rules.yaml invoice.json --trigger invoice_status --status overdue
  fieldcrm template show invoice_sms
  fieldcrm template render body.html --demo

OUTPUT FORMATS:
  --output pretty    Human-readable colored output (default)
  --output json      Machine-readable JSON for scripting

For more information on a specific command, run:
  fieldcrm <command> --help")]
#[command(version, propagate_version = true)]
pub struct Cli {
    /// Output format for command results
    ///
    /// Use 'pretty' for human-readable colored output, or 'json' for
    /// machine-readable output. Defaults to `general.default_output` from
    /// the config file.
    #[arg(short, long, value_enum, global = true)]
    pub output: Option<OutputFormat>,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

/// Output format for command results.
#[derive(ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Human-readable colored output.
    #[default]
    Pretty,
    /// Machine-readable JSON output.
    Json,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Evaluate a filter query against a record
    ///
    /// The record is a JSON object of field values. Conditions are joined
    /// left to right with AND/OR; there is no grouping.
    ///
    /// # Query syntax
    ///
    ///   field operator [value] (AND|OR field operator [value])*
    ///
    ///   Operators: contains, does_not_contain, equals (=), does_not_equal (!=),
    ///   is_empty, is_not_empty, greater_than (>), less_than (<),
    ///   greater_than_or_equal (>=), less_than_or_equal (<=),
    ///   has_label, does_not_have_label
    ///
    /// # Examples
    ///
    ///   fieldcrm filter job.json --where "priority = high AND status = open"
    ///   fieldcrm filter contact.json --where "tags has_label vip"
    ///   fieldcrm filter job.json --where "amount >= 1000" --pipeline jobs
    Filter(FilterArgs),

    /// Automation workflows
    ///
    /// # Subcommands
    ///
    ///   fields      List filterable fields and operators per pipeline
    ///   check       Report which workflows would fire for an event
    ///   validate    Check workflow definitions for problems
    ///   variables   List variables usable in action text
    ///
    /// # Examples
    ///
    ///   fieldcrm auto fields jobs
    ///   fieldcrm auto check rules.yaml invoice.json --trigger invoice_status --status overdue
    ///   fieldcrm auto validate rules.yaml
    #[command(alias = "auto")]
    Automation(AutomationArgs),

    /// Message templates
    ///
    /// # Subcommands
    ///
    ///   list       List built-in templates
    ///   show       Show a template's subject, body and keywords
    ///   keywords   Browse the keyword catalog
    ///   extract    List keywords used in a file
    ///   validate   Check a file's keywords against a template type
    ///   render     Substitute keywords and action links
    ///
    /// # Examples
    ///
    ///   fieldcrm template list --category invoices
    ///   fieldcrm template keywords invoice_email --search total
    ///   fieldcrm template render body.html --var contact.firstName=Ana --demo
    Template(TemplateArgs),

    /// Terms & Conditions variations
    Terms(TermsArgs),

    /// Generate shell completions
    ///
    /// Outputs completion script for the specified shell.
    ///
    /// Example: fieldcrm completions zsh > ~/.zfunc/_fieldcrm
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,

        /// Show installation instructions
        #[arg(long, short = 'i')]
        install: bool,
    },
}

/// Arguments for the filter command.
#[derive(Args)]
pub struct FilterArgs {
    /// JSON file holding the record (use - for stdin)
    pub record: PathBuf,

    /// Filter query
    #[arg(long = "where", short = 'w')]
    pub query: String,

    /// Also check the conditions against this pipeline's field catalog
    #[arg(long, short = 'p')]
    pub pipeline: Option<Pipeline>,
}

/// Arguments for automation.
#[derive(Args)]
pub struct AutomationArgs {
    #[command(subcommand)]
    pub command: AutomationCommands,
}

/// Automation subcommands.
#[derive(Subcommand)]
pub enum AutomationCommands {
    /// List filterable fields and the operators they offer
    Fields {
        /// Pipeline (leads, opportunities, proposals, jobs, invoices, appointments)
        pipeline: Option<Pipeline>,
    },

    /// Report which workflows would fire for an event and record
    ///
    /// Eligible workflows have their actions previewed with the record's
    /// values substituted. Nothing is executed.
    Check(CheckArgs),

    /// Validate workflow definitions
    ///
    /// Reports malformed entries, unknown fields, operators a field does not
    /// offer, and missing or unexpected values.
    Validate {
        /// YAML rules file
        rules: PathBuf,
    },

    /// List variables usable in action text
    Variables,
}

/// Arguments for `automation check`.
#[derive(Args)]
pub struct CheckArgs {
    /// YAML rules file
    pub rules: PathBuf,

    /// JSON record snapshot (use - for stdin)
    pub record: PathBuf,

    /// Trigger type of the event
    #[arg(long, short = 't')]
    pub trigger: TriggerType,

    /// Pipeline the event happened in
    #[arg(long, short = 'p')]
    pub pipeline: Option<Pipeline>,

    /// Status the record moved to
    #[arg(long, short = 's')]
    pub status: Option<String>,

    /// Stage the record is in
    #[arg(long)]
    pub stage: Option<String>,

    /// Stage the record left
    #[arg(long)]
    pub from_stage: Option<String>,

    /// Stage the record entered
    #[arg(long)]
    pub to_stage: Option<String>,

    /// Pipeline the record left
    #[arg(long)]
    pub from_pipeline: Option<Pipeline>,

    /// Pipeline the record entered
    #[arg(long)]
    pub to_pipeline: Option<Pipeline>,

    /// Labels on the record (repeatable)
    #[arg(long = "label", short = 'l')]
    pub labels: Vec<String>,
}

/// Arguments for message templates.
#[derive(Args)]
pub struct TemplateArgs {
    #[command(subcommand)]
    pub command: TemplateCommands,
}

/// Template subcommands.
#[derive(Subcommand)]
pub enum TemplateCommands {
    /// List built-in templates
    List {
        /// Only templates in this category
        #[arg(long, short = 'c')]
        category: Option<TemplateCategory>,

        /// Case-insensitive search over name, type and content
        #[arg(long, short = 's')]
        search: Option<String>,
    },

    /// Show a built-in template
    ///
    /// Example: fieldcrm template show invoice_email --preview
    Show {
        /// Template type, e.g. invoice_email
        template_type: TemplateType,

        /// Render the body with demo values
        #[arg(long)]
        preview: bool,
    },

    /// Browse the keyword catalog
    Keywords {
        /// Only keywords offered for this template type
        template_type: Option<TemplateType>,

        /// Case-insensitive search over label, key and description
        #[arg(long, short = 's')]
        search: Option<String>,
    },

    /// List keywords used in a file
    Extract {
        /// Template body file (use - for stdin)
        file: PathBuf,
    },

    /// Check a file's keywords against a template type
    Validate {
        /// Template body file (use - for stdin)
        file: PathBuf,

        /// Template type the body is written for
        #[arg(long = "type", short = 't')]
        template_type: TemplateType,

        /// Keyword that must appear (repeatable)
        #[arg(long = "require", short = 'r')]
        required: Vec<String>,
    },

    /// Substitute keywords and action links
    ///
    /// Values come from --context (a JSON object), then --var; --demo fills
    /// the rest with sample values. Action links resolve from --link, or to
    /// the configured placeholder with --preview.
    ///
    /// Example: fieldcrm template render --type invoice_sms --demo --preview
    Render(RenderArgs),
}

/// Arguments for `template render`.
#[derive(Args)]
pub struct RenderArgs {
    /// Template body file (use - for stdin)
    #[arg(required_unless_present = "template_type")]
    pub file: Option<PathBuf>,

    /// Render the built-in body of this type instead of a file
    #[arg(long = "type", short = 't', conflicts_with = "file")]
    pub template_type: Option<TemplateType>,

    /// Value for a keyword, key=value (repeatable)
    #[arg(long = "var")]
    pub vars: Vec<String>,

    /// JSON object of keyword values
    #[arg(long, short = 'c')]
    pub context: Option<PathBuf>,

    /// Fill unresolved data keywords with sample values
    #[arg(long)]
    pub demo: bool,

    /// Resolve every action link to the preview placeholder
    #[arg(long)]
    pub preview: bool,

    /// URL for an action keyword, action=url (repeatable)
    #[arg(long = "link")]
    pub links: Vec<String>,

    /// Delivery channel; defaults to the template type's channel, or email
    #[arg(long)]
    pub channel: Option<Channel>,

    /// Wrap HTML output in a standalone page
    #[arg(long)]
    pub document: bool,
}

/// Arguments for Terms & Conditions.
#[derive(Args)]
pub struct TermsArgs {
    #[command(subcommand)]
    pub command: TermsCommands,
}

/// Terms subcommands.
#[derive(Subcommand)]
pub enum TermsCommands {
    /// List variations, default first
    List,

    /// Show a variation (the default when omitted)
    Show {
        /// Variation name or ID
        variation: Option<String>,
    },
}

/// Split a `key=value` argument.
///
/// # Errors
///
/// Returns an error if there is no `=` or the key is empty.
pub fn parse_key_value(arg: &str) -> Result<(String, String), crate::error::CrmError> {
    match arg.split_once('=') {
        Some((key, value)) if !key.trim().is_empty() => {
            Ok((key.trim().to_string(), value.to_string()))
        },
        _ => Err(crate::error::CrmError::InvalidArgument(format!(
            "Expected key=value, got '{arg}'"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_output_format_unset() {
        let cli = Cli::try_parse_from(["fieldcrm", "terms", "list"]).unwrap();
        assert!(cli.output.is_none());
        assert_eq!(cli.verbose, 0);
    }

    #[test]
    fn test_cli_output_format_short() {
        let cli = Cli::try_parse_from(["fieldcrm", "-o", "json", "terms", "list"]).unwrap();
        assert_eq!(cli.output, Some(OutputFormat::Json));
    }

    #[test]
    fn test_cli_verbose_counts() {
        let cli = Cli::try_parse_from(["fieldcrm", "terms", "list", "-vv"]).unwrap();
        assert_eq!(cli.verbose, 2);
    }

    #[test]
    fn test_filter_command() {
        let cli = Cli::try_parse_from([
            "fieldcrm",
            "filter",
            "job.json",
            "--where",
            "status = open",
            "-p",
            "jobs",
        ])
        .unwrap();

        if let Commands::Filter(args) = cli.command {
            assert_eq!(args.record, PathBuf::from("job.json"));
            assert_eq!(args.query, "status = open");
            assert_eq!(args.pipeline, Some(Pipeline::Jobs));
        } else {
            panic!("Expected Filter command");
        }
    }

    #[test]
    fn test_filter_requires_where() {
        assert!(Cli::try_parse_from(["fieldcrm", "filter", "job.json"]).is_err());
    }

    #[test]
    fn test_automation_check_command() {
        let cli = Cli::try_parse_from([
            "fieldcrm",
            "auto",
            "check",
            "rules.yaml",
            "invoice.json",
            "--trigger",
            "invoice-status",
            "--status",
            "overdue",
            "-l",
            "VIP",
            "-l",
            "Repeat",
        ])
        .unwrap();

        if let Commands::Automation(AutomationArgs {
            command: AutomationCommands::Check(args),
        }) = cli.command
        {
            assert_eq!(args.trigger, TriggerType::InvoiceStatus);
            assert_eq!(args.status.as_deref(), Some("overdue"));
            assert_eq!(args.labels, vec!["VIP", "Repeat"]);
        } else {
            panic!("Expected automation check command");
        }
    }

    #[test]
    fn test_bad_trigger_is_rejected() {
        assert!(Cli::try_parse_from([
            "fieldcrm", "auto", "check", "r.yaml", "j.json", "--trigger", "weekly"
        ])
        .is_err());
    }

    #[test]
    fn test_template_render_file_or_type() {
        assert!(Cli::try_parse_from(["fieldcrm", "template", "render"]).is_err());
        assert!(Cli::try_parse_from([
            "fieldcrm", "template", "render", "body.html", "--type", "invoice_sms"
        ])
        .is_err());

        let cli = Cli::try_parse_from([
            "fieldcrm",
            "template",
            "render",
            "--type",
            "invoice_sms",
            "--var",
            "contact.firstName=Ana",
            "--link",
            "pay-invoice=https://pay.test",
        ])
        .unwrap();

        if let Commands::Template(TemplateArgs {
            command: TemplateCommands::Render(args),
        }) = cli.command
        {
            assert_eq!(args.template_type, Some(TemplateType::InvoiceSms));
            assert!(args.file.is_none());
            assert_eq!(args.vars, vec!["contact.firstName=Ana"]);
        } else {
            panic!("Expected template render command");
        }
    }

    #[test]
    fn test_template_validate_command() {
        let cli = Cli::try_parse_from([
            "fieldcrm",
            "template",
            "validate",
            "body.txt",
            "-t",
            "proposal-sms",
            "-r",
            "view-proposal",
        ])
        .unwrap();

        if let Commands::Template(TemplateArgs {
            command:
                TemplateCommands::Validate {
                    template_type,
                    required,
                    ..
                },
        }) = cli.command
        {
            assert_eq!(template_type, TemplateType::ProposalSms);
            assert_eq!(required, vec!["view-proposal"]);
        } else {
            panic!("Expected template validate command");
        }
    }

    #[test]
    fn test_completions_command() {
        let cli = Cli::try_parse_from(["fieldcrm", "completions", "bash"]).unwrap();
        assert!(matches!(
            cli.command,
            Commands::Completions {
                shell: Shell::Bash,
                install: false
            }
        ));
    }

    #[test]
    fn test_parse_key_value() {
        assert_eq!(
            parse_key_value("invoice.total=$1,250.00").unwrap(),
            ("invoice.total".to_string(), "$1,250.00".to_string())
        );
        assert_eq!(
            parse_key_value("a=b=c").unwrap(),
            ("a".to_string(), "b=c".to_string())
        );
        assert!(parse_key_value("novalue").is_err());
        assert!(parse_key_value("=x").is_err());
    }

    #[test]
    fn test_output_format_default() {
        assert!(matches!(OutputFormat::default(), OutputFormat::Pretty));
    }
}
