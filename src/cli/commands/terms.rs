//! Terms & Conditions command implementation.

use crate::cli::args::{OutputFormat, TermsCommands};
use crate::error::CrmError;
use crate::features::templates::TemplateLibrary;
use crate::output::{format_template, format_terms};

/// Execute terms subcommands.
///
/// # Errors
///
/// Returns an error if the requested variation does not exist.
pub fn terms(cmd: &TermsCommands, format: OutputFormat) -> Result<String, CrmError> {
    let library = TemplateLibrary::with_defaults();
    let registry = library.terms();

    match cmd {
        TermsCommands::List => format_terms(&registry.list(), format),
        TermsCommands::Show { variation } => {
            let terms = match variation {
                Some(key) => registry.find(key),
                None => registry.get_default(),
            }
            .ok_or_else(|| CrmError::NotFound("Terms & Conditions not found".to_string()))?;

            format_template(&terms.template, format)
        },
    }
}
