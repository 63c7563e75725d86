//! Message templates for fieldcrm.
//!
//! This module holds the template catalog (types, categories, keywords and
//! built-in defaults), the keyword substitution engine, and an in-memory
//! library with Terms & Conditions variations.

pub mod defaults;
pub mod keywords;
pub mod library;
pub mod render;
mod types;

pub use defaults::{default_content, default_subject, default_terms_variations};
pub use keywords::{
    find_keyword, format_keyword, get_keywords_by_category, get_keywords_for_template,
    keyword_picker_groups, search_keywords, unknown_keywords, validate_template_keywords,
    ActionKeyword, KeywordCategory, KeywordGroup, KeywordValidation, TemplateKeyword,
    TEMPLATE_KEYWORDS,
};
pub use library::{TemplateLibrary, TermsEntry, TermsRegistry, TermsUpdate};
pub use render::{
    extract_keywords, preview_document, render, render_actions, render_full, render_preview,
    ActionStyle, ActionUrlResolver, PreviewLinks, RenderOptions, StaticLinks, DEMO_DATA,
};
pub use types::{
    Channel, Template, TemplateCategory, TemplateType, TemplateUpdate, TermsAndConditions,
};
