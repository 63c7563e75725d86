//! In-memory template library and Terms & Conditions registry.
//!
//! The library is seeded from the built-in defaults and lives only as long as
//! the caller keeps it; nothing is written to disk.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};

use chrono::Utc;
use serde::Serialize;

use super::defaults::{default_content, default_subject, default_terms_variations};
use super::keywords::keyword_keys;
use super::render::render;
use super::types::{Template, TemplateCategory, TemplateType, TemplateUpdate, TermsAndConditions};
use crate::error::CrmError;

static NEXT_ID: AtomicU64 = AtomicU64::new(0);

fn generate_id() -> String {
    format!(
        "template_{}_{}",
        Utc::now().timestamp_millis(),
        NEXT_ID.fetch_add(1, Ordering::Relaxed)
    )
}

fn new_template(template_type: TemplateType, name: String, content: String, is_active: bool) -> Template {
    let now = Utc::now();
    Template {
        id: generate_id(),
        name,
        template_type,
        category: template_type.category(),
        content,
        subject: default_subject(template_type).map(str::to_string),
        available_keywords: keyword_keys(template_type)
            .iter()
            .map(|k| (*k).to_string())
            .collect(),
        is_active,
        created_at: now,
        updated_at: now,
    }
}

/// Templates keyed by ID, plus the Terms & Conditions variations.
#[derive(Debug, Clone, Default)]
pub struct TemplateLibrary {
    templates: Vec<Template>,
    terms: TermsRegistry,
}

impl TemplateLibrary {
    /// Create an empty library.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a library holding one default template per type, with the
    /// built-in Terms variations in the registry.
    #[must_use]
    pub fn with_defaults() -> Self {
        let mut library = Self::new();

        for template_type in TemplateType::ALL {
            if template_type == TemplateType::TermsAndConditions {
                continue;
            }
            library.create(template_type, default_content(template_type));
        }
        for (name, content) in default_terms_variations() {
            library.terms.create(name, content, true);
        }

        library
    }

    /// Add a template of the given type, named after the type.
    pub fn create(&mut self, template_type: TemplateType, content: impl Into<String>) -> &Template {
        let index = self.templates.len();
        self.templates.push(new_template(
            template_type,
            template_type.label().to_string(),
            content.into(),
            true,
        ));
        &self.templates[index]
    }

    #[must_use]
    pub fn get(&self, id: &str) -> Option<&Template> {
        self.templates.iter().find(|t| t.id == id)
    }

    /// First template of the given type.
    #[must_use]
    pub fn get_by_type(&self, template_type: TemplateType) -> Option<&Template> {
        self.templates.iter().find(|t| t.template_type == template_type)
    }

    /// All templates sorted by name.
    #[must_use]
    pub fn list(&self) -> Vec<&Template> {
        let mut list: Vec<_> = self.templates.iter().collect();
        list.sort_by_cached_key(|t| t.name.to_lowercase());
        list
    }

    /// Templates in one category, sorted by name.
    #[must_use]
    pub fn list_by_category(&self, category: TemplateCategory) -> Vec<&Template> {
        self.list()
            .into_iter()
            .filter(|t| t.category == category)
            .collect()
    }

    /// Apply a partial update. ID and type never change.
    ///
    /// # Errors
    ///
    /// Returns an error if no template has this ID.
    pub fn update(&mut self, id: &str, update: TemplateUpdate) -> Result<&Template, CrmError> {
        let template = self.get_mut(id)?;
        update.apply_to(template);
        Ok(template)
    }

    /// Remove a template.
    ///
    /// # Errors
    ///
    /// Returns an error if no template has this ID.
    pub fn delete(&mut self, id: &str) -> Result<Template, CrmError> {
        let index = self
            .templates
            .iter()
            .position(|t| t.id == id)
            .ok_or_else(|| CrmError::NotFound(format!("Template '{id}'")))?;
        Ok(self.templates.remove(index))
    }

    /// Restore the built-in content and subject for a template.
    ///
    /// # Errors
    ///
    /// Returns an error if no template has this ID.
    pub fn reset_to_default(&mut self, id: &str) -> Result<&Template, CrmError> {
        let template = self.get_mut(id)?;
        template.content = default_content(template.template_type);
        template.subject = default_subject(template.template_type).map(str::to_string);
        template.updated_at = Utc::now();
        Ok(template)
    }

    /// Case-insensitive search over name, type and content, sorted by name.
    #[must_use]
    pub fn search(&self, query: &str) -> Vec<&Template> {
        let query = query.trim().to_lowercase();
        self.list()
            .into_iter()
            .filter(|t| {
                t.name.to_lowercase().contains(&query)
                    || t.template_type.as_str().contains(&query)
                    || t.content.to_lowercase().contains(&query)
            })
            .collect()
    }

    /// Substitute data keywords into a template or Terms variation.
    ///
    /// # Errors
    ///
    /// Returns an error if neither a template nor a Terms variation has this ID.
    pub fn render(&self, id: &str, context: &HashMap<String, String>) -> Result<String, CrmError> {
        self.get(id)
            .or_else(|| self.terms.get(id).map(|tc| &tc.template))
            .map(|t| render(&t.content, context))
            .ok_or_else(|| CrmError::NotFound(format!("Template '{id}'")))
    }

    #[must_use]
    pub const fn terms(&self) -> &TermsRegistry {
        &self.terms
    }

    pub fn terms_mut(&mut self) -> &mut TermsRegistry {
        &mut self.terms
    }

    fn get_mut(&mut self, id: &str) -> Result<&mut Template, CrmError> {
        self.templates
            .iter_mut()
            .find(|t| t.id == id)
            .ok_or_else(|| CrmError::NotFound(format!("Template '{id}'")))
    }
}

/// A Terms variation as listed, with its default flag.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TermsEntry<'a> {
    #[serde(flatten)]
    pub terms: &'a TermsAndConditions,
    pub is_default: bool,
}

/// Partial update of a Terms variation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TermsUpdate {
    pub variation_name: Option<String>,
    pub content: Option<String>,
    pub is_active: Option<bool>,
    pub is_default: Option<bool>,
}

/// Terms & Conditions variations with exactly one default once non-empty.
///
/// The default is a single index into the arena, so moving it is one write.
#[derive(Debug, Clone, Default)]
pub struct TermsRegistry {
    variations: Vec<TermsAndConditions>,
    default_index: Option<usize>,
}

impl TermsRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.variations.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.variations.is_empty()
    }

    /// Add a variation. The first variation always becomes the default.
    pub fn create(
        &mut self,
        variation_name: impl Into<String>,
        content: impl Into<String>,
        make_default: bool,
    ) -> &TermsAndConditions {
        let variation_name = variation_name.into();
        let template = new_template(
            TemplateType::TermsAndConditions,
            terms_name(&variation_name),
            content.into(),
            true,
        );

        let index = self.variations.len();
        self.variations.push(TermsAndConditions {
            template,
            variation_name,
        });
        if make_default || self.default_index.is_none() {
            self.default_index = Some(index);
        }

        &self.variations[index]
    }

    /// Default first, then by variation name.
    #[must_use]
    pub fn list(&self) -> Vec<TermsEntry<'_>> {
        let mut entries: Vec<_> = self
            .variations
            .iter()
            .enumerate()
            .map(|(i, terms)| TermsEntry {
                terms,
                is_default: self.default_index == Some(i),
            })
            .collect();
        entries.sort_by(|a, b| {
            b.is_default.cmp(&a.is_default).then_with(|| {
                a.terms
                    .variation_name
                    .to_lowercase()
                    .cmp(&b.terms.variation_name.to_lowercase())
            })
        });
        entries
    }

    #[must_use]
    pub fn get_default(&self) -> Option<&TermsAndConditions> {
        self.default_index.and_then(|i| self.variations.get(i))
    }

    #[must_use]
    pub fn get(&self, id: &str) -> Option<&TermsAndConditions> {
        self.variations.iter().find(|tc| tc.template.id == id)
    }

    /// Find by ID or variation name (case-insensitive).
    #[must_use]
    pub fn find(&self, key: &str) -> Option<&TermsAndConditions> {
        self.get(key).or_else(|| {
            self.variations
                .iter()
                .find(|tc| tc.variation_name.eq_ignore_ascii_case(key))
        })
    }

    #[must_use]
    pub fn is_default(&self, id: &str) -> bool {
        self.get_default().is_some_and(|tc| tc.template.id == id)
    }

    /// Apply a partial update.
    ///
    /// # Errors
    ///
    /// Returns an error if the ID is unknown, or if the update tries to clear
    /// the default flag on the current default.
    pub fn update(&mut self, id: &str, update: TermsUpdate) -> Result<&TermsAndConditions, CrmError> {
        let index = self.index_of(id)?;

        match update.is_default {
            Some(true) => self.default_index = Some(index),
            Some(false) if self.default_index == Some(index) => {
                return Err(CrmError::Terms(
                    "Cannot unset the default Terms & Conditions. Please set another variation as default first."
                        .to_string(),
                ));
            },
            _ => {},
        }

        let terms = &mut self.variations[index];
        if let Some(name) = update.variation_name {
            terms.template.name = terms_name(&name);
            terms.variation_name = name;
        }
        TemplateUpdate {
            content: update.content,
            is_active: update.is_active,
            ..TemplateUpdate::default()
        }
        .apply_to(&mut terms.template);

        Ok(&self.variations[index])
    }

    /// Make a variation the default, replacing the previous one.
    ///
    /// # Errors
    ///
    /// Returns an error if the ID is unknown.
    pub fn set_default(&mut self, id: &str) -> Result<&TermsAndConditions, CrmError> {
        self.update(
            id,
            TermsUpdate {
                is_default: Some(true),
                ..TermsUpdate::default()
            },
        )
    }

    /// Remove a variation.
    ///
    /// # Errors
    ///
    /// Returns an error if the ID is unknown, if it is the default while other
    /// variations exist, or if it is the last variation.
    pub fn delete(&mut self, id: &str) -> Result<TermsAndConditions, CrmError> {
        let index = self.index_of(id)?;

        if self.default_index == Some(index) && self.variations.len() > 1 {
            return Err(CrmError::Terms(
                "Cannot delete the default Terms & Conditions. Please set another variation as default first."
                    .to_string(),
            ));
        }
        if self.variations.len() == 1 {
            return Err(CrmError::Terms(
                "Cannot delete the last Terms & Conditions. At least one variation must exist."
                    .to_string(),
            ));
        }

        let removed = self.variations.remove(index);
        if let Some(default) = self.default_index {
            if default > index {
                self.default_index = Some(default - 1);
            }
        }
        Ok(removed)
    }

    fn index_of(&self, id: &str) -> Result<usize, CrmError> {
        self.variations
            .iter()
            .position(|tc| tc.template.id == id)
            .ok_or_else(|| CrmError::NotFound("Terms & Conditions not found".to_string()))
    }
}

fn terms_name(variation: &str) -> String {
    format!("Terms and Conditions - {variation}")
}
