//! Template resolution for equipment instances
//!
//! Matching order (first match wins):
//! 1. exact case-insensitive match of the equipment type against `id`
//! 2. case-insensitive substring match, either direction, of the type or
//!    display name against the template `name`
//! 3. the built-in fallback template
//!
//! Resolution never fails. A fallback carries a [`ResolutionWarning`] so
//! callers can surface the miss to an operator while still producing a
//! report.

use crate::error::{EngineError, EngineResult};
use checklist_model::{template_key, validate_template, ChecklistTemplate, SystemField};
use serde::Serialize;
use std::collections::HashSet;
use std::fmt;

/// Id of the built-in fallback template
pub const FALLBACK_TEMPLATE_ID: &str = "standard";

/// How a template was chosen
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchKind {
    /// Equipment type equals template id
    Id,
    /// Equipment type or name overlaps template name
    Name,
    /// Nothing matched
    Fallback,
}

/// Signal that no authored template matched
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolutionWarning {
    pub equipment_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl fmt::Display for ResolutionWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.name {
            Some(name) => write!(
                f,
                "no template for equipment type '{}' ({name}), using fallback",
                self.equipment_type
            ),
            None => write!(
                f,
                "no template for equipment type '{}', using fallback",
                self.equipment_type
            ),
        }
    }
}

/// Outcome of resolving one equipment instance
#[derive(Debug, Clone)]
pub struct Resolution<'a> {
    pub template: &'a ChecklistTemplate,
    pub matched_by: MatchKind,
    pub warning: Option<ResolutionWarning>,
}

impl Resolution<'_> {
    /// Whether the fallback template was used
    #[inline]
    #[must_use]
    pub fn is_fallback(&self) -> bool {
        self.matched_by == MatchKind::Fallback
    }
}

/// Picks the template for an equipment instance
#[derive(Debug, Clone)]
pub struct TemplateResolver {
    templates: Vec<ChecklistTemplate>,
    fallback: ChecklistTemplate,
}

impl TemplateResolver {
    /// Build from validated templates
    ///
    /// # Errors
    /// Rejects structurally invalid templates and duplicate ids
    pub fn new(templates: Vec<ChecklistTemplate>) -> EngineResult<Self> {
        let mut ids = HashSet::new();
        for template in &templates {
            validate_template(template)?;
            if !ids.insert(template_key(&template.id)) {
                return Err(EngineError::DuplicateTemplateId(template.id.clone()));
            }
        }
        Ok(Self {
            templates,
            fallback: fallback_template(),
        })
    }

    /// Resolver that always falls back
    #[must_use]
    pub fn empty() -> Self {
        Self {
            templates: Vec::new(),
            fallback: fallback_template(),
        }
    }

    /// Authored templates, in registration order
    #[inline]
    #[must_use]
    pub fn templates(&self) -> &[ChecklistTemplate] {
        &self.templates
    }

    /// The fallback template
    #[inline]
    #[must_use]
    pub fn fallback(&self) -> &ChecklistTemplate {
        &self.fallback
    }

    /// Look up an authored template by id (case-insensitive)
    #[must_use]
    pub fn get(&self, id: &str) -> Option<&ChecklistTemplate> {
        let wanted = template_key(id);
        self.templates.iter().find(|t| template_key(&t.id) == wanted)
    }

    /// Resolve the template for an equipment type and optional display name
    #[must_use]
    pub fn resolve(&self, equipment_type: &str, name: Option<&str>) -> Resolution<'_> {
        if let Some((template, matched_by)) = self.find_match(equipment_type, name) {
            tracing::debug!(
                equipment_type,
                template = %template.id,
                ?matched_by,
                "resolved template"
            );
            return Resolution {
                template,
                matched_by,
                warning: None,
            };
        }

        let warning = ResolutionWarning {
            equipment_type: equipment_type.to_string(),
            name: name.map(ToString::to_string),
        };
        tracing::warn!("{warning}");
        Resolution {
            template: &self.fallback,
            matched_by: MatchKind::Fallback,
            warning: Some(warning),
        }
    }

    /// Authored template matching the inputs, if any
    #[must_use]
    pub fn find_match(&self, equipment_type: &str, name: Option<&str>) -> Option<(&ChecklistTemplate, MatchKind)> {
        let wanted = template_key(equipment_type);
        if !wanted.is_empty() {
            if let Some(t) = self.templates.iter().find(|t| template_key(&t.id) == wanted) {
                return Some((t, MatchKind::Id));
            }
        }

        let needles: Vec<String> = [Some(equipment_type), name]
            .into_iter()
            .flatten()
            .map(|s| s.trim().to_lowercase())
            .filter(|s| !s.is_empty())
            .collect();

        for needle in &needles {
            let found = self.templates.iter().find(|t| {
                let template_name = t.name.trim().to_lowercase();
                !template_name.is_empty()
                    && (template_name.contains(needle.as_str()) || needle.contains(template_name.as_str()))
            });
            if let Some(t) = found {
                return Some((t, MatchKind::Name));
            }
        }

        None
    }
}

impl Default for TemplateResolver {
    fn default() -> Self {
        Self::empty()
    }
}

/// Built-in template used when nothing matches
///
/// A single required free-text description and no checklist items.
#[must_use]
pub fn fallback_template() -> ChecklistTemplate {
    ChecklistTemplate::new("Standard sjekkliste")
        .with_id(FALLBACK_TEMPLATE_ID)
        .with_field(SystemField::new("beskrivelse", "Beskrivelse").required())
        .allow_comments()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn resolver() -> TemplateResolver {
        TemplateResolver::new(vec![
            ChecklistTemplate::new("Ventilasjonsaggregat").with_id("ventilasjon"),
            ChecklistTemplate::new("Varmepumpe").with_id("vp"),
        ])
        .unwrap()
    }

    #[test]
    fn exact_id_match_is_case_insensitive() {
        let r = resolver();
        let res = r.resolve("VENTILASJON", None);
        assert_eq!(res.template.id, "ventilasjon");
        assert_eq!(res.matched_by, MatchKind::Id);
        assert!(res.warning.is_none());
    }

    #[test]
    fn name_substring_both_directions() {
        let r = resolver();
        assert_eq!(r.resolve("aggregat", None).template.id, "ventilasjon");
        assert_eq!(r.resolve("Varmepumpe luft/vann", None).template.id, "vp");
        assert_eq!(r.resolve("ukjent", Some("Varmepumpe 2")).template.id, "vp");
        assert_eq!(r.resolve("ukjent", Some("Varmepumpe 2")).matched_by, MatchKind::Name);
    }

    #[test]
    fn miss_falls_back_with_warning() {
        let r = resolver();
        let res = r.resolve("sprinkler", None);
        assert!(res.is_fallback());
        assert_eq!(res.template.id, FALLBACK_TEMPLATE_ID);
        assert_eq!(res.template.system_fields.len(), 1);
        assert!(res.template.system_fields[0].required);
        assert!(res.template.checklist_items.is_empty());
        assert!(res.warning.unwrap().to_string().contains("sprinkler"));
    }

    #[test]
    fn blank_type_does_not_match_everything() {
        let r = resolver();
        assert!(r.resolve("   ", None).is_fallback());
    }

    #[test]
    fn duplicate_ids_rejected() {
        let err = TemplateResolver::new(vec![
            ChecklistTemplate::new("A").with_id("x"),
            ChecklistTemplate::new("B").with_id("X"),
        ])
        .unwrap_err();
        assert!(matches!(err, EngineError::DuplicateTemplateId(_)));
    }

    #[test]
    fn get_and_resolve_fold_case_alike() {
        let r = TemplateResolver::new(vec![ChecklistTemplate::new("Fryserom").with_id("Kjøl")]).unwrap();
        assert_eq!(r.get("KJØL").map(|t| t.id.as_str()), Some("Kjøl"));
        assert_eq!(r.get(" kjøl ").map(|t| t.id.as_str()), Some("Kjøl"));
        assert_eq!(r.resolve("KJØL", None).matched_by, MatchKind::Id);
    }
}
