//! Checklist templates
//!
//! One template per equipment/facility type: flat system fields plus an
//! ordered forest of [`ChecklistItem`]s and flags gating optional report
//! sections.

use crate::error::{TemplateError, TemplateResult};
use crate::item::{in_order, ChecklistItem};
use serde::{Deserialize, Serialize};

/// Flat metadata field captured once per component
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SystemField {
    pub name: String,
    pub label: String,
    #[serde(default)]
    pub required: bool,
    #[serde(default)]
    pub order: i32,
}

impl SystemField {
    /// Create optional field
    #[must_use]
    pub fn new(name: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            label: label.into(),
            required: false,
            order: 0,
        }
    }

    /// Mark as required
    #[inline]
    #[must_use]
    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }
}

/// Weekly time-grid definition
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DriftScheduleConfig {
    pub title: String,
    pub days: Vec<String>,
    pub fields: Vec<String>,
}

/// Authored schema for one equipment type
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", try_from = "RawTemplate")]
pub struct ChecklistTemplate {
    pub id: String,
    pub name: String,
    pub system_fields: Vec<SystemField>,
    pub checklist_items: Vec<ChecklistItem>,
    pub allow_products: bool,
    pub allow_additional_work: bool,
    pub allow_comments: bool,
    pub has_drift_schedule: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub drift_schedule_config: Option<DriftScheduleConfig>,
}

impl ChecklistTemplate {
    /// Create empty template, id derived from name
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            id: derive_template_id(&name),
            name,
            system_fields: Vec::new(),
            checklist_items: Vec::new(),
            allow_products: false,
            allow_additional_work: false,
            allow_comments: false,
            has_drift_schedule: false,
            drift_schedule_config: None,
        }
    }

    /// Override the derived id
    #[must_use]
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = id.into();
        self
    }

    /// Append a system field, order taken from position
    #[must_use]
    pub fn with_field(mut self, mut field: SystemField) -> Self {
        field.order = i32::try_from(self.system_fields.len()).unwrap_or(i32::MAX);
        self.system_fields.push(field);
        self
    }

    /// Append a top-level item, order taken from position
    #[must_use]
    pub fn with_item(mut self, mut item: ChecklistItem) -> Self {
        item.order = i32::try_from(self.checklist_items.len()).unwrap_or(i32::MAX);
        self.checklist_items.push(item);
        self
    }

    /// Enable the products section
    #[inline]
    #[must_use]
    pub fn allow_products(mut self) -> Self {
        self.allow_products = true;
        self
    }

    /// Enable the additional-work section
    #[inline]
    #[must_use]
    pub fn allow_additional_work(mut self) -> Self {
        self.allow_additional_work = true;
        self
    }

    /// Enable free-text comments
    #[inline]
    #[must_use]
    pub fn allow_comments(mut self) -> Self {
        self.allow_comments = true;
        self
    }

    /// Enable the drift-schedule grid
    #[must_use]
    pub fn with_drift_schedule(mut self, config: DriftScheduleConfig) -> Self {
        self.has_drift_schedule = true;
        self.drift_schedule_config = Some(config);
        self
    }

    /// System fields in authored order
    #[must_use]
    pub fn ordered_fields(&self) -> Vec<&SystemField> {
        let mut fields: Vec<&SystemField> = self.system_fields.iter().collect();
        fields.sort_by_key(|f| f.order);
        fields
    }

    /// Top-level items in authored order
    #[must_use]
    pub fn ordered_items(&self) -> Vec<&ChecklistItem> {
        in_order(&self.checklist_items)
    }

    /// Every item in the tree, depth-first in authored order
    #[must_use]
    pub fn flatten(&self) -> Vec<&ChecklistItem> {
        fn walk<'a>(items: Vec<&'a ChecklistItem>, out: &mut Vec<&'a ChecklistItem>) {
            for item in items {
                out.push(item);
                walk(in_order(&item.subpoints), out);
            }
        }

        let mut out = Vec::new();
        walk(self.ordered_items(), &mut out);
        out
    }

    /// Items reached through [`ChecklistItem::children`], depth-first in
    /// authored order
    ///
    /// Unlike [`flatten`](Self::flatten) this skips subpoints of items
    /// with `has_subpoints` unset, matching completion and rendering.
    #[must_use]
    pub fn traverse(&self) -> Vec<&ChecklistItem> {
        fn walk<'a>(items: Vec<&'a ChecklistItem>, out: &mut Vec<&'a ChecklistItem>) {
            for item in items {
                out.push(item);
                walk(item.children(), out);
            }
        }

        let mut out = Vec::new();
        walk(self.ordered_items(), &mut out);
        out
    }

    /// Find any item in the tree by id
    #[must_use]
    pub fn find_item(&self, id: &str) -> Option<&ChecklistItem> {
        self.flatten().into_iter().find(|item| item.id == id)
    }

    /// Find the parent of an item, `None` for top-level or unknown ids
    #[must_use]
    pub fn parent_of(&self, id: &str) -> Option<&ChecklistItem> {
        self.flatten()
            .into_iter()
            .find(|item| item.subpoints.iter().any(|s| s.id == id))
    }
}

/// Lookup key for a template id: trimmed and Unicode lower-cased
///
/// Every id comparison (resolver, stores, cache) goes through this.
#[must_use]
pub fn template_key(id: &str) -> String {
    id.trim().to_lowercase()
}

/// Derive a stable id from a display name
///
/// Lower-cases, transliterates æ/ø/å, replaces everything else that is not
/// alphanumeric with `-` and collapses repeats.
#[must_use]
pub fn derive_template_id(name: &str) -> String {
    let mut id = String::with_capacity(name.len());
    for c in name.trim().to_lowercase().chars() {
        match c {
            'æ' => id.push_str("ae"),
            'ø' => id.push('o'),
            'å' => id.push('a'),
            c if c.is_ascii_alphanumeric() => id.push(c),
            _ => {
                if !id.is_empty() && !id.ends_with('-') {
                    id.push('-');
                }
            }
        }
    }
    while id.ends_with('-') {
        id.pop();
    }
    id
}

/// Template shape as stored, with optional id and flags
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawTemplate {
    #[serde(default)]
    id: Option<String>,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    system_fields: Vec<SystemField>,
    #[serde(default)]
    checklist_items: Vec<ChecklistItem>,
    #[serde(default)]
    allow_products: bool,
    #[serde(default)]
    allow_additional_work: bool,
    #[serde(default)]
    allow_comments: bool,
    #[serde(default)]
    has_drift_schedule: bool,
    #[serde(default)]
    drift_schedule_config: Option<DriftScheduleConfig>,
}

impl TryFrom<RawTemplate> for ChecklistTemplate {
    type Error = TemplateError;

    fn try_from(raw: RawTemplate) -> TemplateResult<Self> {
        let name = raw.name.filter(|n| !n.trim().is_empty());
        let id = match (raw.id.filter(|i| !i.trim().is_empty()), &name) {
            (Some(id), _) => id,
            (None, Some(name)) => derive_template_id(name),
            (None, None) => return Err(TemplateError::MissingIdentity),
        };

        let mut system_fields = raw.system_fields;
        system_fields.sort_by_key(|f| f.order);
        let mut checklist_items = raw.checklist_items;
        checklist_items.sort_by_key(|i| i.order);

        Ok(Self {
            name: name.unwrap_or_else(|| id.clone()),
            id,
            system_fields,
            checklist_items,
            allow_products: raw.allow_products,
            allow_additional_work: raw.allow_additional_work,
            allow_comments: raw.allow_comments,
            has_drift_schedule: raw.has_drift_schedule,
            drift_schedule_config: raw.drift_schedule_config,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::item::InputType;

    #[test]
    fn id_derivation_handles_norwegian_letters() {
        assert_eq!(derive_template_id("Varmepumpe Luft/Vann"), "varmepumpe-luft-vann");
        assert_eq!(derive_template_id("  Kjøle-  og fryserom "), "kjole-og-fryserom");
        assert_eq!(derive_template_id("Ærlig Ålesund"), "aerlig-alesund");
    }

    #[test]
    fn missing_id_is_derived_from_name() {
        let t: ChecklistTemplate =
            serde_json::from_str(r#"{"name": "Ventilasjonsaggregat"}"#).unwrap();
        assert_eq!(t.id, "ventilasjonsaggregat");
        assert!(t.checklist_items.is_empty());
    }

    #[test]
    fn template_without_identity_is_rejected() {
        let err = serde_json::from_str::<ChecklistTemplate>("{}").unwrap_err();
        assert!(err.to_string().contains("no id and no name"));
    }

    #[test]
    fn flatten_is_depth_first_in_order() {
        let t = ChecklistTemplate::new("Test")
            .with_item(
                ChecklistItem::new("a", "A", InputType::Checkbox).with_subpoints(vec![
                    ChecklistItem::new("a2", "A2", InputType::Text).with_order(2),
                    ChecklistItem::new("a1", "A1", InputType::Text).with_order(1),
                ]),
            )
            .with_item(ChecklistItem::new("b", "B", InputType::OkAvvik));
        let ids: Vec<&str> = t.flatten().iter().map(|i| i.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "a1", "a2", "b"]);
        assert_eq!(t.parent_of("a2").map(|p| p.id.as_str()), Some("a"));
        assert!(t.parent_of("b").is_none());
    }

    #[test]
    fn template_key_folds_non_ascii() {
        assert_eq!(template_key(" Kjøl "), template_key("KJØL"));
        assert_eq!(template_key("KJØL"), "kjøl");
    }

    #[test]
    fn traverse_skips_dormant_subpoints() {
        let mut parent = ChecklistItem::new("a", "A", InputType::OkAvvik)
            .with_subpoints(vec![ChecklistItem::new("a1", "A1", InputType::OkAvvik)]);
        parent.has_subpoints = false;
        let t = ChecklistTemplate::new("Test")
            .with_item(parent)
            .with_item(ChecklistItem::new("b", "B", InputType::OkAvvik));
        let ids: Vec<&str> = t.traverse().iter().map(|i| i.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "b"]);
        assert_eq!(t.flatten().len(), 3);
    }
}
