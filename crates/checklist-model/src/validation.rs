//! Structural validation of templates
//!
//! Runs once when a template is loaded. All defects are collected so an
//! author sees every problem in one pass.

use crate::error::{TemplateDefect, TemplateError, TemplateResult};
use crate::item::{ChecklistItem, InputType};
use crate::template::ChecklistTemplate;
use std::collections::HashSet;

/// Validate a template
///
/// # Errors
/// Returns [`TemplateError::Invalid`] listing every defect found
pub fn validate_template(template: &ChecklistTemplate) -> TemplateResult<()> {
    let defects = find_defects(template);
    if defects.is_empty() {
        Ok(())
    } else {
        Err(TemplateError::Invalid {
            template: template.id.clone(),
            defects,
        })
    }
}

/// Collect every structural defect in a template
#[must_use]
pub fn find_defects(template: &ChecklistTemplate) -> Vec<TemplateDefect> {
    let mut defects = Vec::new();

    let mut field_names = HashSet::new();
    for field in &template.system_fields {
        if !field_names.insert(field.name.as_str()) {
            defects.push(TemplateDefect::DuplicateSystemField(field.name.clone()));
        }
    }

    if template.has_drift_schedule && template.drift_schedule_config.is_none() {
        defects.push(TemplateDefect::MissingDriftScheduleConfig);
    }

    let items = template.flatten();
    let mut seen = HashSet::new();
    for item in &items {
        if item.id.trim().is_empty() {
            defects.push(TemplateDefect::BlankItemId);
        } else if !seen.insert(item.id.as_str()) {
            defects.push(TemplateDefect::DuplicateItemId(item.id.clone()));
        }
    }

    for item in &items {
        check_item(item, &seen, &mut defects);
    }

    for item in &template.checklist_items {
        check_groups(None, item, &mut defects);
    }

    defects
}

fn check_item(item: &ChecklistItem, ids: &HashSet<&str>, defects: &mut Vec<TemplateDefect>) {
    if let Some(rule) = &item.show_when {
        if !ids.contains(rule.parent_id.as_str()) {
            defects.push(TemplateDefect::UnknownShowWhenParent {
                item_id: item.id.clone(),
                parent_id: rule.parent_id.clone(),
            });
        }
    }

    if item.input_type == InputType::GroupSelection && item.children().is_empty() {
        defects.push(TemplateDefect::EmptyGroupSelection(item.id.clone()));
    }

    if item.input_type.is_dropdown_family()
        && item.dropdown_options.iter().all(|o| o.trim().is_empty())
    {
        defects.push(TemplateDefect::MissingDropdownOptions(item.id.clone()));
    }
}

fn check_groups(parent: Option<&ChecklistItem>, item: &ChecklistItem, defects: &mut Vec<TemplateDefect>) {
    if let Some(group) = &item.exclusive_group {
        let inside_group = parent.is_some_and(|p| p.input_type == InputType::GroupSelection);
        if !inside_group {
            defects.push(TemplateDefect::OrphanExclusiveGroup {
                item_id: item.id.clone(),
                group: group.clone(),
            });
        }
    }
    for sub in &item.subpoints {
        check_groups(Some(item), sub, defects);
    }
}
