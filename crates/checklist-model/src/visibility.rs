//! Visibility and exclusive-group rules of the checklist tree
//!
//! Visibility is evaluated against captured responses only; hiding an
//! item never removes what was captured for it.

use crate::component::ResponseValue;
use crate::item::{ChecklistItem, InputType};
use std::collections::BTreeMap;

/// Captured responses keyed by item id
pub type Responses = BTreeMap<String, ResponseValue>;

/// Whether an item's own `showWhen` rule is met
///
/// Items without `showWhen` are always visible. Comparison is exact string
/// equality against the captured value's comparable form.
#[must_use]
pub fn resolve_visibility(item: &ChecklistItem, responses: &Responses) -> bool {
    match &item.show_when {
        None => true,
        Some(rule) => responses
            .get(&rule.parent_id)
            .and_then(ResponseValue::comparable)
            .is_some_and(|value| value == rule.parent_value),
    }
}

/// Whether a container lets traversal descend into its subpoints
///
/// A checkbox only opens its subpoints when captured as `true`.
#[must_use]
pub fn subpoints_open(item: &ChecklistItem, responses: &Responses) -> bool {
    if !item.has_subpoints {
        return false;
    }
    match item.input_type {
        InputType::Checkbox => matches!(responses.get(&item.id), Some(ResponseValue::Flag(true))),
        _ => true,
    }
}

/// Subpoint chosen for a `group_selection` item
///
/// The group's own response wins when it names one of its subpoints;
/// otherwise the first subpoint (in order) whose response is a selection.
#[must_use]
pub fn selected_member<'a>(group: &'a ChecklistItem, responses: &Responses) -> Option<&'a ChecklistItem> {
    let named = responses
        .get(&group.id)
        .and_then(ResponseValue::as_text)
        .and_then(|id| group.subpoint(id.trim()));
    named.or_else(|| {
        group
            .children()
            .into_iter()
            .find(|s| responses.get(&s.id).is_some_and(ResponseValue::is_selection))
    })
}

/// Whether an exclusive-group member takes part in evaluation
///
/// Members of a group only count when they are the selected one among
/// the siblings sharing their group string. Items outside any group
/// always count.
#[must_use]
pub fn member_active(parent: &ChecklistItem, item: &ChecklistItem, responses: &Responses) -> bool {
    let Some(group) = item.exclusive_group.as_deref() else {
        return true;
    };
    let named = responses
        .get(&parent.id)
        .and_then(ResponseValue::as_text)
        .map(str::trim);
    if let Some(named) = named {
        if parent.subpoint(named).is_some_and(|s| s.exclusive_group.as_deref() == Some(group)) {
            return named == item.id;
        }
    }
    parent
        .children()
        .into_iter()
        .filter(|s| s.exclusive_group.as_deref() == Some(group))
        .find(|s| responses.get(&s.id).is_some_and(ResponseValue::is_selection))
        .is_some_and(|s| s.id == item.id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::component::Status;

    fn responses(pairs: &[(&str, ResponseValue)]) -> Responses {
        pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), v.clone()))
            .collect()
    }

    #[test]
    fn show_when_matches_on_string_form() {
        let item = ChecklistItem::new("b", "B", InputType::Text).show_when("a", "avvik");
        let r = responses(&[("a", ResponseValue::status(Status::Avvik))]);
        assert!(resolve_visibility(&item, &r));
        let r = responses(&[("a", ResponseValue::status(Status::Ok))]);
        assert!(!resolve_visibility(&item, &r));
        assert!(!resolve_visibility(&item, &Responses::new()));
    }

    #[test]
    fn unchecked_checkbox_closes_subpoints() {
        let item = ChecklistItem::new("c", "C", InputType::Checkbox)
            .with_subpoints(vec![ChecklistItem::new("c1", "C1", InputType::Text)]);
        assert!(!subpoints_open(&item, &Responses::new()));
        assert!(!subpoints_open(&item, &responses(&[("c", ResponseValue::Flag(false))])));
        assert!(subpoints_open(&item, &responses(&[("c", ResponseValue::Flag(true))])));
    }

    #[test]
    fn group_selection_prefers_named_member() {
        let group = ChecklistItem::new("g", "Drift", InputType::GroupSelection).with_subpoints(vec![
            ChecklistItem::new("g1", "Auto", InputType::Checkbox).in_group("modus"),
            ChecklistItem::new("g2", "Manuell", InputType::Checkbox).in_group("modus"),
        ]);
        let r = responses(&[
            ("g", ResponseValue::text("g2")),
            ("g1", ResponseValue::Flag(true)),
        ]);
        assert_eq!(selected_member(&group, &r).map(|s| s.id.as_str()), Some("g2"));
        assert!(member_active(&group, group.subpoint("g2").unwrap(), &r));
        assert!(!member_active(&group, group.subpoint("g1").unwrap(), &r));

        let r = responses(&[("g1", ResponseValue::Flag(true))]);
        assert_eq!(selected_member(&group, &r).map(|s| s.id.as_str()), Some("g1"));
    }
}
