//! Response collection from raw capture state
//!
//! A capture surface hands over loosely typed per-field state (JSON
//! values as the form produced them). [`collect`] turns that into a
//! [`Component`] whose responses have the shape their item's input type
//! expects. Blank input is "no response" and is not stored.
//!
//! Collection is idempotent: collecting the raw form of a collected
//! component yields the same component.

use checklist_model::{
    AdditionalWork, ChecklistItem, ChecklistTemplate, Component, InputType, Product, ResponseValue,
    Status, StatusResponse,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::{BTreeMap, HashSet};
use std::fmt;

/// Raw per-field state from a capture surface
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawCapture {
    #[serde(default)]
    pub equipment_type: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub details: BTreeMap<String, Value>,
    #[serde(default)]
    pub checklist: BTreeMap<String, Value>,
    #[serde(default)]
    pub products: Vec<Product>,
    #[serde(default)]
    pub additional_work: Vec<AdditionalWork>,
    #[serde(default)]
    pub drift_schedule: BTreeMap<String, BTreeMap<String, Value>>,
    #[serde(default)]
    pub images: Vec<String>,
    #[serde(default)]
    pub comment: Option<String>,
}

impl From<&Component> for RawCapture {
    fn from(component: &Component) -> Self {
        Self {
            equipment_type: component.equipment_type.clone(),
            name: component.name.clone(),
            location: component.location.clone(),
            details: component
                .details
                .iter()
                .map(|(k, v)| (k.clone(), Value::String(v.clone())))
                .collect(),
            checklist: component
                .checklist
                .iter()
                .map(|(k, v)| (k.clone(), serde_json::to_value(v).unwrap_or(Value::Null)))
                .collect(),
            products: component.products.clone(),
            additional_work: component.additional_work.clone(),
            drift_schedule: component
                .drift_schedule
                .iter()
                .map(|(day, fields)| {
                    let fields = fields
                        .iter()
                        .map(|(k, v)| (k.clone(), Value::String(v.clone())))
                        .collect();
                    (day.clone(), fields)
                })
                .collect(),
            images: component.images.clone(),
            comment: component.comment.clone(),
        }
    }
}

/// Something the collector dropped or could not interpret
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CollectWarning {
    /// Value does not fit the item's input type
    WrongShape { item_id: String, input_type: InputType },
    /// Status token outside the closed set
    UnknownStatus { item_id: String, value: String },
    /// Value outside the item's option list
    UnknownOption { item_id: String, value: String },
    /// A second member of an exclusive group was selected
    ExclusiveConflict { group: String, kept: String, dropped: String },
}

impl fmt::Display for CollectWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::WrongShape { item_id, input_type } => {
                write!(f, "item '{item_id}': value does not fit input type {input_type}")
            }
            Self::UnknownStatus { item_id, value } => {
                write!(f, "item '{item_id}': unknown status '{value}'")
            }
            Self::UnknownOption { item_id, value } => {
                write!(f, "item '{item_id}': '{value}' is not one of the options")
            }
            Self::ExclusiveConflict { group, kept, dropped } => {
                write!(f, "group '{group}': kept '{kept}', dropped '{dropped}'")
            }
        }
    }
}

/// Collected component and what was dropped on the way
#[derive(Debug, Clone, PartialEq)]
pub struct Collected {
    pub component: Component,
    pub warnings: Vec<CollectWarning>,
}

/// Normalise raw capture state against a template
#[must_use]
pub fn collect(template: &ChecklistTemplate, raw: &RawCapture) -> Collected {
    let mut warnings = Vec::new();
    let items: BTreeMap<&str, &ChecklistItem> = template
        .flatten()
        .into_iter()
        .map(|item| (item.id.as_str(), item))
        .collect();

    let mut checklist = BTreeMap::new();
    for (id, value) in &raw.checklist {
        let normalized = match items.get(id.as_str()) {
            Some(item) => normalize_response(item, value, &mut warnings),
            None => normalize_untyped(value),
        };
        if let Some(v) = normalized {
            checklist.insert(id.clone(), v);
        }
    }

    for group in items.values().filter(|i| i.input_type == InputType::GroupSelection) {
        prune_group(group, &mut checklist, &mut warnings);
    }

    let component = Component {
        equipment_type: raw.equipment_type.trim().to_string(),
        name: non_blank(raw.name.as_deref()),
        location: non_blank(raw.location.as_deref()),
        details: raw
            .details
            .iter()
            .filter_map(|(k, v)| scalar_text(v).map(|s| (k.clone(), s)))
            .collect(),
        checklist,
        products: raw
            .products
            .iter()
            .filter(|p| !p.name.trim().is_empty())
            .map(|p| Product {
                name: p.name.trim().to_string(),
                ..p.clone()
            })
            .collect(),
        additional_work: raw
            .additional_work
            .iter()
            .filter(|w| !w.description.trim().is_empty())
            .map(|w| AdditionalWork {
                description: w.description.trim().to_string(),
                ..w.clone()
            })
            .collect(),
        drift_schedule: raw
            .drift_schedule
            .iter()
            .filter_map(|(day, fields)| {
                let fields: BTreeMap<String, String> = fields
                    .iter()
                    .filter_map(|(k, v)| scalar_text(v).map(|s| (k.clone(), s)))
                    .collect();
                (!fields.is_empty()).then(|| (day.clone(), fields))
            })
            .collect(),
        images: clean_urls(&raw.images),
        comment: non_blank(raw.comment.as_deref()),
    };

    for warning in &warnings {
        tracing::warn!(template = %template.id, "{warning}");
    }

    Collected { component, warnings }
}

fn normalize_response(
    item: &ChecklistItem,
    value: &Value,
    warnings: &mut Vec<CollectWarning>,
) -> Option<ResponseValue> {
    if value.is_null() {
        return None;
    }
    match item.input_type {
        InputType::OkAvvik | InputType::OkByttetAvvik => normalize_status(item, value, warnings),
        InputType::Checkbox => {
            let flag = match value {
                Value::Bool(b) => Some(*b),
                Value::String(s) => parse_flag(s),
                _ => None,
            };
            if flag.is_none() && scalar_text(value).is_some() {
                warnings.push(wrong_shape(item));
            }
            flag.map(ResponseValue::Flag)
        }
        InputType::GroupSelection => {
            let named = scalar_text(value)?;
            if item.subpoint(&named).is_some() {
                Some(ResponseValue::Text(named))
            } else {
                warnings.push(CollectWarning::UnknownOption {
                    item_id: item.id.clone(),
                    value: named,
                });
                None
            }
        }
        InputType::SwitchSelect | InputType::Dropdown => {
            let chosen = scalar_text(value)?;
            let canonical = item
                .dropdown_options
                .iter()
                .find(|o| o.trim() == chosen)
                .or_else(|| item.dropdown_options.iter().find(|o| o.trim().eq_ignore_ascii_case(&chosen)));
            match canonical {
                Some(option) => Some(ResponseValue::Text(option.clone())),
                None => {
                    warnings.push(CollectWarning::UnknownOption {
                        item_id: item.id.clone(),
                        value: chosen,
                    });
                    None
                }
            }
        }
        InputType::Numeric
        | InputType::Temperature
        | InputType::Virkningsgrad
        | InputType::Text
        | InputType::Textarea
        | InputType::Comment => {
            let text = scalar_text(value);
            if text.is_none() && matches!(value, Value::Bool(_) | Value::Array(_) | Value::Object(_)) {
                warnings.push(wrong_shape(item));
            }
            text.map(ResponseValue::Text)
        }
    }
}

fn normalize_status(
    item: &ChecklistItem,
    value: &Value,
    warnings: &mut Vec<CollectWarning>,
) -> Option<ResponseValue> {
    let mut response = StatusResponse::default();
    match value {
        Value::String(token) => response.status = parse_status(&item.id, token, warnings),
        Value::Object(map) => {
            if let Some(Value::String(token)) = map.get("status") {
                response.status = parse_status(&item.id, token, warnings);
            }
            response.comment = map.get("comment").and_then(scalar_text);
            if let Some(Value::Array(images)) = map.get("images") {
                let urls: Vec<String> = images.iter().filter_map(|v| v.as_str().map(ToString::to_string)).collect();
                response.images = clean_urls(&urls);
            }
        }
        _ => {
            warnings.push(wrong_shape(item));
            return None;
        }
    }
    if response.status.is_none() && response.comment.is_none() && response.images.is_empty() {
        return None;
    }
    Some(ResponseValue::Status(response))
}

fn parse_status(item_id: &str, token: &str, warnings: &mut Vec<CollectWarning>) -> Option<Status> {
    if token.trim().is_empty() {
        return None;
    }
    match token.parse::<Status>() {
        Ok(status) => Some(status),
        Err(value) => {
            warnings.push(CollectWarning::UnknownStatus {
                item_id: item_id.to_string(),
                value,
            });
            None
        }
    }
}

/// Responses for ids the template does not know are kept as-is
fn normalize_untyped(value: &Value) -> Option<ResponseValue> {
    match value {
        Value::Bool(b) => Some(ResponseValue::Flag(*b)),
        Value::Object(_) => serde_json::from_value::<StatusResponse>(value.clone())
            .ok()
            .map(ResponseValue::Status)
            .filter(ResponseValue::is_answered),
        other => scalar_text(other).map(ResponseValue::Text),
    }
}

/// Keep one selected member per exclusive group under `group`
fn prune_group(group: &ChecklistItem, checklist: &mut BTreeMap<String, ResponseValue>, warnings: &mut Vec<CollectWarning>) {
    let named = checklist
        .get(&group.id)
        .and_then(ResponseValue::as_text)
        .map(ToString::to_string);
    // The group's own response names the first kept member only
    let mut response_set = named.is_some();

    let mut seen = HashSet::new();
    let children = group.children();
    for name in children.iter().filter_map(|c| c.exclusive_group.as_deref()) {
        if !seen.insert(name) {
            continue;
        }
        let members: Vec<&ChecklistItem> = children
            .iter()
            .copied()
            .filter(|c| c.exclusive_group.as_deref() == Some(name))
            .collect();

        let chosen = named
            .as_deref()
            .and_then(|n| members.iter().find(|m| m.id == n))
            .or_else(|| {
                members
                    .iter()
                    .find(|m| checklist.get(&m.id).is_some_and(ResponseValue::is_selection))
            })
            .map(|m| m.id.clone());
        let Some(kept) = chosen else {
            continue;
        };

        for member in members.iter().filter(|m| m.id != kept) {
            if let Some(dropped) = checklist.remove(&member.id) {
                if dropped.is_selection() {
                    warnings.push(CollectWarning::ExclusiveConflict {
                        group: name.to_string(),
                        kept: kept.clone(),
                        dropped: member.id.clone(),
                    });
                }
            }
        }
        if !response_set {
            checklist.insert(group.id.clone(), ResponseValue::Text(kept));
            response_set = true;
        }
    }
}

fn wrong_shape(item: &ChecklistItem) -> CollectWarning {
    CollectWarning::WrongShape {
        item_id: item.id.clone(),
        input_type: item.input_type,
    }
}

/// Trimmed string form of a scalar, `None` when blank
fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => non_blank(Some(s)),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_lowercase().as_str() {
        "true" | "ja" | "on" | "1" => Some(true),
        "false" | "nei" | "off" | "0" => Some(false),
        _ => None,
    }
}

fn non_blank(value: Option<&str>) -> Option<String> {
    value.map(str::trim).filter(|s| !s.is_empty()).map(ToString::to_string)
}

fn clean_urls(urls: &[String]) -> Vec<String> {
    urls.iter().filter_map(|u| non_blank(Some(u))).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn template() -> ChecklistTemplate {
        ChecklistTemplate::new("Pumpe")
            .with_item(ChecklistItem::new("status", "Status", InputType::OkAvvik))
            .with_item(ChecklistItem::new("trykk", "Trykk", InputType::Numeric))
            .with_item(ChecklistItem::new("alarm", "Alarm", InputType::Checkbox))
            .with_item(ChecklistItem::new("drift", "Drift", InputType::Dropdown).with_options(["Auto", "Manuell"]))
            .with_item(
                ChecklistItem::new("modus", "Modus", InputType::GroupSelection).with_subpoints(vec![
                    ChecklistItem::new("m1", "Sommer", InputType::Checkbox).in_group("sesong").with_order(0),
                    ChecklistItem::new("m2", "Vinter", InputType::Checkbox).in_group("sesong").with_order(1),
                ]),
            )
    }

    fn raw(checklist: Value) -> RawCapture {
        RawCapture {
            equipment_type: "pumpe".to_string(),
            checklist: serde_json::from_value(checklist).unwrap(),
            ..RawCapture::default()
        }
    }

    #[test]
    fn blank_values_are_not_stored() {
        let collected = collect(
            &template(),
            &raw(json!({"status": {"status": "", "comment": "  "}, "trykk": "   ", "alarm": null})),
        );
        assert!(collected.component.checklist.is_empty());
        assert!(collected.warnings.is_empty());
    }

    #[test]
    fn values_take_their_input_type_shape() {
        let c = collect(
            &template(),
            &raw(json!({"status": "AVVIK", "trykk": 2.5, "alarm": "ja", "drift": "auto"})),
        )
        .component;
        assert_eq!(c.response("status"), Some(&ResponseValue::status(Status::Avvik)));
        assert_eq!(c.response("trykk"), Some(&ResponseValue::text("2.5")));
        assert_eq!(c.response("alarm"), Some(&ResponseValue::Flag(true)));
        assert_eq!(c.response("drift"), Some(&ResponseValue::text("Auto")));
    }

    #[test]
    fn unknown_option_is_dropped_with_warning() {
        let collected = collect(&template(), &raw(json!({"drift": "Turbo", "status": "kaputt"})));
        assert!(collected.component.checklist.is_empty());
        assert_eq!(collected.warnings.len(), 2);
        assert!(collected
            .warnings
            .iter()
            .any(|w| matches!(w, CollectWarning::UnknownOption { value, .. } if value == "Turbo")));
    }

    #[test]
    fn exclusive_group_keeps_first_selection() {
        let collected = collect(&template(), &raw(json!({"m1": true, "m2": true})));
        let c = &collected.component;
        assert_eq!(c.response("m1"), Some(&ResponseValue::Flag(true)));
        assert!(c.response("m2").is_none());
        assert_eq!(c.response("modus"), Some(&ResponseValue::text("m1")));
        assert_eq!(
            collected.warnings,
            vec![CollectWarning::ExclusiveConflict {
                group: "sesong".to_string(),
                kept: "m1".to_string(),
                dropped: "m2".to_string(),
            }]
        );
    }

    #[test]
    fn group_response_names_the_kept_member() {
        let c = collect(&template(), &raw(json!({"modus": "m2", "m1": true, "m2": true}))).component;
        assert!(c.response("m1").is_none());
        assert_eq!(c.response("m2"), Some(&ResponseValue::Flag(true)));
    }

    #[test]
    fn collecting_twice_is_identity() {
        let first = collect(
            &template(),
            &raw(json!({
                "status": {"status": "avvik", "comment": " Lekker ", "images": ["a.jpg", ""]},
                "trykk": 3,
                "m2": true,
                "ukjent": "beholdes"
            })),
        )
        .component;
        let second = collect(&template(), &RawCapture::from(&first)).component;
        assert_eq!(first, second);
        assert_eq!(first.response("ukjent"), Some(&ResponseValue::text("beholdes")));
    }

    #[test]
    fn group_response_follows_first_exclusive_group() {
        let template = ChecklistTemplate::new("Pumpe").with_item(
            ChecklistItem::new("modus", "Modus", InputType::GroupSelection).with_subpoints(vec![
                ChecklistItem::new("s1", "Sommer", InputType::Checkbox).in_group("sesong").with_order(0),
                ChecklistItem::new("s2", "Vinter", InputType::Checkbox).in_group("sesong").with_order(1),
                ChecklistItem::new("d1", "Dag", InputType::Checkbox).in_group("tid").with_order(2),
                ChecklistItem::new("d2", "Natt", InputType::Checkbox).in_group("tid").with_order(3),
            ]),
        );
        let first = collect(&template, &raw(json!({"s2": true, "d1": true, "d2": true})));
        let c = &first.component;
        assert_eq!(c.response("modus"), Some(&ResponseValue::text("s2")));
        assert_eq!(c.response("s2"), Some(&ResponseValue::Flag(true)));
        assert_eq!(c.response("d1"), Some(&ResponseValue::Flag(true)));
        assert!(c.response("d2").is_none());
        assert_eq!(first.warnings.len(), 1);

        let second = collect(&template, &RawCapture::from(c)).component;
        assert_eq!(&second, c);
    }
}
