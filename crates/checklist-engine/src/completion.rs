//! Completion evaluation of captured components
//!
//! A component is complete when every required system field is filled
//! and every required, visible checklist item satisfies its input-type
//! rule. Traversal is driven by the template tree; captured responses are
//! only looked up by id.

use checklist_model::{
    member_active, resolve_visibility, selected_member, subpoints_open, ChecklistItem,
    ChecklistTemplate, Component, InputType, ResponseValue, Responses,
};
use serde::Serialize;
use std::fmt;

/// Why an item's own rule is not met
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureReason {
    /// Nothing captured
    NoResponse,
    /// Status response without a status
    MissingStatus,
    /// Non-ok status without a comment
    MissingComment,
    /// Captured value is blank or of the wrong shape
    Blank,
    /// Group selection with no chosen subpoint
    NoSelection,
}

impl fmt::Display for FailureReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Self::NoResponse => "not answered",
            Self::MissingStatus => "status missing",
            Self::MissingComment => "comment required for this status",
            Self::Blank => "value is blank",
            Self::NoSelection => "no option selected",
        };
        f.write_str(text)
    }
}

/// First reason a component is not complete
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Incomplete {
    /// Required system field is blank
    SystemField { name: String, label: String },
    /// Required checklist item fails its rule
    Item {
        item_id: String,
        label: String,
        reason: FailureReason,
    },
}

impl fmt::Display for Incomplete {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SystemField { label, .. } => write!(f, "{label}: required field is empty"),
            Self::Item { label, reason, .. } => write!(f, "{label}: {reason}"),
        }
    }
}

/// Completion verdict with the first failure, if any
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CompletionReport {
    pub complete: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_failure: Option<Incomplete>,
}

impl CompletionReport {
    fn from_result(result: Result<(), Incomplete>) -> Self {
        match result {
            Ok(()) => Self {
                complete: true,
                first_failure: None,
            },
            Err(failure) => Self {
                complete: false,
                first_failure: Some(failure),
            },
        }
    }
}

/// Whether a component is complete against its template
#[must_use]
pub fn is_complete(template: &ChecklistTemplate, component: &Component) -> bool {
    evaluate(template, component).complete
}

/// Evaluate completion, short-circuiting on the first failure
#[must_use]
pub fn evaluate(template: &ChecklistTemplate, component: &Component) -> CompletionReport {
    let report = CompletionReport::from_result(check_component(template, component));
    tracing::debug!(
        template = %template.id,
        complete = report.complete,
        failure = ?report.first_failure,
        "evaluated component"
    );
    report
}

fn check_component(template: &ChecklistTemplate, component: &Component) -> Result<(), Incomplete> {
    for field in template.ordered_fields() {
        if field.required && component.detail(&field.name).is_none() {
            return Err(Incomplete::SystemField {
                name: field.name.clone(),
                label: field.label.clone(),
            });
        }
    }

    if template.checklist_items.is_empty() {
        return Ok(());
    }

    walk(None, template.ordered_items(), &component.checklist)
}

fn walk(parent: Option<&ChecklistItem>, items: Vec<&ChecklistItem>, responses: &Responses) -> Result<(), Incomplete> {
    for item in items {
        if !takes_part(parent, item, responses) {
            continue;
        }
        if item.required {
            check_item(item, responses).map_err(|reason| Incomplete::Item {
                item_id: item.id.clone(),
                label: item.label.clone(),
                reason,
            })?;
        }
        if subpoints_open(item, responses) {
            walk(Some(item), item.children(), responses)?;
        }
    }
    Ok(())
}

fn takes_part(parent: Option<&ChecklistItem>, item: &ChecklistItem, responses: &Responses) -> bool {
    resolve_visibility(item, responses) && parent.map_or(true, |p| member_active(p, item, responses))
}

/// Apply an item's input-type rule to its captured response
///
/// # Errors
/// Returns the reason the rule is not met
pub fn check_item(item: &ChecklistItem, responses: &Responses) -> Result<(), FailureReason> {
    let response = responses.get(&item.id);
    match item.input_type {
        InputType::OkAvvik | InputType::OkByttetAvvik => {
            let status = response
                .and_then(ResponseValue::as_status)
                .ok_or(FailureReason::NoResponse)?;
            match status.status {
                None => Err(FailureReason::MissingStatus),
                Some(s) if s.needs_comment() && status.comment_text().is_none() => {
                    Err(FailureReason::MissingComment)
                }
                Some(_) => Ok(()),
            }
        }
        InputType::Checkbox => response
            .and_then(ResponseValue::as_flag)
            .map(|_| ())
            .ok_or(FailureReason::NoResponse),
        InputType::GroupSelection => selected_member(item, responses)
            .map(|_| ())
            .ok_or(FailureReason::NoSelection),
        InputType::Numeric
        | InputType::Temperature
        | InputType::Virkningsgrad
        | InputType::Text
        | InputType::Textarea
        | InputType::Comment
        | InputType::SwitchSelect
        | InputType::Dropdown => match response {
            None => Err(FailureReason::NoResponse),
            Some(value) => value.as_text().map(|_| ()).ok_or(FailureReason::Blank),
        },
    }
}

/// Per-item state for a capture UI
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemState {
    pub item_id: String,
    pub label: String,
    pub depth: usize,
    pub input_type: InputType,
    pub required: bool,
    /// Shown given current responses and ancestors
    pub visible: bool,
    /// Own input-type rule currently met
    pub satisfied: bool,
}

/// State of every item in template order, depth-first
#[must_use]
pub fn item_states(template: &ChecklistTemplate, component: &Component) -> Vec<ItemState> {
    fn collect(
        parent: Option<&ChecklistItem>,
        items: Vec<&ChecklistItem>,
        depth: usize,
        parent_open: bool,
        responses: &Responses,
        out: &mut Vec<ItemState>,
    ) {
        for item in items {
            let visible = parent_open && takes_part(parent, item, responses);
            out.push(ItemState {
                item_id: item.id.clone(),
                label: item.label.clone(),
                depth,
                input_type: item.input_type,
                required: item.required,
                visible,
                satisfied: check_item(item, responses).is_ok(),
            });
            let open = visible && subpoints_open(item, responses);
            collect(Some(item), item.children(), depth + 1, open, responses, out);
        }
    }

    let mut out = Vec::new();
    collect(None, template.ordered_items(), 0, true, &component.checklist, &mut out);
    out
}

/// Everything a capture UI needs to gate its finalize action
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CaptureView {
    pub template_id: String,
    pub completion: CompletionReport,
    pub items: Vec<ItemState>,
}

/// Completion verdict and item states in one pass over the template
#[must_use]
pub fn capture_view(template: &ChecklistTemplate, component: &Component) -> CaptureView {
    CaptureView {
        template_id: template.id.clone(),
        completion: evaluate(template, component),
        items: item_states(template, component),
    }
}
